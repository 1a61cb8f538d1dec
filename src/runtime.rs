use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use rand::Rng;

use crate::carry_over::CarryOverStore;
use crate::engine::MatrixGame;

/// Terminal input the game reacts to
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Input {
    Key(KeyEvent),
    Resize,
}

/// One pass of the main loop
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Step {
    /// Wall time since the previous pass
    pub elapsed: Duration,
    /// Input that ended the wait, `None` when the frame interval ran out
    pub input: Option<Input>,
}

pub trait InputSource {
    /// Wait up to `timeout` for the next input
    fn next_within(&self, timeout: Duration) -> Option<Input>;
}

/// Channels feed scripted input in tests and headless runs
impl InputSource for Receiver<Input> {
    fn next_within(&self, timeout: Duration) -> Option<Input> {
        match self.recv_timeout(timeout) {
            Ok(input) => Some(input),
            Err(RecvTimeoutError::Timeout) => None,
            // nothing will ever arrive; still pace the loop
            Err(RecvTimeoutError::Disconnected) => {
                std::thread::sleep(timeout);
                None
            }
        }
    }
}

/// Keyboard and resize events read from the terminal on a background thread
pub struct TerminalInput {
    rx: Receiver<Input>,
}

impl TerminalInput {
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let input = match event::read() {
                // Windows reports both press and release
                Ok(Event::Key(key)) if key.kind != KeyEventKind::Release => Input::Key(key),
                Ok(Event::Resize(_, _)) => Input::Resize,
                Ok(_) => continue,
                Err(_) => break,
            };
            if tx.send(input).is_err() {
                break;
            }
        });

        Self { rx }
    }
}

impl InputSource for TerminalInput {
    fn next_within(&self, timeout: Duration) -> Option<Input> {
        self.rx.next_within(timeout)
    }
}

/// Paces the main loop and turns wall time into game time.
///
/// Each step waits for input for at most one frame, so the game clock keeps
/// moving while the player is idle.
pub struct Runner<I> {
    input: I,
    frame: Duration,
    last_step: Instant,
}

impl<I: InputSource> Runner<I> {
    pub fn new(input: I, frame: Duration) -> Self {
        Self {
            input,
            frame,
            last_step: Instant::now(),
        }
    }

    pub fn step(&mut self) -> Step {
        let input = self.input.next_within(self.frame);
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_step);
        self.last_step = now;
        Step { elapsed, input }
    }

    /// Move `game` forward by the wall time of one step, then hand back the
    /// input for the host to route. Deadlines are handled before the input,
    /// so a pick is judged against the stage the player was looking at once
    /// time caught up.
    pub fn drive<S: CarryOverStore, R: Rng>(&mut self, game: &mut MatrixGame<S, R>) -> Option<Input> {
        let step = self.step();
        game.advance(step.elapsed);
        step.input
    }
}
