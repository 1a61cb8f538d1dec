use std::fmt;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, trace, warn};

use crate::carry_over::{CarryOverStore, InMemoryCarryOver};
use crate::clock::{ClockEvent, FiredTimer, TrialClock};
use crate::pattern;
use crate::session::{Phase, Pick, SessionState, Stage, TrialRecord};
use crate::settings::GameSettings;
use crate::snapshot::Snapshot;

/// The spatial-recall game: a run of timed trials whose grid and pattern
/// size adapt to the player's mistakes.
///
/// All input and clock events are handled to completion one at a time.
/// Time only moves when the host calls [`MatrixGame::advance`].
pub struct MatrixGame<S = InMemoryCarryOver, R = StdRng> {
    settings: GameSettings,
    store: S,
    rng: R,
    clock: TrialClock,
    state: SessionState,
    on_exit: Option<Box<dyn FnMut()>>,
}

impl MatrixGame {
    pub fn new(settings: GameSettings) -> Self {
        Self::with_parts(settings, InMemoryCarryOver::new(), StdRng::from_entropy())
    }

    /// Game with reproducible patterns
    pub fn seeded(settings: GameSettings, seed: u64) -> Self {
        Self::with_parts(settings, InMemoryCarryOver::new(), StdRng::seed_from_u64(seed))
    }
}

impl<S: CarryOverStore, R: Rng> MatrixGame<S, R> {
    pub fn with_parts(settings: GameSettings, store: S, rng: R) -> Self {
        let opening = opening_target(&settings, &store);
        Self {
            settings,
            store,
            rng,
            clock: TrialClock::new(),
            state: SessionState::idle(0, opening),
            on_exit: None,
        }
    }

    /// Called by [`MatrixGame::quit`] to hand control back to the host
    pub fn set_on_exit<F: FnMut() + 'static>(&mut self, on_exit: F) {
        self.on_exit = Some(Box::new(on_exit));
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clock(&self) -> &TrialClock {
        &self.clock
    }

    pub fn current_trial(&self) -> Option<&TrialRecord> {
        self.state.current_trial.as_ref()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.state, &self.settings, &self.clock)
    }

    /// Begin a session from the instructions screen or after a finished one
    pub fn start(&mut self) -> bool {
        match self.state.phase {
            Phase::Instructions | Phase::Finished => {
                self.begin_session();
                true
            }
            _ => false,
        }
    }

    /// Throw the live session away and begin a new one. Carry-over is not
    /// written for the abandoned session.
    pub fn restart(&mut self) -> bool {
        if !self.state.in_session() {
            return false;
        }
        self.begin_session();
        true
    }

    /// Tear the session down without recording carry-over, then notify the host
    pub fn quit(&mut self) {
        self.clock.cancel_all();
        let session_id = self.state.session_id + 1;
        info!(
            session_id = self.state.session_id,
            phase = self.state.phase.label(),
            trial = self.state.trial_number,
            score = self.state.score,
            "session quit"
        );
        self.state = SessionState::idle(session_id, opening_target(&self.settings, &self.store));

        if let Some(on_exit) = self.on_exit.as_mut() {
            on_exit();
        }
    }

    pub fn pause(&mut self) -> bool {
        let Phase::Running(stage) = self.state.phase else {
            return false;
        };
        self.clock.cancel_all();
        self.set_phase(Phase::Paused {
            suspended: Some(stage),
            help: false,
        });
        true
    }

    /// Leave the pause menu for the stage it suspended, or close the
    /// how-to-play overlay back to the pause menu.
    pub fn resume(&mut self) -> bool {
        match self.state.phase {
            Phase::Paused {
                suspended,
                help: true,
            } => {
                self.set_phase(Phase::Paused {
                    suspended,
                    help: false,
                });
                true
            }
            Phase::Paused {
                suspended,
                help: false,
            } => {
                let stage = suspended.unwrap_or(Stage::Waiting);
                self.set_phase(Phase::Running(stage));
                self.schedule_stage(stage);
                true
            }
            _ => false,
        }
    }

    /// Open the how-to-play overlay from the pause menu
    pub fn show_help(&mut self) -> bool {
        match self.state.phase {
            Phase::Paused {
                suspended,
                help: false,
            } => {
                self.set_phase(Phase::Paused {
                    suspended,
                    help: true,
                });
                true
            }
            _ => false,
        }
    }

    /// Pick a cell while the game is waiting for input.
    ///
    /// Anything else (wrong phase, resolved cell, off the board) is a no-op.
    pub fn select_cell(&mut self, index: usize) -> Pick {
        if self.state.phase != Phase::Running(Stage::Waiting) {
            return Pick::Ignored;
        }
        let Some(trial) = self.state.current_trial.as_mut() else {
            return Pick::Ignored;
        };

        if index >= trial.grid.cells() {
            warn!(index, grid = %trial.grid, "pick outside the grid ignored");
            return Pick::Ignored;
        }

        let pick = trial.pick(index);
        trace!(index, ?pick, "cell picked");
        if pick != Pick::Ignored && trial.is_complete() {
            self.enter_feedback();
        }
        pick
    }

    /// Move time forward, handling every deadline that falls inside `elapsed`
    pub fn advance(&mut self, elapsed: Duration) {
        let until = self.clock.now() + elapsed;
        while let Some(fired) = self.clock.pop_due(until) {
            self.on_timer(fired);
        }
        self.clock.settle(until);
    }

    fn on_timer(&mut self, fired: FiredTimer) {
        if fired.session_id != self.state.session_id {
            trace!(
                event = ?fired.event,
                timer_session = fired.session_id,
                session_id = self.state.session_id,
                "stale timer dropped"
            );
            return;
        }

        match (fired.event, self.state.phase) {
            (ClockEvent::CountdownTick, Phase::Running(Stage::GetReady)) => self.on_countdown_tick(),
            (ClockEvent::DisplayElapsed, Phase::Running(Stage::Showing)) => {
                self.set_phase(Phase::Running(Stage::Waiting));
            }
            (ClockEvent::FeedbackElapsed, Phase::Running(Stage::Feedback)) => self.finish_trial(),
            (event, phase) => {
                trace!(?event, phase = phase.label(), "timer does not match phase, dropped");
            }
        }
    }

    fn begin_session(&mut self) {
        self.clock.cancel_all();

        let difficulty = &self.settings.difficulty;
        let grid = difficulty.grid(0);
        let opening = difficulty.clamp_target(
            difficulty.opening_target(self.store.last_target()),
            grid,
        );

        // the phase is left as is until the first trial moves it to get-ready
        let session_id = self.state.session_id + 1;
        self.state = SessionState {
            phase: self.state.phase,
            score: 0,
            trial_number: 1,
            grid_level: 0,
            target_size: opening,
            countdown: 0,
            current_trial: None,
            session_id,
        };
        info!(
            session_id,
            carried = ?self.store.last_target(),
            target_size = opening,
            "session started"
        );

        self.begin_trial();
    }

    fn begin_trial(&mut self) {
        let grid = self.settings.difficulty.grid(self.state.grid_level);
        let pattern = pattern::generate(self.state.target_size, grid, &mut self.rng);
        debug!(
            trial = self.state.trial_number,
            %grid,
            target_size = self.state.target_size,
            "trial prepared"
        );
        self.state.current_trial = Some(TrialRecord::new(self.state.trial_number, grid, pattern));

        self.state.countdown = self.settings.timing.countdown_ticks;
        self.set_phase(Phase::Running(Stage::GetReady));
        self.schedule_stage(Stage::GetReady);
    }

    fn on_countdown_tick(&mut self) {
        self.state.countdown = self.state.countdown.saturating_sub(1);
        if self.state.countdown > 0 {
            self.schedule_stage(Stage::GetReady);
            return;
        }

        if let Some(trial) = self.state.current_trial.as_mut() {
            trial.clear_selections();
        }
        self.set_phase(Phase::Running(Stage::Showing));
        self.schedule_stage(Stage::Showing);
    }

    fn enter_feedback(&mut self) {
        let scoring = self.settings.scoring;
        let Some(trial) = self.state.current_trial.as_mut() else {
            return;
        };

        let points = scoring.trial_score(trial.correct.len(), trial.mistakes(), trial.target_size);
        trial.score = Some(points);
        self.state.score = self.state.score.saturating_add(points);
        debug!(
            trial = trial.trial_number,
            correct = trial.correct.len(),
            mistakes = trial.mistakes(),
            points,
            total = self.state.score,
            "trial scored"
        );

        self.set_phase(Phase::Running(Stage::Feedback));
        self.schedule_stage(Stage::Feedback);
    }

    fn finish_trial(&mut self) {
        if self.state.trial_number >= self.settings.total_trials {
            self.store.set_last_target(self.state.target_size);
            self.set_phase(Phase::Finished);
            info!(
                session_id = self.state.session_id,
                score = self.state.score,
                final_target = self.state.target_size,
                "session finished"
            );
            return;
        }

        let mistakes = self
            .state
            .current_trial
            .as_ref()
            .map_or(0, TrialRecord::mistakes);
        let step = self.settings.difficulty.advance(
            self.state.grid_level,
            self.state.target_size,
            mistakes,
        );

        self.state.grid_level = step.grid_level;
        self.state.target_size = step.target_size;
        self.state.trial_number += 1;
        self.begin_trial();
    }

    /// Arm the deadline that ends `stage`; waiting has none
    fn schedule_stage(&mut self, stage: Stage) {
        let timing = self.settings.timing;
        let (after, event) = match stage {
            Stage::GetReady => (timing.countdown_tick, ClockEvent::CountdownTick),
            Stage::Showing => (timing.display, ClockEvent::DisplayElapsed),
            Stage::Feedback => (timing.feedback, ClockEvent::FeedbackElapsed),
            Stage::Waiting => return,
        };
        self.clock.schedule(after, event, self.state.session_id);
    }

    fn set_phase(&mut self, phase: Phase) {
        debug!(
            from = self.state.phase.label(),
            to = phase.label(),
            trial = self.state.trial_number,
            "phase change"
        );
        self.state.phase = phase;
    }
}

fn opening_target<S: CarryOverStore>(settings: &GameSettings, store: &S) -> usize {
    let difficulty = &settings.difficulty;
    difficulty.clamp_target(difficulty.opening_target(store.last_target()), difficulty.grid(0))
}

impl<S: fmt::Debug, R> fmt::Debug for MatrixGame<S, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatrixGame")
            .field("settings", &self.settings)
            .field("store", &self.store)
            .field("clock", &self.clock)
            .field("state", &self.state)
            .field("on_exit", &self.on_exit.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridProgression;
    use crate::scoring::Scoring;
    use crate::settings::Timing;
    use assert_matches::assert_matches;
    use std::cell::Cell;
    use std::rc::Rc;

    const COUNTDOWN: Duration = Duration::from_millis(3000);
    const DISPLAY: Duration = Duration::from_millis(1500);
    const FEEDBACK: Duration = Duration::from_millis(2000);

    fn game() -> MatrixGame {
        MatrixGame::seeded(GameSettings::default(), 11)
    }

    fn small_settings(total_trials: u32) -> GameSettings {
        GameSettings::new(
            GridProgression::from_dimensions(&[(2, 2), (3, 2), (3, 3)]).unwrap(),
            3,
            3,
            3,
            Scoring::default(),
            Timing::default(),
            total_trials,
        )
        .unwrap()
    }

    fn to_waiting<S: CarryOverStore, R: Rng>(game: &mut MatrixGame<S, R>) {
        game.advance(COUNTDOWN);
        assert_eq!(game.phase(), Phase::Running(Stage::Showing));
        game.advance(DISPLAY);
        assert_eq!(game.phase(), Phase::Running(Stage::Waiting));
    }

    fn pattern_cells<S: CarryOverStore, R: Rng>(game: &MatrixGame<S, R>) -> Vec<usize> {
        game.current_trial().unwrap().pattern.cells().collect()
    }

    fn wrong_cells<S: CarryOverStore, R: Rng>(game: &MatrixGame<S, R>) -> Vec<usize> {
        let trial = game.current_trial().unwrap();
        (0..trial.grid.cells())
            .filter(|c| !trial.pattern.contains(*c))
            .collect()
    }

    fn play_perfect<S: CarryOverStore, R: Rng>(game: &mut MatrixGame<S, R>) {
        to_waiting(game);
        for cell in pattern_cells(game) {
            assert_eq!(game.select_cell(cell), Pick::Correct);
        }
        assert_eq!(game.phase(), Phase::Running(Stage::Feedback));
        game.advance(FEEDBACK);
    }

    #[test]
    fn test_new_game_waits_on_instructions() {
        let game = game();
        assert_eq!(game.phase(), Phase::Instructions);
        assert!(game.current_trial().is_none());
        assert_eq!(game.clock().pending(), 0);
        assert_eq!(game.state().target_size, 3);
    }

    #[test]
    fn test_start_enters_get_ready() {
        let mut game = game();

        assert!(game.start());

        let state = game.state();
        assert_eq!(state.phase, Phase::Running(Stage::GetReady));
        assert_eq!(state.score, 0);
        assert_eq!(state.trial_number, 1);
        assert_eq!(state.grid_level, 0);
        assert_eq!(state.countdown, 3);
        assert_eq!(state.target_size, 3);
        assert_eq!(game.current_trial().unwrap().pattern.len(), 3);
        assert_eq!(game.clock().pending(), 1);
    }

    #[test]
    fn test_start_ignored_mid_session() {
        let mut game = game();
        game.start();
        assert!(!game.start());
    }

    #[test]
    fn test_countdown_ticks_once_per_second() {
        let mut game = game();
        game.start();

        game.advance(Duration::from_millis(999));
        assert_eq!(game.state().countdown, 3);
        game.advance(Duration::from_millis(1));
        assert_eq!(game.state().countdown, 2);
        game.advance(Duration::from_millis(1000));
        assert_eq!(game.state().countdown, 1);
        assert_eq!(game.phase(), Phase::Running(Stage::GetReady));
        game.advance(Duration::from_millis(1000));
        assert_eq!(game.state().countdown, 0);
        assert_eq!(game.phase(), Phase::Running(Stage::Showing));
    }

    #[test]
    fn test_one_large_advance_runs_every_deadline() {
        let mut game = game();
        game.start();

        game.advance(COUNTDOWN + DISPLAY);

        assert_eq!(game.phase(), Phase::Running(Stage::Waiting));
        assert_eq!(game.clock().pending(), 0);
    }

    #[test]
    fn test_input_ignored_outside_waiting() {
        let mut game = game();
        assert_eq!(game.select_cell(0), Pick::Ignored);

        game.start();
        assert_eq!(game.select_cell(0), Pick::Ignored);

        game.advance(COUNTDOWN);
        assert_eq!(game.phase(), Phase::Running(Stage::Showing));
        for cell in 0..4 {
            assert_eq!(game.select_cell(cell), Pick::Ignored);
        }
        assert_eq!(game.current_trial().unwrap().resolved(), 0);
    }

    #[test]
    fn test_off_grid_pick_ignored() {
        let mut game = game();
        game.start();
        to_waiting(&mut game);

        assert_eq!(game.select_cell(4), Pick::Ignored);
        assert_eq!(game.current_trial().unwrap().resolved(), 0);
    }

    #[test]
    fn test_resolved_cells_are_terminal() {
        let mut game = game();
        game.start();
        to_waiting(&mut game);

        let wrong = wrong_cells(&game)[0];
        assert_eq!(game.select_cell(wrong), Pick::Incorrect);
        assert_eq!(game.select_cell(wrong), Pick::Ignored);

        let right = pattern_cells(&game)[0];
        assert_eq!(game.select_cell(right), Pick::Correct);
        assert_eq!(game.select_cell(right), Pick::Ignored);

        assert_eq!(game.current_trial().unwrap().resolved(), 2);
        assert_eq!(game.phase(), Phase::Running(Stage::Waiting));
    }

    #[test]
    fn test_feedback_after_target_size_picks_even_if_wrong() {
        let mut game = game();
        game.start();
        to_waiting(&mut game);

        // 2x2 with 3 pattern cells has exactly one wrong cell
        let wrong = wrong_cells(&game)[0];
        let right = pattern_cells(&game);
        game.select_cell(wrong);
        game.select_cell(right[0]);
        game.select_cell(right[1]);

        assert_eq!(game.phase(), Phase::Running(Stage::Feedback));
        let trial = game.current_trial().unwrap();
        assert_eq!(trial.score, Some(500));
        assert_eq!(game.state().score, 500);
    }

    #[test]
    fn test_perfect_trial_grows_grid() {
        let mut game = game();
        game.start();

        play_perfect(&mut game);

        let state = game.state();
        assert_eq!(state.score, 3 * 250 + 3 * 100);
        assert_eq!(state.trial_number, 2);
        assert_eq!(state.grid_level, 1);
        // 3x2 grid, shorter side 2
        assert_eq!(state.target_size, 3);
        assert_eq!(state.phase, Phase::Running(Stage::GetReady));
        assert_eq!(game.current_trial().unwrap().grid.cells(), 6);
    }

    #[test]
    fn test_pause_cancels_timers_and_freezes_time() {
        let mut game = game();
        game.start();
        game.advance(COUNTDOWN);

        assert!(game.pause());
        assert_eq!(game.clock().pending(), 0);
        assert_eq!(
            game.phase(),
            Phase::Paused {
                suspended: Some(Stage::Showing),
                help: false
            }
        );

        game.advance(Duration::from_secs(60));
        assert!(game.phase().is_paused());
    }

    #[test]
    fn test_pause_only_from_running() {
        let mut game = game();
        assert!(!game.pause());
        game.start();
        assert!(game.pause());
        assert!(!game.pause());
    }

    #[test]
    fn test_resume_showing_keeps_pattern() {
        let mut game = game();
        game.start();
        game.advance(COUNTDOWN + Duration::from_millis(700));
        let before = game.current_trial().unwrap().clone();

        game.pause();
        assert!(game.resume());

        assert_eq!(game.phase(), Phase::Running(Stage::Showing));
        assert_eq!(game.current_trial().unwrap(), &before);
        // Fresh full display window after resuming
        game.advance(DISPLAY - Duration::from_millis(1));
        assert_eq!(game.phase(), Phase::Running(Stage::Showing));
        game.advance(Duration::from_millis(1));
        assert_eq!(game.phase(), Phase::Running(Stage::Waiting));
    }

    #[test]
    fn test_resume_waiting_keeps_selections() {
        let mut game = game();
        game.start();
        to_waiting(&mut game);
        let wrong = wrong_cells(&game)[0];
        let right = pattern_cells(&game)[0];
        game.select_cell(wrong);
        game.select_cell(right);
        let before = game.current_trial().unwrap().clone();

        game.pause();
        assert_eq!(game.select_cell(pattern_cells(&game)[1]), Pick::Ignored);
        game.resume();

        assert_eq!(game.phase(), Phase::Running(Stage::Waiting));
        let after = game.current_trial().unwrap();
        assert_eq!(after.correct, before.correct);
        assert_eq!(after.incorrect, before.incorrect);
        assert_eq!(game.clock().pending(), 0);
    }

    #[test]
    fn test_resume_get_ready_keeps_countdown() {
        let mut game = game();
        game.start();
        game.advance(Duration::from_millis(1500));
        assert_eq!(game.state().countdown, 2);

        game.pause();
        game.resume();

        assert_eq!(game.state().countdown, 2);
        game.advance(Duration::from_millis(1000));
        assert_eq!(game.state().countdown, 1);
    }

    #[test]
    fn test_resume_feedback_does_not_rescore() {
        let mut game = game();
        game.start();
        to_waiting(&mut game);
        for cell in pattern_cells(&game) {
            game.select_cell(cell);
        }
        let score = game.state().score;

        game.pause();
        game.resume();
        assert_eq!(game.phase(), Phase::Running(Stage::Feedback));
        assert_eq!(game.state().score, score);

        game.advance(FEEDBACK);
        assert_eq!(game.state().trial_number, 2);
        assert_eq!(game.state().score, score);
    }

    #[test]
    fn test_resume_without_suspended_stage_falls_back_to_waiting() {
        let mut game = game();
        game.start();
        game.state.phase = Phase::Paused {
            suspended: None,
            help: false,
        };

        assert!(game.resume());
        assert_eq!(game.phase(), Phase::Running(Stage::Waiting));
    }

    #[test]
    fn test_resume_outside_pause_is_noop() {
        let mut game = game();
        assert!(!game.resume());
        game.start();
        assert!(!game.resume());
        assert_eq!(game.phase(), Phase::Running(Stage::GetReady));
    }

    #[test]
    fn test_help_overlay_returns_to_pause_menu() {
        let mut game = game();
        game.start();
        game.advance(COUNTDOWN);
        game.pause();

        assert!(game.show_help());
        assert_eq!(game.phase().label(), "help");
        assert!(!game.show_help());

        assert!(game.resume());
        assert_eq!(
            game.phase(),
            Phase::Paused {
                suspended: Some(Stage::Showing),
                help: false
            }
        );
        assert!(game.resume());
        assert_eq!(game.phase(), Phase::Running(Stage::Showing));
    }

    #[test]
    fn test_restart_drops_stale_timers() {
        let mut game = game();
        game.start();
        game.advance(Duration::from_millis(2500));
        let old_session = game.state().session_id;

        assert!(game.restart());

        assert_ne!(game.state().session_id, old_session);
        assert_eq!(game.state().countdown, 3);
        assert_eq!(game.clock().pending(), 1);
        // The old session's tick would have fired at 3000ms
        game.advance(Duration::from_millis(600));
        assert_eq!(game.state().countdown, 3);
        assert_eq!(game.phase(), Phase::Running(Stage::GetReady));
    }

    #[test]
    fn test_stale_timer_from_previous_session_is_dropped() {
        let mut game = game();
        game.start();
        let stale_session = game.state().session_id;
        game.restart();

        // Simulate a timer that escaped cancellation
        game.clock
            .schedule(Duration::ZERO, ClockEvent::CountdownTick, stale_session);
        game.advance(Duration::ZERO);

        assert_eq!(game.state().countdown, 3);
    }

    #[test]
    fn test_restart_logs_transition_from_live_phase() {
        use std::io;
        use std::sync::{Arc, Mutex};

        #[derive(Clone, Default)]
        struct Captured(Arc<Mutex<Vec<u8>>>);

        impl io::Write for Captured {
            fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(bytes);
                Ok(bytes.len())
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mut game = game();
        game.start();
        to_waiting(&mut game);
        game.pause();

        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            game.restart();
        });

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        let transitions: Vec<_> = output
            .lines()
            .filter(|line| line.contains("phase change"))
            .collect();
        assert_eq!(transitions.len(), 1, "{output}");
        assert!(transitions[0].contains("paused"), "{output}");
        assert!(transitions[0].contains("get-ready"), "{output}");
        assert!(!output.contains("instructions"), "{output}");
    }

    #[test]
    fn test_restart_requires_session() {
        let mut game = game();
        assert!(!game.restart());
    }

    #[test]
    fn test_restart_from_pause() {
        let mut game = game();
        game.start();
        to_waiting(&mut game);
        game.select_cell(pattern_cells(&game)[0]);
        game.pause();

        assert!(game.restart());

        assert_eq!(game.phase(), Phase::Running(Stage::GetReady));
        assert_eq!(game.state().score, 0);
        assert_eq!(game.current_trial().unwrap().resolved(), 0);
    }

    #[test]
    fn test_quit_tears_down_and_calls_host() {
        let exits = Rc::new(Cell::new(0));
        let mut game = game();
        let counter = exits.clone();
        game.set_on_exit(move || counter.set(counter.get() + 1));
        game.start();
        game.advance(COUNTDOWN);
        game.pause();

        game.quit();

        assert_eq!(exits.get(), 1);
        assert_eq!(game.phase(), Phase::Instructions);
        assert!(game.current_trial().is_none());
        assert_eq!(game.clock().pending(), 0);
        assert_eq!(game.store().last_target(), None);
    }

    #[test]
    fn test_quit_does_not_record_carry_over() {
        let mut game = MatrixGame::with_parts(
            small_settings(3),
            InMemoryCarryOver::new(),
            StdRng::seed_from_u64(3),
        );
        game.start();
        for _ in 0..3 {
            play_perfect(&mut game);
        }
        assert_eq!(game.phase(), Phase::Finished);
        // 3x3 grid reached on the last trial, target re-baselined to 4
        assert_eq!(game.store().last_target(), Some(4));

        game.start();
        assert_eq!(game.state().target_size, 3);
        play_perfect(&mut game);
        to_waiting(&mut game);
        game.quit();

        assert_eq!(game.store().last_target(), Some(4));
    }

    #[test]
    fn test_finished_session_records_carry_over() {
        let mut game = MatrixGame::with_parts(
            small_settings(2),
            InMemoryCarryOver::new(),
            StdRng::seed_from_u64(5),
        );
        game.start();
        play_perfect(&mut game);
        play_perfect(&mut game);

        assert_eq!(game.phase(), Phase::Finished);
        assert_eq!(game.store().last_target(), Some(game.state().target_size));
        assert_eq!(game.clock().pending(), 0);
        assert!(game.restart());
    }

    #[test]
    fn test_session_score_saturates() {
        let settings = GameSettings::new(
            GridProgression::from_dimensions(&[(2, 2), (3, 2), (3, 3)]).unwrap(),
            3,
            3,
            3,
            Scoring {
                points_per_cell: u32::MAX / 4,
                bonus_per_cell: u32::MAX / 4,
            },
            Timing::default(),
            3,
        )
        .unwrap();
        let mut game =
            MatrixGame::with_parts(settings, InMemoryCarryOver::new(), StdRng::seed_from_u64(2));
        game.start();

        play_perfect(&mut game);
        assert_eq!(game.state().score, u32::MAX);
        play_perfect(&mut game);
        assert_eq!(game.state().score, u32::MAX);
        assert_eq!(game.state().trial_number, 3);
    }

    #[test]
    fn test_carry_over_opens_three_lower() {
        let settings = GameSettings::new(
            GridProgression::from_dimensions(&[(3, 3), (4, 4)]).unwrap(),
            3,
            3,
            3,
            Scoring::default(),
            Timing::default(),
            1,
        )
        .unwrap();
        let mut game = MatrixGame::with_parts(
            settings,
            InMemoryCarryOver::with_last_target(9),
            StdRng::seed_from_u64(8),
        );

        game.start();

        assert_eq!(game.state().target_size, 6);
        assert_eq!(game.current_trial().unwrap().pattern.len(), 6);
    }

    #[test]
    fn test_carry_over_clamped_to_first_grid() {
        let mut game = MatrixGame::with_parts(
            GameSettings::default(),
            InMemoryCarryOver::with_last_target(12),
            StdRng::seed_from_u64(8),
        );

        game.start();

        assert_eq!(game.state().target_size, 4);
        assert_eq!(game.current_trial().unwrap().pattern.len(), 4);
    }

    #[test]
    fn test_snapshot_tracks_phase() {
        let mut game = game();
        game.start();
        assert_eq!(game.snapshot().phase, Phase::Running(Stage::GetReady));
        assert_matches!(game.snapshot().countdown, 3);

        game.advance(COUNTDOWN + Duration::from_millis(500));
        assert_eq!(game.snapshot().display_left, Some(DISPLAY - Duration::from_millis(500)));
        game.advance(DISPLAY);
        assert_eq!(game.snapshot().display_left, None);
    }

    #[test]
    fn test_debug_output() {
        let game = game();
        let debug = format!("{game:?}");
        assert!(debug.contains("MatrixGame"));
        assert!(debug.contains("on_exit: false"));
    }
}
