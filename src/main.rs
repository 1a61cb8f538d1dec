mod ui;

use std::{
    cell::Cell,
    error::Error,
    io::{self, stdin, Write},
    path::PathBuf,
    rc::Rc,
    time::Duration,
};

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use matrix_recall::{
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    logging,
    runtime::{Input, Runner, TerminalInput},
    GameSettings, MatrixGame, Phase, Pick, Stage,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use tracing::info;

const TICK_RATE_MS: u64 = 50;

/// spatial memory tui: remember the flashed tiles, the grid adapts to you
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A spatial memory game for the terminal. A pattern of tiles flashes on a grid; pick the same tiles from memory. Clean rounds grow the grid and the pattern, sloppy rounds shrink them, and each new game opens a little easier than the last one ended."
)]
pub struct Cli {
    /// number of trials per game
    #[clap(short = 't', long)]
    trials: Option<u32>,

    /// milliseconds the pattern stays on screen
    #[clap(long)]
    show_ms: Option<u64>,

    /// countdown seconds before each trial
    #[clap(short = 'c', long)]
    countdown: Option<u32>,

    /// milliseconds the answer stays on screen after a trial
    #[clap(long)]
    feedback_ms: Option<u64>,

    /// seed for reproducible patterns
    #[clap(long)]
    seed: Option<u64>,

    /// config file to use instead of the platform default
    #[clap(long)]
    config: Option<PathBuf>,

    /// write the effective settings (config file plus flags) back to the config file
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    fn config_store(&self) -> FileConfigStore {
        match &self.config {
            Some(path) => FileConfigStore::with_path(path),
            None => FileConfigStore::new(),
        }
    }

    /// Flags win over whatever the config file says
    fn apply(&self, mut cfg: Config) -> Config {
        if let Some(trials) = self.trials {
            cfg.total_trials = trials;
        }
        if let Some(show_ms) = self.show_ms {
            cfg.show_duration_ms = show_ms;
        }
        if let Some(countdown) = self.countdown {
            cfg.countdown_ticks = countdown;
        }
        if let Some(feedback_ms) = self.feedback_ms {
            cfg.feedback_delay_ms = feedback_ms;
        }
        cfg
    }
}

#[derive(Debug)]
pub struct App {
    pub game: MatrixGame,
    /// Cell under the keyboard cursor, as (row, col)
    pub cursor: (usize, usize),
    pub sound: bool,
    bell: bool,
    exit: Rc<Cell<bool>>,
}

impl App {
    pub fn new(settings: GameSettings, seed: Option<u64>) -> Self {
        let mut game = match seed {
            Some(seed) => MatrixGame::seeded(settings, seed),
            None => MatrixGame::new(settings),
        };

        let exit = Rc::new(Cell::new(false));
        let flag = exit.clone();
        game.set_on_exit(move || flag.set(true));

        Self {
            game,
            cursor: (0, 0),
            sound: true,
            bell: false,
            exit,
        }
    }

    pub fn should_exit(&self) -> bool {
        self.exit.get()
    }

    /// Whether a bell is owed for a wrong pick since the last call
    pub fn take_bell(&mut self) -> bool {
        std::mem::take(&mut self.bell)
    }

    /// Cursor index clamped to the grid currently on screen
    pub fn cursor_index(&self) -> usize {
        let grid = self.game.snapshot().grid;
        grid.index(
            self.cursor.0.min(grid.rows - 1),
            self.cursor.1.min(grid.cols - 1),
        )
        .unwrap_or_default()
    }

    fn move_cursor(&mut self, d_row: isize, d_col: isize) {
        let grid = self.game.snapshot().grid;
        let row = self.cursor.0.min(grid.rows - 1) as isize + d_row;
        let col = self.cursor.1.min(grid.cols - 1) as isize + d_col;
        self.cursor = (
            row.clamp(0, grid.rows as isize - 1) as usize,
            col.clamp(0, grid.cols as isize - 1) as usize,
        );
    }

    fn select(&mut self) {
        if self.game.select_cell(self.cursor_index()) == Pick::Incorrect && self.sound {
            self.bell = true;
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Esc
            || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c'))
        {
            self.game.quit();
            return;
        }

        match self.game.phase() {
            Phase::Instructions | Phase::Finished => match key.code {
                KeyCode::Char('s') | KeyCode::Char('n') | KeyCode::Enter => {
                    self.game.start();
                }
                KeyCode::Char('q') => self.game.quit(),
                _ => {}
            },
            Phase::Running(stage) => match key.code {
                KeyCode::Char('p') => {
                    self.game.pause();
                }
                KeyCode::Char('q') => self.game.quit(),
                KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-1, 0),
                KeyCode::Down | KeyCode::Char('j') => self.move_cursor(1, 0),
                KeyCode::Left | KeyCode::Char('h') => self.move_cursor(0, -1),
                KeyCode::Right | KeyCode::Char('l') => self.move_cursor(0, 1),
                KeyCode::Enter | KeyCode::Char(' ') if stage == Stage::Waiting => self.select(),
                _ => {}
            },
            Phase::Paused { help: true, .. } => match key.code {
                KeyCode::Char('r') | KeyCode::Char('b') | KeyCode::Enter | KeyCode::Backspace => {
                    self.game.resume();
                }
                KeyCode::Char('q') => self.game.quit(),
                _ => {}
            },
            Phase::Paused { help: false, .. } => match key.code {
                KeyCode::Char('r') | KeyCode::Char('p') | KeyCode::Enter => {
                    self.game.resume();
                }
                KeyCode::Char('n') => {
                    self.game.restart();
                }
                KeyCode::Char('?') => {
                    self.game.show_help();
                }
                KeyCode::Char('m') => self.sound = !self.sound,
                KeyCode::Char('q') => self.game.quit(),
                _ => {}
            },
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let store = cli.config_store();
    let config = cli.apply(store.load());
    let settings = match config.settings() {
        Ok(settings) => settings,
        Err(err) => {
            let mut cmd = Cli::command();
            let detail = match err.source() {
                Some(source) => format!("{err}: {source}"),
                None => err.to_string(),
            };
            cmd.error(ErrorKind::InvalidValue, detail).exit();
        }
    };

    if cli.save_config {
        store.save(&config)?;
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    // Logging is best effort; the game runs without it
    let _log_guard = AppDirs::log_dir().and_then(|dir| logging::init(&dir).ok());
    info!(
        trials = settings.total_trials,
        seed = ?cli.seed,
        config = %store.path().display(),
        "starting"
    );

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(settings, cli.seed);
    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let mut runner = Runner::new(TerminalInput::spawn(), Duration::from_millis(TICK_RATE_MS));

    loop {
        terminal.draw(|f| ui(app, f))?;

        match runner.drive(&mut app.game) {
            Some(Input::Key(key)) => app.on_key(key),
            Some(Input::Resize) | None => {}
        }

        if app.take_bell() {
            let mut out = io::stdout();
            out.write_all(b"\x07")?;
            out.flush()?;
        }

        if app.should_exit() {
            break;
        }
    }

    Ok(())
}

fn ui(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());
}
