use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
};

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use drillr::{
    app::App,
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    locale::Locale,
    logging,
    runtime::{AppEvent, CrosstermEventSource, FixedTicker, Runner, Stopwatch},
    storage::{FileKeyValueStore, KeyValueStore},
    store::MenuStore,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tracing::info;

/// terminal training-menu runner with timed drills and rest intervals
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Build training menus of timed drills, run them with per-item countdowns and optional auto-started rest intervals, and move menus around as CSV files."
)]
pub struct Cli {
    /// storage file holding menus, the selected menu and the language
    #[clap(long)]
    storage: Option<PathBuf>,

    /// config file to load defaults from
    #[clap(long)]
    config: Option<PathBuf>,

    /// import a menu from this CSV file before starting
    #[clap(short = 'i', long)]
    import: Option<PathBuf>,

    /// directory exported CSV files are written to
    #[clap(long)]
    export_dir: Option<PathBuf>,

    /// start the next item automatically once each interval ends
    #[clap(short = 'a', long)]
    auto_start: bool,

    /// seconds of rest between items when auto start is on
    #[clap(long)]
    interval: Option<u32>,

    /// UI language; replaces the saved choice
    #[clap(short = 'l', long, value_enum)]
    locale: Option<Locale>,

    /// directory for log files
    #[clap(long)]
    log_dir: Option<PathBuf>,
}

impl Cli {
    /// Flags win over whatever the config file says
    fn apply_to(&self, mut config: Config) -> Config {
        if self.auto_start {
            config.auto_start = true;
        }
        if let Some(secs) = self.interval {
            config.interval_secs = secs;
        }
        if let Some(dir) = &self.export_dir {
            config.export_dir = Some(dir.clone());
        }
        config
    }

    fn build_app(&self) -> App<FileKeyValueStore> {
        let config_store = self
            .config
            .as_ref()
            .map_or_else(FileConfigStore::new, FileConfigStore::with_path);
        let config = self.apply_to(config_store.load());

        let storage = self
            .storage
            .as_ref()
            .map_or_else(FileKeyValueStore::new, FileKeyValueStore::with_path);
        info!(storage = %storage.path().display(), ?config, "starting");

        let mut app = App::new(MenuStore::load(storage), config);
        if let Some(locale) = self.locale {
            app.set_locale(locale);
        }
        if let Some(path) = &self.import {
            app.import_file(path);
        }
        app
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let log_dir = cli.log_dir.clone().unwrap_or_else(AppDirs::log_dir);
    let _log_guard = logging::init(&log_dir);

    let mut app = cli.build_app();

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    info!("exiting");
    result
}

fn start_tui<B: Backend, S: KeyValueStore>(
    terminal: &mut Terminal<B>,
    app: &mut App<S>,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(CrosstermEventSource::new(), FixedTicker::default());
    let mut stopwatch = Stopwatch::new();

    while !app.should_quit {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        let event = runner.step();
        // wall time, so key presses don't stall the countdowns
        app.on_tick(stopwatch.lap());

        match event {
            AppEvent::Key(key) => app.handle_key(key),
            AppEvent::Resize | AppEvent::Tick => {}
        }
    }

    Ok(())
}
