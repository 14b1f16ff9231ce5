use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use rand::{rngs::StdRng, SeedableRng};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin, Write},
    path::Path,
    sync::Arc,
    time::Instant,
};

use elifba::{
    alphabet::LetterPool,
    app::{App, AppAction},
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    difficulty::Difficulty,
    error::GameError,
    game::{BestScore, Game},
    haptics::{Haptics, NoHaptics, TerminalBell},
    logging,
    runtime::{CrosstermEventSource, FixedTicker, GameEvent, Runner},
    speech::{CommandSpeech, Narrator},
};

/// learn to recognise the Arabic alphabet in your terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal quiz that shows the transliteration of an Arabic letter, speaks it aloud and asks you to pick the matching glyph, with combos, time limits and star ratings."
)]
pub struct Cli {
    /// skip the menu and start at this difficulty
    #[clap(short = 'd', long, value_enum)]
    difficulty: Option<Difficulty>,

    /// start with sound off
    #[clap(short = 'm', long)]
    mute: bool,

    /// disable the terminal bell used for vibration feedback
    #[clap(long)]
    no_haptics: bool,

    /// text-to-speech program taking espeak-ng style flags
    #[clap(long)]
    speech_command: Option<String>,

    /// seed for letter order and option shuffles
    #[clap(long)]
    seed: Option<u64>,

    /// print the letter pool and exit
    #[clap(long)]
    list_letters: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if cli.list_letters {
        let pool = LetterPool::builtin()?;
        print_letters(&mut io::stdout().lock(), &pool)?;
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    setup_logging(AppDirs::log_path().as_deref(), &mut io::stderr());

    let store = FileConfigStore::new();
    let mut app = build_app(&cli, store.load(), Instant::now())?;

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    if let Err(e) = store.save(&app.to_config()) {
        log::warn!("could not save config to {}: {e}", store.path().display());
    }

    result
}

/// Points the logger at `path`. Failures are reported on `err` now, since
/// the alternate screen hides anything printed later; the game runs without
/// logs.
fn setup_logging<W: Write>(path: Option<&Path>, err: &mut W) {
    let result = match path {
        Some(path) => logging::init(path).map_err(|e| format!("cannot open {}: {e}", path.display())),
        None => Err("no state directory".to_string()),
    };
    if let Err(reason) = result {
        let _ = writeln!(
            err,
            "elifba: logging disabled ({reason}), {} has no effect",
            logging::LOG_ENV
        );
    }
}

/// Wires the game to its collaborators. Flags override the stored config for
/// this run only; `config` is kept untouched so it can be saved back.
fn build_app(cli: &Cli, config: Config, now: Instant) -> Result<App, GameError> {
    let pool = Arc::new(LetterPool::builtin()?);

    let mut speech = config.speech.clone();
    if let Some(command) = &cli.speech_command {
        speech.command = command.clone();
    }
    let engine = CommandSpeech::new(speech.command.clone());
    let narrator = Narrator::new(
        Box::new(engine),
        speech,
        config.sound_enabled && !cli.mute,
    );

    let haptics_enabled = config.haptics && !cli.no_haptics;
    let haptics: Box<dyn Haptics> = if haptics_enabled {
        Box::new(TerminalBell)
    } else {
        Box::new(NoHaptics)
    };

    let rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut game = Game::new(pool, narrator, haptics, BestScore::default(), rng);
    game.set_haptics_enabled(haptics_enabled);

    let mut app = App::new(game, config, now);
    if let Some(difficulty) = cli.difficulty {
        app.start_game(difficulty, now);
    }
    Ok(app)
}

fn print_letters<W: Write>(out: &mut W, pool: &LetterPool) -> io::Result<()> {
    for (i, letter) in pool.letters().iter().enumerate() {
        writeln!(out, "{:>2}. {}  {}", i + 1, letter.arabic, letter.latin)?;
    }
    Ok(())
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(CrosstermEventSource::new(), FixedTicker::default());

    loop {
        terminal.draw(|f| ui(app, f))?;

        match runner.step() {
            GameEvent::Tick => app.on_tick(Instant::now()),
            GameEvent::Resize => {}
            GameEvent::Key(key) => {
                if app.on_key(key, Instant::now()) == AppAction::Quit {
                    log::info!("quitting");
                    return Ok(());
                }
            }
        }
    }
}

fn ui(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());
}
