mod term;

use std::fs::File;
use std::path::PathBuf;
use std::thread::sleep;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{error, info};
use simplelog::{Config, LevelFilter, WriteLogger};

use serpent::config::GameConfig;
use serpent::game::SnakeGame;
use term::{Command, TermManager, TermRenderer};

const POLL_INTERVAL_MS: u64 = 5;

#[derive(Parser)]
#[command(name = "serpent")]
#[command(version, about = "Snake on a 30x20 grid, in the terminal")]
struct Cli {
    /// Where to write the log, the terminal itself is taken by the game
    #[arg(long, default_value = "serpent.log")]
    log_file: PathBuf,

    #[arg(long, value_enum, default_value = "info")]
    log_level: LogLevel,
}

#[derive(Copy, Clone, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_file = File::create(&cli.log_file)
        .with_context(|| format!("Failed to create log file {}", cli.log_file.display()))?;
    WriteLogger::init(cli.log_level.into(), Config::default(), log_file)
        .context("Failed to initialize logger")?;

    let config = GameConfig::default();
    let mut renderer = TermRenderer::new(TermManager::new()?, config.grid)?;
    renderer.setup()?;

    // The terminal goes back to normal even if the game loop failed
    let result = play(&mut renderer, config);
    renderer.restore()?;

    if let Err(e) = &result {
        error!("{:#}", e);
    }
    info!("Bye");
    result
}

fn play(renderer: &mut TermRenderer, config: GameConfig) -> Result<()> {
    if !renderer.show_intro()? {
        return Ok(());
    }

    let mut game = SnakeGame::new(config);
    let inputs = game.input_sender();
    game.start(Instant::now());

    loop {
        for key_ev in renderer.term().read_key_events_queue()? {
            match term::key_command(&key_ev) {
                Some(Command::Quit) => return Ok(()),
                Some(Command::Game(input)) => inputs.send(input).context("Game stopped taking input")?,
                None => {}
            }
        }

        game.pump(renderer)?;
        sleep(Duration::from_millis(POLL_INTERVAL_MS));
    }
}
