use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{error, info};
use ratatui::prelude::*;
use simplelog::{Config, LevelFilter, WriteLogger};
use std::error::Error;
use std::fs::File;
use std::io;
use std::time::Instant;

mod config;
mod game;
mod grid;
mod placement;
mod render;

use config::GameConfig;
use game::Game;

fn main() -> Result<(), Box<dyn Error>> {
    // Set up logging before anything else
    WriteLogger::init(
        LevelFilter::Info,
        Config::default(),
        File::create("ouros.log")?,
    )
    .expect("Failed to initialize logger");

    // `--plain` selects the bare rule set: no start/game-over screens,
    // obstacles allowed on the border.
    let config = if std::env::args().any(|arg| arg == "--plain") {
        GameConfig::plain()
    } else {
        GameConfig::classic()
    };
    info!("Starting Ouros (screens: {})", config.screens);

    // An arena that cannot be populated is a configuration error; catch it
    // before touching the terminal.
    let mut game = match Game::new(config) {
        Ok(game) => game,
        Err(e) => {
            error!("Configuration does not fit the grid: {e}");
            return Err(e.into());
        }
    };

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut game);

    // Cleanup terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        error!("Fatal: {e}");
    }
    result
}

/// The scheduler: keyboard events are handled as they arrive, the game ticks
/// at a fixed cadence.
fn run<B: Backend>(terminal: &mut Terminal<B>, game: &mut Game) -> Result<(), Box<dyn Error>> {
    let tick_rate = game.config.tick_interval;
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| game.render(f))?;

        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                game.handle_key(key)?;
            }
        }

        if last_tick.elapsed() >= tick_rate {
            game.tick()?;
            last_tick = Instant::now();
        }

        if game.should_exit() {
            break;
        }
    }

    Ok(())
}
