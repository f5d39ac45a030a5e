use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use tokio::sync::mpsc;

mod app;
mod config;
mod content;
mod db;
mod error;
mod models;
mod reader;
mod tui;

use app::App;
use config::Config;
use db::{Repository, Storage};
use error::Result;
use models::Book;
use reader::{
    Catalog, CommandSpeech, Muted, Narrator, NullSpeech, SoundPlayer, SpeechBackend, TerminalBell,
};
use tui::{draw, handle_key_event, handle_mouse_event};

#[derive(Debug, Default)]
struct Args {
    reset_progress: bool,
    status: bool,
    book: Option<PathBuf>,
}

fn parse_args() -> Args {
    let mut args = Args::default();
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--reset-progress" => args.reset_progress = true,
            "--status" => args.status = true,
            "--book" => args.book = iter.next().map(PathBuf::from),
            other => tracing::warn!("Ignoring unknown argument {}", other),
        }
    }
    args
}

fn load_book(args: &Args, config: &Config) -> Result<Book> {
    let path = args
        .book
        .clone()
        .or_else(|| config.book_path.as_ref().map(PathBuf::from));
    match path {
        Some(path) => {
            tracing::info!("Loading book from {:?}", path);
            Book::from_path(Path::new(&path))
        }
        None => Book::builtin(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (only show warnings and errors by default)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args();

    // Load configuration
    let config = Config::load()?;

    let repository = Repository::new(&config.db_path).await?;

    if args.reset_progress {
        Storage::new(repository).clear_progress().await?;
        println!("Reading progress cleared");
        return Ok(());
    }

    let book = load_book(&args, &config)?;

    let (speech_tx, speech_rx) = mpsc::channel(16);
    let speech = CommandSpeech::detect(&config.speech_command, speech_tx);
    let backend: Box<dyn SpeechBackend> = match speech {
        Some(speech) => Box::new(speech),
        None => {
            tracing::warn!(
                "Speech command {:?} not found, read-aloud disabled",
                config.speech_command
            );
            Box::new(NullSpeech)
        }
    };
    let narrator = Narrator::new(
        backend,
        speech_rx,
        config.speech_lang.clone(),
        config.playback_rate,
        config.settle_delay(),
    );
    let sound: Box<dyn SoundPlayer> = if config.sound_effects {
        Box::new(TerminalBell)
    } else {
        Box::new(Muted)
    };

    // Initialize app
    let mut app = App::new(&config, book, Catalog::builtin(), repository, narrator, sound).await;

    if args.status {
        println!("{}", app.book.title);
        println!("Progresso: {}%", app.saved_percent());
        println!("Capítulo: {}", app.current_chapter_label());
        println!("Marcadores: {}", app.bookmarks.len());
        println!(
            "Artefatos: {} / {}",
            app.gamification.unlocked_count(),
            app.gamification.catalog().len()
        );
        return Ok(());
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let result = run_app(&mut terminal, &mut app, &config).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    Ok(())
}

async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App<Repository>,
    config: &Config,
) -> Result<()> {
    loop {
        terminal.draw(|frame| draw(frame, app))?;

        app.tick(Instant::now()).await;

        // Completion and failure of read-aloud utterances
        app.poll_speech_events();

        if !event::poll(config.tick_rate())? {
            continue;
        }

        let mode = app.input_mode();
        let action = match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                app.register_activity(Instant::now());
                handle_key_event(key, mode)
            }
            Event::Mouse(mouse) => {
                app.register_activity(Instant::now());
                handle_mouse_event(mouse, mode)
            }
            _ => None,
        };

        if let Some(action) = action {
            if app.handle_action(action).await {
                return Ok(());
            }
        }
    }
}
