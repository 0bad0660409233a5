mod config;
mod controller;
mod logging;
mod model;
mod narration;
mod view;

use std::io;
use std::sync::Arc;
use anyhow::{Context, Result};
use std::time::Duration;
use tokio::sync::Mutex;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use config::{BookSource, NarratorKind, ReaderConfig};
use controller::AppController;
use model::{AppModel, Book, FileStore, KeyValueStore, MemoryStore, Settings};
use narration::{Narrator, PacedNarrator, VoiceCommand};
use view::AppView;

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = logging::init_logging(&ReaderConfig::log_dir_from_env()) {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    tracing::info!("=== reader-rs starting ===");

    let config = ReaderConfig::from_env();
    tracing::debug!(?config, "Configuration loaded");

    let book = load_book(&config.book)?;
    tracing::info!(title = %book.title, sections = book.section_count(), "Book loaded");

    let settings = Settings::load(open_store(&config));
    let narrator = build_narrator(config.narrator);

    let app_model = AppModel::new(book, settings, config.speech.clone());
    let model = Arc::new(Mutex::new(app_model));

    let controller = AppController::new(model.clone(), narrator.clone());
    controller.start_event_listener().await;

    tracing::info!("Starting TUI...");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, model.clone(), controller).await;

    // Silence the voice before handing the terminal back
    model.lock().await.stop_playback(narrator.as_ref());

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = ?err, "Application error");
    }

    tracing::info!("reader-rs shutting down");
    Ok(())
}

fn load_book(source: &BookSource) -> Result<Book> {
    match source {
        BookSource::Embedded => Book::embedded().context("embedded book is invalid"),
        BookSource::File(path) => {
            Book::load(path).with_context(|| format!("could not open book {}", path.display()))
        }
    }
}

/// Settings live in the data directory; when it cannot be used the session
/// keeps its settings in memory only.
fn open_store(config: &ReaderConfig) -> Box<dyn KeyValueStore> {
    let dir = &config.data_dir;
    if dir.exists() && !dir.is_dir() {
        tracing::warn!(path = %dir.display(), "Data path is not a directory, settings will not persist");
        return Box::new(MemoryStore::new());
    }
    tracing::debug!(path = %dir.display(), "Using settings directory");
    Box::new(FileStore::new(dir.clone()))
}

fn build_narrator(kind: NarratorKind) -> Arc<dyn Narrator> {
    match kind {
        NarratorKind::Espeak => {
            let voice = VoiceCommand::default();
            if voice.is_available() {
                tracing::info!(program = voice.program(), "Voice narration enabled");
                Arc::new(PacedNarrator::with_voice(voice))
            } else {
                tracing::warn!(program = voice.program(), "Voice program not found, narrating silently");
                Arc::new(PacedNarrator::silent())
            }
        }
        NarratorKind::Silent => {
            tracing::info!("Silent narration selected");
            Arc::new(PacedNarrator::silent())
        }
    }
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    model: Arc<Mutex<AppModel>>,
    controller: AppController,
) -> io::Result<()> {
    loop {
        let should_quit = {
            let mut model_guard = model.lock().await;

            // Status messages fade after a few seconds
            model_guard.auto_clear_status();

            terminal.draw(|f| AppView::render(f, &model_guard))?;
            model_guard.should_quit()
        };

        if should_quit {
            break;
        }

        // Handle input with shorter poll time for smoother UI updates
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if let Err(e) = controller.handle_key_event(key).await {
                    tracing::warn!(error = %e, "Key handling failed");
                }
            }
        }
    }

    Ok(())
}
