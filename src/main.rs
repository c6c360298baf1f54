mod api;
mod app;
mod audio;
mod config;
mod events;
mod models;
mod pipeline;
mod storage;
mod ui;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::Backend, prelude::*};
use std::io;
use std::time::Duration;
use tokio::sync::mpsc;

use api::GeminiClient;
use app::{App, AppMode, FormFocus};
use events::AppEvent;
use storage::Storage;

#[tokio::main]
async fn main() -> Result<()> {
    // Config, storage, and API key problems should surface before the
    // terminal switches to the alternate screen
    let config = config::load_config()?;
    let storage = Storage::new()?;
    let client = GeminiClient::from_env(&config)?;

    let mut app = App::new(&config);
    app.stories = storage.load_history()?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create channel for async events
    let (tx, mut rx) = mpsc::unbounded_channel::<AppEvent>();

    // Run app
    let res = run_app(&mut terminal, &mut app, &client, &storage, &tx, &mut rx);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

/// Apply one pipeline event to the app state, persisting the history after
/// every mutation.
fn handle_app_event(app: &mut App, storage: &Storage, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::StageStarted { status, message } => app.set_stage(status, message),
        AppEvent::TextReady(story) => {
            app.apply_text(story);
            storage.save_history(&app.stories)?;
        }
        AppEvent::ImageReady { story_id, png } => {
            // The story may have been deleted while the stage was in flight
            if app.stories.iter().any(|s| s.id == story_id) {
                let path = storage.save_image(story_id, &png)?;
                app.set_image_path(story_id, path);
                storage.save_history(&app.stories)?;
            }
        }
        AppEvent::AudioReady { story_id, wav } => {
            if app.stories.iter().any(|s| s.id == story_id) {
                let path = storage.save_audio(story_id, &wav)?;
                app.set_audio_path(story_id, path);
                storage.save_history(&app.stories)?;
            }
        }
        AppEvent::Done => app.complete(),
        AppEvent::Failed(message) => app.fail(message),
    }
    Ok(())
}

fn handle_help_keys(app: &mut App, key: KeyCode, modifiers: event::KeyModifiers) -> bool {
    if !app.show_help {
        return false;
    }

    match key {
        KeyCode::Char('h') if modifiers.contains(event::KeyModifiers::CONTROL) => {
            app.toggle_help();
        }
        KeyCode::Esc => {
            app.show_help = false;
        }
        _ => {}
    }
    true
}

fn handle_keyboard_input(
    app: &mut App,
    key: KeyCode,
    modifiers: event::KeyModifiers,
    client: &GeminiClient,
    storage: &Storage,
    event_tx: &mpsc::UnboundedSender<AppEvent>,
) -> Result<()> {
    let ctrl = modifiers.contains(event::KeyModifiers::CONTROL);

    match key {
        KeyCode::Char('c') if ctrl => {
            if app.exit_pending {
                app.quit();
            } else {
                app.exit_pending = true;
            }
            return Ok(());
        }
        KeyCode::Char('q') if ctrl => {
            app.quit();
            return Ok(());
        }
        KeyCode::Char('h') if ctrl => {
            app.toggle_help();
            return Ok(());
        }
        KeyCode::Char('l') if ctrl => {
            app.open_history();
            return Ok(());
        }
        KeyCode::Esc => {
            if app.exit_pending {
                app.exit_pending = false;
            } else {
                match app.mode {
                    AppMode::History => app.close_history(),
                    AppMode::Story => app.back_to_form(),
                    AppMode::Create => {}
                }
            }
            return Ok(());
        }
        _ if app.exit_pending => {
            // Any other key cancels pending exit, then handles normally
            app.exit_pending = false;
        }
        _ => {}
    }

    match app.mode {
        AppMode::Create => handle_create_keys(app, key, modifiers, client, event_tx),
        AppMode::Story => handle_story_keys(app, key),
        AppMode::History => handle_history_keys(app, key, storage)?,
    }
    Ok(())
}

fn handle_create_keys(
    app: &mut App,
    key: KeyCode,
    modifiers: event::KeyModifiers,
    client: &GeminiClient,
    event_tx: &mpsc::UnboundedSender<AppEvent>,
) {
    match key {
        KeyCode::Tab => app.focus = app.focus.next(),
        KeyCode::Left => match app.focus {
            FormFocus::Genre => app.genre = app.genre.prev(),
            FormFocus::ArtStyle => app.art_style = app.art_style.prev(),
            FormFocus::Prompt => {}
        },
        KeyCode::Right => match app.focus {
            FormFocus::Genre => app.genre = app.genre.next(),
            FormFocus::ArtStyle => app.art_style = app.art_style.next(),
            FormFocus::Prompt => {}
        },
        KeyCode::Backspace => {
            if app.focus == FormFocus::Prompt {
                app.prompt_input.pop();
            }
        }
        KeyCode::Enter => {
            if app.can_submit() {
                let params = app.story_params();
                app.begin_generation();
                let _ = pipeline::spawn_generation(client.clone(), params, event_tx.clone());
            }
        }
        KeyCode::Char(c) if !modifiers.contains(event::KeyModifiers::CONTROL) => {
            if app.focus == FormFocus::Prompt {
                app.prompt_input.push(c);
            }
        }
        _ => {}
    }
}

fn handle_story_keys(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Up => app.scroll_up(1),
        KeyCode::Down => app.scroll_down(1),
        KeyCode::PageUp => app.scroll_up(10),
        KeyCode::PageDown => app.scroll_down(10),
        KeyCode::Home => app.scroll_to_top(),
        KeyCode::End => app.scroll_to_bottom(),
        _ => {}
    }
}

fn handle_history_keys(app: &mut App, key: KeyCode, storage: &Storage) -> Result<()> {
    match key {
        KeyCode::Up => app.history_up(),
        KeyCode::Down => app.history_down(),
        KeyCode::Enter => app.open_selected(),
        KeyCode::Char('d') | KeyCode::Delete => {
            if let Some(removed) = app.delete_selected() {
                storage.remove_assets(removed.id)?;
                storage.save_history(&app.stories)?;
            }
        }
        _ => {}
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    client: &GeminiClient,
    storage: &Storage,
    event_tx: &mpsc::UnboundedSender<AppEvent>,
    event_rx: &mut mpsc::UnboundedReceiver<AppEvent>,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::render(f, app))?;

        // Apply pipeline events first
        while let Ok(app_event) = event_rx.try_recv() {
            handle_app_event(app, storage, app_event)?;
        }

        // Drop the error banner once its window has passed
        app.maybe_clear_error();

        // Check for keyboard input with a short timeout for smooth rendering
        if event::poll(Duration::from_millis(16))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    // Handle help window first
                    if handle_help_keys(app, key.code, key.modifiers) {
                        continue;
                    }

                    handle_keyboard_input(app, key.code, key.modifiers, client, storage, event_tx)?;
                }
            }
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AppConfig, ArtStyle, GeneratedStory, GenerationStatus, Genre, StoryParams};
    use tempfile::TempDir;

    fn setup() -> (TempDir, App, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let storage = Storage::at(temp_dir.path().join("taleweave")).unwrap();
        let app = App::new(&AppConfig::default());
        (temp_dir, app, storage)
    }

    fn story() -> GeneratedStory {
        GeneratedStory::new(
            "The Iron Bloom".to_string(),
            "The robot knelt.".to_string(),
            "A robot in a wasteland".to_string(),
            StoryParams {
                prompt: "A lonely robot".to_string(),
                genre: Genre::SciFi,
                art_style: ArtStyle::PixelArt,
            },
        )
    }

    #[test]
    fn test_full_event_sequence_populates_story_and_history() {
        let (_temp, mut app, storage) = setup();
        let story = story();
        let id = story.id;

        handle_app_event(&mut app, &storage, AppEvent::TextReady(story)).unwrap();
        handle_app_event(
            &mut app,
            &storage,
            AppEvent::ImageReady {
                story_id: id,
                png: vec![1, 2, 3],
            },
        )
        .unwrap();
        handle_app_event(
            &mut app,
            &storage,
            AppEvent::AudioReady {
                story_id: id,
                wav: vec![4, 5, 6],
            },
        )
        .unwrap();
        handle_app_event(&mut app, &storage, AppEvent::Done).unwrap();

        // Exactly one new entry, fully populated, shown on screen
        assert_eq!(app.stories.len(), 1);
        let shown = app.current_story().unwrap();
        assert_eq!(shown.id, id);
        assert!(shown.image_path.as_ref().unwrap().exists());
        assert!(shown.audio_path.as_ref().unwrap().exists());
        assert_eq!(app.loading.status, GenerationStatus::Complete);

        // And the history file round-trips the same entry
        let persisted = storage.load_history().unwrap();
        assert_eq!(persisted, app.stories);
    }

    #[test]
    fn test_asset_event_for_deleted_story_is_ignored() {
        let (_temp, mut app, storage) = setup();
        let story = story();
        let id = story.id;

        handle_app_event(&mut app, &storage, AppEvent::TextReady(story)).unwrap();
        app.open_history();
        app.delete_selected().unwrap();

        handle_app_event(
            &mut app,
            &storage,
            AppEvent::ImageReady {
                story_id: id,
                png: vec![1, 2, 3],
            },
        )
        .unwrap();

        assert!(app.stories.is_empty());
        // No orphan asset was written
        assert!(storage.remove_assets(id).is_ok());
    }

    #[test]
    fn test_failed_event_sets_error_state() {
        let (_temp, mut app, storage) = setup();
        handle_app_event(
            &mut app,
            &storage,
            AppEvent::Failed(pipeline::FAILURE_MESSAGE.to_string()),
        )
        .unwrap();

        assert_eq!(app.loading.status, GenerationStatus::Error);
        assert_eq!(
            app.loading.message.as_deref(),
            Some(pipeline::FAILURE_MESSAGE)
        );
        assert!(app.error_since.is_some());
    }

    #[tokio::test]
    async fn test_create_keys_edit_form() {
        let (_temp, mut app, _storage) = setup();
        let client = GeminiClient::new(&AppConfig::default(), "test-key".to_string()).unwrap();
        let (tx, _rx) = mpsc::unbounded_channel();
        let none = event::KeyModifiers::NONE;

        for c in "Rob".chars() {
            handle_create_keys(&mut app, KeyCode::Char(c), none, &client, &tx);
        }
        handle_create_keys(&mut app, KeyCode::Backspace, none, &client, &tx);
        assert_eq!(app.prompt_input, "Ro");

        handle_create_keys(&mut app, KeyCode::Tab, none, &client, &tx);
        assert_eq!(app.focus, FormFocus::Genre);
        handle_create_keys(&mut app, KeyCode::Right, none, &client, &tx);
        assert_eq!(app.genre, Genre::SciFi);

        handle_create_keys(&mut app, KeyCode::Tab, none, &client, &tx);
        handle_create_keys(&mut app, KeyCode::Left, none, &client, &tx);
        assert_eq!(app.art_style, ArtStyle::ComicBook);

        // Typing with a selector focused must not touch the prompt
        handle_create_keys(&mut app, KeyCode::Char('x'), none, &client, &tx);
        assert_eq!(app.prompt_input, "Ro");
    }
}
