pub mod widgets;

use crate::app::{App, AppMode};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

pub fn render(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Main content
            Constraint::Length(1), // Status line
            Constraint::Length(1), // Bottom keymap bar
        ])
        .split(frame.area());

    match app.mode {
        AppMode::Create => widgets::render_create_form(frame, app, chunks[0]),
        AppMode::Story => widgets::render_story_view(frame, app, chunks[0]),
        AppMode::History => widgets::render_history_list(frame, app, chunks[0]),
    }

    widgets::render_status_bar(frame, app, chunks[1]);
    widgets::render_bottom_bar(frame, app, chunks[2]);

    // Render help window on top if active
    if app.show_help {
        widgets::render_help_window(frame, frame.area());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AppConfig, ArtStyle, GeneratedStory, Genre, StoryParams};
    use ratatui::{backend::TestBackend, Terminal};

    fn draw(app: &mut App) {
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| render(f, app)).unwrap();
    }

    fn story() -> GeneratedStory {
        GeneratedStory::new(
            "The Iron Bloom".to_string(),
            "The robot knelt in the ash.\n\nIt had found a flower.".to_string(),
            "A robot kneeling over a flower".to_string(),
            StoryParams {
                prompt: "A lonely robot".to_string(),
                genre: Genre::SciFi,
                art_style: ArtStyle::PixelArt,
            },
        )
    }

    #[test]
    fn test_render_create_form_does_not_panic() {
        let mut app = App::new(&AppConfig::default());
        draw(&mut app);

        app.prompt_input = "A lonely robot who discovers a flower".to_string();
        app.show_help = true;
        draw(&mut app);
    }

    #[test]
    fn test_render_story_view_does_not_panic() {
        let mut app = App::new(&AppConfig::default());
        app.apply_text(story());
        draw(&mut app);

        app.scroll_to_bottom();
        draw(&mut app);
        // The wrap-aware clamp pulled the offset back into range
        assert!(app.scroll_offset < usize::MAX);
    }

    #[test]
    fn test_render_history_does_not_panic() {
        let mut app = App::new(&AppConfig::default());
        app.open_history();
        draw(&mut app);

        app.stories.push(story());
        app.stories.push(story());
        app.open_history();
        draw(&mut app);
    }
}
