use std::path::PathBuf;
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::models::{
    AppConfig, ArtStyle, GeneratedStory, GenerationStatus, Genre, LoadingState, StoryParams,
    ThemeConfig,
};

/// How long an error stays on screen before the UI reverts to idle.
pub const ERROR_RESET: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Create,
    Story,
    History,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormFocus {
    Prompt,
    Genre,
    ArtStyle,
}

impl FormFocus {
    pub const fn next(self) -> Self {
        match self {
            Self::Prompt => Self::Genre,
            Self::Genre => Self::ArtStyle,
            Self::ArtStyle => Self::Prompt,
        }
    }
}

#[derive(Debug)]
pub struct App {
    pub mode: AppMode,
    pub should_quit: bool,
    pub exit_pending: bool,
    pub show_help: bool,

    // Create form
    pub prompt_input: String,
    pub genre: Genre,
    pub art_style: ArtStyle,
    pub focus: FormFocus,

    // Pipeline status
    pub loading: LoadingState,
    pub error_since: Option<Instant>,
    pub stage_since: Option<Instant>,

    // Stories
    pub stories: Vec<GeneratedStory>,
    pub current_story: Option<Uuid>,
    pub history_index: usize,
    pub scroll_offset: usize,

    pub theme: ThemeConfig,
    pub model_name: String,
}

impl App {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            mode: AppMode::Create,
            should_quit: false,
            exit_pending: false,
            show_help: false,
            prompt_input: String::new(),
            genre: Genre::Fantasy,
            art_style: ArtStyle::ThreeDRender,
            focus: FormFocus::Prompt,
            loading: LoadingState::idle(),
            error_since: None,
            stage_since: None,
            stories: Vec::new(),
            current_story: None,
            history_index: 0,
            scroll_offset: 0,
            theme: config.theme.clone(),
            model_name: config.text_model.clone(),
        }
    }

    pub const fn quit(&mut self) {
        self.should_quit = true;
    }

    pub const fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub const fn is_generating(&self) -> bool {
        self.loading.is_busy()
    }

    /// One pipeline at a time, and never for a blank prompt.
    pub fn can_submit(&self) -> bool {
        !self.prompt_input.trim().is_empty() && !self.is_generating()
    }

    pub fn story_params(&self) -> StoryParams {
        StoryParams {
            prompt: self.prompt_input.trim().to_string(),
            genre: self.genre,
            art_style: self.art_style,
        }
    }

    pub fn begin_generation(&mut self) {
        self.prompt_input.clear();
        self.current_story = None;
        self.loading = LoadingState::stage(
            GenerationStatus::GeneratingText,
            "Weaving magic...".to_string(),
        );
        self.stage_since = Some(Instant::now());
    }

    pub fn set_stage(&mut self, status: GenerationStatus, message: String) {
        self.loading = LoadingState::stage(status, message);
        self.stage_since = Some(Instant::now());
    }

    /// Text landed: show the story and prepend it to the history.
    pub fn apply_text(&mut self, story: GeneratedStory) {
        self.current_story = Some(story.id);
        self.stories.insert(0, story);
        self.history_index = 0;
        self.scroll_offset = 0;
        self.mode = AppMode::Story;
    }

    pub fn set_image_path(&mut self, id: Uuid, path: PathBuf) {
        if let Some(story) = self.story_mut(id) {
            story.image_path = Some(path);
        }
    }

    pub fn set_audio_path(&mut self, id: Uuid, path: PathBuf) {
        if let Some(story) = self.story_mut(id) {
            story.audio_path = Some(path);
        }
    }

    pub fn complete(&mut self) {
        self.loading = LoadingState::complete();
        self.stage_since = None;
    }

    pub fn fail(&mut self, message: String) {
        self.loading = LoadingState::error(message);
        self.stage_since = None;
        self.error_since = Some(Instant::now());
    }

    /// Called every frame; clears the error state once its window elapses.
    pub fn maybe_clear_error(&mut self) {
        if let Some(since) = self.error_since {
            if since.elapsed() >= ERROR_RESET {
                self.loading = LoadingState::idle();
                self.error_since = None;
            }
        }
    }

    pub fn current_story(&self) -> Option<&GeneratedStory> {
        let id = self.current_story?;
        self.stories.iter().find(|s| s.id == id)
    }

    fn story_mut(&mut self, id: Uuid) -> Option<&mut GeneratedStory> {
        self.stories.iter_mut().find(|s| s.id == id)
    }

    pub fn open_history(&mut self) {
        self.history_index = 0;
        self.mode = AppMode::History;
    }

    /// Leave the history list; fall back to the form when nothing is shown.
    pub fn close_history(&mut self) {
        self.mode = if self.current_story().is_some() {
            AppMode::Story
        } else {
            AppMode::Create
        };
    }

    pub fn history_up(&mut self) {
        self.history_index = self.history_index.saturating_sub(1);
    }

    pub fn history_down(&mut self) {
        if !self.stories.is_empty() {
            self.history_index = (self.history_index + 1).min(self.stories.len() - 1);
        }
    }

    pub fn selected_story(&self) -> Option<&GeneratedStory> {
        self.stories.get(self.history_index)
    }

    pub fn open_selected(&mut self) {
        if let Some(story) = self.selected_story() {
            self.current_story = Some(story.id);
            self.scroll_offset = 0;
            self.mode = AppMode::Story;
        }
    }

    /// Remove the selected story. If it was the one on screen, the view falls
    /// back to the input form on close. Returns the removed story so the
    /// caller can drop its assets and persist.
    pub fn delete_selected(&mut self) -> Option<GeneratedStory> {
        if self.stories.is_empty() {
            return None;
        }

        let removed = self.stories.remove(self.history_index);
        if !self.stories.is_empty() {
            self.history_index = self.history_index.min(self.stories.len() - 1);
        } else {
            self.history_index = 0;
        }

        if self.current_story == Some(removed.id) {
            self.current_story = None;
        }

        Some(removed)
    }

    pub fn back_to_form(&mut self) {
        self.current_story = None;
        self.scroll_offset = 0;
        self.mode = AppMode::Create;
    }

    pub const fn scroll_up(&mut self, amount: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(amount);
    }

    pub fn scroll_down(&mut self, amount: usize) {
        self.scroll_offset = self.scroll_offset.saturating_add(amount);
    }

    pub const fn scroll_to_top(&mut self) {
        self.scroll_offset = 0;
    }

    pub const fn scroll_to_bottom(&mut self) {
        // Clamped to the real maximum by the rendering code
        self.scroll_offset = usize::MAX;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        App::new(&AppConfig::default())
    }

    fn story(title: &str) -> GeneratedStory {
        GeneratedStory::new(
            title.to_string(),
            "content".to_string(),
            "scene".to_string(),
            StoryParams {
                prompt: "prompt".to_string(),
                genre: Genre::Fantasy,
                art_style: ArtStyle::ThreeDRender,
            },
        )
    }

    #[test]
    fn test_app_new() {
        let app = app();
        assert_eq!(app.mode, AppMode::Create);
        assert!(!app.should_quit);
        assert_eq!(app.focus, FormFocus::Prompt);
        assert_eq!(app.loading, LoadingState::idle());
    }

    #[test]
    fn test_focus_cycles() {
        assert_eq!(FormFocus::Prompt.next(), FormFocus::Genre);
        assert_eq!(FormFocus::Genre.next(), FormFocus::ArtStyle);
        assert_eq!(FormFocus::ArtStyle.next(), FormFocus::Prompt);
    }

    #[test]
    fn test_can_submit() {
        let mut app = app();
        assert!(!app.can_submit());

        app.prompt_input = "  ".to_string();
        assert!(!app.can_submit());

        app.prompt_input = "A lonely robot".to_string();
        assert!(app.can_submit());

        app.set_stage(GenerationStatus::GeneratingText, "working".to_string());
        assert!(!app.can_submit());
    }

    #[test]
    fn test_apply_text_prepends_and_shows_story() {
        let mut app = app();
        app.stories.push(story("Old"));

        let new = story("New");
        let id = new.id;
        app.apply_text(new);

        assert_eq!(app.stories.len(), 2);
        assert_eq!(app.stories[0].id, id);
        assert_eq!(app.current_story, Some(id));
        assert_eq!(app.mode, AppMode::Story);
    }

    #[test]
    fn test_asset_paths_update_by_id() {
        let mut app = app();
        let first = story("First");
        let id = first.id;
        app.apply_text(first);
        app.apply_text(story("Second"));

        app.set_image_path(id, PathBuf::from("/tmp/a.png"));
        app.set_audio_path(id, PathBuf::from("/tmp/a.wav"));

        let updated = app.stories.iter().find(|s| s.id == id).unwrap();
        assert_eq!(updated.image_path, Some(PathBuf::from("/tmp/a.png")));
        assert_eq!(updated.audio_path, Some(PathBuf::from("/tmp/a.wav")));
        // The other story is untouched
        assert!(app.stories[0].image_path.is_none());
    }

    #[test]
    fn test_error_resets_after_window() {
        let mut app = app();
        app.fail("boom".to_string());
        assert_eq!(app.loading.status, GenerationStatus::Error);

        // Still inside the window
        app.maybe_clear_error();
        assert_eq!(app.loading.status, GenerationStatus::Error);

        // Pretend the window elapsed
        app.error_since = Instant::now().checked_sub(ERROR_RESET + Duration::from_secs(1));
        assert!(app.error_since.is_some());
        app.maybe_clear_error();
        assert_eq!(app.loading.status, GenerationStatus::Idle);
        assert!(app.error_since.is_none());
    }

    #[test]
    fn test_delete_selected_clears_current_view() {
        let mut app = app();
        let shown = story("Shown");
        let id = shown.id;
        app.apply_text(shown);
        app.open_history();

        let removed = app.delete_selected().unwrap();
        assert_eq!(removed.id, id);
        assert!(app.current_story.is_none());
        assert!(app.stories.is_empty());

        app.close_history();
        assert_eq!(app.mode, AppMode::Create);
    }

    #[test]
    fn test_delete_other_entry_keeps_view() {
        let mut app = app();
        let shown = story("Shown");
        let shown_id = shown.id;
        app.stories.push(story("Other"));
        app.apply_text(shown);

        app.open_history();
        app.history_down();
        let removed = app.delete_selected().unwrap();
        assert_eq!(removed.title, "Other");
        assert_eq!(app.current_story, Some(shown_id));

        app.close_history();
        assert_eq!(app.mode, AppMode::Story);
    }

    #[test]
    fn test_delete_on_empty_history() {
        let mut app = app();
        assert!(app.delete_selected().is_none());
    }

    #[test]
    fn test_history_navigation_clamps() {
        let mut app = app();
        for i in 0..3 {
            app.stories.push(story(&format!("s{i}")));
        }
        app.open_history();

        app.history_up();
        assert_eq!(app.history_index, 0);

        for _ in 0..10 {
            app.history_down();
        }
        assert_eq!(app.history_index, 2);
    }

    #[test]
    fn test_begin_generation_clears_form_and_view() {
        let mut app = app();
        app.prompt_input = "A lonely robot".to_string();
        app.apply_text(story("Old"));

        app.begin_generation();
        assert!(app.prompt_input.is_empty());
        assert!(app.current_story.is_none());
        assert!(app.is_generating());
    }

    #[test]
    fn test_scrolling() {
        let mut app = app();
        app.scroll_down(5);
        assert_eq!(app.scroll_offset, 5);
        app.scroll_up(10);
        assert_eq!(app.scroll_offset, 0);
        app.scroll_to_bottom();
        assert_eq!(app.scroll_offset, usize::MAX);
        app.scroll_to_top();
        assert_eq!(app.scroll_offset, 0);
    }
}
