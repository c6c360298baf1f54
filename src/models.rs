use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Genre {
    Fantasy,
    SciFi,
    Mystery,
    Adventure,
    Horror,
    Romance,
}

impl Genre {
    pub const ALL: [Self; 6] = [
        Self::Fantasy,
        Self::SciFi,
        Self::Mystery,
        Self::Adventure,
        Self::Horror,
        Self::Romance,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Fantasy => "Fantasy",
            Self::SciFi => "Sci-Fi",
            Self::Mystery => "Mystery",
            Self::Adventure => "Adventure",
            Self::Horror => "Horror",
            Self::Romance => "Romance",
        }
    }

    pub fn next(self) -> Self {
        cycle(&Self::ALL, self, 1)
    }

    pub fn prev(self) -> Self {
        cycle(&Self::ALL, self, -1)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ArtStyle {
    ThreeDRender,
    Watercolor,
    PixelArt,
    Anime,
    OilPainting,
    ComicBook,
}

impl ArtStyle {
    pub const ALL: [Self; 6] = [
        Self::ThreeDRender,
        Self::Watercolor,
        Self::PixelArt,
        Self::Anime,
        Self::OilPainting,
        Self::ComicBook,
    ];

    /// The label is fed verbatim into the image prompt.
    pub const fn label(self) -> &'static str {
        match self {
            Self::ThreeDRender => "3D Render",
            Self::Watercolor => "Watercolor",
            Self::PixelArt => "Pixel Art",
            Self::Anime => "Anime",
            Self::OilPainting => "Oil Painting",
            Self::ComicBook => "Comic Book",
        }
    }

    pub fn next(self) -> Self {
        cycle(&Self::ALL, self, 1)
    }

    pub fn prev(self) -> Self {
        cycle(&Self::ALL, self, -1)
    }
}

#[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
fn cycle<T: Copy + PartialEq>(all: &[T], current: T, step: isize) -> T {
    let len = all.len() as isize;
    let pos = all.iter().position(|v| *v == current).unwrap_or(0) as isize;
    all[(pos + step).rem_euclid(len) as usize]
}

/// Everything the user chose on the create form. Immutable once submitted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoryParams {
    pub prompt: String,
    pub genre: Genre,
    pub art_style: ArtStyle,
}

/// A story as it moves through the pipeline. Created when the text stage
/// succeeds; the image and audio paths are filled in (located by id) as the
/// later stages land. A story missing either asset is still displayable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GeneratedStory {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub image_prompt: String,
    pub created_at: DateTime<Utc>,
    pub params: StoryParams,
    #[serde(default)]
    pub image_path: Option<PathBuf>,
    #[serde(default)]
    pub audio_path: Option<PathBuf>,
}

impl GeneratedStory {
    pub fn new(title: String, content: String, image_prompt: String, params: StoryParams) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            content,
            image_prompt,
            created_at: Utc::now(),
            params,
            image_path: None,
            audio_path: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationStatus {
    Idle,
    GeneratingText,
    GeneratingImage,
    GeneratingAudio,
    Complete,
    Error,
}

/// Transient pipeline status owned by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadingState {
    pub status: GenerationStatus,
    pub message: Option<String>,
}

impl LoadingState {
    pub const fn idle() -> Self {
        Self {
            status: GenerationStatus::Idle,
            message: None,
        }
    }

    pub const fn stage(status: GenerationStatus, message: String) -> Self {
        Self {
            status,
            message: Some(message),
        }
    }

    pub const fn error(message: String) -> Self {
        Self {
            status: GenerationStatus::Error,
            message: Some(message),
        }
    }

    pub const fn complete() -> Self {
        Self {
            status: GenerationStatus::Complete,
            message: None,
        }
    }

    /// True while a pipeline stage is in flight.
    pub const fn is_busy(&self) -> bool {
        matches!(
            self.status,
            GenerationStatus::GeneratingText
                | GenerationStatus::GeneratingImage
                | GenerationStatus::GeneratingAudio
        )
    }
}

impl Default for LoadingState {
    fn default() -> Self {
        Self::idle()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub api_base_url: String,
    pub text_model: String,
    pub image_model: String,
    pub tts_model: String,
    pub voice: String,
    #[serde(default = "default_timeout")]
    pub request_timeout: u64,
    pub theme: ThemeConfig,
}

const fn default_timeout() -> u64 {
    120
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://generativelanguage.googleapis.com".to_string(),
            text_model: "gemini-2.5-flash".to_string(),
            image_model: "gemini-2.5-flash-image".to_string(),
            tts_model: "gemini-2.5-flash-preview-tts".to_string(),
            voice: "Kore".to_string(),
            request_timeout: default_timeout(),
            theme: ThemeConfig::default(),
        }
    }
}

#[allow(clippy::struct_field_names)]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeConfig {
    pub accent_color: String,
    pub border_color: String,
    pub highlight_color: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            accent_color: "magenta".to_string(),
            border_color: "cyan".to_string(),
            highlight_color: "yellow".to_string(),
        }
    }
}
