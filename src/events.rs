// Event types for async communication

use uuid::Uuid;

use crate::models::{GeneratedStory, GenerationStatus};

#[derive(Debug, Clone)]
pub enum AppEvent {
    /// A pipeline stage began
    StageStarted {
        status: GenerationStatus,
        message: String,
    },
    /// Story text arrived; the story is displayable from this point on
    TextReady(GeneratedStory),
    /// Decoded illustration bytes for a story
    ImageReady { story_id: Uuid, png: Vec<u8> },
    /// Narration audio for a story, already wrapped in a WAV container
    AudioReady { story_id: Uuid, wav: Vec<u8> },
    /// All stages finished
    Done,
    /// The pipeline failed; remaining stages were skipped
    Failed(String),
}
