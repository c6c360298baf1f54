// Generation pipeline: text -> image -> audio, strictly sequential

use anyhow::Result;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use crate::api::GeminiClient;
use crate::audio;
use crate::events::AppEvent;
use crate::models::{GeneratedStory, GenerationStatus, StoryParams};

/// Shown for any pipeline failure; the stage detail never reaches the user.
pub const FAILURE_MESSAGE: &str = "The magic fizzled. Please try again.";

/// Run one generation pipeline on its own task. Events arrive on `tx` as each
/// stage completes; a failure at any stage skips the remaining stages.
pub fn spawn_generation(
    client: GeminiClient,
    params: StoryParams,
    tx: UnboundedSender<AppEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        if run_pipeline(&client, params, &tx).await.is_err() {
            let _ = tx.send(AppEvent::Failed(FAILURE_MESSAGE.to_string()));
        }
    })
}

async fn run_pipeline(
    client: &GeminiClient,
    params: StoryParams,
    tx: &UnboundedSender<AppEvent>,
) -> Result<()> {
    let art_style = params.art_style;

    // 1. Story text
    send_stage(
        tx,
        GenerationStatus::GeneratingText,
        "Crafting the narrative...",
    );
    let text = client.generate_story_text(&params).await?;
    let story = GeneratedStory::new(text.title, text.content, text.image_prompt, params);
    let story_id = story.id;
    let image_prompt = story.image_prompt.clone();
    let narration = story.content.clone();
    let _ = tx.send(AppEvent::TextReady(story));

    // 2. Illustration
    send_stage(
        tx,
        GenerationStatus::GeneratingImage,
        "Visualizing the scene...",
    );
    if let Some(image) = client.generate_story_image(&image_prompt, art_style).await? {
        if image.mime_type.starts_with("image/") {
            let _ = tx.send(AppEvent::ImageReady {
                story_id,
                png: image.bytes,
            });
        }
    }

    // 3. Narration
    send_stage(
        tx,
        GenerationStatus::GeneratingAudio,
        "Summoning the narrator...",
    );
    if let Some(encoded) = client.generate_story_speech(&narration).await? {
        let wav = audio::wav_from_pcm_base64(&encoded)?;
        let _ = tx.send(AppEvent::AudioReady { story_id, wav });
    }

    let _ = tx.send(AppEvent::Done);
    Ok(())
}

fn send_stage(tx: &UnboundedSender<AppEvent>, status: GenerationStatus, message: &str) {
    let _ = tx.send(AppEvent::StageStarted {
        status,
        message: message.to_string(),
    });
}
