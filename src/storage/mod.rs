// Storage layer for story history and generated assets

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use uuid::Uuid;

use crate::models::GeneratedStory;

const HISTORY_FILE: &str = "stories.json";

pub struct Storage {
    data_dir: PathBuf,
    assets_dir: PathBuf,
}

impl Storage {
    pub fn new() -> Result<Self> {
        let data_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
            .join("taleweave");

        Self::at(data_dir)
    }

    pub fn at(data_dir: PathBuf) -> Result<Self> {
        let assets_dir = data_dir.join("assets");

        fs::create_dir_all(&data_dir).context("Failed to create data directory")?;
        fs::create_dir_all(&assets_dir).context("Failed to create assets directory")?;

        Ok(Self {
            data_dir,
            assets_dir,
        })
    }

    pub fn history_path(&self) -> PathBuf {
        self.data_dir.join(HISTORY_FILE)
    }

    /// Read the whole history, newest first. A missing file is an empty
    /// history, not an error.
    pub fn load_history(&self) -> Result<Vec<GeneratedStory>> {
        let path = self.history_path();

        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&path).context("Failed to read history file")?;

        serde_json::from_str(&content).context("Failed to parse history file")
    }

    /// Overwrite the history file wholesale.
    pub fn save_history(&self, stories: &[GeneratedStory]) -> Result<()> {
        let content =
            serde_json::to_string_pretty(stories).context("Failed to serialize history")?;

        fs::write(self.history_path(), content).context("Failed to write history file")
    }

    pub fn save_image(&self, id: Uuid, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.assets_dir.join(format!("{id}.png"));
        fs::write(&path, bytes).context("Failed to write image file")?;
        Ok(path)
    }

    pub fn save_audio(&self, id: Uuid, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.assets_dir.join(format!("{id}.wav"));
        fs::write(&path, bytes).context("Failed to write audio file")?;
        Ok(path)
    }

    /// Delete both assets for a story, if they exist.
    pub fn remove_assets(&self, id: Uuid) -> Result<()> {
        for path in [
            self.assets_dir.join(format!("{id}.png")),
            self.assets_dir.join(format!("{id}.wav")),
        ] {
            if path.exists() {
                fs::remove_file(&path).context("Failed to delete asset file")?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ArtStyle, Genre, StoryParams};
    use tempfile::TempDir;

    fn setup_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let storage = Storage::at(temp_dir.path().join("taleweave")).unwrap();
        (temp_dir, storage)
    }

    fn story(title: &str) -> GeneratedStory {
        GeneratedStory::new(
            title.to_string(),
            "Once upon a time...".to_string(),
            "A key scene".to_string(),
            StoryParams {
                prompt: "prompt".to_string(),
                genre: Genre::Fantasy,
                art_style: ArtStyle::Anime,
            },
        )
    }

    #[test]
    fn test_load_history_missing_file_is_empty() {
        let (_temp, storage) = setup_test_storage();
        let stories = storage.load_history().unwrap();
        assert!(stories.is_empty());
    }

    #[test]
    fn test_save_and_load_history_verbatim() {
        let (_temp, storage) = setup_test_storage();

        let mut first = story("First");
        first.image_path = Some(storage.assets_dir.join(format!("{}.png", first.id)));
        let stories = vec![story("Newest"), first];

        storage.save_history(&stories).unwrap();
        let loaded = storage.load_history().unwrap();
        assert_eq!(loaded, stories);
    }

    #[test]
    fn test_save_history_overwrites_wholesale() {
        let (_temp, storage) = setup_test_storage();

        storage.save_history(&[story("A"), story("B")]).unwrap();
        storage.save_history(&[story("C")]).unwrap();

        let loaded = storage.load_history().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].title, "C");
    }

    #[test]
    fn test_load_history_corrupt_file_is_error() {
        let (_temp, storage) = setup_test_storage();
        fs::write(storage.history_path(), "not json").unwrap();
        assert!(storage.load_history().is_err());
    }

    #[test]
    fn test_save_and_remove_assets() {
        let (_temp, storage) = setup_test_storage();
        let id = Uuid::new_v4();

        let image_path = storage.save_image(id, &[1, 2, 3]).unwrap();
        let audio_path = storage.save_audio(id, &[4, 5, 6]).unwrap();
        assert!(image_path.exists());
        assert!(audio_path.exists());
        assert_eq!(fs::read(&image_path).unwrap(), vec![1, 2, 3]);

        storage.remove_assets(id).unwrap();
        assert!(!image_path.exists());
        assert!(!audio_path.exists());
    }

    #[test]
    fn test_remove_assets_missing_is_ok() {
        let (_temp, storage) = setup_test_storage();
        assert!(storage.remove_assets(Uuid::new_v4()).is_ok());
    }
}
