//! gloombot-core/src/sound.rs
//!
//! Sound cue collaborator. The idle scheduler only needs to enumerate
//! assets and play one to completion; everything about decoding or
//! output devices stays behind this trait.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::warn;

use crate::{Error, Result};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SoundCues: Send + Sync {
    /// Names of the currently available audio assets.
    async fn list(&self) -> Result<Vec<String>>;

    /// Start playback of one asset and resolve when it finishes. Spawn
    /// this future to keep playback concurrent with other work.
    async fn play_to_end(&self, name: &str) -> Result<()>;
}

/// Plays `.wav` files out of a folder via `aplay`.
pub struct DirSounds {
    folder: PathBuf,
}

impl DirSounds {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
        }
    }
}

#[async_trait]
impl SoundCues for DirSounds {
    async fn list(&self) -> Result<Vec<String>> {
        if !self.folder.exists() {
            warn!("sound folder not found: {}", self.folder.display());
            return Ok(vec![]);
        }
        let mut entries = tokio::fs::read_dir(&self.folder).await?;
        let mut names = vec![];
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.ends_with(".wav") {
                names.push(name);
            }
        }
        Ok(names)
    }

    async fn play_to_end(&self, name: &str) -> Result<()> {
        let path = self.folder.join(name);
        let status = tokio::process::Command::new("aplay")
            .arg(&path)
            .status()
            .await
            .map_err(|e| Error::Sound(format!("failed to launch aplay: {e}")))?;
        if !status.success() {
            return Err(Error::Sound(format!(
                "aplay exited with {status} playing {}",
                path.display()
            )));
        }
        Ok(())
    }
}
