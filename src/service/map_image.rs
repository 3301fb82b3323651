//! Map preview images rendered by an external tool.

use serenity::async_trait;
use sha2::{Digest, Sha256};

use crate::{error::AppError, service::replay::run_with_replay_file};

/// A rendered map image, ready to be attached to a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapImage {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Renders map preview images from replay files.
#[async_trait]
pub trait MapRenderer: Send + Sync {
    async fn render(&self, replay: &[u8]) -> Result<MapImage, AppError>;
}

/// Map renderer running an external command that prints the image to stdout.
pub struct CommandMapRenderer {
    command: Vec<String>,
}

impl CommandMapRenderer {
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }
}

#[async_trait]
impl MapRenderer for CommandMapRenderer {
    async fn render(&self, replay: &[u8]) -> Result<MapImage, AppError> {
        let output = run_with_replay_file(&self.command, replay).await?;

        if !output.status.success() {
            return Err(AppError::InternalError(format!(
                "Map renderer exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        if output.stdout.is_empty() {
            return Err(AppError::InternalError(
                "Map renderer produced no output".to_string(),
            ));
        }

        let bytes = output.stdout;
        let hash = format!("{:x}", Sha256::digest(&bytes));
        let filename = format!("{}.{}", &hash[..16], image_extension(&bytes));

        Ok(MapImage { filename, bytes })
    }
}

/// Guesses the file extension of an image from its magic bytes.
fn image_extension(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(b"\x89PNG") {
        "png"
    } else if bytes.starts_with(b"\xFF\xD8\xFF") {
        "jpg"
    } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        "webp"
    } else {
        "bin"
    }
}
