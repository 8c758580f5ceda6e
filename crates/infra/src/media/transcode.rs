//! Audio extraction via the system ffmpeg binary.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use recap_core::AudioTranscoder;
use recap_domain::constants::{AUDIO_BITRATE, AUDIO_CHANNELS, AUDIO_SAMPLE_RATE};
use recap_domain::{RecapError, Result};
use tokio::process::Command;
use tracing::{debug, instrument};

/// Spawns `ffmpeg` to extract a stereo mp3 track from a recording.
pub struct FfmpegTranscoder {
    binary: String,
}

impl FfmpegTranscoder {
    pub fn new() -> Self {
        Self { binary: "ffmpeg".to_string() }
    }

    /// Use a non-PATH ffmpeg binary.
    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self { binary: binary.into() }
    }
}

impl Default for FfmpegTranscoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AudioTranscoder for FfmpegTranscoder {
    #[instrument(skip(self))]
    async fn to_mp3(&self, video_path: &Path) -> Result<PathBuf> {
        let output_path = video_path.with_extension("mp3");

        // A leftover mp3 from a pass that failed after transcoding is reused
        // as-is rather than re-encoded.
        if tokio::fs::try_exists(&output_path).await.unwrap_or(false) {
            debug!(path = %output_path.display(), "audio file already present, skipping transcode");
            return Ok(output_path);
        }

        let output = Command::new(&self.binary)
            .arg("-i")
            .arg(video_path)
            .arg("-vn")
            .arg("-ar")
            .arg(AUDIO_SAMPLE_RATE.to_string())
            .arg("-ac")
            .arg(AUDIO_CHANNELS.to_string())
            .arg("-b:a")
            .arg(AUDIO_BITRATE)
            .arg("-f")
            .arg("mp3")
            .arg("-y")
            .arg(&output_path)
            .output()
            .await
            .map_err(|e| RecapError::Media(format!("spawning {}: {e}", self.binary)))?;

        if !output.status.success() {
            // Drop any partial output so the reuse check above cannot pick
            // up a truncated file on the next pass.
            let _ = tokio::fs::remove_file(&output_path).await;
            let stderr = String::from_utf8_lossy(&output.stderr);
            let mut tail: Vec<&str> = stderr.lines().rev().take(5).collect();
            tail.reverse();
            return Err(RecapError::Media(format!(
                "ffmpeg exited with {}: {}",
                output.status,
                tail.join("; ")
            )));
        }

        debug!(path = %output_path.display(), "transcoded recording to mp3");
        Ok(output_path)
    }
}
