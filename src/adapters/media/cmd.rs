use crate::domain::orientation::ProbeMetadata;
use crate::ports::media::{remux_output_path, MediaError, MediaInspector};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Output;
use tokio::process::Command as TokioCommand;
use tracing::debug;

/// `MediaInspector` backed by the `ffprobe` and `ffmpeg` binaries.
///
/// Children are killed if the calling future is dropped, so an outer timeout
/// does not leave them running.
#[derive(Debug, Clone)]
pub struct FfmpegCli {
    ffprobe: PathBuf,
    ffmpeg: PathBuf,
}

impl Default for FfmpegCli {
    fn default() -> Self {
        Self::new("ffprobe", "ffmpeg")
    }
}

impl FfmpegCli {
    pub fn new(ffprobe: impl Into<PathBuf>, ffmpeg: impl Into<PathBuf>) -> Self {
        Self {
            ffprobe: ffprobe.into(),
            ffmpeg: ffmpeg.into(),
        }
    }

    async fn run_ffprobe(&self, path: &Path) -> Result<Output, MediaError> {
        TokioCommand::new(&self.ffprobe)
            .arg("-v").arg("error")
            .arg("-print_format").arg("json")
            .arg("-show_streams")
            .arg(path)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| MediaError::Spawn {
                program: "ffprobe",
                source,
            })
    }

    async fn run_ffmpeg_faststart(
        &self,
        input: &Path,
        output: &Path,
    ) -> Result<Output, MediaError> {
        TokioCommand::new(&self.ffmpeg)
            .arg("-y")
            .arg("-i").arg(input)
            .arg("-movflags").arg("faststart")
            .arg("-codec").arg("copy")
            .arg("-f").arg("mp4")
            .arg(output)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| MediaError::Spawn {
                program: "ffmpeg",
                source,
            })
    }
}

pub fn parse_probe_output(stdout: &[u8]) -> Result<ProbeMetadata, MediaError> {
    serde_json::from_slice(stdout).map_err(|e| MediaError::Parse(e.to_string()))
}

#[async_trait]
impl MediaInspector for FfmpegCli {
    async fn probe(&self, path: &Path) -> Result<ProbeMetadata, MediaError> {
        let output = self.run_ffprobe(path).await?;
        if !output.status.success() {
            return Err(MediaError::Probe {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let metadata = parse_probe_output(&output.stdout)?;
        debug!(path = ?path, streams = metadata.streams.len(), "probed");
        Ok(metadata)
    }

    async fn remux_faststart(&self, path: &Path) -> Result<PathBuf, MediaError> {
        let out = remux_output_path(path);
        let output = self.run_ffmpeg_faststart(path, &out).await?;
        if !output.status.success() {
            return Err(MediaError::Remux {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let len = tokio::fs::metadata(&out).await?.len();
        if len == 0 {
            return Err(MediaError::EmptyOutput(out));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::orientation::Orientation;

    #[test]
    fn test_parse_probe_output() {
        let stdout = br#"{
            "streams": [
                {"index": 0, "codec_type": "video", "width": 1080, "height": 1920},
                {"index": 1, "codec_type": "audio", "channels": 2}
            ]
        }"#;
        let metadata = parse_probe_output(stdout).unwrap();
        assert_eq!(Orientation::classify(&metadata), Ok(Orientation::Portrait));
    }

    #[test]
    fn test_parse_probe_output_empty_streams() {
        let metadata = parse_probe_output(br#"{"streams": []}"#).unwrap();
        assert!(Orientation::classify(&metadata).is_err());
    }

    #[test]
    fn test_parse_probe_output_malformed() {
        assert!(matches!(
            parse_probe_output(b"not json"),
            Err(MediaError::Parse(_))
        ));
        assert!(matches!(
            parse_probe_output(br#"{"streams": "nope"}"#),
            Err(MediaError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_error() {
        let cli = FfmpegCli::new("/nonexistent/ffprobe", "/nonexistent/ffmpeg");
        let result = cli.probe(Path::new("video.mp4")).await;
        assert!(matches!(
            result,
            Err(MediaError::Spawn {
                program: "ffprobe",
                ..
            })
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit_is_probe_error() {
        // `false` ignores its arguments and exits 1
        let cli = FfmpegCli::new("false", "false");
        let result = cli.probe(Path::new("video.mp4")).await;
        assert!(matches!(result, Err(MediaError::Probe { .. })));

        let result = cli.remux_faststart(Path::new("video.mp4")).await;
        assert!(matches!(result, Err(MediaError::Remux { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_zero_byte_output_is_failure() {
        // `true` exits 0 without writing anything
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.mp4");
        std::fs::write(&input, b"mp4").unwrap();
        std::fs::write(remux_output_path(&input), b"").unwrap();

        let cli = FfmpegCli::new("true", "true");
        let result = cli.remux_faststart(&input).await;
        assert!(matches!(result, Err(MediaError::EmptyOutput(_))));
    }
}
