//! In-process `MediaInspector` using the FFmpeg libraries through `ffmpeg-next`.
//!
//! Same contract as the subprocess adapter without needing the binaries on
//! `PATH`. Work runs on the blocking pool, which a timeout cannot abort: a
//! dropped remux future raises a flag that the packet loop checks, and the
//! partial output is removed. A probe always runs to completion.

use crate::domain::orientation::{ProbeMetadata, StreamInfo};
use crate::ports::media::{remux_output_path, MediaError, MediaInspector};
use async_trait::async_trait;
use ffmpeg_next as ffmpeg;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Default)]
pub struct NativeMedia;

impl NativeMedia {
    pub fn new() -> Result<Self, MediaError> {
        ffmpeg::init().map_err(library)?;
        Ok(Self)
    }
}

fn library(err: ffmpeg::Error) -> MediaError {
    MediaError::Library(err.to_string())
}

fn probe_blocking(source: &Path) -> Result<ProbeMetadata, MediaError> {
    let ictx = ffmpeg::format::input(&source).map_err(library)?;

    let mut streams = Vec::new();
    for stream in ictx.streams() {
        let parameters = stream.parameters();
        let info = match parameters.medium() {
            ffmpeg::media::Type::Video => {
                let decoder = ffmpeg::codec::context::Context::from_parameters(parameters)
                    .and_then(|ctx| ctx.decoder().video())
                    .map_err(library)?;
                StreamInfo {
                    codec_type: Some("video".to_string()),
                    width: Some(u64::from(decoder.width())),
                    height: Some(u64::from(decoder.height())),
                }
            }
            ffmpeg::media::Type::Audio => StreamInfo {
                codec_type: Some("audio".to_string()),
                ..Default::default()
            },
            _ => StreamInfo::default(),
        };
        streams.push(info);
    }

    Ok(ProbeMetadata { streams })
}

/// Raises the flag when the awaiting future is dropped.
struct CancelOnDrop(Arc<AtomicBool>);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

fn cancelled_error() -> MediaError {
    MediaError::Library("remux cancelled".to_string())
}

fn remux_blocking(source: &Path, output: &Path, cancelled: &AtomicBool) -> Result<(), MediaError> {
    if cancelled.load(Ordering::Relaxed) {
        return Err(cancelled_error());
    }

    let mut ictx = ffmpeg::format::input(&source).map_err(library)?;
    let mut octx = ffmpeg::format::output_as(&output, "mp4").map_err(library)?;

    let mut stream_mapping: Vec<Option<usize>> = vec![None; ictx.nb_streams() as usize];
    let mut input_time_bases = vec![ffmpeg::Rational(0, 1); ictx.nb_streams() as usize];
    let mut next_index = 0;

    for (index, stream) in ictx.streams().enumerate() {
        let medium = stream.parameters().medium();
        if medium != ffmpeg::media::Type::Audio
            && medium != ffmpeg::media::Type::Video
            && medium != ffmpeg::media::Type::Subtitle
        {
            continue;
        }
        stream_mapping[index] = Some(next_index);
        input_time_bases[index] = stream.time_base();
        next_index += 1;

        let mut out_stream = octx
            .add_stream(ffmpeg::encoder::find(ffmpeg::codec::Id::None))
            .map_err(library)?;
        out_stream.set_parameters(stream.parameters());
        // Let the muxer pick a tag valid for mp4.
        unsafe {
            (*out_stream.parameters().as_mut_ptr()).codec_tag = 0;
        }
    }

    octx.set_metadata(ictx.metadata().to_owned());

    let mut options = ffmpeg::Dictionary::new();
    options.set("movflags", "faststart");
    octx.write_header_with(options).map_err(library)?;

    for (stream, mut packet) in ictx.packets() {
        if cancelled.load(Ordering::Relaxed) {
            return Err(cancelled_error());
        }
        let index = stream.index();
        let Some(out_index) = stream_mapping[index] else {
            continue;
        };
        let out_time_base = octx
            .stream(out_index)
            .ok_or(ffmpeg::Error::StreamNotFound)
            .map_err(library)?
            .time_base();

        packet.rescale_ts(input_time_bases[index], out_time_base);
        packet.set_position(-1);
        packet.set_stream(out_index);
        packet.write_interleaved(&mut octx).map_err(library)?;
    }

    octx.write_trailer().map_err(library)?;
    Ok(())
}

#[async_trait]
impl MediaInspector for NativeMedia {
    async fn probe(&self, path: &Path) -> Result<ProbeMetadata, MediaError> {
        let source = path.to_path_buf();
        tokio::task::spawn_blocking(move || probe_blocking(&source))
            .await
            .map_err(|e| MediaError::Library(e.to_string()))?
    }

    async fn remux_faststart(&self, path: &Path) -> Result<PathBuf, MediaError> {
        let source = path.to_path_buf();
        let output = remux_output_path(path);
        let target = output.clone();
        let cancelled = Arc::new(AtomicBool::new(false));
        let _guard = CancelOnDrop(Arc::clone(&cancelled));

        tokio::task::spawn_blocking(move || {
            let result = remux_blocking(&source, &target, &cancelled);
            if cancelled.load(Ordering::Relaxed) {
                let _ = std::fs::remove_file(&target);
            }
            result
        })
        .await
        .map_err(|e| MediaError::Library(e.to_string()))??;

        if tokio::fs::metadata(&output).await?.len() == 0 {
            return Err(MediaError::EmptyOutput(output));
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_dropping_guard_raises_flag() {
        let flag = Arc::new(AtomicBool::new(false));
        let guard = CancelOnDrop(Arc::clone(&flag));
        assert!(!flag.load(Ordering::Relaxed));
        drop(guard);
        assert!(flag.load(Ordering::Relaxed));
    }

    #[test]
    fn test_cancelled_remux_writes_nothing() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("clip.mp4.processing");

        let result = remux_blocking(
            &dir.path().join("clip.mp4"),
            &output,
            &AtomicBool::new(true),
        );

        assert!(matches!(result, Err(MediaError::Library(msg)) if msg == "remux cancelled"));
        assert!(!output.exists());
    }
}
