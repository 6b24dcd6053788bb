//! Per-request scratch files.
//!
//! Every file an upload writes to local disk is registered here. The set is
//! removed when it is dropped, so artifacts disappear on success, on error and
//! when the request future is cancelled mid-flight.

use crate::application::error::{PipelineError, UploadError, ValidationError};
use bytes::Bytes;
use futures::{Stream, TryStreamExt};
use std::error::Error;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufWriter};
use tokio_util::io::StreamReader;
use tracing::{debug, warn};

const STAGING_PREFIX: &str = "tubely-upload-";

/// Marks an I/O error that came from the request body rather than the disk.
#[derive(Debug)]
struct BodyError(Box<dyn Error + Send + Sync>);

impl fmt::Display for BodyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "request body: {}", self.0)
    }
}

impl Error for BodyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(self.0.as_ref())
    }
}

fn is_body_error(err: &io::Error) -> bool {
    err.get_ref().is_some_and(|inner| inner.is::<BodyError>())
}

#[derive(Debug, Default)]
pub struct ScratchFiles {
    paths: Vec<PathBuf>,
}

impl ScratchFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a path for removal. The file does not need to exist yet.
    pub fn track(&mut self, path: PathBuf) {
        self.paths.push(path);
    }

    /// Stream `body` into a fresh file in `dir`, failing once more than
    /// `max_bytes` have been read. Returns the staged path and its size.
    pub async fn stage<S, E>(
        &mut self,
        dir: &Path,
        extension: &str,
        body: S,
        max_bytes: u64,
    ) -> Result<(PathBuf, u64), UploadError>
    where
        S: Stream<Item = Result<Bytes, E>>,
        E: Into<Box<dyn Error + Send + Sync>>,
    {
        let named = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .suffix(extension)
            .tempfile_in(dir)
            .map_err(PipelineError::Staging)?;
        let (file, path) = named
            .keep()
            .map_err(|e| PipelineError::Staging(e.error))?;
        self.track(path.clone());

        let written = match copy_limited(File::from_std(file), body, max_bytes).await {
            Ok(written) => written,
            Err(e) if is_body_error(&e) => {
                debug!(error = %e, "upload body ended abnormally");
                return Err(ValidationError::MalformedForm.into());
            }
            Err(e) => return Err(PipelineError::Staging(e).into()),
        };

        if written > max_bytes {
            return Err(ValidationError::TooLarge { max_bytes }.into());
        }

        debug!(path = ?path, bytes = written, "staged upload");
        Ok((path, written))
    }
}

/// Copies at most `max_bytes + 1` bytes so an oversized body is detected
/// without reading it to the end.
async fn copy_limited<S, E>(file: File, body: S, max_bytes: u64) -> io::Result<u64>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Into<Box<dyn Error + Send + Sync>>,
{
    let body_with_io_error =
        body.map_err(|err| io::Error::new(io::ErrorKind::Other, BodyError(err.into())));
    let body_reader = StreamReader::new(body_with_io_error);
    futures::pin_mut!(body_reader);
    let mut limited = body_reader.take(max_bytes.saturating_add(1));

    let mut file = BufWriter::new(file);
    let written = tokio::io::copy(&mut limited, &mut file).await?;
    file.flush().await?;

    Ok(written)
}

impl Drop for ScratchFiles {
    fn drop(&mut self) {
        for path in self.paths.drain(..) {
            match std::fs::remove_file(&path) {
                Ok(()) => debug!(path = ?path, "removed scratch file"),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => warn!(path = ?path, error = %e, "failed to remove scratch file"),
            }
        }
    }
}
