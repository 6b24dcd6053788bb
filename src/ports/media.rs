use crate::domain::orientation::{ClassifyError, ProbeMetadata};
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

/// Suffix appended to a staged file to name its remuxed copy.
pub const REMUX_SUFFIX: &str = ".processing";

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("probe exited with {status}: {stderr}")]
    Probe { status: ExitStatus, stderr: String },

    #[error("could not parse probe output: {0}")]
    Parse(String),

    #[error("no video stream found")]
    NoVideoStream,

    #[error("remux exited with {status}: {stderr}")]
    Remux { status: ExitStatus, stderr: String },

    #[error("remux output {0:?} is empty")]
    EmptyOutput(PathBuf),

    #[error("media library error: {0}")]
    Library(String),

    #[error("media I/O error: {0}")]
    Io(#[from] io::Error),
}

impl From<ClassifyError> for MediaError {
    fn from(err: ClassifyError) -> Self {
        match err {
            ClassifyError::NoVideoStream => MediaError::NoVideoStream,
            // a video stream without dimensions is malformed probe output
            missing @ ClassifyError::MissingDimensions { .. } => {
                MediaError::Parse(missing.to_string())
            }
        }
    }
}

/// Container inspection and fast-start remuxing.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaInspector: Send + Sync {
    /// Inspect the container and report its streams.
    async fn probe(&self, path: &Path) -> Result<ProbeMetadata, MediaError>;

    /// Copy the streams into a new container at `remux_output_path(path)`
    /// with the index moved to the head of the file. No re-encode.
    async fn remux_faststart(&self, path: &Path) -> Result<PathBuf, MediaError>;
}

pub fn remux_output_path(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_owned();
    os.push(REMUX_SUFFIX);
    PathBuf::from(os)
}
