use crate::ports::storage::ObjectStore;
use async_trait::async_trait;
use std::error::Error;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Object store rooted at a local directory. With local delivery the same
/// directory is served under `/assets`, so `<root>/<key>` mirrors the URL.
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, Box<dyn Error + Send + Sync>> {
        let relative = Path::new(key);
        if key.is_empty()
            || !relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)))
        {
            return Err(format!("invalid object key {:?}", key).into());
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn put(
        &self,
        key: &str,
        local_path: &Path,
        content_type: &str,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let dest = self.path_for(key)?;
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = tokio::fs::copy(local_path, &dest).await?;
        debug!(key = %key, content_type = %content_type, bytes, "stored object on disk");
        Ok(())
    }
}
