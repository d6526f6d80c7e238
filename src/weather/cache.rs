use std::path::PathBuf;

use crate::error::FetchError;

/// Successful archive responses stored on disk, one file per request key.
/// Entries never expire. Assumes a single writer.
#[derive(Debug, Clone, Default)]
pub struct ResponseCache {
    dir: Option<PathBuf>,
}

impl ResponseCache {
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self { dir }
    }

    pub fn is_enabled(&self) -> bool {
        self.dir.is_some()
    }

    fn entry_path(&self, key: &str) -> Option<PathBuf> {
        self.dir
            .as_ref()
            .map(|dir| dir.join(format!("archive_{}.json", key)))
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        let path = self.entry_path(key)?;
        tokio::fs::read_to_string(&path).await.ok()
    }

    pub async fn put(&self, key: &str, body: &str) -> Result<(), FetchError> {
        let (Some(dir), Some(path)) = (self.dir.as_ref(), self.entry_path(key)) else {
            return Ok(());
        };

        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| FetchError::Cache(format!("{}: {}", dir.display(), e)))?;

        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, body)
            .await
            .map_err(|e| FetchError::Cache(format!("{}: {}", tmp.display(), e)))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| FetchError::Cache(format!("{}: {}", path.display(), e)))
    }
}
