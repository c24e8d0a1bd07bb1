//! Object storage abstraction
//!
//! Handlers and services only see the [`ObjectStorage`] trait; the concrete
//! backend is injected through [`crate::state::AppState`]. The default
//! backend writes to the local filesystem and serves files back under a
//! configured public base URL.

use async_trait::async_trait;
use std::path::PathBuf;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `data` at the storage-relative `path`, returning the public URL.
    /// Writing to an existing path overwrites it.
    async fn upload(&self, data: Vec<u8>, path: &str) -> Result<String, BoxError>;

    /// Remove the objects at the given storage-relative paths. Paths that
    /// no longer exist are not an error.
    async fn delete(&self, paths: &[String]) -> Result<(), BoxError>;

    /// Map a public URL back to its storage-relative path. Returns `None`
    /// for URLs this backend did not issue; callers skip those.
    fn url_to_path(&self, url: &str) -> Option<String>;
}

/// Filesystem-backed storage
pub struct FsStorage {
    root: PathBuf,
    public_base: String,
}

impl FsStorage {
    pub fn new(root: PathBuf, public_base: String) -> Self {
        Self {
            root,
            public_base: public_base.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ObjectStorage for FsStorage {
    async fn upload(&self, data: Vec<u8>, path: &str) -> Result<String, BoxError> {
        let full = self.root.join(path);
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&full, data).await?;
        Ok(format!("{}/{}", self.public_base, path))
    }

    async fn delete(&self, paths: &[String]) -> Result<(), BoxError> {
        for path in paths {
            match tokio::fs::remove_file(self.root.join(path)).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    fn url_to_path(&self, url: &str) -> Option<String> {
        url.strip_prefix(&format!("{}/", self.public_base))
            .filter(|rest| !rest.is_empty())
            .map(str::to_string)
    }
}

#[cfg(test)]
pub mod test_support {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    pub const MEM_BASE: &str = "mem://assets";

    /// In-memory backend for service tests.
    #[derive(Default)]
    pub struct MemoryStorage {
        pub objects: Mutex<HashMap<String, Vec<u8>>>,
    }

    impl MemoryStorage {
        pub fn len(&self) -> usize {
            self.objects.lock().unwrap().len()
        }

        pub fn contains(&self, path: &str) -> bool {
            self.objects.lock().unwrap().contains_key(path)
        }
    }

    #[async_trait]
    impl ObjectStorage for MemoryStorage {
        async fn upload(&self, data: Vec<u8>, path: &str) -> Result<String, BoxError> {
            self.objects.lock().unwrap().insert(path.to_string(), data);
            Ok(format!("{MEM_BASE}/{path}"))
        }

        async fn delete(&self, paths: &[String]) -> Result<(), BoxError> {
            let mut objects = self.objects.lock().unwrap();
            for path in paths {
                objects.remove(path);
            }
            Ok(())
        }

        fn url_to_path(&self, url: &str) -> Option<String> {
            url.strip_prefix(&format!("{MEM_BASE}/")).map(str::to_string)
        }
    }

    /// Uploads succeed, deletes always fail. Exercises the abort path of
    /// bulk deletions.
    #[derive(Default)]
    pub struct FailingStorage {
        pub inner: MemoryStorage,
    }

    #[async_trait]
    impl ObjectStorage for FailingStorage {
        async fn upload(&self, data: Vec<u8>, path: &str) -> Result<String, BoxError> {
            self.inner.upload(data, path).await
        }

        async fn delete(&self, _paths: &[String]) -> Result<(), BoxError> {
            Err("storage backend unavailable".into())
        }

        fn url_to_path(&self, url: &str) -> Option<String> {
            self.inner.url_to_path(url)
        }
    }
}
