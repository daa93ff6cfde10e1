use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

/// A file received from a client, before it is handed to the [`MediaStore`].
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn size(&self) -> i64 {
        self.bytes.len() as i64
    }
}

/// Bytes read back from the store, with the metadata recorded at upload.
#[derive(Debug, Clone)]
pub struct Download {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Download {
    /// Attachment header for the stored name, reduced to header-safe characters.
    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", sanitize_filename(&self.filename))
    }

    /// Client-declared types that cannot be sent back as a header become octet-stream.
    pub fn header_content_type(&self) -> &str {
        let usable = !self.content_type.is_empty()
            && self
                .content_type
                .chars()
                .all(|c| c.is_ascii_graphic() || c == ' ');
        if usable {
            &self.content_type
        } else {
            "application/octet-stream"
        }
    }
}

/// Binary blob persistence. Rows only keep the returned handle.
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn put(&self, filename: &str, bytes: &[u8]) -> anyhow::Result<String>;
    async fn get(&self, key: &str) -> anyhow::Result<Vec<u8>>;
    async fn remove(&self, key: &str) -> anyhow::Result<()>;
}

pub struct LocalMediaStore {
    root: PathBuf,
}

impl LocalMediaStore {
    pub async fn new(root: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    fn path_for(&self, key: &str) -> anyhow::Result<PathBuf> {
        // keys are flat file names we generated ourselves
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            anyhow::bail!("invalid media key {key:?}");
        }
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    async fn put(&self, filename: &str, bytes: &[u8]) -> anyhow::Result<String> {
        let key = format!("{}_{}", Uuid::new_v4().simple(), sanitize_filename(filename));
        fs::write(self.path_for(&key)?, bytes).await?;
        Ok(key)
    }

    async fn get(&self, key: &str) -> anyhow::Result<Vec<u8>> {
        Ok(fs::read(self.path_for(key)?).await?)
    }

    async fn remove(&self, key: &str) -> anyhow::Result<()> {
        fs::remove_file(self.path_for(key)?).await?;
        Ok(())
    }
}

pub fn sanitize_filename(name: &str) -> String {
    let base = Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("file");
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Removes every handle, returning the ones that could not be removed.
pub async fn release_all(store: &dyn MediaStore, keys: Vec<String>) -> Vec<String> {
    let mut orphans = Vec::new();
    for key in keys {
        if let Err(err) = store.remove(&key).await {
            tracing::warn!(error = %err, key = %key, "media removal failed, leaving orphan");
            orphans.push(key);
        }
    }
    orphans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_paths_and_odd_characters() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("menu photo (1).jpg"), "menu_photo__1_.jpg");
        assert_eq!(sanitize_filename(".hidden"), "hidden");
        assert_eq!(sanitize_filename(""), "file");
    }

    #[test]
    fn download_headers_survive_hostile_upload_metadata() {
        let download = Download {
            filename: "inv\r\noice\u{7}.pdf".to_string(),
            content_type: "application/pdf\r\nX-Injected: 1".to_string(),
            bytes: Vec::new(),
        };
        let disposition = download.content_disposition();
        assert_eq!(disposition, "attachment; filename=\"inv__oice_.pdf\"");
        assert!(axum::http::HeaderValue::from_str(&disposition).is_ok());
        assert_eq!(download.header_content_type(), "application/octet-stream");

        let clean = Download {
            filename: "menu.jpg".to_string(),
            content_type: "image/jpeg".to_string(),
            bytes: Vec::new(),
        };
        assert_eq!(clean.header_content_type(), "image/jpeg");
    }
}
