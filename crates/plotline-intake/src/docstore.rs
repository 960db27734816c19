//! Document storage on the local filesystem.
//!
//! Each document is written once under a content-addressed key,
//! `<label>_<sha256 prefix>_<sanitised file name>`, and served back from
//! `base_url/<key>`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use plotline_core::{
  collab::{CollaboratorError, DocumentKind, DocumentStore, UploadedDocument},
  submission::StoredDocument,
};
use sha2::{Digest, Sha256};

const HASH_PREFIX_LEN: usize = 16;

/// Writes documents into `root`; URLs are built from `base_url`.
#[derive(Debug, Clone)]
pub struct FsDocumentStore {
  root:     PathBuf,
  base_url: String,
}

impl FsDocumentStore {
  /// Create the store, making `root` if it does not exist.
  pub async fn open(root: impl Into<PathBuf>, base_url: impl Into<String>) -> std::io::Result<Self> {
    let root = root.into();
    tokio::fs::create_dir_all(&root).await?;
    Ok(Self { root, base_url: base_url.into() })
  }

  pub fn root(&self) -> &Path { &self.root }

  fn url_for(&self, key: &str) -> String {
    format!("{}/{key}", self.base_url.trim_end_matches('/'))
  }
}

/// Storage key for `document` in slot `kind`.
pub fn document_key(kind: DocumentKind, document: &UploadedDocument) -> String {
  let digest = hex::encode(Sha256::digest(&document.bytes));
  format!(
    "{}_{}_{}",
    kind.as_str(),
    &digest[..HASH_PREFIX_LEN],
    sanitise(&document.file_name)
  )
}

/// Keep ASCII alphanumerics, `.`, `-` and `_`; anything else becomes `_`.
/// Path separators never survive, so the key cannot leave the store root.
fn sanitise(file_name: &str) -> String {
  let base = file_name.rsplit(['/', '\\']).next().unwrap_or_default();
  let cleaned: String = base
    .chars()
    .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
    .collect();
  let cleaned = cleaned.trim_start_matches('.');
  if cleaned.is_empty() { "document".to_owned() } else { cleaned.to_owned() }
}

#[async_trait]
impl DocumentStore for FsDocumentStore {
  async fn put(
    &self,
    kind: DocumentKind,
    document: &UploadedDocument,
  ) -> Result<StoredDocument, CollaboratorError> {
    let key = document_key(kind, document);
    tokio::fs::write(self.root.join(&key), &document.bytes).await?;
    tracing::debug!(%kind, %key, bytes = document.bytes.len(), "document stored");

    Ok(StoredDocument {
      name: document.file_name.clone(),
      url:  self.url_for(&key),
    })
  }
}
