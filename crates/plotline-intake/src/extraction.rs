//! Document extraction orchestrator.
//!
//! Stages an uploaded document into a request-local scratch directory, hands
//! the temporary copy to an OCR collaborator under a time limit, and checks
//! the collaborator's output against the contract. The temporary copy is
//! removed when the call returns, fails, times out, or is dropped.

use std::{future::Future, path::Path, sync::Arc, time::Duration};

use plotline_core::{
  collab::{CollaboratorError, DocumentKind, NameExtractor, UploadedDocument, UtmExtractor},
  plot::{UtmPoint, UtmZone},
  submission::PartyNames,
};
use tempfile::{NamedTempFile, TempDir};

use crate::ExtractionFailure;

// ─── Scratch space ───────────────────────────────────────────────────────────

/// A per-request directory for temporary document copies.
///
/// Everything inside is deleted when the `Scratch` is dropped.
#[derive(Debug)]
pub struct Scratch {
  dir: TempDir,
}

impl Scratch {
  pub fn new() -> std::io::Result<Self> {
    let dir = tempfile::Builder::new().prefix("plotline-").tempdir()?;
    Ok(Self { dir })
  }

  pub fn path(&self) -> &Path { self.dir.path() }

  /// Write `document` to a fresh file in the scratch directory. The file is
  /// deleted when the returned handle is dropped.
  pub async fn stage(
    &self,
    kind: DocumentKind,
    document: &UploadedDocument,
  ) -> std::io::Result<NamedTempFile> {
    let suffix = Path::new(&document.file_name)
      .extension()
      .and_then(|e| e.to_str())
      .map(|e| format!(".{e}"))
      .unwrap_or_default();

    let file = tempfile::Builder::new()
      .prefix(&format!("{kind}-"))
      .suffix(&suffix)
      .tempfile_in(self.dir.path())?;
    tokio::fs::write(file.path(), &document.bytes).await?;
    Ok(file)
  }
}

// ─── Orchestrator ────────────────────────────────────────────────────────────

/// Runs the OCR collaborators against uploaded documents.
#[derive(Clone)]
pub struct DocumentExtractor {
  names:   Arc<dyn NameExtractor>,
  utm:     Arc<dyn UtmExtractor>,
  timeout: Duration,
}

impl DocumentExtractor {
  pub fn new(
    names: Arc<dyn NameExtractor>,
    utm: Arc<dyn UtmExtractor>,
    timeout: Duration,
  ) -> Self {
    Self { names, utm, timeout }
  }

  /// Read both party names off a land-transfer document.
  ///
  /// A result where only one name was found is returned as-is; the caller
  /// decides how to fill the gap. Both names missing is
  /// [`ExtractionFailure::Empty`].
  pub async fn extract_party_names(
    &self,
    scratch: &Scratch,
    document: &UploadedDocument,
  ) -> Result<PartyNames, ExtractionFailure> {
    let kind = DocumentKind::LandTransfer;
    let raw = self
      .run(kind, scratch, document, |path| {
        let names = Arc::clone(&self.names);
        async move { names.extract_names(&path).await }
      })
      .await?;

    let names = PartyNames {
      owner_name:     clean(raw.owner_name),
      transferred_to: clean(raw.transferred_to),
    };
    if names.owner_name.is_empty() && names.transferred_to.is_empty() {
      return Err(ExtractionFailure::Empty { kind });
    }
    Ok(names)
  }

  /// Read the ordered survey points off a UTM sketch. At least one point with
  /// a valid zone and finite coordinates is required.
  pub async fn extract_utm_points(
    &self,
    scratch: &Scratch,
    document: &UploadedDocument,
  ) -> Result<Vec<UtmPoint>, ExtractionFailure> {
    let kind = DocumentKind::UtmSketch;
    let points = self
      .run(kind, scratch, document, |path| {
        let utm = Arc::clone(&self.utm);
        async move { utm.extract_utm(&path).await }
      })
      .await?;

    if points.is_empty() {
      return Err(ExtractionFailure::Empty { kind });
    }
    for (i, p) in points.iter().enumerate() {
      if let Err(e) = p.zone.parse::<UtmZone>() {
        return Err(ExtractionFailure::Malformed { kind, reason: format!("point {i}: {e}") });
      }
      if !p.easting.is_finite() || !p.northing.is_finite() {
        return Err(ExtractionFailure::Malformed {
          kind,
          reason: format!("point {i}: non-finite coordinate"),
        });
      }
    }
    Ok(points)
  }

  /// Stage, call, and clean up. `call` receives the staged file's path.
  async fn run<T, F, Fut>(
    &self,
    kind: DocumentKind,
    scratch: &Scratch,
    document: &UploadedDocument,
    call: F,
  ) -> Result<T, ExtractionFailure>
  where
    F: FnOnce(std::path::PathBuf) -> Fut,
    Fut: Future<Output = Result<T, CollaboratorError>>,
  {
    let staged = scratch
      .stage(kind, document)
      .await
      .map_err(|source| ExtractionFailure::Staging { kind, source })?;

    tracing::debug!(%kind, artifact = %staged.path().display(), "calling extraction collaborator");
    let outcome = tokio::time::timeout(self.timeout, call(staged.path().to_path_buf())).await;
    drop(staged);

    match outcome {
      Ok(Ok(value)) => Ok(value),
      Ok(Err(source)) => Err(ExtractionFailure::Collaborator { kind, source }),
      Err(_) => Err(ExtractionFailure::TimedOut { kind, after: self.timeout }),
    }
  }
}

fn clean(name: Option<String>) -> String {
  name.map(|n| n.trim().to_owned()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
  use std::{
    path::PathBuf,
    sync::Mutex,
  };

  use async_trait::async_trait;
  use bytes::Bytes;
  use plotline_core::collab::ExtractedNames;

  use super::*;

  /// Records the artifact path it was given and whether it existed.
  #[derive(Default)]
  struct Recorder {
    seen: Mutex<Vec<(PathBuf, Vec<u8>)>>,
  }

  impl Recorder {
    fn record(&self, artifact: &Path) {
      let bytes = std::fs::read(artifact).unwrap_or_default();
      self.seen.lock().unwrap().push((artifact.to_path_buf(), bytes));
    }

    fn last(&self) -> (PathBuf, Vec<u8>) {
      self.seen.lock().unwrap().last().cloned().unwrap()
    }
  }

  struct FixedNames {
    recorder: Recorder,
    result:   Result<ExtractedNames, String>,
  }

  #[async_trait]
  impl NameExtractor for FixedNames {
    async fn extract_names(&self, artifact: &Path) -> Result<ExtractedNames, CollaboratorError> {
      self.recorder.record(artifact);
      self.result.clone().map_err(Into::into)
    }
  }

  struct FixedUtm {
    recorder: Recorder,
    result:   Result<Vec<UtmPoint>, String>,
  }

  #[async_trait]
  impl UtmExtractor for FixedUtm {
    async fn extract_utm(&self, artifact: &Path) -> Result<Vec<UtmPoint>, CollaboratorError> {
      self.recorder.record(artifact);
      self.result.clone().map_err(Into::into)
    }
  }

  struct SlowNames;

  #[async_trait]
  impl NameExtractor for SlowNames {
    async fn extract_names(&self, _: &Path) -> Result<ExtractedNames, CollaboratorError> {
      tokio::time::sleep(Duration::from_secs(60)).await;
      Ok(ExtractedNames::default())
    }
  }

  fn document() -> UploadedDocument {
    UploadedDocument {
      file_name: "deed.jpg".into(),
      bytes:     Bytes::from_static(b"jpeg bytes"),
    }
  }

  fn names_ok(owner: &str, transferee: &str) -> Arc<FixedNames> {
    Arc::new(FixedNames {
      recorder: Recorder::default(),
      result:   Ok(ExtractedNames {
        owner_name:     Some(owner.into()),
        transferred_to: Some(transferee.into()),
      }),
    })
  }

  fn utm(result: Result<Vec<UtmPoint>, String>) -> Arc<FixedUtm> {
    Arc::new(FixedUtm { recorder: Recorder::default(), result })
  }

  fn extractor(
    names: Arc<dyn NameExtractor>,
    utm: Arc<dyn UtmExtractor>,
  ) -> DocumentExtractor {
    DocumentExtractor::new(names, utm, Duration::from_secs(5))
  }

  #[tokio::test]
  async fn names_are_trimmed_and_artifact_removed() {
    let names = names_ok("  ADA OBI ", "EMEKA OBI\n");
    let ex = extractor(names.clone(), utm(Ok(vec![])));
    let scratch = Scratch::new().unwrap();

    let result = ex.extract_party_names(&scratch, &document()).await.unwrap();
    assert_eq!(result.owner_name, "ADA OBI");
    assert_eq!(result.transferred_to, "EMEKA OBI");

    let (artifact, bytes) = names.recorder.last();
    assert_eq!(bytes, b"jpeg bytes");
    assert!(artifact.starts_with(scratch.path()));
    assert_eq!(artifact.extension().and_then(|e| e.to_str()), Some("jpg"));
    assert!(!artifact.exists(), "artifact should be removed after the call");
  }

  #[tokio::test]
  async fn partial_names_are_returned() {
    let names = names_ok("ADA OBI", "  ");
    let ex = extractor(names, utm(Ok(vec![])));
    let scratch = Scratch::new().unwrap();
    let result = ex.extract_party_names(&scratch, &document()).await.unwrap();
    assert_eq!(result.owner_name, "ADA OBI");
    assert!(result.transferred_to.is_empty());
  }

  #[tokio::test]
  async fn empty_names_are_an_extraction_failure() {
    let names = names_ok("", "");
    let ex = extractor(names, utm(Ok(vec![])));
    let scratch = Scratch::new().unwrap();
    let err = ex.extract_party_names(&scratch, &document()).await.unwrap_err();
    assert!(matches!(err, ExtractionFailure::Empty { kind: DocumentKind::LandTransfer }));
  }

  #[tokio::test]
  async fn collaborator_error_cleans_up_artifact() {
    let names = Arc::new(FixedNames {
      recorder: Recorder::default(),
      result:   Err("tesseract exited with status 1".into()),
    });
    let ex = extractor(names.clone(), utm(Ok(vec![])));
    let scratch = Scratch::new().unwrap();

    let err = ex.extract_party_names(&scratch, &document()).await.unwrap_err();
    assert!(matches!(err, ExtractionFailure::Collaborator { .. }));
    assert!(!names.recorder.last().0.exists());
  }

  #[tokio::test(start_paused = true)]
  async fn slow_collaborator_times_out() {
    let ex = DocumentExtractor::new(
      Arc::new(SlowNames),
      utm(Ok(vec![])),
      Duration::from_secs(2),
    );
    let scratch = Scratch::new().unwrap();
    let err = ex.extract_party_names(&scratch, &document()).await.unwrap_err();
    assert!(matches!(err, ExtractionFailure::TimedOut { .. }));
    assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
  }

  #[tokio::test]
  async fn utm_points_pass_through() {
    let points = vec![
      UtmPoint { zone: "32N".into(), easting: 309_014.0, northing: 1_463_359.0 },
      UtmPoint { zone: "32N".into(), easting: 309_034.0, northing: 1_463_362.0 },
    ];
    let fake = utm(Ok(points.clone()));
    let ex = extractor(names_ok("A", "B"), fake.clone());
    let scratch = Scratch::new().unwrap();

    assert_eq!(ex.extract_utm_points(&scratch, &document()).await.unwrap(), points);
    assert!(!fake.recorder.last().0.exists());
  }

  #[tokio::test]
  async fn empty_utm_list_is_a_failure() {
    let ex = extractor(names_ok("A", "B"), utm(Ok(vec![])));
    let scratch = Scratch::new().unwrap();
    let err = ex.extract_utm_points(&scratch, &document()).await.unwrap_err();
    assert!(matches!(err, ExtractionFailure::Empty { kind: DocumentKind::UtmSketch }));
  }

  #[tokio::test]
  async fn utm_point_with_bad_zone_is_malformed() {
    let ex = extractor(
      names_ok("A", "B"),
      utm(Ok(vec![UtmPoint { zone: "XX".into(), easting: 1.0, northing: 1.0 }])),
    );
    let scratch = Scratch::new().unwrap();
    let err = ex.extract_utm_points(&scratch, &document()).await.unwrap_err();
    assert!(matches!(err, ExtractionFailure::Malformed { .. }));
  }

  #[tokio::test]
  async fn scratch_directory_is_removed_on_drop() {
    let scratch = Scratch::new().unwrap();
    let path = scratch.path().to_path_buf();
    let _kept = scratch.stage(DocumentKind::IdProof, &document()).await.unwrap();
    assert!(path.exists());
    drop(_kept);
    drop(scratch);
    assert!(!path.exists());
  }
}
