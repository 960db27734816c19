//! OCR collaborators backed by external programs.
//!
//! The program is started with the configured arguments followed by the path
//! of the staged document, and must print JSON on stdout. The name reader
//! prints `{"ownerName": .., "transferredTo": ..}`; the sketch reader prints
//! an array of `{"zone", "easting", "northing"}` objects.

use std::{path::Path, process::Stdio};

use async_trait::async_trait;
use plotline_core::{
  collab::{CollaboratorError, ExtractedNames, NameExtractor, UtmExtractor},
  plot::UtmPoint,
};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum CommandError {
  #[error("no OCR command configured")]
  NotConfigured,

  #[error("failed to start {program}: {source}")]
  Spawn {
    program: String,
    #[source]
    source:  std::io::Error,
  },

  #[error("{program} exited with {status}: {stderr}")]
  Exit {
    program: String,
    status:  std::process::ExitStatus,
    stderr:  String,
  },

  #[error("{program} printed unreadable output: {source}")]
  Output {
    program: String,
    #[source]
    source:  serde_json::Error,
  },
}

/// An external OCR program, configured as an argv vector.
#[derive(Debug, Clone)]
pub struct CommandOcr {
  program: String,
  args:    Vec<String>,
}

impl CommandOcr {
  /// `argv[0]` is the program; the rest are passed before the document path.
  pub fn from_argv(argv: &[String]) -> Result<Self, CommandError> {
    let (program, args) = argv.split_first().ok_or(CommandError::NotConfigured)?;
    Ok(Self { program: program.clone(), args: args.to_vec() })
  }

  async fn run<T: DeserializeOwned>(&self, artifact: &Path) -> Result<T, CommandError> {
    tracing::debug!(program = %self.program, artifact = %artifact.display(), "running OCR command");

    // `kill_on_drop` ends the child when the caller's timeout drops this future.
    let output = Command::new(&self.program)
      .args(&self.args)
      .arg(artifact)
      .stdin(Stdio::null())
      .stdout(Stdio::piped())
      .stderr(Stdio::piped())
      .kill_on_drop(true)
      .output()
      .await
      .map_err(|source| CommandError::Spawn { program: self.program.clone(), source })?;

    if !output.status.success() {
      return Err(CommandError::Exit {
        program: self.program.clone(),
        status:  output.status,
        stderr:  String::from_utf8_lossy(&output.stderr).trim().to_owned(),
      });
    }

    serde_json::from_slice(&output.stdout)
      .map_err(|source| CommandError::Output { program: self.program.clone(), source })
  }
}

#[async_trait]
impl NameExtractor for CommandOcr {
  async fn extract_names(&self, artifact: &Path) -> Result<ExtractedNames, CollaboratorError> {
    Ok(self.run(artifact).await?)
  }
}

#[async_trait]
impl UtmExtractor for CommandOcr {
  async fn extract_utm(&self, artifact: &Path) -> Result<Vec<UtmPoint>, CollaboratorError> {
    Ok(self.run(artifact).await?)
  }
}
