//! Runtime server configuration, deserialised from `config.toml` and
//! `PLOTLINE_*` environment variables.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                    String,
  #[serde(default = "default_port")]
  pub port:                    u16,
  #[serde(default = "default_store_path")]
  pub store_path:              PathBuf,
  /// Where uploaded documents are written; served under `/documents`.
  #[serde(default = "default_document_dir")]
  pub document_dir:            PathBuf,
  /// Public prefix for stored document URLs.
  #[serde(default = "default_document_base_url")]
  pub document_base_url:       String,
  #[serde(default = "default_geocoding_url")]
  pub geocoding_url:           String,
  #[serde(default)]
  pub geocoding_api_key:       String,
  /// argv of the party-name OCR program; the document path is appended.
  pub names_command:           Vec<String>,
  /// argv of the survey-sketch OCR program; the document path is appended.
  pub utm_command:             Vec<String>,
  #[serde(default = "default_extraction_timeout_secs")]
  pub extraction_timeout_secs: u64,
  #[serde(default = "default_geocoding_timeout_secs")]
  pub geocoding_timeout_secs:  u64,
  #[serde(default = "default_max_upload_bytes")]
  pub max_upload_bytes:        usize,
}

impl ServerConfig {
  pub fn extraction_timeout(&self) -> Duration {
    Duration::from_secs(self.extraction_timeout_secs)
  }

  pub fn geocoding_timeout(&self) -> Duration {
    Duration::from_secs(self.geocoding_timeout_secs)
  }
}

fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 8080 }
fn default_store_path() -> PathBuf { "~/.local/share/plotline/plotline.db".into() }
fn default_document_dir() -> PathBuf { "~/.local/share/plotline/documents".into() }
fn default_document_base_url() -> String { "http://127.0.0.1:8080/documents".into() }
fn default_geocoding_url() -> String {
  "https://maps.googleapis.com/maps/api/geocode/json".into()
}
fn default_extraction_timeout_secs() -> u64 { 60 }
fn default_geocoding_timeout_secs() -> u64 { 15 }
fn default_max_upload_bytes() -> usize { 25 * 1024 * 1024 }

/// `PLOTLINE_*` environment overrides. The OCR argv keys split on spaces,
/// e.g. `PLOTLINE_NAMES_COMMAND="plotline-ocr names"`.
pub fn environment() -> config::Environment {
  config::Environment::with_prefix("PLOTLINE")
    .try_parsing(true)
    .list_separator(" ")
    .with_list_parse_key("names_command")
    .with_list_parse_key("utm_command")
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn parse(toml: &str) -> Result<ServerConfig, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from_str(toml, config::FileFormat::Toml))
      .build()?
      .try_deserialize()
  }

  #[test]
  fn minimal_config_gets_defaults() {
    let cfg = parse(
      r#"
        names_command = ["plotline-ocr", "names"]
        utm_command   = ["plotline-ocr", "utm"]
      "#,
    )
    .unwrap();
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.extraction_timeout(), Duration::from_secs(60));
    assert_eq!(cfg.geocoding_timeout(), Duration::from_secs(15));
    assert_eq!(cfg.max_upload_bytes, 25 * 1024 * 1024);
    assert_eq!(cfg.names_command, vec!["plotline-ocr", "names"]);
    assert!(cfg.geocoding_api_key.is_empty());
  }

  #[test]
  fn ocr_commands_are_required() {
    assert!(parse("port = 9000").is_err());
  }

  #[test]
  fn environment_supplies_ocr_commands_and_numbers() {
    let vars = [
      ("PLOTLINE_NAMES_COMMAND", "python3 ocr.py names"),
      ("PLOTLINE_UTM_COMMAND", "plotline-ocr utm"),
      ("PLOTLINE_PORT", "9000"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_owned(), v.to_owned()))
    .collect();

    let cfg: ServerConfig = config::Config::builder()
      .add_source(environment().source(Some(vars)))
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap();
    assert_eq!(cfg.names_command, vec!["python3", "ocr.py", "names"]);
    assert_eq!(cfg.utm_command, vec!["plotline-ocr", "utm"]);
    assert_eq!(cfg.port, 9000);
  }

  #[test]
  fn tilde_expands_to_home() {
    let Ok(home) = std::env::var("HOME") else {
      return;
    };
    assert_eq!(expand_tilde(Path::new("~/plotline.db")), PathBuf::from(home).join("plotline.db"));
    assert_eq!(expand_tilde(Path::new("/var/lib/plotline.db")), PathBuf::from("/var/lib/plotline.db"));
  }
}
