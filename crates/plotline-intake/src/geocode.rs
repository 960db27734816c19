//! Reverse geocoding over a Google-style HTTP endpoint.

use std::time::Duration;

use async_trait::async_trait;
use plotline_core::{
  collab::{AddressComponent, CollaboratorError, ReverseGeocoder},
  plot::LatLon,
};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeocodeError {
  #[error("geocoding request failed: {0}")]
  Http(#[from] reqwest::Error),

  #[error("geocoding endpoint answered {0}")]
  Status(reqwest::StatusCode),

  /// `detail` is the endpoint's `error_message` in parentheses, or empty.
  #[error("geocoding refused the request: {status}{detail}")]
  Refused { status: String, detail: String },
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
  status:        String,
  #[serde(default)]
  results:       Vec<GeocodeResult>,
  #[serde(default)]
  error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
  #[serde(default)]
  address_components: Vec<AddressComponent>,
}

/// Calls `GET {url}?latlng={lat},{lon}&key={key}`.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct HttpGeocoder {
  client:  Client,
  url:     String,
  api_key: String,
}

impl HttpGeocoder {
  pub fn new(url: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Result<Self, GeocodeError> {
    let client = Client::builder().timeout(timeout).build()?;
    Ok(Self { client, url: url.into(), api_key: api_key.into() })
  }

  async fn lookup(&self, point: LatLon) -> Result<Vec<AddressComponent>, GeocodeError> {
    let resp = self
      .client
      .get(&self.url)
      .query(&[
        ("latlng", format!("{},{}", point.lat, point.lon)),
        ("key", self.api_key.clone()),
      ])
      .send()
      .await?;

    if !resp.status().is_success() {
      return Err(GeocodeError::Status(resp.status()));
    }
    components(resp.json().await?)
  }
}

/// Components of the first result. `ZERO_RESULTS` is an empty list; any
/// status other than `OK` is a refusal.
fn components(body: GeocodeResponse) -> Result<Vec<AddressComponent>, GeocodeError> {
  match body.status.as_str() {
    "OK" => Ok(
      body
        .results
        .into_iter()
        .next()
        .map(|r| r.address_components)
        .unwrap_or_default(),
    ),
    "ZERO_RESULTS" => Ok(Vec::new()),
    _ => Err(GeocodeError::Refused {
      status: body.status,
      detail: body.error_message.map(|m| format!(" ({m})")).unwrap_or_default(),
    }),
  }
}

#[async_trait]
impl ReverseGeocoder for HttpGeocoder {
  async fn reverse_geocode(&self, point: LatLon) -> Result<Vec<AddressComponent>, CollaboratorError> {
    Ok(self.lookup(point).await?)
  }
}
