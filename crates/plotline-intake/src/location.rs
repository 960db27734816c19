//! Location resolution: country and district for a representative point.

use std::{sync::Arc, time::Duration};

use plotline_core::{
  collab::{AddressComponent, ReverseGeocoder},
  plot::LatLon,
  submission::ResolvedLocation,
};

use crate::LocationLookupError;

const COUNTRY: &str = "country";
const ADMIN_LEVEL_2: &str = "administrative_area_level_2";
const ADMIN_LEVEL_1: &str = "administrative_area_level_1";

/// Wraps a [`ReverseGeocoder`] with a time limit and component selection.
#[derive(Clone)]
pub struct LocationResolver {
  geocoder: Arc<dyn ReverseGeocoder>,
  timeout:  Duration,
}

impl LocationResolver {
  pub fn new(geocoder: Arc<dyn ReverseGeocoder>, timeout: Duration) -> Self {
    Self { geocoder, timeout }
  }

  /// Only a failed or timed-out collaborator call is an error. A response
  /// without the wanted component types resolves to empty strings.
  pub async fn resolve(
    &self,
    point: LatLon,
  ) -> Result<ResolvedLocation, LocationLookupError> {
    let components =
      tokio::time::timeout(self.timeout, self.geocoder.reverse_geocode(point))
        .await
        .map_err(|_| LocationLookupError::TimedOut(self.timeout))?
        .map_err(LocationLookupError::Collaborator)?;

    let location = location_from_components(&components);
    tracing::debug!(
      lat = point.lat,
      lon = point.lon,
      country = %location.country,
      district = %location.district,
      "location resolved"
    );
    Ok(location)
  }
}

/// Pick the country and the most specific district out of `components`.
pub fn location_from_components(components: &[AddressComponent]) -> ResolvedLocation {
  let find = |ty: &str| {
    components
      .iter()
      .find(|c| c.has_type(ty))
      .map(|c| c.long_name.clone())
  };

  ResolvedLocation {
    country:  find(COUNTRY).unwrap_or_default(),
    district: find(ADMIN_LEVEL_2)
      .or_else(|| find(ADMIN_LEVEL_1))
      .unwrap_or_default(),
  }
}
