//! The raw intake request and its validation.
//!
//! Requests arrive as loosely-typed form fields. [`validate`] turns them into
//! a [`ValidatedIntake`] or rejects them with a field-specific
//! [`IntakeError::Validation`]. Document presence is checked later, by the
//! pipeline, so that survey extraction runs first.

use plotline_core::{
  collab::UploadedDocument,
  plot::{LatLon, PlotGeometry, SketchOption},
  submission::{ContactDetails, SketchType},
};

use crate::{IntakeError, Result};

/// One intake form submission, exactly as received.
#[derive(Debug, Clone, Default)]
pub struct IntakeRequest {
  pub plot_number:     Option<String>,
  pub address:         Option<String>,
  pub land_use:        Option<String>,
  pub email:           Option<String>,
  pub mobile:          Option<String>,
  pub agent_email:     Option<String>,
  pub notes:           Option<String>,
  pub sketch_option:   Option<String>,
  pub sketch_type:     Option<String>,
  pub length:          Option<String>,
  pub width:           Option<String>,
  pub lat:             Option<String>,
  pub lon:             Option<String>,
  /// JSON array of `{"lat": .., "lon": ..}` objects.
  pub lat_lng_corners: Option<String>,
  /// Typed-in fallback for the OCR'd owner name.
  pub owner_name:      Option<String>,
  /// Typed-in fallback for the OCR'd transferee.
  pub transferred_to:  Option<String>,
  pub land_transfer:   Option<UploadedDocument>,
  pub id_proof:        Option<UploadedDocument>,
  pub utm_sketch:      Option<UploadedDocument>,
}

/// Geometry as far as it can be built from form fields alone.
#[derive(Debug, Clone)]
pub enum PendingGeometry {
  Ready(PlotGeometry),
  /// Option C: the points still have to be read off the sketch.
  AwaitingSketch {
    length: Option<f64>,
    width:  Option<f64>,
    sketch: UploadedDocument,
  },
}

/// A request that passed field validation.
#[derive(Debug, Clone)]
pub struct ValidatedIntake {
  pub plot_number:       Option<String>,
  pub address:           String,
  pub land_use:          String,
  pub contact:           ContactDetails,
  pub notes:             Option<String>,
  pub sketch_type:       SketchType,
  pub geometry:          PendingGeometry,
  pub manual_owner:      Option<String>,
  pub manual_transferee: Option<String>,
  pub land_transfer:     Option<UploadedDocument>,
  pub id_proof:          Option<UploadedDocument>,
}

/// Check common and per-option fields.
pub fn validate(request: IntakeRequest) -> Result<ValidatedIntake> {
  let address = required("address", request.address)?;
  let land_use = required("landUse", request.land_use)?;
  let email = required("email", request.email)?;
  let mobile = required("mobile", request.mobile)?;
  let option_raw = required("sketchOption", request.sketch_option)?;
  let type_raw = required("sketchType", request.sketch_type)?;

  let sketch_type: SketchType = type_raw.parse().map_err(|_| {
    IntakeError::validation(
      "sketchType",
      "must be one of \"Static Only\", \"Satellite Only\" or \"Both\"",
    )
  })?;
  let option: SketchOption = option_raw
    .parse()
    .map_err(|_| IntakeError::validation("sketchOption", "must be A, B or C"))?;

  let length = number("length", request.length)?;
  let width = number("width", request.width)?;

  let geometry = match option {
    SketchOption::A => {
      let needs = |field| {
        IntakeError::validation(
          field,
          "is required for sketch option A (length, width, map location)",
        )
      };
      let length = length.ok_or_else(|| needs("length"))?;
      let width = width.ok_or_else(|| needs("width"))?;
      let lat = number("lat", request.lat)?.ok_or_else(|| needs("lat"))?;
      let lon = number("lon", request.lon)?.ok_or_else(|| needs("lon"))?;
      PendingGeometry::Ready(PlotGeometry::PointDimensions {
        point: checked_point("lat", "lon", LatLon::new(lat, lon))?,
        length: positive("length", length)?,
        width: positive("width", width)?,
      })
    }
    SketchOption::B => {
      let corners = corners(request.lat_lng_corners)?;
      PendingGeometry::Ready(PlotGeometry::CornerPolygon {
        lat_lng_corners: corners,
        length:          length.map(|l| positive("length", l)).transpose()?,
        width:           width.map(|w| positive("width", w)).transpose()?,
      })
    }
    SketchOption::C => {
      let sketch = request.utm_sketch.ok_or_else(|| {
        IntakeError::validation("utmSketch", "file is required for sketch option C")
      })?;
      PendingGeometry::AwaitingSketch { length, width, sketch }
    }
  };

  Ok(ValidatedIntake {
    plot_number: optional(request.plot_number),
    address,
    land_use,
    contact: ContactDetails {
      email,
      mobile,
      agent_email: optional(request.agent_email),
    },
    notes: optional(request.notes),
    sketch_type,
    geometry,
    manual_owner: optional(request.owner_name),
    manual_transferee: optional(request.transferred_to),
    land_transfer: request.land_transfer,
    id_proof: request.id_proof,
  })
}

// ─── Field helpers ───────────────────────────────────────────────────────────

fn optional(value: Option<String>) -> Option<String> {
  value
    .map(|v| v.trim().to_owned())
    .filter(|v| !v.is_empty())
}

fn required(field: &'static str, value: Option<String>) -> Result<String> {
  optional(value).ok_or_else(|| IntakeError::validation(field, "is required"))
}

fn number(field: &'static str, value: Option<String>) -> Result<Option<f64>> {
  let Some(raw) = optional(value) else {
    return Ok(None);
  };
  let n: f64 = raw
    .parse()
    .map_err(|_| IntakeError::validation(field, format!("{raw:?} is not a number")))?;
  if !n.is_finite() {
    return Err(IntakeError::validation(field, "must be a finite number"));
  }
  Ok(Some(n))
}

fn positive(field: &'static str, value: f64) -> Result<f64> {
  if value > 0.0 {
    Ok(value)
  } else {
    Err(IntakeError::validation(field, "must be greater than zero"))
  }
}

fn checked_point(
  lat_field: &'static str,
  lon_field: &'static str,
  point: LatLon,
) -> Result<LatLon> {
  if !point.lat.is_finite() || !(-90.0..=90.0).contains(&point.lat) {
    return Err(IntakeError::validation(lat_field, "must be between -90 and 90"));
  }
  if !point.lon.is_finite() || !(-180.0..=180.0).contains(&point.lon) {
    return Err(IntakeError::validation(lon_field, "must be between -180 and 180"));
  }
  Ok(point)
}

fn corners(raw: Option<String>) -> Result<Vec<LatLon>> {
  const FIELD: &str = "latLngCorners";
  let raw = optional(raw).unwrap_or_else(|| "[]".to_owned());
  let corners: Vec<LatLon> = serde_json::from_str(&raw).map_err(|e| {
    IntakeError::validation(FIELD, format!("must be a JSON array of {{lat, lon}}: {e}"))
  })?;
  if corners.len() < 4 {
    return Err(IntakeError::validation(
      FIELD,
      format!(
        "at least 4 lat/lon pairs are required for sketch option B, got {}",
        corners.len()
      ),
    ));
  }
  corners
    .into_iter()
    .map(|p| checked_point(FIELD, FIELD, p))
    .collect()
}

#[cfg(test)]
mod tests {
  use bytes::Bytes;

  use super::*;

  fn base() -> IntakeRequest {
    IntakeRequest {
      address: Some("12 Allen Avenue, Ikeja".into()),
      land_use: Some("Residential".into()),
      email: Some("ada@example.com".into()),
      mobile: Some("+2348000000000".into()),
      sketch_type: Some("Static Only".into()),
      ..Default::default()
    }
  }

  fn option_a() -> IntakeRequest {
    IntakeRequest {
      sketch_option: Some("a".into()),
      length: Some("30".into()),
      width: Some("18.5".into()),
      lat: Some("6.6018".into()),
      lon: Some("3.3515".into()),
      ..base()
    }
  }

  fn field_of(err: IntakeError) -> &'static str {
    match err {
      IntakeError::Validation { field, .. } => field,
      other => panic!("expected validation error, got {other:?}"),
    }
  }

  #[test]
  fn option_a_builds_point_geometry() {
    let v = validate(option_a()).unwrap();
    let PendingGeometry::Ready(PlotGeometry::PointDimensions { point, length, width }) =
      v.geometry
    else {
      panic!("expected option A geometry");
    };
    assert_eq!(point, LatLon::new(6.6018, 3.3515));
    assert_eq!((length, width), (30.0, 18.5));
  }

  #[test]
  fn missing_common_field_names_the_field() {
    let mut req = option_a();
    req.mobile = Some("   ".into());
    assert_eq!(field_of(validate(req).unwrap_err()), "mobile");
  }

  #[test]
  fn sketch_type_outside_the_set_is_rejected() {
    let mut req = option_a();
    req.sketch_type = Some("Satellite".into());
    assert_eq!(field_of(validate(req).unwrap_err()), "sketchType");
  }

  #[test]
  fn unknown_sketch_option_is_rejected() {
    let mut req = option_a();
    req.sketch_option = Some("D".into());
    assert_eq!(field_of(validate(req).unwrap_err()), "sketchOption");
  }

  #[test]
  fn option_a_without_lon_is_rejected() {
    let mut req = option_a();
    req.lon = None;
    assert_eq!(field_of(validate(req).unwrap_err()), "lon");
  }

  #[test]
  fn non_numeric_length_is_rejected() {
    let mut req = option_a();
    req.length = Some("thirty".into());
    assert_eq!(field_of(validate(req).unwrap_err()), "length");
  }

  #[test]
  fn out_of_range_latitude_is_rejected() {
    let mut req = option_a();
    req.lat = Some("91".into());
    assert_eq!(field_of(validate(req).unwrap_err()), "lat");
  }

  #[test]
  fn option_b_needs_four_corners() {
    let req = IntakeRequest {
      sketch_option: Some("B".into()),
      lat_lng_corners: Some(r#"[{"lat":6.5,"lon":3.3},{"lat":6.5,"lon":3.301},{"lat":6.501,"lon":3.301}]"#.into()),
      ..base()
    };
    assert_eq!(field_of(validate(req).unwrap_err()), "latLngCorners");
  }

  #[test]
  fn option_b_rejects_malformed_corner_json() {
    let req = IntakeRequest {
      sketch_option: Some("B".into()),
      lat_lng_corners: Some("not json".into()),
      ..base()
    };
    assert_eq!(field_of(validate(req).unwrap_err()), "latLngCorners");
  }

  #[test]
  fn option_b_dimensions_are_optional() {
    let req = IntakeRequest {
      sketch_option: Some("B".into()),
      lat_lng_corners: Some(
        r#"[{"lat":6.5,"lon":3.3},{"lat":6.5,"lon":3.301},{"lat":6.501,"lon":3.301},{"lat":6.501,"lon":3.3}]"#.into(),
      ),
      ..base()
    };
    let v = validate(req).unwrap();
    let PendingGeometry::Ready(PlotGeometry::CornerPolygon { lat_lng_corners, length, width }) =
      v.geometry
    else {
      panic!("expected option B geometry");
    };
    assert_eq!(lat_lng_corners.len(), 4);
    assert_eq!((length, width), (None, None));
  }

  #[test]
  fn option_c_requires_the_sketch_document() {
    let req = IntakeRequest { sketch_option: Some("C".into()), ..base() };
    assert_eq!(field_of(validate(req).unwrap_err()), "utmSketch");

    let req = IntakeRequest {
      sketch_option: Some("C".into()),
      utm_sketch: Some(UploadedDocument {
        file_name: "sketch.png".into(),
        bytes:     Bytes::from_static(b"png"),
      }),
      ..base()
    };
    assert!(matches!(
      validate(req).unwrap().geometry,
      PendingGeometry::AwaitingSketch { .. }
    ));
  }

  #[test]
  fn blank_manual_names_count_as_absent() {
    let mut req = option_a();
    req.owner_name = Some("  ".into());
    req.transferred_to = Some(" EMEKA OBI ".into());
    let v = validate(req).unwrap();
    assert_eq!(v.manual_owner, None);
    assert_eq!(v.manual_transferee.as_deref(), Some("EMEKA OBI"));
  }
}
