//! Plot geometry: the three source shapes a plot description arrives in.
//!
//! Every submission carries exactly one [`PlotGeometry`] variant. The variant
//! is fixed at intake; consumers match on it exhaustively to pick a
//! representative point and to format dimensions.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, GeometryError, geometry};

// ─── Points ──────────────────────────────────────────────────────────────────

/// A WGS84 geodetic coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
  pub lat: f64,
  pub lon: f64,
}

impl LatLon {
  pub fn new(lat: f64, lon: f64) -> Self { Self { lat, lon } }
}

/// A projected UTM coordinate as read off a survey sketch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UtmPoint {
  /// Zone string such as `"32N"`; see [`UtmZone`].
  pub zone:     String,
  pub easting:  f64,
  pub northing: f64,
}

// ─── Zones ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hemisphere {
  North,
  South,
}

/// A parsed UTM zone: number 1..=60 plus hemisphere.
///
/// Accepts `"32N"`, `"56S"` (case-insensitive) or a bare `"32"`, which is
/// taken as northern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UtmZone {
  pub number:     u8,
  pub hemisphere: Hemisphere,
}

impl UtmZone {
  /// Longitude of the zone's central meridian, in degrees.
  pub fn central_meridian(&self) -> f64 {
    f64::from(self.number) * 6.0 - 183.0
  }
}

impl FromStr for UtmZone {
  type Err = GeometryError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let trimmed = s.trim();
    let invalid = || GeometryError::InvalidZone(s.to_owned());

    let (digits, hemisphere) = match trimmed.chars().last() {
      Some(c) if c.eq_ignore_ascii_case(&'n') => {
        (&trimmed[..trimmed.len() - 1], Hemisphere::North)
      }
      Some(c) if c.eq_ignore_ascii_case(&'s') => {
        (&trimmed[..trimmed.len() - 1], Hemisphere::South)
      }
      Some(c) if c.is_ascii_digit() => (trimmed, Hemisphere::North),
      _ => return Err(invalid()),
    };

    let number: u8 = digits.trim().parse().map_err(|_| invalid())?;
    if !(1..=60).contains(&number) {
      return Err(invalid());
    }
    Ok(Self { number, hemisphere })
  }
}

impl fmt::Display for UtmZone {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let h = match self.hemisphere {
      Hemisphere::North => 'N',
      Hemisphere::South => 'S',
    };
    write!(f, "{}{h}", self.number)
  }
}

// ─── Sketch option ───────────────────────────────────────────────────────────

/// The intake-form label for each geometry variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SketchOption {
  /// Point plus declared dimensions.
  A,
  /// Corner polygon.
  B,
  /// Surveyed UTM sketch.
  C,
}

impl SketchOption {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::A => "A",
      Self::B => "B",
      Self::C => "C",
    }
  }
}

impl FromStr for SketchOption {
  type Err = Error;

  /// Surrounding whitespace and letter case are ignored.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_uppercase().as_str() {
      "A" => Ok(Self::A),
      "B" => Ok(Self::B),
      "C" => Ok(Self::C),
      _ => Err(Error::UnknownSketchOption(s.to_owned())),
    }
  }
}

// ─── Geometry ────────────────────────────────────────────────────────────────

/// The plot description, tagged by the sketch option it was submitted under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "sketchOption")]
pub enum PlotGeometry {
  /// A single map point with declared length and width in meters.
  #[serde(rename = "A")]
  PointDimensions {
    point:  LatLon,
    length: f64,
    width:  f64,
  },

  /// Four or more ordered corner points.
  #[serde(rename = "B", rename_all = "camelCase")]
  CornerPolygon {
    lat_lng_corners: Vec<LatLon>,
    length:          Option<f64>,
    width:           Option<f64>,
  },

  /// Points extracted from a scanned survey sketch.
  #[serde(rename = "C", rename_all = "camelCase")]
  SurveyedSketch {
    utm_coords: Vec<UtmPoint>,
    /// Declared by the submitter; kept for reference only.
    length:     Option<f64>,
    width:      Option<f64>,
  },
}

impl PlotGeometry {
  pub fn option(&self) -> SketchOption {
    match self {
      Self::PointDimensions { .. } => SketchOption::A,
      Self::CornerPolygon { .. } => SketchOption::B,
      Self::SurveyedSketch { .. } => SketchOption::C,
    }
  }

  /// The single point used for administrative location lookup: the point
  /// itself, the mean of the corners, or the geodetic centroid of the UTM
  /// points.
  pub fn representative_point(&self) -> Result<LatLon, GeometryError> {
    match self {
      Self::PointDimensions { point, .. } => Ok(*point),
      Self::CornerPolygon { lat_lng_corners, .. } => {
        geometry::mean_point(lat_lng_corners)
      }
      Self::SurveyedSketch { utm_coords, .. } => {
        geometry::utm_to_geodetic_centroid(utm_coords)
      }
    }
  }

  /// Plot dimensions according to the variant's sourcing rule.
  pub fn dimensions(&self) -> Result<Dimensions, GeometryError> {
    match self {
      Self::PointDimensions { length, width, .. } => {
        Ok(Dimensions::Declared { length: *length, width: *width })
      }
      Self::CornerPolygon { lat_lng_corners, length, width } => {
        match (length, width) {
          (Some(length), Some(width)) => {
            Ok(Dimensions::Declared { length: *length, width: *width })
          }
          _ => geometry::dimensions_from_corners(lat_lng_corners),
        }
      }
      Self::SurveyedSketch { utm_coords, .. } => {
        geometry::dimensions_from_utm(utm_coords)
      }
    }
  }
}

// ─── Dimensions ──────────────────────────────────────────────────────────────

/// Plot dimensions in meters, rendered as `"<A>m x <B>m"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Dimensions {
  /// Entered by the submitter; printed at the precision given.
  Declared { length: f64, width: f64 },
  /// Derived from coordinates; printed with two decimals.
  Measured { first: f64, second: f64 },
}

impl fmt::Display for Dimensions {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Declared { length, width } => write!(f, "{length}m x {width}m"),
      Self::Measured { first, second } => write!(f, "{first:.2}m x {second:.2}m"),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn zone_parses_hemisphere_suffix() {
    let z: UtmZone = "32N".parse().unwrap();
    assert_eq!(z, UtmZone { number: 32, hemisphere: Hemisphere::North });

    let z: UtmZone = " 56s ".parse().unwrap();
    assert_eq!(z, UtmZone { number: 56, hemisphere: Hemisphere::South });

    let z: UtmZone = "18".parse().unwrap();
    assert_eq!(z.hemisphere, Hemisphere::North);
    assert_eq!(z.to_string(), "18N");
  }

  #[test]
  fn zone_rejects_garbage() {
    for bad in ["", "N", "0N", "61S", "32P", "abc"] {
      assert!(bad.parse::<UtmZone>().is_err(), "{bad:?} should not parse");
    }
  }

  #[test]
  fn central_meridian_of_zone_31_is_three_degrees() {
    let z: UtmZone = "31N".parse().unwrap();
    assert_eq!(z.central_meridian(), 3.0);
  }

  #[test]
  fn sketch_option_is_trimmed_and_case_insensitive() {
    assert_eq!(" b ".parse::<SketchOption>().unwrap(), SketchOption::B);
    assert!("D".parse::<SketchOption>().is_err());
  }

  #[test]
  fn declared_dimensions_keep_raw_precision() {
    let d = Dimensions::Declared { length: 20.0, width: 15.5 };
    assert_eq!(d.to_string(), "20m x 15.5m");
  }

  #[test]
  fn measured_dimensions_use_two_decimals() {
    let d = Dimensions::Measured { first: 20.223_748, second: 22.360_679 };
    assert_eq!(d.to_string(), "20.22m x 22.36m");
  }

  #[test]
  fn corner_polygon_prefers_declared_dimensions() {
    let geometry = PlotGeometry::CornerPolygon {
      lat_lng_corners: vec![
        LatLon::new(6.5, 3.3),
        LatLon::new(6.5, 3.301),
        LatLon::new(6.501, 3.301),
        LatLon::new(6.501, 3.3),
      ],
      length:          Some(30.0),
      width:           Some(40.0),
    };
    assert_eq!(geometry.dimensions().unwrap().to_string(), "30m x 40m");
  }

  #[test]
  fn geometry_serialises_with_sketch_option_tag() {
    let geometry = PlotGeometry::PointDimensions {
      point:  LatLon::new(6.5, 3.3),
      length: 20.0,
      width:  10.0,
    };
    let json = serde_json::to_value(&geometry).unwrap();
    assert_eq!(json["sketchOption"], "A");
    assert_eq!(json["point"]["lat"], 6.5);

    let back: PlotGeometry = serde_json::from_value(json).unwrap();
    assert_eq!(back.option(), SketchOption::A);
  }
}
