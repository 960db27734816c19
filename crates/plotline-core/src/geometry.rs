//! The geometry engine: pure functions over geodetic and projected points.
//!
//! Nothing here performs I/O. Projected distances are planar (meters on the
//! UTM grid); geodetic distances use the haversine formula on a sphere.

use crate::{
  GeometryError,
  plot::{Dimensions, Hemisphere, LatLon, UtmPoint, UtmZone},
};

/// Mean Earth radius used by [`haversine_distance`], in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

// WGS84 ellipsoid and UTM scale factor.
const WGS84_A: f64 = 6_378_137.0;
const WGS84_F: f64 = 1.0 / 298.257_223_563;
const UTM_K0: f64 = 0.9996;
const UTM_FALSE_EASTING: f64 = 500_000.0;
const UTM_FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

// ─── Planar ──────────────────────────────────────────────────────────────────

/// Edge lengths of the closed polygon through `points`, wrapping last→first.
///
/// Returns an empty vector for fewer than two points.
pub fn side_lengths(points: &[UtmPoint]) -> Vec<f64> {
  if points.len() < 2 {
    return Vec::new();
  }
  points
    .iter()
    .zip(points.iter().cycle().skip(1))
    .map(|(curr, next)| {
      (next.easting - curr.easting).hypot(next.northing - curr.northing)
    })
    .collect()
}

/// Shortest and longest polygon edge, in that order.
///
/// These are the global extremes over all edges, not a pair of adjacent
/// sides; for a skewed quadrilateral the two may belong to opposite edges.
/// A single point has no edges and measures `0.00m x 0.00m`.
pub fn dimensions_from_utm(
  points: &[UtmPoint],
) -> Result<Dimensions, GeometryError> {
  if points.is_empty() {
    return Err(GeometryError::Empty);
  }
  let sides = side_lengths(points);
  if sides.is_empty() {
    return Ok(Dimensions::Measured { first: 0.0, second: 0.0 });
  }
  if sides.iter().any(|s| !s.is_finite()) {
    return Err(GeometryError::NonFinite);
  }
  let first = sides.iter().copied().fold(f64::INFINITY, f64::min);
  let second = sides.iter().copied().fold(f64::NEG_INFINITY, f64::max);
  Ok(Dimensions::Measured { first, second })
}

// ─── Projection ──────────────────────────────────────────────────────────────

/// Inverse transverse Mercator: a UTM grid coordinate to WGS84 lat/lon.
///
/// Series expansion after Snyder (USGS Professional Paper 1395); sub-meter
/// accurate within a zone.
pub fn utm_to_lat_lon(easting: f64, northing: f64, zone: UtmZone) -> LatLon {
  let e2 = WGS84_F * (2.0 - WGS84_F);
  let ep2 = e2 / (1.0 - e2);
  let e1 = (1.0 - (1.0 - e2).sqrt()) / (1.0 + (1.0 - e2).sqrt());

  let x = easting - UTM_FALSE_EASTING;
  let y = match zone.hemisphere {
    Hemisphere::North => northing,
    Hemisphere::South => northing - UTM_FALSE_NORTHING_SOUTH,
  };

  let m = y / UTM_K0;
  let mu = m
    / (WGS84_A
      * (1.0 - e2 / 4.0 - 3.0 * e2.powi(2) / 64.0 - 5.0 * e2.powi(3) / 256.0));

  // Footpoint latitude.
  let phi1 = mu
    + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
    + (21.0 * e1.powi(2) / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
    + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
    + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();

  let (sin1, cos1) = phi1.sin_cos();
  let tan1 = phi1.tan();
  let n1 = WGS84_A / (1.0 - e2 * sin1 * sin1).sqrt();
  let t1 = tan1 * tan1;
  let c1 = ep2 * cos1 * cos1;
  let r1 = WGS84_A * (1.0 - e2) / (1.0 - e2 * sin1 * sin1).powf(1.5);
  let d = x / (n1 * UTM_K0);

  let lat = phi1
    - (n1 * tan1 / r1)
      * (d.powi(2) / 2.0
        - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1.powi(2) - 9.0 * ep2)
          * d.powi(4)
          / 24.0
        + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1.powi(2)
          - 252.0 * ep2
          - 3.0 * c1.powi(2))
          * d.powi(6)
          / 720.0);

  let lon = zone.central_meridian().to_radians()
    + (d - (1.0 + 2.0 * t1 + c1) * d.powi(3) / 6.0
      + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1.powi(2)
        + 8.0 * ep2
        + 24.0 * t1.powi(2))
        * d.powi(5)
        / 120.0)
      / cos1;

  LatLon::new(lat.to_degrees(), lon.to_degrees())
}

/// Average the grid coordinates, then project the mean to lat/lon.
///
/// All points are taken to share the first point's zone.
pub fn utm_to_geodetic_centroid(
  points: &[UtmPoint],
) -> Result<LatLon, GeometryError> {
  let first = points.first().ok_or(GeometryError::Empty)?;
  let zone: UtmZone = first.zone.parse()?;

  let n = points.len() as f64;
  let easting = points.iter().map(|p| p.easting).sum::<f64>() / n;
  let northing = points.iter().map(|p| p.northing).sum::<f64>() / n;
  if !easting.is_finite() || !northing.is_finite() {
    return Err(GeometryError::NonFinite);
  }

  Ok(utm_to_lat_lon(easting, northing, zone))
}

// ─── Geodetic ────────────────────────────────────────────────────────────────

/// Great-circle distance in meters between two points given in degrees.
pub fn haversine_distance(a: LatLon, b: LatLon) -> f64 {
  let phi1 = a.lat.to_radians();
  let phi2 = b.lat.to_radians();
  let d_phi = (b.lat - a.lat).to_radians();
  let d_lambda = (b.lon - a.lon).to_radians();

  let h = (d_phi / 2.0).sin().powi(2)
    + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
  // Rounding can push h past 1 for antipodal pairs.
  let h = h.min(1.0);
  2.0 * EARTH_RADIUS_M * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Arithmetic mean of a set of corners.
pub fn mean_point(corners: &[LatLon]) -> Result<LatLon, GeometryError> {
  if corners.is_empty() {
    return Err(GeometryError::Empty);
  }
  let n = corners.len() as f64;
  Ok(LatLon::new(
    corners.iter().map(|p| p.lat).sum::<f64>() / n,
    corners.iter().map(|p| p.lon).sum::<f64>() / n,
  ))
}

/// North span × east span of a corner set, in meters.
///
/// The north span runs between the extreme latitudes along the first
/// corner's meridian; the east span between the extreme longitudes along the
/// first corner's parallel. An axis-aligned approximation, not the polygon's
/// true width.
pub fn dimensions_from_corners(
  corners: &[LatLon],
) -> Result<Dimensions, GeometryError> {
  let anchor = corners.first().ok_or(GeometryError::Empty)?;
  if corners.iter().any(|p| !p.lat.is_finite() || !p.lon.is_finite()) {
    return Err(GeometryError::NonFinite);
  }

  let (min_lat, max_lat) = extremes(corners.iter().map(|p| p.lat));
  let (min_lon, max_lon) = extremes(corners.iter().map(|p| p.lon));

  let north = haversine_distance(
    LatLon::new(min_lat, anchor.lon),
    LatLon::new(max_lat, anchor.lon),
  );
  let east = haversine_distance(
    LatLon::new(anchor.lat, min_lon),
    LatLon::new(anchor.lat, max_lon),
  );
  Ok(Dimensions::Measured { first: north, second: east })
}

fn extremes(values: impl Iterator<Item = f64>) -> (f64, f64) {
  values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
    (lo.min(v), hi.max(v))
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  fn utm(zone: &str, easting: f64, northing: f64) -> UtmPoint {
    UtmPoint { zone: zone.into(), easting, northing }
  }

  fn survey_plot() -> Vec<UtmPoint> {
    vec![
      utm("32N", 309_014.0, 1_463_359.0),
      utm("32N", 309_034.0, 1_463_362.0),
      utm("32N", 309_038.0, 1_463_384.0),
      utm("32N", 309_018.0, 1_463_381.0),
    ]
  }

  // ── side_lengths / dimensions_from_utm ─────────────────────────────────────

  #[test]
  fn square_of_side_ten_has_four_sides_of_ten() {
    let square = vec![
      utm("32N", 0.0, 0.0),
      utm("32N", 10.0, 0.0),
      utm("32N", 10.0, 10.0),
      utm("32N", 0.0, 10.0),
    ];
    let sides = side_lengths(&square);
    assert_eq!(sides.len(), 4);
    for s in sides {
      assert!((s - 10.0).abs() < 1e-9, "side {s}");
    }
  }

  #[test]
  fn side_lengths_wrap_last_to_first() {
    let sides = side_lengths(&[utm("32N", 0.0, 0.0), utm("32N", 3.0, 4.0)]);
    assert_eq!(sides, vec![5.0, 5.0]);
  }

  #[test]
  fn side_lengths_of_single_point_is_empty() {
    assert!(side_lengths(&[utm("32N", 1.0, 1.0)]).is_empty());
    assert!(side_lengths(&[]).is_empty());
  }

  #[test]
  fn utm_dimensions_are_global_min_and_max_edges() {
    let points = survey_plot();
    let sides = side_lengths(&points);
    let Dimensions::Measured { first, second } =
      dimensions_from_utm(&points).unwrap()
    else {
      panic!("expected measured dimensions");
    };
    assert!(first >= 0.0 && first <= second);
    assert!(sides.contains(&first));
    assert!(sides.contains(&second));
    assert_eq!(
      dimensions_from_utm(&points).unwrap().to_string(),
      "20.22m x 22.36m"
    );
  }

  #[test]
  fn skewed_quadrilateral_reports_non_adjacent_extremes() {
    // Shortest edge is 0→1, longest is 2→3; they are opposite sides.
    let points = vec![
      utm("32N", 0.0, 0.0),
      utm("32N", 1.0, 0.0),
      utm("32N", 4.0, 4.0),
      utm("32N", -4.0, 4.0),
    ];
    let sides = side_lengths(&points);
    assert_eq!(&sides[..3], &[1.0, 5.0, 8.0]);
    assert!((sides[3] - 32f64.sqrt()).abs() < 1e-12);
    let Dimensions::Measured { first, second } =
      dimensions_from_utm(&points).unwrap()
    else {
      panic!("expected measured dimensions");
    };
    assert_eq!(first, 1.0);
    assert_eq!(second, 8.0);
  }

  #[test]
  fn single_utm_point_measures_zero_by_zero() {
    let dims = dimensions_from_utm(&[utm("32N", 1.0, 1.0)]).unwrap();
    assert_eq!(dims, Dimensions::Measured { first: 0.0, second: 0.0 });
    assert_eq!(dims.to_string(), "0.00m x 0.00m");
  }

  #[test]
  fn utm_dimensions_of_nothing_is_an_error() {
    assert_eq!(dimensions_from_utm(&[]), Err(GeometryError::Empty));
  }

  // ── projection ─────────────────────────────────────────────────────────────

  #[test]
  fn inverse_projection_northern_hemisphere() {
    // Statue of Liberty, zone 18N.
    let zone: UtmZone = "18N".parse().unwrap();
    let p = utm_to_lat_lon(580_735.870_7, 4_504_695.165_4, zone);
    assert!((p.lat - 40.6892).abs() < 1e-6, "lat {}", p.lat);
    assert!((p.lon + 74.0445).abs() < 1e-6, "lon {}", p.lon);
  }

  #[test]
  fn inverse_projection_southern_hemisphere() {
    // Sydney Opera House, zone 56S.
    let zone: UtmZone = "56S".parse().unwrap();
    let p = utm_to_lat_lon(334_900.569_7, 6_252_288.752_8, zone);
    assert!((p.lat + 33.8568).abs() < 1e-6, "lat {}", p.lat);
    assert!((p.lon - 151.2153).abs() < 1e-6, "lon {}", p.lon);
  }

  #[test]
  fn false_origin_maps_to_central_meridian_on_equator() {
    let zone: UtmZone = "31N".parse().unwrap();
    let p = utm_to_lat_lon(500_000.0, 0.0, zone);
    assert!(p.lat.abs() < 1e-12);
    assert!((p.lon - 3.0).abs() < 1e-12);
  }

  #[test]
  fn centroid_projects_mean_of_points() {
    let c = utm_to_geodetic_centroid(&survey_plot()).unwrap();
    assert!((c.lat - 13.231_160).abs() < 1e-5, "lat {}", c.lat);
    assert!((c.lon - 7.237_524).abs() < 1e-5, "lon {}", c.lon);
  }

  #[test]
  fn centroid_is_independent_of_point_order() {
    let points = survey_plot();
    let mut shuffled = points.clone();
    shuffled.reverse();
    shuffled.swap(0, 2);

    let a = utm_to_geodetic_centroid(&points).unwrap();
    let b = utm_to_geodetic_centroid(&shuffled).unwrap();
    assert!((a.lat - b.lat).abs() < 1e-9);
    assert!((a.lon - b.lon).abs() < 1e-9);
  }

  #[test]
  fn centroid_of_nothing_is_an_error() {
    assert_eq!(utm_to_geodetic_centroid(&[]), Err(GeometryError::Empty));
  }

  #[test]
  fn centroid_rejects_bad_zone() {
    let err = utm_to_geodetic_centroid(&[utm("99X", 1.0, 1.0)]).unwrap_err();
    assert!(matches!(err, GeometryError::InvalidZone(_)));
  }

  // ── haversine ──────────────────────────────────────────────────────────────

  #[test]
  fn haversine_of_point_to_itself_is_zero() {
    for p in [
      LatLon::new(0.0, 0.0),
      LatLon::new(51.5007, -0.1246),
      LatLon::new(-89.9, 179.9),
    ] {
      assert_eq!(haversine_distance(p, p), 0.0);
    }
  }

  #[test]
  fn haversine_is_symmetric() {
    let a = LatLon::new(51.5007, -0.1246);
    let b = LatLon::new(40.6892, -74.0445);
    assert_eq!(haversine_distance(a, b), haversine_distance(b, a));
    assert!((haversine_distance(a, b) - 5_574_840.457).abs() < 0.01);
  }

  #[test]
  fn haversine_of_antipodal_points_is_half_circumference() {
    let half = std::f64::consts::PI * EARTH_RADIUS_M;
    for (a, b) in [
      (LatLon::new(31.76, 58.49), LatLon::new(-31.76, 238.49)),
      (LatLon::new(0.0, 0.0), LatLon::new(0.0, 180.0)),
      (LatLon::new(-12.345, -170.5), LatLon::new(12.345, 9.5)),
    ] {
      let d = haversine_distance(a, b);
      assert!(d.is_finite(), "{a:?} {b:?}");
      assert!((d - half).abs() < 1.0, "{a:?} {b:?} gave {d}");
    }
  }

  #[test]
  fn one_degree_of_longitude_on_equator() {
    let d = haversine_distance(LatLon::new(0.0, 0.0), LatLon::new(0.0, 1.0));
    assert!((d - 111_194.926_6).abs() < 0.001);
  }

  // ── corners ────────────────────────────────────────────────────────────────

  #[test]
  fn corner_spans_follow_first_point_axes() {
    let corners = vec![
      LatLon::new(6.5, 3.3),
      LatLon::new(6.5, 3.301),
      LatLon::new(6.501, 3.301),
      LatLon::new(6.501, 3.3),
    ];
    let dims = dimensions_from_corners(&corners).unwrap();
    assert_eq!(dims.to_string(), "111.19m x 110.48m");
  }

  #[test]
  fn mean_point_averages_corners() {
    let m = mean_point(&[LatLon::new(0.0, 0.0), LatLon::new(2.0, 4.0)]).unwrap();
    assert_eq!(m, LatLon::new(1.0, 2.0));
    assert_eq!(mean_point(&[]), Err(GeometryError::Empty));
  }

  #[test]
  fn corners_of_nothing_is_an_error() {
    assert_eq!(dimensions_from_corners(&[]), Err(GeometryError::Empty));
  }
}
