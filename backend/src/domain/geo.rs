//! Geographic primitives: WGS84 points, country codes, and search radii.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Mean Earth radius in metres (IUGG).
pub const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

/// Validation errors for geographic primitives.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeoValidationError {
    /// A coordinate was NaN or infinite.
    #[error("coordinates must be finite numbers")]
    NonFinite,
    /// Longitude outside `[-180, 180]`.
    #[error("longitude {0} must be within [-180, 180]")]
    LongitudeOutOfRange(f64),
    /// Latitude outside `[-90, 90]`.
    #[error("latitude {0} must be within [-90, 90]")]
    LatitudeOutOfRange(f64),
    /// Only one coordinate of a pair was supplied.
    #[error("longitude and latitude must be given together")]
    IncompletePoint,
    /// Country codes are two ASCII letters.
    #[error("country code must be two ASCII letters")]
    InvalidCountryCode,
    /// Radius was not a positive finite number.
    #[error("search radius must be a positive number of metres")]
    InvalidRadius,
    /// Radius exceeded the configured ceiling.
    #[error("search radius must not exceed {max} metres")]
    RadiusTooLarge {
        /// Configured ceiling in metres.
        max: f64,
    },
}

/// A longitude/latitude pair in WGS84 degrees.
///
/// # Examples
/// ```
/// use chatmap::domain::GeoPoint;
///
/// let tokyo = GeoPoint::new(139.767, 35.681).expect("valid point");
/// assert_eq!(tokyo.longitude(), 139.767);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GeoPointDto", into = "GeoPointDto")]
pub struct GeoPoint {
    longitude: f64,
    latitude: f64,
}

impl GeoPoint {
    /// Validate and build a point.
    pub fn new(longitude: f64, latitude: f64) -> Result<Self, GeoValidationError> {
        if !longitude.is_finite() || !latitude.is_finite() {
            return Err(GeoValidationError::NonFinite);
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(GeoValidationError::LongitudeOutOfRange(longitude));
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(GeoValidationError::LatitudeOutOfRange(latitude));
        }
        Ok(Self {
            longitude,
            latitude,
        })
    }

    /// Build an optional point from separately supplied coordinates.
    ///
    /// Both absent yields `None`; exactly one present is an error.
    pub fn from_parts(
        longitude: Option<f64>,
        latitude: Option<f64>,
    ) -> Result<Option<Self>, GeoValidationError> {
        match (longitude, latitude) {
            (None, None) => Ok(None),
            (Some(longitude), Some(latitude)) => Self::new(longitude, latitude).map(Some),
            _ => Err(GeoValidationError::IncompletePoint),
        }
    }

    /// Longitude in degrees.
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Latitude in degrees.
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Great-circle distance to `other` in metres (haversine).
    pub fn distance_meters(&self, other: &GeoPoint) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let d_lat = (other.latitude - self.latitude).to_radians();
        let d_lon = (other.longitude - self.longitude).to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().min(1.0).asin();
        EARTH_RADIUS_METERS * c
    }

    /// Latitude/longitude deltas (degrees) that bound a circle of `radius`
    /// metres around this point. Used as a cheap index prefilter before the
    /// exact haversine check.
    pub fn bounding_deltas(&self, radius: SearchRadius) -> (f64, f64) {
        let lat_delta = (radius.meters() / EARTH_RADIUS_METERS).to_degrees();
        let cos_lat = self.latitude.to_radians().cos().abs();
        let lon_delta = if cos_lat < 1e-6 {
            360.0
        } else {
            (lat_delta / cos_lat).min(360.0)
        };
        (lat_delta, lon_delta)
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.longitude, self.latitude)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct GeoPointDto {
    longitude: f64,
    latitude: f64,
}

impl From<GeoPoint> for GeoPointDto {
    fn from(value: GeoPoint) -> Self {
        Self {
            longitude: value.longitude,
            latitude: value.latitude,
        }
    }
}

impl TryFrom<GeoPointDto> for GeoPoint {
    type Error = GeoValidationError;

    fn try_from(value: GeoPointDto) -> Result<Self, Self::Error> {
        Self::new(value.longitude, value.latitude)
    }
}

/// ISO 3166-1 alpha-2 country code, stored upper-case.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CountryCode(String);

impl CountryCode {
    /// Validate and normalise a country code.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, GeoValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.len() != 2 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(GeoValidationError::InvalidCountryCode);
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }
}

impl AsRef<str> for CountryCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Positive search radius in metres.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct SearchRadius(f64);

impl SearchRadius {
    /// Validate a radius against an upper bound.
    pub fn new(meters: f64, max_meters: f64) -> Result<Self, GeoValidationError> {
        if !meters.is_finite() || meters <= 0.0 {
            return Err(GeoValidationError::InvalidRadius);
        }
        if meters > max_meters {
            return Err(GeoValidationError::RadiusTooLarge { max: max_meters });
        }
        Ok(Self(meters))
    }

    /// Radius in metres.
    pub const fn meters(&self) -> f64 {
        self.0
    }
}
