//! DTOs for decoding Nominatim search responses.
//!
//! Nominatim encodes coordinates as decimal strings, so decoding happens in
//! two steps: JSON into these DTOs, then string parsing into a `GeoPoint`.

use serde::Deserialize;

use crate::domain::GeoPoint;

#[derive(Debug, Deserialize)]
pub(super) struct NominatimPlaceDto {
    pub(super) lat: Option<String>,
    pub(super) lon: Option<String>,
    #[serde(default)]
    pub(super) display_name: Option<String>,
}

impl NominatimPlaceDto {
    pub(super) fn into_point(self) -> Result<GeoPoint, String> {
        let latitude = parse_coordinate("lat", self.lat.as_deref())?;
        let longitude = parse_coordinate("lon", self.lon.as_deref())?;
        GeoPoint::new(longitude, latitude).map_err(|err| err.to_string())
    }
}

fn parse_coordinate(field: &str, raw: Option<&str>) -> Result<f64, String> {
    let raw = raw.ok_or_else(|| format!("place is missing `{field}`"))?;
    raw.trim()
        .parse::<f64>()
        .map_err(|err| format!("place `{field}` is not a number ({raw}): {err}"))
}
