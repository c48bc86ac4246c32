//! Geocoding outbound adapters.
//!
//! This module provides a thin HTTP implementation of the `GeoResolver` port
//! backed by a Nominatim-compatible search endpoint.

mod dto;
mod nominatim;

pub use nominatim::{NominatimGeoResolver, NominatimIdentity};
