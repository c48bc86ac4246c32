//! Port for turning postal codes into coordinates.
//!
//! Resolution is best effort: adapters log their failures and return `None`
//! so registration can continue without a location.

use async_trait::async_trait;

use crate::domain::{CountryCode, GeoPoint, PostalCode};

/// Geocoding lookup for a postal code centroid.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GeoResolver: Send + Sync {
    async fn resolve(&self, postal_code: &PostalCode, country: &CountryCode) -> Option<GeoPoint>;
}

/// Resolver that never finds a location.
///
/// Used when no geocoding endpoint is configured; every account is stored
/// without a location.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullGeoResolver;

#[async_trait]
impl GeoResolver for NullGeoResolver {
    async fn resolve(&self, postal_code: &PostalCode, country: &CountryCode) -> Option<GeoPoint> {
        tracing::debug!(%postal_code, %country, "geocoding disabled; no location resolved");
        None
    }
}
