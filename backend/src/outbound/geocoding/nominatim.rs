//! Reqwest-backed Nominatim geocoder.
//!
//! This adapter owns transport details only: query construction, timeout and
//! status handling, and decoding into a domain `GeoPoint`. Every failure is
//! logged at `warn` and collapsed to `None`; there is no retry.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::{debug, warn};

use super::dto::NominatimPlaceDto;
use crate::domain::ports::GeoResolver;
use crate::domain::{CountryCode, GeoPoint, PostalCode};

const DEFAULT_USER_AGENT: &str = "chatmap-backend-geocoder/0.1";
const SEARCH_PATH: &str = "search";

/// Outbound identity sent with every Nominatim request.
pub struct NominatimIdentity {
    /// HTTP user-agent. Nominatim's usage policy requires a meaningful one.
    pub user_agent: String,
}

impl Default for NominatimIdentity {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

/// Why a lookup produced no point. Only used for logging.
#[derive(Debug, thiserror::Error)]
enum LookupError {
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("transport failed: {0}")]
    Transport(String),
    #[error("unexpected status {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("undecodable response: {0}")]
    Decode(String),
    #[error("no match")]
    NoMatch,
}

/// Geocoder that performs one HTTP GET per lookup against a search endpoint.
pub struct NominatimGeoResolver {
    client: Client,
    search_url: Url,
    user_agent: String,
}

impl NominatimGeoResolver {
    /// Build a resolver with the default identity.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        Self::with_identity(endpoint, timeout, NominatimIdentity::default())
    }

    /// Build a resolver with an explicit outbound identity.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn with_identity(
        endpoint: Url,
        timeout: Duration,
        identity: NominatimIdentity,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            search_url: search_url(endpoint),
            user_agent: identity.user_agent,
        })
    }

    async fn lookup(
        &self,
        postal_code: &PostalCode,
        country: &CountryCode,
    ) -> Result<GeoPoint, LookupError> {
        let response = self
            .client
            .get(self.search_url.clone())
            .header(reqwest::header::USER_AGENT, self.user_agent.as_str())
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&search_params(postal_code, country))
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(LookupError::Status {
                status,
                body: body_preview(body.as_ref()),
            });
        }
        parse_first_point(body.as_ref())
    }
}

#[async_trait]
impl GeoResolver for NominatimGeoResolver {
    async fn resolve(&self, postal_code: &PostalCode, country: &CountryCode) -> Option<GeoPoint> {
        match self.lookup(postal_code, country).await {
            Ok(point) => {
                debug!(%postal_code, %country, ?point, "postal code geocoded");
                Some(point)
            }
            Err(err) => {
                warn!(error = %err, %postal_code, %country, "geocoding failed");
                None
            }
        }
    }
}

/// Append the search path to `endpoint`, tolerating a trailing slash.
fn search_url(mut endpoint: Url) -> Url {
    let path = format!("{}/{SEARCH_PATH}", endpoint.path().trim_end_matches('/'));
    endpoint.set_path(&path);
    endpoint
}

fn search_params<'a>(
    postal_code: &'a PostalCode,
    country: &'a CountryCode,
) -> [(&'static str, &'a str); 4] {
    [
        ("postalcode", postal_code.as_ref()),
        ("country", country.as_ref()),
        ("format", "jsonv2"),
        ("limit", "1"),
    ]
}

fn parse_first_point(body: &[u8]) -> Result<GeoPoint, LookupError> {
    let places: Vec<NominatimPlaceDto> = serde_json::from_slice(body)
        .map_err(|err| LookupError::Decode(format!("invalid Nominatim JSON payload: {err}")))?;
    let place = places.into_iter().next().ok_or(LookupError::NoMatch)?;
    if let Some(label) = place.display_name.as_deref() {
        debug!(label, "geocoder matched place");
    }
    place.into_point().map_err(LookupError::Decode)
}

fn map_transport_error(error: reqwest::Error) -> LookupError {
    if error.is_timeout() {
        LookupError::Timeout(error.to_string())
    } else {
        LookupError::Transport(error.to_string())
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for non-network Nominatim helpers.

    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://nominatim.openstreetmap.org", "https://nominatim.openstreetmap.org/search")]
    #[case("https://nominatim.openstreetmap.org/", "https://nominatim.openstreetmap.org/search")]
    #[case("http://localhost:8088/geo/", "http://localhost:8088/geo/search")]
    fn search_url_appends_path(#[case] endpoint: &str, #[case] expected: &str) {
        let url = search_url(Url::parse(endpoint).expect("endpoint"));
        assert_eq!(url.as_str(), expected);
    }

    #[test]
    fn query_carries_postal_code_and_country() {
        let postal_code = PostalCode::new("150-0002").expect("postal code");
        let country = CountryCode::new("jp").expect("country");
        let params = search_params(&postal_code, &country);
        assert!(params.contains(&("postalcode", "150-0002")));
        assert!(params.contains(&("country", "JP")));
        assert!(params.contains(&("format", "jsonv2")));
        assert!(params.contains(&("limit", "1")));
    }

    #[test]
    fn parses_string_coordinates_of_first_place() {
        let body = r#"[
            {"lat": "35.6580", "lon": "139.7016", "display_name": "Shibuya"},
            {"lat": "0", "lon": "0"}
        ]"#;
        let point = parse_first_point(body.as_bytes()).expect("point");
        assert_eq!(point.latitude(), 35.658);
        assert_eq!(point.longitude(), 139.7016);
    }

    #[rstest]
    #[case::empty("[]")]
    #[case::missing_lat(r#"[{"lon": "139.0"}]"#)]
    #[case::not_a_number(r#"[{"lat": "north", "lon": "139.0"}]"#)]
    #[case::out_of_range(r#"[{"lat": "95.0", "lon": "139.0"}]"#)]
    #[case::not_json("<html>busy</html>")]
    fn unusable_payloads_yield_no_point(#[case] body: &str) {
        assert!(parse_first_point(body.as_bytes()).is_err());
    }

    #[test]
    fn empty_result_is_no_match() {
        assert!(matches!(parse_first_point(b"[]"), Err(LookupError::NoMatch)));
    }

    #[test]
    fn long_bodies_are_truncated_in_previews() {
        let body = "x".repeat(500);
        let preview = body_preview(body.as_bytes());
        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), 163);
    }

    #[rstest]
    #[tokio::test]
    async fn unreachable_endpoint_resolves_to_none() {
        // Port 9 (discard) on loopback refuses connections in test sandboxes.
        let resolver = NominatimGeoResolver::new(
            Url::parse("http://127.0.0.1:9").expect("endpoint"),
            Duration::from_millis(500),
        )
        .expect("client");
        let resolved = resolver
            .resolve(
                &PostalCode::new("150-0002").expect("postal code"),
                &CountryCode::new("JP").expect("country"),
            )
            .await;
        assert!(resolved.is_none());
    }
}
