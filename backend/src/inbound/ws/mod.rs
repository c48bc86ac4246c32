//! WebSocket inbound adapter for realtime chat.
//!
//! Responsibilities:
//! - validate upgrade requests (Origin allow-list, signed-in session)
//! - register the connection and start its session loop
//! - translate client frames into [`RealtimeChat`](crate::domain::ports::RealtimeChat)
//!   calls and hub events into JSON frames

use actix_web::web::{self, Payload};
use actix_web::{
    HttpRequest, HttpResponse, get,
    http::header::{HeaderValue, ORIGIN},
};
use tracing::{error, info, warn};
use url::Url;

use crate::domain::{ConnectionId, TraceId};
use crate::inbound::http::session::SessionContext;

mod session;

pub mod messages;
pub mod registry;
pub mod state;

use state::{AllowedOrigins, WsState};

/// Handle WebSocket upgrade for the `/ws` endpoint.
///
/// Rejects with 403 for a disallowed Origin and 401 when the session does not
/// name an existing user. No frame is accepted before both checks pass.
#[get("/ws")]
pub async fn ws_entry(
    state: web::Data<WsState>,
    req: HttpRequest,
    session: SessionContext,
    stream: Payload,
) -> actix_web::Result<HttpResponse> {
    let mut origin_iter = req.headers().get_all(ORIGIN);
    let origin_header = origin_iter.next().ok_or_else(|| {
        error!("Missing Origin header on WebSocket upgrade");
        actix_web::error::ErrorForbidden("Origin not allowed")
    })?;
    if origin_iter.next().is_some() {
        error!("Multiple Origin headers on WebSocket upgrade");
        return Err(actix_web::error::ErrorBadRequest("Invalid Origin header"));
    }
    validate_origin(origin_header, &state.allowed_origins)?;

    let user_id = session.require_user_id()?;
    let connection = ConnectionId::next();
    let participant = state.chat.connect(connection, &user_id).await?;

    let (response, ws_session, msg_stream) = actix_ws::handle(&req, stream).map_err(|error| {
        error!(error = %error, "WebSocket upgrade failed");
        actix_web::error::ErrorBadRequest("WebSocket upgrade failed")
    })?;

    let events = state.registry.register(connection);
    info!(%connection, %user_id, "chat socket opened");
    actix_web::rt::spawn(TraceId::scope(
        TraceId::generate(),
        session::handle_ws_session(
            state.chat.clone(),
            participant,
            events,
            ws_session,
            msg_stream,
        ),
    ));
    Ok(response)
}

fn validate_origin(
    origin_header: &HeaderValue,
    allowed: &AllowedOrigins,
) -> actix_web::Result<()> {
    let origin_value = match origin_header.to_str() {
        Ok(value) => value,
        Err(error) => {
            error!(error = %error, "Failed to parse Origin header as string");
            return Err(actix_web::error::ErrorBadRequest("Invalid Origin header"));
        }
    };

    let origin = Url::parse(origin_value).map_err(|error| {
        error!(error = %error, "Failed to parse Origin header as URL");
        actix_web::error::ErrorBadRequest("Invalid Origin header")
    })?;

    if allowed.allows(&origin) {
        Ok(())
    } else {
        warn!(
            origin = origin_value,
            "Rejected WS upgrade due to disallowed Origin"
        );
        Err(actix_web::error::ErrorForbidden("Origin not allowed"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use rstest::{fixture, rstest};

    fn header(value: &str) -> HeaderValue {
        HeaderValue::from_str(value).expect("valid header value")
    }

    #[fixture]
    fn allowed() -> AllowedOrigins {
        AllowedOrigins::new(["https://chat.example.com"])
    }

    #[rstest]
    #[case("http://localhost:3000")]
    #[case("https://chat.example.com")]
    fn accepts_configured_origins(allowed: AllowedOrigins, #[case] origin: &str) {
        assert!(validate_origin(&header(origin), &allowed).is_ok());
    }

    #[rstest]
    #[case("http://localhost")]
    #[case("https://example.com")]
    #[case("wss://chat.example.com")]
    fn rejects_disallowed_origins(allowed: AllowedOrigins, #[case] origin: &str) {
        let error = validate_origin(&header(origin), &allowed).expect_err("origin rejected");
        assert_eq!(
            error.as_response_error().status_code(),
            StatusCode::FORBIDDEN
        );
    }

    #[rstest]
    fn rejects_non_utf8_origin_header(allowed: AllowedOrigins) {
        let header = HeaderValue::from_bytes(&[0x80]).expect("opaque header value");
        let error = validate_origin(&header, &allowed).expect_err("origin rejected");
        assert_eq!(
            error.as_response_error().status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[rstest]
    fn rejects_unparsable_origin_header(allowed: AllowedOrigins) {
        let header = HeaderValue::from_static("not a url");
        let error = validate_origin(&header, &allowed).expect_err("origin rejected");
        assert_eq!(
            error.as_response_error().status_code(),
            StatusCode::BAD_REQUEST
        );
    }
}
