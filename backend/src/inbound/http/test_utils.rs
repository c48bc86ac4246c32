//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{HttpResponse, test as actix_test, web};

use crate::domain::ports::{
    MockAccountCommand, MockProfileQuery, MockRoomCreationCommand, MockRoomQuery,
};
use crate::domain::{DisplayName, EmailAddress, GeoPoint, PostalCode, UserId, UserProfile};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::{HttpState, HttpStatePorts};

/// Path of the test-only sign-in route registered by handler tests.
pub const SIGN_IN_PATH: &str = "/test/sign-in/{id}";

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Wire handler state from port doubles.
pub fn test_state(
    accounts: MockAccountCommand,
    profile: MockProfileQuery,
    room_creation: MockRoomCreationCommand,
    rooms: MockRoomQuery,
) -> HttpState {
    HttpState::new(HttpStatePorts {
        accounts: Arc::new(accounts),
        profile: Arc::new(profile),
        room_creation: Arc::new(room_creation),
        rooms: Arc::new(rooms),
    })
}

/// Profile for a located user called Ada.
pub fn profile_fixture(id: UserId) -> UserProfile {
    UserProfile {
        id,
        email: EmailAddress::new("ada@example.com").expect("fixture email"),
        display_name: DisplayName::new("Ada").expect("fixture display name"),
        postal_code: PostalCode::new("100-0005").expect("fixture postal code"),
        location: GeoPoint::new(139.767, 35.681).ok(),
    }
}

/// The `session` cookie set on a response, if any.
pub fn session_cookie<B>(res: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
}

/// Test-only handler that signs the caller in as the user in the path.
pub async fn sign_in_as(session: SessionContext, path: web::Path<String>) -> ApiResult<HttpResponse> {
    let user_id = UserId::new(path.into_inner())
        .map_err(|err| crate::domain::Error::invalid_request(err.to_string()))?;
    session.sign_in(&user_id)?;
    Ok(HttpResponse::Ok().finish())
}

/// Hit [`sign_in_as`] and return the resulting session cookie.
pub async fn signed_in_cookie(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse,
        Error = actix_web::Error,
    >,
    user_id: &UserId,
) -> Cookie<'static> {
    let res = actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri(&format!("/test/sign-in/{user_id}"))
            .to_request(),
    )
    .await;
    assert!(res.status().is_success(), "test sign-in failed");
    session_cookie(&res).expect("session cookie")
}
