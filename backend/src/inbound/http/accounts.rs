//! Account lifecycle handlers.
//!
//! ```text
//! POST /api/v1/register {"email":"ada@example.com","password":"...","displayName":"Ada","postalCode":"100-0005"}
//! POST /api/v1/login {"email":"ada@example.com","password":"..."}
//! POST /api/v1/logout
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::ports::RegistrationRequest;
use crate::domain::{
    DisplayName, EmailAddress, LoginCredentials, PlainPassword, PostalCode, UserProfile,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, field_error, require};

/// Registration body for `POST /api/v1/register`.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub display_name: Option<String>,
    pub postal_code: Option<String>,
}

impl TryFrom<RegisterRequest> for RegistrationRequest {
    type Error = crate::domain::Error;

    fn try_from(value: RegisterRequest) -> Result<Self, Self::Error> {
        let email = require(value.email, FieldName::new("email"))?;
        let password = require(value.password, FieldName::new("password"))?;
        let display_name = require(value.display_name, FieldName::new("displayName"))?;
        let postal_code = require(value.postal_code, FieldName::new("postalCode"))?;

        Ok(Self {
            email: EmailAddress::new(&email).map_err(|err| field_error(&err))?,
            password: PlainPassword::new(&password).map_err(|err| field_error(&err))?,
            display_name: DisplayName::new(&display_name).map_err(|err| field_error(&err))?,
            postal_code: PostalCode::new(&postal_code).map_err(|err| field_error(&err))?,
        })
    }
}

/// Login body for `POST /api/v1/login`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = crate::domain::CredentialsValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.email, &value.password)
    }
}

/// Create an account and sign it in.
///
/// The postal code is geocoded on the way in; an unresolvable code still
/// registers the account, but room creation stays unavailable until the
/// profile carries a location.
#[utoipa::path(
    post,
    path = "/api/v1/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserProfile,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "Email already registered", body = ErrorSchema),
        (status = 503, description = "Account store unavailable", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let request = RegistrationRequest::try_from(payload.into_inner())?;
    let profile = state.accounts.register(request).await?;
    session.sign_in(&profile.id)?;
    Ok(HttpResponse::Created().json(profile))
}

/// Authenticate and establish a session.
///
/// Unknown emails and wrong passwords share one response so accounts cannot
/// be enumerated.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = UserProfile,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<UserProfile>> {
    let credentials =
        LoginCredentials::try_from(payload.into_inner()).map_err(|err| field_error(&err))?;
    let profile = state.accounts.authenticate(&credentials).await?;
    session.sign_in(&profile.id)?;
    info!(user_id = %profile.id, "login succeeded");
    Ok(web::Json(profile))
}

/// Drop the session cookie. Idempotent.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses((status = 204, description = "Session cleared")),
    tags = ["accounts"],
    operation_id = "logout"
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.sign_out();
    HttpResponse::NoContent().finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{
        MockAccountCommand, MockProfileQuery, MockRoomCreationCommand, MockRoomQuery,
    };
    use crate::domain::{Error, UserId};
    use crate::inbound::http::test_utils::{profile_fixture, session_cookie, test_state};
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use rstest::rstest;
    use serde_json::{Value, json};

    fn test_app(
        accounts: MockAccountCommand,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        let state = test_state(
            accounts,
            MockProfileQuery::new(),
            MockRoomCreationCommand::new(),
            MockRoomQuery::new(),
        );
        App::new()
            .app_data(web::Data::new(state))
            .wrap(crate::inbound::http::test_utils::test_session_middleware())
            .service(
                web::scope("/api/v1")
                    .service(register)
                    .service(login)
                    .service(logout),
            )
    }

    fn error_field(value: &Value) -> (Option<&str>, Option<&str>) {
        let details = value.get("details");
        (
            details.and_then(|d| d.get("field")).and_then(Value::as_str),
            details.and_then(|d| d.get("code")).and_then(Value::as_str),
        )
    }

    #[rstest]
    #[actix_web::test]
    async fn register_returns_created_profile_and_session() {
        let mut accounts = MockAccountCommand::new();
        accounts
            .expect_register()
            .withf(|request| {
                request.email.as_ref() == "ada@example.com"
                    && request.display_name.as_ref() == "Ada"
            })
            .times(1)
            .returning(|_| Ok(profile_fixture(UserId::random())));
        let app = actix_test::init_service(test_app(accounts)).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/register")
                .set_json(json!({
                    "email": "ada@example.com",
                    "password": "correct horse",
                    "displayName": "Ada",
                    "postalCode": "100-0005"
                }))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::CREATED);
        assert!(session_cookie(&res).is_some());
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body.get("displayName").and_then(Value::as_str), Some("Ada"));
        assert!(body.get("passwordHash").is_none());
    }

    #[rstest]
    #[case(json!({"password": "pw", "displayName": "Ada", "postalCode": "1"}), "email", "missing_field")]
    #[case(json!({"email": "nope", "password": "pw", "displayName": "Ada", "postalCode": "1"}), "email", "invalid_format")]
    #[case(json!({"email": "a@b.co", "password": "", "displayName": "Ada", "postalCode": "1"}), "password", "empty")]
    #[case(json!({"email": "a@b.co", "password": "pw", "displayName": "  ", "postalCode": "1"}), "displayName", "empty")]
    #[actix_web::test]
    async fn register_rejects_invalid_payloads(
        #[case] payload: Value,
        #[case] field: &str,
        #[case] code: &str,
    ) {
        let mut accounts = MockAccountCommand::new();
        accounts.expect_register().never();
        let app = actix_test::init_service(test_app(accounts)).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/register")
                .set_json(payload)
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(error_field(&body), (Some(field), Some(code)));
    }

    #[rstest]
    #[actix_web::test]
    async fn duplicate_email_is_conflict() {
        let mut accounts = MockAccountCommand::new();
        accounts
            .expect_register()
            .returning(|_| Err(Error::conflict("email already registered")));
        let app = actix_test::init_service(test_app(accounts)).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/register")
                .set_json(json!({
                    "email": "ada@example.com",
                    "password": "pw",
                    "displayName": "Ada",
                    "postalCode": "100-0005"
                }))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::CONFLICT);
        assert!(session_cookie(&res).is_none());
    }

    #[rstest]
    #[actix_web::test]
    async fn login_sets_session_cookie() {
        let mut accounts = MockAccountCommand::new();
        accounts
            .expect_authenticate()
            .withf(|credentials| credentials.email().as_ref() == "ada@example.com")
            .returning(|_| Ok(profile_fixture(UserId::random())));
        let app = actix_test::init_service(test_app(accounts)).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/login")
                .set_json(LoginRequest {
                    email: "ada@example.com".to_owned(),
                    password: "secret".to_owned(),
                })
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        assert!(session_cookie(&res).is_some());
    }

    #[rstest]
    #[actix_web::test]
    async fn login_failure_is_unauthorised_without_cookie() {
        let mut accounts = MockAccountCommand::new();
        accounts
            .expect_authenticate()
            .returning(|_| Err(Error::unauthorized("invalid credentials")));
        let app = actix_test::init_service(test_app(accounts)).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/login")
                .set_json(LoginRequest {
                    email: "ada@example.com".to_owned(),
                    password: "wrong".to_owned(),
                })
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert!(session_cookie(&res).is_none());
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(
            body.get("message").and_then(Value::as_str),
            Some("invalid credentials")
        );
    }

    #[rstest]
    #[actix_web::test]
    async fn login_rejects_blank_password_before_lookup() {
        let mut accounts = MockAccountCommand::new();
        accounts.expect_authenticate().never();
        let app = actix_test::init_service(test_app(accounts)).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/login")
                .set_json(LoginRequest {
                    email: "ada@example.com".to_owned(),
                    password: String::new(),
                })
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(error_field(&body), (Some("password"), Some("empty")));
    }

    #[rstest]
    #[actix_web::test]
    async fn logout_is_no_content_without_session() {
        let app = actix_test::init_service(test_app(MockAccountCommand::new())).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/logout")
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::NO_CONTENT);
    }
}
