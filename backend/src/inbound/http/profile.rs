//! Current-user profile handlers.
//!
//! ```text
//! GET /api/v1/users/me
//! PUT /api/v1/users/me {"displayName":"Ada","postalCode":"150-0002"}
//! ```

use actix_web::{get, put, web};
use serde::{Deserialize, Serialize};

use crate::domain::ports::ProfileUpdate;
use crate::domain::{DisplayName, EmailAddress, Error, PostalCode, UserProfile};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::field_error;

/// Body for `PUT /api/v1/users/me`. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    /// Accepted only to reject changes; email addresses are immutable.
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub postal_code: Option<String>,
}

impl TryFrom<UpdateProfileRequest> for ProfileUpdate {
    type Error = Error;

    fn try_from(value: UpdateProfileRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            email: value
                .email
                .map(EmailAddress::new)
                .transpose()
                .map_err(|err| field_error(&err))?,
            display_name: value
                .display_name
                .map(DisplayName::new)
                .transpose()
                .map_err(|err| field_error(&err))?,
            postal_code: value
                .postal_code
                .map(PostalCode::new)
                .transpose()
                .map_err(|err| field_error(&err))?,
        })
    }
}

/// Return the signed-in user's profile.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Current profile", body = UserProfile),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Account store unavailable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/users/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<UserProfile>> {
    let user_id = session.require_user_id()?;
    let profile = state.profile.fetch_profile(&user_id).await?;
    Ok(web::Json(profile))
}

/// Update display name and/or postal code. A new postal code is geocoded.
#[utoipa::path(
    put,
    path = "/api/v1/users/me",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = UserProfile),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Account store unavailable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "updateCurrentUser"
)]
#[put("/users/me")]
pub async fn update_current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<UpdateProfileRequest>,
) -> ApiResult<web::Json<UserProfile>> {
    let user_id = session.require_user_id()?;
    let update = ProfileUpdate::try_from(payload.into_inner())?;
    let profile = state.accounts.update_profile(&user_id, update).await?;
    Ok(web::Json(profile))
}
