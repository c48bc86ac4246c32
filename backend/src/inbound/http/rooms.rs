//! Room handlers.
//!
//! ```text
//! POST /api/v1/rooms {"name":"Lunch","isPublic":true,"lng":139.7,"lat":35.6,"distance":5000}
//! GET  /api/v1/rooms
//! GET  /api/v1/rooms/search?q=lunch
//! GET  /api/v1/rooms/history
//! GET  /api/v1/rooms/{roomId}
//! POST /api/v1/rooms/{roomId}/verify-password {"password":"..."}
//! ```
//!
//! Literal paths are registered before `/rooms/{roomId}` so `search` and
//! `history` never parse as room ids.

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{CreateRoomRequest, RoomCreation};
use crate::domain::{
    Error, GeoPoint, PlainPassword, RoomId, RoomName, RoomSummary, RoomValidationError,
    room_description,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, field_error, require};

/// Body for `POST /api/v1/rooms`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomPayload {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Defaults to public.
    pub is_public: Option<bool>,
    /// Required for private rooms.
    pub password: Option<String>,
    /// Map pin longitude; defaults to the creator's home location.
    #[serde(alias = "lng")]
    pub longitude: Option<f64>,
    /// Map pin latitude; must accompany `longitude`.
    #[serde(alias = "lat")]
    pub latitude: Option<f64>,
    /// Search radius in metres; defaults to the configured value.
    #[serde(alias = "distance")]
    pub radius_meters: Option<f64>,
}

impl TryFrom<CreateRoomPayload> for CreateRoomRequest {
    type Error = Error;

    fn try_from(value: CreateRoomPayload) -> Result<Self, Self::Error> {
        let name = require(value.name, FieldName::new("name"))?;
        let name = RoomName::new(&name).map_err(|err| field_error(&err))?;
        let description =
            room_description(value.description.as_deref()).map_err(|err| field_error(&err))?;
        let is_public = value.is_public.unwrap_or(true);
        let password = match (is_public, value.password.as_deref()) {
            (true, _) => None,
            (false, None) => return Err(field_error(&RoomValidationError::MissingPassword)),
            (false, Some(raw)) => Some(PlainPassword::new(raw).map_err(|err| field_error(&err))?),
        };
        let location =
            GeoPoint::from_parts(value.longitude, value.latitude).map_err(|err| field_error(&err))?;

        Ok(Self {
            name,
            description,
            is_public,
            password,
            location,
            radius_meters: value.radius_meters,
        })
    }
}

/// Response for `POST /api/v1/rooms`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomResponse {
    pub room: RoomSummary,
    /// Users selected for the invitee snapshot.
    pub invited_count: usize,
    /// Invitations accepted by the notifier.
    pub notified_count: usize,
}

impl From<RoomCreation> for CreateRoomResponse {
    fn from(value: RoomCreation) -> Self {
        Self {
            invited_count: value.deliveries.len(),
            notified_count: value.notified_count(),
            room: value.room.summary(),
        }
    }
}

/// Query for `GET /api/v1/rooms/search`.
#[derive(Debug, Deserialize, IntoParams)]
pub struct SearchQuery {
    /// Keyword matched against names and descriptions.
    #[serde(default)]
    pub q: String,
}

/// Body for `POST /api/v1/rooms/{roomId}/verify-password`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct VerifyPasswordRequest {
    pub password: String,
}

/// Response for `POST /api/v1/rooms/{roomId}/verify-password`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct VerifyPasswordResponse {
    pub success: bool,
}

fn parse_room_id(raw: String) -> Result<RoomId, Error> {
    RoomId::new(raw).map_err(|err| field_error(&err))
}

/// Create a room and invite a random subset of nearby users.
#[utoipa::path(
    post,
    path = "/api/v1/rooms",
    request_body = CreateRoomPayload,
    responses(
        (status = 201, description = "Room created", body = CreateRoomResponse),
        (status = 400, description = "Invalid request or no home location", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["rooms"],
    operation_id = "createRoom"
)]
#[post("/rooms")]
pub async fn create_room(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateRoomPayload>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let request = CreateRoomRequest::try_from(payload.into_inner())?;
    let creation = state.room_creation.create_room(&user_id, request).await?;
    Ok(HttpResponse::Created().json(CreateRoomResponse::from(creation)))
}

/// List rooms, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/rooms",
    responses(
        (status = 200, description = "Rooms", body = [RoomSummary]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["rooms"],
    operation_id = "listRooms"
)]
#[get("/rooms")]
pub async fn list_rooms(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<RoomSummary>>> {
    session.require_user_id()?;
    Ok(web::Json(state.rooms.list_rooms().await?))
}

/// Case-insensitive keyword search. A blank keyword lists every room.
#[utoipa::path(
    get,
    path = "/api/v1/rooms/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching rooms", body = [RoomSummary]),
        (status = 400, description = "Keyword too long", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["rooms"],
    operation_id = "searchRooms"
)]
#[get("/rooms/search")]
pub async fn search_rooms(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<SearchQuery>,
) -> ApiResult<web::Json<Vec<RoomSummary>>> {
    session.require_user_id()?;
    Ok(web::Json(state.rooms.search_rooms(&query.q).await?))
}

/// Rooms the caller created, was invited to, or posted in.
#[utoipa::path(
    get,
    path = "/api/v1/rooms/history",
    responses(
        (status = 200, description = "Related rooms", body = [RoomSummary]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["rooms"],
    operation_id = "roomHistory"
)]
#[get("/rooms/history")]
pub async fn room_history(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<RoomSummary>>> {
    let user_id = session.require_user_id()?;
    Ok(web::Json(state.rooms.room_history(&user_id).await?))
}

/// Fetch one room.
#[utoipa::path(
    get,
    path = "/api/v1/rooms/{roomId}",
    params(("roomId" = String, Path, description = "Room identifier")),
    responses(
        (status = 200, description = "Room", body = RoomSummary),
        (status = 400, description = "Malformed room id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Room not found", body = ErrorSchema)
    ),
    tags = ["rooms"],
    operation_id = "getRoom"
)]
#[get("/rooms/{room_id}")]
pub async fn get_room(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<RoomSummary>> {
    session.require_user_id()?;
    let room_id = parse_room_id(path.into_inner())?;
    Ok(web::Json(state.rooms.fetch_room(&room_id).await?))
}

/// Check a private room's password. Public rooms always succeed.
#[utoipa::path(
    post,
    path = "/api/v1/rooms/{roomId}/verify-password",
    params(("roomId" = String, Path, description = "Room identifier")),
    request_body = VerifyPasswordRequest,
    responses(
        (status = 200, description = "Verification result", body = VerifyPasswordResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Room not found", body = ErrorSchema)
    ),
    tags = ["rooms"],
    operation_id = "verifyRoomPassword"
)]
#[post("/rooms/{room_id}/verify-password")]
pub async fn verify_room_password(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<VerifyPasswordRequest>,
) -> ApiResult<web::Json<VerifyPasswordResponse>> {
    session.require_user_id()?;
    let room_id = parse_room_id(path.into_inner())?;
    let password = PlainPassword::new(&payload.password).map_err(|err| field_error(&err))?;
    let success = state.rooms.verify_password(&room_id, &password).await?;
    Ok(web::Json(VerifyPasswordResponse { success }))
}

#[cfg(test)]
#[path = "rooms_tests.rs"]
mod tests;
