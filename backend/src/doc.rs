//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every REST endpoint under `/api/v1`, the health
//! probes, the wire schemas, and the session cookie security scheme. The
//! document backs Swagger UI in debug builds and is printed by the
//! `openapi-dump` binary.

use crate::domain::{ChatMessage, Invitee, MessageKind, RoomSummary, UserProfile};
use crate::inbound::http::accounts::{LoginRequest, RegisterRequest};
use crate::inbound::http::profile::UpdateProfileRequest;
use crate::inbound::http::rooms::{
    CreateRoomPayload, CreateRoomResponse, VerifyPasswordRequest, VerifyPasswordResponse,
};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login or /api/v1/register.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "chatmap API",
        description = "Accounts, location-anchored rooms and health probes. Realtime chat runs over GET /ws.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.html"
        )
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::accounts::register,
        crate::inbound::http::accounts::login,
        crate::inbound::http::accounts::logout,
        crate::inbound::http::profile::current_user,
        crate::inbound::http::profile::update_current_user,
        crate::inbound::http::rooms::create_room,
        crate::inbound::http::rooms::list_rooms,
        crate::inbound::http::rooms::search_rooms,
        crate::inbound::http::rooms::room_history,
        crate::inbound::http::rooms::get_room,
        crate::inbound::http::rooms::verify_room_password,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        UserProfile,
        RoomSummary,
        Invitee,
        ChatMessage,
        MessageKind,
        RegisterRequest,
        LoginRequest,
        UpdateProfileRequest,
        CreateRoomPayload,
        CreateRoomResponse,
        VerifyPasswordRequest,
        VerifyPasswordResponse,
    )),
    tags(
        (name = "accounts", description = "Registration and session management"),
        (name = "users", description = "The signed-in user's profile"),
        (name = "rooms", description = "Room creation, lookup and search"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
