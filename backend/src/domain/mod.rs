//! Domain primitives, aggregates, and services.
//!
//! Purpose: define strongly typed entities shared by the HTTP, WebSocket, and
//! persistence layers, plus the services that implement the driving ports.
//! Types validate on construction and document their invariants and serde
//! contracts in Rustdoc.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - User, Room, ChatMessage: aggregates persisted by the repositories.
//! - AccountService, ProximityInviter, RoomDirectory, ChatHub: services.

pub mod account_service;
pub mod auth;
pub mod chat_hub;
pub mod error;
pub mod geo;
pub mod message;
pub mod ports;
pub mod proximity_inviter;
pub mod realtime;
pub mod room;
pub mod room_directory;
pub mod selection;
mod service_support;
pub mod trace_id;
pub mod user;

pub use self::account_service::AccountService;
pub use self::auth::{
    CredentialsValidationError, LoginCredentials, PASSWORD_MAX, PasswordHash, PlainPassword,
};
pub use self::chat_hub::{ChatHub, ChatHubPorts, ChatHubSettings};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::geo::{CountryCode, EARTH_RADIUS_METERS, GeoPoint, GeoValidationError, SearchRadius};
pub use self::message::{
    ChatMessage, MESSAGE_BODY_MAX, MessageBody, MessageKind, MessageValidationError,
    UNKNOWN_ROOM_NAME,
};
pub use self::proximity_inviter::{InviterPorts, InviterSettings, ProximityInviter};
pub use self::realtime::{ConnectionId, HubEvent};
pub use self::room::{
    Invitee, ROOM_DESCRIPTION_MAX, ROOM_NAME_MAX, Room, RoomId, RoomName, RoomSummary,
    RoomValidationError, RoomVisibility, room_description,
};
pub use self::room_directory::RoomDirectory;
pub use self::selection::select_invitees;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    DISPLAY_NAME_MAX, DisplayName, EmailAddress, NearbyUser, NewUser, POSTAL_CODE_MAX,
    PostalCode, User, UserId, UserProfile, UserValidationError,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use chatmap::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::forbidden("nope"))
/// }
/// assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
