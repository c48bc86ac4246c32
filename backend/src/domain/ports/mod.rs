//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`, [`GeoResolver`], [`InvitationNotifier`],
//! [`PasswordHasher`], [`RoomNameCache`], [`RealtimeBroadcaster`]) are
//! implemented by outbound adapters. Driving ports ([`AccountCommand`],
//! [`ProfileQuery`], [`RoomCreationCommand`], [`RoomQuery`],
//! [`RealtimeChat`]) are implemented by domain services and called by
//! inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod account_command;
mod account_repository;
mod geo_resolver;
mod invitation_notifier;
mod message_repository;
mod password_hasher;
mod profile_query;
mod realtime_broadcaster;
mod realtime_chat;
mod room_creation_command;
mod room_name_cache;
mod room_query;
mod room_repository;

#[cfg(test)]
pub use account_command::MockAccountCommand;
pub use account_command::{AccountCommand, ProfileUpdate, RegistrationRequest};
#[cfg(test)]
pub use account_repository::MockAccountRepository;
pub use account_repository::{AccountRepository, AccountRepositoryError};
#[cfg(test)]
pub use geo_resolver::MockGeoResolver;
pub use geo_resolver::{GeoResolver, NullGeoResolver};
#[cfg(test)]
pub use invitation_notifier::MockInvitationNotifier;
pub use invitation_notifier::{
    INVITATION_SUBJECT, Invitation, InvitationNotifier, NotifierError, sender_label,
};
#[cfg(test)]
pub use message_repository::MockMessageRepository;
pub use message_repository::{MessageRepository, MessageRepositoryError};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHasher, PasswordHasherError};
#[cfg(test)]
pub use profile_query::MockProfileQuery;
pub use profile_query::ProfileQuery;
#[cfg(test)]
pub use realtime_broadcaster::MockRealtimeBroadcaster;
pub use realtime_broadcaster::RealtimeBroadcaster;
#[cfg(test)]
pub use realtime_chat::MockRealtimeChat;
pub use realtime_chat::{ChatParticipant, RealtimeChat};
#[cfg(test)]
pub use room_creation_command::MockRoomCreationCommand;
pub use room_creation_command::{
    CreateRoomRequest, DeliveryOutcome, InvitationDelivery, RoomCreation, RoomCreationCommand,
};
pub use room_name_cache::RoomNameCache;
#[cfg(test)]
pub use room_query::MockRoomQuery;
pub use room_query::RoomQuery;
#[cfg(test)]
pub use room_repository::MockRoomRepository;
pub use room_repository::{RoomRepository, RoomRepositoryError};
