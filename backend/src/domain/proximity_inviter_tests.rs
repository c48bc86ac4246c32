//! Tests for the proximity inviter.

use std::collections::HashSet;

use chrono::{TimeZone, Utc};
use mockable::MockClock;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{
    MockAccountRepository, MockInvitationNotifier, MockMessageRepository, MockPasswordHasher,
    MockRealtimeBroadcaster, MockRoomRepository, NotifierError, RoomRepositoryError,
};
use crate::domain::{
    DisplayName, EmailAddress, ErrorCode, GeoPoint, MessageKind, NewUser, PasswordHash,
    PlainPassword, PostalCode, RoomName,
};
use crate::outbound::cache::InMemoryRoomNameCache;

struct Harness {
    accounts: MockAccountRepository,
    rooms: MockRoomRepository,
    messages: MockMessageRepository,
    notifier: MockInvitationNotifier,
    hasher: MockPasswordHasher,
    broadcaster: MockRealtimeBroadcaster,
    cache: Arc<InMemoryRoomNameCache>,
}

impl Harness {
    fn build(self) -> ProximityInviter {
        let mut clock = MockClock::new();
        clock.expect_utc().returning(|| {
            Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0)
                .single()
                .expect("valid time")
        });
        ProximityInviter::with_rng(
            InviterPorts {
                accounts: Arc::new(self.accounts),
                rooms: Arc::new(self.rooms),
                messages: Arc::new(self.messages),
                room_names: self.cache,
                notifier: Arc::new(self.notifier),
                hasher: Arc::new(self.hasher),
                broadcaster: Arc::new(self.broadcaster),
                clock: Arc::new(clock),
            },
            InviterSettings::default(),
            SmallRng::seed_from_u64(42),
        )
    }
}

#[fixture]
fn harness() -> Harness {
    Harness {
        accounts: MockAccountRepository::new(),
        rooms: MockRoomRepository::new(),
        messages: MockMessageRepository::new(),
        notifier: MockInvitationNotifier::new(),
        hasher: MockPasswordHasher::new(),
        broadcaster: MockRealtimeBroadcaster::new(),
        cache: Arc::new(InMemoryRoomNameCache::default()),
    }
}

fn creator(location: Option<GeoPoint>) -> User {
    User::new(NewUser {
        id: UserId::random(),
        email: EmailAddress::new("creator@example.com").expect("email"),
        password_hash: PasswordHash::new("hash"),
        display_name: DisplayName::new("Creator").expect("name"),
        postal_code: PostalCode::new("100-0005").expect("postal code"),
        location,
        created_at: Utc::now(),
    })
}

fn nearby(count: usize) -> Vec<NearbyUser> {
    (0..count)
        .map(|i| NearbyUser {
            id: UserId::random(),
            email: EmailAddress::new(format!("user{i}@example.com")).expect("email"),
            display_name: DisplayName::new(format!("User {i}")).expect("name"),
            distance_meters: 1_000.0 * i as f64,
        })
        .collect()
}

fn origin() -> GeoPoint {
    GeoPoint::new(139.0, 35.0).expect("valid point")
}

fn public_request() -> CreateRoomRequest {
    CreateRoomRequest {
        name: RoomName::new("Harbour walk").expect("room name"),
        description: None,
        is_public: true,
        password: None,
        location: None,
        radius_meters: Some(100_000.0),
    }
}

fn expect_creator(accounts: &mut MockAccountRepository, user: User) {
    accounts
        .expect_find_by_id()
        .returning(move |_| Ok(Some(user.clone())));
}

#[rstest]
#[tokio::test]
async fn invites_bounded_random_subset_of_nearby_users(mut harness: Harness) {
    let creator = creator(Some(origin()));
    let creator_id = creator.id().clone();
    let candidates = nearby(15);
    let candidate_ids: HashSet<UserId> = candidates.iter().map(|c| c.id.clone()).collect();

    expect_creator(&mut harness.accounts, creator);
    let excluded = creator_id.clone();
    harness
        .accounts
        .expect_find_within_radius()
        .withf(move |center, radius, exclude| {
            *center == origin() && radius.meters() == 100_000.0 && *exclude == excluded
        })
        .times(1)
        .return_once(move |_, _, _| Ok(candidates));
    harness.rooms.expect_create().times(1).returning(|_| Ok(()));
    harness
        .messages
        .expect_append()
        .withf(|message| {
            message.kind == MessageKind::System
                && message.body.as_ref() == "Creator created the room Harbour walk"
        })
        .times(1)
        .returning(|_| Ok(()));
    harness
        .notifier
        .expect_send()
        .withf(|invitation| invitation.from_name == "Creator")
        .times(10)
        .returning(|_| Ok(()));
    harness
        .broadcaster
        .expect_broadcast_all()
        .withf(|event| *event == HubEvent::RoomsChanged)
        .times(1)
        .returning(|_| 0);
    let cache = Arc::clone(&harness.cache);

    let creation = harness
        .build()
        .create_room(&creator_id, public_request())
        .await
        .expect("room is created");

    let invited: HashSet<UserId> = creation
        .room
        .invitees
        .iter()
        .map(|i| i.user_id.clone())
        .collect();
    assert_eq!(creation.room.invitees.len(), 10);
    assert_eq!(invited.len(), 10, "no duplicate invitees");
    assert!(invited.is_subset(&candidate_ids));
    assert!(!invited.contains(&creator_id));
    assert_eq!(creation.notified_count(), 10);
    assert_eq!(
        cache.get(&creation.room.id).map(String::from),
        Some("Harbour walk".to_owned())
    );
}

#[rstest]
#[tokio::test]
async fn creator_without_location_is_rejected_before_any_write(mut harness: Harness) {
    let creator = creator(None);
    let creator_id = creator.id().clone();
    expect_creator(&mut harness.accounts, creator);
    harness.accounts.expect_find_within_radius().never();
    harness.rooms.expect_create().never();
    harness.messages.expect_append().never();
    harness.broadcaster.expect_broadcast_all().never();

    let err = harness
        .build()
        .create_room(&creator_id, public_request())
        .await
        .expect_err("location is required");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(
        err.details()
            .and_then(|d| d.get("code"))
            .and_then(|c| c.as_str()),
        Some("location_required")
    );
}

#[rstest]
#[tokio::test]
async fn unknown_creator_is_unauthorized(mut harness: Harness) {
    harness.accounts.expect_find_by_id().returning(|_| Ok(None));
    harness.rooms.expect_create().never();

    let err = harness
        .build()
        .create_room(&UserId::random(), public_request())
        .await
        .expect_err("creator must exist");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
}

#[rstest]
#[tokio::test]
async fn failed_room_write_skips_message_cache_and_fan_out(mut harness: Harness) {
    let creator = creator(Some(origin()));
    let creator_id = creator.id().clone();
    expect_creator(&mut harness.accounts, creator);
    harness
        .accounts
        .expect_find_within_radius()
        .return_once(|_, _, _| Ok(nearby(3)));
    harness
        .rooms
        .expect_create()
        .returning(|_| Err(RoomRepositoryError::connection("database offline")));
    harness.messages.expect_append().never();
    harness.notifier.expect_send().never();
    harness.broadcaster.expect_broadcast_all().never();
    let cache = Arc::clone(&harness.cache);

    let err = harness
        .build()
        .create_room(&creator_id, public_request())
        .await
        .expect_err("store failure aborts");

    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    assert!(cache.is_empty());
}

#[rstest]
#[tokio::test]
async fn notification_failures_are_reported_not_fatal(mut harness: Harness) {
    let creator = creator(Some(origin()));
    let creator_id = creator.id().clone();
    expect_creator(&mut harness.accounts, creator);
    harness
        .accounts
        .expect_find_within_radius()
        .return_once(|_, _, _| Ok(nearby(3)));
    harness.rooms.expect_create().returning(|_| Ok(()));
    harness.messages.expect_append().returning(|_| Ok(()));
    harness.notifier.expect_send().times(3).returning(|invitation| {
        if invitation.recipient.as_ref() == "user1@example.com" {
            Err(NotifierError::rejected(550_u16, "mailbox unavailable"))
        } else {
            Ok(())
        }
    });
    harness
        .broadcaster
        .expect_broadcast_all()
        .times(1)
        .returning(|_| 1);

    let creation = harness
        .build()
        .create_room(&creator_id, public_request())
        .await
        .expect("room is created");

    assert_eq!(creation.deliveries.len(), 3);
    assert_eq!(creation.notified_count(), 2);
}

#[rstest]
#[tokio::test]
async fn zero_candidates_still_creates_room(mut harness: Harness) {
    let creator = creator(Some(origin()));
    let creator_id = creator.id().clone();
    expect_creator(&mut harness.accounts, creator);
    harness
        .accounts
        .expect_find_within_radius()
        .return_once(|_, _, _| Ok(Vec::new()));
    harness.rooms.expect_create().returning(|_| Ok(()));
    harness.messages.expect_append().returning(|_| Ok(()));
    harness.notifier.expect_send().never();
    harness
        .broadcaster
        .expect_broadcast_all()
        .times(1)
        .returning(|_| 0);

    let creation = harness
        .build()
        .create_room(&creator_id, public_request())
        .await
        .expect("room is created");
    assert!(creation.room.invitees.is_empty());
}

#[rstest]
#[tokio::test]
async fn explicit_anchor_moves_the_pin_but_not_the_search(mut harness: Harness) {
    let creator = creator(Some(origin()));
    let creator_id = creator.id().clone();
    let anchor = GeoPoint::new(-74.0, 40.7).expect("valid point");
    expect_creator(&mut harness.accounts, creator);
    harness
        .accounts
        .expect_find_within_radius()
        .withf(|center, _, _| *center == origin())
        .times(1)
        .return_once(|_, _, _| Ok(Vec::new()));
    harness
        .rooms
        .expect_create()
        .withf(move |room| room.location == anchor)
        .returning(|_| Ok(()));
    harness.messages.expect_append().returning(|_| Ok(()));
    harness.broadcaster.expect_broadcast_all().returning(|_| 0);

    let request = CreateRoomRequest {
        location: Some(anchor),
        ..public_request()
    };
    harness
        .build()
        .create_room(&creator_id, request)
        .await
        .expect("room is created");
}

#[rstest]
#[tokio::test]
async fn private_room_stores_password_hash(mut harness: Harness) {
    let creator = creator(Some(origin()));
    let creator_id = creator.id().clone();
    expect_creator(&mut harness.accounts, creator);
    harness
        .hasher
        .expect_hash()
        .times(1)
        .returning(|_| Ok(PasswordHash::new("hashed-room-secret")));
    harness
        .accounts
        .expect_find_within_radius()
        .return_once(|_, _, _| Ok(Vec::new()));
    harness
        .rooms
        .expect_create()
        .withf(|room| {
            room.visibility
                .password_hash()
                .is_some_and(|hash| hash.as_ref() == "hashed-room-secret")
        })
        .times(1)
        .returning(|_| Ok(()));
    harness.messages.expect_append().returning(|_| Ok(()));
    harness.broadcaster.expect_broadcast_all().returning(|_| 0);

    let request = CreateRoomRequest {
        is_public: false,
        password: Some(PlainPassword::new("room-secret").expect("password")),
        ..public_request()
    };
    let creation = harness
        .build()
        .create_room(&creator_id, request)
        .await
        .expect("room is created");
    assert!(!creation.room.summary().is_public);
}

#[rstest]
#[tokio::test]
async fn private_room_without_password_is_rejected(mut harness: Harness) {
    let creator = creator(Some(origin()));
    let creator_id = creator.id().clone();
    expect_creator(&mut harness.accounts, creator);
    harness.rooms.expect_create().never();

    let request = CreateRoomRequest {
        is_public: false,
        ..public_request()
    };
    let err = harness
        .build()
        .create_room(&creator_id, request)
        .await
        .expect_err("password required");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[case(0.0)]
#[case(-1.0)]
#[case(500_001.0)]
#[case(f64::NAN)]
#[tokio::test]
async fn invalid_radius_is_rejected(mut harness: Harness, #[case] radius: f64) {
    let creator = creator(Some(origin()));
    let creator_id = creator.id().clone();
    expect_creator(&mut harness.accounts, creator);
    harness.accounts.expect_find_within_radius().never();

    let request = CreateRoomRequest {
        radius_meters: Some(radius),
        ..public_request()
    };
    let err = harness
        .build()
        .create_room(&creator_id, request)
        .await
        .expect_err("radius must be valid");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn search_failure_maps_to_storage_error(mut harness: Harness) {
    let creator = creator(Some(origin()));
    let creator_id = creator.id().clone();
    expect_creator(&mut harness.accounts, creator);
    harness
        .accounts
        .expect_find_within_radius()
        .return_once(|_, _, _| {
            Err(crate::domain::ports::AccountRepositoryError::query("bad plan"))
        });
    harness.rooms.expect_create().never();

    let err = harness
        .build()
        .create_room(&creator_id, public_request())
        .await
        .expect_err("search failure aborts");
    assert_eq!(err.code(), ErrorCode::InternalError);
}
