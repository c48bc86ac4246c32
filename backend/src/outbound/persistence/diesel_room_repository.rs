//! PostgreSQL-backed `RoomRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{BigInt, Text, Uuid as SqlUuid};
use diesel_async::RunQueryDsl;

use crate::domain::ports::{RoomRepository, RoomRepositoryError};
use crate::domain::{
    DisplayName, GeoPoint, Invitee, PasswordHash, Room, RoomId, RoomName, RoomVisibility, UserId,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewRoomRow, RoomRow, like_pattern};
use super::pool::{DbPool, PoolError};
use super::schema::rooms;

const ROOMS_FOR_USER_SQL: &str = r#"
SELECT id, name, description, is_public, password_hash, creator_id, creator_name,
       longitude, latitude, invitees, created_at
FROM rooms
WHERE creator_id = $1
   OR invitees @> jsonb_build_array(jsonb_build_object('userId', $2::text))
   OR id IN (SELECT DISTINCT room_id FROM messages WHERE sender_id = $1)
ORDER BY created_at DESC, id DESC
LIMIT $3
"#;

/// Diesel-backed implementation of the room repository port.
#[derive(Clone)]
pub struct DieselRoomRepository {
    pool: DbPool,
}

impl DieselRoomRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> RoomRepositoryError {
    map_basic_pool_error(error, RoomRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> RoomRepositoryError {
    map_basic_diesel_error(
        error,
        RoomRepositoryError::query,
        RoomRepositoryError::connection,
    )
}

fn corrupt(field: &str, err: impl std::fmt::Display) -> RoomRepositoryError {
    RoomRepositoryError::query(format!("stored room has invalid {field}: {err}"))
}

fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

fn row_visibility(
    is_public: bool,
    password_hash: Option<String>,
) -> Result<RoomVisibility, RoomRepositoryError> {
    match (is_public, password_hash) {
        (true, _) => Ok(RoomVisibility::Public),
        (false, Some(hash)) => Ok(RoomVisibility::Private {
            password_hash: PasswordHash::new(hash),
        }),
        (false, None) => Err(corrupt("visibility", "private room without a password hash")),
    }
}

/// Convert a database row into a validated domain room.
fn row_to_room(row: RoomRow) -> Result<Room, RoomRepositoryError> {
    let RoomRow {
        id,
        name,
        description,
        is_public,
        password_hash,
        creator_id,
        creator_name,
        longitude,
        latitude,
        invitees,
        created_at,
    } = row;

    let invitees: Vec<Invitee> =
        serde_json::from_value(invitees).map_err(|err| corrupt("invitees", err))?;
    Ok(Room {
        id: RoomId::new(&id).map_err(|err| corrupt("id", err))?,
        name: RoomName::new(&name).map_err(|err| corrupt("name", err))?,
        description,
        visibility: row_visibility(is_public, password_hash)?,
        creator_id: UserId::from_uuid(creator_id),
        creator_name: DisplayName::new(&creator_name)
            .map_err(|err| corrupt("creator name", err))?,
        location: GeoPoint::new(longitude, latitude).map_err(|err| corrupt("location", err))?,
        invitees,
        created_at,
    })
}

fn rows_to_rooms(rows: Vec<RoomRow>) -> Result<Vec<Room>, RoomRepositoryError> {
    rows.into_iter().map(row_to_room).collect()
}

#[async_trait]
impl RoomRepository for DieselRoomRepository {
    async fn create(&self, room: &Room) -> Result<(), RoomRepositoryError> {
        let invitees = serde_json::to_value(&room.invitees)
            .map_err(|err| RoomRepositoryError::query(format!("serialise invitees: {err}")))?;
        let new_row = NewRoomRow {
            id: room.id.as_ref(),
            name: room.name.as_ref(),
            description: room.description.as_deref(),
            is_public: room.visibility.is_public(),
            password_hash: room.visibility.password_hash().map(|hash| hash.as_ref()),
            creator_id: *room.creator_id.as_uuid(),
            creator_name: room.creator_name.as_ref(),
            longitude: room.location.longitude(),
            latitude: room.location.latitude(),
            invitees,
            created_at: room.created_at,
        };

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(rooms::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn find_by_id(&self, id: &RoomId) -> Result<Option<Room>, RoomRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = rooms::table
            .filter(rooms::id.eq(id.as_ref()))
            .select(RoomRow::as_select())
            .first::<RoomRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_room).transpose()
    }

    async fn find_name(&self, id: &RoomId) -> Result<Option<RoomName>, RoomRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let name = rooms::table
            .filter(rooms::id.eq(id.as_ref()))
            .select(rooms::name)
            .first::<String>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        name.map(|name| RoomName::new(&name).map_err(|err| corrupt("name", err)))
            .transpose()
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<Room>, RoomRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = rooms::table
            .select(RoomRow::as_select())
            .order((rooms::created_at.desc(), rooms::id.desc()))
            .limit(sql_limit(limit))
            .load::<RoomRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_rooms(rows)
    }

    async fn search(&self, keyword: &str, limit: usize) -> Result<Vec<Room>, RoomRepositoryError> {
        let pattern = like_pattern(keyword);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = rooms::table
            .filter(
                rooms::name
                    .ilike(&pattern)
                    .or(rooms::description.ilike(&pattern)),
            )
            .select(RoomRow::as_select())
            .order((rooms::created_at.desc(), rooms::id.desc()))
            .limit(sql_limit(limit))
            .load::<RoomRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_rooms(rows)
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
        limit: usize,
    ) -> Result<Vec<Room>, RoomRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<RoomRow> = sql_query(ROOMS_FOR_USER_SQL)
            .bind::<SqlUuid, _>(*user_id.as_uuid())
            .bind::<Text, _>(user_id.as_ref())
            .bind::<BigInt, _>(sql_limit(limit))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_rooms(rows)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for row mapping.

    use super::*;
    use chrono::Utc;
    use rstest::rstest;
    use serde_json::json;
    use uuid::Uuid;

    fn row(is_public: bool, password_hash: Option<&str>, invitees: serde_json::Value) -> RoomRow {
        RoomRow {
            id: RoomId::generate().to_string(),
            name: "Cafe".to_owned(),
            description: None,
            is_public,
            password_hash: password_hash.map(str::to_owned),
            creator_id: Uuid::new_v4(),
            creator_name: "Ada".to_owned(),
            longitude: 139.0,
            latitude: 35.0,
            invitees,
            created_at: Utc::now(),
        }
    }

    #[rstest]
    fn invitee_snapshot_decodes() {
        let invitee_id = Uuid::new_v4();
        let room = row_to_room(row(
            true,
            None,
            json!([{ "userId": invitee_id.to_string(), "displayName": "Bob" }]),
        ))
        .expect("valid row");
        assert_eq!(room.invitees.len(), 1);
        assert_eq!(room.invitees[0].user_id, UserId::from_uuid(invitee_id));
    }

    #[rstest]
    fn private_rows_keep_their_hash() {
        let room = row_to_room(row(false, Some("$argon2id$x"), json!([]))).expect("valid row");
        assert_eq!(
            room.visibility.password_hash().map(|hash| hash.as_ref().to_owned()),
            Some("$argon2id$x".to_owned())
        );
    }

    #[rstest]
    #[case(row(false, None, json!([])))]
    #[case(row(true, None, json!({"not": "a list"})))]
    fn corrupt_rows_are_query_errors(#[case] corrupt_row: RoomRow) {
        let err = row_to_room(corrupt_row).expect_err("corrupt row");
        assert!(matches!(err, RoomRepositoryError::Query { .. }));
    }

    #[rstest]
    fn oversized_limits_saturate() {
        assert_eq!(sql_limit(10), 10);
        assert_eq!(sql_limit(usize::MAX), i64::MAX);
    }
}
