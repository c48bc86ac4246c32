//! PostgreSQL-backed `AccountRepository` implementation using Diesel ORM.
//!
//! The proximity search runs as a parameterised haversine query. A bounding
//! box on latitude and longitude narrows the candidate rows first so the
//! location index can be used; the exact distance check follows.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sql_query;
use diesel::sql_types::{Double, Uuid as SqlUuid};
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{AccountRepository, AccountRepositoryError};
use crate::domain::{
    DisplayName, EARTH_RADIUS_METERS, EmailAddress, GeoPoint, NearbyUser, NewUser,
    PasswordHash, PostalCode, SearchRadius, User, UserId,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NearbyUserRow, NewUserRow, UserRow, UserUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::users;

const WITHIN_RADIUS_SQL: &str = r#"
SELECT id, email, display_name, distance_meters
FROM (
    SELECT id, email, display_name,
        2 * $1 * asin(least(1.0, sqrt(
            power(sin(radians(latitude - $3) / 2), 2)
            + cos(radians($3)) * cos(radians(latitude))
              * power(sin(radians(longitude - $2) / 2), 2)
        ))) AS distance_meters
    FROM users
    WHERE id <> $4
      AND latitude IS NOT NULL
      AND longitude IS NOT NULL
      AND latitude BETWEEN $5 AND $6
      AND longitude BETWEEN $7 AND $8
) AS candidates
WHERE distance_meters <= $9
ORDER BY distance_meters
"#;

/// Diesel-backed implementation of the account repository port.
#[derive(Clone)]
pub struct DieselAccountRepository {
    pool: DbPool,
}

impl DieselAccountRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AccountRepositoryError {
    map_basic_pool_error(error, AccountRepositoryError::connection)
}

/// Map Diesel errors, surfacing unique email violations.
fn map_diesel_error(error: DieselError, email: Option<&EmailAddress>) -> AccountRepositoryError {
    if let (DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _), Some(email)) =
        (&error, email)
    {
        debug!("unique violation on users.email");
        return AccountRepositoryError::duplicate_email(email.as_ref());
    }
    map_basic_diesel_error(
        error,
        AccountRepositoryError::query,
        AccountRepositoryError::connection,
    )
}

fn corrupt(field: &str, err: impl std::fmt::Display) -> AccountRepositoryError {
    AccountRepositoryError::query(format!("stored user has invalid {field}: {err}"))
}

fn stored_location(
    longitude: Option<f64>,
    latitude: Option<f64>,
) -> Result<Option<GeoPoint>, AccountRepositoryError> {
    match (longitude, latitude) {
        (Some(longitude), Some(latitude)) => GeoPoint::new(longitude, latitude)
            .map(Some)
            .map_err(|err| corrupt("location", err)),
        (None, None) => Ok(None),
        _ => Err(corrupt("location", "only one coordinate is set")),
    }
}

/// Convert a database row into a validated domain user.
fn row_to_user(row: UserRow) -> Result<User, AccountRepositoryError> {
    let UserRow {
        id,
        email,
        password_hash,
        display_name,
        postal_code,
        longitude,
        latitude,
        created_at,
    } = row;

    Ok(User::new(NewUser {
        id: UserId::from_uuid(id),
        email: EmailAddress::new(&email).map_err(|err| corrupt("email", err))?,
        password_hash: PasswordHash::new(password_hash),
        display_name: DisplayName::new(&display_name).map_err(|err| corrupt("display name", err))?,
        postal_code: PostalCode::new(&postal_code).map_err(|err| corrupt("postal code", err))?,
        location: stored_location(longitude, latitude)?,
        created_at,
    }))
}

fn row_to_nearby(row: NearbyUserRow) -> Result<NearbyUser, AccountRepositoryError> {
    Ok(NearbyUser {
        id: UserId::from_uuid(row.id),
        email: EmailAddress::new(&row.email).map_err(|err| corrupt("email", err))?,
        display_name: DisplayName::new(&row.display_name)
            .map_err(|err| corrupt("display name", err))?,
        distance_meters: row.distance_meters,
    })
}

/// Bounding box `(min_lat, max_lat, min_lon, max_lon)` for the prefilter.
///
/// Boxes that would wrap the antimeridian or reach a pole fall back to the
/// full longitude range.
fn bounding_box(center: GeoPoint, radius: SearchRadius) -> (f64, f64, f64, f64) {
    let (lat_delta, lon_delta) = center.bounding_deltas(radius);
    let min_lat = (center.latitude() - lat_delta).max(-90.0);
    let max_lat = (center.latitude() + lat_delta).min(90.0);
    let min_lon = center.longitude() - lon_delta;
    let max_lon = center.longitude() + lon_delta;
    let covers_pole = center.latitude().abs() + lat_delta >= 90.0;
    if covers_pole || min_lon < -180.0 || max_lon > 180.0 {
        (min_lat, max_lat, -180.0, 180.0)
    } else {
        (min_lat, max_lat, min_lon, max_lon)
    }
}

fn split_location(location: Option<GeoPoint>) -> (Option<f64>, Option<f64>) {
    match location {
        Some(point) => (Some(point.longitude()), Some(point.latitude())),
        None => (None, None),
    }
}

#[async_trait]
impl AccountRepository for DieselAccountRepository {
    async fn insert(&self, user: &User) -> Result<(), AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let (longitude, latitude) = split_location(user.location());
        let new_row = NewUserRow {
            id: *user.id().as_uuid(),
            email: user.email().as_ref(),
            password_hash: user.password_hash().as_ref(),
            display_name: user.display_name().as_ref(),
            postal_code: user.postal_code().as_ref(),
            longitude,
            latitude,
            created_at: user.created_at(),
        };

        diesel::insert_into(users::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, Some(user.email())))?;
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, None))?;
        row.map(row_to_user).transpose()
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, None))?;
        row.map(row_to_user).transpose()
    }

    async fn update(&self, user: &User) -> Result<(), AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let (longitude, latitude) = split_location(user.location());
        let changes = UserUpdate {
            password_hash: user.password_hash().as_ref(),
            display_name: user.display_name().as_ref(),
            postal_code: user.postal_code().as_ref(),
            longitude,
            latitude,
        };

        let updated = diesel::update(users::table.filter(users::id.eq(user.id().as_uuid())))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, Some(user.email())))?;
        if updated == 0 {
            return Err(AccountRepositoryError::query(format!(
                "user {} not found",
                user.id()
            )));
        }
        Ok(())
    }

    async fn find_within_radius(
        &self,
        center: GeoPoint,
        radius: SearchRadius,
        exclude: &UserId,
    ) -> Result<Vec<NearbyUser>, AccountRepositoryError> {
        let (min_lat, max_lat, min_lon, max_lon) = bounding_box(center, radius);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<NearbyUserRow> = sql_query(WITHIN_RADIUS_SQL)
            .bind::<Double, _>(EARTH_RADIUS_METERS)
            .bind::<Double, _>(center.longitude())
            .bind::<Double, _>(center.latitude())
            .bind::<SqlUuid, _>(*exclude.as_uuid())
            .bind::<Double, _>(min_lat)
            .bind::<Double, _>(max_lat)
            .bind::<Double, _>(min_lon)
            .bind::<Double, _>(max_lon)
            .bind::<Double, _>(radius.meters())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, None))?;
        rows.into_iter().map(row_to_nearby).collect()
    }
}
