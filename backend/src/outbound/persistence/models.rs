//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::{Double, Uuid as SqlUuid, Varchar};
use uuid::Uuid;

use super::schema::{messages, rooms, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub display_name: String,
    pub postal_code: String,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub display_name: &'a str,
    pub postal_code: &'a str,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// Changeset for profile updates. Email is immutable and never written.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct UserUpdate<'a> {
    pub password_hash: &'a str,
    pub display_name: &'a str,
    pub postal_code: &'a str,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
}

/// Result row of the proximity query.
#[derive(Debug, Clone, QueryableByName)]
pub(crate) struct NearbyUserRow {
    #[diesel(sql_type = SqlUuid)]
    pub id: Uuid,
    #[diesel(sql_type = Varchar)]
    pub email: String,
    #[diesel(sql_type = Varchar)]
    pub display_name: String,
    #[diesel(sql_type = Double)]
    pub distance_meters: f64,
}

/// Row struct for reading from the rooms table, by DSL or raw SQL.
#[derive(Debug, Clone, Queryable, Selectable, QueryableByName)]
#[diesel(table_name = rooms)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RoomRow {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub is_public: bool,
    pub password_hash: Option<String>,
    pub creator_id: Uuid,
    pub creator_name: String,
    pub longitude: f64,
    pub latitude: f64,
    pub invitees: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = rooms)]
pub(crate) struct NewRoomRow<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub is_public: bool,
    pub password_hash: Option<&'a str>,
    pub creator_id: Uuid,
    pub creator_name: &'a str,
    pub longitude: f64,
    pub latitude: f64,
    pub invitees: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Row struct for reading from the messages table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MessageRow {
    pub id: Uuid,
    pub room_id: String,
    pub room_name: String,
    pub sender_id: Option<Uuid>,
    pub sender_name: String,
    pub body: String,
    pub kind: String,
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = messages)]
pub(crate) struct NewMessageRow<'a> {
    pub id: Uuid,
    pub room_id: &'a str,
    pub room_name: &'a str,
    pub sender_id: Option<Uuid>,
    pub sender_name: &'a str,
    pub body: &'a str,
    pub kind: &'a str,
    pub sent_at: DateTime<Utc>,
}

/// Escape `LIKE` metacharacters so a keyword matches literally.
pub(crate) fn like_pattern(keyword: &str) -> String {
    let escaped = keyword
        .replace('\\', r"\\")
        .replace('%', r"\%")
        .replace('_', r"\_");
    format!("%{escaped}%")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("cafe", "%cafe%")]
    #[case("100%", r"%100\%%")]
    #[case("a_b", r"%a\_b%")]
    #[case(r"back\slash", r"%back\\slash%")]
    fn like_patterns_escape_metacharacters(#[case] keyword: &str, #[case] expected: &str) {
        assert_eq!(like_pattern(keyword), expected);
    }
}
