//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. When a
//! migration changes the schema, regenerate them with `diesel print-schema`
//! or update them by hand.

diesel::table! {
    /// Registered accounts. `email` carries a unique index and is the login
    /// key. The location pair is either both set or both null.
    users (id) {
        id -> Uuid,
        email -> Varchar,
        password_hash -> Text,
        display_name -> Varchar,
        postal_code -> Varchar,
        longitude -> Nullable<Float8>,
        latitude -> Nullable<Float8>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Chat rooms with their invitee snapshot.
    rooms (id) {
        /// `room_` followed by 32 lowercase hex digits.
        id -> Varchar,
        name -> Varchar,
        description -> Nullable<Text>,
        is_public -> Bool,
        /// Set exactly when `is_public` is false.
        password_hash -> Nullable<Text>,
        creator_id -> Uuid,
        creator_name -> Varchar,
        longitude -> Float8,
        latitude -> Float8,
        /// JSON array of `{userId, displayName}` objects.
        invitees -> Jsonb,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Chat messages. `room_id` is not a foreign key: messages sent to an
    /// unknown room are still recorded under the placeholder room name.
    messages (id) {
        id -> Uuid,
        room_id -> Varchar,
        room_name -> Varchar,
        sender_id -> Nullable<Uuid>,
        sender_name -> Varchar,
        body -> Text,
        /// `user` or `system`.
        kind -> Varchar,
        sent_at -> Timestamptz,
    }
}

diesel::joinable!(rooms -> users (creator_id));

diesel::allow_tables_to_appear_in_same_query!(users, rooms, messages);
