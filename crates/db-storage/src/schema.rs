// SPDX-FileCopyrightText: Gatherly Contributors
//
// SPDX-License-Identifier: EUPL-1.2

table! {
    event_invitations (id) {
        id -> Int8,
        event_id -> Uuid,
        user_id -> Uuid,
        invited_at -> Timestamptz,
    }
}

table! {
    event_reviews (id) {
        id -> Int8,
        event_id -> Uuid,
        user_id -> Uuid,
        rating -> Int4,
        comment -> Text,
        created_at -> Timestamptz,
    }
}

table! {
    event_rsvps (id) {
        id -> Int8,
        event_id -> Uuid,
        user_id -> Uuid,
        status -> Varchar,
    }
}

table! {
    events (id) {
        id -> Uuid,
        title -> Varchar,
        description -> Text,
        location -> Varchar,
        created_by -> Uuid,
        starts_at -> Timestamptz,
        ends_at -> Timestamptz,
        is_public -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

table! {
    refinery_schema_history (version) {
        version -> Int4,
        name -> Nullable<Varchar>,
        applied_on -> Nullable<Varchar>,
        checksum -> Nullable<Varchar>,
    }
}

table! {
    user_profiles (user_id) {
        user_id -> Uuid,
        full_name -> Varchar,
        bio -> Text,
        location -> Varchar,
    }
}

table! {
    users (id) {
        id -> Uuid,
        username -> Varchar,
        email -> Varchar,
        firstname -> Varchar,
        lastname -> Varchar,
        password_hash -> Varchar,
        created_at -> Timestamptz,
    }
}

joinable!(event_invitations -> events (event_id));
joinable!(event_invitations -> users (user_id));
joinable!(event_reviews -> events (event_id));
joinable!(event_reviews -> users (user_id));
joinable!(event_rsvps -> events (event_id));
joinable!(event_rsvps -> users (user_id));
joinable!(events -> users (created_by));
joinable!(user_profiles -> users (user_id));

allow_tables_to_appear_in_same_query!(
    event_invitations,
    event_reviews,
    event_rsvps,
    events,
    refinery_schema_history,
    user_profiles,
    users,
);
