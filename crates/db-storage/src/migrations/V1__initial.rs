// SPDX-FileCopyrightText: Gatherly Contributors
//
// SPDX-License-Identifier: EUPL-1.2

use barrel::backend::Pg;
use barrel::{types, Migration};

pub fn migration() -> String {
    let mut migr = Migration::new();

    migr.create_table("users", |table| {
        table.add_column("id", types::uuid().primary(true));
        table.add_column("username", types::varchar(150).unique(true).nullable(false));
        table.add_column("email", types::varchar(255).nullable(false));
        table.add_column("firstname", types::varchar(255).nullable(false));
        table.add_column("lastname", types::varchar(255).nullable(false));
        table.add_column("password_hash", types::varchar(255).nullable(false));
        table.add_column("created_at", types::custom("TIMESTAMPTZ NOT NULL DEFAULT now()"));
    });

    migr.create_table("user_profiles", |table| {
        table.add_column(
            "user_id",
            types::custom("UUID PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE"),
        );
        table.add_column("full_name", types::varchar(255).nullable(false));
        table.add_column("bio", types::text().nullable(false));
        table.add_column("location", types::varchar(255).nullable(false));
    });

    migr.create_table("events", |table| {
        table.add_column("id", types::uuid().primary(true));
        table.add_column("title", types::varchar(255).nullable(false));
        table.add_column("description", types::text().nullable(false));
        table.add_column("location", types::varchar(255).nullable(false));
        table.add_column(
            "created_by",
            types::custom("UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE"),
        );
        table.add_column("starts_at", types::custom("TIMESTAMPTZ NOT NULL"));
        table.add_column("ends_at", types::custom("TIMESTAMPTZ NOT NULL"));
        table.add_column("is_public", types::boolean().nullable(false).default(true));
        table.add_column("created_at", types::custom("TIMESTAMPTZ NOT NULL DEFAULT now()"));
        table.add_column("updated_at", types::custom("TIMESTAMPTZ NOT NULL DEFAULT now()"));
    });

    migr.create_table("event_rsvps", |table| {
        table.add_column("id", types::custom("BIGSERIAL").primary(true));
        table.add_column(
            "event_id",
            types::custom("UUID NOT NULL REFERENCES events(id) ON DELETE CASCADE"),
        );
        table.add_column(
            "user_id",
            types::custom("UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE"),
        );
        table.add_column("status", types::varchar(10).nullable(false));
        table.inject_custom("UNIQUE (event_id, user_id)");
    });

    migr.create_table("event_reviews", |table| {
        table.add_column("id", types::custom("BIGSERIAL").primary(true));
        table.add_column(
            "event_id",
            types::custom("UUID NOT NULL REFERENCES events(id) ON DELETE CASCADE"),
        );
        table.add_column(
            "user_id",
            types::custom("UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE"),
        );
        table.add_column(
            "rating",
            types::custom("INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5)"),
        );
        table.add_column("comment", types::text().nullable(false));
        table.add_column("created_at", types::custom("TIMESTAMPTZ NOT NULL DEFAULT now()"));
        table.inject_custom("UNIQUE (event_id, user_id)");
    });

    migr.create_table("event_invitations", |table| {
        table.add_column("id", types::custom("BIGSERIAL").primary(true));
        table.add_column(
            "event_id",
            types::custom("UUID NOT NULL REFERENCES events(id) ON DELETE CASCADE"),
        );
        table.add_column(
            "user_id",
            types::custom("UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE"),
        );
        table.add_column("invited_at", types::custom("TIMESTAMPTZ NOT NULL DEFAULT now()"));
        table.inject_custom("UNIQUE (event_id, user_id)");
    });

    migr.make::<Pg>()
}
