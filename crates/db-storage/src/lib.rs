// SPDX-FileCopyrightText: Gatherly Contributors
//
// SPDX-License-Identifier: EUPL-1.2

#![allow(clippy::extra_unused_lifetimes)]

//! Contains the database ORM and database migrations for the event backend
//!
//! Builds upon gatherly-database. Each module contains the diesel structs and
//! queries of one table group; the migrations module embeds the refinery
//! migrations that create them.

#[macro_use]
extern crate diesel;

mod schema;

pub mod events;
pub mod migrations;
pub mod profiles;
pub mod users;
