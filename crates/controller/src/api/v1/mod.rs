// SPDX-FileCopyrightText: Gatherly Contributors
//
// SPDX-License-Identifier: EUPL-1.2

//! REST API v1
//!
//! Current Endpoints. See their respective function:
//! - `/auth/register` ([POST](auth::register))
//! - `/auth/login` ([POST](auth::login))
//! - `/events` ([GET](events::get_events), [POST](events::new_event))
//! - `/events/{event_id}` ([GET](events::get_event), [PUT|PATCH](events::patch_event), [DELETE](events::delete_event))
//! - `/events/{event_id}/rsvp` ([POST](events::rsvps::rsvp_to_event))
//! - `/events/{event_id}/update_rsvp` ([POST](events::rsvps::update_rsvp))
//! - `/events/{event_id}/reviews` ([GET](events::reviews::get_reviews))
//! - `/events/{event_id}/add_review` ([POST](events::reviews::add_review))
//! - `/events/{event_id}/invitations` ([GET](events::invitations::get_invitations))
//! - `/events/{event_id}/invite` ([POST](events::invitations::invite_user))
//! - `/events/{event_id}/remove_invitation` ([POST](events::invitations::remove_invitation))
//! - `/users/me` ([GET](users::get_me), [PATCH](users::patch_me))
//! - `/users/{user_id}` ([GET](users::get_user))

pub use response::{ApiResponse, DefaultApiResult};

pub mod auth;
pub mod events;
pub mod middleware;
pub mod response;
pub mod users;
