// SPDX-FileCopyrightText: Gatherly Contributors
//
// SPDX-License-Identifier: EUPL-1.2

//! Middlewares of the REST APIv1

pub mod token_auth;
