// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Security Standard - authentication and authorization server
//!
//! Users log in with email and password and receive a signed, time-limited
//! bearer token. Every request then passes a gate that classifies its
//! method and path against an ordered rule table and either lets it through
//! with the caller's principal attached, or rejects it with 401 or 403.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers and router (Axum)
//! - `auth` - Credential verification, token codec, policy and request gate
//! - `config` - Environment configuration
//! - `store` - User repository

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod state;
pub mod store;
