//! xrptax - a terminal client for an XRP Ledger tax-reporting backend.
//!
//! The library is organized around two cooperating pieces:
//!
//! - `auth`: the session lifecycle (restore/login/register/logout) over a
//!   single durable credential record
//! - `api`: the HTTP gateway that attaches the bearer token to every
//!   request and clears the session on 401 before the caller sees the error
//!
//! plus the wire `models`, client-side `validate` checks, a small response
//! `cache` for the command layer, and the `app` shell the binary drives.

pub mod api;
pub mod app;
pub mod auth;
pub mod cache;
pub mod config;
pub mod models;
pub mod utils;
pub mod validate;
