//! Shopfront storefront library.
//!
//! Everything the `shopfront-storefront` binary serves lives here so the
//! router can be driven from tests and the CLI can reuse the repositories.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod components;
pub mod config;
pub mod db;
pub mod error;
pub mod forms;
pub mod messages;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
