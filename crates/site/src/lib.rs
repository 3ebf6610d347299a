//! Folio site library.
//!
//! The site binary is a thin wrapper around [`routes::app`]; everything else
//! lives here so it can be tested without a running server.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod captcha;
pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod gallery;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
