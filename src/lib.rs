//! vhostd - Virtual-hosting static file server
//!
//! Core library for the HTTP pipeline, file resolution and the listener.

pub mod config;
pub mod error;
pub mod files;
pub mod http;
pub mod server;
