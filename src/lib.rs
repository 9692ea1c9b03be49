//! Library exports for taskdeck, shared between the binary and tests.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod notify;
pub mod providers;
pub mod startup;
pub mod state;
pub mod store;
pub mod tasks;
pub mod utils;
