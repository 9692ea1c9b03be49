//! HTTP access to the task API.

mod client;

pub use client::ApiClient;
