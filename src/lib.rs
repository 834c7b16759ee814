//! SEO audit companion service
//!
//! This library drives website analysis jobs on the remote audit backend to
//! completion and ranks keyword candidates for the keyword selector: a
//! relevance score against page and service hints, filtering, sorting and a
//! bounded ordered selection.

pub mod app_state;
pub mod config;
pub mod models;
pub mod routes;
pub mod services;
