//! Library crate for padel-live-back: live scoring, set validation and standings
//! for a padel tournament, exposed to the server binary and integration tests.

pub mod config;
pub mod dao;
mod dto;
mod error;
pub mod routes;
pub mod services;
pub mod state;
