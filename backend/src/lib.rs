//! Wellness Tracker Backend Library
//!
//! Services for users, health measurements and wellness plans over a
//! PostgreSQL or in-memory store. A request layer embeds this crate and
//! drives [`services::HealthSystem`].

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod repositories;
pub mod services;
pub mod state;
pub mod telemetry;
