//! Domain layer for the VoIP Monitor backend.
//!
//! This crate contains:
//! - Domain models (Building, Network, Device, Extension, AlertSettings)
//! - The alert level classifier and the daily activity sample array
//! - Alert evaluation and notification services

pub mod models;
pub mod services;
