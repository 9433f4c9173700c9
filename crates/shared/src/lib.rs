//! Shared utilities and common types for the VoIP Monitor backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Network identifier validation (MAC, IP, CIDR subnets)
//! - Range checks for percentages and map coordinates
//! - Cursor-based pagination

pub mod pagination;
pub mod validation;
