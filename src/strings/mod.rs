//! # Strings Module
//!
//! Centralizes user-facing strings so replies stay consistent across commands.

pub mod messages;
