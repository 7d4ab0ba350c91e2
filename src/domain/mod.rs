//! # Domain Layer
//!
//! Core definitions, types, and traits shared by every other layer.
//! Independent of any particular chat service.

pub mod config;
pub mod traits;
pub mod types;
