//! # Interface Layer
//!
//! Commands exposed to chat users.

pub mod commands;
