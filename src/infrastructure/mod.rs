//! # Infrastructure Layer
//!
//! Local implementations of the collaborator traits defined in the Domain layer.

pub mod console;
pub mod roles;
