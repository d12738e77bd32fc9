//! `ridegate-core`: identity and error primitives shared by every crate.
//!
//! This crate contains **pure** building blocks (no infrastructure concerns).

pub mod error;
pub mod id;

pub use error::DomainError;
pub use id::{ActorId, TokenId};
