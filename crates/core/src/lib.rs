//! # inkmath Core
//!
//! Domain types, traits, and error definitions for the inkmath
//! sketch-solving service. This crate has **zero framework dependencies** —
//! it defines the domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! The external generative model is defined as a trait here (`Generator`);
//! the concrete client lives in `inkmath-providers`. This enables:
//! - Swapping backends via configuration
//! - Easy testing with scripted stub generators
//! - Clean dependency graph (all crates depend inward on core)

pub mod error;
pub mod generator;
pub mod media;
pub mod record;

// Re-export key types at crate root for ergonomics
pub use error::{Error, GeneratorError, RequestError, Result};
pub use generator::Generator;
pub use media::ImagePayload;
pub use record::{AnswerRecord, ConversationTurn, TurnRole, VariableBindings};
