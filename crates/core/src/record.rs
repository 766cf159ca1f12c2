//! Answer record and conversation domain types.
//!
//! These are the value objects that flow through the system: an inbound
//! request carries an image plus variable bindings (or a chat history), and
//! the response carries normalized `AnswerRecord`s (or explanation prose).
//! All of them are request-scoped — nothing here persists beyond one call.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Variables the user has previously assigned, substituted into the solve
/// prompt. Read-only to this system; `BTreeMap` keeps the serialized form
/// deterministic.
pub type VariableBindings = BTreeMap<String, serde_json::Value>;

/// The normalized unit of output: an expression/result pair plus an
/// assignment flag.
///
/// Represents a computed expression, a variable assignment, or an
/// abstract-concept interpretation. After normalization all three fields
/// are always populated; `result` keeps whatever literal type parsing
/// yielded (numeric vs. string is never coerced).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerRecord {
    /// The recognized expression, variable name, or drawing description.
    #[serde(default)]
    pub expr: String,

    /// The computed result or assigned value, type preserved as parsed.
    #[serde(default)]
    pub result: serde_json::Value,

    /// Whether this record assigns a value to a variable.
    #[serde(default)]
    pub assign: bool,
}

impl AnswerRecord {
    pub fn new(expr: impl Into<String>, result: serde_json::Value, assign: bool) -> Self {
        Self {
            expr: expr.into(),
            result,
            assign,
        }
    }

    /// The sentinel record returned when a generator response could not be
    /// parsed. The caller's contract guarantees a success-shaped payload
    /// whenever generation itself succeeded, so parse failures become this
    /// record instead of an HTTP error.
    pub fn parse_failure() -> Self {
        Self {
            expr: "Error".into(),
            result: serde_json::Value::String("Failed to parse response".into()),
            assign: false,
        }
    }
}

/// Who produced a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    /// The end user
    User,
    /// The generative model
    Model,
}

/// A single turn of an explanation conversation, immutable once received.
///
/// Turns are replayed in order to reconstruct session state on the
/// generator side. Replay is role-agnostic: both roles are resent as
/// outbound messages, only order is preserved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
        }
    }

    pub fn model(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Model,
            content: content.into(),
        }
    }
}
