//! Form domain layer
//!
//! Field definitions, the short and extended registration forms, and the
//! session that owns their values.

mod field;
mod form_state;

pub use field::{FieldKind, FormField};
pub use form_state::{
    FormSession, FormVariant, LookupOutcome, SessionStatus, Submission, SubmitOutcome,
};
