//! Evaluation of parsed scripts against a realm.

pub mod expression;
pub mod function;
pub mod statement;
pub mod types;

pub use types::{Completion, CompletionType, EvalContext, EvalResult, ValueResult};
