mod api;
pub mod ast;
#[cfg(test)]
mod unit_tests;

pub use api::{parse_to_token_tree, ScriptParser};
