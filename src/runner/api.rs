use tracing::debug;

use crate::parser::ScriptParser;
use crate::runner::eval::statement::run_program;
use crate::runner::eval::types::{EvalContext, ValueResult};

/// Parses and runs `code` in `ctx`, returning the value of the last expression
/// statement (or `undefined`). Bindings persist in `ctx` between calls.
pub fn run_script(code: &str, ctx: &mut EvalContext) -> ValueResult {
    let program = ScriptParser::parse_to_ast_from_str(code)?;
    debug!(statements = program.body.len(), "parsed script");
    let completion = run_program(&program, ctx)?;
    Ok(completion.get_value())
}
