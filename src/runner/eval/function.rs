//! Script function instantiation and body execution.

use std::rc::Rc;

use tracing::trace;

use crate::parser::ast::{FunctionBodyData, FunctionData};
use crate::runner::ds::execution_context::InvocationRecord;
use crate::runner::ds::function_object::FunctionObject;
use crate::runner::ds::lex_env::{declare_var, new_function_scope, JsScopeType};
use crate::runner::ds::object::JsObjectType;
use crate::runner::ds::value::JsValue;

use super::expression::evaluate_expression;
use super::statement::execute_statement_list;
use super::types::{CompletionType, EvalContext, ValueResult};

/// Creates the callable object for a function declaration or expression, closing
/// over the current scope. Arrow functions also capture the current context.
pub fn instantiate_function(
    ctx: &mut EvalContext,
    code: &Rc<FunctionData>,
    inferred_name: Option<&str>,
) -> JsObjectType {
    let name = code
        .name
        .clone()
        .or_else(|| inferred_name.map(|n| n.to_string()))
        .unwrap_or_default();
    let environment = ctx.scope();
    let function = if code.is_arrow {
        let mut f = FunctionObject::new_arrow_function(code.clone(), environment, ctx.this_value());
        f.name = name;
        f
    } else {
        FunctionObject::new_script_function(name, code.clone(), environment)
    };
    ctx.realm().create_function(function)
}

/// Runs a script body for an invocation whose context is already resolved.
pub fn call_function(
    ctx: &mut EvalContext,
    code: &Rc<FunctionData>,
    environment: &JsScopeType,
    record: &InvocationRecord,
) -> ValueResult {
    let scope = new_function_scope(environment.clone(), record.context.clone());
    if let Some(arguments) = record.arguments() {
        let arguments = ctx.realm().create_array(arguments.to_vec());
        declare_var(&scope, "arguments", Some(JsValue::Object(arguments)));
    }
    for (index, param) in code.params.iter().enumerate() {
        declare_var(&scope, param, Some(record.argument(index)));
    }
    trace!(params = code.params.len(), args = record.argument_count(), "entering function body");

    let previous = ctx.replace_scope(scope);
    let result = match &code.body {
        FunctionBodyData::Block(statements) => {
            execute_statement_list(statements, ctx).map(|completion| {
                if completion.completion_type == CompletionType::Return {
                    completion.get_value()
                } else {
                    JsValue::Undefined
                }
            })
        }
        FunctionBodyData::Expression(expression) => evaluate_expression(expression, ctx),
    };
    ctx.replace_scope(previous);
    result
}
