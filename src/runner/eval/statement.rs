//! Statement execution.

use tracing::debug;

use crate::parser::ast::{
    ExpressionType, ProgramData, StatementType, VariableDeclarationKind, VariableDeclaratorData,
};
use crate::runner::ds::lex_env::new_block_scope;
use crate::runner::ds::value::JsValue;

use super::expression::evaluate_expression;
use super::function::instantiate_function;
use super::types::{Completion, EvalContext, EvalResult};

/// Runs a whole script in the context's current (global) scope.
pub fn run_program(program: &ProgramData, ctx: &mut EvalContext) -> EvalResult {
    debug!(statements = program.body.len(), "running program");
    execute_statement_list(&program.body, ctx)
}

/// Execute a statement and return its completion.
pub fn execute_statement(stmt: &StatementType, ctx: &mut EvalContext) -> EvalResult {
    match stmt {
        StatementType::EmptyStatement { .. } => Ok(Completion::normal()),

        StatementType::ExpressionStatement { expression, .. } => {
            let value = evaluate_expression(expression, ctx)?;
            Ok(Completion::normal_with_value(value))
        }

        // Already bound by hoisting.
        StatementType::FunctionDeclaration(_) => Ok(Completion::normal()),

        StatementType::VariableDeclaration {
            kind, declarations, ..
        } => execute_variable_declaration(*kind, declarations, ctx),

        StatementType::ReturnStatement { argument, .. } => {
            let value = match argument {
                Some(expr) => evaluate_expression(expr, ctx)?,
                None => JsValue::Undefined,
            };
            Ok(Completion::return_value(value))
        }

        StatementType::IfStatement {
            test,
            consequent,
            alternate,
            ..
        } => {
            if evaluate_expression(test, ctx)?.to_boolean() {
                execute_statement(consequent, ctx)
            } else if let Some(alternate) = alternate {
                execute_statement(alternate, ctx)
            } else {
                Ok(Completion::normal())
            }
        }

        StatementType::BlockStatement { body, .. } => {
            let block_scope = new_block_scope(ctx.scope());
            let previous = ctx.replace_scope(block_scope);
            let result = execute_statement_list(body, ctx);
            ctx.replace_scope(previous);
            result
        }
    }
}

/// Executes statements in order after hoisting, stopping at the first `return`.
pub fn execute_statement_list(statements: &[StatementType], ctx: &mut EvalContext) -> EvalResult {
    hoist_declarations(statements, ctx);
    let mut last = Completion::normal();
    for statement in statements {
        let completion = execute_statement(statement, ctx)?;
        if completion.is_abrupt() {
            return Ok(completion);
        }
        if completion.value.is_some() {
            last = completion;
        }
    }
    Ok(last)
}

/// Function declarations are bound before the first statement runs; `var` names
/// are declared as `undefined` until their initializer executes.
fn hoist_declarations(statements: &[StatementType], ctx: &mut EvalContext) {
    for statement in statements {
        hoist_var_names(statement, ctx);
    }
    for statement in statements {
        if let StatementType::FunctionDeclaration(code) = statement {
            let function = instantiate_function(ctx, code, None);
            let name = code.name.clone().unwrap_or_default();
            ctx.declare_var(&name, Some(JsValue::Object(function)));
        }
    }
}

fn hoist_var_names(statement: &StatementType, ctx: &mut EvalContext) {
    match statement {
        StatementType::VariableDeclaration {
            kind: VariableDeclarationKind::Var,
            declarations,
            ..
        } => {
            for declaration in declarations {
                ctx.declare_var(&declaration.name, None);
            }
        }
        StatementType::IfStatement {
            consequent,
            alternate,
            ..
        } => {
            hoist_var_names(consequent, ctx);
            if let Some(alternate) = alternate {
                hoist_var_names(alternate, ctx);
            }
        }
        StatementType::BlockStatement { body, .. } => {
            for s in body {
                hoist_var_names(s, ctx);
            }
        }
        _ => {}
    }
}

fn execute_variable_declaration(
    kind: VariableDeclarationKind,
    declarations: &[VariableDeclaratorData],
    ctx: &mut EvalContext,
) -> EvalResult {
    for declaration in declarations {
        let value = match &declaration.init {
            Some(ExpressionType::FunctionExpression(code)) if code.name.is_none() => Some(
                JsValue::Object(instantiate_function(ctx, code, Some(&declaration.name))),
            ),
            Some(expr) => Some(evaluate_expression(expr, ctx)?),
            None => None,
        };
        match kind {
            VariableDeclarationKind::Var => ctx.declare_var(&declaration.name, value),
            VariableDeclarationKind::Let => ctx.declare_lexical(
                &declaration.name,
                value.unwrap_or(JsValue::Undefined),
                false,
            )?,
            VariableDeclarationKind::Const => ctx.declare_lexical(
                &declaration.name,
                value.unwrap_or(JsValue::Undefined),
                true,
            )?,
        }
    }
    Ok(Completion::normal())
}
