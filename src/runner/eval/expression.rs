//! Expression evaluation.
//!
//! Call expressions are where context binding starts: a member callee produces a
//! receiver call site, anything else a bare one. `new` goes through construction.

use crate::parser::ast::{
    AssignmentOperator, BinaryOperator, ExpressionType, LiteralType, LogicalOperator,
    MemberExpressionType, PropertyData, TemplatePart, UnaryOperator,
};
use crate::runner::binder::{construct, invoke, CallSite};
use crate::runner::ds::error::JErrorType;
use crate::runner::ds::function_object::FunctionBody;
use crate::runner::ds::object::{array_index, JsObjectType};
use crate::runner::ds::value::{JsValue, TYPE_STR_UNDEFINED};
use crate::runner::prototype_chain::write_property;

use super::function::instantiate_function;
use super::types::{EvalContext, ValueResult};

/// Evaluate an expression and return its value.
pub fn evaluate_expression(expr: &ExpressionType, ctx: &mut EvalContext) -> ValueResult {
    match expr {
        ExpressionType::Literal(lit) => Ok(evaluate_literal(lit)),

        ExpressionType::Identifier(name) => ctx.get_binding(name),

        ExpressionType::ThisExpression => Ok(ctx.this_value()),

        ExpressionType::TemplateLiteral(parts) => evaluate_template_literal(parts, ctx),

        ExpressionType::ArrayExpression(elements) => {
            let values = evaluate_arguments(elements, ctx)?;
            Ok(JsValue::Object(ctx.realm().create_array(values)))
        }

        ExpressionType::ObjectExpression(properties) => {
            evaluate_object_expression(properties, ctx)
        }

        ExpressionType::FunctionExpression(code) => {
            Ok(JsValue::Object(instantiate_function(ctx, code, None)))
        }

        ExpressionType::UnaryExpression { operator, argument } => {
            evaluate_unary_expression(operator, argument, ctx)
        }

        ExpressionType::BinaryExpression {
            operator,
            left,
            right,
        } => evaluate_binary_expression(operator, left, right, ctx),

        ExpressionType::LogicalExpression {
            operator,
            left,
            right,
        } => evaluate_logical_expression(operator, left, right, ctx),

        ExpressionType::ConditionalExpression {
            test,
            consequent,
            alternate,
        } => {
            if evaluate_expression(test, ctx)?.to_boolean() {
                evaluate_expression(consequent, ctx)
            } else {
                evaluate_expression(alternate, ctx)
            }
        }

        ExpressionType::AssignmentExpression {
            operator,
            left,
            right,
        } => evaluate_assignment_expression(operator, left, right, ctx),

        ExpressionType::MemberExpression(member) => {
            let (object, key) = evaluate_member_parts(member, ctx)?;
            get_property(ctx, &object, &key)
        }

        ExpressionType::CallExpression { callee, arguments } => {
            evaluate_call_expression(callee, arguments, ctx)
        }

        ExpressionType::NewExpression { callee, arguments } => {
            evaluate_new_expression(callee, arguments, ctx)
        }
    }
}

fn evaluate_literal(lit: &LiteralType) -> JsValue {
    match lit {
        LiteralType::NullLiteral => JsValue::Null,
        LiteralType::BooleanLiteral(b) => JsValue::Boolean(*b),
        LiteralType::StringLiteral(s) => JsValue::String(s.clone()),
        LiteralType::NumberLiteral(n) => JsValue::Number(*n),
    }
}

fn evaluate_template_literal(parts: &[TemplatePart], ctx: &mut EvalContext) -> ValueResult {
    let mut result = String::new();
    for part in parts {
        match part {
            TemplatePart::Text(text) => result.push_str(text),
            TemplatePart::Substitution(expr) => {
                result.push_str(&evaluate_expression(expr, ctx)?.to_js_string())
            }
        }
    }
    Ok(JsValue::String(result))
}

fn evaluate_arguments(arguments: &[ExpressionType], ctx: &mut EvalContext) -> Result<Vec<JsValue>, JErrorType> {
    let mut values = Vec::with_capacity(arguments.len());
    for argument in arguments {
        values.push(evaluate_expression(argument, ctx)?);
    }
    Ok(values)
}

fn evaluate_object_expression(properties: &[PropertyData], ctx: &mut EvalContext) -> ValueResult {
    let object = ctx.realm().create_object();
    for property in properties {
        let value = match &property.value {
            // Anonymous functions take the key as their name.
            ExpressionType::FunctionExpression(code) if code.name.is_none() => {
                JsValue::Object(instantiate_function(ctx, code, Some(&property.key)))
            }
            other => evaluate_expression(other, ctx)?,
        };
        write_property(&object, &property.key, value);
    }
    Ok(JsValue::Object(object))
}

/// Evaluates the object and key of a member expression without reading the property.
fn evaluate_member_parts(
    member: &MemberExpressionType,
    ctx: &mut EvalContext,
) -> Result<(JsValue, String), JErrorType> {
    match member {
        MemberExpressionType::SimpleMemberExpression { object, property } => {
            Ok((evaluate_expression(object, ctx)?, property.clone()))
        }
        MemberExpressionType::ComputedMemberExpression { object, property } => {
            let object = evaluate_expression(object, ctx)?;
            let key = evaluate_expression(property, ctx)?.to_js_string();
            Ok((object, key))
        }
    }
}

/// Property read on any value. Primitives other than strings only see
/// `Object.prototype`.
pub fn get_property(ctx: &EvalContext, base: &JsValue, key: &str) -> ValueResult {
    match base {
        JsValue::Undefined | JsValue::Null => Err(JErrorType::TypeError(format!(
            "Cannot read properties of {} (reading '{}')",
            base.to_js_string(),
            key
        ))),
        JsValue::Object(o) => ctx.chain().read_property(o, key),
        JsValue::String(s) => {
            if key == "length" {
                return Ok(JsValue::Number(s.chars().count() as f64));
            }
            if let Some(index) = array_index(key) {
                return Ok(s
                    .chars()
                    .nth(index)
                    .map(|c| JsValue::String(c.to_string()))
                    .unwrap_or(JsValue::Undefined));
            }
            ctx.chain().read_property(&ctx.realm().object_prototype(), key)
        }
        _ => ctx.chain().read_property(&ctx.realm().object_prototype(), key),
    }
}

fn set_property(base: &JsValue, key: &str, value: JsValue) -> Result<(), JErrorType> {
    match base {
        JsValue::Object(o) => {
            write_property(o, key, value);
            Ok(())
        }
        JsValue::Undefined | JsValue::Null => Err(JErrorType::TypeError(format!(
            "Cannot set properties of {} (setting '{}')",
            base.to_js_string(),
            key
        ))),
        // Writes to primitives are dropped.
        _ => Ok(()),
    }
}

fn evaluate_call_expression(
    callee: &ExpressionType,
    arguments: &[ExpressionType],
    ctx: &mut EvalContext,
) -> ValueResult {
    let (function, site) = match callee {
        ExpressionType::MemberExpression(member) => {
            let (object, key) = evaluate_member_parts(member, ctx)?;
            let function = get_property(ctx, &object, &key)?;
            (function, CallSite::Receiver(object))
        }
        _ => (evaluate_expression(callee, ctx)?, CallSite::Bare),
    };
    let args = evaluate_arguments(arguments, ctx)?;
    match function {
        JsValue::Object(o) if o.borrow().is_callable() => invoke(ctx, &o, site, args),
        _ => Err(JErrorType::TypeError(format!(
            "{} is not a function",
            callee.describe()
        ))),
    }
}

fn evaluate_new_expression(
    callee: &ExpressionType,
    arguments: &[ExpressionType],
    ctx: &mut EvalContext,
) -> ValueResult {
    let constructor = evaluate_expression(callee, ctx)?;
    let args = evaluate_arguments(arguments, ctx)?;
    let constructible = match &constructor {
        JsValue::Object(o) => o
            .borrow()
            .as_function()
            .map_or(false, |f| f.is_constructor()),
        _ => false,
    };
    match constructor {
        JsValue::Object(o) if constructible => construct(ctx, &o, args),
        _ => Err(JErrorType::NotConstructible(callee.describe())),
    }
}

fn evaluate_unary_expression(
    operator: &UnaryOperator,
    argument: &ExpressionType,
    ctx: &mut EvalContext,
) -> ValueResult {
    match operator {
        UnaryOperator::TypeOf => {
            // typeof tolerates undeclared names
            if let ExpressionType::Identifier(name) = argument {
                if !ctx.has_binding(name) {
                    return Ok(JsValue::from(TYPE_STR_UNDEFINED));
                }
            }
            let value = evaluate_expression(argument, ctx)?;
            Ok(JsValue::from(value.type_of()))
        }
        UnaryOperator::Not => {
            let value = evaluate_expression(argument, ctx)?;
            Ok(JsValue::Boolean(!value.to_boolean()))
        }
        UnaryOperator::Minus => {
            let value = evaluate_expression(argument, ctx)?;
            Ok(JsValue::Number(-value.to_number()))
        }
    }
}

fn evaluate_binary_expression(
    operator: &BinaryOperator,
    left: &ExpressionType,
    right: &ExpressionType,
    ctx: &mut EvalContext,
) -> ValueResult {
    let left_val = evaluate_expression(left, ctx)?;
    let right_val = evaluate_expression(right, ctx)?;

    match operator {
        // Arithmetic
        BinaryOperator::Add => Ok(add_values(&left_val, &right_val)),
        BinaryOperator::Subtract => Ok(JsValue::Number(left_val.to_number() - right_val.to_number())),
        BinaryOperator::Multiply => Ok(JsValue::Number(left_val.to_number() * right_val.to_number())),
        BinaryOperator::Divide => Ok(JsValue::Number(left_val.to_number() / right_val.to_number())),
        BinaryOperator::Modulo => Ok(JsValue::Number(left_val.to_number() % right_val.to_number())),

        // Comparison
        BinaryOperator::LessThan => Ok(compare_values(&left_val, &right_val, |a, b| a < b, |a, b| a < b)),
        BinaryOperator::GreaterThan => Ok(compare_values(&left_val, &right_val, |a, b| a > b, |a, b| a > b)),
        BinaryOperator::LessThanEqual => Ok(compare_values(&left_val, &right_val, |a, b| a <= b, |a, b| a <= b)),
        BinaryOperator::GreaterThanEqual => Ok(compare_values(&left_val, &right_val, |a, b| a >= b, |a, b| a >= b)),

        // Equality
        BinaryOperator::StrictlyEqual => Ok(JsValue::Boolean(left_val == right_val)),
        BinaryOperator::StrictlyUnequal => Ok(JsValue::Boolean(left_val != right_val)),
        BinaryOperator::LooselyEqual => Ok(JsValue::Boolean(loose_equality(&left_val, &right_val))),
        BinaryOperator::LooselyUnequal => Ok(JsValue::Boolean(!loose_equality(&left_val, &right_val))),

        BinaryOperator::InstanceOf => instance_of(ctx, &left_val, &right_val),
    }
}

fn evaluate_logical_expression(
    operator: &LogicalOperator,
    left: &ExpressionType,
    right: &ExpressionType,
    ctx: &mut EvalContext,
) -> ValueResult {
    let left_val = evaluate_expression(left, ctx)?;

    match operator {
        LogicalOperator::And => {
            if !left_val.to_boolean() {
                Ok(left_val)
            } else {
                evaluate_expression(right, ctx)
            }
        }
        LogicalOperator::Or => {
            if left_val.to_boolean() {
                Ok(left_val)
            } else {
                evaluate_expression(right, ctx)
            }
        }
    }
}

fn evaluate_assignment_expression(
    operator: &AssignmentOperator,
    left: &ExpressionType,
    right: &ExpressionType,
    ctx: &mut EvalContext,
) -> ValueResult {
    match left {
        ExpressionType::Identifier(name) => {
            let value = match operator {
                AssignmentOperator::Equals => evaluate_expression(right, ctx)?,
                _ => {
                    let current = ctx.get_binding(name)?;
                    let rhs = evaluate_expression(right, ctx)?;
                    combine(operator, &current, &rhs)
                }
            };
            ctx.set_binding(name, value.clone())?;
            Ok(value)
        }
        ExpressionType::MemberExpression(member) => {
            let (object, key) = evaluate_member_parts(member, ctx)?;
            let value = match operator {
                AssignmentOperator::Equals => evaluate_expression(right, ctx)?,
                _ => {
                    let current = get_property(ctx, &object, &key)?;
                    let rhs = evaluate_expression(right, ctx)?;
                    combine(operator, &current, &rhs)
                }
            };
            set_property(&object, &key, value.clone())?;
            Ok(value)
        }
        _ => Err(JErrorType::SyntaxError(
            "Invalid left-hand side in assignment".to_string(),
        )),
    }
}

fn combine(operator: &AssignmentOperator, current: &JsValue, rhs: &JsValue) -> JsValue {
    match operator {
        AssignmentOperator::Equals => rhs.clone(),
        AssignmentOperator::AddEquals => add_values(current, rhs),
        AssignmentOperator::SubtractEquals => JsValue::Number(current.to_number() - rhs.to_number()),
    }
}

// ============================================================================
// Operator helpers
// ============================================================================

/// `+`: string concatenation when either side is a string or an object.
pub fn add_values(left: &JsValue, right: &JsValue) -> JsValue {
    match (left, right) {
        (JsValue::String(_), _)
        | (_, JsValue::String(_))
        | (JsValue::Object(_), _)
        | (_, JsValue::Object(_)) => {
            JsValue::String(format!("{}{}", left.to_js_string(), right.to_js_string()))
        }
        _ => JsValue::Number(left.to_number() + right.to_number()),
    }
}

fn compare_values<N, S>(left: &JsValue, right: &JsValue, numeric: N, textual: S) -> JsValue
where
    N: Fn(f64, f64) -> bool,
    S: Fn(&str, &str) -> bool,
{
    match (left, right) {
        (JsValue::String(a), JsValue::String(b)) => JsValue::Boolean(textual(a, b)),
        _ => {
            let (a, b) = (left.to_number(), right.to_number());
            JsValue::Boolean(!a.is_nan() && !b.is_nan() && numeric(a, b))
        }
    }
}

/// `==`
pub fn loose_equality(left: &JsValue, right: &JsValue) -> bool {
    match (left, right) {
        (JsValue::Undefined, JsValue::Null) | (JsValue::Null, JsValue::Undefined) => true,
        (JsValue::Undefined, _) | (JsValue::Null, _) | (_, JsValue::Undefined) | (_, JsValue::Null) => {
            left == right
        }
        (JsValue::Object(_), JsValue::Object(_)) => left == right,
        (JsValue::Object(_), JsValue::String(s)) | (JsValue::String(s), JsValue::Object(_)) => {
            let object = if let JsValue::Object(_) = left { left } else { right };
            object.to_js_string() == *s
        }
        (JsValue::String(a), JsValue::String(b)) => a == b,
        _ => left.to_number() == right.to_number(),
    }
}

fn instance_of(ctx: &EvalContext, value: &JsValue, constructor: &JsValue) -> ValueResult {
    let constructor = match constructor {
        JsValue::Object(o) if o.borrow().is_callable() => o.clone(),
        _ => {
            return Err(JErrorType::TypeError(
                "Right-hand side of 'instanceof' is not callable".to_string(),
            ))
        }
    };
    let object = match value {
        JsValue::Object(o) => o,
        _ => return Ok(JsValue::Boolean(false)),
    };
    let source = bound_target(&constructor).unwrap_or(constructor);
    match ctx.chain().read_property(&source, "prototype")? {
        JsValue::Object(prototype) => Ok(JsValue::Boolean(
            ctx.chain().inherits_from(object, &prototype)?,
        )),
        other => Err(JErrorType::TypeError(format!(
            "Function has non-object prototype '{}' in instanceof check",
            other.to_js_string()
        ))),
    }
}

fn bound_target(function: &JsObjectType) -> Option<JsObjectType> {
    match function.borrow().as_function().map(|f| &f.body) {
        Some(FunctionBody::Bound { target, .. }) => Some(target.clone()),
        _ => None,
    }
}
