//! Function.prototype methods: the explicit override entry points.

use crate::runner::binder::{apply_with_context, bind, call_with_context};
use crate::runner::ds::error::JErrorType;
use crate::runner::ds::execution_context::InvocationRecord;
use crate::runner::ds::function_object::NativeFn;
use crate::runner::ds::object::JsObjectType;
use crate::runner::ds::realm::CodeRealm;
use crate::runner::ds::value::JsValue;
use crate::runner::eval::types::{EvalContext, ValueResult};

use super::install_methods;

lazy_static! {
    static ref FUNCTION_PROTOTYPE_METHODS: Vec<(&'static str, NativeFn)> = vec![
        ("call", function_call as NativeFn),
        ("apply", function_apply as NativeFn),
        ("bind", function_bind as NativeFn),
    ];
}

pub fn install_function_prototype(realm: &CodeRealm) {
    install_methods(realm, &realm.function_prototype(), &FUNCTION_PROTOTYPE_METHODS);
}

/// The function `call`/`apply`/`bind` was invoked on, i.e. the receiver.
fn target_function(record: &InvocationRecord, method: &str) -> Result<JsObjectType, JErrorType> {
    match &record.context {
        JsValue::Object(o) if o.borrow().is_callable() => Ok(o.clone()),
        _ => Err(JErrorType::TypeError(format!(
            "Function.prototype.{} called on non-function",
            method
        ))),
    }
}

fn rest_arguments(record: &InvocationRecord, from: usize) -> Vec<JsValue> {
    record
        .arguments()
        .unwrap_or(&[])
        .iter()
        .skip(from)
        .cloned()
        .collect()
}

/// f.call(thisArg, ...args)
fn function_call(ctx: &mut EvalContext, record: &InvocationRecord) -> ValueResult {
    let target = target_function(record, "call")?;
    call_with_context(ctx, &target, record.argument(0), rest_arguments(record, 1))
}

/// f.apply(thisArg, argsArray)
fn function_apply(ctx: &mut EvalContext, record: &InvocationRecord) -> ValueResult {
    let target = target_function(record, "apply")?;
    apply_with_context(ctx, &target, record.argument(0), &record.argument(1))
}

/// f.bind(thisArg, ...args)
fn function_bind(ctx: &mut EvalContext, record: &InvocationRecord) -> ValueResult {
    let target = target_function(record, "bind")?;
    let bound = bind(ctx, &target, record.argument(0), rest_arguments(record, 1))?;
    Ok(JsValue::Object(bound))
}
