//! Context resolution for callable invocations.
//!
//! Precedence, highest first:
//!
//! 1. explicit override (`call`, `apply`, bound callables)
//! 2. construction (`new`)
//! 3. receiver (`obj.method()`)
//! 4. global fallback (bare call)
//!
//! Lexical callables skip all four and always see the context captured when they
//! were created.

use tracing::{debug, trace};

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::execution_context::InvocationRecord;
use crate::runner::ds::function_object::{FunctionBody, FunctionObject};
use crate::runner::ds::object::{new_object, JsObjectType, ObjectKind};
use crate::runner::ds::realm::CodeRealm;
use crate::runner::ds::value::JsValue;
use crate::runner::eval::function::call_function;
use crate::runner::eval::types::{EvalContext, ValueResult};

/// How a call expression reached its callee.
#[derive(Clone)]
pub enum CallSite {
    /// `f()`
    Bare,
    /// `receiver.f()`
    Receiver(JsValue),
    /// `f.call(x)`, `f.apply(x)`; `None` means no context was supplied.
    Explicit(Option<JsValue>),
    /// `new f()`, with the freshly allocated instance.
    Construct(JsObjectType),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BindingRule {
    Lexical,
    Explicit,
    Construction,
    Receiver,
    GlobalFallback,
}

pub struct ContextBinding {
    pub context: JsValue,
    pub rule: BindingRule,
}

pub fn resolve_context(
    realm: &CodeRealm,
    callable: &FunctionObject,
    site: &CallSite,
) -> ContextBinding {
    if let Some(captured) = &callable.captured_context {
        return ContextBinding {
            context: captured.clone(),
            rule: BindingRule::Lexical,
        };
    }
    match site {
        CallSite::Explicit(Some(this)) if !this.is_nullish() => ContextBinding {
            context: this.clone(),
            rule: BindingRule::Explicit,
        },
        CallSite::Explicit(_) => ContextBinding {
            context: realm.global_this(),
            rule: BindingRule::Explicit,
        },
        CallSite::Construct(instance) => ContextBinding {
            context: JsValue::Object(instance.clone()),
            rule: BindingRule::Construction,
        },
        CallSite::Receiver(receiver) => ContextBinding {
            context: receiver.clone(),
            rule: BindingRule::Receiver,
        },
        CallSite::Bare => ContextBinding {
            context: realm.global_this(),
            rule: BindingRule::GlobalFallback,
        },
    }
}

fn display_name(name: &str) -> String {
    if name.is_empty() {
        "anonymous".to_string()
    } else {
        name.to_string()
    }
}

pub fn invoke(
    ctx: &mut EvalContext,
    callee: &JsObjectType,
    site: CallSite,
    args: Vec<JsValue>,
) -> ValueResult {
    let (name, body, is_lexical, binding) = {
        let o = callee.borrow();
        let f = o.as_function().ok_or_else(|| {
            JErrorType::TypeError("object is not a function".to_string())
        })?;
        (
            f.name.clone(),
            f.body.clone(),
            f.is_lexical,
            resolve_context(ctx.realm(), f, &site),
        )
    };
    trace!(callee = %display_name(&name), rule = ?binding.rule, "resolved context");

    let is_construct = matches!(site, CallSite::Construct(_));
    let record = InvocationRecord::new(callee.clone(), binding.context, args, is_lexical, is_construct);
    ctx.push_invocation(record.clone())?;
    let result = run_body(ctx, &body, &record);
    ctx.pop_invocation();
    result
}

fn run_body(ctx: &mut EvalContext, body: &FunctionBody, record: &InvocationRecord) -> ValueResult {
    match body {
        FunctionBody::Native(f) => f(ctx, record),
        FunctionBody::Closure(c) => c(ctx, record),
        FunctionBody::Script { code, environment } => call_function(ctx, code, environment, record),
        FunctionBody::Bound {
            target,
            bound_this,
            bound_arguments,
        } => {
            let mut args = bound_arguments.clone();
            args.extend(record.all_arguments().iter().cloned());
            let site = match (&record.context, record.is_construct) {
                (JsValue::Object(instance), true) => CallSite::Construct(instance.clone()),
                _ => CallSite::Explicit(Some(bound_this.clone())),
            };
            invoke(ctx, target, site, args)
        }
    }
}

/// Rule 2: allocate, link to the constructor's current `prototype`, run the body with
/// the new instance as context. An object returned by the body replaces the instance.
pub fn construct(ctx: &mut EvalContext, constructor: &JsObjectType, args: Vec<JsValue>) -> ValueResult {
    let (name, constructible, bound_target) = {
        let o = constructor.borrow();
        match o.as_function() {
            None => {
                return Err(JErrorType::NotConstructible("object".to_string()));
            }
            Some(f) => (
                f.name.clone(),
                f.is_constructor(),
                match &f.body {
                    FunctionBody::Bound { target, .. } => Some(target.clone()),
                    _ => None,
                },
            ),
        }
    };
    if !constructible {
        return Err(JErrorType::NotConstructible(display_name(&name)));
    }

    let prototype_source = bound_target.unwrap_or_else(|| constructor.clone());
    let prototype = ctx.chain().read_property(&prototype_source, "prototype")?;
    let delegate = match prototype {
        JsValue::Object(p) => p,
        _ => ctx.realm().object_prototype(),
    };
    let instance = new_object(ObjectKind::Ordinary, Some(delegate));
    debug!(constructor = %display_name(&name), instance = %instance.borrow().id(), "constructing");

    let result = invoke(ctx, constructor, CallSite::Construct(instance.clone()), args)?;
    Ok(match result {
        JsValue::Object(o) => JsValue::Object(o),
        _ => JsValue::Object(instance),
    })
}

/// Rule 1 with an argument list.
pub fn call_with_context(
    ctx: &mut EvalContext,
    callee: &JsObjectType,
    this: JsValue,
    args: Vec<JsValue>,
) -> ValueResult {
    invoke(ctx, callee, CallSite::Explicit(Some(this)), args)
}

/// Rule 1 with an array of arguments. `undefined`/`null` stand for no arguments.
pub fn apply_with_context(
    ctx: &mut EvalContext,
    callee: &JsObjectType,
    this: JsValue,
    arg_list: &JsValue,
) -> ValueResult {
    let args = match arg_list {
        JsValue::Undefined | JsValue::Null => vec![],
        JsValue::Object(o) => match o.borrow().kind() {
            ObjectKind::Array(elements) => elements.clone(),
            _ => {
                return Err(JErrorType::TypeError(
                    "argument list must be an array".to_string(),
                ))
            }
        },
        _ => {
            return Err(JErrorType::TypeError(
                "CreateListFromArrayLike called on non-object".to_string(),
            ))
        }
    };
    invoke(ctx, callee, CallSite::Explicit(Some(this)), args)
}

/// Hard binding: a new callable whose context is always `this`, with `args` prepended
/// to every call.
pub fn bind(
    ctx: &mut EvalContext,
    target: &JsObjectType,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsObjectType, JErrorType> {
    let (name, constructor_kind) = {
        let o = target.borrow();
        let f = o.as_function().ok_or_else(|| {
            JErrorType::TypeError("Bind must be called on a function".to_string())
        })?;
        (f.name.clone(), f.constructor_kind)
    };
    let bound = FunctionObject::new_bound_function(&name, target.clone(), this, args, constructor_kind);
    Ok(ctx.realm().create_function(bound))
}
