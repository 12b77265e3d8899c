//! Object constructor and Object.prototype methods.

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::execution_context::InvocationRecord;
use crate::runner::ds::function_object::{FunctionObject, NativeFn};
use crate::runner::ds::object::{new_object, JsObjectType, ObjectKind};
use crate::runner::ds::realm::CodeRealm;
use crate::runner::ds::value::JsValue;
use crate::runner::eval::types::{EvalContext, ValueResult};
use crate::runner::prototype_chain::{has_own_property, own_keys};

use super::install_methods;

lazy_static! {
    static ref OBJECT_STATIC_METHODS: Vec<(&'static str, NativeFn)> = vec![
        ("create", object_create as NativeFn),
        ("getPrototypeOf", object_get_prototype_of as NativeFn),
        ("setPrototypeOf", object_set_prototype_of as NativeFn),
        ("keys", object_keys as NativeFn),
    ];
    static ref OBJECT_PROTOTYPE_METHODS: Vec<(&'static str, NativeFn)> = vec![
        ("hasOwnProperty", object_has_own_property as NativeFn),
        ("toString", object_to_string as NativeFn),
    ];
}

/// Builds `Object`, wires it to the realm's `Object.prototype` and fills both with
/// their methods.
pub fn create_object_constructor(realm: &CodeRealm) -> JsObjectType {
    let constructor = realm.create_function(
        FunctionObject::new_native_function("Object", object_constructor).as_constructor(),
    );
    let prototype = realm.object_prototype();
    constructor
        .borrow_mut()
        .set_hidden_property("prototype", JsValue::Object(prototype.clone()));
    prototype
        .borrow_mut()
        .set_hidden_property("constructor", JsValue::Object(constructor.clone()));
    install_methods(realm, &constructor, &OBJECT_STATIC_METHODS);
    install_methods(realm, &prototype, &OBJECT_PROTOTYPE_METHODS);
    constructor
}

fn object_constructor(ctx: &mut EvalContext, record: &InvocationRecord) -> ValueResult {
    match record.argument(0) {
        JsValue::Object(o) => Ok(JsValue::Object(o)),
        _ if record.is_construct => Ok(record.context.clone()),
        _ => Ok(JsValue::Object(ctx.realm().create_object())),
    }
}

fn prototype_argument(value: JsValue) -> Result<Option<JsObjectType>, JErrorType> {
    match value {
        JsValue::Object(o) => Ok(Some(o)),
        JsValue::Null => Ok(None),
        other => Err(JErrorType::TypeError(format!(
            "Object prototype may only be an Object or null: {}",
            other.to_js_string()
        ))),
    }
}

fn require_object_coercible(value: &JsValue) -> Result<(), JErrorType> {
    if value.is_nullish() {
        Err(JErrorType::TypeError(
            "Cannot convert undefined or null to object".to_string(),
        ))
    } else {
        Ok(())
    }
}

/// Object.create(proto)
fn object_create(_ctx: &mut EvalContext, record: &InvocationRecord) -> ValueResult {
    let delegate = prototype_argument(record.argument(0))?;
    Ok(JsValue::Object(new_object(ObjectKind::Ordinary, delegate)))
}

/// Object.getPrototypeOf(o)
fn object_get_prototype_of(ctx: &mut EvalContext, record: &InvocationRecord) -> ValueResult {
    let target = record.argument(0);
    require_object_coercible(&target)?;
    Ok(match target {
        JsValue::Object(o) => match o.borrow().delegate() {
            Some(d) => JsValue::Object(d),
            None => JsValue::Null,
        },
        _ => JsValue::Object(ctx.realm().object_prototype()),
    })
}

/// Object.setPrototypeOf(o, proto). Cycles are rejected and leave `o` unchanged.
fn object_set_prototype_of(ctx: &mut EvalContext, record: &InvocationRecord) -> ValueResult {
    let target = record.argument(0);
    require_object_coercible(&target)?;
    let delegate = prototype_argument(record.argument(1))?;
    if let JsValue::Object(o) = &target {
        ctx.chain().declare_delegation(o, delegate.as_ref())?;
    }
    Ok(target)
}

/// Object.keys(o)
fn object_keys(ctx: &mut EvalContext, record: &InvocationRecord) -> ValueResult {
    let target = record.argument(0);
    require_object_coercible(&target)?;
    let keys = match &target {
        JsValue::Object(o) => own_keys(o).into_iter().map(JsValue::String).collect(),
        _ => vec![],
    };
    Ok(JsValue::Object(ctx.realm().create_array(keys)))
}

/// Object.prototype.hasOwnProperty(name)
fn object_has_own_property(_ctx: &mut EvalContext, record: &InvocationRecord) -> ValueResult {
    let name = record.argument(0).to_js_string();
    Ok(JsValue::Boolean(match &record.context {
        JsValue::Object(o) => has_own_property(o, &name),
        _ => false,
    }))
}

/// Object.prototype.toString()
fn object_to_string(_ctx: &mut EvalContext, record: &InvocationRecord) -> ValueResult {
    let tag = match &record.context {
        JsValue::Undefined => "Undefined",
        JsValue::Null => "Null",
        JsValue::Boolean(_) => "Boolean",
        JsValue::Number(_) => "Number",
        JsValue::String(_) => "String",
        JsValue::Object(o) => match o.borrow().kind() {
            ObjectKind::Function(_) => "Function",
            ObjectKind::Array(_) => "Array",
            ObjectKind::Global => "global",
            ObjectKind::Ordinary => "Object",
        },
    };
    Ok(JsValue::String(format!("[object {}]", tag)))
}
