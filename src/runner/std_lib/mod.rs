//! Intrinsic objects installed into every realm.
//!
//! Intrinsic properties are hidden, so they never show up in key listings or console
//! output of the objects that carry them.

pub mod console;
pub mod function;
pub mod object;

use tracing::debug;

use crate::runner::ds::function_object::{FunctionObject, NativeFn};
use crate::runner::ds::object::JsObjectType;
use crate::runner::ds::realm::CodeRealm;
use crate::runner::ds::value::JsValue;

/// Populates the realm's global sentinel and intrinsic prototypes.
pub fn install_intrinsics(realm: &CodeRealm) {
    let global = realm.global_object();

    function::install_function_prototype(realm);
    let object_constructor = object::create_object_constructor(realm);
    let console = console::create_console(realm);

    let mut g = global.borrow_mut();
    g.set_hidden_property("Object", JsValue::Object(object_constructor));
    g.set_hidden_property("console", JsValue::Object(console));
    g.set_hidden_property("undefined", JsValue::Undefined);
    g.set_hidden_property("globalThis", JsValue::Object(global.clone()));
    let global_name = &realm.config().global_name;
    if !global_name.is_empty() {
        g.set_hidden_property(global_name, JsValue::Object(global.clone()));
    }
    debug!(global_name = %global_name, "installed intrinsics");
}

/// Adds each `(name, body)` pair to `target` as a hidden native method.
pub(crate) fn install_methods(realm: &CodeRealm, target: &JsObjectType, methods: &[(&str, NativeFn)]) {
    for (name, body) in methods {
        let method = realm.create_function(FunctionObject::new_native_function(name, *body));
        target
            .borrow_mut()
            .set_hidden_property(name, JsValue::Object(method));
    }
}
