//! Variable scopes for script evaluation.
//!
//! The global scope is backed by the global sentinel object, so top-level `var` and
//! function declarations show up as its properties. Function scopes carry the
//! resolved context; block scopes only hold `let`/`const` bindings.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::object::JsObjectType;
use crate::runner::ds::value::JsValue;
use crate::runner::prototype_chain::PrototypeChain;

pub type JsScopeType = Rc<RefCell<Scope>>;

/// The object behind the global scope. Names resolve through its delegates too.
struct ObjectBinding {
    object: JsObjectType,
    chain: PrototypeChain,
}

pub struct Scope {
    bindings: HashMap<String, JsValue>,
    constants: HashSet<String>,
    binding_object: Option<ObjectBinding>,
    this_value: Option<JsValue>,
    parent: Option<JsScopeType>,
}
impl Scope {
    fn new(
        parent: Option<JsScopeType>,
        binding_object: Option<ObjectBinding>,
        this_value: Option<JsValue>,
    ) -> JsScopeType {
        Rc::new(RefCell::new(Scope {
            bindings: HashMap::new(),
            constants: HashSet::new(),
            binding_object,
            this_value,
            parent,
        }))
    }

    fn is_function_scope(&self) -> bool {
        self.this_value.is_some()
    }
}

pub fn new_global_scope(global: JsObjectType, chain: PrototypeChain) -> JsScopeType {
    let this_value = JsValue::Object(global.clone());
    let binding = ObjectBinding {
        object: global,
        chain,
    };
    Scope::new(None, Some(binding), Some(this_value))
}

pub fn new_function_scope(parent: JsScopeType, this_value: JsValue) -> JsScopeType {
    Scope::new(Some(parent), None, Some(this_value))
}

pub fn new_block_scope(parent: JsScopeType) -> JsScopeType {
    Scope::new(Some(parent), None, None)
}

/// Resolves `name` through the scope chain. `Ok(None)` means it is not declared
/// anywhere; errors only come from walking the global object's delegates.
pub fn lookup_binding(scope: &JsScopeType, name: &str) -> Result<Option<JsValue>, JErrorType> {
    let mut current = Some(scope.clone());
    while let Some(s) = current {
        let b = s.borrow();
        if let Some(v) = b.bindings.get(name) {
            return Ok(Some(v.clone()));
        }
        if let Some(binding) = &b.binding_object {
            if let Some(v) = binding.chain.find_property(&binding.object, name)? {
                return Ok(Some(v));
            }
        }
        current = b.parent.clone();
    }
    Ok(None)
}

/// Assigns to an existing binding. Returns `Ok(false)` when no scope declares `name`.
pub fn assign_binding(scope: &JsScopeType, name: &str, value: JsValue) -> Result<bool, JErrorType> {
    let mut current = Some(scope.clone());
    while let Some(s) = current {
        let mut b = s.borrow_mut();
        if b.bindings.contains_key(name) {
            if b.constants.contains(name) {
                return Err(JErrorType::TypeError(
                    "Assignment to constant variable".to_string(),
                ));
            }
            b.bindings.insert(name.to_string(), value);
            return Ok(true);
        }
        if let Some(binding) = &b.binding_object {
            if binding.object.borrow().has_own_property(name) {
                binding.object.borrow_mut().set_own_property(name, value);
                return Ok(true);
            }
        }
        current = b.parent.clone();
    }
    Ok(false)
}

/// Declares a `var`-style binding in the nearest function scope. `None` leaves an
/// existing binding untouched.
pub fn declare_var(scope: &JsScopeType, name: &str, value: Option<JsValue>) {
    let mut current = scope.clone();
    loop {
        let parent = {
            let b = current.borrow();
            if b.is_function_scope() {
                None
            } else {
                b.parent.clone()
            }
        };
        match parent {
            Some(p) => current = p,
            None => break,
        }
    }

    let mut b = current.borrow_mut();
    let binding_object = b.binding_object.as_ref().map(|binding| binding.object.clone());
    if let Some(o) = binding_object {
        let exists = o.borrow().has_own_property(name);
        match value {
            Some(v) => o.borrow_mut().set_own_property(name, v),
            None if !exists => o.borrow_mut().set_own_property(name, JsValue::Undefined),
            None => {}
        }
    } else {
        match value {
            Some(v) => {
                b.bindings.insert(name.to_string(), v);
            }
            None => {
                b.bindings
                    .entry(name.to_string())
                    .or_insert(JsValue::Undefined);
            }
        }
    }
}

pub fn declare_lexical(
    scope: &JsScopeType,
    name: &str,
    value: JsValue,
    is_const: bool,
) -> Result<(), JErrorType> {
    let mut b = scope.borrow_mut();
    if b.bindings.contains_key(name) {
        return Err(JErrorType::SyntaxError(format!(
            "Identifier '{}' has already been declared",
            name
        )));
    }
    b.bindings.insert(name.to_string(), value);
    if is_const {
        b.constants.insert(name.to_string());
    }
    Ok(())
}

/// The context of the nearest function (or global) scope.
pub fn resolve_this(scope: &JsScopeType) -> JsValue {
    let mut current = Some(scope.clone());
    while let Some(s) = current {
        let b = s.borrow();
        if let Some(this_value) = &b.this_value {
            return this_value.clone();
        }
        current = b.parent.clone();
    }
    JsValue::Undefined
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::ds::object::{new_object, ObjectKind};

    #[test]
    fn test_global_names_resolve_through_delegates() {
        let shared = new_object(ObjectKind::Ordinary, None);
        shared
            .borrow_mut()
            .set_own_property("inherited", JsValue::from(1.0));
        let global = new_object(ObjectKind::Global, Some(shared.clone()));
        let scope = new_block_scope(new_global_scope(global.clone(), PrototypeChain::default()));

        assert_eq!(lookup_binding(&scope, "inherited").unwrap(), Some(JsValue::from(1.0)));
        assert_eq!(lookup_binding(&scope, "missing").unwrap(), None);

        // Assignment never reaches through to the delegate.
        assert!(!assign_binding(&scope, "inherited", JsValue::from(2.0)).unwrap());
        assert_eq!(
            shared.borrow().get_own_property("inherited"),
            Some(JsValue::from(1.0))
        );
    }

    #[test]
    fn test_const_and_block_scoping() {
        let global = new_object(ObjectKind::Global, None);
        let outer = new_global_scope(global.clone(), PrototypeChain::default());
        let block = new_block_scope(outer.clone());
        declare_lexical(&block, "k", JsValue::from(1.0), true).unwrap();
        declare_var(&block, "v", Some(JsValue::from(2.0)));

        assert!(matches!(
            assign_binding(&block, "k", JsValue::from(3.0)),
            Err(JErrorType::TypeError(_))
        ));
        assert_eq!(lookup_binding(&outer, "k").unwrap(), None);
        assert_eq!(global.borrow().get_own_property("v"), Some(JsValue::from(2.0)));
    }
}
