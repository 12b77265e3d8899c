//! Property lookup through delegate links.
//!
//! Reads walk `object -> delegate -> delegate ...` until a match or the end of the
//! chain, which yields `undefined`. Writes always land on the object itself. The walk
//! is bounded by `max_depth`, and `declare_delegation` refuses links that would close
//! a loop.

use tracing::{debug, trace, warn};

use crate::runner::config::DEFAULT_MAX_CHAIN_DEPTH;
use crate::runner::ds::error::JErrorType;
use crate::runner::ds::object::{same_object, JsObjectType};
use crate::runner::ds::value::JsValue;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrototypeChain {
    max_depth: usize,
}

impl PrototypeChain {
    pub fn new(max_depth: usize) -> Self {
        PrototypeChain { max_depth }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn read_property(&self, object: &JsObjectType, name: &str) -> Result<JsValue, JErrorType> {
        Ok(self
            .find_property(object, name)?
            .unwrap_or(JsValue::Undefined))
    }

    /// Like `read_property`, but a property missing from the whole chain is `None`
    /// rather than `undefined`.
    pub fn find_property(
        &self,
        object: &JsObjectType,
        name: &str,
    ) -> Result<Option<JsValue>, JErrorType> {
        let mut current = object.clone();
        let mut depth = 0;
        loop {
            let delegate = {
                let o = current.borrow();
                if let Some(value) = o.get_own_property(name) {
                    trace!(property = name, depth, "resolved on chain");
                    return Ok(Some(value));
                }
                o.delegate()
            };
            match delegate {
                None => return Ok(None),
                Some(d) => {
                    depth += 1;
                    if depth > self.max_depth {
                        warn!(property = name, max_depth = self.max_depth, "chain walk exceeded bound");
                        return Err(JErrorType::DelegateCycle(format!(
                            "lookup of '{}' exceeded {} delegate links",
                            name, self.max_depth
                        )));
                    }
                    current = d;
                }
            }
        }
    }

    /// Links `child` to `parent` (or clears the link). Fails without touching `child`
    /// when `child` is reachable from `parent`.
    pub fn declare_delegation(
        &self,
        child: &JsObjectType,
        parent: Option<&JsObjectType>,
    ) -> Result<(), JErrorType> {
        if let Some(parent) = parent {
            let mut current = Some(parent.clone());
            let mut depth = 0;
            while let Some(p) = current {
                if same_object(&p, child) {
                    warn!(child = %child.borrow().id(), parent = %parent.borrow().id(), "rejected cyclic delegation");
                    return Err(JErrorType::DelegateCycle(
                        "delegate chain would reference itself".to_string(),
                    ));
                }
                depth += 1;
                if depth > self.max_depth {
                    return Err(JErrorType::DelegateCycle(format!(
                        "delegate chain longer than {} links",
                        self.max_depth
                    )));
                }
                current = p.borrow().delegate();
            }
            debug!(child = %child.borrow().id(), parent = %parent.borrow().id(), "declared delegation");
        }
        child.borrow_mut().set_delegate(parent.cloned());
        Ok(())
    }

    /// Whether `prototype` appears anywhere on `object`'s delegate chain.
    pub fn inherits_from(
        &self,
        object: &JsObjectType,
        prototype: &JsObjectType,
    ) -> Result<bool, JErrorType> {
        let mut current = object.borrow().delegate();
        let mut depth = 0;
        while let Some(p) = current {
            if same_object(&p, prototype) {
                return Ok(true);
            }
            depth += 1;
            if depth > self.max_depth {
                return Err(JErrorType::DelegateCycle(format!(
                    "delegate chain longer than {} links",
                    self.max_depth
                )));
            }
            current = p.borrow().delegate();
        }
        Ok(false)
    }
}

impl Default for PrototypeChain {
    fn default() -> Self {
        PrototypeChain::new(DEFAULT_MAX_CHAIN_DEPTH)
    }
}

/// Writes onto `object` itself, shadowing whatever its delegates define.
pub fn write_property(object: &JsObjectType, name: &str, value: JsValue) {
    object.borrow_mut().set_own_property(name, value);
}

pub fn has_own_property(object: &JsObjectType, name: &str) -> bool {
    object.borrow().has_own_property(name)
}

pub fn own_keys(object: &JsObjectType) -> Vec<String> {
    object.borrow().own_property_keys()
}
