use std::rc::Rc;

use crate::parser::ast::FunctionData;
use crate::runner::ds::execution_context::InvocationRecord;
use crate::runner::ds::lex_env::JsScopeType;
use crate::runner::ds::object::JsObjectType;
use crate::runner::ds::value::JsValue;
use crate::runner::eval::types::{EvalContext, ValueResult};

/// Built-in body: a plain function pointer.
pub type NativeFn = fn(ctx: &mut EvalContext, record: &InvocationRecord) -> ValueResult;

/// Host-provided body that may capture state, e.g. a superclass constructor.
pub type NativeClosure = Rc<dyn Fn(&mut EvalContext, &InvocationRecord) -> ValueResult>;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ConstructorKind {
    Base,
    None,
}

#[derive(Clone)]
pub enum FunctionBody {
    Native(NativeFn),
    Closure(NativeClosure),
    Script {
        code: Rc<FunctionData>,
        environment: JsScopeType,
    },
    Bound {
        target: JsObjectType,
        bound_this: JsValue,
        bound_arguments: Vec<JsValue>,
    },
}

pub struct FunctionObject {
    pub name: String,
    pub body: FunctionBody,
    pub constructor_kind: ConstructorKind,
    pub is_lexical: bool,
    /// Context captured at creation. Only lexical callables carry one.
    pub captured_context: Option<JsValue>,
}
impl FunctionObject {
    pub fn new_script_function(
        name: String,
        code: Rc<FunctionData>,
        environment: JsScopeType,
    ) -> Self {
        FunctionObject {
            name,
            body: FunctionBody::Script { code, environment },
            constructor_kind: ConstructorKind::Base,
            is_lexical: false,
            captured_context: None,
        }
    }

    pub fn new_arrow_function(
        code: Rc<FunctionData>,
        environment: JsScopeType,
        captured_context: JsValue,
    ) -> Self {
        FunctionObject {
            name: String::new(),
            body: FunctionBody::Script { code, environment },
            constructor_kind: ConstructorKind::None,
            is_lexical: true,
            captured_context: Some(captured_context),
        }
    }

    pub fn new_native_function(name: &str, native: NativeFn) -> Self {
        FunctionObject {
            name: name.to_string(),
            body: FunctionBody::Native(native),
            constructor_kind: ConstructorKind::None,
            is_lexical: false,
            captured_context: None,
        }
    }

    pub fn new_closure<F>(name: &str, closure: F) -> Self
    where
        F: Fn(&mut EvalContext, &InvocationRecord) -> ValueResult + 'static,
    {
        FunctionObject {
            name: name.to_string(),
            body: FunctionBody::Closure(Rc::new(closure)),
            constructor_kind: ConstructorKind::None,
            is_lexical: false,
            captured_context: None,
        }
    }

    pub fn new_lexical_closure<F>(name: &str, captured_context: JsValue, closure: F) -> Self
    where
        F: Fn(&mut EvalContext, &InvocationRecord) -> ValueResult + 'static,
    {
        FunctionObject {
            name: name.to_string(),
            body: FunctionBody::Closure(Rc::new(closure)),
            constructor_kind: ConstructorKind::None,
            is_lexical: true,
            captured_context: Some(captured_context),
        }
    }

    pub fn new_bound_function(
        target_name: &str,
        target: JsObjectType,
        bound_this: JsValue,
        bound_arguments: Vec<JsValue>,
        constructor_kind: ConstructorKind,
    ) -> Self {
        FunctionObject {
            name: format!("bound {}", target_name),
            body: FunctionBody::Bound {
                target,
                bound_this,
                bound_arguments,
            },
            constructor_kind,
            is_lexical: false,
            captured_context: None,
        }
    }

    /// Marks a host function as usable with construction.
    pub fn as_constructor(mut self) -> Self {
        if !self.is_lexical {
            self.constructor_kind = ConstructorKind::Base;
        }
        self
    }

    pub fn is_constructor(&self) -> bool {
        self.constructor_kind == ConstructorKind::Base
    }

    pub fn is_bound(&self) -> bool {
        matches!(self.body, FunctionBody::Bound { .. })
    }
}
