use crate::runner::config::RealmConfig;
use crate::runner::ds::function_object::FunctionObject;
use crate::runner::ds::object::{new_object, JsObjectType, ObjectKind};
use crate::runner::ds::value::JsValue;
use crate::runner::prototype_chain::PrototypeChain;
use crate::runner::std_lib;

/// The global sentinel plus the intrinsic prototypes every other object hangs off.
pub struct CodeRealm {
    global: JsObjectType,
    object_prototype: JsObjectType,
    function_prototype: JsObjectType,
    array_prototype: JsObjectType,
    chain: PrototypeChain,
    config: RealmConfig,
}

impl CodeRealm {
    pub fn new(config: RealmConfig) -> Self {
        let object_prototype = new_object(ObjectKind::Ordinary, None);
        let function_prototype = new_object(ObjectKind::Ordinary, Some(object_prototype.clone()));
        let array_prototype = new_object(ObjectKind::Ordinary, Some(object_prototype.clone()));
        let global = new_object(ObjectKind::Global, Some(object_prototype.clone()));
        let realm = CodeRealm {
            global,
            object_prototype,
            function_prototype,
            array_prototype,
            chain: PrototypeChain::new(config.max_chain_depth),
            config,
        };
        std_lib::install_intrinsics(&realm);
        realm
    }

    pub fn global_object(&self) -> JsObjectType {
        self.global.clone()
    }

    /// The context used by the global fallback rule.
    pub fn global_this(&self) -> JsValue {
        JsValue::Object(self.global.clone())
    }

    pub fn object_prototype(&self) -> JsObjectType {
        self.object_prototype.clone()
    }

    pub fn function_prototype(&self) -> JsObjectType {
        self.function_prototype.clone()
    }

    pub fn array_prototype(&self) -> JsObjectType {
        self.array_prototype.clone()
    }

    pub fn chain(&self) -> PrototypeChain {
        self.chain
    }

    pub fn config(&self) -> &RealmConfig {
        &self.config
    }

    /// An empty literal object delegating to `Object.prototype`.
    pub fn create_object(&self) -> JsObjectType {
        new_object(ObjectKind::Ordinary, Some(self.object_prototype.clone()))
    }

    pub fn create_array(&self, elements: Vec<JsValue>) -> JsObjectType {
        new_object(ObjectKind::Array(elements), Some(self.array_prototype.clone()))
    }

    /// Wraps a callable in an object with a hidden `name`. Constructible callables get a
    /// fresh prototype object whose hidden `constructor` points back at the function.
    pub fn create_function(&self, function: FunctionObject) -> JsObjectType {
        let is_constructor = function.is_constructor() && !function.is_bound();
        let name = JsValue::String(function.name.clone());
        let f = new_object(
            ObjectKind::Function(function),
            Some(self.function_prototype.clone()),
        );
        f.borrow_mut().set_hidden_property("name", name);
        if is_constructor {
            let prototype = self.create_object();
            prototype
                .borrow_mut()
                .set_hidden_property("constructor", JsValue::Object(f.clone()));
            f.borrow_mut()
                .set_hidden_property("prototype", JsValue::Object(prototype));
        }
        f
    }
}
