//! Core types for the evaluation engine.

use crate::runner::config::RealmConfig;
use crate::runner::ds::error::JErrorType;
use crate::runner::ds::execution_context::{ExecutionContextStack, InvocationRecord};
use crate::runner::ds::lex_env::{
    assign_binding, declare_lexical, declare_var, lookup_binding, new_global_scope,
    resolve_this, JsScopeType,
};
use crate::runner::ds::object::JsObjectType;
use crate::runner::ds::realm::CodeRealm;
use crate::runner::ds::value::JsValue;
use crate::runner::prototype_chain::PrototypeChain;

pub type ValueResult = Result<JsValue, JErrorType>;
pub type EvalResult = Result<Completion, JErrorType>;

/// Completion record type.
#[derive(Debug, Clone, PartialEq)]
pub enum CompletionType {
    /// Execution continues with the next statement.
    Normal,
    /// A `return` unwinds to the caller.
    Return,
}

/// Result of evaluating one statement.
pub struct Completion {
    pub completion_type: CompletionType,
    pub value: Option<JsValue>,
}

impl Completion {
    pub fn normal() -> Self {
        Completion {
            completion_type: CompletionType::Normal,
            value: None,
        }
    }

    pub fn normal_with_value(value: JsValue) -> Self {
        Completion {
            completion_type: CompletionType::Normal,
            value: Some(value),
        }
    }

    pub fn return_value(value: JsValue) -> Self {
        Completion {
            completion_type: CompletionType::Return,
            value: Some(value),
        }
    }

    pub fn is_abrupt(&self) -> bool {
        self.completion_type != CompletionType::Normal
    }

    /// Get the value, or undefined if none.
    pub fn get_value(&self) -> JsValue {
        self.value.clone().unwrap_or(JsValue::Undefined)
    }
}

/// Which stream a console line belongs to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

/// Everything one script run needs: the realm, the current scope, the invocation
/// stack and the captured console output.
pub struct EvalContext {
    realm: CodeRealm,
    scope: JsScopeType,
    stack: ExecutionContextStack,
    output: Vec<String>,
}

impl EvalContext {
    pub fn new() -> Self {
        Self::with_config(RealmConfig::default())
    }

    pub fn with_config(config: RealmConfig) -> Self {
        let realm = CodeRealm::new(config);
        let scope = new_global_scope(realm.global_object(), realm.chain());
        EvalContext {
            realm,
            scope,
            stack: ExecutionContextStack::new(),
            output: Vec::new(),
        }
    }

    pub fn realm(&self) -> &CodeRealm {
        &self.realm
    }

    pub fn chain(&self) -> PrototypeChain {
        self.realm.chain()
    }

    pub fn config(&self) -> &RealmConfig {
        self.realm.config()
    }

    pub fn global_object(&self) -> JsObjectType {
        self.realm.global_object()
    }

    pub fn global_this(&self) -> JsValue {
        self.realm.global_this()
    }

    pub fn scope(&self) -> JsScopeType {
        self.scope.clone()
    }

    /// Installs `scope` as the current scope and hands back the previous one.
    pub fn replace_scope(&mut self, scope: JsScopeType) -> JsScopeType {
        std::mem::replace(&mut self.scope, scope)
    }

    pub fn get_binding(&self, name: &str) -> ValueResult {
        lookup_binding(&self.scope, name)?
            .ok_or_else(|| JErrorType::ReferenceError(format!("{} is not defined", name)))
    }

    pub fn has_binding(&self, name: &str) -> bool {
        matches!(lookup_binding(&self.scope, name), Ok(Some(_)))
    }

    /// Assigns to an existing binding, or creates a property on the global sentinel.
    pub fn set_binding(&mut self, name: &str, value: JsValue) -> Result<(), JErrorType> {
        if !assign_binding(&self.scope, name, value.clone())? {
            self.realm
                .global_object()
                .borrow_mut()
                .set_own_property(name, value);
        }
        Ok(())
    }

    pub fn declare_var(&mut self, name: &str, value: Option<JsValue>) {
        declare_var(&self.scope, name, value)
    }

    pub fn declare_lexical(
        &mut self,
        name: &str,
        value: JsValue,
        is_const: bool,
    ) -> Result<(), JErrorType> {
        declare_lexical(&self.scope, name, value, is_const)
    }

    /// The context visible to the code currently running.
    pub fn this_value(&self) -> JsValue {
        resolve_this(&self.scope)
    }

    pub fn push_invocation(&mut self, record: InvocationRecord) -> Result<(), JErrorType> {
        if self.stack.depth() >= self.realm.config().call_depth_limit() {
            return Err(JErrorType::RangeError(
                "Maximum call stack size exceeded".to_string(),
            ));
        }
        self.stack.push_execution_ctx(record);
        Ok(())
    }

    pub fn pop_invocation(&mut self) -> Option<InvocationRecord> {
        self.stack.pop_running_execution_ctx()
    }

    pub fn current_invocation(&self) -> Option<&InvocationRecord> {
        self.stack.get_running_execution_ctx()
    }

    pub fn call_depth(&self) -> usize {
        self.stack.depth()
    }

    pub fn write_line(&mut self, stream: OutputStream, line: String) {
        if self.realm.config().echo_output {
            match stream {
                OutputStream::Stdout => println!("{}", line),
                OutputStream::Stderr => eprintln!("{}", line),
            }
        }
        self.output.push(line);
    }

    /// Console lines written so far, in order.
    pub fn output(&self) -> &[String] {
        &self.output
    }

    pub fn take_output(&mut self) -> Vec<String> {
        std::mem::take(&mut self.output)
    }
}

impl Default for EvalContext {
    fn default() -> Self {
        Self::new()
    }
}
