use crate::runner::ds::object::JsObjectType;
use crate::runner::ds::value::JsValue;

/// One invocation of a callable: who was called, with which context and arguments.
#[derive(Clone)]
pub struct InvocationRecord {
    pub callee: JsObjectType,
    pub context: JsValue,
    arguments: Vec<JsValue>,
    pub is_lexical: bool,
    pub is_construct: bool,
}
impl InvocationRecord {
    pub fn new(
        callee: JsObjectType,
        context: JsValue,
        arguments: Vec<JsValue>,
        is_lexical: bool,
        is_construct: bool,
    ) -> Self {
        InvocationRecord {
            callee,
            context,
            arguments,
            is_lexical,
            is_construct,
        }
    }

    /// The declared-parameter view: the argument at `index`, or `undefined`.
    pub fn argument(&self, index: usize) -> JsValue {
        self.arguments
            .get(index)
            .cloned()
            .unwrap_or(JsValue::Undefined)
    }

    /// The full argument sequence. Lexical callables do not expose it.
    pub fn arguments(&self) -> Option<&[JsValue]> {
        if self.is_lexical {
            None
        } else {
            Some(&self.arguments)
        }
    }

    pub fn argument_count(&self) -> usize {
        self.arguments.len()
    }

    pub(crate) fn all_arguments(&self) -> &[JsValue] {
        &self.arguments
    }
}

pub struct ExecutionContextStack {
    stack: Vec<InvocationRecord>,
}
impl ExecutionContextStack {
    pub fn new() -> Self {
        ExecutionContextStack { stack: Vec::new() }
    }

    pub fn get_running_execution_ctx(&self) -> Option<&InvocationRecord> {
        self.stack.last()
    }

    pub fn pop_running_execution_ctx(&mut self) -> Option<InvocationRecord> {
        self.stack.pop()
    }

    pub fn push_execution_ctx(&mut self, record: InvocationRecord) {
        self.stack.push(record)
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

impl Default for ExecutionContextStack {
    fn default() -> Self {
        Self::new()
    }
}
