use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum JErrorType {
    #[error("Uncaught reference error: {0}.")]
    ReferenceError(String),
    #[error("Uncaught type error: {0}.")]
    TypeError(String),
    #[error("Uncaught range error: {0}.")]
    RangeError(String),
    #[error("Uncaught syntax error: {0}.")]
    SyntaxError(String),
    /// Construction was applied to something without a construct behaviour.
    #[error("Uncaught type error: {0} is not a constructor.")]
    NotConstructible(String),
    /// A delegate chain walk would not terminate.
    #[error("Unresolved delegate cycle: {0}.")]
    DelegateCycle(String),
}
