pub mod error;
pub mod execution_context;
pub mod function_object;
pub mod lex_env;
pub mod object;
pub mod realm;
pub mod value;
