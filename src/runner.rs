pub mod api;
pub mod binder;
pub mod config;
pub mod ds;
pub mod eval;
pub mod prototype_chain;
pub mod std_lib;
