//! # protobind - context binding and prototype delegation
//!
//! A small object model where every invocation of a callable gets an explicitly
//! resolved context, and property reads fall back along a chain of delegate objects.
//! Comes with:
//! - a PEG parser for a small script subset
//! - a tree-walking evaluator built on the binder and the prototype chain
//! - intrinsic `console`, `Object` and `Function.prototype` objects
//!
//! ## Quick Start
//!
//! ### Running a script
//!
//! ```
//! use protobind::runner::api::run_script;
//! use protobind::runner::eval::types::EvalContext;
//!
//! let mut ctx = EvalContext::new();
//! run_script(
//!     "function Person(name) { this.name = name; }
//!      Person.prototype.speak = function () { return `Hello, my name is ${this.name}`; };
//!      console.log(new Person('Fred').speak());",
//!     &mut ctx,
//! )
//! .unwrap();
//! assert_eq!(ctx.output(), &["Hello, my name is Fred".to_string()]);
//! ```
//!
//! ### Using the binder from Rust
//!
//! ```
//! use protobind::runner::binder::{invoke, CallSite};
//! use protobind::runner::ds::function_object::FunctionObject;
//! use protobind::runner::ds::value::JsValue;
//! use protobind::runner::eval::types::EvalContext;
//!
//! let mut ctx = EvalContext::new();
//! let who = ctx.realm().create_function(FunctionObject::new_native_function(
//!     "who",
//!     |_, record| Ok(record.context.clone()),
//! ));
//! let receiver = JsValue::Object(ctx.realm().create_object());
//!
//! let seen = invoke(&mut ctx, &who, CallSite::Receiver(receiver.clone()), vec![]).unwrap();
//! assert_eq!(seen, receiver);
//! let seen = invoke(&mut ctx, &who, CallSite::Bare, vec![]).unwrap();
//! assert_eq!(seen, ctx.global_this());
//! ```
//!
//! ## Architecture
//!
//! - **[`parser`]** - PEG grammar and AST types
//! - **[`runner`]**
//!   - **[`runner::binder`]** - context resolution and invocation
//!   - **[`runner::prototype_chain`]** - delegate-chain reads, writes and linking
//!   - **[`runner::ds`]** - values, objects, scopes, the realm
//!   - **[`runner::eval`]** - tree-walking evaluator
//!   - **[`runner::std_lib`]** - intrinsics
//!   - **[`runner::config`]** - realm configuration

#[macro_use]
extern crate lazy_static;

pub mod parser;
pub mod runner;
