//! Console built-in object.
//!
//! Provides console.log, console.error, console.warn, and console.info methods.
//! Lines are handed to the evaluation context, which records them and optionally
//! echoes them to the process streams.

use crate::runner::ds::execution_context::InvocationRecord;
use crate::runner::ds::function_object::NativeFn;
use crate::runner::ds::object::{same_object, JsObjectType, ObjectKind};
use crate::runner::ds::realm::CodeRealm;
use crate::runner::ds::value::{format_number, JsValue};
use crate::runner::eval::types::{EvalContext, OutputStream, ValueResult};
use crate::runner::prototype_chain::PrototypeChain;

use super::install_methods;

/// Nesting level past which objects collapse to `[Object]`.
const MAX_INSPECT_DEPTH: usize = 2;

lazy_static! {
    static ref CONSOLE_METHODS: Vec<(&'static str, NativeFn)> = vec![
        ("log", console_log as NativeFn),
        ("info", console_info as NativeFn),
        ("warn", console_warn as NativeFn),
        ("error", console_error as NativeFn),
    ];
}

/// Build the console object.
pub fn create_console(realm: &CodeRealm) -> JsObjectType {
    let console = realm.create_object();
    install_methods(realm, &console, &CONSOLE_METHODS);
    console
}

/// Format a JsValue for console output. Top-level strings are printed raw.
pub fn format_value(chain: PrototypeChain, value: &JsValue) -> String {
    match value {
        JsValue::String(s) => s.clone(),
        other => inspect(chain, other, 0, &mut vec![]),
    }
}

/// Format all arguments for console output.
pub fn format_args(chain: PrototypeChain, args: &[JsValue]) -> String {
    args.iter()
        .map(|a| format_value(chain, a))
        .collect::<Vec<_>>()
        .join(" ")
}

fn quote(s: &str) -> String {
    if s.contains('\'') && !s.contains('"') {
        format!("\"{}\"", s)
    } else {
        format!("'{}'", s.replace('\'', "\\'"))
    }
}

fn format_key(key: &str) -> String {
    let mut chars = key.chars();
    let is_identifier = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        }
        _ => false,
    };
    if is_identifier {
        key.to_string()
    } else {
        quote(key)
    }
}

fn constructor_name(chain: PrototypeChain, object: &JsObjectType) -> Option<String> {
    match chain.read_property(object, "constructor").ok()? {
        JsValue::Object(c) => c.borrow().as_function().map(|f| f.name.clone()),
        _ => None,
    }
}

fn inspect(chain: PrototypeChain, value: &JsValue, depth: usize, seen: &mut Vec<JsObjectType>) -> String {
    let object = match value {
        JsValue::Undefined => return "undefined".to_string(),
        JsValue::Null => return "null".to_string(),
        JsValue::Boolean(b) => return b.to_string(),
        JsValue::Number(n) => return format_number(*n),
        JsValue::String(s) => return quote(s),
        JsValue::Object(o) => o,
    };
    if seen.iter().any(|s| same_object(s, object)) {
        return "[Circular]".to_string();
    }

    let (elements, has_delegate) = {
        let o = object.borrow();
        match o.kind() {
            ObjectKind::Global => return "Object [global]".to_string(),
            ObjectKind::Function(f) => {
                return if f.name.is_empty() {
                    "[Function (anonymous)]".to_string()
                } else {
                    format!("[Function: {}]", f.name)
                }
            }
            ObjectKind::Array(elements) => (Some(elements.clone()), o.delegate().is_some()),
            ObjectKind::Ordinary => (None, o.delegate().is_some()),
        }
    };

    if let Some(elements) = elements {
        if elements.is_empty() {
            return "[]".to_string();
        }
        if depth > MAX_INSPECT_DEPTH {
            return "[Array]".to_string();
        }
        seen.push(object.clone());
        let parts: Vec<String> = elements
            .iter()
            .map(|e| inspect(chain, e, depth + 1, seen))
            .collect();
        seen.pop();
        return format!("[ {} ]", parts.join(", "));
    }

    let prefix = if has_delegate {
        match constructor_name(chain, object) {
            Some(name) if !name.is_empty() && name != "Object" => Some(name),
            _ => None,
        }
    } else {
        Some("[Object: null prototype]".to_string())
    };
    let entries: Vec<(String, JsValue)> = {
        let o = object.borrow();
        o.own_property_keys()
            .into_iter()
            .map(|k| {
                let v = o.get_own_property(&k).unwrap_or(JsValue::Undefined);
                (k, v)
            })
            .collect()
    };
    if !entries.is_empty() && depth > MAX_INSPECT_DEPTH {
        return match &prefix {
            Some(name) if has_delegate => format!("[{}]", name),
            _ => "[Object]".to_string(),
        };
    }
    let body = if entries.is_empty() {
        "{}".to_string()
    } else {
        seen.push(object.clone());
        let parts: Vec<String> = entries
            .iter()
            .map(|(k, v)| format!("{}: {}", format_key(k), inspect(chain, v, depth + 1, seen)))
            .collect();
        seen.pop();
        format!("{{ {} }}", parts.join(", "))
    };
    match prefix {
        Some(name) => format!("{} {}", name, body),
        None => body,
    }
}

fn write(ctx: &mut EvalContext, stream: OutputStream, record: &InvocationRecord) -> ValueResult {
    let line = format_args(ctx.chain(), record.arguments().unwrap_or(&[]));
    ctx.write_line(stream, line);
    Ok(JsValue::Undefined)
}

/// console.log - Log to stdout.
fn console_log(ctx: &mut EvalContext, record: &InvocationRecord) -> ValueResult {
    write(ctx, OutputStream::Stdout, record)
}

/// console.info - same as log.
fn console_info(ctx: &mut EvalContext, record: &InvocationRecord) -> ValueResult {
    write(ctx, OutputStream::Stdout, record)
}

fn console_warn(ctx: &mut EvalContext, record: &InvocationRecord) -> ValueResult {
    write(ctx, OutputStream::Stderr, record)
}

fn console_error(ctx: &mut EvalContext, record: &InvocationRecord) -> ValueResult {
    write(ctx, OutputStream::Stderr, record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::config::RealmConfig;
    use crate::runner::ds::function_object::FunctionObject;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_format_primitives_and_literals() {
        let realm = CodeRealm::new(RealmConfig::default());
        let chain = realm.chain();
        let o = realm.create_object();
        o.borrow_mut().set_own_property("name", JsValue::from("Fred"));
        o.borrow_mut().set_own_property("age", JsValue::from(35.0));
        assert_eq!(
            format_args(chain, &[JsValue::from("x"), JsValue::from(1.5), JsValue::Object(o)]),
            "x 1.5 { name: 'Fred', age: 35 }"
        );
        assert_eq!(format_value(chain, &JsValue::Undefined), "undefined");
        assert_eq!(format_value(chain, &realm.global_this()), "Object [global]");
    }

    #[test]
    fn test_format_functions_and_arrays() {
        let realm = CodeRealm::new(RealmConfig::default());
        let chain = realm.chain();
        let named = realm.create_function(FunctionObject::new_native_function("speak", |_, _| {
            Ok(JsValue::Undefined)
        }));
        let anonymous = realm.create_function(FunctionObject::new_native_function("", |_, _| {
            Ok(JsValue::Undefined)
        }));
        let array = realm.create_array(vec![
            JsValue::from(1.0),
            JsValue::from("a"),
            JsValue::Object(named),
            JsValue::Object(anonymous),
        ]);
        assert_eq!(
            format_value(chain, &JsValue::Object(array)),
            "[ 1, 'a', [Function: speak], [Function (anonymous)] ]"
        );
    }

    #[test]
    fn test_format_circular_and_deep() {
        let realm = CodeRealm::new(RealmConfig::default());
        let chain = realm.chain();
        let a = realm.create_object();
        a.borrow_mut().set_own_property("self", JsValue::Object(a.clone()));
        assert_eq!(format_value(chain, &JsValue::Object(a)), "{ self: [Circular] }");

        let d = realm.create_object();
        let c = realm.create_object();
        c.borrow_mut().set_own_property("d", JsValue::Object(d));
        let b = realm.create_object();
        b.borrow_mut().set_own_property("c", JsValue::Object(c));
        let top = realm.create_object();
        top.borrow_mut().set_own_property("b", JsValue::Object(b));
        assert_eq!(
            format_value(chain, &JsValue::Object(top.clone())),
            "{ b: { c: { d: {} } } }"
        );

        let e = realm.create_object();
        e.borrow_mut().set_own_property("e", JsValue::from(1.0));
        let b = realm.create_object();
        let c = realm.create_object();
        c.borrow_mut().set_own_property("d", JsValue::Object(e));
        b.borrow_mut().set_own_property("c", JsValue::Object(c));
        top.borrow_mut().set_own_property("b", JsValue::Object(b));
        assert_eq!(
            format_value(chain, &JsValue::Object(top)),
            "{ b: { c: { d: [Object] } } }"
        );
    }

    #[test]
    fn test_quotes_strings_with_apostrophes() {
        let realm = CodeRealm::new(RealmConfig::default());
        let arr = realm.create_array(vec![JsValue::from("D'Artagnan")]);
        assert_eq!(
            format_value(realm.chain(), &JsValue::Object(arr)),
            "[ \"D'Artagnan\" ]"
        );
    }
}
