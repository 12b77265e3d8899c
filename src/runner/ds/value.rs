use std::fmt;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

use crate::runner::ds::object::{JsObjectType, ObjectKind};

pub const TYPE_STR_UNDEFINED: &str = "undefined";
pub const TYPE_STR_NULL: &str = "null";

pub enum JsValue {
    Undefined,
    Null,
    Boolean(bool),
    String(String),
    Number(f64),
    Object(JsObjectType),
}
impl Clone for JsValue {
    fn clone(&self) -> Self {
        match self {
            JsValue::Undefined => JsValue::Undefined,
            JsValue::Null => JsValue::Null,
            JsValue::Boolean(b) => JsValue::Boolean(*b),
            JsValue::String(s) => JsValue::String(s.to_string()),
            JsValue::Number(n) => JsValue::Number(*n),
            JsValue::Object(o) => JsValue::Object(o.clone()),
        }
    }
}

impl JsValue {
    pub fn is_nullish(&self) -> bool {
        matches!(self, JsValue::Undefined | JsValue::Null)
    }

    pub fn as_object(&self) -> Option<&JsObjectType> {
        match self {
            JsValue::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn is_callable(&self) -> bool {
        match self {
            JsValue::Object(o) => o.borrow().is_callable(),
            _ => false,
        }
    }

    /// The `typeof` string for this value.
    pub fn type_of(&self) -> &'static str {
        match self {
            JsValue::Undefined => TYPE_STR_UNDEFINED,
            JsValue::Null => "object",
            JsValue::Boolean(_) => "boolean",
            JsValue::String(_) => "string",
            JsValue::Number(_) => "number",
            JsValue::Object(o) => {
                if o.borrow().is_callable() {
                    "function"
                } else {
                    "object"
                }
            }
        }
    }

    pub fn to_boolean(&self) -> bool {
        match self {
            JsValue::Undefined | JsValue::Null => false,
            JsValue::Boolean(b) => *b,
            JsValue::String(s) => !s.is_empty(),
            JsValue::Number(n) => !(*n == 0.0 || n.is_nan()),
            JsValue::Object(_) => true,
        }
    }

    pub fn to_number(&self) -> f64 {
        match self {
            JsValue::Undefined => f64::NAN,
            JsValue::Null => 0.0,
            JsValue::Boolean(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            JsValue::Number(n) => *n,
            JsValue::String(s) => {
                let t = s.trim();
                if t.is_empty() {
                    0.0
                } else {
                    t.parse::<f64>().unwrap_or(f64::NAN)
                }
            }
            JsValue::Object(_) => f64::NAN,
        }
    }

    /// String conversion used by concatenation and template literals.
    pub fn to_js_string(&self) -> String {
        match self {
            JsValue::Undefined => TYPE_STR_UNDEFINED.to_string(),
            JsValue::Null => TYPE_STR_NULL.to_string(),
            JsValue::Boolean(b) => b.to_string(),
            JsValue::String(s) => s.clone(),
            JsValue::Number(n) => format_number(*n),
            JsValue::Object(o) => {
                let obj = o.borrow();
                match obj.kind() {
                    ObjectKind::Array(elements) => elements
                        .iter()
                        .map(|e| {
                            if e.is_nullish() {
                                String::new()
                            } else {
                                e.to_js_string()
                            }
                        })
                        .collect::<Vec<String>>()
                        .join(","),
                    ObjectKind::Function(f) => {
                        format!("function {}() {{ [native code] }}", f.name)
                    }
                    ObjectKind::Global => "[object global]".to_string(),
                    ObjectKind::Ordinary => "[object Object]".to_string(),
                }
            }
        }
    }
}

/// Formats a number the way script code sees it: integral values have no fraction.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        }
    } else if n == 0.0 {
        "0".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{:.0}", n)
    } else {
        n.to_string()
    }
}

impl Display for JsValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            JsValue::String(s) => write!(f, "\"{}\"", s),
            other => write!(f, "{}", other.to_js_string()),
        }
    }
}

impl fmt::Debug for JsValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            JsValue::Undefined => write!(f, "JsValue::Undefined"),
            JsValue::Null => write!(f, "JsValue::Null"),
            JsValue::Boolean(b) => write!(f, "JsValue::Boolean({})", b),
            JsValue::String(s) => write!(f, "JsValue::String({:?})", s),
            JsValue::Number(n) => write!(f, "JsValue::Number({})", format_number(*n)),
            JsValue::Object(o) => write!(f, "JsValue::Object({})", o.borrow().id()),
        }
    }
}

/// Strict equality: objects compare by identity, `NaN` is never equal to itself.
impl PartialEq for JsValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (JsValue::Undefined, JsValue::Undefined) => true,
            (JsValue::Null, JsValue::Null) => true,
            (JsValue::Boolean(a), JsValue::Boolean(b)) => a == b,
            (JsValue::String(a), JsValue::String(b)) => a == b,
            (JsValue::Number(a), JsValue::Number(b)) => a == b,
            (JsValue::Object(a), JsValue::Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<&str> for JsValue {
    fn from(s: &str) -> Self {
        JsValue::String(s.to_string())
    }
}

impl From<String> for JsValue {
    fn from(s: String) -> Self {
        JsValue::String(s)
    }
}

impl From<f64> for JsValue {
    fn from(n: f64) -> Self {
        JsValue::Number(n)
    }
}

impl From<bool> for JsValue {
    fn from(b: bool) -> Self {
        JsValue::Boolean(b)
    }
}

impl From<JsObjectType> for JsValue {
    fn from(o: JsObjectType) -> Self {
        JsValue::Object(o)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(35.0), "35");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(1.5), "1.5");
        assert_eq!(format_number(f64::NAN), "NaN");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn test_strict_equality_of_nan() {
        assert_ne!(JsValue::Number(f64::NAN), JsValue::Number(f64::NAN));
        assert_eq!(JsValue::from("a"), JsValue::from("a"));
        assert_ne!(JsValue::Null, JsValue::Undefined);
    }

    #[test]
    fn test_to_boolean() {
        assert!(!JsValue::from("").to_boolean());
        assert!(JsValue::from("x").to_boolean());
        assert!(!JsValue::Number(0.0).to_boolean());
        assert!(!JsValue::Undefined.to_boolean());
    }
}
