use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use uuid::Uuid;

use crate::runner::ds::function_object::FunctionObject;
use crate::runner::ds::value::JsValue;

pub type JsObjectType = Rc<RefCell<ObjectInstance>>;

const MAX_DENSE_GAP: usize = 1024;

pub enum ObjectKind {
    Ordinary,
    Function(FunctionObject),
    Array(Vec<JsValue>),
    /// The realm's global sentinel.
    Global,
}

/// A property bag with at most one delegate.
///
/// `properties` holds every own property. `keys` holds only the enumerable ones, in
/// insertion order; hidden properties live in `properties` alone.
pub struct ObjectInstance {
    id: Uuid,
    kind: ObjectKind,
    properties: HashMap<String, JsValue>,
    keys: Vec<String>,
    delegate: Option<JsObjectType>,
}
impl ObjectInstance {
    pub fn new(kind: ObjectKind, delegate: Option<JsObjectType>) -> Self {
        ObjectInstance {
            id: Uuid::new_v4(),
            kind,
            properties: HashMap::new(),
            keys: Vec::new(),
            delegate,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn kind(&self) -> &ObjectKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut ObjectKind {
        &mut self.kind
    }

    pub fn is_callable(&self) -> bool {
        matches!(self.kind, ObjectKind::Function(_))
    }

    pub fn as_function(&self) -> Option<&FunctionObject> {
        match &self.kind {
            ObjectKind::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn get_own_property(&self, name: &str) -> Option<JsValue> {
        if let ObjectKind::Array(elements) = &self.kind {
            if name == "length" {
                return Some(JsValue::Number(self.array_length() as f64));
            }
            if let Some(value) = array_index(name).and_then(|i| elements.get(i)) {
                return Some(value.clone());
            }
        }
        self.properties.get(name).cloned()
    }

    pub fn has_own_property(&self, name: &str) -> bool {
        if let ObjectKind::Array(elements) = &self.kind {
            if name == "length" {
                return true;
            }
            if array_index(name).map_or(false, |i| i < elements.len()) {
                return true;
            }
        }
        self.properties.contains_key(name)
    }

    /// Creates or overwrites an own property. New keys are enumerable; an existing
    /// hidden key stays hidden.
    ///
    /// Array indices within `MAX_DENSE_GAP` of the current length grow the element
    /// vector. Farther indices are kept as keyed properties until the vector reaches
    /// them.
    pub fn set_own_property(&mut self, name: &str, value: JsValue) {
        if let ObjectKind::Array(elements) = &mut self.kind {
            if let Some(index) = array_index(name) {
                if index < elements.len() {
                    elements[index] = value;
                    return;
                }
                let dense = elements
                    .len()
                    .checked_add(MAX_DENSE_GAP)
                    .map_or(false, |limit| index <= limit);
                if dense {
                    elements.resize(index + 1, JsValue::Undefined);
                    let len = elements.len();
                    let absorbed: Vec<String> = self
                        .properties
                        .keys()
                        .filter(|k| array_index(k).map_or(false, |i| i < len))
                        .cloned()
                        .collect();
                    for key in absorbed {
                        if let (Some(i), Some(v)) = (array_index(&key), self.properties.remove(&key)) {
                            elements[i] = v;
                        }
                        self.keys.retain(|k| *k != key);
                    }
                    elements[index] = value;
                    return;
                }
            }
        }
        if !self.properties.contains_key(name) {
            self.keys.push(name.to_string());
        }
        self.properties.insert(name.to_string(), value);
    }

    /// Creates or overwrites an own property that is not enumerated.
    pub fn set_hidden_property(&mut self, name: &str, value: JsValue) {
        self.keys.retain(|k| k != name);
        self.properties.insert(name.to_string(), value);
    }

    /// Enumerable own keys in insertion order.
    pub fn own_property_keys(&self) -> Vec<String> {
        let mut result = vec![];
        if let ObjectKind::Array(elements) = &self.kind {
            result.extend((0..elements.len()).map(|i| i.to_string()));
        }
        result.extend(self.keys.iter().cloned());
        result
    }

    pub fn delegate(&self) -> Option<JsObjectType> {
        self.delegate.clone()
    }

    pub(crate) fn set_delegate(&mut self, delegate: Option<JsObjectType>) {
        self.delegate = delegate;
    }

    /// One past the highest index held, densely or as a keyed property.
    fn array_length(&self) -> usize {
        match &self.kind {
            ObjectKind::Array(elements) => self
                .properties
                .keys()
                .filter_map(|k| array_index(k))
                .map(|i| i + 1)
                .fold(elements.len(), usize::max),
            _ => 0,
        }
    }
}

/// Canonical array index: decimal digits without a leading zero, below 2^32 - 1.
pub(crate) fn array_index(name: &str) -> Option<usize> {
    if name.is_empty()
        || (name.len() > 1 && name.starts_with('0'))
        || !name.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    match name.parse::<u32>() {
        Ok(index) if index < u32::MAX => Some(index as usize),
        _ => None,
    }
}

pub fn new_object(kind: ObjectKind, delegate: Option<JsObjectType>) -> JsObjectType {
    Rc::new(RefCell::new(ObjectInstance::new(kind, delegate)))
}

pub fn same_object(a: &JsObjectType, b: &JsObjectType) -> bool {
    Rc::ptr_eq(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_properties_are_not_enumerated() {
        let o = new_object(ObjectKind::Ordinary, None);
        o.borrow_mut().set_own_property("a", JsValue::from(1.0));
        o.borrow_mut().set_hidden_property("constructor", JsValue::Null);
        o.borrow_mut().set_own_property("constructor", JsValue::from(2.0));
        assert_eq!(o.borrow().own_property_keys(), vec!["a".to_string()]);
        assert_eq!(
            o.borrow().get_own_property("constructor"),
            Some(JsValue::from(2.0))
        );
    }

    #[test]
    fn test_array_index_properties() {
        let a = new_object(ObjectKind::Array(vec![JsValue::from(1.0)]), None);
        a.borrow_mut().set_own_property("2", JsValue::from("x"));
        let arr = a.borrow();
        assert_eq!(arr.get_own_property("length"), Some(JsValue::from(3.0)));
        assert_eq!(arr.get_own_property("1"), Some(JsValue::Undefined));
        assert_eq!(arr.get_own_property("2"), Some(JsValue::from("x")));
        assert!(!arr.has_own_property("01"));
    }

    #[test]
    fn test_out_of_range_index_keys_are_plain_properties() {
        let a = new_object(ObjectKind::Array(vec![]), None);
        a.borrow_mut()
            .set_own_property("18446744073709551615", JsValue::from(1.0));
        a.borrow_mut().set_own_property("4294967295", JsValue::from(2.0));
        let arr = a.borrow();
        assert_eq!(arr.get_own_property("length"), Some(JsValue::from(0.0)));
        assert_eq!(
            arr.get_own_property("18446744073709551615"),
            Some(JsValue::from(1.0))
        );
        assert_eq!(
            arr.own_property_keys(),
            vec!["18446744073709551615".to_string(), "4294967295".to_string()]
        );
    }

    #[test]
    fn test_far_index_is_stored_sparsely() {
        let a = new_object(ObjectKind::Array(vec![JsValue::from(1.0)]), None);
        a.borrow_mut().set_own_property("4294967294", JsValue::from("last"));
        let arr = a.borrow();
        assert_eq!(arr.get_own_property("length"), Some(JsValue::from(4294967295.0)));
        assert_eq!(arr.get_own_property("4294967294"), Some(JsValue::from("last")));
        assert!(arr.has_own_property("4294967294"));
        assert_eq!(arr.get_own_property("4294967293"), None);
        assert!(matches!(arr.kind(), ObjectKind::Array(e) if e.len() == 1));
    }

    #[test]
    fn test_growing_absorbs_sparse_entries() {
        let a = new_object(ObjectKind::Array(vec![]), None);
        a.borrow_mut().set_own_property("2000", JsValue::from("x"));
        a.borrow_mut().set_own_property("1024", JsValue::from("y"));
        assert!(matches!(a.borrow().kind(), ObjectKind::Array(e) if e.len() == 1025));
        a.borrow_mut().set_own_property("2048", JsValue::from("z"));
        let arr = a.borrow();
        assert!(matches!(arr.kind(), ObjectKind::Array(e) if e.len() == 2049));
        assert_eq!(arr.get_own_property("2000"), Some(JsValue::from("x")));
        assert_eq!(arr.get_own_property("length"), Some(JsValue::from(2049.0)));
        assert_eq!(arr.own_property_keys().len(), 2049);
    }
}
