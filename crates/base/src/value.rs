//! Dynamic component values.
//!
//! A [`Value`] is what factories produce and facets decorate. Primitives and
//! arrays are plain data; [`Object`] and [`Function`] are shared handles whose
//! identity survives cloning, so two wirings of the same reference observe the
//! same live instance.

use crate::error::{Result, WireError};
use futures::FutureExt;
use futures::future::BoxFuture;
use fxhash::{FxHashMap, FxHashSet};
use parking_lot::RwLock;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Future returned by [`Function::call`] and [`Function::construct`].
pub type CallFuture = BoxFuture<'static, Result<Value>>;

type CallFn = dyn Fn(Value, Vec<Value>) -> CallFuture + Send + Sync;
type ConstructFn = dyn Fn(Vec<Value>) -> CallFuture + Send + Sync;

#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(Arc<str>),
    Array(Vec<Value>),
    Object(Object),
    Function(Function),
}

impl Value {
    /// Identity for objects and functions, structural equality for everything else.
    #[must_use]
    pub fn same(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same(y))
            },
            (Self::Object(a), Self::Object(b)) => a.ptr_eq(b),
            (Self::Function(a), Self::Function(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Number(n) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
            Self::String(s) => !s.is_empty(),
            Self::Array(_) | Self::Object(_) | Self::Function(_) => true,
        }
    }

    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
            Self::Function(_) => "function",
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_array(&self) -> Option<&[Self]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_function(&self) -> Option<&Function> {
        match self {
            Self::Function(function) => Some(function),
            _ => None,
        }
    }

    /// Argument list form: an array yields its elements, any other value
    /// becomes a single argument.
    #[must_use]
    pub fn into_args(self) -> Vec<Self> {
        match self {
            Self::Array(items) => items,
            other => vec![other],
        }
    }

    /// A copy with a new identity. Functions are duplicated, objects and arrays
    /// copied shallowly or deeply, primitives returned as they are.
    #[must_use]
    pub fn copy(&self, deep: bool) -> Self {
        match self {
            Self::Object(object) => Self::Object(object.copy(deep)),
            Self::Function(function) => Self::Function(function.duplicate()),
            Self::Array(items) if deep => {
                let mut seen = FxHashMap::default();
                Self::Array(items.iter().cloned().map(|item| deep_copy_value(item, &mut seen)).collect())
            },
            other => other.clone(),
        }
    }

    /// Renders the value as JSON. Functions become `"[Function name]"` and
    /// cyclic object references become `"[circular]"`.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let mut path = FxHashSet::default();
        self.to_json_guarded(&mut path)
    }

    fn to_json_guarded(&self, path: &mut FxHashSet<usize>) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Number(n) => serde_json::Value::Number(n.clone()),
            Self::String(s) => serde_json::Value::String(s.to_string()),
            Self::Array(items) => {
                serde_json::Value::Array(items.iter().map(|v| v.to_json_guarded(path)).collect())
            },
            Self::Function(function) => {
                serde_json::Value::String(format!("[Function {}]", function.name()))
            },
            Self::Object(object) => {
                if !path.insert(object.id()) {
                    return serde_json::Value::String("[circular]".to_owned());
                }
                let map = object
                    .visible_entries()
                    .into_iter()
                    .map(|(key, value)| (key.to_string(), value.to_json_guarded(path)))
                    .collect();
                path.remove(&object.id());
                serde_json::Value::Object(map)
            },
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(n),
            serde_json::Value::String(s) => Self::String(s.into()),
            serde_json::Value::Array(items) => {
                Self::Array(items.into_iter().map(Self::from).collect())
            },
            serde_json::Value::Object(map) => Self::Object(Object::from_entries(
                map.into_iter().map(|(key, value)| (key, Self::from(value))),
            )),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s.into())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(n.into())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

impl From<f64> for Value {
    /// Non-finite numbers have no JSON form and become `Null`.
    fn from(n: f64) -> Self {
        serde_json::Number::from_f64(n).map_or(Self::Null, Self::Number)
    }
}

impl From<Vec<Self>> for Value {
    fn from(items: Vec<Self>) -> Self {
        Self::Array(items)
    }
}

impl From<Object> for Value {
    fn from(object: Object) -> Self {
        Self::Object(object)
    }
}

impl From<Function> for Value {
    fn from(function: Function) -> Self {
        Self::Function(function)
    }
}

#[derive(Default)]
struct ObjectData {
    props: BTreeMap<Arc<str>, Value>,
    base: Option<Object>,
}

/// Shared, mutable property map with an optional delegation base.
///
/// Lookups read the object's own properties first and fall back to the base
/// chain. Writes always land on the object itself.
#[derive(Clone, Default)]
pub struct Object(Arc<RwLock<ObjectData>>);

impl Object {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh object delegating every lookup it cannot answer to `base`.
    #[must_use]
    pub fn extend(base: &Self) -> Self {
        Self(Arc::new(RwLock::new(ObjectData { props: BTreeMap::new(), base: Some(base.clone()) })))
    }

    pub fn from_entries<K, I>(entries: I) -> Self
    where
        K: Into<Arc<str>>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let props = entries.into_iter().map(|(key, value)| (key.into(), value)).collect();
        Self(Arc::new(RwLock::new(ObjectData { props, base: None })))
    }

    #[must_use]
    pub fn base(&self) -> Option<Self> {
        self.0.read().base.clone()
    }

    /// Looks `key` up through the delegation chain.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        let base = {
            let data = self.0.read();
            if let Some(value) = data.props.get(key) {
                return Some(value.clone());
            }
            data.base.clone()
        };
        base.and_then(|base| base.get(key))
    }

    #[must_use]
    pub fn get_own(&self, key: &str) -> Option<Value> {
        self.0.read().props.get(key).cloned()
    }

    #[must_use]
    pub fn has_own(&self, key: &str) -> bool {
        self.0.read().props.contains_key(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Sets an own property, returning the previous own value.
    pub fn set(&self, key: impl Into<Arc<str>>, value: Value) -> Option<Value> {
        self.0.write().props.insert(key.into(), value)
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        self.0.write().props.remove(key)
    }

    #[must_use]
    pub fn keys(&self) -> Vec<Arc<str>> {
        self.0.read().props.keys().cloned().collect()
    }

    /// Snapshot of the own properties in key order.
    #[must_use]
    pub fn entries(&self) -> Vec<(Arc<str>, Value)> {
        self.0.read().props.iter().map(|(key, value)| (key.clone(), value.clone())).collect()
    }

    /// Snapshot of every property visible through the chain, own values winning.
    #[must_use]
    pub fn visible_entries(&self) -> BTreeMap<Arc<str>, Value> {
        let (mut visible, own) = {
            let data = self.0.read();
            let inherited = data.base.as_ref().map(Self::visible_entries).unwrap_or_default();
            (inherited, data.props.clone())
        };
        visible.extend(own);
        visible
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.read().props.len()
    }

    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    fn id(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }

    /// Copies the own properties into a new object sharing the same base.
    ///
    /// A shallow copy shares nested objects; a deep copy duplicates nested
    /// objects and arrays while keeping the cycles of the source graph.
    #[must_use]
    pub fn copy(&self, deep: bool) -> Self {
        if deep {
            let mut seen = FxHashMap::default();
            self.deep_copy(&mut seen)
        } else {
            let data = self.0.read();
            Self(Arc::new(RwLock::new(ObjectData {
                props: data.props.clone(),
                base: data.base.clone(),
            })))
        }
    }

    fn deep_copy(&self, seen: &mut FxHashMap<usize, Self>) -> Self {
        if let Some(copy) = seen.get(&self.id()) {
            return copy.clone();
        }
        let (entries, base) = {
            let data = self.0.read();
            (data.props.clone(), data.base.clone())
        };
        let copy = Self(Arc::new(RwLock::new(ObjectData { props: BTreeMap::new(), base })));
        seen.insert(self.id(), copy.clone());
        for (key, value) in entries {
            copy.set(key, deep_copy_value(value, seen));
        }
        copy
    }
}

fn deep_copy_value(value: Value, seen: &mut FxHashMap<usize, Object>) -> Value {
    match value {
        Value::Object(object) => Value::Object(object.deep_copy(seen)),
        Value::Array(items) => {
            Value::Array(items.into_iter().map(|item| deep_copy_value(item, seen)).collect())
        },
        other => other,
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Value::Object(self.clone()).to_json())
    }
}

struct FunctionInner {
    name: Arc<str>,
    call: Arc<CallFn>,
    construct: Option<Arc<ConstructFn>>,
}

/// Named async callable with an optional constructor.
#[derive(Clone)]
pub struct Function(Arc<FunctionInner>);

impl Function {
    /// Wraps an async closure receiving `(receiver, args)`.
    pub fn new<F, Fut>(name: impl Into<Arc<str>>, call: F) -> Self
    where
        F: Fn(Value, Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        Self(Arc::new(FunctionInner {
            name: name.into(),
            call: Arc::new(move |this, args| call(this, args).boxed()),
            construct: None,
        }))
    }

    /// Wraps a synchronous closure.
    pub fn sync<F>(name: impl Into<Arc<str>>, call: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        Self(Arc::new(FunctionInner {
            name: name.into(),
            call: Arc::new(move |this: Value, args: Vec<Value>| {
                futures::future::ready(call(&this, &args)).boxed()
            }),
            construct: None,
        }))
    }

    /// Returns a function with the same call behaviour that can also be constructed.
    #[must_use]
    pub fn with_constructor<F, Fut>(self, construct: F) -> Self
    where
        F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        Self(Arc::new(FunctionInner {
            name: self.0.name.clone(),
            call: self.0.call.clone(),
            construct: Some(Arc::new(move |args| construct(args).boxed())),
        }))
    }

    pub fn call(&self, this: Value, args: Vec<Value>) -> CallFuture {
        (self.0.call)(this, args)
    }

    pub fn construct(&self, args: Vec<Value>) -> CallFuture {
        match &self.0.construct {
            Some(construct) => construct(args),
            None => {
                let err = WireError::invocation(format!("`{}` is not a constructor", self.0.name));
                futures::future::ready(Err(err)).boxed()
            },
        }
    }

    #[must_use]
    pub fn is_constructor(&self) -> bool {
        self.0.construct.is_some()
    }

    /// A new function identity sharing this function's behaviour.
    #[must_use]
    pub fn duplicate(&self) -> Self {
        Self(Arc::new(FunctionInner {
            name: self.0.name.clone(),
            call: self.0.call.clone(),
            construct: self.0.construct.clone(),
        }))
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[Function {}]", self.0.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_objects_compare_by_identity() {
        let a = Value::from(json!({ "x": 1 }));
        let b = Value::from(json!({ "x": 1 }));

        assert_ne!(a, b);
        assert_eq!(a, a.clone());
        assert_eq!(Value::from(json!([1, "two", null])), Value::from(json!([1, "two", null])));
    }

    #[test]
    fn test_extend_delegates_without_copying() {
        let base = Object::from_entries([("greeting", Value::from("hi")), ("n", Value::from(1))]);
        let child = Object::extend(&base);

        assert_eq!(child.get("greeting"), Some(Value::from("hi")));
        assert!(!child.has_own("greeting"));
        assert_eq!(child.len(), 0);

        child.set("n", Value::from(2));
        base.set("late", Value::from(true));

        assert_eq!(child.get("n"), Some(Value::from(2)));
        assert_eq!(base.get("n"), Some(Value::from(1)));
        assert_eq!(child.get("late"), Some(Value::from(true)));
    }

    #[test]
    fn test_deep_copy_preserves_cycles() {
        let root = Object::new();
        let inner = Object::new();
        inner.set("parent", Value::Object(root.clone()));
        root.set("inner", Value::Object(inner.clone()));

        let copy = root.copy(true);
        let copied_inner = copy.get("inner").and_then(|v| v.as_object().cloned()).expect("inner");

        assert!(!copied_inner.ptr_eq(&inner));
        let back = copied_inner.get("parent").and_then(|v| v.as_object().cloned()).expect("parent");
        assert!(back.ptr_eq(&copy));
    }

    #[test]
    fn test_shallow_copy_shares_nested() {
        let inner = Object::new();
        let root = Object::from_entries([("inner", Value::Object(inner.clone()))]);

        let copy = root.copy(false);

        assert!(!copy.ptr_eq(&root));
        assert_eq!(copy.get("inner"), Some(Value::Object(inner)));
    }

    #[test]
    fn test_to_json_marks_cycles_and_functions() {
        let root = Object::new();
        root.set("me", Value::Object(root.clone()));
        root.set("f", Function::sync("answer", |_, _| Ok(Value::from(42))).into());

        assert_eq!(
            Value::Object(root).to_json(),
            json!({ "f": "[Function answer]", "me": "[circular]" })
        );
    }

    #[test]
    fn test_into_args() {
        assert_eq!(Value::from(json!([1, 2])).into_args().len(), 2);
        assert_eq!(Value::from(5).into_args(), vec![Value::from(5)]);
        assert_eq!(Value::Null.into_args(), vec![Value::Null]);
    }

    #[tokio::test]
    async fn test_function_without_constructor_rejects() {
        let f = Function::sync("plain", |_, args| Ok(args.first().cloned().unwrap_or_default()));

        assert_eq!(f.call(Value::Null, vec![Value::from(7)]).await, Ok(Value::from(7)));
        let err = f.construct(vec![]).await.expect_err("not a constructor");
        assert_eq!(err.kind(), "Invocation");

        let twin = f.duplicate();
        assert!(!twin.ptr_eq(&f));
        assert_eq!(twin.name(), "plain");
    }
}
