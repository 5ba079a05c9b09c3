#![allow(dead_code, unreachable_pub)]

use futures::FutureExt;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use weave_base::{
    Function, LocalContext, Object, ObjectProxy, PluginOptions, Proxy, Value, WireError,
    WireFuture,
};

#[must_use]
pub fn context() -> LocalContext {
    LocalContext::new(&PluginOptions::default())
}

#[must_use]
pub fn spec(value: serde_json::Value) -> Value {
    Value::from(value)
}

/// Ordered, shared log of side effects.
#[derive(Debug, Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn record(&self, entry: impl Into<String>) {
        self.0.lock().push(entry.into());
    }

    #[must_use]
    pub fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }
}

fn render_args(args: &[Value]) -> String {
    args.iter().map(|arg| arg.to_json().to_string()).collect::<Vec<_>>().join(",")
}

/// A method logging `label(args)` and returning `Null`.
#[must_use]
pub fn logged(journal: &Journal, label: &str) -> Value {
    let journal = journal.clone();
    let label = label.to_owned();
    Value::Function(Function::sync(label.clone(), move |_, args| {
        journal.record(format!("{label}({})", render_args(args)));
        Ok(Value::Null)
    }))
}

/// A method logging `label:start`, sleeping, then logging `label:end`.
#[must_use]
pub fn slow(journal: &Journal, label: &str, delay: Duration) -> Value {
    let journal = journal.clone();
    let label = label.to_owned();
    Value::Function(Function::new(label.clone(), move |_, _| {
        let journal = journal.clone();
        let label = label.clone();
        async move {
            journal.record(format!("{label}:start"));
            tokio::time::sleep(delay).await;
            journal.record(format!("{label}:end"));
            Ok(Value::Null)
        }
    }))
}

/// A method logging `label` and failing.
#[must_use]
pub fn failing(journal: &Journal, label: &str) -> Value {
    let journal = journal.clone();
    let label = label.to_owned();
    Value::Function(Function::sync(label.clone(), move |_, _| {
        journal.record(label.clone());
        Err(WireError::invocation(format!("{label} failed")))
    }))
}

/// An object holding the given methods.
#[must_use]
pub fn service(methods: Vec<(&str, Value)>) -> Value {
    Value::Object(Object::from_entries(methods))
}

/// A one-argument arithmetic function.
#[must_use]
pub fn arithmetic(name: &str, op: fn(i64) -> i64) -> Value {
    Value::Function(Function::sync(name.to_owned(), move |_, args| {
        let x = args.first().and_then(Value::as_i64).ok_or("expected an integer argument")?;
        Ok(Value::from(op(x)))
    }))
}

/// A function that settles only once the returned sender fires.
#[must_use]
pub fn gate() -> (oneshot::Sender<Value>, Value) {
    let (tx, rx) = oneshot::channel::<Value>();
    let rx = Arc::new(Mutex::new(Some(rx)));
    let function = Function::new("gate", move |_, _| {
        let rx = rx.lock().take();
        async move {
            match rx {
                Some(rx) => rx.await.map_err(|_| WireError::from("gate sender dropped")),
                None => Err(WireError::from("gate already opened")),
            }
        }
    });
    (tx, Value::Function(function))
}

/// Proxy without a clone capability.
#[derive(Debug)]
pub struct NoCloneProxy(pub ObjectProxy);

impl Proxy for NoCloneProxy {
    fn path(&self) -> &str {
        self.0.path()
    }

    fn target(&self) -> Value {
        self.0.target()
    }

    fn get(&self, key: &str) -> Option<Value> {
        self.0.get(key)
    }

    fn set(&self, key: &str, value: Value) -> weave_base::Result<()> {
        self.0.set(key, value)
    }

    fn invoke(&self, method: &str, args: Vec<Value>) -> WireFuture<Value> {
        self.0.invoke(method, args)
    }
}

/// Proxy whose clone capability records the options it was given.
#[derive(Debug)]
pub struct RecordingCloneProxy {
    pub inner: ObjectProxy,
    pub seen: Arc<Mutex<Vec<serde_json::Value>>>,
}

impl Proxy for RecordingCloneProxy {
    fn path(&self) -> &str {
        self.inner.path()
    }

    fn target(&self) -> Value {
        self.inner.target()
    }

    fn get(&self, key: &str) -> Option<Value> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: Value) -> weave_base::Result<()> {
        self.inner.set(key, value)
    }

    fn invoke(&self, method: &str, args: Vec<Value>) -> WireFuture<Value> {
        self.inner.invoke(method, args)
    }

    fn clone_component(&self, options: &Value) -> Option<WireFuture<Value>> {
        self.seen.lock().push(options.to_json());
        let copy = Value::Object(Object::from_entries([("cloned", Value::from(true))]));
        Some(futures::future::ready(Ok(copy)).boxed())
    }
}
