use crate::error::{Result, WireError};
use crate::value::Value;
use crate::wire::{Proxy, WireFuture};
use futures::FutureExt;
use std::sync::Arc;
use tracing::trace;

/// Proxy over plain values: objects, arrays, functions and primitives.
#[derive(Debug, Clone)]
pub struct ObjectProxy {
    target: Value,
    path: Arc<str>,
}

impl ObjectProxy {
    pub fn new(target: Value, path: impl Into<Arc<str>>) -> Self {
        Self { target, path: path.into() }
    }
}

impl Proxy for ObjectProxy {
    fn path(&self) -> &str {
        &self.path
    }

    fn target(&self) -> Value {
        self.target.clone()
    }

    fn get(&self, key: &str) -> Option<Value> {
        match &self.target {
            Value::Object(object) => object.get(key),
            Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i).cloned()),
            _ => None,
        }
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        match &self.target {
            Value::Object(object) => {
                trace!(path = %self.path, key, "Setting property");
                object.set(key, value);
                Ok(())
            },
            other => Err(WireError::Configuration {
                message: format!("cannot set `{key}` on a {}", other.type_name()).into(),
                context: Some(self.path.to_string().into()),
            }),
        }
    }

    fn invoke(&self, method: &str, args: Vec<Value>) -> WireFuture<Value> {
        match self.get(method) {
            Some(Value::Function(function)) => {
                trace!(path = %self.path, method, "Invoking method");
                function.call(self.target.clone(), args)
            },
            _ => {
                let err = WireError::Invocation {
                    message: format!("`{method}` is not a method").into(),
                    context: Some(self.path.to_string().into()),
                };
                futures::future::ready(Err(err)).boxed()
            },
        }
    }

    fn clone_component(&self, options: &Value) -> Option<WireFuture<Value>> {
        let deep = options
            .as_object()
            .and_then(|options| options.get("deep"))
            .is_some_and(|deep| deep.is_truthy());
        Some(futures::future::ready(Ok(self.target.copy(deep))).boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Function, Object};
    use serde_json::json;

    #[tokio::test]
    async fn test_invoke_uses_target_as_receiver() {
        let base = Object::from_entries([(
            "describe",
            Value::from(Function::sync("describe", |this, _| {
                Ok(this.as_object().and_then(|o| o.get("name")).unwrap_or_default())
            })),
        )]);
        let target = Object::extend(&base);
        target.set("name", Value::from("child"));
        let proxy = ObjectProxy::new(Value::Object(target), "child");

        assert_eq!(proxy.invoke("describe", vec![]).await, Ok(Value::from("child")));
        assert_eq!(proxy.invoke("missing", vec![]).await.expect_err("no method").kind(), "Invocation");
    }

    #[test]
    fn test_set_on_primitive_fails() {
        let proxy = ObjectProxy::new(Value::from(3), "three");
        let err = proxy.set("x", Value::Null).expect_err("primitive");
        assert_eq!(err.kind(), "Configuration");
    }

    #[tokio::test]
    async fn test_clone_respects_deep_option() {
        let target = Value::from(json!({ "nested": { "n": 1 } }));
        let proxy = ObjectProxy::new(target.clone(), "source");
        let nested = proxy.get("nested").expect("nested");

        let shallow = proxy.clone_component(&Value::Null).expect("cloneable").await.expect("clone");
        let deep = proxy
            .clone_component(&Value::from(json!({ "deep": true })))
            .expect("cloneable")
            .await
            .expect("clone");

        assert_ne!(shallow, target);
        assert_eq!(shallow.as_object().and_then(|o| o.get("nested")), Some(nested.clone()));
        assert_ne!(deep.as_object().and_then(|o| o.get("nested")), Some(nested));
    }
}
