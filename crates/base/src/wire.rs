//! Capabilities the plugin consumes from the assembler.

use crate::error::Result;
use crate::value::Value;
use futures::future::BoxFuture;
use std::fmt;
use std::sync::Arc;

pub type WireFuture<T> = BoxFuture<'static, Result<T>>;

/// The assembler's wiring capability, handed to every factory and facet.
pub trait Wire: Send + Sync {
    /// Builds a nested spec into a value.
    fn wire(&self, spec: Value) -> WireFuture<Value>;

    /// Resolves a component by name.
    fn resolve_ref(&self, name: &str) -> WireFuture<Value>;

    /// Wraps a value in a [`Proxy`]. `path` names the component on whose
    /// behalf the proxy is used and becomes the context of its errors.
    fn get_proxy(&self, value: Value, path: &str) -> WireFuture<Arc<dyn Proxy>>;

    /// Loads a module by id. `spec` is the full component spec that asked for it.
    fn load_module(&self, id: &str, spec: &Value) -> WireFuture<Value>;

    /// Whether `value` is a reference token.
    fn is_ref(&self, value: &Value) -> bool;
}

pub type WireHandle = Arc<dyn Wire>;

/// Uniform access to a constructed component.
pub trait Proxy: Send + Sync + fmt::Debug {
    fn path(&self) -> &str;

    fn target(&self) -> Value;

    fn get(&self, key: &str) -> Option<Value>;

    /// # Errors
    /// Fails when the target cannot hold properties.
    fn set(&self, key: &str, value: Value) -> Result<()>;

    /// Calls `method` with the target as receiver.
    fn invoke(&self, method: &str, args: Vec<Value>) -> WireFuture<Value>;

    /// Copies the target. `None` when the component cannot be cloned.
    fn clone_component(&self, _options: &Value) -> Option<WireFuture<Value>> {
        None
    }
}
