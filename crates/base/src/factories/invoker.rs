use super::mismatch;
use crate::error::WireError;
use crate::resolver::Resolver;
use crate::spec::{ComponentDef, FactorySpec};
use crate::value::{Function, Value};
use crate::wire::WireHandle;
use std::sync::Arc;
use tracing::debug;

/// Wires `{method, args}` into a function that invokes `method` on its target later.
pub fn invoker_factory(resolver: Resolver, component: ComponentDef, wire: WireHandle) {
    let FactorySpec::Invoker(spec) = &component.factory else {
        return resolver.reject(mismatch(&component, "invoker"));
    };
    debug!(component = %component.id, "Creating invoker");

    let invoker = wire.wire(spec.clone());
    let id = component.id.clone();
    resolver.settle_with(async move {
        let invoker = invoker.await?;
        let method = invoker.as_object().and_then(|invoker| invoker.get("method"));
        let Some(Value::String(method)) = method else {
            return Err(WireError::configuration("invoker `method` must be a string").at(id.to_string()));
        };
        let args = invoker
            .as_object()
            .and_then(|invoker| invoker.get("args"))
            .map_or_else(Vec::new, Value::into_args);
        Ok(Value::Function(create_invoker(id, method, args, wire)))
    });
}

/// A function dispatching `method` with `args` through the proxy of its target:
/// the first call argument, or the receiver when called without arguments.
/// Invocation errors carry `path`.
pub fn create_invoker(
    path: Arc<str>,
    method: Arc<str>,
    args: Vec<Value>,
    wire: WireHandle,
) -> Function {
    Function::new(method.clone(), move |this, call_args: Vec<Value>| {
        let target = call_args.into_iter().next().unwrap_or(this);
        let proxy = wire.get_proxy(target, &path);
        let method = method.clone();
        let args = args.clone();
        async move { proxy.await?.invoke(&method, args).await }
    })
}
