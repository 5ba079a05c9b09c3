use crate::error::{Result, WireError};
use crate::facets::Facet;
use crate::value::Value;
use crate::wire::{WireFuture, WireHandle};
use futures::FutureExt;
use futures::future::try_join_all;
use std::sync::Arc;
use tracing::trace;

/// Runs the method calls described by a facet's options.
///
/// A string names one method called without arguments. A map names methods
/// whose argument specs are wired first; those calls run concurrently and the
/// result is the list of their return values in key order. `Null` does nothing.
pub fn invoke_all(facet: Facet, wire: WireHandle) -> WireFuture<Value> {
    match facet.options().clone() {
        Value::Null => futures::future::ready(Ok(Value::Null)).boxed(),
        Value::String(method) => invoke(facet, method, Value::Array(Vec::new()), wire).boxed(),
        Value::Object(methods) => {
            let calls: Vec<_> = methods
                .entries()
                .into_iter()
                .map(|(method, args)| invoke(facet.clone(), method, args, wire.clone()))
                .collect();
            async move { Ok(Value::Array(try_join_all(calls).await?)) }.boxed()
        },
        other => {
            let err = WireError::configuration(format!(
                "expected a method name or a map of methods to arguments, got {}",
                other.type_name()
            ))
            .at(facet.path().to_owned());
            futures::future::ready(Err(err)).boxed()
        },
    }
}

async fn invoke(facet: Facet, method: Arc<str>, args: Value, wire: WireHandle) -> Result<Value> {
    let args = wire.wire(args).await?.into_args();
    trace!(path = facet.path(), method = %method, args = args.len(), "Invoking");
    facet.invoke(&method, args).await
}
