use super::Facet;
use crate::error::WireError;
use crate::resolver::Resolver;
use crate::value::Value;
use crate::wire::WireHandle;
use futures::future::try_join_all;
use tracing::{debug, trace};

/// Wires every property concurrently, then assigns them once all have settled.
pub fn properties_facet(resolver: Resolver, facet: Facet, wire: WireHandle) {
    let Value::Object(properties) = facet.options().clone() else {
        let err = WireError::configuration(format!(
            "properties must be an object, got {}",
            facet.options().type_name()
        ));
        return resolver.reject(err.at(facet.path().to_owned()));
    };
    let (keys, specs): (Vec<_>, Vec<_>) = properties.entries().into_iter().unzip();
    debug!(path = facet.path(), count = keys.len(), "Wiring properties");

    let wirings: Vec<_> = specs.into_iter().map(|spec| wire.wire(spec)).collect();
    resolver.settle_with(async move {
        let values = try_join_all(wirings).await?;
        for (key, value) in keys.into_iter().zip(values) {
            trace!(path = facet.path(), key = %key, "Setting property");
            facet.set(&key, value)?;
        }
        Ok(Value::Null)
    });
}
