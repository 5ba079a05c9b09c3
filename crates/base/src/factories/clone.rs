use super::mismatch;
use crate::error::WireError;
use crate::resolver::Resolver;
use crate::spec::{ComponentDef, FactorySpec};
use crate::wire::WireHandle;
use tracing::debug;

/// Resolves the source and copies it through its proxy's clone capability.
pub fn clone_factory(resolver: Resolver, component: ComponentDef, wire: WireHandle) {
    let FactorySpec::Clone(clone) = &component.factory else {
        return resolver.reject(mismatch(&component, "clone"));
    };
    debug!(component = %component.id, "Cloning component");

    let source = wire.wire(clone.source.clone());
    let options = clone.options.clone();
    let id = component.id.clone();
    resolver.settle_with(async move {
        let proxy = wire.get_proxy(source.await?, &id).await?;
        let Some(copy) = proxy.clone_component(&options) else {
            return Err(
                WireError::configuration(format!("No clone function found for {id}"))
                    .at(id.to_string()),
            );
        };
        copy.await
    });
}
