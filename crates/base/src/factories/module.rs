use super::mismatch;
use crate::resolver::Resolver;
use crate::spec::{ComponentDef, FactorySpec};
use crate::wire::WireHandle;
use tracing::debug;

/// Loads the named module and resolves to it unchanged.
pub fn module_factory(resolver: Resolver, component: ComponentDef, wire: WireHandle) {
    let FactorySpec::Module(module) = &component.factory else {
        return resolver.reject(mismatch(&component, "module"));
    };
    debug!(component = %component.id, module = %module.id, "Loading module");
    resolver.settle_with(wire.load_module(&module.id, &component.spec));
}
