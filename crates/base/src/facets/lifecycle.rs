use super::Facet;
use crate::invoke::invoke_all;
use crate::resolver::Resolver;
use crate::wire::WireHandle;
use tracing::debug;

/// Backs `init` and `ready`: invokes the configured methods.
pub fn invoker_facet(resolver: Resolver, facet: Facet, wire: WireHandle) {
    debug!(path = facet.path(), "Invoking lifecycle methods");
    resolver.settle_with(invoke_all(facet, wire));
}
