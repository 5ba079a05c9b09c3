use super::{Facet, FacetHandler};
use crate::destroy::{DestroyFn, DestroyRegistry};
use crate::invoke::invoke_all;
use crate::resolver::Resolver;
use crate::value::Value;
use crate::wire::WireHandle;
use futures::FutureExt;
use std::sync::Arc;
use tracing::debug;

/// Registers the configured methods for the context's teardown. Nothing runs now.
#[derive(Debug, Clone)]
pub struct DestroyFacet {
    registry: Arc<DestroyRegistry>,
}

impl DestroyFacet {
    #[must_use]
    pub const fn new(registry: Arc<DestroyRegistry>) -> Self {
        Self { registry }
    }
}

impl FacetHandler for DestroyFacet {
    fn apply(&self, resolver: Resolver, facet: Facet, wire: WireHandle) {
        let path: Arc<str> = facet.path().into();
        debug!(path = %path, "Registering destroy handler");
        let teardown: DestroyFn =
            Box::new(move || invoke_all(facet, wire).map(|outcome| outcome.map(drop)).boxed());
        match self.registry.register(path, teardown) {
            Ok(()) => resolver.resolve(Value::Null),
            Err(err) => resolver.reject(err),
        }
    }
}
