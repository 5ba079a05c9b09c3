use super::{Facet, FacetHandler};
use crate::mixin::mixin;
use crate::resolver::Resolver;
use crate::value::Value;
use crate::wire::WireHandle;
use tracing::{debug, warn};

/// Merges introductions into the target one after another.
///
/// Each introduction is a reference name or a nested spec; later ones observe
/// the merges of earlier ones. Resolves with the target.
#[derive(Debug, Clone, Copy)]
pub struct MixinFacet {
    alias: Option<&'static str>,
    deprecation_warnings: bool,
}

impl MixinFacet {
    #[must_use]
    pub const fn new(deprecation_warnings: bool) -> Self {
        Self { alias: None, deprecation_warnings }
    }

    /// The same handler registered under a deprecated key.
    #[must_use]
    pub const fn deprecated_alias(alias: &'static str, deprecation_warnings: bool) -> Self {
        Self { alias: Some(alias), deprecation_warnings }
    }
}

impl FacetHandler for MixinFacet {
    fn apply(&self, resolver: Resolver, facet: Facet, wire: WireHandle) {
        if let Some(alias) = self.alias
            && self.deprecation_warnings
        {
            warn!(path = facet.path(), facet = alias, "Deprecated facet, use mixin instead");
        }
        let introductions = facet.options().clone().into_args();
        debug!(path = facet.path(), count = introductions.len(), "Applying mixins");

        resolver.settle_with(async move {
            let mut target = facet.target();
            for introduction in introductions {
                let source = match &introduction {
                    Value::String(name) => wire.resolve_ref(name).await?,
                    other => wire.wire(other.clone()).await?,
                };
                target = mixin(&target, &source).map_err(|err| err.at(facet.path().to_owned()))?;
            }
            Ok(target)
        });
    }
}
