use super::mismatch;
use crate::resolver::Resolver;
use crate::spec::{ComponentDef, FactorySpec};
use crate::wire::WireHandle;

/// Resolves to the `literal` value as given, keys like `create` included.
pub fn literal_factory(resolver: Resolver, component: ComponentDef, _wire: WireHandle) {
    match component.factory {
        FactorySpec::Literal(value) => resolver.resolve(value),
        _ => resolver.reject(mismatch(&component, "literal")),
    }
}
