use super::{Factory, mismatch};
use crate::error::WireError;
use crate::resolver::Resolver;
use crate::spec::{ComponentDef, FactorySpec};
use crate::value::{Object, Value};
use crate::wire::WireHandle;
use tracing::{debug, warn};

/// Deprecated: a new object delegating to the resolved parent.
#[derive(Debug, Clone, Copy)]
pub struct PrototypeFactory {
    deprecation_warnings: bool,
}

impl PrototypeFactory {
    #[must_use]
    pub const fn new(deprecation_warnings: bool) -> Self {
        Self { deprecation_warnings }
    }
}

impl Factory for PrototypeFactory {
    fn create(&self, resolver: Resolver, component: ComponentDef, wire: WireHandle) {
        let FactorySpec::Prototype(parent) = &component.factory else {
            return resolver.reject(mismatch(&component, "prototype"));
        };
        if self.deprecation_warnings {
            warn!(component = %component.id, "The prototype factory is deprecated, use create instead");
        }
        debug!(component = %component.id, "Extending prototype");

        let parent = match parent {
            Value::String(name) => wire.resolve_ref(name),
            other => wire.wire(other.clone()),
        };
        let id = component.id;
        resolver.settle_with(async move {
            match parent.await? {
                Value::Object(parent) => Ok(Value::Object(Object::extend(&parent))),
                Value::Null => Ok(Value::Object(Object::new())),
                other => Err(WireError::configuration(format!(
                    "prototype parent must be an object, got {}",
                    other.type_name()
                ))
                .at(id.to_string())),
            }
        });
    }
}
