//! Factories: strategies that turn a component spec into a value.

pub mod clone;
pub mod compose;
pub mod create;
pub mod invoker;
pub mod literal;
pub mod module;
pub mod prototype;

use crate::config::PluginOptions;
use crate::error::WireError;
use crate::resolver::Resolver;
use crate::spec::ComponentDef;
use crate::wire::WireHandle;
use fxhash::FxHashMap;
use std::sync::Arc;

/// A construction strategy. Must settle the resolver exactly once.
pub trait Factory: Send + Sync {
    fn create(&self, resolver: Resolver, component: ComponentDef, wire: WireHandle);
}

impl<F> Factory for F
where
    F: Fn(Resolver, ComponentDef, WireHandle) + Send + Sync,
{
    fn create(&self, resolver: Resolver, component: ComponentDef, wire: WireHandle) {
        self(resolver, component, wire);
    }
}

pub type FactoryMap = FxHashMap<&'static str, Arc<dyn Factory>>;

pub(crate) fn registry(options: &PluginOptions) -> FactoryMap {
    let mut factories: FactoryMap = FxHashMap::default();
    factories.insert("module", Arc::new(module::module_factory));
    factories.insert("create", Arc::new(create::create_factory));
    factories.insert("literal", Arc::new(literal::literal_factory));
    factories.insert(
        "prototype",
        Arc::new(prototype::PrototypeFactory::new(options.deprecation_warnings)),
    );
    factories.insert("clone", Arc::new(clone::clone_factory));
    factories.insert("compose", Arc::new(compose::compose_factory));
    factories.insert("invoker", Arc::new(invoker::invoker_factory));
    factories
}

/// A factory was dispatched a spec of another kind.
fn mismatch(component: &ComponentDef, expected: &'static str) -> WireError {
    WireError::Internal {
        message: format!(
            "`{expected}` factory dispatched a {} spec",
            component.factory.describe()
        )
        .into(),
        context: Some(component.id.to_string().into()),
    }
}
