//! A single-context assembler driving the plugin.
//!
//! [`LocalContext`] implements [`Wire`] over an in-memory module table and the
//! components of one spec. Factories are selected by spec key, facets run phase
//! by phase. References are `{"$ref": "name"}` tokens naming top-level
//! components; reference cycles are not detected and never settle.

use crate::config::PluginOptions;
use crate::error::{Result, WireError};
use crate::facets::{Facet, FacetPhases, Phase};
use crate::lifecycle::{SignalTrigger, signal};
use crate::plugin::{Plugin, wire_plugin};
use crate::proxy::ObjectProxy;
use crate::resolver::resolver;
use crate::spec::{ComponentDef, FactorySpec};
use crate::value::{Object, Value};
use crate::wire::{Proxy, Wire, WireFuture, WireHandle};
use futures::FutureExt;
use futures::future::{Shared, try_join_all};
use fxhash::FxHashMap;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info, trace};

/// Key of a reference token.
pub const REF_KEY: &str = "$ref";

type ProxyProvider = dyn Fn(&Value, &str) -> Option<Arc<dyn Proxy>> + Send + Sync;

struct ContextInner {
    plugin: Plugin,
    ready: SignalTrigger,
    destroyed: SignalTrigger,
    modules: RwLock<FxHashMap<Arc<str>, Value>>,
    components: RwLock<FxHashMap<Arc<str>, Shared<WireFuture<Value>>>>,
    proxies: RwLock<Option<Arc<ProxyProvider>>>,
    anonymous: AtomicUsize,
}

/// One wiring context. Cheap to clone; clones share the same components.
#[derive(Clone)]
pub struct LocalContext {
    inner: Arc<ContextInner>,
}

impl LocalContext {
    /// Creates a context with its own plugin instance.
    ///
    /// # Panics
    /// Must be called within a Tokio runtime.
    #[must_use]
    pub fn new(options: &PluginOptions) -> Self {
        let (ready, ready_signal) = signal();
        let (destroyed, destroyed_signal) = signal();
        let plugin = wire_plugin(ready_signal, destroyed_signal, options);
        Self {
            inner: Arc::new(ContextInner {
                plugin,
                ready,
                destroyed,
                modules: RwLock::default(),
                components: RwLock::default(),
                proxies: RwLock::default(),
                anonymous: AtomicUsize::new(0),
            }),
        }
    }

    /// Makes `value` loadable as module `id`.
    pub fn register_module(&self, id: impl Into<Arc<str>>, value: impl Into<Value>) {
        self.inner.modules.write().insert(id.into(), value.into());
    }

    /// Installs a proxy provider consulted before the default [`ObjectProxy`].
    #[must_use]
    pub fn with_proxy_provider<F>(self, provider: F) -> Self
    where
        F: Fn(&Value, &str) -> Option<Arc<dyn Proxy>> + Send + Sync + 'static,
    {
        *self.inner.proxies.write() = Some(Arc::new(provider));
        self
    }

    #[must_use]
    pub fn plugin(&self) -> &Plugin {
        &self.inner.plugin
    }

    /// Wires every top-level component of `spec` and fires the ready signal.
    ///
    /// All components are registered before any is built, so references may
    /// point forward.
    ///
    /// # Errors
    /// The first component failure.
    pub async fn wire_context(&self, spec: Value) -> Result<Object> {
        let Value::Object(spec) = spec else {
            return Err(WireError::configuration(format!(
                "context spec must be an object, got {}",
                spec.type_name()
            )));
        };
        let entries = spec.entries();
        {
            let mut components = self.inner.components.write();
            for (name, component) in &entries {
                let build = self.clone().create_component(name.clone(), component.clone());
                components.insert(name.clone(), build.boxed().shared());
            }
        }
        info!(components = entries.len(), "Wiring context");

        let names: Vec<Arc<str>> = entries.into_iter().map(|(name, _)| name).collect();
        let values = try_join_all(names.iter().map(|name| self.resolve_ref(name))).await?;
        let context = Object::from_entries(names.into_iter().zip(values));

        self.inner.ready.fire();
        Ok(context)
    }

    /// Fires the destroyed signal, waits for the destroy handlers and releases
    /// the components.
    ///
    /// # Errors
    /// The teardown outcome reported by the plugin.
    pub async fn destroy(&self) -> Result<()> {
        self.inner.destroyed.fire();
        let outcome = self.inner.plugin.teardown().await;
        self.inner.components.write().clear();
        outcome
    }

    async fn create_component(self, id: Arc<str>, spec: Value) -> Result<Value> {
        let wire: WireHandle = Arc::new(self.clone());
        let component = ComponentDef::parse(id.clone(), spec, wire.as_ref())?;
        debug!(component = %id, factory = component.factory.describe(), "Creating component");

        let value = match &component.factory {
            FactorySpec::Reference(token) => return self.resolve_token(token).await,
            FactorySpec::Plain(spec) => return self.wire_plain(spec.clone()).await,
            factory => {
                let key = factory.key().unwrap_or_default();
                let handler = self.inner.plugin.factory(key).ok_or_else(|| {
                    WireError::configuration(format!("no factory registered for `{key}`"))
                        .at(id.to_string())
                })?;
                let (resolver, deferred) = resolver(id.clone());
                handler.create(resolver, component.clone(), wire.clone());
                deferred.await?
            },
        };

        self.apply_facets(&id, &component.spec, value, &wire).await
    }

    async fn apply_facets(
        &self,
        id: &Arc<str>,
        spec: &Value,
        value: Value,
        wire: &WireHandle,
    ) -> Result<Value> {
        let Some(spec) = spec.as_object() else {
            return Ok(value);
        };
        let facets: Vec<(Arc<str>, Value, FacetPhases)> = spec
            .entries()
            .into_iter()
            .filter_map(|(key, options)| {
                self.inner.plugin.facet(&key).map(|phases| (key, options, phases.clone()))
            })
            .collect();
        if facets.is_empty() {
            return Ok(value);
        }

        let proxy = self.proxy_for(&value, id);
        for phase in Phase::ALL {
            for (key, options, phases) in &facets {
                let Some(handler) = phases.get(&phase) else {
                    continue;
                };
                trace!(component = %id, facet = %key, phase = phase.as_str(), "Applying facet");
                let (resolver, deferred) = resolver(format!("{id}.{key}"));
                handler.apply(resolver, Facet::new(options.clone(), proxy.clone()), wire.clone());
                deferred.await?;
            }
        }
        Ok(value)
    }

    fn wire_plain(&self, spec: Value) -> WireFuture<Value> {
        match spec {
            Value::Array(items) => {
                let items: Vec<_> = items.into_iter().map(|item| self.wire(item)).collect();
                async move { try_join_all(items).await.map(Value::Array) }.boxed()
            },
            Value::Object(object) => {
                let (keys, specs): (Vec<_>, Vec<_>) = object.entries().into_iter().unzip();
                let values: Vec<_> = specs.into_iter().map(|spec| self.wire(spec)).collect();
                async move {
                    let values = try_join_all(values).await?;
                    Ok(Value::Object(Object::from_entries(keys.into_iter().zip(values))))
                }
                .boxed()
            },
            other => futures::future::ready(Ok(other)).boxed(),
        }
    }

    fn resolve_token(&self, token: &Value) -> WireFuture<Value> {
        match token.as_object().and_then(|token| token.get_own(REF_KEY)) {
            Some(Value::String(name)) => self.resolve_ref(&name),
            _ => futures::future::ready(Err(WireError::configuration(
                "reference token must name a component",
            )))
            .boxed(),
        }
    }

    fn proxy_for(&self, value: &Value, path: &str) -> Arc<dyn Proxy> {
        let provider = self.inner.proxies.read().clone();
        if let Some(proxy) = provider.and_then(|provider| provider(value, path)) {
            return proxy;
        }
        Arc::new(ObjectProxy::new(value.clone(), path))
    }
}

impl Wire for LocalContext {
    fn wire(&self, spec: Value) -> WireFuture<Value> {
        let n = self.inner.anonymous.fetch_add(1, Ordering::Relaxed);
        self.clone().create_component(format!("_anon{n}").into(), spec).boxed()
    }

    fn resolve_ref(&self, name: &str) -> WireFuture<Value> {
        let component = self.inner.components.read().get(name).cloned();
        match component {
            Some(component) => component.boxed(),
            None => futures::future::ready(Err(WireError::resolution(format!(
                "no component named `{name}`"
            ))))
            .boxed(),
        }
    }

    fn get_proxy(&self, value: Value, path: &str) -> WireFuture<Arc<dyn Proxy>> {
        let proxy = self.proxy_for(&value, path);
        futures::future::ready(Ok(proxy)).boxed()
    }

    fn load_module(&self, id: &str, _spec: &Value) -> WireFuture<Value> {
        let module = self.inner.modules.read().get(id).cloned();
        let result = module
            .ok_or_else(|| WireError::resolution(format!("unknown module `{id}`")));
        futures::future::ready(result).boxed()
    }

    fn is_ref(&self, value: &Value) -> bool {
        value.as_object().is_some_and(|object| {
            object.len() == 1 && matches!(object.get_own(REF_KEY), Some(Value::String(_)))
        })
    }
}

impl fmt::Debug for LocalContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalContext")
            .field("plugin", &self.inner.plugin)
            .field("modules", &self.inner.modules.read().len())
            .field("components", &self.inner.components.read().len())
            .finish_non_exhaustive()
    }
}
