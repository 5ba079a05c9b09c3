//! Facets: phase-scoped behaviours applied to constructed components.

pub mod destroy;
pub mod lifecycle;
pub mod mixin;
pub mod properties;

use crate::error::Result;
use crate::resolver::Resolver;
use crate::value::Value;
use crate::wire::{Proxy, WireFuture, WireHandle};
use fxhash::FxHashMap;
use std::sync::Arc;

/// Lifecycle phases, in the order the assembler runs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Phase {
    Configure,
    Initialize,
    Ready,
}

impl Phase {
    pub const ALL: [Self; 3] = [Self::Configure, Self::Initialize, Self::Ready];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Configure => "configure",
            Self::Initialize => "initialize",
            Self::Ready => "ready",
        }
    }
}

/// One facet application: the facet's options and the component's proxy.
#[derive(Debug, Clone)]
pub struct Facet {
    options: Value,
    proxy: Arc<dyn Proxy>,
}

impl Facet {
    pub fn new(options: Value, proxy: Arc<dyn Proxy>) -> Self {
        Self { options, proxy }
    }

    #[must_use]
    pub const fn options(&self) -> &Value {
        &self.options
    }

    #[must_use]
    pub fn target(&self) -> Value {
        self.proxy.target()
    }

    #[must_use]
    pub fn path(&self) -> &str {
        self.proxy.path()
    }

    #[must_use]
    pub const fn proxy(&self) -> &Arc<dyn Proxy> {
        &self.proxy
    }

    /// # Errors
    /// Propagates the proxy's refusal to hold `key`.
    pub fn set(&self, key: &str, value: Value) -> Result<()> {
        self.proxy.set(key, value)
    }

    pub fn invoke(&self, method: &str, args: Vec<Value>) -> WireFuture<Value> {
        self.proxy.invoke(method, args)
    }
}

/// A facet handler. Must settle the resolver exactly once.
pub trait FacetHandler: Send + Sync {
    fn apply(&self, resolver: Resolver, facet: Facet, wire: WireHandle);
}

impl<F> FacetHandler for F
where
    F: Fn(Resolver, Facet, WireHandle) + Send + Sync,
{
    fn apply(&self, resolver: Resolver, facet: Facet, wire: WireHandle) {
        self(resolver, facet, wire);
    }
}

/// Handlers of one facet key, by phase.
pub type FacetPhases = FxHashMap<Phase, Arc<dyn FacetHandler>>;
