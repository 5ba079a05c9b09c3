//! Plugin registration: the factory and facet registries of one context.

use crate::config::PluginOptions;
use crate::destroy::DestroyRegistry;
use crate::error::{Result, WireError};
use crate::factories::{self, Factory, FactoryMap};
use crate::facets::destroy::DestroyFacet;
use crate::facets::lifecycle::invoker_facet;
use crate::facets::mixin::MixinFacet;
use crate::facets::properties::properties_facet;
use crate::facets::{FacetHandler, FacetPhases, Phase};
use crate::lifecycle::LifecycleSignal;
use fxhash::FxHashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

type TeardownOutcome = Option<Result<()>>;

/// Factories and facets registered for one context, plus its destroy bookkeeping.
pub struct Plugin {
    pub factories: FactoryMap,
    pub facets: FxHashMap<&'static str, FacetPhases>,
    registry: Arc<DestroyRegistry>,
    teardown: watch::Receiver<TeardownOutcome>,
}

/// Registers the base plugin for one context.
///
/// Subscribes once to `destroyed`: when it fires, the destroy handlers
/// registered through the `destroy` facet run in registration order. The base
/// plugin does no work on `ready`.
///
/// # Panics
/// Spawns the teardown task, so it must be called within a Tokio runtime.
#[must_use]
pub fn wire_plugin(
    _ready: LifecycleSignal,
    destroyed: LifecycleSignal,
    options: &PluginOptions,
) -> Plugin {
    let registry = Arc::new(DestroyRegistry::new());
    let (outcome_tx, teardown) = watch::channel(None);

    let continue_on_error = options.destroy.continue_on_error;
    tokio::spawn({
        let registry = registry.clone();
        async move {
            if !destroyed.fired().await {
                debug!("Destroy signal dropped before firing, skipping teardown");
                return;
            }
            let outcome = registry.drain(continue_on_error).await;
            match &outcome {
                Ok(()) => info!("Context destroyed"),
                Err(err) => warn!(kind = err.kind(), error = %err, "Context teardown failed"),
            }
            outcome_tx.send_replace(Some(outcome));
        }
    });

    let mut facets = FxHashMap::default();
    facets.insert("properties", phase(Phase::Configure, Arc::new(properties_facet)));
    facets.insert(
        "mixin",
        phase(Phase::Configure, Arc::new(MixinFacet::new(options.deprecation_warnings))),
    );
    facets.insert(
        "introduce",
        phase(
            Phase::Configure,
            Arc::new(MixinFacet::deprecated_alias("introduce", options.deprecation_warnings)),
        ),
    );
    facets.insert("init", phase(Phase::Initialize, Arc::new(invoker_facet)));
    facets.insert("ready", phase(Phase::Ready, Arc::new(invoker_facet)));
    facets.insert("destroy", phase(Phase::Ready, Arc::new(DestroyFacet::new(registry.clone()))));

    Plugin { factories: factories::registry(options), facets, registry, teardown }
}

fn phase(phase: Phase, handler: Arc<dyn FacetHandler>) -> FacetPhases {
    let mut phases = FacetPhases::default();
    phases.insert(phase, handler);
    phases
}

impl Plugin {
    #[must_use]
    pub fn factory(&self, name: &str) -> Option<Arc<dyn Factory>> {
        self.factories.get(name).cloned()
    }

    #[must_use]
    pub fn facet(&self, name: &str) -> Option<&FacetPhases> {
        self.facets.get(name)
    }

    /// Destroy handlers registered and not yet run.
    #[must_use]
    pub fn pending_teardowns(&self) -> usize {
        self.registry.len()
    }

    /// Waits for the destroy drain and returns its outcome.
    ///
    /// # Errors
    /// The first failing destroy handler, or [`WireError::Abandoned`] when the
    /// destroy signal was dropped without firing.
    pub async fn teardown(&self) -> Result<()> {
        let mut outcome = self.teardown.clone();
        match outcome.wait_for(Option::is_some).await {
            Ok(outcome) => outcome.clone().unwrap_or(Ok(())),
            Err(_) => Err(WireError::abandoned("context was never destroyed")),
        }
    }
}

impl fmt::Debug for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut factories: Vec<_> = self.factories.keys().collect();
        factories.sort_unstable();
        let mut facets: Vec<_> = self.facets.keys().collect();
        facets.sort_unstable();
        f.debug_struct("Plugin")
            .field("factories", &factories)
            .field("facets", &facets)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
