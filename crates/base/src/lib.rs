//! # Weave base plugin
//!
//! Factories and facets for assembling a graph of live components from a
//! declarative spec.
//!
//! * **Factories** build a component from its spec: `module`, `create`,
//!   `literal`, `prototype`, `clone`, `compose` and `invoker`.
//! * **Facets** decorate a built component during a lifecycle [`Phase`]:
//!   `properties`, `mixin` (and the deprecated `introduce`), `init`, `ready`
//!   and `destroy`.
//! * The **destroy registry** collects teardown steps and runs them in
//!   registration order when the context is destroyed.
//!
//! Every handler receives a [`Resolver`] that it settles exactly once, plus the
//! assembler's [`Wire`] capability. [`LocalContext`] is a small assembler that
//! drives the plugin over an in-memory module table.
//!
//! ## Usage
//! ```rust,ignore
//! use serde_json::json;
//! use weave_base::{LocalContext, PluginOptions, Value};
//!
//! let context = LocalContext::new(&PluginOptions::default());
//! context.register_module("greeter", Value::from(json!({ "greeting": "hello" })));
//!
//! let components = context
//!     .wire_context(Value::from(json!({
//!         "greeter": { "create": "greeter", "properties": { "name": "weave" } },
//!     })))
//!     .await?;
//!
//! context.destroy().await?;
//! ```

pub mod config;
pub mod destroy;
pub mod error;
pub mod factories;
pub mod facets;
pub mod invoke;
pub mod lifecycle;
pub mod local;
pub mod mixin;
pub mod pipeline;
pub mod plugin;
pub mod proxy;
pub mod resolver;
pub mod spec;
pub mod value;
pub mod wire;

pub use config::{DestroyOptions, PluginOptions, load_options};
pub use destroy::{DestroyFn, DestroyRegistry};
pub use error::{Result, WireError, WireErrorExt};
pub use factories::Factory;
pub use facets::{Facet, FacetHandler, FacetPhases, Phase};
pub use invoke::invoke_all;
pub use lifecycle::{LifecycleSignal, SignalTrigger, signal};
pub use local::LocalContext;
pub use plugin::{Plugin, wire_plugin};
pub use proxy::ObjectProxy;
pub use resolver::{Deferred, Resolver, resolver};
pub use spec::{ComponentDef, FactorySpec};
pub use value::{Function, Object, Value};
pub use wire::{Proxy, Wire, WireFuture, WireHandle};
