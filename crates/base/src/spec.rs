//! Component specs, classified once into the factory that builds them.

use crate::error::{Result, WireError};
use crate::value::{Object, Value};
use crate::wire::Wire;
use std::sync::Arc;

/// Factory keys in the order they are probed on a spec.
pub const FACTORY_KEYS: [&str; 7] =
    ["literal", "module", "create", "prototype", "clone", "compose", "invoker"];

/// One component: its id, the raw spec, and the factory it selects.
#[derive(Debug, Clone)]
pub struct ComponentDef {
    pub id: Arc<str>,
    pub spec: Value,
    pub factory: FactorySpec,
}

#[derive(Debug, Clone)]
pub enum FactorySpec {
    /// `literal`: the value, uninterpreted.
    Literal(Value),
    /// The whole spec is a reference token.
    Reference(Value),
    Module(ModuleSpec),
    Create(CreateSpec),
    /// `prototype`: the parent spec or reference name.
    Prototype(Value),
    Clone(CloneSpec),
    Compose(ComposeSpec),
    /// `invoker`: the nested `{method, args}` spec.
    Invoker(Value),
    /// No factory key; wired structurally by the assembler.
    Plain(Value),
}

#[derive(Debug, Clone)]
pub struct ModuleSpec {
    pub id: Arc<str>,
}

#[derive(Debug, Clone)]
pub enum CreateSpec {
    /// `create: "name"`, shorthand for `{module: "name"}`.
    Named(Arc<str>),
    /// `create: <reference>`; the referenced value is the module.
    Reference(Value),
    /// Falsy `args` (`null`, `false`, `0`, `""`) mean no arguments.
    Module { module: Arc<str>, args: Option<Value>, is_constructor: bool },
    /// Anything else is used as the module without loading.
    Direct(Value),
}

#[derive(Debug, Clone)]
pub struct CloneSpec {
    pub source: Value,
    /// Options for the proxy's clone capability, `source` removed.
    pub options: Value,
}

#[derive(Debug, Clone)]
pub enum ComposeSpec {
    Pipeline(Arc<str>),
    Elements(Value),
}

impl FactorySpec {
    /// Registry key of the factory, `None` for references and plain values.
    #[must_use]
    pub const fn key(&self) -> Option<&'static str> {
        match self {
            Self::Literal(_) => Some("literal"),
            Self::Module(_) => Some("module"),
            Self::Create(_) => Some("create"),
            Self::Prototype(_) => Some("prototype"),
            Self::Clone(_) => Some("clone"),
            Self::Compose(_) => Some("compose"),
            Self::Invoker(_) => Some("invoker"),
            Self::Reference(_) | Self::Plain(_) => None,
        }
    }

    #[must_use]
    pub const fn describe(&self) -> &'static str {
        match self.key() {
            Some(key) => key,
            None => match self {
                Self::Reference(_) => "reference",
                _ => "plain",
            },
        }
    }
}

impl ComponentDef {
    /// Classifies `spec`. References are detected through [`Wire::is_ref`].
    ///
    /// # Errors
    /// Returns [`WireError::Configuration`] when a factory key carries a value
    /// of the wrong shape.
    pub fn parse(id: impl Into<Arc<str>>, spec: Value, wire: &dyn Wire) -> Result<Self> {
        let id = id.into();
        let factory = classify(&id, &spec, wire)?;
        Ok(Self { id, spec, factory })
    }
}

fn classify(id: &Arc<str>, spec: &Value, wire: &dyn Wire) -> Result<FactorySpec> {
    if wire.is_ref(spec) {
        return Ok(FactorySpec::Reference(spec.clone()));
    }
    let Some(object) = spec.as_object() else {
        return Ok(FactorySpec::Plain(spec.clone()));
    };
    let Some((key, value)) =
        FACTORY_KEYS.iter().find_map(|key| object.get_own(key).map(|value| (*key, value)))
    else {
        return Ok(FactorySpec::Plain(spec.clone()));
    };

    let factory = match key {
        "literal" => FactorySpec::Literal(value),
        "module" => match value {
            Value::String(module) => FactorySpec::Module(ModuleSpec { id: module }),
            other => return Err(shape_error(id, "module", "a string", &other)),
        },
        "create" => FactorySpec::Create(classify_create(id, value, wire)?),
        "prototype" => FactorySpec::Prototype(value),
        "clone" => FactorySpec::Clone(classify_clone(value, wire)),
        "compose" => match value {
            Value::String(expr) => FactorySpec::Compose(ComposeSpec::Pipeline(expr)),
            other => FactorySpec::Compose(ComposeSpec::Elements(other)),
        },
        _ => FactorySpec::Invoker(value),
    };
    Ok(factory)
}

fn classify_create(id: &Arc<str>, create: Value, wire: &dyn Wire) -> Result<CreateSpec> {
    if let Value::String(name) = create {
        return Ok(CreateSpec::Named(name));
    }
    if wire.is_ref(&create) {
        return Ok(CreateSpec::Reference(create));
    }
    let Some(object) = create.as_object().cloned() else {
        return Ok(CreateSpec::Direct(create));
    };
    match object.get_own("module") {
        Some(Value::String(module)) => Ok(CreateSpec::Module {
            module,
            args: object.get_own("args").filter(Value::is_truthy),
            is_constructor: object.get_own("isConstructor").is_some_and(|flag| flag.is_truthy()),
        }),
        Some(other) => Err(shape_error(id, "create.module", "a string", &other)),
        None => Ok(CreateSpec::Direct(create)),
    }
}

fn classify_clone(clone: Value, wire: &dyn Wire) -> CloneSpec {
    let Some(object) = clone.as_object().cloned() else {
        return CloneSpec { source: clone, options: Value::Object(Object::new()) };
    };
    match object.get_own("source") {
        Some(source) if wire.is_ref(&source) => {
            let options = Object::from_entries(
                object.entries().into_iter().filter(|(key, _)| key.as_ref() != "source"),
            );
            CloneSpec { source, options: Value::Object(options) }
        },
        _ => CloneSpec { source: clone, options: Value::Object(Object::new()) },
    }
}

fn shape_error(id: &str, key: &str, expected: &str, got: &Value) -> WireError {
    WireError::configuration(format!("`{key}` must be {expected}, got {}", got.type_name()))
        .at(id.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::{Proxy, WireFuture};
    use futures::FutureExt;
    use serde_json::json;

    /// Recognizes `{"$ref": ...}` and nothing else.
    struct RefOnly;

    impl Wire for RefOnly {
        fn wire(&self, _spec: Value) -> WireFuture<Value> {
            futures::future::ready(Ok(Value::Null)).boxed()
        }

        fn resolve_ref(&self, _name: &str) -> WireFuture<Value> {
            futures::future::ready(Ok(Value::Null)).boxed()
        }

        fn get_proxy(&self, _value: Value, _path: &str) -> WireFuture<Arc<dyn Proxy>> {
            futures::future::ready(Err(WireError::resolution("no proxies"))).boxed()
        }

        fn load_module(&self, _id: &str, _spec: &Value) -> WireFuture<Value> {
            futures::future::ready(Ok(Value::Null)).boxed()
        }

        fn is_ref(&self, value: &Value) -> bool {
            value.as_object().is_some_and(|object| object.has_own("$ref"))
        }
    }

    fn parse(spec: serde_json::Value) -> Result<FactorySpec> {
        ComponentDef::parse("subject", Value::from(spec), &RefOnly).map(|def| def.factory)
    }

    #[test]
    fn test_literal_wins_over_other_keys() {
        let factory = parse(json!({ "literal": { "create": "x" }, "create": "y" })).expect("parse");
        assert!(matches!(factory, FactorySpec::Literal(Value::Object(_))));
    }

    #[test]
    fn test_create_shapes() {
        assert!(matches!(parse(json!({ "create": "Widget" })), Ok(FactorySpec::Create(CreateSpec::Named(_)))));
        assert!(matches!(
            parse(json!({ "create": { "$ref": "proto" } })),
            Ok(FactorySpec::Create(CreateSpec::Reference(_)))
        ));
        assert!(matches!(
            parse(json!({ "create": { "module": "M", "args": [1, 2], "isConstructor": true } })),
            Ok(FactorySpec::Create(CreateSpec::Module { is_constructor: true, args: Some(_), .. }))
        ));
        assert!(matches!(
            parse(json!({ "create": { "module": "M", "args": null } })),
            Ok(FactorySpec::Create(CreateSpec::Module { args: None, .. }))
        ));
        assert!(matches!(
            parse(json!({ "create": { "x": 1 } })),
            Ok(FactorySpec::Create(CreateSpec::Direct(_)))
        ));

        let err = parse(json!({ "create": { "module": 5 } })).expect_err("bad module");
        assert_eq!(err.kind(), "Configuration");
        assert!(err.to_string().contains("subject"));
    }

    #[test]
    fn test_clone_strips_source_from_options() {
        let Ok(FactorySpec::Clone(clone)) =
            parse(json!({ "clone": { "source": { "$ref": "a" }, "depth": 2 } }))
        else {
            panic!("expected a clone spec");
        };
        let options = clone.options.as_object().cloned().expect("options object");
        assert_eq!(options.keys().len(), 1);
        assert_eq!(options.get("depth"), Some(Value::from(2)));

        let Ok(FactorySpec::Clone(bare)) = parse(json!({ "clone": { "$ref": "a" } })) else {
            panic!("expected a clone spec");
        };
        assert!(bare.source.as_object().is_some_and(|o| o.has_own("$ref")));
        assert_eq!(bare.options.as_object().map(Object::len), Some(0));
    }

    #[test]
    fn test_plain_and_reference() {
        assert!(matches!(parse(json!({ "$ref": "a" })), Ok(FactorySpec::Reference(_))));
        assert!(matches!(parse(json!({ "name": "x" })), Ok(FactorySpec::Plain(_))));
        assert!(matches!(parse(json!(42)), Ok(FactorySpec::Plain(_))));
        assert!(matches!(
            parse(json!({ "compose": "a | b.run" })),
            Ok(FactorySpec::Compose(ComposeSpec::Pipeline(_)))
        ));
    }
}
