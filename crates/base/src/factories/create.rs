use super::mismatch;
use crate::error::{Result, WireError};
use crate::resolver::Resolver;
use crate::spec::{ComponentDef, CreateSpec, FactorySpec};
use crate::value::{Object, Value};
use crate::wire::WireHandle;
use futures::FutureExt;
use tracing::debug;

/// Instantiates a module: constructs or calls a function, extends an object.
///
/// Module resolution and argument wiring run concurrently; both settle before
/// instantiation.
pub fn create_factory(resolver: Resolver, component: ComponentDef, wire: WireHandle) {
    let FactorySpec::Create(create) = &component.factory else {
        return resolver.reject(mismatch(&component, "create"));
    };

    let (module, args, is_constructor) = match create {
        CreateSpec::Named(name) => (wire.wire(module_spec(name)), None, false),
        CreateSpec::Reference(reference) => (wire.wire(reference.clone()), None, false),
        CreateSpec::Module { module, args, is_constructor } => (
            wire.wire(module_spec(module)),
            args.clone().map(|args| wire.wire(Value::Array(args.into_args()))),
            *is_constructor,
        ),
        CreateSpec::Direct(module) => (futures::future::ready(Ok(module.clone())).boxed(), None, false),
    };
    let id = component.id.clone();
    debug!(component = %id, is_constructor, "Creating instance");

    resolver.settle_with(async move {
        let args = async move {
            match args {
                Some(args) => args.await.map(Value::into_args),
                None => Ok(Vec::new()),
            }
        };
        let (module, args) = futures::try_join!(module, args)?;
        instantiate(&id, module, args, is_constructor).await
    });
}

fn module_spec(name: &str) -> Value {
    Value::Object(Object::from_entries([("module", Value::from(name))]))
}

async fn instantiate(id: &str, module: Value, args: Vec<Value>, is_constructor: bool) -> Result<Value> {
    match module {
        Value::Function(function) if is_constructor => function.construct(args).await,
        Value::Function(function) => function.call(Value::Null, args).await,
        Value::Object(base) => Ok(Value::Object(Object::extend(&base))),
        other => Err(WireError::configuration(format!(
            "cannot create an instance from a {}",
            other.type_name()
        ))
        .at(id.to_owned())),
    }
}
