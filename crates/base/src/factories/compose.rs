use super::mismatch;
use crate::error::{Result, WireError};
use crate::pipeline;
use crate::resolver::Resolver;
use crate::spec::{ComponentDef, ComposeSpec, FactorySpec};
use crate::value::{Function, Value};
use crate::wire::WireHandle;
use tracing::debug;

/// Builds a composed function from a pipeline expression or a list of functions.
pub fn compose_factory(resolver: Resolver, component: ComponentDef, wire: WireHandle) {
    let FactorySpec::Compose(compose) = &component.factory else {
        return resolver.reject(mismatch(&component, "compose"));
    };
    let id = component.id.clone();
    debug!(component = %id, "Composing functions");

    match compose.clone() {
        ComposeSpec::Pipeline(expr) => {
            resolver.settle_with(async move {
                pipeline::parse(&id, &expr, &wire).await.map_err(|err| err.at(id.to_string()))
            });
        },
        ComposeSpec::Elements(elements) => {
            let elements = wire.wire(elements);
            resolver.settle_with(async move {
                let functions = elements
                    .await?
                    .into_args()
                    .into_iter()
                    .map(|element| match element {
                        Value::Function(function) => Ok(function),
                        other => Err(WireError::configuration(format!(
                            "compose elements must be functions, got {}",
                            other.type_name()
                        ))
                        .at(id.to_string())),
                    })
                    .collect::<Result<Vec<Function>>>()?;
                pipeline::compose(id.clone(), functions)
                    .map(Value::Function)
                    .map_err(|err| err.at(id.to_string()))
            });
        },
    }
}
