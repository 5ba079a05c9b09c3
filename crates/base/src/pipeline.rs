//! Function composition and the `compose` pipeline expression.
//!
//! An expression such as `"parse | validator.check | .normalize"` splits on `|`
//! and whitespace into segments:
//!
//! * `name`: a referenced component that must be a function;
//! * `name.method`: `method` of the referenced component, bound through its proxy;
//! * `.method`: `method` of the first call argument, given the remaining arguments.

use crate::error::{Result, WireError};
use crate::value::{Function, Value};
use crate::wire::WireHandle;
use std::sync::Arc;
use tracing::trace;

/// Composes `functions` left to right: the first receives every call argument,
/// each later one the previous result. `compose([f, g, h])(x) == h(g(f(x)))`.
///
/// # Errors
/// Returns [`WireError::Configuration`] for an empty list.
pub fn compose(name: impl Into<Arc<str>>, functions: Vec<Function>) -> Result<Function> {
    if functions.is_empty() {
        return Err(WireError::configuration("cannot compose an empty list of functions"));
    }
    let stages: Arc<[Function]> = functions.into();
    Ok(Function::new(name, move |this, args| {
        let stages = stages.clone();
        async move {
            let Some((first, rest)) = stages.split_first() else {
                return Ok(Value::Null);
            };
            let mut result = first.call(this.clone(), args).await?;
            for stage in rest {
                result = stage.call(this.clone(), vec![result]).await?;
            }
            Ok(result)
        }
    }))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
    Reference(&'a str),
    Method { target: &'a str, method: &'a str },
    Receiver(&'a str),
}

fn segments(expr: &str) -> Result<Vec<Segment<'_>>> {
    expr.split(|c: char| c == '|' || c.is_whitespace())
        .filter(|segment| !segment.is_empty())
        .map(parse_segment)
        .collect()
}

fn parse_segment(segment: &str) -> Result<Segment<'_>> {
    let invalid = || WireError::configuration(format!("invalid compose segment `{segment}`"));
    match segment.split_once('.') {
        None => Ok(Segment::Reference(segment)),
        Some((_, method)) if method.is_empty() || method.contains('.') => Err(invalid()),
        Some(("", method)) => Ok(Segment::Receiver(method)),
        Some((target, method)) => Ok(Segment::Method { target, method }),
    }
}

/// Resolves a pipeline expression of component `id` into one composed function.
///
/// # Errors
/// Fails on malformed segments, unresolvable references, and references that
/// are not functions.
pub async fn parse(id: &str, expr: &str, wire: &WireHandle) -> Result<Value> {
    let segments = segments(expr)?;
    let mut functions = Vec::with_capacity(segments.len());
    for segment in segments {
        trace!(expr, ?segment, "Resolving compose segment");
        functions.push(resolve(id, segment, wire).await?);
    }
    compose(expr.trim(), functions).map(Value::Function)
}

async fn resolve(id: &str, segment: Segment<'_>, wire: &WireHandle) -> Result<Function> {
    match segment {
        Segment::Reference(name) => match wire.resolve_ref(name).await? {
            Value::Function(function) => Ok(function),
            other => Err(WireError::configuration(format!(
                "`{name}` is a {}, not a function",
                other.type_name()
            ))),
        },
        Segment::Method { target, method } => {
            let value = wire.resolve_ref(target).await?;
            let proxy = wire.get_proxy(value, target).await?;
            let method: Arc<str> = method.into();
            Ok(Function::new(format!("{target}.{method}"), move |_this, args| {
                proxy.invoke(&method, args)
            }))
        },
        Segment::Receiver(method) => {
            let wire = wire.clone();
            let path: Arc<str> = id.into();
            let method: Arc<str> = method.into();
            Ok(Function::new(format!(".{method}"), move |_this, mut args: Vec<Value>| {
                let wire = wire.clone();
                let method = method.clone();
                let path = path.clone();
                async move {
                    if args.is_empty() {
                        return Err(WireError::invocation(format!(
                            "`.{method}` needs a target argument"
                        ))
                        .at(path.to_string()));
                    }
                    let target = args.remove(0);
                    let proxy = wire.get_proxy(target, &path).await?;
                    proxy.invoke(&method, args).await
                }
            }))
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arithmetic(name: &'static str, op: fn(i64) -> i64) -> Function {
        Function::sync(name, move |_, args| {
            let x = args.first().and_then(Value::as_i64).ok_or("expected a number")?;
            Ok(Value::from(op(x)))
        })
    }

    #[tokio::test]
    async fn test_compose_folds_left_to_right() {
        let f = arithmetic("f", |x| x + 1);
        let g = arithmetic("g", |x| x * 2);
        let h = arithmetic("h", |x| x - 3);

        let composed = compose("fgh", vec![f, g, h]).expect("non-empty");

        // h(g(f(5))) = (5 + 1) * 2 - 3
        assert_eq!(composed.call(Value::Null, vec![Value::from(5)]).await, Ok(Value::from(9)));
    }

    #[test]
    fn test_empty_compose_is_rejected() {
        assert_eq!(compose("none", vec![]).expect_err("empty").kind(), "Configuration");
    }

    #[test]
    fn test_segments() {
        assert_eq!(
            segments(" parse |validator.check|  .normalize ").expect("valid"),
            vec![
                Segment::Reference("parse"),
                Segment::Method { target: "validator", method: "check" },
                Segment::Receiver("normalize"),
            ]
        );
        assert!(segments("a.b.c").is_err());
        assert!(segments("a.").is_err());
        assert!(segments("a b").is_ok_and(|s| s.len() == 2));
    }
}
