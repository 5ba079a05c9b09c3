mod fixtures;

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use serde_json::json;
    use std::time::Duration;
    use weave_base::*;

    #[tokio::test]
    async fn test_properties_wait_for_every_wiring() {
        let context = context();
        let (open, gate) = gate();
        let target = Object::new();
        context.register_module("gate", gate);
        context.register_module("target", Value::Object(target.clone()));

        let wiring = tokio::spawn({
            let context = context.clone();
            async move {
                context
                    .wire_context(spec(json!({
                        "slow": { "create": { "module": "gate" } },
                        "subject": {
                            "module": "target",
                            "properties": { "a": { "$ref": "slow" }, "b": 5 },
                        },
                    })))
                    .await
            }
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!target.has_own("a"));
        assert!(!target.has_own("b"), "`b` is wired but must wait for `a`");

        open.send(Value::from("late")).expect("gate receiver alive");
        wiring.await.expect("wiring task").expect("wire");

        assert_eq!(target.get("a"), Some(Value::from("late")));
        assert_eq!(target.get("b"), Some(Value::from(5)));
    }

    #[tokio::test]
    async fn test_properties_reject_on_first_failure() {
        let context = context();
        let target = Object::new();
        context.register_module("target", Value::Object(target.clone()));

        let err = context
            .wire_context(spec(json!({
                "subject": {
                    "module": "target",
                    "properties": { "a": { "$ref": "nowhere" }, "b": 5 },
                },
            })))
            .await
            .expect_err("unresolvable property");

        assert_eq!(err.kind(), "Resolution");
        assert!(!target.has_own("b"));
    }

    #[tokio::test]
    async fn test_mixins_apply_in_order() {
        let context = context();
        let target = Object::from_entries([("x", Value::from("t")), ("keep", Value::from(true))]);
        context.register_module("target", Value::Object(target.clone()));

        let components = context
            .wire_context(spec(json!({
                "A": { "literal": { "x": "A", "y": "A" } },
                "B": { "literal": { "y": "B", "z": "B" } },
                "C": { "literal": { "z": "C" } },
                "subject": { "module": "target", "mixin": ["A", "B", "C"] },
                "inline": { "module": "target", "introduce": { "literal": { "w": "inline" } } },
            })))
            .await
            .expect("wire");

        assert_eq!(components.get("subject"), Some(Value::Object(target.clone())));
        assert_eq!(
            Value::Object(target).to_json(),
            json!({ "x": "A", "y": "B", "z": "C", "keep": true, "w": "inline" })
        );
    }

    #[tokio::test]
    async fn test_self_mixin_is_noop() {
        let context = context();
        let target = Object::from_entries([("x", Value::from(1))]);
        context.register_module("target", Value::Object(target.clone()));

        context
            .wire_context(spec(json!({
                "original": { "module": "target" },
                "again": { "module": "target", "mixin": "original" },
            })))
            .await
            .expect("wire");

        assert_eq!(Value::Object(target).to_json(), json!({ "x": 1 }));
    }

    #[tokio::test]
    async fn test_mixin_rejects_non_object_introduction() {
        let context = context();
        context.register_module("target", Value::Object(Object::new()));

        let err = context
            .wire_context(spec(json!({
                "n": 3,
                "subject": { "module": "target", "mixin": "n" },
            })))
            .await
            .expect_err("number introduction");

        assert_eq!(err.kind(), "Configuration");
        assert!(err.to_string().contains("subject"));
    }

    #[tokio::test]
    async fn test_init_runs_before_ready_with_wired_args() {
        let context = context();
        let journal = Journal::default();
        context.register_module(
            "service",
            service(vec![
                ("configure", logged(&journal, "configure")),
                ("warm", logged(&journal, "warm")),
                ("start", logged(&journal, "start")),
            ]),
        );

        context
            .wire_context(spec(json!({
                "limit": 10,
                "svc": {
                    "module": "service",
                    "ready": "start",
                    "init": { "configure": [1, { "$ref": "limit" }], "warm": "cache" },
                },
            })))
            .await
            .expect("wire");

        let entries = journal.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries.last().map(String::as_str), Some("start()"));
        assert!(entries.contains(&"configure(1,10)".to_owned()));
        assert!(entries.contains(&"warm(\"cache\")".to_owned()));
    }

    #[tokio::test]
    async fn test_init_failure_rejects_component() {
        let context = context();
        let journal = Journal::default();
        context.register_module("service", service(vec![("boom", failing(&journal, "boom"))]));

        let err = context
            .wire_context(spec(json!({ "svc": { "module": "service", "init": "boom" } })))
            .await
            .expect_err("init failure");

        assert_eq!(err.kind(), "Invocation");
        assert_eq!(journal.entries(), vec!["boom".to_owned()]);
    }

    #[tokio::test]
    async fn test_unknown_method_is_an_invocation_error() {
        let context = context();
        context.register_module("service", service(vec![]));

        let err = context
            .wire_context(spec(json!({ "svc": { "module": "service", "ready": "missing" } })))
            .await
            .expect_err("no such method");

        assert_eq!(err.kind(), "Invocation");
    }
}
