use std::borrow::Cow;
use weave_derive::weave_error;

#[weave_error]
#[derive(Clone)]
pub enum DemoError {
    #[error("Resolution failed{}: {message}", format_context(.context))]
    Resolution { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

#[test]
fn weave_error_ui() {
    let t = trybuild::TestCases::new();
    t.pass("tests/ui/weave_error_pass.rs");
}

#[test]
fn context_is_attached_to_existing_errors() {
    let result: Result<(), DemoError> =
        Err(DemoError::Resolution { message: "missing component".into(), context: None });

    let err = result.context("wiring logger").unwrap_err();

    assert_eq!(err.to_string(), "Resolution failed (wiring logger): missing component");
    assert_eq!(err.kind(), "Resolution");
}

#[test]
fn internal_variant_accepts_plain_strings() {
    let err: DemoError = "boom".into();
    let owned: DemoError = format!("boom {}", 2).into();

    assert_eq!(err.to_string(), "Internal error: boom");
    assert_eq!(owned.kind(), "Internal");
    assert_eq!(err.clone().to_string(), err.to_string(), "extra derives are preserved");
}

// Separate module: `#[weave_error]` emits a free `format_context` fn per use.
mod derived {
    use super::*;

    #[weave_error]
    #[derive(Debug, PartialEq, Eq)]
    pub enum DerivedError {
        #[error("Internal error{}: {message}", format_context(.context))]
        Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    }

    #[test]
    fn existing_debug_derive_is_kept_once() {
        let err: DerivedError = "late".into();

        assert_eq!(err, DerivedError::Internal { message: "late".into(), context: None });
        assert!(format!("{err:?}").starts_with("Internal"));
    }
}
