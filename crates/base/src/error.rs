use std::borrow::Cow;

/// Failure of a factory, facet or consumed capability.
///
/// Errors are `Clone` so that one settled deferred can hand the same failure
/// to every waiter of a shared component.
#[weave_derive::weave_error]
#[derive(Clone, PartialEq, Eq)]
pub enum WireError {
    /// A consumed capability failed: unknown reference, unknown module, failed proxy lookup.
    #[error("Resolution failed{}: {message}", format_context(.context))]
    Resolution { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A malformed spec fragment or a missing capability.
    #[error("Invalid configuration{}: {message}", format_context(.context))]
    Configuration { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A missing method, a non-callable value or a failed call.
    #[error("Invocation failed{}: {message}", format_context(.context))]
    Invocation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Destroy registration after the context started tearing down.
    #[error("Context destroyed{}: {message}", format_context(.context))]
    Destroyed { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A resolver was dropped without being settled.
    #[error("Resolver abandoned{}: {message}", format_context(.context))]
    Abandoned { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl WireError {
    pub fn resolution(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Resolution { message: message.into(), context: None }
    }

    pub fn configuration(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Configuration { message: message.into(), context: None }
    }

    pub fn invocation(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Invocation { message: message.into(), context: None }
    }

    pub fn destroyed(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Destroyed { message: message.into(), context: None }
    }

    pub fn abandoned(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Abandoned { message: message.into(), context: None }
    }

    /// Replaces the context, usually with the component id or path.
    #[must_use]
    pub fn at(mut self, at: impl Into<Cow<'static, str>>) -> Self {
        match &mut self {
            Self::Resolution { context, .. }
            | Self::Configuration { context, .. }
            | Self::Invocation { context, .. }
            | Self::Destroyed { context, .. }
            | Self::Abandoned { context, .. }
            | Self::Internal { context, .. } => *context = Some(at.into()),
        }
        self
    }

    /// The message without the context suffix.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Resolution { message, .. }
            | Self::Configuration { message, .. }
            | Self::Invocation { message, .. }
            | Self::Destroyed { message, .. }
            | Self::Abandoned { message, .. }
            | Self::Internal { message, .. } => message,
        }
    }
}

pub type Result<T, E = WireError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_is_rendered() {
        let result: Result<()> = Err(WireError::configuration("clone target has no proxy"));
        let err = result.context("component `copy`").expect_err("should stay an error");

        assert_eq!(err.kind(), "Configuration");
        assert_eq!(
            err.to_string(),
            "Invalid configuration (component `copy`): clone target has no proxy"
        );
        assert_eq!(err.message(), "clone target has no proxy");
    }

    #[test]
    fn test_string_converts_to_internal() {
        let err: WireError = format!("slot {} missing", 3).into();
        assert_eq!(err.kind(), "Internal");
        assert_eq!(err.clone(), err);
    }
}
