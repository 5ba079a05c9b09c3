use std::borrow::Cow;
use weave_derive::weave_error;

#[weave_error]
pub enum LoaderError {
    #[error("IO error{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn read_spec(path: &str) -> Result<String, LoaderError> {
    std::fs::read_to_string(path).context("Reading component spec")
}

fn main() {
    let _ = read_spec("missing.json").map_err(|err| err.kind());
}
