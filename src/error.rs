use std::ops::Deref;

use nom::error::{VerboseError, VerboseErrorKind};

/// Error type for path compilation and evaluation
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The path string could not be compiled
    ///
    /// Produced when tokenization fails, when a bracket body is not a
    /// recognized form, when a predicate expression does not parse, or when
    /// the number of `[?]` placeholders does not match the number of
    /// supplied filters.
    #[error("invalid path at position {position}, {message}")]
    InvalidPath {
        /// 1-indexed position of the offending input
        position: usize,
        /// Human-readable reason
        message: String,
    },
    /// A non-terminal path token matched nothing in the document
    #[error("the path fragment '{fragment}' could not be found in '{path}'")]
    PathNotFound {
        /// The fragment that failed to match
        fragment: String,
        /// The accumulated path up to and including the failing fragment
        path: String,
    },
    /// An argument to `compile` or `read` was not usable
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The requested operation is not available for this path
    #[error("unsupported operation: {0}")]
    Unsupported(String),
}

impl Error {
    pub(crate) fn invalid_path(position: usize, message: impl Into<String>) -> Self {
        Self::InvalidPath {
            position,
            message: message.into(),
        }
    }

    pub(crate) fn path_not_found(fragment: &str, upstream: &str) -> Self {
        Self::PathNotFound {
            fragment: fragment.to_owned(),
            path: upstream.to_owned(),
        }
    }
}

/// Convert a nom error into an [`Error::InvalidPath`], computing the
/// 1-indexed position from the deepest error slice
impl<I> From<(I, nom::Err<VerboseError<I>>)> for Error
where
    I: Deref<Target = str>,
{
    fn from((input, err): (I, nom::Err<VerboseError<I>>)) -> Self {
        let err = match err {
            nom::Err::Error(e) | nom::Err::Failure(e) => e,
            nom::Err::Incomplete(_) => unreachable!("streaming parsers are not used"),
        };
        let position = err
            .errors
            .first()
            .map(|(i, _)| input.len() - i.len() + 1)
            .unwrap_or(1);
        let message = err
            .errors
            .iter()
            .find_map(|(_, kind)| match kind {
                VerboseErrorKind::Context(ctx) => Some(format!("expected {ctx}")),
                _ => None,
            })
            .unwrap_or_else(|| String::from("unexpected token"));
        Self::InvalidPath { position, message }
    }
}

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn test_send() {
        fn assert_send<T: Send>() {}
        assert_send::<Error>();
    }

    #[test]
    fn test_sync() {
        fn assert_sync<T: Sync>() {}
        assert_sync::<Error>();
    }
}
