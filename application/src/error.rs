//! [`Error`]-related definitions.

use std::fmt;

use derive_more::Error as StdError;
use itertools::Itertools as _;
use service::{
    command::{create_map, delete_map, delete_property},
    infra::database,
};
use tracerr::{Trace, Traced};

/// Defines a new error type.
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_error {
    (
        enum $name:ident {
            $(
                #[code = $code:literal]
                #[message = $message:literal]
                $variant:ident
            ),* $(,)?
        }
    ) => {
        /// Error type.
        #[derive(
            Clone,
            Copy,
            Debug,
            Eq,
            PartialEq,
            ::derive_more::Display,
            ::derive_more::Error
        )]
        pub enum $name {
            $(
                #[display($message)]
                #[doc = $message]
                $variant,
            )*
        }

        impl From<$name> for $crate::Error {
            fn from(err: $name) -> Self {
                match err {
                    $(
                        $name::$variant => Self {
                            code: $code,
                            message: $message.to_string(),
                            backtrace: None,
                        },
                    )*
                }
            }
        }
    };
}

/// Shell [`Error`] reported to the user.
#[derive(Clone, Debug, StdError)]
pub struct Error {
    /// [`Error`] code.
    pub code: Code,

    /// Backtrace of this [`Error`].
    #[error(not(backtrace))]
    pub backtrace: Option<Trace>,

    /// [`Error`] message.
    pub message: String,
}

impl Error {
    /// Creates a new [`Error`] of the provided [`Code`].
    #[must_use]
    pub fn new(code: Code, msg: &impl ToString) -> Self {
        Self {
            code,
            message: msg.to_string(),
            backtrace: None,
        }
    }

    /// Creates a new [`Error`] representing an unexpected failure.
    #[must_use]
    pub fn internal(msg: &impl ToString) -> Self {
        Self::new("INTERNAL_ERROR", msg)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            code,
            backtrace,
            message,
        } = self;

        write!(
            f,
            "[{code}]: {message}{}",
            backtrace
                .iter()
                .format_with("\n", |trace, f| f(&format_args!("\n{trace}"))),
        )
    }
}

/// [`Error`] code.
pub type Code = &'static str;

/// Helper trait for converting types into [`Error`]s.
pub trait AsError {
    /// Tries to convert the type into an [`Error`].
    ///
    /// [`None`] is returned if the type cannot be converted into an [`Error`].
    fn try_as_error(&self) -> Option<Error>;

    /// Converts the type into an [`Error`].
    fn as_error(&self) -> Error
    where
        Self: fmt::Display,
    {
        self.try_as_error()
            .unwrap_or_else(|| Error::internal(&self))
    }

    /// Converts the type into an [`Error`] by consuming it.
    fn into_error(self) -> Error
    where
        Self: fmt::Display + Sized,
    {
        self.as_error()
    }
}

impl<E: AsError> AsError for Traced<E> {
    fn try_as_error(&self) -> Option<Error> {
        let mut error = self.as_ref().try_as_error()?;
        error.backtrace = Some(self.trace().clone());
        Some(error)
    }
}

impl<P: AsError> AsError for client::Error<P> {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Precondition(e) => Some(Error::new("PRECONDITION", e)),
            Self::Validation(e) => Some(Error::new("VALIDATION", e)),
            Self::NotFound(e) => Some(Error::new("NOT_FOUND", e)),
            Self::Persistence(e) => e.try_as_error(),
        }
    }
}

impl AsError for database::Error {
    fn try_as_error(&self) -> Option<Error> {
        Some(Error::new("PERSISTENCE", self))
    }
}

impl AsError for create_map::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::PropertyNotExists(_) => {
                Some(Error::new("PROPERTY_NOT_EXISTS", self))
            }
        }
    }
}

impl AsError for delete_property::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::PropertyNotExists(_) => {
                Some(Error::new("PROPERTY_NOT_EXISTS", self))
            }
        }
    }
}

impl AsError for delete_map::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::MapNotExists(_) => Some(Error::new("MAP_NOT_EXISTS", self)),
        }
    }
}

impl AsError for std::convert::Infallible {
    fn try_as_error(&self) -> Option<Error> {
        match *self {}
    }
}

#[cfg(test)]
mod spec {
    use client::error::{Precondition, Violation};
    use service::infra::{database, memory};

    use super::AsError as _;

    #[test]
    fn codes_client_errors() {
        let err: client::Error = Precondition::NoPropertySelected.into();
        assert_eq!(
            err.as_error().to_string(),
            "[PRECONDITION]: no property selected",
        );

        let err: client::Error = Violation::TooFewPoints.into();
        assert_eq!(err.as_error().code, "VALIDATION");
    }

    #[test]
    fn attaches_trace_to_persistence_errors() {
        let err = client::Error::Persistence(tracerr::new!(
            database::Error::from(memory::Error::Disconnected)
        ));

        let err = err.as_error();

        assert_eq!(err.code, "PERSISTENCE");
        assert!(err.backtrace.is_some());
        assert!(err.to_string().starts_with(
            "[PERSISTENCE]: link to the document store is broken\n",
        ));
    }
}
