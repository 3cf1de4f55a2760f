#![deny(missing_docs)]

//! Error handling for the structure-of-arrays column store.
//!
//! Every fallible operation returns a [`SoaResult`]. Errors carry a captured [`Backtrace`], which
//! is only populated when `RUST_BACKTRACE` (or `RUST_LIB_BACKTRACE`) is set.

mod ext;

use std::backtrace::Backtrace;
use std::borrow::Cow;
use std::fmt::{Debug, Display, Formatter};
use std::ops::Deref;
use std::{env, fmt};

pub use ext::*;

/// A string that is either borrowed with a static lifetime or owned.
#[derive(Debug)]
pub struct ErrString(Cow<'static, str>);

impl<T> From<T> for ErrString
where
    T: Into<Cow<'static, str>>,
{
    #[allow(clippy::panic)]
    fn from(msg: T) -> Self {
        if env::var("SOA_PANIC_ON_ERR").as_deref().unwrap_or("") == "1" {
            panic!("{}\nBacktrace:\n{}", msg.into(), Backtrace::capture());
        } else {
            Self(msg.into())
        }
    }
}

impl AsRef<str> for ErrString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for ErrString {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for ErrString {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

/// The top-level error type.
#[derive(thiserror::Error)]
#[non_exhaustive]
pub enum SoaError {
    /// A backing allocation could not be satisfied, or its planned size overflowed.
    #[error("allocation failed: {0}\nBacktrace:\n{1}")]
    Allocation(ErrString, Box<Backtrace>),
    /// An index, or the end of a range, fell outside of `[start, end)`.
    #[error("index {0} out of bounds from {1} to {2}\nBacktrace:\n{3}")]
    OutOfBounds(usize, usize, usize, Box<Backtrace>),
    /// A value did not fit into the requested number of bytes.
    #[error("value {0} does not fit in {1} bytes\nBacktrace:\n{2}")]
    TruncationOverflow(u64, usize, Box<Backtrace>),
    /// The requested column type does not match the column's type in the schema.
    #[error("expected type: {0} but instead got {1}\nBacktrace:\n{2}")]
    MismatchedTypes(ErrString, ErrString, Box<Backtrace>),
    /// An invalid argument was provided.
    #[error("{0}\nBacktrace:\n{1}")]
    InvalidArgument(ErrString, Box<Backtrace>),
    /// An error annotated with additional context.
    #[error("{0}: {1}")]
    Context(ErrString, Box<SoaError>),
}

impl SoaError {
    /// Adds additional context to an error.
    pub fn with_context<T: Into<ErrString>>(self, msg: T) -> Self {
        SoaError::Context(msg.into(), Box::new(self))
    }
}

impl Debug for SoaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

/// A type alias for results that return a [`SoaError`] as their error type.
pub type SoaResult<T> = Result<T, SoaError>;

/// A trait for unwrapping a result, panicking with the error's display form.
pub trait SoaUnwrap {
    /// The type of the value being unwrapped.
    type Output;

    /// Returns the value of the result if it is `Ok`, otherwise panics with the error.
    fn soa_unwrap(self) -> Self::Output;
}

impl<T, E> SoaUnwrap for Result<T, E>
where
    E: Into<SoaError>,
{
    type Output = T;

    #[inline(always)]
    fn soa_unwrap(self) -> Self::Output {
        self.map_err(|err| err.into())
            .unwrap_or_else(|err| crate::soa_panic!(err))
    }
}

/// A trait for expecting a value to be present, panicking with a message otherwise.
pub trait SoaExpect {
    /// The type of the value being expected.
    type Output;

    /// Returns the value if present, otherwise panics with `msg` as context.
    fn soa_expect(self, msg: &str) -> Self::Output;
}

impl<T, E> SoaExpect for Result<T, E>
where
    E: Into<SoaError>,
{
    type Output = T;

    #[inline(always)]
    fn soa_expect(self, msg: &str) -> Self::Output {
        self.map_err(|err| err.into())
            .unwrap_or_else(|e| crate::soa_panic!(e.with_context(msg.to_string())))
    }
}

impl<T> SoaExpect for Option<T> {
    type Output = T;

    #[inline(always)]
    fn soa_expect(self, msg: &str) -> Self::Output {
        self.unwrap_or_else(|| {
            let err =
                SoaError::InvalidArgument(msg.to_string().into(), Box::new(Backtrace::capture()));
            crate::soa_panic!(err)
        })
    }
}

/// Construct a [`SoaError`].
///
/// The first form builds an [`SoaError::InvalidArgument`] from a format string. The second
/// selects the variant explicitly, e.g. `soa_err!(Allocation: "{} bytes", n)`.
#[macro_export]
macro_rules! soa_err {
    (OutOfBounds: $idx:expr, $start:expr, $stop:expr) => {{
        use std::backtrace::Backtrace;
        $crate::SoaError::OutOfBounds($idx, $start, $stop, Box::new(Backtrace::capture()))
    }};
    (TruncationOverflow: $value:expr, $width:expr) => {{
        use std::backtrace::Backtrace;
        $crate::SoaError::TruncationOverflow($value, $width, Box::new(Backtrace::capture()))
    }};
    (MismatchedTypes: $expected:expr, $actual:expr) => {{
        use std::backtrace::Backtrace;
        $crate::SoaError::MismatchedTypes($expected.to_string().into(), $actual.to_string().into(), Box::new(Backtrace::capture()))
    }};
    (Context: $msg:literal, $err:expr) => {{
        $crate::SoaError::Context($msg.into(), Box::new($err))
    }};
    ($variant:ident: $fmt:literal $(, $arg:expr)* $(,)?) => {{
        use std::backtrace::Backtrace;
        $crate::SoaError::$variant(format!($fmt, $($arg),*).into(), Box::new(Backtrace::capture()))
    }};
    ($fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::soa_err!(InvalidArgument: $fmt, $($arg),*)
    };
}

/// Return early with a [`SoaError`], built with the same arguments as [`soa_err!`].
#[macro_export]
macro_rules! soa_bail {
    ($($tt:tt)+) => {
        return Err($crate::soa_err!($($tt)+))
    };
}

/// Panic with a [`SoaError`], built with the same arguments as [`soa_err!`] or from an existing
/// error value.
#[macro_export]
macro_rules! soa_panic {
    (OutOfBounds: $idx:expr, $start:expr, $stop:expr) => {{
        $crate::soa_panic!($crate::soa_err!(OutOfBounds: $idx, $start, $stop))
    }};
    (Context: $msg:literal, $err:expr) => {{
        $crate::soa_panic!($crate::soa_err!(Context: $msg, $err))
    }};
    ($variant:ident: $fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::soa_panic!($crate::soa_err!($variant: $fmt, $($arg),*))
    };
    ($err:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {{
        #[allow(clippy::panic)]
        {
            let err: $crate::SoaError = $err;
            panic!("{}", err.with_context(format!($fmt, $($arg),*)))
        }
    }};
    ($fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::soa_panic!($crate::soa_err!($fmt, $($arg),*))
    };
    ($err:expr) => {{
        #[allow(clippy::panic)]
        {
            let err: $crate::SoaError = $err;
            panic!("{}", err)
        }
    }};
}
