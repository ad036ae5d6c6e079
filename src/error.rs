//! The error channel.
//!
//! Internally every fallible function returns [`NResult<T>`], threaded with
//! `?` the way `ShapeError` is threaded through `ndarray`. On top of that,
//! a thread-local slot mirrors the last error so callers that prefer to
//! poll (`error_is_set`, `error_print`, ...) instead of matching on
//! `Result` can do so.

use std::cell::RefCell;
use std::error::Error as StdError;
use std::fmt;

/// Error taxonomy. Only `Memory`, `Type`, `Index`, `Value`, `Runtime` arise
/// from the core described here; the others exist for caller use.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind
{
    NoError,
    Memory,
    Type,
    Index,
    Value,
    IO,
    ZeroDivision,
    Import,
    Attribute,
    Key,
    Assertion,
    Runtime,
    Overflow,
}

impl ErrorKind
{
    fn description(self) -> &'static str
    {
        match self {
            ErrorKind::NoError => "no error",
            ErrorKind::Memory => "memory error",
            ErrorKind::Type => "type error",
            ErrorKind::Index => "index error",
            ErrorKind::Value => "value error",
            ErrorKind::IO => "io error",
            ErrorKind::ZeroDivision => "division by zero",
            ErrorKind::Import => "import error",
            ErrorKind::Attribute => "attribute error",
            ErrorKind::Key => "key error",
            ErrorKind::Assertion => "assertion error",
            ErrorKind::Runtime => "runtime error",
            ErrorKind::Overflow => "overflow error",
        }
    }
}

/// An error carrying a taxonomy value and formatted context, as used
/// internally throughout the crate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NError
{
    kind: ErrorKind,
    context: String,
}

impl NError
{
    pub fn new(kind: ErrorKind, context: impl Into<String>) -> Self
    {
        NError { kind, context: context.into() }
    }

    pub fn from_kind(kind: ErrorKind) -> Self
    {
        NError { kind, context: String::new() }
    }

    #[inline]
    pub fn kind(&self) -> ErrorKind
    {
        self.kind
    }

    #[inline]
    pub fn context(&self) -> &str
    {
        &self.context
    }
}

impl fmt::Display for NError
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        if self.context.is_empty() {
            write!(f, "NError/{:?}: {}", self.kind, self.kind.description())
        } else {
            write!(f, "NError/{:?}: {}; {}", self.kind, self.kind.description(), self.context)
        }
    }
}

impl StdError for NError {}

/// The `Result` alias used pervasively inside the crate.
pub type NResult<T> = Result<T, NError>;

macro_rules! value_err {
    ($($arg:tt)*) => {
        $crate::error::NError::new($crate::error::ErrorKind::Value, format!($($arg)*))
    };
}
pub(crate) use value_err;

macro_rules! index_err {
    ($($arg:tt)*) => {
        $crate::error::NError::new($crate::error::ErrorKind::Index, format!($($arg)*))
    };
}
pub(crate) use index_err;

macro_rules! type_err {
    ($($arg:tt)*) => {
        $crate::error::NError::new($crate::error::ErrorKind::Type, format!($($arg)*))
    };
}
pub(crate) use type_err;

thread_local! {
    static LAST_ERROR: RefCell<Option<NError>> = const { RefCell::new(None) };
}

/// Record `err` (or clear, for `None`) in the thread-local last-error slot.
/// Public entry points call this on the `Err` path so that the polling
/// surface stays in sync with the `Result`-returning surface.
pub fn set_last_error(err: Option<NError>)
{
    LAST_ERROR.with(|slot| *slot.borrow_mut() = err);
}

/// `error_clear`.
pub fn error_clear()
{
    set_last_error(None);
}

/// `error_is_set`.
pub fn error_is_set() -> bool
{
    LAST_ERROR.with(|slot| slot.borrow().is_some())
}

/// `error_raise(kind, context)`.
pub fn error_raise(kind: ErrorKind, context: impl Into<String>)
{
    set_last_error(Some(NError::new(kind, context)));
}

/// `error_raise_kind(kind)`.
pub fn error_raise_kind(kind: ErrorKind)
{
    set_last_error(Some(NError::from_kind(kind)));
}

/// `error_print`: write the current error (if any) to stderr.
pub fn error_print()
{
    LAST_ERROR.with(|slot| {
        if let Some(err) = slot.borrow().as_ref() {
            eprintln!("{err}");
        }
    });
}

/// Return a clone of the currently-set error, if any.
pub fn last_error() -> Option<NError>
{
    LAST_ERROR.with(|slot| slot.borrow().clone())
}

/// Run `f`, mirroring any `Err` into the thread-local last-error slot before
/// returning it. Outer-layer public entry points should wrap their body with
/// this so the polling surface stays in sync with the returned `Result`.
pub fn with_error_channel<T>(f: impl FnOnce() -> NResult<T>) -> NResult<T>
{
    match f() {
        Ok(v) => {
            set_last_error(None);
            Ok(v)
        }
        Err(e) => {
            set_last_error(Some(e.clone()));
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn last_error_round_trips()
    {
        error_clear();
        assert!(!error_is_set());
        error_raise(ErrorKind::Value, "bad shape");
        assert!(error_is_set());
        let e = last_error().unwrap();
        assert_eq!(e.kind(), ErrorKind::Value);
        error_clear();
        assert!(!error_is_set());
    }

    #[test]
    fn with_error_channel_mirrors_result()
    {
        error_clear();
        let r: NResult<i32> = with_error_channel(|| Err(NError::from_kind(ErrorKind::Index)));
        assert!(r.is_err());
        assert!(error_is_set());
        assert_eq!(last_error().unwrap().kind(), ErrorKind::Index);
    }

    #[test]
    fn display_format()
    {
        let e = NError::new(ErrorKind::Value, "expected 3, got 4");
        assert_eq!(e.to_string(), "NError/Value: value error; expected 3, got 4");
    }
}
