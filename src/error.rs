//! # Status List Errors
//!
//! All fallible operations in this crate return an [`Error`]. The error
//! carries a machine-readable code ([`Err`]), a human-readable message, and
//! an optional structured details payload that can be surfaced to callers as
//! JSON.

use std::fmt::Display;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;

/// Result type for status list operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error codes for status list processing.
#[derive(Error, Debug)]
pub enum Err {
    /// The status list was configured with an unsupported number of bits per
    /// status.
    #[error("configuration_error")]
    Configuration,

    /// A status value does not fit the list's bit width, or an index lies
    /// outside the list.
    #[error("range_error")]
    Range,

    /// A claim required to build a token is missing.
    #[error("validation_error")]
    Validation,

    /// Compressed status list bytes could not be inflated or unpacked.
    #[error("decompression_error")]
    Decompression(#[source] anyhow::Error),

    /// An expected claim or sub-claim is absent from a decoded token.
    #[error("not_found")]
    NotFound,

    /// A token or claim could not be decoded (malformed JWT segments,
    /// base64url, JSON, or CBOR).
    #[error("decode_error")]
    Decode(#[source] anyhow::Error),

    /// Signing or signature verification failed.
    #[error("signature_error")]
    Signature(#[source] anyhow::Error),
}

/// Status list error.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct Error {
    #[source]
    source: Err,
    message: String,
    details: Option<Value>,
}

impl Error {
    /// Create a new error from a code and message.
    pub fn new(code: Err, message: impl Into<String>) -> Self {
        Self {
            source: code,
            message: message.into(),
            details: None,
        }
    }

    /// Error code.
    #[must_use]
    pub const fn code(&self) -> &Err {
        &self.source
    }

    /// Human-readable error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Structured details, when provided.
    #[must_use]
    pub const fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Returns the error as a JSON object.
    #[must_use]
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

impl Serialize for Error {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.details.is_some() { 3 } else { 2 };
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("error", &self.source.to_string())?;
        map.serialize_entry("message", &self.message)?;
        if let Some(details) = &self.details {
            map.serialize_entry("details", details)?;
        }
        map.end()
    }
}

impl From<Err> for Error {
    fn from(code: Err) -> Self {
        let message = match &code {
            Err::Decompression(e) => format!("Decompression failed: {e}"),
            Err::Decode(e) | Err::Signature(e) => e.to_string(),
            _ => code.to_string(),
        };
        Self::new(code, message)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Err::Decode(err.into()).into()
    }
}

impl From<base64ct::Error> for Error {
    fn from(err: base64ct::Error) -> Self {
        Err::Decode(err.into()).into()
    }
}

impl From<ciborium::de::Error<std::io::Error>> for Error {
    fn from(err: ciborium::de::Error<std::io::Error>) -> Self {
        Err::Decode(anyhow::anyhow!("issue decoding CBOR: {err}")).into()
    }
}

impl From<ciborium::ser::Error<std::io::Error>> for Error {
    fn from(err: ciborium::ser::Error<std::io::Error>) -> Self {
        Err::Decode(anyhow::anyhow!("issue encoding CBOR: {err}")).into()
    }
}

impl From<coset::CoseError> for Error {
    fn from(err: coset::CoseError) -> Self {
        Err::Decode(anyhow::anyhow!("issue processing COSE structure: {err}")).into()
    }
}

/// Add a message or details to error `Result`s.
pub trait Context<T> {
    /// Replace the error message.
    ///
    /// # Errors
    ///
    /// Returns the original error with the new message.
    fn message<C>(self, message: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static;

    /// Attach structured details to the error.
    ///
    /// # Errors
    ///
    /// Returns the original error with details attached.
    fn details(self, details: Value) -> Result<T>;
}

impl<T, E> Context<T> for Result<T, E>
where
    Error: From<E>,
{
    fn message<C>(self, message: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.map_err(|e| {
            let err: Error = e.into();
            Error {
                source: err.source,
                message: message.to_string(),
                details: err.details,
            }
        })
    }

    fn details(self, details: Value) -> Result<T> {
        self.map_err(|e| {
            let err: Error = e.into();
            Error {
                source: err.source,
                message: err.message,
                details: Some(details),
            }
        })
    }
}

/// Return early with an error built from a code and a formatted message.
///
/// # Example
///
/// ```rust,ignore
/// use token_status_list::err;
/// use token_status_list::error::{Err, Result};
///
/// fn check(subject: &str) -> Result<()> {
///     if subject.is_empty() {
///         err!(Err::Validation, "subject is required");
///     }
///     Ok(())
/// }
/// ```
#[doc(hidden)]
#[macro_export]
macro_rules! err {
    // Err::<code> + message + details
    ($code:expr, details: $details:expr, $($msg:tt)+) => {{
        use $crate::error::Context as _;
        tracing::debug!($($msg)+);
        return Err($crate::error::Error::new($code, format!($($msg)+))).details($details);
    }};

    // Err::<code> + message
    ($code:expr, $($msg:tt)+) => {{
        tracing::debug!($($msg)+);
        return Err($crate::error::Error::new($code, format!($($msg)+)));
    }};
}
