//! Definition of errors.

use std::error::Error;
use std::fmt;

/// A specialized Result type for Respell.
pub type Result<T, E = RespellError> = std::result::Result<T, E>;

/// The error type for Respell.
#[derive(Debug)]
pub enum RespellError {
    /// The error variant for [`InvalidArgumentError`].
    InvalidArgument(InvalidArgumentError),

    /// The error variant for [`ModelFormatError`].
    ModelFormat(ModelFormatError),

    /// The error variant for [`DecodeError`](bincode::error::DecodeError).
    BincodeDecode(bincode::error::DecodeError),

    /// The error variant for [`EncodeError`](bincode::error::EncodeError).
    BincodeEncode(bincode::error::EncodeError),

    /// The error variant for [`std::io::Error`].
    StdIo(std::io::Error),

    /// The error variant for [`rusqlite::Error`].
    #[cfg(feature = "export")]
    Sqlite(rusqlite::Error),
}

impl RespellError {
    pub(crate) fn invalid_argument<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidArgument(InvalidArgumentError {
            arg,
            msg: msg.into(),
        })
    }

    pub(crate) fn model_format<S>(msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::ModelFormat(ModelFormatError { msg: msg.into() })
    }
}

impl fmt::Display for RespellError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::InvalidArgument(e) => e.fmt(f),
            Self::ModelFormat(e) => e.fmt(f),
            Self::BincodeDecode(e) => e.fmt(f),
            Self::BincodeEncode(e) => e.fmt(f),
            Self::StdIo(e) => e.fmt(f),
            #[cfg(feature = "export")]
            Self::Sqlite(e) => e.fmt(f),
        }
    }
}

impl Error for RespellError {}

/// Error used when the argument is invalid.
#[derive(Debug)]
pub struct InvalidArgumentError {
    /// Name of the argument.
    pub(crate) arg: &'static str,

    /// Error message.
    pub(crate) msg: String,
}

impl fmt::Display for InvalidArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidArgumentError: {}: {}", self.arg, self.msg)
    }
}

impl Error for InvalidArgumentError {}

/// Error used when a model file violates the expected layout.
#[derive(Debug)]
pub struct ModelFormatError {
    /// Error message.
    pub(crate) msg: String,
}

impl fmt::Display for ModelFormatError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ModelFormatError: {}", self.msg)
    }
}

impl Error for ModelFormatError {}

impl From<bincode::error::DecodeError> for RespellError {
    fn from(error: bincode::error::DecodeError) -> Self {
        Self::BincodeDecode(error)
    }
}

impl From<bincode::error::EncodeError> for RespellError {
    fn from(error: bincode::error::EncodeError) -> Self {
        Self::BincodeEncode(error)
    }
}

impl From<std::io::Error> for RespellError {
    fn from(error: std::io::Error) -> Self {
        Self::StdIo(error)
    }
}

#[cfg(feature = "export")]
impl From<rusqlite::Error> for RespellError {
    fn from(error: rusqlite::Error) -> Self {
        Self::Sqlite(error)
    }
}
