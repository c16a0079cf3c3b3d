//! Error types shared by the scanner, configuration and upload service.

use serde::Serialize;
use thiserror::Error;

/// Message reported when the first frame header is not MPEG-1 Layer III.
pub const FORMAT_ERROR_MESSAGE: &str = "The document is not a valid MPEG Version 1 Layer III file.";

/// Form field the upload service reads the document from.
pub const DOCUMENT_PARAMETER: &str = "document";

const UNKNOWN_ERROR_MESSAGE: &str = "an unknown error occurred";

/// The stream does not start with an MPEG-1 Layer III frame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct FormatError {
    pub message: String,
    /// Input field the failure is attributed to.
    pub parameter: String,
}

impl FormatError {
    pub fn invalid_document() -> Self {
        FormatError {
            message: FORMAT_ERROR_MESSAGE.to_string(),
            parameter: DOCUMENT_PARAMETER.to_string(),
        }
    }
}

/// Terminal failure of a scan.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Format(#[from] FormatError),

    /// The byte source failed; never reclassified as a format problem.
    #[error("I/O error while reading document: {0}")]
    Io(#[from] std::io::Error),
}

pub type ScanResult<T> = Result<T, ScanError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: String, reason: String },
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {reason}")]
    Bind { addr: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Internal,
    InvalidRequest,
    NotFound,
    MethodNotAllowed,
}

impl ErrorCode {
    /// Default HTTP status for each code.
    pub fn http_status(self) -> u16 {
        match self {
            ErrorCode::Internal => 500,
            ErrorCode::InvalidRequest => 400,
            ErrorCode::NotFound => 404,
            ErrorCode::MethodNotAllowed => 405,
        }
    }
}

/// Error surfaced to HTTP clients as `{code, message, parameter?}`.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{message}")]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,
    #[serde(skip)]
    pub http_status: u16,
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        AppError {
            code,
            message: message.into(),
            parameter: None,
            http_status: code.http_status(),
        }
    }

    pub fn invalid_request(message: impl Into<String>, parameter: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message).with_parameter(parameter)
    }

    pub fn internal() -> Self {
        Self::new(ErrorCode::Internal, UNKNOWN_ERROR_MESSAGE)
    }

    pub fn with_parameter(mut self, parameter: impl Into<String>) -> Self {
        self.parameter = Some(parameter.into());
        self
    }
}

impl From<FormatError> for AppError {
    fn from(err: FormatError) -> Self {
        AppError::invalid_request(err.message, err.parameter)
    }
}

impl From<ScanError> for AppError {
    fn from(err: ScanError) -> Self {
        match err {
            ScanError::Format(format) => format.into(),
            ScanError::Io(_) => AppError::internal(),
        }
    }
}
