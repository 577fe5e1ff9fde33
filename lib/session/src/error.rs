//! Error types for session encoding and storage.

use std::fmt;

/// Errors from compressing or decompressing a single session value.
#[derive(Debug)]
pub enum CodecError {
    /// The stored token is not valid base64.
    InvalidEncoding,
    /// The stored token is not a valid gzip stream, or did not decompress
    /// to valid UTF-8.
    InvalidStream { details: String },
    /// Compressing the value failed.
    Compress { details: String },
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEncoding => write!(f, "stored value is not valid base64"),
            Self::InvalidStream { details } => {
                write!(f, "stored value is not valid compressed data: {}", details)
            }
            Self::Compress { details } => {
                write!(f, "failed to compress value: {}", details)
            }
        }
    }
}

impl std::error::Error for CodecError {}

/// Errors from session store operations.
#[derive(Debug)]
pub enum SessionError {
    /// No value exists at the given key. Also covers every cookie that
    /// failed authentication: a forged cookie must look exactly like a
    /// missing one.
    NotFound,
    /// A value exists but could not be decoded (corrupted cookie payload).
    Decode { details: String },
    /// Writing a value into the session failed.
    Write { details: String },
    /// Sealing the session into a cookie failed.
    Seal { details: String },
    /// The configured secret is too short to derive a key from.
    WeakSecret { length: usize },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "no matching session value for this request"),
            Self::Decode { details } => write!(f, "session value could not be decoded: {}", details),
            Self::Write { details } => write!(f, "session value could not be stored: {}", details),
            Self::Seal { details } => write!(f, "session could not be sealed: {}", details),
            Self::WeakSecret { length } => {
                write!(f, "session secret must be at least 32 bytes, got {}", length)
            }
        }
    }
}

impl std::error::Error for SessionError {}
