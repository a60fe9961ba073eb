use thiserror::Error;

/// Errors raised while building domain values from external input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Input was not valid hexadecimal
    #[error("invalid hex value: {value}")]
    BadHex { value: String },

    /// Input had the wrong byte width for a fixed-width value
    #[error("expected {expected} bytes, got {actual}")]
    BadLength { expected: usize, actual: usize },

    /// Concatenated amount blob was not value+currency+issuer sized
    #[error("amount concatenation must be {expected} bytes, got {actual}")]
    BadAmountConcat { expected: usize, actual: usize },
}
