//! Error types for the addressing engine and its collaborators

use std::fmt;

use thiserror::Error;

/// Result alias used by the pure addressing modules
pub type Result<T> = std::result::Result<T, AddressingError>;

/// RAS subspace carrying an occupation limit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RasSubspace {
    /// Hole-limited
    Ras1,
    /// Particle-limited
    Ras3,
}

impl fmt::Display for RasSubspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RasSubspace::Ras1 => write!(f, "RAS1"),
            RasSubspace::Ras3 => write!(f, "RAS3"),
        }
    }
}

/// Failures of the combinatorial engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressingError {
    /// A configuration contains something other than '0' or '1'
    #[error("invalid occupation symbol {symbol:?} at position {position}")]
    InvalidSymbol { symbol: char, position: usize },

    #[error("configuration length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("electron count mismatch: expected {expected}, got {actual}")]
    ElectronCountMismatch { expected: usize, actual: usize },

    #[error("address {address} out of range [1, {max}]")]
    AddressOutOfRange { address: u64, max: u64 },

    /// Hole count in RAS1 or particle count in RAS3 above the allowed maximum
    #[error("{subspace} occupation {count} exceeds limit {limit}")]
    OccupationLimit {
        subspace: RasSubspace,
        count: usize,
        limit: usize,
    },

    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("{0} is not implemented")]
    NotImplemented(&'static str),

    /// Category table lookup hit an empty category
    #[error("category {index} is not a valid category")]
    InvalidCategory { index: usize },

    #[error("binomial coefficient C({n}, {k}) overflows u64")]
    Overflow { n: usize, k: usize },

    #[error("internal addressing failure: {0}")]
    Internal(String),
}

/// Crate-level error for file-facing operations
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Addressing(#[from] AddressingError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// Malformed RASCI log content
    #[error("log format error at line {line}: {message}")]
    LogFormat { line: usize, message: String },

    #[error("missing {0} specification")]
    MissingSpec(&'static str),
}
