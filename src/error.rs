use std::fmt;

#[derive(Debug)]
pub enum FtFilterError {
    Transform(TransformError),
    Edit(EditError),
    MalformedImport(ImportError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransformError {
    /// Input length is zero or not a power of two.
    InvalidLength { len: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditError {
    InvalidWindow { start: f64, end: f64 },
    /// The active window is too short to normalize time against.
    DegenerateEnvelope { duration: f64 },
    InvalidParameter { name: &'static str, value: f64 },
    UnknownComponent { id: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImportError {
    InvalidJson { reason: String },
    NotAnArray,
    MalformedRecord { index: usize, reason: String },
}

impl fmt::Display for FtFilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FtFilterError::Transform(e) => write!(f, "Transform error: {e}"),
            FtFilterError::Edit(e) => write!(f, "Edit rejected: {e}"),
            FtFilterError::MalformedImport(e) => write!(f, "Malformed import: {e}"),
        }
    }
}

impl std::error::Error for FtFilterError {}

impl fmt::Display for TransformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformError::InvalidLength { len } => {
                write!(f, "Transform length {len} is not a power of two")
            }
        }
    }
}

impl std::error::Error for TransformError {}

impl fmt::Display for EditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditError::InvalidWindow { start, end } => {
                write!(f, "Invalid active window [{start}, {end}]")
            }
            EditError::DegenerateEnvelope { duration } => {
                write!(f, "Envelope window of {duration}s is too short")
            }
            EditError::InvalidParameter { name, value } => {
                write!(f, "Invalid value {value} for '{name}'")
            }
            EditError::UnknownComponent { id } => write!(f, "No component with id '{id}'"),
        }
    }
}

impl std::error::Error for EditError {}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportError::InvalidJson { reason } => write!(f, "Invalid JSON: {reason}"),
            ImportError::NotAnArray => write!(f, "Expected an array of components"),
            ImportError::MalformedRecord { index, reason } => {
                write!(f, "Component #{index} is malformed: {reason}")
            }
        }
    }
}

impl std::error::Error for ImportError {}

impl From<TransformError> for FtFilterError {
    fn from(e: TransformError) -> Self {
        FtFilterError::Transform(e)
    }
}

impl From<EditError> for FtFilterError {
    fn from(e: EditError) -> Self {
        FtFilterError::Edit(e)
    }
}

impl From<ImportError> for FtFilterError {
    fn from(e: ImportError) -> Self {
        FtFilterError::MalformedImport(e)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackError {
    /// Superseded by a newer request or stopped before finishing.
    Cancelled,
    /// The render task ended without reporting a result.
    WorkerFailed { reason: String },
}

impl fmt::Display for PlaybackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackError::Cancelled => write!(f, "Playback render cancelled"),
            PlaybackError::WorkerFailed { reason } => write!(f, "Playback worker failed: {reason}"),
        }
    }
}

impl std::error::Error for PlaybackError {}
