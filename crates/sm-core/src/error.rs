use crate::id::AnnotationId;
use crate::model::ShapeKind;
use thiserror::Error;

/// Errors raised at the editor's fallible boundaries: snapshots coming in from
/// the external store, freehand path data, configuration, and validation of
/// externally supplied geometry. Interactive editing never produces these.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid annotation JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid path data at byte {offset}: {message}")]
    PathData { offset: usize, message: String },

    #[error("invalid {kind} geometry: {reason}")]
    InvalidGeometry { kind: ShapeKind, reason: String },

    #[error("annotation id {0} already exists")]
    DuplicateId(AnnotationId),

    #[error("invalid editor config: {0}")]
    InvalidConfig(String),
}

impl Error {
    pub(crate) fn geometry(kind: ShapeKind, reason: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            kind,
            reason: reason.into(),
        }
    }
}
