use thiserror::Error;
use uuid::Uuid;

/// Errors from the breeding engine.
///
/// Insufficient data is never an error: metrics without qualifying samples
/// come back as `None`, and only genuinely unusable input lands here.
#[derive(Debug, Clone, Error)]
pub enum BreedingError {
    #[error("invalid breeding config: {0}")]
    Config(String),

    #[error("malformed event for animal {animal_id}: {reason}")]
    MalformedEvent { animal_id: Uuid, reason: String },
}

impl BreedingError {
    /// The animal a per-animal failure belongs to, if any.
    pub fn animal_id(&self) -> Option<Uuid> {
        match self {
            Self::Config(_) => None,
            Self::MalformedEvent { animal_id, .. } => Some(*animal_id),
        }
    }
}
