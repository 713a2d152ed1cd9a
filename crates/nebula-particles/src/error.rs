//! Effect scheduling error types.

/// Errors surfaced by registration or raised by an individual effect.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EffectError {
    /// A layered registration named a layer outside `0..=2`.
    #[error("invalid layer ordinal {0}, expected 0..=2")]
    InvalidLayer(u8),

    /// An effect's step or draw call failed. The scheduler retires that effect only.
    #[error("effect failed: {reason}")]
    Failed {
        /// Human-readable cause, reported through the log.
        reason: String,
    },
}

impl EffectError {
    /// Convenience constructor for [`EffectError::Failed`].
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }
}
