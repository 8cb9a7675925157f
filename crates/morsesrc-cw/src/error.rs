use thiserror::Error;

pub type Result<T> = std::result::Result<T, SourceError>;

/// Errors raised while configuring or driving a [`MorseSource`](crate::MorseSource).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SourceError {
    #[error("invalid words per minute: {0} (must be at least 1)")]
    InvalidWpm(u32),

    #[error("invalid sample rate: {0} Hz")]
    InvalidSampleRate(u32),

    #[error("invalid channel count: {0}")]
    InvalidChannels(u16),

    #[error("invalid frequency: {0} Hz")]
    InvalidFrequency(f64),

    #[error("invalid volume: {0} (must be within 0.0..=1.0)")]
    InvalidVolume(f64),

    #[error("unsupported sample format: {0}")]
    UnsupportedFormat(String),

    #[error("source has not been started")]
    NotStarted,

    #[error("no audio format has been negotiated")]
    NotNegotiated,
}

impl SourceError {
    /// True for errors caused by bad settings or formats rather than call order.
    pub fn is_config(&self) -> bool {
        !matches!(self, SourceError::NotStarted | SourceError::NotNegotiated)
    }
}
