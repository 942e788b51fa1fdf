pub type MosaicResult<T> = Result<T, MosaicError>;

/// Failures at the ingestion and configuration boundary.
///
/// Data-quality problems inside a readable file never surface here; they are
/// resolved to `None`/`NaN` by the record normalizer.
#[derive(thiserror::Error, Debug)]
pub enum MosaicError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing column: {0}")]
    MissingColumn(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MosaicError {
    pub fn missing_column(name: impl Into<String>) -> Self {
        Self::MissingColumn(name.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for MosaicError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(MosaicError::missing_column("GDP")
            .to_string()
            .contains("missing column: GDP"));
        assert!(MosaicError::config("x").to_string().contains("config error:"));
        assert!(MosaicError::serde("x")
            .to_string()
            .contains("serialization error:"));
    }

    #[test]
    fn io_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = MosaicError::from(base);
        assert!(err.to_string().contains("boom"));
    }
}
