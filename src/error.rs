use thiserror::Error;

/// Errors raised by the table engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid input: column '{0}' not found")]
    MissingColumn(String),

    #[error("Export failed: {0}")]
    Export(String),
}

impl From<rust_xlsxwriter::XlsxError> for EngineError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        EngineError::Export(err.to_string())
    }
}

impl From<csv::Error> for EngineError {
    fn from(err: csv::Error) -> Self {
        EngineError::Export(err.to_string())
    }
}

impl EngineError {
    /// Whether the caller handed the engine something it cannot work with.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            EngineError::InvalidInput(_) | EngineError::MissingColumn(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_column_counts_as_invalid_input() {
        let err = EngineError::MissingColumn("Scenario".into());
        assert!(err.is_invalid_input());
        assert_eq!(err.to_string(), "Invalid input: column 'Scenario' not found");
        assert!(!EngineError::Export("disk full".into()).is_invalid_input());
    }
}
