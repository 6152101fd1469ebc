use thiserror::Error;

/// Errors raised by the scheduling engine
///
/// All variants except `Storage` are caused by human-entered data and map to
/// a user error at the CLI boundary. None of them are retried.
#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("Stage {sequence} not found for procurement {instance_id}")]
    NotFound { instance_id: i64, sequence: u32 },

    #[error("Invalid {field}: {message}")]
    InvalidArgument { field: String, message: String },

    #[error("Invalid stage template: {0}")]
    InvalidTemplate(String),

    #[error("Ledger storage failed: {0:#}")]
    Storage(anyhow::Error),
}

impl ScheduleError {
    pub fn invalid_argument(field: &str, message: impl Into<String>) -> Self {
        ScheduleError::InvalidArgument {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// True for errors caused by the caller's input rather than the ledger
    pub fn is_user_error(&self) -> bool {
        !matches!(self, ScheduleError::Storage(_))
    }
}

impl From<anyhow::Error> for ScheduleError {
    fn from(err: anyhow::Error) -> Self {
        ScheduleError::Storage(err)
    }
}

impl From<rusqlite::Error> for ScheduleError {
    fn from(err: rusqlite::Error) -> Self {
        ScheduleError::Storage(anyhow::Error::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ScheduleError::NotFound { instance_id: 4, sequence: 9 };
        assert_eq!(err.to_string(), "Stage 9 not found for procurement 4");

        let err = ScheduleError::invalid_argument("actual end", "'2024-02-30' is not a calendar date");
        assert_eq!(err.to_string(), "Invalid actual end: '2024-02-30' is not a calendar date");
    }

    #[test]
    fn test_user_error_classification() {
        assert!(ScheduleError::InvalidTemplate("gap".into()).is_user_error());
        assert!(!ScheduleError::Storage(anyhow::anyhow!("disk full")).is_user_error());
    }
}
