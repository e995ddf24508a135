#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimulationError {
    #[error("invalid configuration: {field} {message}")]
    InvalidConfiguration {
        field: &'static str,
        message: String,
    },

    #[error("cannot build a total from an empty projection")]
    EmptyAggregationInput,
}

impl SimulationError {
    pub(crate) fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        SimulationError::InvalidConfiguration {
            field,
            message: message.into(),
        }
    }
}
