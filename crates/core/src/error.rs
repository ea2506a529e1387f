use thiserror::Error;

/// Failure of an item parser while turning a raw wire item into its typed form.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed item: {0}")]
    Shape(#[from] serde_json::Error),

    #[error("invalid timestamp in `{field}`: {value:?}")]
    Timestamp { field: &'static str, value: String },

    #[error("event ends before it starts ({start} > {end})")]
    InvertedSchedule { start: String, end: String },
}
