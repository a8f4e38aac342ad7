use thiserror::Error;

/// A payload from the gallery service that does not describe a usable item list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("art record is missing its {field}")]
    MissingField { field: &'static str },
    #[error("duplicate art id {id} in category list")]
    DuplicateId { id: String },
}
