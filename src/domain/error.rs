//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Payload field whose presence or type is checked per button kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadField {
    SubButton,
    Key,
    Url,
    AppId,
    PagePath,
}

impl PayloadField {
    /// Field name as it appears in the menu JSON.
    pub fn wire_name(&self) -> &'static str {
        match self {
            PayloadField::SubButton => "sub_button",
            PayloadField::Key => "key",
            PayloadField::Url => "url",
            PayloadField::AppId => "appid",
            PayloadField::PagePath => "pagepath",
        }
    }

    fn message(&self) -> &'static str {
        match self {
            PayloadField::SubButton => "children must be button list",
            PayloadField::Key => "key must be string",
            PayloadField::Url => "url must be string",
            PayloadField::AppId => "appid must be string",
            PayloadField::PagePath => "pagepath must be string",
        }
    }
}

impl std::fmt::Display for PayloadField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Domain errors represent menu model violations.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("button name must be a non-empty string")]
    InvalidName,

    #[error("button type must be one of [\"top\", \"click\", \"view\", \"miniprogram\"], got: {0}")]
    InvalidKind(String),

    #[error("{field}")]
    InvalidPayload { field: PayloadField },

    #[error("only a top button may receive sub buttons")]
    WrongVariant,

    #[error("button {0} has no sub buttons")]
    NotContainer(usize),

    #[error("index out of range: {index} (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("not a button: {0}")]
    WrongType(String),

    #[error("malformed menu json: {0}")]
    Json(#[from] serde_json::Error),
}

impl DomainError {
    pub(crate) fn payload(field: PayloadField) -> Self {
        Self::InvalidPayload { field }
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
