use thiserror::Error;

use crate::directive::DirectiveKind;

pub type Result<T> = std::result::Result<T, BindError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    #[error("directive mismatch: placeholder is `{expected}`, re-render used `{found}`")]
    DirectiveMismatch {
        expected: DirectiveKind,
        found: DirectiveKind,
    },

    #[error("readiness signal already settled")]
    AlreadySettled,

    #[error("invalid configuration value for {key}: {value:?}")]
    InvalidConfig { key: &'static str, value: String },
}
