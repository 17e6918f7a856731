use thiserror::Error;

pub type EpResult<T> = Result<T, EpError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EpError {
    #[error("Unrecognized {what}: {value}")]
    Parse { what: &'static str, value: String },
}
