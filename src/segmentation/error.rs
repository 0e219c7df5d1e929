use thiserror::Error;

/// A policy edit that can't be applied. The edit is rejected and the current
/// policy stays as it was.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PolicyError {
    #[error("splitting by a multiple of the median interval is not possible: every capture shares a timestamp, so there is no median interval")]
    UndefinedMedian,

    #[error("threshold value must be a positive number, got {0:?}")]
    InvalidThreshold(String),

    #[error("name template is empty")]
    EmptyTemplate,

    #[error("first group number must be a whole number of zero or more, got {0:?}")]
    InvalidGroupNumber(String),

    #[error("name template gives more than one flight the name {0:?}; include {{GroupNum}} or a time placeholder")]
    DuplicateGroupName(String),

    #[error("group name {0:?} would place files outside the input directory")]
    UnsafeGroupName(String),
}
