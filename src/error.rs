use thiserror::Error;

#[derive(Error, Debug)]
pub enum LcaError {
    #[error("Could not fetch family tree data for {0}")]
    MissingInputData(String),

    #[error("Person '{0}' not found in family graph")]
    UnknownPerson(String),

    #[error("Invalid WikiTree key '{0}': expected 'Surname-123' or a numeric id")]
    InvalidKey(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, LcaError>;
