use thiserror::Error;

/// The error surface the embedding application sees from the engine's
/// use cases.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Internal error")]
    InternalError,
    #[error("Invalid data provided: Error message: `{0}`")]
    BadClientData(String),
    #[error("404 Not found. Error message: `{0}`")]
    NotFound(String),
}
