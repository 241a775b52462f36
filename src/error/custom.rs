use std::fmt::Display;

/// Error that carries only a message, created via the err_custom_create! macro
#[derive(Debug, Clone)]
pub struct CustomError {
    pub message: String,
}

impl CustomError {
    pub fn from_owned_string(message: String) -> Self {
        CustomError { message }
    }
}

impl Display for CustomError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CustomError {}

/// Keyed-MAC mismatch on a persisted swap record. The record must not be used.
#[derive(Debug, Clone)]
pub struct IntegrityError {
    pub start_tx_hash: String,
}

impl IntegrityError {
    pub fn new(start_tx_hash: &str) -> Self {
        IntegrityError {
            start_tx_hash: start_tx_hash.to_string(),
        }
    }
}

impl Display for IntegrityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "record MAC verification failed for swap {}",
            self.start_tx_hash
        )
    }
}

impl std::error::Error for IntegrityError {}

/// Malformed input data - unparseable amount, unknown direction, unknown pair
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub message: String,
}

impl ValidationError {
    pub fn new(message: &str) -> Self {
        ValidationError {
            message: message.to_string(),
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ValidationError {}
