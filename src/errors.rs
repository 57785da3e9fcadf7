use sea_orm::error::DbErr;

/// Domain and infrastructure errors raised during command processing.
///
/// Every variant is eventually rendered into the wire `ERROR|<message>`
/// envelope by the connection handler; nothing here ever terminates a
/// connection or the process.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DbErr),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// An inbound movement would push stock past the product's ceiling.
    #[error("Stock capacity exceeded: {0}")]
    CapacityExceeded(String),

    /// An outbound movement would push stock below zero.
    #[error("Insufficient stock: {0}")]
    InsufficientStock(String),

    #[error("Unrecognized operation: {0}")]
    UnrecognizedAction(String),

    #[error("Event error: {0}")]
    EventError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

impl ServiceError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Returns the message placed after `ERROR|` on the wire.
    ///
    /// Infrastructure failures collapse to a generic sentence so clients
    /// never see driver internals; domain errors keep their full text.
    pub fn wire_message(&self) -> String {
        match self {
            Self::DatabaseError(_) => "Internal storage error".to_string(),
            Self::EventError(_) | Self::InternalError(_) => "Internal server error".to_string(),
            Self::ValidationError(msg)
            | Self::NotFound(msg)
            | Self::Conflict(msg)
            | Self::CapacityExceeded(msg)
            | Self::InsufficientStock(msg) => msg.clone(),
            Self::UnrecognizedAction(_) => self.to_string(),
        }
    }
}
