use serde::{Deserialize, Serialize};

/// Mensajes de error conocidos del backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorMessage {
    BadInputData,
    UsernameOrPasswordNotCorrect,
    TestNotFound,
    TestNameAlreadyExists,
}

impl ErrorMessage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorMessage::BadInputData => "bad input data",
            ErrorMessage::UsernameOrPasswordNotCorrect => "username or password not correct",
            ErrorMessage::TestNotFound => "test not found",
            ErrorMessage::TestNameAlreadyExists => "test with such name already exists",
        }
    }
}

/// Cuerpo de error: `{"error": "..."}` con estado 400, 401 o 404
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: ErrorMessage) -> Self {
        Self { error: message.as_str().to_string() }
    }

    pub fn is(&self, message: ErrorMessage) -> bool {
        self.error == message.as_str()
    }
}
