use crate::models::QuantityUnit;

#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    #[error("Cannot subtract a quantity in {right} from a quantity in {left}")]
    TypeMismatch {
        left: QuantityUnit,
        right: QuantityUnit,
    },

    #[error("Unexpectedly found a difference less than zero: {0}")]
    InvariantViolation(String),

    #[error("Malformed expression: {0}")]
    MalformedExpression(String),

    #[error("Not a simple algebraic expression: {0}")]
    NotSimpleExpression(String),

    #[error("Expression not evaluated as constant: {0}")]
    ExpressionNotEvaluated(String),

    #[error("Multiple shopping items in database with the name {0}")]
    AmbiguousMatch(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("WebDriver error: {0}")]
    WebDriver(String),

    #[error("Did not detect login")]
    LoginNotDetected,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, AssistantError>;
