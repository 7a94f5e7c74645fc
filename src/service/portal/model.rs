#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Success(String),
    InvalidCredentials(String),
    NetworkError(String),
    Ambiguous(String),
}

impl LoginOutcome {
    pub fn message(&self) -> &str {
        match self {
            LoginOutcome::Success(message)
            | LoginOutcome::InvalidCredentials(message)
            | LoginOutcome::NetworkError(message)
            | LoginOutcome::Ambiguous(message) => message,
        }
    }

    // A 2xx response with no recognizable marker counts as success; the
    // portal frequently answers that way after a valid login.
    pub fn is_success(&self) -> bool {
        matches!(self, LoginOutcome::Success(_) | LoginOutcome::Ambiguous(_))
    }
}
