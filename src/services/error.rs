use thiserror::Error;

/// Failure taxonomy for the two auth flows. The first three variants are
/// terminal, user-facing outcomes that callers match on; `Store` and
/// `Token` carry infrastructure failures from collaborators and are not
/// part of the user-facing taxonomy.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Unknown email or password mismatch. Deliberately collapsed into one
    /// outcome so callers cannot tell which part failed.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid or already used code")]
    InvalidCode,

    #[error("Code has expired")]
    CodeExpired,

    #[error("Store error: {0}")]
    Store(anyhow::Error),

    #[error("Token error: {0}")]
    Token(anyhow::Error),

    #[error("Configuration error: {0}")]
    Config(anyhow::Error),
}
