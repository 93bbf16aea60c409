use thiserror::Error;

#[derive(Debug, Error)]
pub enum MarketError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Bitquery returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Bitquery query failed: {0}")]
    GraphQl(String),

    #[error("Invalid response from Bitquery: {0}")]
    InvalidResponse(String),
}
