use thiserror::Error;

pub type Result<T> = std::result::Result<T, SiteError>;

#[derive(Debug, Error)]
pub enum SiteError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("webdriver error: {error}: {message}")]
    WebDriver { error: String, message: String },
    #[error("element not found: {0}")]
    ElementNotFound(String),
    #[error("timed out waiting for: {0}")]
    WaitTimeout(String),
    #[error("challenge recognition failed: {0}")]
    Challenge(String),
    #[error("unknown site: {0}")]
    UnknownSite(String),
    #[error("other: {0}")]
    Other(String),
}

impl SiteError {
    pub fn webdriver(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self::WebDriver {
            error: error.into(),
            message: message.into(),
        }
    }
}
