use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParserError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Configuration write error: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    #[error("Invalid selector: {0}")]
    Selector(String),

    #[error("Invalid pattern: {0}")]
    Regex(#[from] regex::Error),

    #[error("Parse failed: {what} ({context})")]
    ParseFailed { what: String, context: String },

    #[error("Precondition violated: {0}")]
    Precondition(String),

    #[error("Site not supported: {0}")]
    SiteNotSupported(String),
}

impl ParserError {
    pub fn parse_failed(what: impl Into<String>, context: impl Into<String>) -> Self {
        Self::ParseFailed {
            what: what.into(),
            context: context.into(),
        }
    }

    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::Precondition(msg.into())
    }

    pub fn site_not_supported(site: impl Into<String>) -> Self {
        Self::SiteNotSupported(site.into())
    }

    /// Structural failures mean the page no longer matches the template.
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::ParseFailed { .. })
    }
}

pub type Result<T> = std::result::Result<T, ParserError>;
