use crate::config::{Config, HttpConfig, SiteConfig};
use crate::error::{ParserError, Result};
use crate::madara::{MadaraParser, SiteHooks};
use crate::sites::mangapure;
use crate::traits::{Fetcher, MangaParser};
use crate::utils::HttpClient;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Hook set for a site's `parser_type`.
pub fn hooks_for(site: SiteConfig) -> Result<SiteHooks> {
    match site.parser_type.as_str() {
        "mangapure" => Ok(mangapure::hooks(site)),
        "madara" => Ok(SiteHooks::madara(site)),
        other => Err(ParserError::site_not_supported(other)),
    }
}

/// Registry for managing parsers, keyed by site name
pub struct ParserRegistry {
    parsers: HashMap<String, Box<dyn MangaParser>>,
}

impl ParserRegistry {
    pub fn new() -> Self {
        Self {
            parsers: HashMap::new(),
        }
    }

    /// One parser per configured site, each with its own HTTP client.
    ///
    /// Sites with an unknown parser type are skipped with a warning.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut registry = Self::new();
        for (name, site) in &config.sites {
            match build_parser(&config.http, site) {
                Ok(parser) => {
                    debug!("Registered parser '{}' ({})", name, site.parser_type);
                    registry.register_parser(name, parser);
                }
                Err(ParserError::SiteNotSupported(kind)) => {
                    warn!("Site '{}' has unsupported parser type '{}'", name, kind);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(registry)
    }

    pub fn register_parser(&mut self, name: &str, parser: Box<dyn MangaParser>) {
        self.parsers.insert(name.to_string(), parser);
    }

    pub fn get_parser(&self, name: &str) -> Option<&dyn MangaParser> {
        self.parsers.get(name).map(|p| p.as_ref())
    }

    pub fn site_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.parsers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Parser for `site` fetching through a fresh [`HttpClient`].
pub fn build_parser(http: &HttpConfig, site: &SiteConfig) -> Result<Box<dyn MangaParser>> {
    let hooks = hooks_for(site.clone())?;
    let fetcher: Arc<dyn Fetcher> = Arc::new(HttpClient::new(http, site)?);
    Ok(Box::new(MadaraParser::new(hooks, fetcher)?))
}
