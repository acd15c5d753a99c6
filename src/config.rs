use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::dates::SourceLocale;
use crate::error::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub sites: HashMap<String, SiteConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub user_agent: String,
}

/// Everything a Madara-family site can tune without code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub name: String,
    /// Source key; feeds identifier generation.
    pub source: String,
    pub base_url: String,
    pub parser_type: String,
    pub locale: SourceLocale,
    pub nsfw: bool,
    pub rate_limit_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,
    pub tag_prefix: String,
    pub list_url: String,
    /// chrono format string for absolute chapter dates.
    pub date_pattern: String,
    pub chapter_suffix: String,
    pub chapters_endpoint: String,
    pub first_page: u32,
    pub search_first_page: u32,
    pub page_format: PageFormat,
    pub selectors: SelectorsConfig,
}

/// How a chapter page lists its images.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PageFormat {
    /// One `<img>` per page under `selectors.page_list`.
    #[default]
    Images,
    /// A single element whose text is a comma-separated URL list.
    CommaList,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorsConfig {
    pub manga_list: String,
    pub manga_list_fallback: String,
    /// Tried in order, first hit wins.
    pub summary: Vec<String>,
    pub title: Vec<String>,
    pub rating: String,
    pub genres: String,
    pub author: String,
    pub status: String,
    pub chapters_holder: String,
    pub chapter_list: String,
    pub chapter_date: String,
    pub page_list: String,
    pub tag_menu: Vec<String>,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load `path`, or fall back to the built-in sites when it does not exist.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            info!("Config {} not found, using built-in defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn get_site_config(&self, site_name: &str) -> Option<&SiteConfig> {
        self.sites.get(site_name)
    }
}

impl Default for Config {
    fn default() -> Self {
        let mut sites = HashMap::new();
        sites.insert("mangapure".to_string(), crate::sites::mangapure::site_config());

        Config {
            http: HttpConfig::default(),
            sites,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            connect_timeout_secs: 10,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
        }
    }
}

/// Stock Madara theme values. Sites override what differs.
impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            source: String::new(),
            base_url: String::new(),
            parser_type: "madara".to_string(),
            locale: SourceLocale::English,
            nsfw: false,
            rate_limit_ms: 0,
            user_agent: None,
            headers: None,
            tag_prefix: "manga-genre/".to_string(),
            list_url: "manga/".to_string(),
            date_pattern: "%B %d, %Y".to_string(),
            chapter_suffix: "?style=list".to_string(),
            chapters_endpoint: "ajax-list-chapter?mangaID=".to_string(),
            first_page: 0,
            search_first_page: 0,
            page_format: PageFormat::Images,
            selectors: SelectorsConfig::default(),
        }
    }
}

impl Default for SelectorsConfig {
    fn default() -> Self {
        Self {
            manga_list: "div.row.c-tabs-item__content".to_string(),
            manga_list_fallback: "div.page-item-detail".to_string(),
            summary: vec![".tab-summary".to_string(), ".item-summary".to_string()],
            title: vec!["h3".to_string(), "h4".to_string()],
            rating: "span.total_votes".to_string(),
            genres: ".mg_genres".to_string(),
            author: ".mg_author".to_string(),
            status: ".mg_status .summary-content".to_string(),
            chapters_holder: "div[id^=manga-chapters-holder]".to_string(),
            chapter_list: "li.wp-manga-chapter".to_string(),
            chapter_date: "span.chapter-release-date i".to_string(),
            page_list: "div.page-break img".to_string(),
            tag_menu: vec![
                "header ul.second-menu li a".to_string(),
                "div.genres_wrap ul.list-unstyled li a".to_string(),
            ],
        }
    }
}
