//! Shared engine for sites built on the WordPress Madara theme.
//!
//! A site plugs in through [`SiteHooks`]: its [`SiteConfig`] plus the few
//! behaviors that cannot be expressed as data. Anything a site leaves alone
//! falls back to the stock Madara behavior defined here.

use chrono::Utc;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info};

use crate::checkers::madara::MadaraCatalogChecker;
use crate::config::SiteConfig;
use crate::downloaders::madara::MadaraDownloader;
use crate::error::{ParserError, Result};
use crate::models::{
    ContentRating, FilterOptions, Manga, MangaChapter, MangaListFilter, MangaPage, MangaState, SortOrder,
};
use crate::scanners::madara::MadaraScanner;
use crate::traits::{Fetcher, MangaParser};
use crate::utils::{to_absolute_url, url_encode};

/// Builds the listing URL for `(page, order, filter)`.
pub type ListUrlBuilder = fn(&SiteConfig, u32, SortOrder, &MangaListFilter) -> Result<String>;

/// Adjusts the filter options the engine would advertise.
pub type FilterNarrower = fn(FilterOptions) -> FilterOptions;

/// Per-site customization points of the engine.
#[derive(Clone)]
pub struct SiteHooks {
    pub config: SiteConfig,
    pub list_url: ListUrlBuilder,
    pub narrow_filters: FilterNarrower,
    pub sort_orders: BTreeSet<SortOrder>,
}

impl SiteHooks {
    /// Stock Madara behavior for `config`.
    pub fn madara(config: SiteConfig) -> Self {
        Self {
            config,
            list_url: default_list_url,
            narrow_filters: |options| options,
            sort_orders: BTreeSet::from([
                SortOrder::Updated,
                SortOrder::Popularity,
                SortOrder::Newest,
                SortOrder::Alphabetical,
                SortOrder::Rating,
            ]),
        }
    }
}

/// `/page/N/?s=...&post_type=wp-manga&genre[]=...&m_orderby=...`
pub fn default_list_url(
    config: &SiteConfig,
    page: u32,
    order: SortOrder,
    filter: &MangaListFilter,
) -> Result<String> {
    let base = config.base_url.trim_end_matches('/');
    let site_page = page.saturating_sub(config.first_page) + 1;

    let mut url = format!("{}/page/{}/?s=", base, site_page);
    if let Some(query) = filter.search_query() {
        url.push_str(&url_encode(query));
    }
    url.push_str("&post_type=wp-manga");
    for tag in &filter.tags {
        url.push_str("&genre[]=");
        url.push_str(&tag.key);
    }
    url.push_str("&m_orderby=");
    url.push_str(match order {
        SortOrder::Popularity => "views",
        SortOrder::Updated => "latest",
        SortOrder::Newest => "new-manga",
        SortOrder::Alphabetical => "alphabet",
        SortOrder::Rating => "rating",
    });
    Ok(url)
}

/// Madara parser driven by a [`SiteHooks`] set.
pub struct MadaraParser {
    hooks: SiteHooks,
    fetcher: Arc<dyn Fetcher>,
    catalog: MadaraCatalogChecker,
    scanner: MadaraScanner,
    downloader: MadaraDownloader,
}

impl MadaraParser {
    pub fn new(hooks: SiteHooks, fetcher: Arc<dyn Fetcher>) -> Result<Self> {
        let catalog = MadaraCatalogChecker::new(&hooks.config)?;
        let scanner = MadaraScanner::new(&hooks.config)?;
        let downloader = MadaraDownloader::new(&hooks.config)?;
        Ok(Self {
            hooks,
            fetcher,
            catalog,
            scanner,
            downloader,
        })
    }

    pub fn config(&self) -> &SiteConfig {
        &self.hooks.config
    }

    /// Listing URL for the request, after precondition checks.
    pub fn list_url(&self, page: u32, order: SortOrder, filter: &MangaListFilter) -> Result<String> {
        let config = &self.hooks.config;
        let first_page = if filter.search_query().is_some() {
            config.search_first_page
        } else {
            config.first_page
        };
        if page < first_page {
            return Err(ParserError::precondition(format!(
                "page {} is below the first page {}",
                page, first_page
            )));
        }
        (self.hooks.list_url)(config, page, order, filter)
    }

    fn chapters_url(&self, manga_id: &str) -> String {
        let config = &self.hooks.config;
        format!(
            "{}/{}{}",
            config.base_url.trim_end_matches('/'),
            config.chapters_endpoint,
            url_encode(manga_id)
        )
    }
}

#[async_trait::async_trait]
impl MangaParser for MadaraParser {
    fn source(&self) -> &str {
        &self.hooks.config.source
    }

    async fn list(&self, page: u32, order: SortOrder, filter: &MangaListFilter) -> Result<Vec<Manga>> {
        let url = self.list_url(page, order, filter)?;
        info!("[MADARA] Listing {} page {} ({}): {}", self.hooks.config.name, page, order, url);

        let html = self.fetcher.get_text(&url).await?;
        let manga = self.catalog.parse_catalog(&html)?;

        info!("[MADARA] Found {} manga on {}", manga.len(), url);
        Ok(manga)
    }

    async fn load_chapters(&self, manga_url: &str, document: &str) -> Result<Vec<MangaChapter>> {
        let manga_id = self.scanner.extract_manga_id(manga_url, document)?;
        let url = self.chapters_url(&manga_id);
        debug!("[MADARA] mangaID={} for {}, chapters from {}", manga_id, manga_url, url);

        let html = self.fetcher.get_text(&url).await?;
        let chapters = self.scanner.parse_chapters(&html, Utc::now())?;

        info!("[MADARA] Found {} chapters for {}", chapters.len(), manga_url);
        Ok(chapters)
    }

    async fn get_pages(&self, chapter: &MangaChapter) -> Result<Vec<MangaPage>> {
        let url = to_absolute_url(&chapter.url, &self.hooks.config.base_url);
        info!("[MADARA] Getting pages from: {}", url);

        let html = self.fetcher.get_text(&url).await?;
        let pages = self.downloader.parse_pages(&url, &html)?;

        info!("[MADARA] Found {} pages for chapter: {}", pages.len(), chapter.title);
        Ok(pages)
    }

    async fn filter_options(&self) -> Result<FilterOptions> {
        let config = &self.hooks.config;
        let url = to_absolute_url(&config.list_url, &config.base_url);
        let html = self.fetcher.get_text(&url).await?;
        let available_tags = self.catalog.parse_available_tags(&html)?;
        debug!("[MADARA] {} tags advertised by {}", available_tags.len(), url);

        let options = FilterOptions {
            available_tags,
            available_states: BTreeSet::from([
                MangaState::Ongoing,
                MangaState::Finished,
                MangaState::Abandoned,
                MangaState::Paused,
            ]),
            available_content_rating: BTreeSet::from([ContentRating::Safe, ContentRating::Adult]),
            available_sort_orders: self.hooks.sort_orders.clone(),
        };
        Ok((self.hooks.narrow_filters)(options))
    }

    async fn fetch_document(&self, url: &str) -> Result<String> {
        let url = to_absolute_url(url, &self.hooks.config.base_url);
        self.fetcher.get_text(&url).await
    }
}
