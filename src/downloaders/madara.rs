use crate::config::{PageFormat, SiteConfig};
use crate::error::{ParserError, Result};
use crate::html::{image_src, selector, text};
use crate::models::{generate_uid, MangaPage};
use scraper::{Html, Selector};
use tracing::{debug, info, warn};

/// Page list resolution for a chapter document.
pub struct MadaraDownloader {
    source: String,
    base_url: String,
    format: PageFormat,
    pages: Selector,
}

impl MadaraDownloader {
    pub fn new(config: &SiteConfig) -> Result<Self> {
        Ok(Self {
            source: config.source.clone(),
            base_url: config.base_url.clone(),
            format: config.page_format,
            pages: selector(&config.selectors.page_list)?,
        })
    }

    /// Ordered pages of the chapter at `chapter_url`.
    pub fn parse_pages(&self, chapter_url: &str, html: &str) -> Result<Vec<MangaPage>> {
        debug!("[MADARA DOWNLOADER] Parsing pages from {} ({:?})", chapter_url, self.format);
        let document = Html::parse_document(html);

        let urls = match self.format {
            PageFormat::CommaList => {
                let marker = document
                    .select(&self.pages)
                    .next()
                    .ok_or_else(|| ParserError::parse_failed("page list marker", chapter_url))?;
                split_page_list(&text(marker))
            }
            PageFormat::Images => document
                .select(&self.pages)
                .filter_map(|img| image_src(img, &self.base_url))
                .collect(),
        };

        if urls.is_empty() {
            return Err(ParserError::parse_failed("chapter pages", chapter_url));
        }

        let pages: Vec<MangaPage> = urls
            .into_iter()
            .map(|url| MangaPage {
                id: generate_uid(&self.source, &url),
                url,
                preview: None,
                source: self.source.clone(),
            })
            .collect();

        info!("[MADARA DOWNLOADER] Successfully parsed {} pages", pages.len());
        Ok(pages)
    }
}

/// Split the delimited image list, keeping token order and text.
///
/// Blank tokens (trailing or doubled commas) would become pages without a URL
/// and are dropped.
pub fn split_page_list(list: &str) -> Vec<String> {
    let mut urls = Vec::new();
    for (index, token) in list.split(',').enumerate() {
        if token.trim().is_empty() {
            warn!("[MADARA DOWNLOADER] blank page token at position {}", index);
            continue;
        }
        urls.push(token.to_string());
    }
    urls
}
