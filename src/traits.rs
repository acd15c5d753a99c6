use crate::error::Result;
use crate::models::{FilterOptions, Manga, MangaChapter, MangaListFilter, MangaPage, SortOrder};

/// HTTP collaborator the parsers fetch documents through.
///
/// Transport, retries and timeouts are the implementor's business.
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    /// GET `url` and return the response body as text.
    async fn get_text(&self, url: &str) -> Result<String>;
}

/// Source adapter consumed by the host
#[async_trait::async_trait]
pub trait MangaParser: Send + Sync {
    /// Source name used to derive identifiers
    fn source(&self) -> &str;

    /// List one page of the catalog
    async fn list(&self, page: u32, order: SortOrder, filter: &MangaListFilter) -> Result<Vec<Manga>>;

    /// Resolve the chapters of a manga whose page was already fetched
    async fn load_chapters(&self, manga_url: &str, document: &str) -> Result<Vec<MangaChapter>>;

    /// Resolve the ordered page images of a chapter
    async fn get_pages(&self, chapter: &MangaChapter) -> Result<Vec<MangaPage>>;

    /// Filters the host may offer for [`MangaParser::list`]
    async fn filter_options(&self) -> Result<FilterOptions>;

    /// Fetch a site document by absolute or site-relative URL
    async fn fetch_document(&self, url: &str) -> Result<String>;
}
