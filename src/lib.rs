//! MangaPure source adapter on top of a shared Madara scraping engine.
//!
//! The pipeline runs in three independent stages: [`MangaParser::list`]
//! finds catalog entries, [`MangaParser::load_chapters`] resolves a manga's
//! chapters through the theme's AJAX endpoint, and [`MangaParser::get_pages`]
//! resolves a chapter's images. Fetching goes through a [`Fetcher`].

pub mod checkers;
pub mod config;
pub mod dates;
pub mod downloaders;
pub mod error;
pub mod html;
pub mod madara;
pub mod models;
pub mod registry;
pub mod scanners;
pub mod sites;
pub mod traits;
pub mod utils;

pub use config::{Config, SiteConfig};
pub use error::{ParserError, Result};
pub use madara::{MadaraParser, SiteHooks};
pub use models::{FilterOptions, Manga, MangaChapter, MangaListFilter, MangaPage, MangaTag, SortOrder};
pub use registry::ParserRegistry;
pub use traits::{Fetcher, MangaParser};
pub use utils::HttpClient;
