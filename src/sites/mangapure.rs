//! mangapure.net, a Madara site with its own listing routes.
//!
//! Differences from the stock theme: `mangas/` tag pages with a numeric
//! `orderby`, dedicated popular/latest listings, 1-based pagination,
//! year-less chapter dates, and chapter images published as a single
//! comma-separated list in `p#arraydata`.

use std::collections::BTreeSet;

use crate::config::{PageFormat, SelectorsConfig, SiteConfig};
use crate::error::Result;
use crate::madara::SiteHooks;
use crate::models::{FilterOptions, MangaListFilter, SortOrder};
use crate::utils::url_encode;

pub const SOURCE: &str = "MANGAPURE";

pub fn site_config() -> SiteConfig {
    SiteConfig {
        name: "MangaPure".to_string(),
        source: SOURCE.to_string(),
        base_url: "https://mangapure.net".to_string(),
        parser_type: "mangapure".to_string(),
        rate_limit_ms: 500,
        tag_prefix: "mangas/".to_string(),
        list_url: "latest-manga/".to_string(),
        date_pattern: "%B %d, %H:%M".to_string(),
        first_page: 1,
        search_first_page: 1,
        page_format: PageFormat::CommaList,
        selectors: SelectorsConfig {
            manga_list_fallback: "div.page-item-detail.manga".to_string(),
            page_list: "p#arraydata".to_string(),
            ..SelectorsConfig::default()
        },
        ..SiteConfig::default()
    }
}

pub fn hooks(config: SiteConfig) -> SiteHooks {
    SiteHooks {
        config,
        list_url,
        narrow_filters,
        sort_orders: BTreeSet::from([SortOrder::Popularity, SortOrder::Updated]),
    }
}

/// Search, tag listing and plain listing are mutually exclusive, in that order.
pub fn list_url(config: &SiteConfig, page: u32, order: SortOrder, filter: &MangaListFilter) -> Result<String> {
    let base = config.base_url.trim_end_matches('/');
    let tag = filter.one_tag()?;

    if let Some(query) = filter.search_query() {
        // The search page has no sort parameter.
        return Ok(format!(
            "{}/search?s={}&page={}&post_type=wp-manga",
            base,
            url_encode(query),
            page
        ));
    }

    let url = match tag {
        Some(tag) => {
            let orderby = match order {
                SortOrder::Popularity => 2,
                _ => 3,
            };
            format!("{}/{}{}?orderby={}&page={}", base, config.tag_prefix, tag.key, orderby, page)
        }
        None => {
            let path = match order {
                SortOrder::Popularity => "popular-manga",
                _ => "latest-manga",
            };
            format!("{}/{}?page={}", base, path, page)
        }
    };
    Ok(url)
}

/// No status or content-rating filtering on this site.
fn narrow_filters(options: FilterOptions) -> FilterOptions {
    FilterOptions {
        available_states: BTreeSet::new(),
        available_content_rating: BTreeSet::new(),
        ..options
    }
}
