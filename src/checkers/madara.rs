use crate::config::SiteConfig;
use crate::error::{ParserError, Result};
use crate::html::{attr, image_src, own_text, select_first, select_first_of, selector, selectors, text};
use crate::models::{generate_uid, ContentRating, Manga, MangaState, MangaTag, RATING_UNKNOWN};
use crate::utils::{last_path_segment, title_case, to_absolute_url, to_relative_url};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Catalog listing extraction for Madara layouts.
pub struct MadaraCatalogChecker {
    source: String,
    base_url: String,
    tag_prefix: String,
    nsfw: bool,
    list: Selector,
    list_fallback: Selector,
    link: Selector,
    summary: Vec<Selector>,
    title: Vec<Selector>,
    cover: Selector,
    rating: Selector,
    genres: Selector,
    author: Selector,
    status: Selector,
    tag_menu: Vec<Selector>,
    tag_count: Regex,
}

impl MadaraCatalogChecker {
    pub fn new(config: &SiteConfig) -> Result<Self> {
        let sel = &config.selectors;
        Ok(Self {
            source: config.source.clone(),
            base_url: config.base_url.clone(),
            tag_prefix: config.tag_prefix.clone(),
            nsfw: config.nsfw,
            list: selector(&sel.manga_list)?,
            list_fallback: selector(&sel.manga_list_fallback)?,
            link: selector("a")?,
            summary: selectors(&sel.summary)?,
            title: selectors(&sel.title)?,
            cover: selector("img")?,
            rating: selector(&sel.rating)?,
            genres: selector(&sel.genres)?,
            author: selector(&sel.author)?,
            status: selector(&sel.status)?,
            tag_menu: selectors(&sel.tag_menu)?,
            tag_count: Regex::new(r"\s*\(\d+\)\s*$")?,
        })
    }

    /// Extract every catalog item of a listing page.
    ///
    /// The fallback container selector only runs when the primary one matches
    /// nothing. A container without a link fails the whole page.
    pub fn parse_catalog(&self, html: &str) -> Result<Vec<Manga>> {
        let document = Html::parse_document(html);

        let mut containers: Vec<ElementRef> = document.select(&self.list).collect();
        if containers.is_empty() {
            containers = document.select(&self.list_fallback).collect();
            debug!("[MADARA CATALOG] primary containers empty, fallback found {}", containers.len());
        }

        let manga = containers
            .into_iter()
            .map(|div| self.parse_item(div))
            .collect::<Result<Vec<_>>>()?;

        info!("[MADARA CATALOG] page parsed, items: {}", manga.len());
        Ok(manga)
    }

    fn parse_item(&self, div: ElementRef<'_>) -> Result<Manga> {
        let href = select_first(div, &self.link)
            .and_then(|a| attr(a, "href"))
            .ok_or_else(|| ParserError::parse_failed("manga link", snippet(div)))?;
        let href = to_relative_url(href, &self.base_url);

        let summary = select_first_of(div, &self.summary);
        let title = summary
            .and_then(|s| select_first_of(s, &self.title))
            .map(text)
            .unwrap_or_default();

        let tags = summary
            .and_then(|s| select_first(s, &self.genres))
            .map(|genres| {
                genres
                    .select(&self.link)
                    .filter_map(|a| self.tag_from_anchor(a))
                    .collect()
            })
            .unwrap_or_default();

        let authors = summary
            .and_then(|s| select_first(s, &self.author))
            .and_then(|block| select_first(block, &self.link))
            .map(own_text)
            .filter(|name| !name.is_empty())
            .into_iter()
            .collect();

        let state = summary
            .and_then(|s| select_first(s, &self.status))
            .map(own_text)
            .and_then(|status| parse_state(&status));

        debug!("[MADARA CATALOG] {} -> '{}'", href, title);

        Ok(Manga {
            id: generate_uid(&self.source, &href),
            public_url: to_absolute_url(&href, &self.base_url),
            cover_url: select_first(div, &self.cover).and_then(|img| image_src(img, &self.base_url)),
            title,
            alt_titles: BTreeSet::new(),
            rating: parse_rating(select_first(div, &self.rating).map(own_text).as_deref()),
            tags,
            authors,
            state,
            content_rating: self.nsfw.then_some(ContentRating::Adult),
            source: self.source.clone(),
            url: href,
        })
    }

    /// Tag from a genre link. The key is the slug exactly as the site prints it.
    fn tag_from_anchor(&self, a: ElementRef<'_>) -> Option<MangaTag> {
        let title = text(a);
        if title.is_empty() {
            return None;
        }
        let key = last_path_segment(attr(a, "href")?);
        if key.is_empty() {
            return None;
        }
        Some(MangaTag {
            key: key.to_string(),
            title: title_case(&title),
            source: self.source.clone(),
        })
    }

    /// Genres advertised in the site menu, keyed by the path after the tag prefix.
    pub fn parse_available_tags(&self, html: &str) -> Result<BTreeSet<MangaTag>> {
        let document = Html::parse_document(html);
        let root = document.root_element();

        let anchors: Vec<ElementRef> = self
            .tag_menu
            .iter()
            .map(|sel| root.select(sel).collect::<Vec<_>>())
            .find(|found| !found.is_empty())
            .unwrap_or_default();

        let tags = anchors
            .into_iter()
            .filter_map(|a| {
                let href = attr(a, "href")?;
                let (_, after) = href.split_once(&self.tag_prefix)?;
                let key = after.trim_end_matches('/');
                let title = self.tag_count.replace(&text(a), "").into_owned();
                if key.is_empty() || title.is_empty() {
                    return None;
                }
                Some(MangaTag {
                    key: key.to_string(),
                    title: title_case(&title),
                    source: self.source.clone(),
                })
            })
            .collect();
        Ok(tags)
    }
}

/// Vote text on a 0-5 scale mapped to a fraction, or [`RATING_UNKNOWN`].
pub fn parse_rating(votes: Option<&str>) -> f32 {
    votes
        .and_then(|v| v.trim().parse::<f32>().ok())
        .filter(|v| (0.0..=5.0).contains(v))
        .map(|v| v / 5.0)
        .unwrap_or(RATING_UNKNOWN)
}

fn parse_state(status: &str) -> Option<MangaState> {
    match status.trim().to_lowercase().as_str() {
        "ongoing" => Some(MangaState::Ongoing),
        "completed" => Some(MangaState::Finished),
        _ => None,
    }
}

fn snippet(el: ElementRef<'_>) -> String {
    text(el).chars().take(80).collect()
}
