use crate::config::SiteConfig;
use crate::dates::{parse_chapter_date, DateFormat, SourceLocale};
use crate::error::{ParserError, Result};
use crate::html::{attr, own_text, select_first, select_first_in_doc, selector, text};
use crate::models::{generate_uid, MangaChapter};
use crate::utils::to_relative_url;
use chrono::{DateTime, Utc};
use scraper::{Html, Selector};
use std::collections::HashSet;
use tracing::{debug, info};

/// Chapter list resolution through the Madara AJAX endpoint.
pub struct MadaraScanner {
    source: String,
    base_url: String,
    suffix: String,
    date_pattern: String,
    locale: SourceLocale,
    holder: Selector,
    rows: Selector,
    link: Selector,
    date: Selector,
}

impl MadaraScanner {
    pub fn new(config: &SiteConfig) -> Result<Self> {
        let sel = &config.selectors;
        Ok(Self {
            source: config.source.clone(),
            base_url: config.base_url.clone(),
            suffix: config.chapter_suffix.clone(),
            date_pattern: config.date_pattern.clone(),
            locale: config.locale,
            holder: selector(&sel.chapters_holder)?,
            rows: selector(&sel.chapter_list)?,
            link: selector("a")?,
            date: selector(&sel.chapter_date)?,
        })
    }

    /// The internal manga id the chapter endpoint is keyed by.
    pub fn extract_manga_id(&self, manga_url: &str, document: &str) -> Result<String> {
        let document = Html::parse_document(document);
        select_first_in_doc(&document, &self.holder)
            .and_then(|holder| attr(holder, "data-id"))
            .map(str::to_string)
            .ok_or_else(|| ParserError::parse_failed("chapter holder data-id", manga_url))
    }

    /// Parse the AJAX chapter fragment.
    ///
    /// Rows arrive newest first; numbering runs oldest first starting at 1.
    /// Repeated rows are dropped without consuming a number.
    pub fn parse_chapters(&self, html: &str, now: DateTime<Utc>) -> Result<Vec<MangaChapter>> {
        let fragment = Html::parse_fragment(html);
        let rows: Vec<_> = fragment.select(&self.rows).collect();
        let format = DateFormat::new(&self.date_pattern, self.locale);

        let mut seen = HashSet::with_capacity(rows.len());
        let mut chapters = Vec::with_capacity(rows.len());

        for li in rows.into_iter().rev() {
            let link = select_first(li, &self.link)
                .ok_or_else(|| ParserError::parse_failed("chapter link", text(li)))?;
            let href = attr(link, "href")
                .map(|href| to_relative_url(href, &self.base_url))
                .ok_or_else(|| ParserError::parse_failed("chapter link href", text(li)))?;

            let id = generate_uid(&self.source, &href);
            if !seen.insert(id) {
                debug!("[MADARA SCANNER] skipping repeated chapter {}", href);
                continue;
            }

            let date_text = select_first(li, &self.date).map(text);
            let chapter = MangaChapter {
                id,
                url: format!("{}{}", href, self.suffix),
                title: own_text(link),
                number: (chapters.len() + 1) as f32,
                volume: 0,
                branch: None,
                upload_date: parse_chapter_date(date_text.as_deref(), format, now),
                scanlator: None,
                source: self.source.clone(),
            };

            debug!("[MADARA SCANNER] Found chapter: {} (number: {}) at {}",
                  chapter.title, chapter.number, chapter.url);
            chapters.push(chapter);
        }

        info!("[MADARA SCANNER] Parsed {} chapters", chapters.len());
        Ok(chapters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sites::mangapure;
    use chrono::TimeZone;

    fn scanner() -> MadaraScanner {
        MadaraScanner::new(&mangapure::site_config()).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 17, 12, 0, 0).unwrap()
    }

    fn row(href: &str, title: &str, date: &str) -> String {
        format!(
            r#"<li class="wp-manga-chapter"><a href="{}">{}</a><span class="chapter-release-date"><i>{}</i></span></li>"#,
            href, title, date
        )
    }

    #[test]
    fn newest_first_rows_are_numbered_oldest_first() {
        let html = format!(
            "<ul>{}{}{}</ul>",
            row("https://mangapure.net/manga/x/chapter-3/", "Chapter 3", "October 1, 10:00"),
            row("https://mangapure.net/manga/x/chapter-2/", "Chapter 2", "September 20, 08:30"),
            row("https://mangapure.net/manga/x/chapter-1/", "Chapter 1", "not a date"),
        );
        let chapters = scanner().parse_chapters(&html, now()).unwrap();

        let numbered: Vec<_> = chapters.iter().map(|c| (c.number, c.title.as_str())).collect();
        assert_eq!(numbered, vec![(1.0, "Chapter 1"), (2.0, "Chapter 2"), (3.0, "Chapter 3")]);

        assert_eq!(chapters[0].upload_date, None);
        assert_eq!(
            chapters[2].upload_date,
            Some(Utc.with_ymd_and_hms(2026, 10, 1, 10, 0, 0).unwrap())
        );
        assert!(chapters.iter().all(|c| c.volume == 0 && c.branch.is_none() && c.scanlator.is_none()));
    }

    #[test]
    fn every_chapter_url_carries_the_style_suffix() {
        let html = format!(
            "<ul>{}{}</ul>",
            row("/manga/x/chapter-2/", "Two", ""),
            row("https://mangapure.net/manga/x/chapter-1", "One", ""),
        );
        let chapters = scanner().parse_chapters(&html, now()).unwrap();
        assert_eq!(chapters[0].url, "/manga/x/chapter-1?style=list");
        assert_eq!(chapters[1].url, "/manga/x/chapter-2/?style=list");
        assert!(chapters.iter().all(|c| c.url.ends_with("?style=list")));
    }

    #[test]
    fn chapter_id_ignores_the_suffix() {
        let html = format!("<ul>{}</ul>", row("/manga/x/chapter-1/", "One", ""));
        let chapters = scanner().parse_chapters(&html, now()).unwrap();
        assert_eq!(chapters[0].id, generate_uid(mangapure::SOURCE, "/manga/x/chapter-1/"));
    }

    #[test]
    fn repeated_rows_do_not_consume_numbers() {
        let html = format!(
            "<ul>{}{}{}</ul>",
            row("/manga/x/chapter-2/", "Two", ""),
            row("/manga/x/chapter-1/", "One", ""),
            row("/manga/x/chapter-1/", "One again", ""),
        );
        let chapters = scanner().parse_chapters(&html, now()).unwrap();
        let numbered: Vec<_> = chapters.iter().map(|c| (c.number, c.title.as_str())).collect();
        assert_eq!(numbered, vec![(1.0, "One again"), (2.0, "Two")]);
    }

    #[test]
    fn row_without_link_is_a_parse_failure() {
        let html = format!(
            r#"<ul>{}<li class="wp-manga-chapter"><span>Locked</span></li></ul>"#,
            row("/manga/x/chapter-1/", "One", "")
        );
        let err = scanner().parse_chapters(&html, now()).unwrap_err();
        assert!(err.is_structural());
    }

    #[test]
    fn manga_id_comes_from_the_chapter_holder() {
        let page = r#"<div id="manga-chapters-holder-7" data-id="987"></div>"#;
        assert_eq!(scanner().extract_manga_id("/manga/x/", page).unwrap(), "987");

        let err = scanner().extract_manga_id("/manga/x/", "<div></div>").unwrap_err();
        assert!(err.is_structural());
    }
}
