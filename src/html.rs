//! Find-or-default lookups over `scraper` elements.

use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

use crate::error::{ParserError, Result};
use crate::utils::to_absolute_url;

pub fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ParserError::Selector(format!("{}: {:?}", css, e)))
}

/// Compile selectors meant to be tried in order.
pub fn selectors(css: &[String]) -> Result<Vec<Selector>> {
    css.iter().map(|s| selector(s)).collect()
}

pub fn select_first<'a>(el: ElementRef<'a>, sel: &Selector) -> Option<ElementRef<'a>> {
    el.select(sel).next()
}

/// First match of the first selector that matches anything.
pub fn select_first_of<'a>(el: ElementRef<'a>, sels: &[Selector]) -> Option<ElementRef<'a>> {
    sels.iter().find_map(|sel| select_first(el, sel))
}

pub fn select_first_in_doc<'a>(doc: &'a Html, sel: &Selector) -> Option<ElementRef<'a>> {
    doc.select(sel).next()
}

/// Descendant text with whitespace runs collapsed.
pub fn text(el: ElementRef<'_>) -> String {
    el.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" ")
}

/// Text of direct text children only, whitespace collapsed.
pub fn own_text(el: ElementRef<'_>) -> String {
    let raw: String = el
        .children()
        .filter_map(|child| match child.value() {
            Node::Text(t) => Some(&**t),
            _ => None,
        })
        .collect();
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Non-empty attribute value.
pub fn attr<'a>(el: ElementRef<'a>, name: &str) -> Option<&'a str> {
    el.value().attr(name).map(str::trim).filter(|v| !v.is_empty())
}

/// Image source honoring the lazy-load attributes Madara themes use.
pub fn image_src(img: ElementRef<'_>, base_url: &str) -> Option<String> {
    ["data-src", "data-lazy-src", "data-cfsrc", "src"]
        .iter()
        .find_map(|name| attr(img, name))
        .or_else(|| {
            attr(img, "srcset")
                .and_then(|set| set.split(',').next())
                .and_then(|first| first.split_whitespace().next())
        })
        .map(|src| to_absolute_url(src, base_url))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first<'a>(doc: &'a Html, css: &str) -> ElementRef<'a> {
        doc.select(&selector(css).unwrap()).next().unwrap()
    }

    #[test]
    fn own_text_skips_child_elements() {
        let doc = Html::parse_fragment(r#"<span class="v"> 4.5 <i>votes</i></span>"#);
        let el = first(&doc, "span.v");
        assert_eq!(own_text(el), "4.5");
        assert_eq!(text(el), "4.5 votes");
    }

    #[test]
    fn lazy_image_source_wins_over_placeholder() {
        let doc = Html::parse_fragment(
            r#"<img src="data:image/gif;base64,R0l" data-src="/covers/a.jpg">"#,
        );
        assert_eq!(
            image_src(first(&doc, "img"), "https://mangapure.net"),
            Some("https://mangapure.net/covers/a.jpg".to_string())
        );
    }

    #[test]
    fn image_without_source_has_none() {
        let doc = Html::parse_fragment(r#"<img alt="x">"#);
        assert_eq!(image_src(first(&doc, "img"), "https://mangapure.net"), None);
    }

    #[test]
    fn select_first_of_respects_selector_priority() {
        let doc = Html::parse_fragment(
            r#"<div id="root"><div class="item-summary">b</div><div class="tab-summary">a</div></div>"#,
        );
        let root = first(&doc, "#root");
        let sels = selectors(&[".tab-summary".to_string(), ".item-summary".to_string()]).unwrap();
        assert_eq!(text(select_first_of(root, &sels).unwrap()), "a");
    }

    #[test]
    fn bad_css_is_a_selector_error() {
        assert!(matches!(selector("div[").unwrap_err(), ParserError::Selector(_)));
    }
}
