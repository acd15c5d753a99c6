use crate::config::{HttpConfig, SiteConfig};
use crate::error::{ParserError, Result};
use crate::traits::Fetcher;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::Client;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// reqwest-backed [`Fetcher`] for one site.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    headers: HashMap<String, String>,
    limiter: Option<Arc<DefaultDirectRateLimiter>>,
}

impl HttpClient {
    pub fn new(http: &HttpConfig, site: &SiteConfig) -> Result<Self> {
        let user_agent = site.user_agent.as_deref().unwrap_or(&http.user_agent);
        let client = Client::builder()
            .timeout(Duration::from_secs(http.timeout_secs))
            .connect_timeout(Duration::from_secs(http.connect_timeout_secs))
            .user_agent(user_agent)
            .build()?;

        let limiter = Quota::with_period(Duration::from_millis(site.rate_limit_ms))
            .map(|quota| Arc::new(RateLimiter::direct(quota)));

        Ok(Self {
            client,
            headers: site.headers.clone().unwrap_or_default(),
            limiter,
        })
    }
}

#[async_trait::async_trait]
impl Fetcher for HttpClient {
    async fn get_text(&self, url: &str) -> Result<String> {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }

        let mut request = self.client.get(url);
        for (key, value) in &self.headers {
            request = request.header(key, value);
        }

        let response = request.send().await?;
        debug!("GET {} {}", response.url(), response.status());

        if !response.status().is_success() {
            return Err(ParserError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let text = response.text().await?;
        Ok(text)
    }
}

/// Strip scheme and host when `href` points at the site itself.
///
/// Foreign absolute URLs are kept as they are.
pub fn to_relative_url(href: &str, base_url: &str) -> String {
    let href = href.trim();
    if href.starts_with('/') && !href.starts_with("//") {
        return href.to_string();
    }

    let absolute = if href.starts_with("//") {
        Url::parse(&format!("https:{}", href))
    } else {
        Url::parse(href)
    };

    match (absolute, Url::parse(base_url)) {
        (Ok(url), Ok(base)) if same_site(&url, &base) => {
            let mut relative = url.path().to_string();
            if let Some(query) = url.query() {
                relative.push('?');
                relative.push_str(query);
            }
            if let Some(fragment) = url.fragment() {
                relative.push('#');
                relative.push_str(fragment);
            }
            relative
        }
        (Ok(url), _) => url.to_string(),
        (Err(_), _) => format!("/{}", href),
    }
}

fn same_site(url: &Url, base: &Url) -> bool {
    match (url.host_str(), base.host_str()) {
        (Some(host), Some(base_host)) => {
            host == base_host || host.ends_with(&format!(".{}", base_host))
        }
        _ => false,
    }
}

/// Resolve a site-relative URL against `base_url`.
pub fn to_absolute_url(url: &str, base_url: &str) -> String {
    let url = url.trim();
    if url.starts_with("http://") || url.starts_with("https://") {
        return url.to_string();
    }
    if let Some(rest) = url.strip_prefix("//") {
        return format!("https://{}", rest);
    }
    let base = base_url.trim_end_matches('/');
    if url.starts_with('/') {
        format!("{}{}", base, url)
    } else {
        format!("{}/{}", base, url)
    }
}

/// Form-encode a search query.
pub fn url_encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// Upper-case the first letter of every word.
pub fn title_case(value: &str) -> String {
    value
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Last path segment of a link, ignoring a trailing slash.
pub fn last_path_segment(href: &str) -> &str {
    let path = href.split(['?', '#']).next().unwrap_or(href);
    let path = path.strip_suffix('/').unwrap_or(path);
    path.rsplit('/').next().unwrap_or(path)
}
