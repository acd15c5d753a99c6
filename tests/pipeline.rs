use mockito::{Matcher, Server};
use purescan::config::HttpConfig;
use purescan::models::{MangaListFilter, SortOrder};
use purescan::registry::build_parser;
use purescan::sites::mangapure;
use purescan::{MangaParser, ParserError, SiteConfig};

const LISTING: &str = r#"<html><body><div class="c-page-content">
<div class="page-item-detail manga">
  <div class="item-thumb"><a href="/manga/tower-of-god/"><img src="/covers/tog.jpg"></a></div>
  <div class="item-summary">
    <div class="post-title"><h3><a href="/manga/tower-of-god/">Tower of God</a></h3></div>
    <div class="mg_genres"><div class="summary-content"><a href="/mangas/fantasy/">fantasy</a></div></div>
    <div class="mg_status"><div class="summary-content">Completed</div></div>
  </div>
  <span class="total_votes">3.5</span>
</div>
<div class="page-item-detail manga">
  <div class="item-thumb"><a href="https://mangapure.net/manga/omniscient-reader/"></a></div>
  <div class="item-summary"><h4>Omniscient Reader</h4></div>
</div>
</div></body></html>"#;

const MANGA_PAGE: &str = r#"<html><body>
<div class="post-title"><h1>Tower of God</h1></div>
<div id="manga-chapters-holder" data-id="55"></div>
</body></html>"#;

const CHAPTERS: &str = r#"<div class="listing-chapters_wrap"><ul class="main version-chap">
<li class="wp-manga-chapter"><a href="/manga/tower-of-god/chapter-2/">Chapter 2 </a><span class="chapter-release-date"><i>January 3, 18:45</i></span></li>
<li class="wp-manga-chapter"><a href="/manga/tower-of-god/chapter-1/">Chapter 1 </a><span class="chapter-release-date"><i>2 days ago</i></span></li>
</ul></div>"#;

const CHAPTER_PAGE: &str = r#"<html><body><div class="reading-content">
<p id="arraydata" style="display:none">https://cdn.example/1.jpg,https://cdn.example/2.jpg,https://cdn.example/3.jpg</p>
</div></body></html>"#;

fn site(server: &Server) -> SiteConfig {
    SiteConfig {
        base_url: server.url(),
        rate_limit_ms: 0,
        ..mangapure::site_config()
    }
}

fn parser(server: &Server) -> Box<dyn MangaParser> {
    build_parser(&HttpConfig::default(), &site(server)).unwrap()
}

#[tokio::test]
async fn latest_listing_walks_the_fallback_layout() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/latest-manga")
        .match_query(Matcher::UrlEncoded("page".into(), "1".into()))
        .with_status(200)
        .with_body(LISTING)
        .create_async()
        .await;

    let manga = parser(&server)
        .list(1, SortOrder::Updated, &MangaListFilter::default())
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(manga.len(), 2);
    assert_eq!(manga[0].title, "Tower of God");
    assert_eq!(manga[0].url, "/manga/tower-of-god/");
    assert!((manga[0].rating - 0.7).abs() < 1e-6);
    assert_eq!(manga[0].cover_url, Some(format!("{}/covers/tog.jpg", server.url())));
    assert_eq!(manga[1].title, "Omniscient Reader");
    assert_eq!(manga[1].url, "https://mangapure.net/manga/omniscient-reader/");
    assert_eq!(manga[1].rating, -1.0);
}

#[tokio::test]
async fn popular_search_and_tag_requests_reach_their_routes() {
    let mut server = Server::new_async().await;
    let popular = server
        .mock("GET", "/popular-manga")
        .match_query(Matcher::UrlEncoded("page".into(), "2".into()))
        .with_body("<html></html>")
        .create_async()
        .await;
    let search = server
        .mock("GET", "/search")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("s".into(), "tower of god".into()),
            Matcher::UrlEncoded("page".into(), "1".into()),
            Matcher::UrlEncoded("post_type".into(), "wp-manga".into()),
        ]))
        .with_body("<html></html>")
        .create_async()
        .await;
    let tagged = server
        .mock("GET", "/mangas/fantasy")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("orderby".into(), "2".into()),
            Matcher::UrlEncoded("page".into(), "1".into()),
        ]))
        .with_body("<html></html>")
        .create_async()
        .await;

    let parser = parser(&server);
    parser
        .list(2, SortOrder::Popularity, &MangaListFilter::default())
        .await
        .unwrap();
    parser
        .list(1, SortOrder::Popularity, &MangaListFilter::query("tower of god"))
        .await
        .unwrap();
    let fantasy = purescan::MangaTag {
        key: "fantasy".to_string(),
        title: "Fantasy".to_string(),
        source: mangapure::SOURCE.to_string(),
    };
    parser
        .list(1, SortOrder::Popularity, &MangaListFilter::tag(fantasy))
        .await
        .unwrap();

    popular.assert_async().await;
    search.assert_async().await;
    tagged.assert_async().await;
}

#[tokio::test]
async fn chapters_then_pages() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/manga/tower-of-god/")
        .with_body(MANGA_PAGE)
        .create_async()
        .await;
    let ajax = server
        .mock("GET", "/ajax-list-chapter")
        .match_query(Matcher::UrlEncoded("mangaID".into(), "55".into()))
        .with_body(CHAPTERS)
        .create_async()
        .await;
    let reader = server
        .mock("GET", "/manga/tower-of-god/chapter-1/")
        .match_query(Matcher::UrlEncoded("style".into(), "list".into()))
        .with_body(CHAPTER_PAGE)
        .create_async()
        .await;

    let parser = parser(&server);
    let document = parser.fetch_document("/manga/tower-of-god/").await.unwrap();
    let chapters = parser.load_chapters("/manga/tower-of-god/", &document).await.unwrap();
    ajax.assert_async().await;

    assert_eq!(chapters.len(), 2);
    assert_eq!(chapters[0].number, 1.0);
    assert_eq!(chapters[0].title, "Chapter 1");
    assert_eq!(chapters[0].url, "/manga/tower-of-god/chapter-1/?style=list");
    assert!(chapters[0].upload_date.is_some());
    assert_eq!(chapters[1].number, 2.0);
    assert!(chapters[1].upload_date.is_some());

    let pages = parser.get_pages(&chapters[0]).await.unwrap();
    reader.assert_async().await;
    let urls: Vec<_> = pages.iter().map(|p| p.url.as_str()).collect();
    assert_eq!(
        urls,
        vec!["https://cdn.example/1.jpg", "https://cdn.example/2.jpg", "https://cdn.example/3.jpg"]
    );
}

#[tokio::test]
async fn upstream_errors_propagate_unchanged() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/latest-manga")
        .match_query(Matcher::Any)
        .with_status(503)
        .create_async()
        .await;

    let err = parser(&server)
        .list(1, SortOrder::Updated, &MangaListFilter::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ParserError::Status { status: 503, .. }));
}

#[tokio::test]
async fn retired_layout_fails_loudly() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/latest-manga")
        .match_query(Matcher::Any)
        .with_body(r#"<div class="row c-tabs-item__content"><div class="tab-summary"><h3>Linkless</h3></div></div>"#)
        .create_async()
        .await;

    let err = parser(&server)
        .list(1, SortOrder::Updated, &MangaListFilter::default())
        .await
        .unwrap_err();
    assert!(err.is_structural());
}
