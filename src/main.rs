use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

use purescan::models::{generate_uid, MangaChapter, MangaListFilter, MangaTag, SortOrder};
use purescan::utils::{title_case, to_relative_url};
use purescan::{Config, MangaParser, ParserRegistry};

#[derive(Parser)]
#[command(name = "purescan")]
#[command(about = "Browse Madara manga sites: catalog, chapters and pages")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Site to query, as named in the configuration
    #[arg(short, long, default_value = "mangapure")]
    site: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Print results as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List one catalog page
    List {
        /// Page number
        #[arg(short, long, default_value_t = 1)]
        page: u32,
        /// Sort order (popularity, updated, ...)
        #[arg(short, long, default_value = "updated")]
        order: SortOrder,
        /// Full-text search query
        #[arg(short, long)]
        query: Option<String>,
        /// Tag key to filter by (the site accepts only one)
        #[arg(short, long = "tag")]
        tags: Vec<String>,
    },
    /// List the chapters of a manga
    Chapters {
        /// Manga URL, absolute or site-relative
        manga_url: String,
    },
    /// List the page images of a chapter
    Pages {
        /// Chapter URL as printed by `chapters`
        chapter_url: String,
    },
    /// Show the filters the site supports
    Filters,
    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose)?;

    if let Commands::Init { force } = cli.command {
        return run_init(&cli.config, force);
    }

    let config = Config::load_or_default(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config))?;
    let site_config = config
        .get_site_config(&cli.site)
        .ok_or_else(|| anyhow::anyhow!("Site '{}' not configured", cli.site))?;

    let registry = ParserRegistry::from_config(&config)?;
    let parser = registry.get_parser(&cli.site).ok_or_else(|| {
        anyhow::anyhow!(
            "Site '{}' has no parser (available: {})",
            cli.site,
            registry.site_names().join(", ")
        )
    })?;

    match cli.command {
        Commands::List { page, order, query, tags } => {
            let filter = MangaListFilter {
                query,
                tags: tags
                    .iter()
                    .map(|key| MangaTag {
                        key: key.clone(),
                        title: title_case(key),
                        source: parser.source().to_string(),
                    })
                    .collect(),
            };
            run_list(parser, page, order, &filter, cli.json).await?;
        }
        Commands::Chapters { manga_url } => {
            let manga_url = to_relative_url(&manga_url, &site_config.base_url);
            run_chapters(parser, &manga_url, cli.json).await?;
        }
        Commands::Pages { chapter_url } => {
            let url = to_relative_url(&chapter_url, &site_config.base_url);
            let chapter = MangaChapter {
                id: generate_uid(parser.source(), &url),
                url,
                title: String::new(),
                number: 0.0,
                volume: 0,
                branch: None,
                upload_date: None,
                scanlator: None,
                source: parser.source().to_string(),
            };
            run_pages(parser, &chapter, cli.json).await?;
        }
        Commands::Filters => {
            run_filters(parser, cli.json).await?;
        }
        Commands::Init { .. } => unreachable!("handled before loading the configuration"),
    }

    Ok(())
}

fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(format!("purescan={}", level))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run_init(path: &str, force: bool) -> Result<()> {
    if Path::new(path).exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path);
    }
    Config::default().save(path)?;
    info!("Wrote default configuration to {}", path);
    Ok(())
}

async fn run_list(
    parser: &dyn MangaParser,
    page: u32,
    order: SortOrder,
    filter: &MangaListFilter,
    json: bool,
) -> Result<()> {
    let manga = parser.list(page, order, filter).await?;
    if json {
        return print_json(&manga);
    }

    println!("📚 {} page {} ({})", parser.source(), page, order);
    println!("{:<40} {:<8} {:<10} {}", "Title", "Rating", "State", "URL");
    println!("{}", "-".repeat(100));
    for m in &manga {
        let rating = if m.rating < 0.0 {
            "-".to_string()
        } else {
            format!("{:.2}", m.rating * 5.0)
        };
        let state = m.state.map(|s| s.to_string()).unwrap_or_else(|| "?".to_string());
        println!("{:<40} {:<8} {:<10} {}", m.title, rating, state, m.public_url);
    }
    Ok(())
}

async fn run_chapters(parser: &dyn MangaParser, manga_url: &str, json: bool) -> Result<()> {
    let document = parser.fetch_document(manga_url).await?;
    debug!("Manga page length: {}", document.len());

    let chapters = parser.load_chapters(manga_url, &document).await?;
    if json {
        return print_json(&chapters);
    }

    println!("📖 {} chapters", chapters.len());
    println!("{:<8} {:<30} {:<18} {}", "Number", "Title", "Uploaded", "URL");
    println!("{}", "-".repeat(100));
    for chapter in &chapters {
        let uploaded = chapter
            .upload_date
            .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("{:<8} {:<30} {:<18} {}", chapter.number, chapter.title, uploaded, chapter.url);
    }
    Ok(())
}

async fn run_pages(parser: &dyn MangaParser, chapter: &MangaChapter, json: bool) -> Result<()> {
    let pages = parser.get_pages(chapter).await?;
    if json {
        return print_json(&pages);
    }

    for (index, page) in pages.iter().enumerate() {
        println!("{:>4}  {}", index + 1, page.url);
    }
    Ok(())
}

async fn run_filters(parser: &dyn MangaParser, json: bool) -> Result<()> {
    let options = parser.filter_options().await?;
    if json {
        return print_json(&options);
    }

    let orders: Vec<String> = options.available_sort_orders.iter().map(|o| o.to_string()).collect();
    println!("Sort orders: {}", orders.join(", "));
    println!("States: {}", if options.available_states.is_empty() { "none" } else { "supported" });
    println!(
        "Content rating: {}",
        if options.available_content_rating.is_empty() { "none" } else { "supported" }
    );
    println!("Tags ({}):", options.available_tags.len());
    for tag in &options.available_tags {
        println!("  {:<24} {}", tag.key, tag.title);
    }
    Ok(())
}
