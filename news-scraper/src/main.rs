use anyhow::Context;
use clap::{Parser, Subcommand};
use news_scraper::{
    ArticleStore, Fetcher, IngestionOrchestrator, MemoryStore, PgArticleStore, PersistedRecord, Result,
    ScraperConfig, StoreAdapter,
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "news-scraper", about = "Scrape a news listing page into the article store")]
struct Cli {
    /// Overrides DATABASE_URL
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one ingestion and print the report as JSON
    Scrape {
        /// Overrides SCRAPER_SOURCE_URL
        #[arg(long)]
        url: Option<String>,
        /// Use an empty in-memory store instead of the database
        #[arg(long)]
        dry_run: bool,
    },
    #[command(flatten)]
    Manage(ManageCommand),
}

#[derive(Subcommand)]
enum ManageCommand {
    /// Create the articles and comments tables if missing
    InitDb,
    /// List articles, newest first
    List {
        #[arg(long)]
        saved: bool,
    },
    /// Show one article with its comments
    Show { id: Uuid },
    Save { id: Uuid },
    Unsave { id: Uuid },
    /// Attach a comment to an article
    Comment { id: Uuid, body: String },
    DeleteComment { id: Uuid },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut config = ScraperConfig::from_env().context("invalid configuration")?;
    if let Some(database_url) = cli.database_url {
        config.database_url = database_url;
    }

    match cli.command {
        Command::Scrape { url, dry_run } => {
            if let Some(url) = url {
                config.source_url = url;
                config.validate()?;
            }
            let store: Arc<dyn StoreAdapter> = if dry_run {
                info!("Dry run: using in-memory store");
                Arc::new(MemoryStore::new())
            } else {
                Arc::new(connect(&config).await?)
            };
            scrape(store, &config).await?;
        }
        Command::Manage(command) => {
            let store = connect(&config).await?;
            let result = manage(&store, command).await;
            store.close().await;
            result?;
        }
    }
    Ok(())
}

async fn connect(config: &ScraperConfig) -> Result<PgArticleStore> {
    info!("Connecting to database: {}", config.redacted_database_url());
    PgArticleStore::connect(&config.database_url).await.map_err(|e| {
        error!("Failed to connect to database. Make sure PostgreSQL is running");
        error!("  and check the connection string: {}", config.redacted_database_url());
        e
    })
}

async fn scrape(store: Arc<dyn StoreAdapter>, config: &ScraperConfig) -> Result<()> {
    let fetcher = Arc::new(Fetcher::new(config.fetch.clone())?);
    let orchestrator = IngestionOrchestrator::new(store, fetcher, config)?;

    let report = orchestrator.run().await?;
    for failure in &report.failed {
        error!("Article '{}' not saved: {}", failure.candidate.title, failure.reason);
    }
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn manage(store: &PgArticleStore, command: ManageCommand) -> Result<()> {
    match command {
        ManageCommand::InitDb => store.setup_schema().await?,
        ManageCommand::List { saved } => {
            let articles = store.list_articles(saved).await?;
            info!("{} articles", articles.len());
            for article in &articles {
                print_article(article);
            }
        }
        ManageCommand::Show { id } => {
            let article = store.get_article(id).await?;
            let comments = store.list_comments(id).await?;
            print_article(&article);
            for comment in comments {
                println!("    [{}] {}", comment.id, comment.body);
            }
        }
        ManageCommand::Save { id } => print_article(&store.set_saved(id, true).await?),
        ManageCommand::Unsave { id } => print_article(&store.set_saved(id, false).await?),
        ManageCommand::Comment { id, body } => print_article(&store.add_comment(id, body).await?),
        ManageCommand::DeleteComment { id } => {
            store.delete_comment(id).await?;
            info!("Deleted comment {}", id);
        }
    }
    Ok(())
}

fn print_article(article: &PersistedRecord) {
    let marker = if article.saved { "*" } else { " " };
    println!("{} {} {}", marker, article.id, article.title);
    if !article.summary.is_empty() {
        println!("    {}", article.summary);
    }
    println!("    {} ({} comments)", article.link, article.comments.len());
}
