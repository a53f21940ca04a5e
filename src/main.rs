use anyhow::Result;
use clap::{Parser, Subcommand};
use news_radar::{
    AppController, FileStorage, GeminiClient, GeminiConfig, ImpactLevel, NewsClient, NewsItem,
    TopicRegistry,
};
use std::sync::Arc;
use tracing::info;
use url::Url;

#[derive(Parser)]
#[command(name = "news-radar", about = "AI-curated breaking-news cards per topic")]
struct Cli {
    /// Override the Gemini model identifier.
    #[arg(long)]
    model: Option<String>,

    #[command(subcommand)]
    command: Option<Cmd>,
}

#[derive(Subcommand)]
enum Cmd {
    /// Fetch breaking news for a topic (default: the first preset).
    Fetch { topic: Option<String> },
    /// Manage saved topics.
    Topics {
        #[command(subcommand)]
        action: TopicCmd,
    },
}

#[derive(Subcommand)]
enum TopicCmd {
    /// List presets and saved topics.
    List,
    /// Save a topic for later sessions.
    Add { topic: String },
    /// Remove a saved topic.
    Remove { topic: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let registry = TopicRegistry::load(Box::new(FileStorage::new(FileStorage::default_path())));
    let mut controller = AppController::new(registry);

    match cli.command {
        Some(Cmd::Topics { action }) => run_topics(&mut controller, action)?,
        Some(Cmd::Fetch { topic }) => {
            run_fetch(&mut controller, topic.as_deref(), cli.model).await?
        }
        None => run_fetch(&mut controller, None, cli.model).await?,
    }

    Ok(())
}

fn run_topics(controller: &mut AppController, action: TopicCmd) -> Result<()> {
    match action {
        TopicCmd::List => {
            for topic in controller.topics() {
                let marker = if controller.registry().is_saved(topic) {
                    "saved "
                } else {
                    "preset"
                };
                println!("{marker}  {topic}");
            }
        }
        TopicCmd::Add { topic } => {
            if controller.save_topic(&topic)? {
                println!("Saved topic: {topic}");
            } else {
                println!("Topic already present (or blank), nothing saved.");
            }
        }
        TopicCmd::Remove { topic } => {
            let was_saved = controller.registry().is_saved(&topic);
            controller.delete_topic(&topic)?;
            if was_saved {
                println!("Removed topic: {topic}");
            } else {
                println!("No such saved topic: {topic}");
            }
        }
    }
    Ok(())
}

async fn run_fetch(
    controller: &mut AppController,
    topic: Option<&str>,
    model: Option<String>,
) -> Result<()> {
    let mut config = GeminiConfig::default();
    if let Some(model) = model {
        config.model = model;
    }
    let gemini = GeminiClient::from_env(config)?;
    let client = NewsClient::new(Arc::new(gemini));

    let ticket = match topic {
        Some(topic) => controller.select_topic(topic),
        None => controller.begin_fetch(),
    };
    info!("fetching breaking news for '{}'", ticket.topic);

    let outcome = client.fetch_breaking_news(&ticket.topic).await;
    controller.complete_fetch(&ticket, outcome);

    if let Some(message) = controller.error_message() {
        anyhow::bail!("{message}");
    }

    if controller.news().is_empty() {
        println!("等待信号接入……没有可展示的新闻，请换一个话题试试。");
        return Ok(());
    }

    println!("信息流 // {}", controller.topic());
    if let Some(at) = controller.last_loaded_at() {
        println!(
            "更新于 {}\n",
            at.with_timezone(&chrono::Local).format("%H:%M:%S")
        );
    }
    for item in controller.news() {
        print_card(item);
    }
    Ok(())
}

fn print_card(item: &NewsItem) {
    let impact = match item.impact_level {
        ImpactLevel::High => "HIGH",
        ImpactLevel::Medium => "MEDIUM",
        ImpactLevel::Low => "LOW",
    };
    println!("[{}] {}  ({} · {})", impact, item.title, item.category, item.timestamp);
    println!("  {}", item.summary);
    for source in &item.sources {
        let host = Url::parse(&source.uri)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_else(|| source.uri.clone());
        println!("  ↪ {} ({})", source.title, host);
    }
    println!();
}
