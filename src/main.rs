use std::sync::Arc;

use tracing_subscriber::util::SubscriberInitExt;

mod backoff;
pub(crate) mod cache;
pub(crate) mod config;
pub(crate) mod error;
pub(crate) mod fetcher;
pub(crate) mod hn_api;
pub(crate) mod story;
#[cfg(test)]
mod testing;
pub(crate) mod top_stories;

pub(crate) static CLIENT: std::sync::LazyLock<reqwest::Client> =
    std::sync::LazyLock::new(reqwest::Client::new);

#[derive(Debug, Clone, clap::Parser)]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(short, long)]
    #[arg(help = "Number of top stories to serve (overrides NUM_STORIES)")]
    stories: Option<usize>,

    #[arg(short, long, value_name = "SECS")]
    #[arg(help = "Keep serving the cached stories every SECS seconds until Ctrl-C")]
    watch: Option<u64>,

    #[arg(short, long, default_value = "false")]
    #[arg(help = "Export the served stories to json in the export directory")]
    export_json: bool,

    #[arg(short, long, default_value = "false")]
    #[arg(help = "Log to console")]
    log_to_console: bool,
}

fn export_stories(stories: &[story::Story]) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(stories)?;
    std::fs::create_dir_all("export")?;
    std::fs::write("export/top_stories.json", json)?;
    tracing::info!("Exported stories to export/top_stories.json");
    Ok(())
}

fn print_stories(stories: &[story::Story]) {
    for (rank, story) in stories.iter().enumerate() {
        println!("{:>3}. {} ({})", rank + 1, story.item.title, story.host);
    }
}

async fn serve(cache: &cache::StoryCache, args: &Args) -> anyhow::Result<()> {
    let start = tokio::time::Instant::now();
    let stories = cache.get().await?;
    tracing::info!(
        num_stories = stories.len(),
        elapsed =? start.elapsed(),
        "Served top stories"
    );

    if args.export_json {
        export_stories(&stories)?;
    }

    let Some(secs) = args.watch else {
        print_stories(&stories);
        return Ok(());
    };

    let mut ticker = tokio::time::interval(std::time::Duration::from_secs(secs.max(1)));
    ticker.tick().await;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received Ctrl-C");
                return Ok(());
            }
            _ = ticker.tick() => {}
        }

        let start = tokio::time::Instant::now();
        match cache.get().await {
            Ok(stories) => tracing::info!(
                num_stories = stories.len(),
                top =? stories.first().map(|s| &s.item.title),
                elapsed =? start.elapsed(),
                "Served top stories"
            ),
            Err(e) => tracing::error!(error =? e, "Error when serving top stories"),
        }
    }
}

async fn run(args: Args, config: config::Config) -> anyhow::Result<()> {
    let mut cache_config = config.cache_config();
    if let Some(stories) = args.stories {
        cache_config.num_stories = stories;
    }

    let source: Arc<dyn hn_api::ItemSource> = Arc::new(hn_api::HnClient::new(
        &config.hn_api_base_url,
        config.retry_budget(),
    ));
    let cache = Arc::new(cache::StoryCache::new(source, cache_config));
    let refresher = cache.spawn_refresher();

    let result = serve(&cache, &args).await;
    refresher.stop().await;
    result
}

#[tokio::main]
async fn main() {
    use tracing_subscriber::layer::Layer;
    use tracing_subscriber::layer::SubscriberExt;

    use clap::Parser;
    let args = Args::parse();

    let config = match config::Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e:#}");
            std::process::exit(1);
        }
    };

    let file_appender = tracing_appender::rolling::daily("./log", "quiet_hn.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer();
    let file_layer = file_layer
        .with_writer(non_blocking)
        .json()
        .with_filter(tracing::level_filters::LevelFilter::INFO)
        .boxed();

    let pretty_layer = tracing_subscriber::fmt::layer()
        .with_file(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .with_filter(tracing::level_filters::LevelFilter::INFO)
        .boxed();

    let registry = tracing_subscriber::registry().with(file_layer);

    if config.log_to_console || args.log_to_console {
        registry.with(pretty_layer).init();
    } else {
        registry.init();
    };

    tracing::info!(
        config =? config,
        args =? args,
        "Starting quiet-hn"
    );

    match run(args, config).await {
        Ok(_) => tracing::info!("quiet-hn finished"),
        Err(e) => {
            tracing::error!(error =? e, "Error when serving top stories");
            eprintln!("Error: {e:#}");
            drop(guard);
            std::process::exit(1);
        }
    }
}
