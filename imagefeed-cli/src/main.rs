use std::sync::Arc;
use std::time::Duration;

use imagefeed_core::{
    system_clock, AppConfig, FeedImage, FeedPipeline, FileImageDataStore, JsonFeedStore,
    LoadError, MainQueue, ReqwestHttpClient,
};
use tokio::runtime::Runtime;
use tokio::sync::oneshot;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

const IMAGE_PREVIEW_COUNT: usize = 3;

enum Command {
    Feed,
    More,
    Comments(Uuid),
    Validate,
}

fn main() {
    init_tracing();

    let command = match parse_command(std::env::args().skip(1)) {
        Some(command) => command,
        None => {
            eprintln!("usage: imagefeed [feed | more | comments <image-id> | validate]");
            std::process::exit(2);
        }
    };

    let runtime = Runtime::new().expect("failed to initialise Tokio runtime");
    let config_path = AppConfig::config_file_path();
    let config = AppConfig::load_from(&config_path);
    info!(config = %config_path.display(), cache = %config.cache_dir().display(), "starting");

    let client = ReqwestHttpClient::with_settings(config.request_timeout(), &config.remote.user_agent)
        .expect("failed to build HTTP client");
    let pipeline = FeedPipeline::new(
        &config,
        Arc::new(client),
        Arc::new(JsonFeedStore::new(config.feed_store_path())),
        Arc::new(FileImageDataStore::new(config.image_store_dir())),
        system_clock(),
    )
    .expect("invalid remote configuration");

    let ok = runtime.block_on(async {
        // start and stop are the lifecycle checkpoints for cache validation
        validate(&pipeline).await;
        let ok = match command {
            Command::Feed => show_feed(&pipeline).await,
            Command::More => show_more(&pipeline).await,
            Command::Comments(id) => show_comments(&pipeline, id).await,
            Command::Validate => true,
        };
        validate(&pipeline).await;
        ok
    });

    // let fire-and-forget cache writes land before the runtime goes away
    runtime.shutdown_timeout(Duration::from_secs(2));
    if !ok {
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn parse_command(mut args: impl Iterator<Item = String>) -> Option<Command> {
    match args.next().as_deref() {
        None | Some("feed") => Some(Command::Feed),
        Some("more") => Some(Command::More),
        Some("validate") => Some(Command::Validate),
        Some("comments") => args.next()?.parse().ok().map(Command::Comments),
        Some(_) => None,
    }
}

async fn validate(pipeline: &FeedPipeline) {
    if let Err(err) = pipeline.validate_cache().await {
        warn!(error = %err, "cache validation failed");
    }
}

async fn show_feed(pipeline: &FeedPipeline) -> bool {
    // The result is delivered through the queue, as a UI thread would receive it.
    let (mut queue, handle) = MainQueue::new();
    let (tx, rx) = oneshot::channel();
    let task = pipeline.feed_task(handle.dispatch(move |result: Result<Vec<FeedImage>, LoadError>| {
        print_feed(&result);
        let _ = tx.send(result);
    }));
    drop(handle);
    while queue.run_next().await {}
    drop(task);

    match rx.await {
        Ok(Ok(feed)) => {
            preview_images(pipeline, &feed).await;
            true
        }
        Ok(Err(_)) => false,
        Err(_) => {
            warn!("feed load ended without a result");
            false
        }
    }
}

async fn show_more(pipeline: &FeedPipeline) -> bool {
    let result = async {
        let first = pipeline.load_feed().await?;
        pipeline.load_more(&first).await
    }
    .await;
    match result {
        Ok(feed) => {
            print_feed(&Ok(feed));
            true
        }
        Err(err) => {
            report(&err);
            false
        }
    }
}

async fn show_comments(pipeline: &FeedPipeline, image_id: Uuid) -> bool {
    match pipeline.load_comments(image_id).await {
        Ok(comments) => {
            for comment in comments {
                println!(
                    "{} @{}: {}",
                    comment.created_at.format("%Y-%m-%d %H:%M"),
                    comment.username,
                    comment.message
                );
            }
            true
        }
        Err(err) => {
            report(&err);
            false
        }
    }
}

fn print_feed(result: &Result<Vec<FeedImage>, LoadError>) {
    match result {
        Ok(feed) if feed.is_empty() => println!("(no images)"),
        Ok(feed) => {
            for image in feed {
                println!(
                    "{}  {}  {}  {}",
                    image.id,
                    image.location.as_deref().unwrap_or("-"),
                    image.description.as_deref().unwrap_or("-"),
                    image.url
                );
            }
        }
        Err(err) => report(err),
    }
}

async fn preview_images(pipeline: &FeedPipeline, feed: &[FeedImage]) {
    for image in feed.iter().take(IMAGE_PREVIEW_COUNT) {
        match pipeline.load_image_data(&image.url).await {
            Ok(data) => info!(id = %image.id, bytes = data.len(), "image data loaded"),
            Err(err) => warn!(id = %image.id, error = %err, "image data unavailable"),
        }
    }
}

fn report(err: &LoadError) {
    error!(error = %err, "load failed");
    eprintln!("Couldn't connect to server");
}
