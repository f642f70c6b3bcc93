//! covercache demo
//!
//! Stands up a small embedded image endpoint, mounts a shelf of cover
//! instances on a simulated marketplace page, scrolls the viewport across
//! them, and reports what each instance rendered and what the cache did.
//!
//! Point `IMAGE_BASE_URL` at a real endpoint to skip the embedded one.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use covercache::{
    viewport_channel, Config, CoverImage, CoverProps, FileMedium, ImageCache, ImageFetcher,
    ImageLoader, ImageView, Region, Viewport, VisibilityConfig,
};

/// Sample covers served by the embedded endpoint.
const SAMPLE_FILES: [&str; 6] = [
    "dune.png",
    "hyperion.png",
    "foundation.png",
    "neuromancer.png",
    "solaris.png",
    "ubik.png",
];

const SAMPLE_FOLDER: &str = "storeBooks";

/// Row geometry of the simulated page.
const ROW_HEIGHT: f32 = 140.0;
const COVER_HEIGHT: f32 = 120.0;
const PAGE_VIEW_HEIGHT: f32 = 260.0;

// == Embedded Sample Endpoint ==

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileQuery {
    file_name: String,
    folder_name: String,
}

type Shelf = Arc<HashMap<(String, String), String>>;

fn sample_shelf() -> Shelf {
    let mut shelf = HashMap::new();
    for (i, file) in SAMPLE_FILES.iter().enumerate() {
        // Payload content is irrelevant to the pipeline; any bytes will do.
        let bytes = vec![i as u8 + 1; 64];
        shelf.insert(
            (file.to_string(), SAMPLE_FOLDER.to_string()),
            STANDARD.encode(&bytes),
        );
    }
    Arc::new(shelf)
}

async fn get_file_as_base64(
    State(shelf): State<Shelf>,
    Query(query): Query<FileQuery>,
) -> Result<String, StatusCode> {
    shelf
        .get(&(query.file_name, query.folder_name))
        .cloned()
        .ok_or(StatusCode::NOT_FOUND)
}

fn sample_router() -> Router {
    Router::new()
        .route("/getFileAsBase64", get(get_file_as_base64))
        .layer(TraceLayer::new_for_http())
        .with_state(sample_shelf())
}

// == Demo ==

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber with env filter
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "covercache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    info!(
        "Configuration loaded: max_entries={}, ttl={}s, storage={:?}, threshold={}, margin={}px",
        config.max_entries,
        config.ttl_secs,
        config.storage_path,
        config.visibility_threshold,
        config.visibility_margin
    );

    // Use the configured endpoint, or stand up the embedded sample one.
    let base_url = if config.base_url.is_empty() {
        let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, sample_router()).await {
                error!("sample endpoint failed: {}", err);
            }
        });
        info!("Embedded sample endpoint listening on http://{}", addr);
        format!("http://{}", addr)
    } else {
        info!("Using external image endpoint {}", config.base_url);
        config.base_url.clone()
    };

    let cache = ImageCache::new(
        Box::new(FileMedium::new(&config.storage_path)),
        config.max_entries,
        config.ttl(),
    );
    let loader = ImageLoader::new(cache.clone(), ImageFetcher::new(base_url));
    let visibility = VisibilityConfig {
        threshold: config.visibility_threshold,
        margin: config.visibility_margin,
    };

    // Mount the shelf: one cover instance per row of the simulated page.
    let (viewport_tx, feed) = viewport_channel(Viewport::new(0.0, PAGE_VIEW_HEIGHT));
    let shelf_rows: Vec<CoverImage> = SAMPLE_FILES
        .iter()
        .enumerate()
        .map(|(i, file)| {
            let region = Region::new(i as f32 * ROW_HEIGHT, COVER_HEIGHT);
            let props = CoverProps::new(*file, SAMPLE_FOLDER, "placeholder_cover.png", region)
                .with_alt(format!("Cover of {}", file))
                .with_visibility(visibility);
            CoverImage::mount(props, loader.clone(), feed.clone())
        })
        .collect();
    info!("Mounted {} cover instances", shelf_rows.len());

    // Scroll the page to the bottom in steps; instances load as their rows
    // come within the visibility margin.
    let page_bottom = SAMPLE_FILES.len() as f32 * ROW_HEIGHT;
    let mut offset = 0.0;
    while offset + PAGE_VIEW_HEIGHT < page_bottom {
        tokio::time::sleep(Duration::from_millis(120)).await;
        offset += 130.0;
        let _ = viewport_tx.send(Viewport::new(offset, PAGE_VIEW_HEIGHT));
        info!("Scrolled to {:.0}px", offset);
    }
    tokio::time::sleep(Duration::from_millis(300)).await;

    for cover in &shelf_rows {
        let rendered = match cover.view() {
            ImageView::Image(bytes) => format!("image ({} bytes)", bytes.len()),
            ImageView::Spinner => "still loading".to_string(),
            ImageView::Placeholder => format!("placeholder ({})", cover.props().placeholder),
        };
        info!(
            "{}/{} -> {}",
            cover.props().folder,
            cover.props().file_name,
            rendered
        );
    }

    let stats = cache.stats();
    info!(
        "Cache: {} images ({} expired), ~{} bytes, oldest {}",
        stats.total_images,
        stats.expired_images,
        stats.cache_size_bytes_estimate,
        stats.oldest_rfc3339().unwrap_or_else(|| "-".to_string())
    );

    // Session teardown: unmount everything and clear the persisted imagery.
    drop(shelf_rows);
    cache.clear();
    info!("Session cache cleared");

    Ok(())
}
