//! Display Module
//!
//! The cover-image display primitive consumed by every screen. It wires a
//! visibility watcher to the image loader and publishes what should be drawn:
//! a placeholder, a loading skeleton, or the decoded image bytes. Callers
//! never touch cache mechanics.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::Result;
use crate::loader::{ImageLoader, LoadState};
use crate::viewport::{Region, ViewportFeed, VisibilityConfig, VisibilityWatcher};

// == Cover Props ==
/// Declarative inputs of a cover-image instance.
#[derive(Debug, Clone)]
pub struct CoverProps {
    /// Server-side file name of the image
    pub file_name: String,
    /// Logical partition (folder) the image lives in
    pub folder: String,
    /// Fallback value the host renders in the placeholder state
    pub placeholder: String,
    /// Pass-through alternative text
    pub alt: String,
    /// Where the instance sits on the page
    pub region: Region,
    /// Visibility threshold and margin for this instance
    pub visibility: VisibilityConfig,
}

impl CoverProps {
    /// Creates props with default visibility settings and no alt text.
    pub fn new(
        file_name: impl Into<String>,
        folder: impl Into<String>,
        placeholder: impl Into<String>,
        region: Region,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            folder: folder.into(),
            placeholder: placeholder.into(),
            alt: String::new(),
            region,
            visibility: VisibilityConfig::default(),
        }
    }

    pub fn with_alt(mut self, alt: impl Into<String>) -> Self {
        self.alt = alt.into();
        self
    }

    pub fn with_visibility(mut self, visibility: VisibilityConfig) -> Self {
        self.visibility = visibility;
        self
    }
}

// == Image View ==
/// What the host should draw right now.
#[derive(Debug, Clone)]
pub enum ImageView {
    /// Render the placeholder value
    Placeholder,
    /// Render a loading skeleton
    Spinner,
    /// Render the decoded image bytes
    Image(Arc<Vec<u8>>),
}

impl ImageView {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, ImageView::Placeholder)
    }

    pub fn is_spinner(&self) -> bool {
        matches!(self, ImageView::Spinner)
    }

    pub fn is_image(&self) -> bool {
        matches!(self, ImageView::Image(_))
    }
}

// == Cover Image ==
/// A mounted cover-image instance.
///
/// Dropping the handle unmounts it: the visibility watcher detaches and the
/// loader state is gone. An already in-flight fetch keeps running and still
/// writes through to the cache on success.
pub struct CoverImage {
    props: CoverProps,
    loader: ImageLoader,
    feed: ViewportFeed,
    view: watch::Receiver<ImageView>,
    task: JoinHandle<()>,
}

impl CoverImage {
    /// Mounts an instance: attaches a visibility watcher for its region and
    /// starts its loader lifecycle.
    pub fn mount(props: CoverProps, loader: ImageLoader, feed: ViewportFeed) -> Self {
        let (view_tx, view_rx) = watch::channel(ImageView::Placeholder);
        let task = tokio::spawn(run_instance(
            props.clone(),
            loader.clone(),
            feed.clone(),
            view_tx,
        ));
        Self {
            props,
            loader,
            feed,
            view: view_rx,
            task,
        }
    }

    pub fn props(&self) -> &CoverProps {
        &self.props
    }

    /// Current render state.
    pub fn view(&self) -> ImageView {
        self.view.borrow().clone()
    }

    /// Waits for the next render-state change. Returns false once the
    /// instance's lifecycle has finished and no further change will come.
    pub async fn changed(&mut self) -> bool {
        self.view.changed().await.is_ok()
    }

    /// Points the instance at a different resource. The lifecycle restarts
    /// from idle with a fresh visibility watcher for the same region.
    pub fn set_source(&mut self, file_name: impl Into<String>, folder: impl Into<String>) {
        self.task.abort();
        self.props.file_name = file_name.into();
        self.props.folder = folder.into();

        let (view_tx, view_rx) = watch::channel(ImageView::Placeholder);
        self.view = view_rx;
        self.task = tokio::spawn(run_instance(
            self.props.clone(),
            self.loader.clone(),
            self.feed.clone(),
            view_tx,
        ));
    }
}

impl Drop for CoverImage {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// One instance's lifecycle: idle until visible, then cache/fetch, then a
/// terminal view.
async fn run_instance(
    props: CoverProps,
    loader: ImageLoader,
    feed: ViewportFeed,
    view: watch::Sender<ImageView>,
) {
    let watcher = VisibilityWatcher::new(feed, props.region, props.visibility);
    if !watcher.wait_visible().await {
        // Feed closed before the region was ever seen; the instance stays idle.
        return;
    }

    let _ = view.send(render(&LoadState::Loading, &props));

    let state = match loader.load(&props.file_name, &props.folder).await {
        Some(payload) => LoadState::Loaded(payload),
        None => LoadState::Failed,
    };
    let _ = view.send(render(&state, &props));
}

/// Maps a loader state to what the host draws. A payload that cannot be
/// decoded renders the placeholder, same as a failed fetch.
fn render(state: &LoadState, props: &CoverProps) -> ImageView {
    match state {
        LoadState::Idle | LoadState::Failed => ImageView::Placeholder,
        LoadState::Loading => ImageView::Spinner,
        LoadState::Loaded(payload) => match decode_payload(payload) {
            Ok(bytes) => ImageView::Image(Arc::new(bytes)),
            Err(err) => {
                debug!(
                    "undecodable image payload for {}/{}: {}",
                    props.folder, props.file_name, err
                );
                ImageView::Placeholder
            }
        },
    }
}

/// Decodes a payload into renderable bytes. Accepts a raw base64 blob or a
/// `data:` URI carrying a base64 section.
fn decode_payload(payload: &str) -> Result<Vec<u8>> {
    let encoded = match payload.find("base64,") {
        Some(idx) => &payload[idx + "base64,".len()..],
        None => payload,
    };
    Ok(STANDARD.decode(encoded.trim())?)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ImageCache;
    use crate::net::ImageFetcher;
    use crate::viewport::{viewport_channel, Viewport};
    use std::time::Duration;

    fn offline_loader() -> ImageLoader {
        ImageLoader::new(
            ImageCache::in_memory(50, Duration::from_secs(300)),
            ImageFetcher::new("http://127.0.0.1:1"),
        )
    }

    async fn settled_view(cover: &mut CoverImage) -> ImageView {
        for _ in 0..100 {
            let view = cover.view();
            if !view.is_spinner() && !view.is_placeholder() {
                return view;
            }
            if !cover.changed().await {
                break;
            }
        }
        cover.view()
    }

    #[test]
    fn test_decode_plain_base64() {
        let bytes = decode_payload("aGVsbG8=").unwrap();
        assert_eq!(bytes, b"hello");
    }

    #[test]
    fn test_decode_data_uri() {
        let bytes = decode_payload("data:image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(bytes, b"hello");
    }

    #[test]
    fn test_decode_trims_whitespace() {
        let bytes = decode_payload("aGVsbG8=\n").unwrap();
        assert_eq!(bytes, b"hello");
    }

    #[test]
    fn test_decode_rejects_junk() {
        assert!(decode_payload("%%not-base64%%").is_err());
    }

    #[test]
    fn test_render_mapping() {
        let props = CoverProps::new("cover.png", "userBooks", "fallback.png", Region::new(0.0, 100.0));

        assert!(render(&LoadState::Idle, &props).is_placeholder());
        assert!(render(&LoadState::Loading, &props).is_spinner());
        assert!(render(&LoadState::Failed, &props).is_placeholder());
        assert!(render(&LoadState::Loaded("aGVsbG8=".to_string()), &props).is_image());
        // Decode fault renders the placeholder, like a failed fetch
        assert!(render(&LoadState::Loaded("%%%".to_string()), &props).is_placeholder());
    }

    #[tokio::test]
    async fn test_hidden_instance_stays_on_placeholder() {
        let (_tx, feed) = viewport_channel(Viewport::new(0.0, 600.0));
        let props = CoverProps::new(
            "cover.png",
            "userBooks",
            "fallback.png",
            Region::new(5000.0, 120.0),
        );
        let cover = CoverImage::mount(props, offline_loader(), feed);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(cover.view().is_placeholder());
    }

    #[tokio::test]
    async fn test_visible_cached_instance_renders_image() {
        let loader = offline_loader();
        loader.cache().set("cover.png", "userBooks", "aGVsbG8=");

        let (_tx, feed) = viewport_channel(Viewport::new(0.0, 600.0));
        let props = CoverProps::new(
            "cover.png",
            "userBooks",
            "fallback.png",
            Region::new(100.0, 120.0),
        );
        let mut cover = CoverImage::mount(props, loader, feed);

        let view = settled_view(&mut cover).await;
        match view {
            ImageView::Image(bytes) => assert_eq!(bytes.as_slice(), b"hello"),
            other => panic!("expected image view, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_visible_uncached_offline_instance_falls_back() {
        let (_tx, feed) = viewport_channel(Viewport::new(0.0, 600.0));
        let props = CoverProps::new(
            "cover.png",
            "userBooks",
            "fallback.png",
            Region::new(100.0, 120.0),
        );
        let mut cover = CoverImage::mount(props, offline_loader(), feed);

        let view = settled_view(&mut cover).await;
        assert!(view.is_placeholder());
    }

    #[tokio::test]
    async fn test_set_source_restarts_from_idle() {
        let loader = offline_loader();
        loader.cache().set("first.png", "userBooks", "aGVsbG8=");
        loader.cache().set("second.png", "userBooks", "d29ybGQ=");

        let (_tx, feed) = viewport_channel(Viewport::new(0.0, 600.0));
        let props = CoverProps::new(
            "first.png",
            "userBooks",
            "fallback.png",
            Region::new(100.0, 120.0),
        );
        let mut cover = CoverImage::mount(props, loader, feed);
        let view = settled_view(&mut cover).await;
        assert!(view.is_image());

        cover.set_source("second.png", "userBooks");
        let view = settled_view(&mut cover).await;
        match view {
            ImageView::Image(bytes) => assert_eq!(bytes.as_slice(), b"world"),
            other => panic!("expected image view, got {:?}", other),
        }
        assert_eq!(cover.props().file_name, "second.png");
    }
}
