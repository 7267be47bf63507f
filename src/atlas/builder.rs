//! Background atlas construction.
//!
//! The builder thread fans out one scoped worker per item, waits for every
//! worker to settle (success or failure), composes the grid, and delivers
//! exactly one [`AtlasImage`] over a channel. The render loop polls with
//! [`AtlasBuilder::try_recv`] and never blocks on image I/O.

use std::sync::{mpsc, Arc};
use std::thread::JoinHandle;

use image::RgbaImage;

use super::fetch::{fetch_image, ImageFetcher};
use super::{compose_atlas, AtlasError, AtlasImage};
use crate::items::MenuItem;

/// Handle to an in-flight atlas build.
pub struct AtlasBuilder {
    result_rx: mpsc::Receiver<AtlasImage>,
    thread: Option<JoinHandle<()>>,
    delivered: bool,
}

impl AtlasBuilder {
    /// Start building the atlas for `items` on a background thread.
    ///
    /// # Errors
    ///
    /// Returns [`std::io::Error`] if the build thread fails to spawn.
    pub fn spawn(
        items: Vec<MenuItem>,
        fetcher: Arc<dyn ImageFetcher>,
        cell_size: u32,
    ) -> Result<Self, std::io::Error> {
        let (result_tx, result_rx) = mpsc::channel();

        let thread = std::thread::Builder::new()
            .name("atlas-builder".into())
            .spawn(move || {
                let start = web_time::Instant::now();
                let images = load_all(&items, fetcher.as_ref());
                let atlas = compose_atlas(&items, &images, cell_size);
                log::info!(
                    "atlas ready: {0}x{0} cells, {1} loaded, {2} fallback \
                     ({3:.0} ms)",
                    atlas.atlas_size,
                    atlas.loaded_count(),
                    atlas.fallback_count(),
                    start.elapsed().as_secs_f64() * 1000.0,
                );
                // The receiver is gone if the engine was dropped mid-build.
                let _ = result_tx.send(atlas);
            })?;

        Ok(Self {
            result_rx,
            thread: Some(thread),
            delivered: false,
        })
    }

    /// Non-blocking check for the finished atlas.
    ///
    /// Yields the atlas at most once; every later call returns `None`.
    pub fn try_recv(&mut self) -> Option<AtlasImage> {
        if self.delivered {
            return None;
        }
        let atlas = self.result_rx.try_recv().ok()?;
        self.delivered = true;
        self.join();
        Some(atlas)
    }

    /// Block until the atlas is ready.
    ///
    /// # Errors
    ///
    /// Returns [`AtlasError::Disconnected`] if the atlas was already taken or
    /// the build thread died without producing one.
    pub fn wait(mut self) -> Result<AtlasImage, AtlasError> {
        if self.delivered {
            return Err(AtlasError::Disconnected);
        }
        let atlas = self
            .result_rx
            .recv()
            .map_err(|_| AtlasError::Disconnected)?;
        self.delivered = true;
        self.join();
        Ok(atlas)
    }

    /// Whether the build thread has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().is_none_or(JoinHandle::is_finished)
    }

    fn join(&mut self) {
        if let Some(handle) = self.thread.take() {
            if handle.join().is_err() {
                log::error!("atlas build thread panicked");
            }
        }
    }
}

impl Drop for AtlasBuilder {
    fn drop(&mut self) {
        // Blocking fetches cannot be interrupted; an unfinished thread is
        // detached and its result discarded when the send fails.
        if self.is_finished() {
            self.join();
        } else {
            log::debug!("detaching unfinished atlas build");
        }
    }
}

/// Fetch and decode every item concurrently.
///
/// Returns one slot per item, in item order; `None` marks a failure.
fn load_all(
    items: &[MenuItem],
    fetcher: &dyn ImageFetcher,
) -> Vec<Option<RgbaImage>> {
    std::thread::scope(|scope| {
        let workers: Vec<_> = items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                scope.spawn(move || load_one(index, item, fetcher))
            })
            .collect();
        workers
            .into_iter()
            .map(|worker| worker.join().ok().flatten())
            .collect()
    })
}

fn load_one(
    index: usize,
    item: &MenuItem,
    fetcher: &dyn ImageFetcher,
) -> Option<RgbaImage> {
    match fetch_image(fetcher, &item.image) {
        Ok(image) => {
            log::debug!(
                "loaded item {index}: {}x{}",
                image.width(),
                image.height()
            );
            Some(image)
        }
        Err(e) => {
            log::warn!("item {index} thumbnail unavailable: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{ImageFormat, Rgba};

    use super::*;
    use crate::atlas::{cell_origin, CellContent};

    /// Serves a solid PNG for every source except those containing "bad".
    struct StubFetcher {
        png: Vec<u8>,
    }

    impl StubFetcher {
        fn new() -> Self {
            let img = RgbaImage::from_pixel(4, 4, Rgba([30, 60, 90, 255]));
            let mut png = Vec::new();
            img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
                .unwrap();
            Self { png }
        }
    }

    impl ImageFetcher for StubFetcher {
        fn fetch(&self, source: &str) -> Result<Vec<u8>, AtlasError> {
            if source.contains("bad") {
                Err(AtlasError::Fetch {
                    source: source.to_owned(),
                    message: "404".to_owned(),
                })
            } else {
                Ok(self.png.clone())
            }
        }
    }

    fn items(sources: &[&str]) -> Vec<MenuItem> {
        sources
            .iter()
            .map(|s| MenuItem {
                image: (*s).to_owned(),
                link: format!("/{s}"),
                title: (*s).to_owned(),
                description: String::new(),
            })
            .collect()
    }

    #[test]
    fn builds_grid_with_loaded_and_empty_cells() {
        let builder = AtlasBuilder::spawn(
            items(&["a", "b", "c", "d", "e"]),
            Arc::new(StubFetcher::new()),
            8,
        )
        .unwrap();
        let atlas = builder.wait().unwrap();

        assert_eq!(atlas.atlas_size, 3);
        assert_eq!(atlas.loaded_count(), 5);
        assert_eq!(atlas.empty_count(), 4);
        let (x, y) = cell_origin(8, 3, 8);
        assert_eq!(atlas.image.get_pixel(x + 4, y + 4).0[3], 0);
        let (x, y) = cell_origin(2, 3, 8);
        assert_eq!(atlas.image.get_pixel(x + 4, y + 4).0, [30, 60, 90, 255]);
    }

    #[test]
    fn one_failure_does_not_abort_the_batch() {
        let builder = AtlasBuilder::spawn(
            items(&["a", "b", "bad", "d", "e"]),
            Arc::new(StubFetcher::new()),
            32,
        )
        .unwrap();
        let atlas = builder.wait().unwrap();

        assert_eq!(atlas.atlas_size, 3);
        assert_eq!(atlas.image.dimensions(), (96, 96));
        assert_eq!(atlas.loaded_count(), 4);
        assert_eq!(atlas.fallback_count(), 1);
        assert_eq!(atlas.empty_count(), 4);
        assert_eq!(atlas.cells[2], CellContent::Fallback);
        let (x, y) = cell_origin(2, 3, 32);
        assert_eq!(atlas.image.get_pixel(x, y).0, [5, 5, 5, 255]);
        let (x, y) = cell_origin(4, 3, 32);
        assert_eq!(atlas.image.get_pixel(x + 16, y + 16).0, [30, 60, 90, 255]);
    }

    #[test]
    fn atlas_is_delivered_exactly_once() {
        let mut builder =
            AtlasBuilder::spawn(items(&["a"]), Arc::new(StubFetcher::new()), 4)
                .unwrap();
        let mut received = 0;
        let deadline =
            web_time::Instant::now() + std::time::Duration::from_secs(10);
        while web_time::Instant::now() < deadline {
            if builder.try_recv().is_some() {
                received += 1;
            }
            if received > 0 && builder.is_finished() {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(1));
        }
        assert_eq!(received, 1);
        assert!(builder.try_recv().is_none());
    }
}
