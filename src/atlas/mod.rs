//! Thumbnail texture atlas.
//!
//! All item thumbnails are packed into one square grid image so the whole
//! sphere renders with a single texture binding. The grid has
//! [`atlas_size`] cells per side; cell `i` sits at column `i % size`, row
//! `i / size`, matching the lookup in the disc fragment shader.
//!
//! Building happens off the main thread ([`AtlasBuilder`]): every image is
//! fetched and decoded concurrently, and only once all of them have settled
//! is the grid composed and handed back. Failed items get a generated
//! fallback tile; a failure never aborts the batch.

/// Background build thread and concurrent image loading.
pub mod builder;
/// Grid composition and fallback tiles.
pub mod compose;
/// Image sources (HTTP and filesystem).
pub mod fetch;

use std::fmt;

pub use builder::AtlasBuilder;
pub use compose::compose_atlas;
pub use fetch::{ImageFetcher, SourceFetcher};
use image::RgbaImage;

/// Default cell edge length in pixels.
pub const DEFAULT_CELL_SIZE: u32 = 512;

/// Cells per atlas side for `item_count` items (an empty list counts as one).
#[must_use]
pub fn atlas_size(item_count: usize) -> u32 {
    (item_count.max(1) as f64).sqrt().ceil() as u32
}

/// Pixel origin of cell `index` in an atlas of `size` cells per side.
#[must_use]
pub fn cell_origin(index: usize, size: u32, cell_size: u32) -> (u32, u32) {
    let index = index as u32;
    ((index % size) * cell_size, (index / size) * cell_size)
}

/// What a grid cell ended up holding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellContent {
    /// The item's image, resized to the cell.
    Loaded,
    /// Generated placeholder tile (the image failed to load or decode).
    Fallback,
    /// Unused slot past the last item; left transparent.
    Empty,
}

/// A fully composed atlas ready for GPU upload.
#[derive(Debug, Clone)]
pub struct AtlasImage {
    /// RGBA8 grid image, `atlas_size * cell_size` pixels per side.
    pub image: RgbaImage,
    /// Cells per side.
    pub atlas_size: u32,
    /// Cell edge length in pixels.
    pub cell_size: u32,
    /// Per-cell content, row-major, `atlas_size²` entries.
    pub cells: Vec<CellContent>,
}

impl AtlasImage {
    /// Number of cells holding a loaded image.
    #[must_use]
    pub fn loaded_count(&self) -> usize {
        self.count(CellContent::Loaded)
    }

    /// Number of cells holding a fallback tile.
    #[must_use]
    pub fn fallback_count(&self) -> usize {
        self.count(CellContent::Fallback)
    }

    /// Number of unused cells.
    #[must_use]
    pub fn empty_count(&self) -> usize {
        self.count(CellContent::Empty)
    }

    fn count(&self, content: CellContent) -> usize {
        self.cells.iter().filter(|&&c| c == content).count()
    }
}

/// Per-item thumbnail failure. Logged and replaced with a fallback tile.
#[derive(Debug)]
pub enum AtlasError {
    /// Network request failed or returned an error status.
    Fetch {
        /// The URL that was requested.
        source: String,
        /// Transport or status description.
        message: String,
    },
    /// Bytes were fetched but are not a decodable image.
    Decode {
        /// The image source.
        source: String,
        /// Decoder error.
        error: image::ImageError,
    },
    /// Reading a local file failed.
    Io {
        /// The file path.
        source: String,
        /// Underlying I/O error.
        error: std::io::Error,
    },
    /// The build thread went away without delivering an atlas.
    Disconnected,
}

impl fmt::Display for AtlasError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch { source, message } => {
                write!(f, "failed to fetch {source}: {message}")
            }
            Self::Decode { source, error } => {
                write!(f, "failed to decode {source}: {error}")
            }
            Self::Io { source, error } => {
                write!(f, "failed to read {source}: {error}")
            }
            Self::Disconnected => {
                write!(f, "atlas build thread exited without a result")
            }
        }
    }
}

impl std::error::Error for AtlasError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Decode { error, .. } => Some(error),
            Self::Io { error, .. } => Some(error),
            Self::Fetch { .. } | Self::Disconnected => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atlas_size_is_ceil_sqrt_with_empty_as_one() {
        let cases = [
            (0, 1),
            (1, 1),
            (2, 2),
            (3, 2),
            (4, 2),
            (5, 3),
            (9, 3),
            (10, 4),
        ];
        for (n, expected) in cases {
            assert_eq!(atlas_size(n), expected, "atlas_size({n})");
        }
    }

    #[test]
    fn atlas_always_fits_every_item() {
        for n in 0..200 {
            let size = atlas_size(n) as usize;
            assert!(size * size >= n.max(1));
        }
    }

    #[test]
    fn cell_origin_is_row_major() {
        assert_eq!(cell_origin(0, 3, 10), (0, 0));
        assert_eq!(cell_origin(2, 3, 10), (20, 0));
        assert_eq!(cell_origin(4, 3, 10), (10, 10));
    }
}
