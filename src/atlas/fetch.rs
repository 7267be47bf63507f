//! Thumbnail sources.

use image::RgbaImage;

use super::AtlasError;

/// Largest thumbnail body accepted over HTTP.
#[cfg(feature = "http")]
const MAX_IMAGE_BYTES: u64 = 32 * 1024 * 1024;

/// Produces the raw bytes of a thumbnail.
///
/// Implementations are shared by the concurrent loader workers, so they
/// must be `Send + Sync`.
pub trait ImageFetcher: Send + Sync {
    /// Fetch the encoded image at `source` (URL or path).
    ///
    /// # Errors
    ///
    /// Returns [`AtlasError`] when the source cannot be read.
    fn fetch(&self, source: &str) -> Result<Vec<u8>, AtlasError>;
}

/// Fetches `http(s)://` sources over the network and reads everything else
/// from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceFetcher;

impl ImageFetcher for SourceFetcher {
    fn fetch(&self, source: &str) -> Result<Vec<u8>, AtlasError> {
        if is_remote(source) {
            fetch_http(source)
        } else {
            std::fs::read(source).map_err(|error| AtlasError::Io {
                source: source.to_owned(),
                error,
            })
        }
    }
}

/// Whether `source` names a network resource.
#[must_use]
pub fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

#[cfg(feature = "http")]
fn fetch_http(url: &str) -> Result<Vec<u8>, AtlasError> {
    let fetch_error = |e: ureq::Error| AtlasError::Fetch {
        source: url.to_owned(),
        message: e.to_string(),
    };
    let mut response = ureq::get(url).call().map_err(fetch_error)?;
    response
        .body_mut()
        .with_config()
        .limit(MAX_IMAGE_BYTES)
        .read_to_vec()
        .map_err(fetch_error)
}

#[cfg(not(feature = "http"))]
fn fetch_http(url: &str) -> Result<Vec<u8>, AtlasError> {
    Err(AtlasError::Fetch {
        source: url.to_owned(),
        message: "built without the `http` feature".to_owned(),
    })
}

/// Fetch and decode one thumbnail into RGBA8.
///
/// # Errors
///
/// Returns [`AtlasError`] when fetching or decoding fails.
pub fn fetch_image(
    fetcher: &dyn ImageFetcher,
    source: &str,
) -> Result<RgbaImage, AtlasError> {
    let bytes = fetcher.fetch(source)?;
    image::load_from_memory(&bytes)
        .map(|img| img.to_rgba8())
        .map_err(|error| AtlasError::Decode {
            source: source.to_owned(),
            error,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_sources_are_detected_by_scheme() {
        assert!(is_remote("https://picsum.photos/900/900"));
        assert!(is_remote("http://localhost/a.png"));
        assert!(!is_remote("thumbs/http.png"));
        assert!(!is_remote("/var/www/a.png"));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = SourceFetcher
            .fetch("/definitely/not/here.png")
            .unwrap_err();
        assert!(matches!(err, AtlasError::Io { .. }));
    }

    struct Garbage;

    impl ImageFetcher for Garbage {
        fn fetch(&self, _source: &str) -> Result<Vec<u8>, AtlasError> {
            Ok(b"not an image".to_vec())
        }
    }

    #[test]
    fn undecodable_bytes_are_a_decode_error() {
        let err = fetch_image(&Garbage, "x.png").unwrap_err();
        assert!(matches!(err, AtlasError::Decode { .. }));
        assert!(err.to_string().contains("x.png"));
    }
}
