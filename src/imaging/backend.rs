//! Image I/O backend trait and the production filesystem implementation.
//!
//! [`ImageBackend`] is the seam between the resolver's cache protocol and
//! actual pixel I/O: `load` decodes a source image, `save` encodes one to
//! disk. The transform itself is pure ([`engine`](super::engine)) and never
//! appears here.
//!
//! The production implementation is [`FsBackend`], built on the `image`
//! crate's pure-Rust codecs. Tests swap in a mock that records operations,
//! which is how the cache's "decode happens at most once" property is
//! asserted without instrumenting the real decoder.

use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::BufWriter;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Decode failed for {path}: {reason}")]
    Decode { path: String, reason: String },
    #[error("Encode failed for {path}: {reason}")]
    Encode { path: String, reason: String },
}

/// Trait for image I/O backends.
pub trait ImageBackend: Sync {
    /// Decode the image at `path`.
    fn load(&self, path: &Path) -> Result<DynamicImage, BackendError>;

    /// Encode `image` to `path` in the given format.
    ///
    /// The format is passed explicitly rather than inferred from `path`
    /// because the resolver writes to a temporary file whose extension says
    /// nothing about the encoding.
    fn save(
        &self,
        image: &DynamicImage,
        path: &Path,
        format: ImageFormat,
    ) -> Result<(), BackendError>;
}

/// Production backend using the `image` crate's codecs.
#[derive(Debug, Default)]
pub struct FsBackend;

impl FsBackend {
    pub fn new() -> Self {
        Self
    }
}

impl ImageBackend for FsBackend {
    fn load(&self, path: &Path) -> Result<DynamicImage, BackendError> {
        ImageReader::open(path)
            .map_err(BackendError::Io)?
            .decode()
            .map_err(|e| BackendError::Decode {
                path: path.display().to_string(),
                reason: e.to_string(),
            })
    }

    fn save(
        &self,
        image: &DynamicImage,
        path: &Path,
        format: ImageFormat,
    ) -> Result<(), BackendError> {
        let file = std::fs::File::create(path).map_err(BackendError::Io)?;
        let mut writer = BufWriter::new(file);
        image
            .write_to(&mut writer, format)
            .map_err(|e| BackendError::Encode {
                path: path.display().to_string(),
                reason: e.to_string(),
            })
    }
}
