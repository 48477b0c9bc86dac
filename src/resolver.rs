//! Request resolution and the on-disk thumbnail cache.
//!
//! [`Resolver`] owns the whole request path from "give me `photo.jpg` at
//! `small`" to a file on disk:
//!
//! 1. Resolve the physical source under `base_image_path`, substituting the
//!    configured missing image when the source is absent.
//! 2. Derive the cache location `Thumbnails/<bucket>/<filename>`.
//! 3. If the file exists, return it — no decode, no transform, no write.
//! 4. Otherwise decode, transform, and publish the thumbnail.
//!
//! ## Cache population
//!
//! Existence on disk is the entire cache state: no manifest, no index, no
//! eviction. Entries are written once and never updated, so a changed source
//! image with the same filename does not regenerate an existing thumbnail.
//!
//! Population is guarded two ways:
//!
//! - **Per-key locking**: a map from cache path to a mutex serializes
//!   concurrent misses for the same entry. The guard covers the
//!   re-check + decode + write span and is released on every exit path;
//!   requests for distinct entries never contend. Map entries are removed
//!   once the last in-flight miss for a key finishes, so the map is bounded
//!   by concurrent misses, not by the number of distinct entries.
//! - **Atomic publish**: the encoded bytes go to a temporary file in the
//!   bucket directory and are renamed into place, so a reader either sees no
//!   file or a complete one. Renaming over an existing file gives
//!   last-writer-wins semantics for writers the lock map cannot see
//!   (e.g. two processes sharing the tree).

use crate::config::ThumbnailSettings;
use crate::imaging::{BackendError, ImageBackend, transform};
use crate::naming::{Size, THUMBNAILS_DIR, alias_bucket, size_bucket};
use image::ImageFormat;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum ThumbnailError {
    #[error("source image not found (and no missing-image fallback): {0}")]
    SourceNotFound(PathBuf),
    #[error("unknown size alias: {0}")]
    UnknownAlias(String),
    #[error("invalid dimensions: {width}x{height} (both must be positive)")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("source path escapes the image directory: {0}")]
    InvalidSource(String),
    #[error("no encoder for source format: {0}")]
    UnsupportedFormat(PathBuf),
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The size selector of a request: a configured alias or literal dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SizeSpec {
    Alias(String),
    Exact(Size),
}

/// Outcome of source resolution: where the pixels actually come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSource {
    pub physical_path: PathBuf,
    /// True when the requested image was absent and the configured missing
    /// image was substituted. The placeholder's own filename is then used
    /// for the cache entry, not the requested one.
    pub is_fallback: bool,
}

/// A resolved cache entry, ready to hand to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailRef {
    /// Web-addressable path: `{base_virtual_path}/Thumbnails/{bucket}/{filename}`.
    pub logical_path: String,
    /// Physical location of the cached file.
    pub physical_path: PathBuf,
    /// True when the entry already existed and no work was done.
    pub from_cache: bool,
    /// True when the missing-image placeholder was substituted.
    pub used_fallback: bool,
}

/// Resolves thumbnail requests against settings passed in at construction.
pub struct Resolver<B: ImageBackend> {
    settings: ThumbnailSettings,
    backend: B,
    /// Per-cache-path guards for the decode+write critical section.
    locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl<B: ImageBackend> Resolver<B> {
    pub fn new(settings: ThumbnailSettings, backend: B) -> Self {
        Self {
            settings,
            backend,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn settings(&self) -> &ThumbnailSettings {
        &self.settings
    }

    /// Request a thumbnail through a configured alias.
    pub fn request_alias(&self, source: &str, alias: &str) -> Result<ThumbnailRef, ThumbnailError> {
        self.request(source, &SizeSpec::Alias(alias.to_string()))
    }

    /// Request a thumbnail at literal dimensions.
    ///
    /// Dimensions are rejected before any filesystem access.
    pub fn request_size(
        &self,
        source: &str,
        width: u32,
        height: u32,
    ) -> Result<ThumbnailRef, ThumbnailError> {
        let size =
            Size::new(width, height).ok_or(ThumbnailError::InvalidDimensions { width, height })?;
        self.request(source, &SizeSpec::Exact(size))
    }

    /// Request a thumbnail: resolve the source, hit the cache or populate it,
    /// and return the entry's logical and physical paths.
    pub fn request(&self, source: &str, spec: &SizeSpec) -> Result<ThumbnailRef, ThumbnailError> {
        let (size, bucket) = match spec {
            SizeSpec::Alias(name) => {
                let alias = self
                    .settings
                    .find_alias(name)
                    .ok_or_else(|| ThumbnailError::UnknownAlias(name.clone()))?;
                // Bucket uses the configured casing so the on-disk layout is
                // stable however callers spell the alias.
                (alias.size(), alias_bucket(&alias.name, alias.size()))
            }
            SizeSpec::Exact(size) => {
                // Size's fields are public, so a zero axis can reach this
                // entry point without going through Size::new.
                if size.width == 0 || size.height == 0 {
                    return Err(ThumbnailError::InvalidDimensions {
                        width: size.width,
                        height: size.height,
                    });
                }
                (*size, size_bucket(*size))
            }
        };

        let resolved = self.resolve_source(source)?;
        let filename = resolved
            .physical_path
            .file_name()
            .ok_or_else(|| ThumbnailError::SourceNotFound(resolved.physical_path.clone()))?
            .to_string_lossy()
            .into_owned();

        let thumbnail_dir = self
            .settings
            .base_image_path
            .join(THUMBNAILS_DIR)
            .join(&bucket);
        let thumbnail_path = thumbnail_dir.join(&filename);
        let logical_path = format!(
            "{}/{}/{}/{}",
            self.settings.base_virtual_path.trim_end_matches('/'),
            THUMBNAILS_DIR,
            bucket,
            filename
        );

        // Idempotent fast path: existence on disk is the cache state.
        if thumbnail_path.is_file() {
            debug!(path = %thumbnail_path.display(), "thumbnail cache hit");
            return Ok(ThumbnailRef {
                logical_path,
                physical_path: thumbnail_path,
                from_cache: true,
                used_fallback: resolved.is_fallback,
            });
        }

        let from_cache = self.populate(&resolved, &thumbnail_dir, &thumbnail_path, size)?;

        Ok(ThumbnailRef {
            logical_path,
            physical_path: thumbnail_path,
            from_cache,
            used_fallback: resolved.is_fallback,
        })
    }

    /// Resolve the physical source path, falling back to the configured
    /// missing image when the requested one does not exist.
    ///
    /// Sources must stay inside `base_image_path`: absolute paths and any
    /// `..`/`.` components are rejected before touching the filesystem.
    /// Subdirectory sources like `album/photo.jpg` are fine.
    pub fn resolve_source(&self, source: &str) -> Result<ResolvedSource, ThumbnailError> {
        let relative = Path::new(source);
        if relative.is_absolute()
            || relative
                .components()
                .any(|c| !matches!(c, std::path::Component::Normal(_)))
        {
            return Err(ThumbnailError::InvalidSource(source.to_string()));
        }

        let requested = self.settings.base_image_path.join(source);
        if requested.is_file() {
            return Ok(ResolvedSource {
                physical_path: requested,
                is_fallback: false,
            });
        }

        let fallback = self.settings.missing_image();
        if fallback.is_file() {
            warn!(
                requested = %requested.display(),
                fallback = %fallback.display(),
                "source image missing, substituting placeholder"
            );
            return Ok(ResolvedSource {
                physical_path: fallback,
                is_fallback: true,
            });
        }

        Err(ThumbnailError::SourceNotFound(requested))
    }

    /// Create the cache entry. Returns `true` when another caller got there
    /// first while we waited on the per-key guard.
    fn populate(
        &self,
        resolved: &ResolvedSource,
        thumbnail_dir: &Path,
        thumbnail_path: &Path,
        size: Size,
    ) -> Result<bool, ThumbnailError> {
        let lock = {
            let mut locks = self.locks.lock().expect("lock map poisoned");
            Arc::clone(
                locks
                    .entry(thumbnail_path.to_path_buf())
                    .or_insert_with(|| Arc::new(Mutex::new(()))),
            )
        };
        let result = {
            let _guard = lock.lock().expect("cache key lock poisoned");
            self.populate_locked(resolved, thumbnail_dir, thumbnail_path, size)
        };

        // Drop the map entry once no other request holds it, so the map is
        // bounded by in-flight misses rather than every key ever seen. The
        // strong-count check runs under the map lock, the same lock new
        // waiters clone under, so it cannot race with an arriving request.
        let mut locks = self.locks.lock().expect("lock map poisoned");
        if let Some(existing) = locks.get(thumbnail_path)
            && Arc::strong_count(existing) <= 2
        {
            locks.remove(thumbnail_path);
        }

        result
    }

    fn populate_locked(
        &self,
        resolved: &ResolvedSource,
        thumbnail_dir: &Path,
        thumbnail_path: &Path,
        size: Size,
    ) -> Result<bool, ThumbnailError> {
        // Re-check under the guard: a concurrent request may have published
        // the entry while we waited.
        if thumbnail_path.is_file() {
            debug!(path = %thumbnail_path.display(), "thumbnail cache hit after wait");
            return Ok(true);
        }

        debug!(
            source = %resolved.physical_path.display(),
            path = %thumbnail_path.display(),
            "thumbnail cache miss, generating"
        );

        // The output keeps the source's filename, so the source's format is
        // the output format too.
        let format = ImageFormat::from_path(&resolved.physical_path)
            .map_err(|_| ThumbnailError::UnsupportedFormat(resolved.physical_path.clone()))?;

        std::fs::create_dir_all(thumbnail_dir)?;

        let source_image = self.backend.load(&resolved.physical_path)?;
        let thumbnail = transform(&source_image, size);

        // Publish atomically: encode to a temp file in the bucket directory,
        // then rename into place.
        let temp = tempfile::Builder::new()
            .prefix(".thumb-")
            .tempfile_in(thumbnail_dir)?;
        self.backend.save(&thumbnail, temp.path(), format)?;
        temp.persist(thumbnail_path).map_err(|e| e.error)?;

        Ok(false)
    }
}
