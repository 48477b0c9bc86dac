//! # thumbcache
//!
//! Fixed-size thumbnail generation with a deterministic on-disk cache.
//! Given a source image and a target size — a configured alias like `small`
//! or literal `120x80` dimensions — thumbcache derives a crop-and-resize
//! transform that preserves the source aspect ratio, performs it once, and
//! persists the result at a path computed purely from the request:
//!
//! ```text
//! {base_image_path}/Thumbnails/{bucket}/{filename}
//! ```
//!
//! where `bucket` is `"{alias}-{w}x{h}"` or `"{w}x{h}"`. Repeated requests
//! find the file already on disk and return immediately; existence on disk
//! is the entire cache state. No manifest, no eviction, no invalidation.
//!
//! # Request Flow
//!
//! ```text
//! caller → Resolver (source path + fallback, cache path)
//!        → cache check: hit? return path
//!        → miss: decode → plan → resize (+ crop) → atomic publish → path
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `thumbcache.toml` loading and validation — base paths, missing-image placeholder, named size aliases |
//! | [`naming`] | Cache-bucket naming (`small-100x100`, `120x80`) and `WxH` parsing |
//! | [`resolver`] | Source resolution with missing-image fallback, the cache gate, per-key locking, atomic publish |
//! | [`imaging`] | The transform: pure dimension math, the pixel engine, and the decode/encode backend seam |
//!
//! # Design Decisions
//!
//! ## Explicit Settings, No Globals
//!
//! [`ThumbnailSettings`](config::ThumbnailSettings) is loaded once and passed
//! to [`Resolver::new`](resolver::Resolver::new). Nothing reads ambient
//! state, so two resolvers with different trees can coexist in one process
//! (and tests run fully isolated).
//!
//! ## Transform Policy
//!
//! A source already at the target size is copied. A source with the target's
//! aspect ratio (compared by integer cross-product, no float tolerance) is
//! resized straight to target. Everything else is resized to *cover* the
//! target — wider sources clamp to target height, taller ones to target
//! width, so the intermediate always meets or exceeds the target on both
//! axes — then cropped to size from the top-left corner. Smaller-than-target
//! sources go through the same branches and are upscaled, so a bucket's
//! files all have that bucket's exact dimensions.
//!
//! ## Missing-Image Fallback
//!
//! Requests for a nonexistent source resolve to the configured placeholder
//! instead of failing, and the *placeholder's* filename keys the cache
//! entry — every missing source shares one cached thumbnail per bucket.
//! Only when the placeholder itself is absent does a request error.
//!
//! ## Safe Concurrent Population
//!
//! Cache misses for the same entry serialize on a per-path mutex held for
//! the decode+write span; the file itself is published by temp-file-and-
//! rename so no reader ever observes partial bytes. See
//! [`resolver`] for details.

pub mod config;
pub mod imaging;
pub mod naming;
pub mod resolver;

pub use config::{ConfigError, SizeAlias, ThumbnailSettings};
pub use imaging::FsBackend;
pub use naming::Size;
pub use resolver::{Resolver, SizeSpec, ThumbnailError, ThumbnailRef};
