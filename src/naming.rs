//! Cache-bucket naming and size parsing.
//!
//! Every cached thumbnail lives under `Thumbnails/<bucket>/`, one flat
//! subdirectory per distinct size request. The bucket name is the only thing
//! that distinguishes requests, so it is derived here in exactly one place:
//!
//! - alias request: `"{alias}-{width}x{height}"` (e.g. `small-100x100`)
//! - literal request: `"{width}x{height}"` (e.g. `120x80`)

use std::fmt;

/// Name of the thumbnail tree's root directory under the base image path.
pub const THUMBNAILS_DIR: &str = "Thumbnails";

/// A strictly positive target size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    /// Construct a size, rejecting zero on either axis.
    pub fn new(width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 {
            None
        } else {
            Some(Self { width, height })
        }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Bucket name for an alias request: `"{alias}-{width}x{height}"`.
///
/// The alias name keeps its configured casing so the on-disk layout matches
/// the config file, even though lookup is case-insensitive.
pub fn alias_bucket(alias: &str, size: Size) -> String {
    format!("{alias}-{size}")
}

/// Bucket name for a literal-dimension request: `"{width}x{height}"`.
pub fn size_bucket(size: Size) -> String {
    size.to_string()
}

/// Parse a `"WxH"` size spec (as accepted on the command line).
///
/// Returns `None` for anything that is not two positive integers joined by a
/// single `x`.
pub fn parse_size(spec: &str) -> Option<Size> {
    let (w, h) = spec.split_once('x')?;
    Size::new(w.parse().ok()?, h.parse().ok()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_rejects_zero_axes() {
        assert!(Size::new(0, 100).is_none());
        assert!(Size::new(100, 0).is_none());
        assert!(Size::new(1, 1).is_some());
    }

    #[test]
    fn size_displays_as_w_x_h() {
        assert_eq!(Size::new(120, 80).unwrap().to_string(), "120x80");
    }

    #[test]
    fn alias_bucket_joins_name_and_dimensions() {
        let size = Size::new(100, 100).unwrap();
        assert_eq!(alias_bucket("small", size), "small-100x100");
    }

    #[test]
    fn alias_bucket_keeps_configured_casing() {
        let size = Size::new(600, 200).unwrap();
        assert_eq!(alias_bucket("Banner", size), "Banner-600x200");
    }

    #[test]
    fn size_bucket_is_bare_dimensions() {
        assert_eq!(size_bucket(Size::new(120, 80).unwrap()), "120x80");
    }

    #[test]
    fn parse_size_valid() {
        assert_eq!(parse_size("300x200"), Size::new(300, 200));
    }

    #[test]
    fn parse_size_rejects_zero() {
        assert_eq!(parse_size("0x200"), None);
        assert_eq!(parse_size("300x0"), None);
    }

    #[test]
    fn parse_size_rejects_malformed() {
        assert_eq!(parse_size("300"), None);
        assert_eq!(parse_size("300x"), None);
        assert_eq!(parse_size("x200"), None);
        assert_eq!(parse_size("300x200x100"), None);
        assert_eq!(parse_size("wide x tall"), None);
    }
}
