//! Pure calculation functions for thumbnail dimensions.
//!
//! All functions here are pure and testable without any I/O or images.
//!
//! The central decision is [`plan_transform`]: given source and target
//! dimensions, pick one of three plans —
//!
//! | Condition | Plan |
//! |---|---|
//! | source == target | [`TransformPlan::Copy`] |
//! | same aspect ratio | [`TransformPlan::Resize`] straight to target |
//! | different aspect ratio | [`TransformPlan::ResizeThenCrop`] via fill dimensions |
//!
//! Sources smaller than the target go through the same branches and are
//! upscaled, so every request for a given size yields exactly that size.

use crate::naming::Size;

/// The steps needed to turn a source image into a target-sized thumbnail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformPlan {
    /// Source is already exactly the target size — copy unchanged.
    Copy,
    /// Aspect ratios match — a single resize lands exactly on target.
    Resize { width: u32, height: u32 },
    /// Aspect ratios differ — resize to the given fill dimensions (one axis
    /// equals target, the other exceeds it), then crop `target` at (0, 0).
    ResizeThenCrop {
        resize_width: u32,
        resize_height: u32,
    },
}

/// Whether two dimension pairs have the same aspect ratio.
///
/// Compared by integer cross-product (`sw * th == tw * sh`), so 800×600 vs
/// 400×300 compares equal exactly, with no float tolerance to tune.
pub fn aspect_ratio_matches(source: (u32, u32), target: Size) -> bool {
    let (sw, sh) = source;
    sw as u64 * target.height as u64 == target.width as u64 * sh as u64
}

/// Calculate dimensions that fill a target area (resize before crop).
///
/// Returns dimensions that completely cover the target while preserving the
/// source aspect ratio: a wider-than-target source clamps to the target
/// height, a taller source clamps to the target width. In both cases the
/// free axis rounds to at least the target (the crop step's precondition);
/// `max` guards the rounding edge.
pub fn fill_dimensions(source: (u32, u32), target: Size) -> (u32, u32) {
    let (src_w, src_h) = source;
    let src_aspect = src_w as f64 / src_h as f64;
    let tgt_aspect = target.width as f64 / target.height as f64;

    if src_aspect > tgt_aspect {
        // Source is wider: height matches, width exceeds
        let h = target.height;
        let w = (h as f64 * src_aspect).round() as u32;
        (w.max(target.width), h)
    } else {
        // Source is taller: width matches, height exceeds
        let w = target.width;
        let h = (w as f64 / src_aspect).round() as u32;
        (w, h.max(target.height))
    }
}

/// Decide how to transform `source` dimensions into a `target` thumbnail.
pub fn plan_transform(source: (u32, u32), target: Size) -> TransformPlan {
    let (src_w, src_h) = source;

    if src_w == target.width && src_h == target.height {
        return TransformPlan::Copy;
    }

    if aspect_ratio_matches(source, target) {
        return TransformPlan::Resize {
            width: target.width,
            height: target.height,
        };
    }

    let (resize_width, resize_height) = fill_dimensions(source, target);
    TransformPlan::ResizeThenCrop {
        resize_width,
        resize_height,
    }
}
