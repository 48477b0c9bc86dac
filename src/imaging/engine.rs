//! Pure pixel transform: executes a [`TransformPlan`] on a decoded image.
//!
//! No I/O happens here — decoding and encoding live behind
//! [`ImageBackend`](super::backend::ImageBackend). Scaling uses Catmull-Rom
//! (the `image` crate's bicubic filter); the crop is a plain pixel copy of
//! the `target`-sized rectangle anchored at (0, 0).

use super::calculations::{TransformPlan, plan_transform};
use crate::naming::Size;
use image::DynamicImage;
use image::imageops::FilterType;

const RESAMPLE_FILTER: FilterType = FilterType::CatmullRom;

/// Produce a `target`-sized thumbnail from `source`.
///
/// - Exact-size sources are returned as an unmodified copy.
/// - Same-aspect sources get a single resize.
/// - Everything else is resized to cover the target (one axis exact, the
///   other larger), then cropped to `target` from the top-left corner.
pub fn transform(source: &DynamicImage, target: Size) -> DynamicImage {
    match plan_transform((source.width(), source.height()), target) {
        TransformPlan::Copy => source.clone(),
        TransformPlan::Resize { width, height } => {
            source.resize_exact(width, height, RESAMPLE_FILTER)
        }
        TransformPlan::ResizeThenCrop {
            resize_width,
            resize_height,
        } => source
            .resize_exact(resize_width, resize_height, RESAMPLE_FILTER)
            .crop_imm(0, 0, target.width, target.height),
    }
}
