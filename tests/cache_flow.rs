//! End-to-end cache behavior against the real filesystem backend: actual
//! image decode, transform, encode, and the on-disk cache layout.

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use thumbcache::{FsBackend, Resolver, SizeAlias, ThumbnailError, ThumbnailSettings};

fn write_png(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    DynamicImage::ImageRgb8(img)
        .save_with_format(path, ImageFormat::Png)
        .unwrap();
}

fn resolver_in(tmp: &TempDir) -> Resolver<FsBackend> {
    let settings = ThumbnailSettings {
        base_image_path: tmp.path().to_path_buf(),
        base_virtual_path: "/img".to_string(),
        missing_image_path: PathBuf::from("missing.png"),
        aliases: vec![
            SizeAlias {
                name: "square".to_string(),
                width: 300,
                height: 300,
            },
            SizeAlias {
                name: "tiny".to_string(),
                width: 50,
                height: 50,
            },
        ],
    };
    settings.validate().unwrap();
    Resolver::new(settings, FsBackend::new())
}

fn dimensions_of(path: &Path) -> (u32, u32) {
    image::image_dimensions(path).unwrap()
}

#[test]
fn landscape_source_to_square_alias_produces_exact_dimensions() {
    let tmp = TempDir::new().unwrap();
    write_png(&tmp.path().join("photo.png"), 800, 600);
    let resolver = resolver_in(&tmp);

    // 800x600 through square-300x300: fill to 400x300, crop to 300x300
    let thumb = resolver.request_alias("photo.png", "square").unwrap();

    assert_eq!(thumb.logical_path, "/img/Thumbnails/square-300x300/photo.png");
    assert_eq!(dimensions_of(&thumb.physical_path), (300, 300));
}

#[test]
fn same_aspect_square_source_resizes_only() {
    let tmp = TempDir::new().unwrap();
    write_png(&tmp.path().join("photo.png"), 100, 100);
    let resolver = resolver_in(&tmp);

    let thumb = resolver.request_alias("photo.png", "tiny").unwrap();
    assert_eq!(dimensions_of(&thumb.physical_path), (50, 50));
}

#[test]
fn exact_size_source_is_copied_pixel_identical() {
    let tmp = TempDir::new().unwrap();
    write_png(&tmp.path().join("photo.png"), 50, 50);
    let resolver = resolver_in(&tmp);

    let thumb = resolver.request_alias("photo.png", "tiny").unwrap();

    // PNG is lossless, so the re-encoded copy decodes to identical pixels
    let original = image::open(tmp.path().join("photo.png")).unwrap().to_rgb8();
    let cached = image::open(&thumb.physical_path).unwrap().to_rgb8();
    assert_eq!(original.as_raw(), cached.as_raw());
}

#[test]
fn smaller_than_target_source_is_upscaled() {
    let tmp = TempDir::new().unwrap();
    write_png(&tmp.path().join("photo.png"), 40, 20);
    let resolver = resolver_in(&tmp);

    let thumb = resolver.request_alias("photo.png", "square").unwrap();
    assert_eq!(dimensions_of(&thumb.physical_path), (300, 300));
}

#[test]
fn second_request_reuses_the_cached_file() {
    let tmp = TempDir::new().unwrap();
    write_png(&tmp.path().join("photo.png"), 800, 600);
    let resolver = resolver_in(&tmp);

    let first = resolver.request_alias("photo.png", "square").unwrap();
    let bytes = fs::read(&first.physical_path).unwrap();
    let mtime = fs::metadata(&first.physical_path).unwrap().modified().unwrap();

    let second = resolver.request_alias("photo.png", "square").unwrap();
    assert!(second.from_cache);
    assert_eq!(second.physical_path, first.physical_path);
    assert_eq!(fs::read(&second.physical_path).unwrap(), bytes);
    assert_eq!(
        fs::metadata(&second.physical_path).unwrap().modified().unwrap(),
        mtime
    );
}

#[test]
fn cached_entry_survives_source_change() {
    let tmp = TempDir::new().unwrap();
    write_png(&tmp.path().join("photo.png"), 800, 600);
    let resolver = resolver_in(&tmp);

    let first = resolver.request_alias("photo.png", "square").unwrap();
    let bytes = fs::read(&first.physical_path).unwrap();

    // Replace the source — no invalidation: the old thumbnail persists
    write_png(&tmp.path().join("photo.png"), 200, 900);
    let second = resolver.request_alias("photo.png", "square").unwrap();

    assert!(second.from_cache);
    assert_eq!(fs::read(&second.physical_path).unwrap(), bytes);
}

#[test]
fn alias_and_exact_requests_use_separate_buckets() {
    let tmp = TempDir::new().unwrap();
    write_png(&tmp.path().join("photo.png"), 800, 600);
    let resolver = resolver_in(&tmp);

    resolver.request_alias("photo.png", "square").unwrap();
    let exact = resolver.request_size("photo.png", 300, 300).unwrap();

    // Same dimensions, different bucket: the exact request is a fresh entry
    assert!(!exact.from_cache);
    assert_eq!(exact.logical_path, "/img/Thumbnails/300x300/photo.png");
    assert!(tmp.path().join("Thumbnails/square-300x300/photo.png").is_file());
    assert!(tmp.path().join("Thumbnails/300x300/photo.png").is_file());
}

#[test]
fn missing_source_serves_placeholder_thumbnail() {
    let tmp = TempDir::new().unwrap();
    write_png(&tmp.path().join("missing.png"), 400, 400);
    let resolver = resolver_in(&tmp);

    let thumb = resolver.request_alias("not-there.png", "tiny").unwrap();
    assert!(thumb.used_fallback);
    assert_eq!(thumb.logical_path, "/img/Thumbnails/tiny-50x50/missing.png");
    assert_eq!(dimensions_of(&thumb.physical_path), (50, 50));
}

#[test]
fn corrupt_source_surfaces_decode_error() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("photo.png"), b"not actually a png").unwrap();
    let resolver = resolver_in(&tmp);

    let err = resolver.request_alias("photo.png", "tiny").unwrap_err();
    assert!(matches!(err, ThumbnailError::Backend(_)), "got {err:?}");
    // Nothing half-written left behind
    assert!(!tmp.path().join("Thumbnails/tiny-50x50/photo.png").exists());
}

#[test]
fn no_temp_files_left_in_bucket_after_publish() {
    let tmp = TempDir::new().unwrap();
    write_png(&tmp.path().join("photo.png"), 800, 600);
    let resolver = resolver_in(&tmp);

    resolver.request_alias("photo.png", "square").unwrap();

    let entries: Vec<String> = fs::read_dir(tmp.path().join("Thumbnails/square-300x300"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(entries, vec!["photo.png".to_string()]);
}
