// Compression scenarios against the built-in raster codec
use std::io::Cursor;
use std::sync::Arc;

use image::codecs::gif::GifEncoder;
use image::{
    Delay, DynamicImage, Frame, GenericImageView, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage,
};
use proptest::prelude::*;
use service_rating::image_handler::{
    ColorMode, CompressionCandidate, CompressionConfig, ImageCodec, ImageCompressor, ImageError,
    RasterCodec, RgbFrame,
};

fn compressor() -> ImageCompressor {
    ImageCompressor::new(Arc::new(RasterCodec::new()), CompressionConfig::default())
        .expect("default config should be valid")
}

/// 伪随机噪声，JPEG 难以压缩，便于制造大文件。
fn noise_rgb(width: u32, height: u32, seed: u32) -> RgbImage {
    let mut state = seed.max(1);
    RgbImage::from_fn(width, height, |_, _| {
        let mut next = || {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state & 0xFF) as u8
        };
        Rgb([next(), next(), next()])
    })
}

fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    image
        .write_to(&mut cursor, format)
        .expect("failed to encode test image");
    cursor.into_inner()
}

fn reload_jpeg(bytes: &[u8]) -> DynamicImage {
    assert_eq!(
        image::guess_format(bytes).expect("output should have a known signature"),
        ImageFormat::Jpeg
    );
    image::load_from_memory_with_format(bytes, ImageFormat::Jpeg).expect("output should re-decode")
}

/// 用同一编解码器计算全尺寸下某个质量档的输出大小。
fn full_size_len(raw: &[u8], quality: u8) -> usize {
    let codec = RasterCodec::new();
    let decoded = codec.decode_first_frame(raw).expect("decode");
    let ColorMode::Opaque { rgb } = decoded.mode else {
        panic!("expected opaque input");
    };
    let frame = RgbFrame {
        width: decoded.width,
        height: decoded.height,
        pixels: rgb,
    };
    codec.encode_jpeg(&frame, quality).expect("encode").len()
}

#[test]
fn large_opaque_jpeg_fits_at_full_scale_when_possible() {
    let raw = encode(
        DynamicImage::ImageRgb8(noise_rgb(640, 480, 7)),
        ImageFormat::Jpeg,
    );
    assert_eq!(image::guess_format(&raw).expect("fixture format"), ImageFormat::Jpeg);
    let q70 = full_size_len(&raw, 70);
    let q55 = full_size_len(&raw, 55);
    assert!(q70 > q55, "quality steps should shrink output");

    let result = compressor().compress(&raw, q55).expect("should fit");

    assert_eq!(result.candidate, CompressionCandidate { scale: 1.0, quality: 55 });
    assert_eq!((result.width, result.height), (640, 480));
    assert!(result.bytes.len() <= q55);
    assert_eq!(reload_jpeg(&result.bytes).dimensions(), (640, 480));
}

#[test]
fn shrinks_when_lowest_quality_is_still_too_large() {
    let raw = encode(
        DynamicImage::ImageRgb8(noise_rgb(640, 480, 11)),
        ImageFormat::Png,
    );
    let budget = full_size_len(&raw, 40) - 1;

    let result = compressor().compress(&raw, budget).expect("should fit after shrinking");

    assert!(result.candidate.scale < 1.0);
    assert!(result.bytes.len() <= budget);
    let reloaded = reload_jpeg(&result.bytes);
    assert_eq!(reloaded.dimensions(), (result.width, result.height));
    assert!(result.width < 640 && result.height < 480);
}

#[test]
fn transparent_png_is_rendered_on_white() {
    let icon = RgbaImage::from_fn(100, 100, |x, y| {
        if (30..70).contains(&x) && (30..70).contains(&y) {
            Rgba([220, 0, 0, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    });
    let raw = encode(DynamicImage::ImageRgba8(icon), ImageFormat::Png);

    let result = compressor().compress(&raw, 1024 * 1024).expect("should compress");
    let output = reload_jpeg(&result.bytes).to_rgb8();

    let corner = output.get_pixel(2, 2);
    assert!(corner.0.iter().all(|c| *c >= 240), "corner should be white, got {:?}", corner);
    let center = output.get_pixel(50, 50);
    assert!(
        center[0] > 180 && center[1] < 60 && center[2] < 60,
        "center should be red, got {:?}",
        center
    );
}

#[test]
fn transparent_webp_is_rendered_on_white() {
    let sticker = RgbaImage::from_fn(96, 96, |x, y| {
        if (32..64).contains(&x) && (32..64).contains(&y) {
            Rgba([0, 0, 200, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    });
    let raw = encode(DynamicImage::ImageRgba8(sticker), ImageFormat::WebP);
    assert_eq!(image::guess_format(&raw).expect("fixture format"), ImageFormat::WebP);

    let result = compressor().compress(&raw, 1024 * 1024).expect("should compress");
    let output = reload_jpeg(&result.bytes).to_rgb8();

    let corner = output.get_pixel(4, 4);
    assert!(corner.0.iter().all(|c| *c >= 240), "corner should be white, got {:?}", corner);
    let center = output.get_pixel(48, 48);
    assert!(center[2] > 150 && center[0] < 60, "center should be blue, got {:?}", center);
}

#[test]
fn animated_gif_uses_first_frame() {
    let red = RgbaImage::from_pixel(80, 80, Rgba([255, 0, 0, 255]));
    let blue = RgbaImage::from_pixel(80, 80, Rgba([0, 0, 255, 255]));
    let mut raw = Vec::new();
    {
        let mut encoder = GifEncoder::new(&mut raw);
        encoder
            .encode_frames(vec![
                Frame::from_parts(red, 0, 0, Delay::from_numer_denom_ms(100, 1)),
                Frame::from_parts(blue, 0, 0, Delay::from_numer_denom_ms(100, 1)),
            ])
            .expect("failed to encode gif");
    }

    let result = compressor().compress(&raw, 1024 * 1024).expect("should compress");
    let output = reload_jpeg(&result.bytes).to_rgb8();

    let pixel = output.get_pixel(40, 40);
    assert!(pixel[0] > 200 && pixel[2] < 60, "expected first (red) frame, got {:?}", pixel);
}

#[test]
fn truncated_image_is_a_decode_failure() {
    let raw = encode(
        DynamicImage::ImageRgb8(noise_rgb(64, 64, 3)),
        ImageFormat::Png,
    );
    let truncated = &raw[..raw.len() / 4];

    let result = compressor().compress(truncated, 1024);
    assert!(matches!(result, Err(ImageError::Decode(_))));
}

#[test]
fn unreachable_budget_fails_instead_of_returning_oversized_output() {
    let raw = encode(
        DynamicImage::ImageRgb8(noise_rgb(300, 200, 5)),
        ImageFormat::Png,
    );

    let result = compressor().compress(&raw, 100);
    match result {
        Err(ImageError::BudgetUnsatisfiable { target_bytes, smallest }) => {
            assert_eq!(target_bytes, 100);
            assert!(smallest.is_some_and(|s| s > 100));
        }
        other => panic!("expected BudgetUnsatisfiable, got {:?}", other.map(|c| c.candidate)),
    }
}

#[test]
fn input_bytes_are_not_mutated() {
    let raw = encode(
        DynamicImage::ImageRgb8(noise_rgb(120, 90, 9)),
        ImageFormat::Png,
    );
    let before = raw.clone();
    let _ = compressor().compress(&raw, 4096);
    assert_eq!(raw, before);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn successful_output_never_exceeds_budget(
        width in 1u32..160,
        height in 1u32..160,
        seed in 1u32..10_000,
        budget in 200usize..40_000,
    ) {
        let raw = encode(DynamicImage::ImageRgb8(noise_rgb(width, height, seed)), ImageFormat::Png);

        match compressor().compress(&raw, budget) {
            Ok(result) => {
                prop_assert!(result.bytes.len() <= budget);
                let reloaded = reload_jpeg(&result.bytes);
                prop_assert_eq!(reloaded.dimensions(), (result.width, result.height));
            }
            Err(ImageError::BudgetUnsatisfiable { .. }) => {}
            Err(other) => prop_assert!(false, "unexpected error: {}", other),
        }
    }
}
