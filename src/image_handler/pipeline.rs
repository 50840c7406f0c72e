//! # 颜色归一化流水线
//!
//! ## 设计思路
//!
//! JPEG 只接受不透明 RGB，因此解码后的首帧必须先归一化：
//! - `Opaque`：直接使用
//! - `AlphaChannel`：合成到纯白背景后丢弃 alpha（透明区域为白色，而不是黑色）
//! - `Palette`：先展开为 RGBA，再按 `AlphaChannel` 处理
//!
//! ## 实现思路
//!
//! 1. 按颜色模式走对应的合成函数（严格校验缓冲长度与调色板索引）
//! 2. 合成失败时回退到“直接转换”：丢弃 alpha、不合成，越界索引按黑色处理
//! 3. 回退仍失败时返回 `ColorConversion`

use super::ImageError;
use super::source::{ColorMode, DecodedImage, RgbFrame};

const WHITE: u16 = 255;

/// 将解码结果归一化为 RGB 位图。
pub(crate) fn normalize_to_rgb(image: &DecodedImage) -> Result<RgbFrame, ImageError> {
    match composite_on_white(image) {
        Ok(frame) => Ok(frame),
        Err(err) => {
            log::warn!(
                "⚠️ 白底合成失败，回退直接 RGB 转换 - 模式: {} 原因: {}",
                image.mode.name(),
                err
            );
            direct_rgb(image)
        }
    }
}

fn composite_on_white(image: &DecodedImage) -> Result<RgbFrame, ImageError> {
    let (width, height) = (image.width, image.height);
    match &image.mode {
        ColorMode::Opaque { rgb } => {
            check_len(width, height, 3, rgb.len())?;
            Ok(RgbFrame {
                width,
                height,
                pixels: rgb.clone(),
            })
        }
        ColorMode::AlphaChannel { rgba } => {
            check_len(width, height, 4, rgba.len())?;
            Ok(RgbFrame {
                width,
                height,
                pixels: blend_rgba_on_white(rgba),
            })
        }
        ColorMode::Palette { indices, palette } => {
            check_len(width, height, 1, indices.len())?;
            let rgba = expand_palette(indices, palette)?;
            Ok(RgbFrame {
                width,
                height,
                pixels: blend_rgba_on_white(&rgba),
            })
        }
    }
}

/// 回退路径：不合成，直接丢弃 alpha。
fn direct_rgb(image: &DecodedImage) -> Result<RgbFrame, ImageError> {
    let (width, height) = (image.width, image.height);
    let pixels = match &image.mode {
        ColorMode::Opaque { rgb } => {
            check_len(width, height, 3, rgb.len())?;
            rgb.clone()
        }
        ColorMode::AlphaChannel { rgba } => {
            check_len(width, height, 4, rgba.len())?;
            rgba.chunks_exact(4)
                .flat_map(|px| [px[0], px[1], px[2]])
                .collect()
        }
        ColorMode::Palette { indices, palette } => {
            check_len(width, height, 1, indices.len())?;
            indices
                .iter()
                .flat_map(|index| {
                    let [r, g, b, _] = palette
                        .get(*index as usize)
                        .copied()
                        .unwrap_or([0, 0, 0, 255]);
                    [r, g, b]
                })
                .collect()
        }
    };

    Ok(RgbFrame {
        width,
        height,
        pixels,
    })
}

fn check_len(width: u32, height: u32, channels: usize, actual: usize) -> Result<(), ImageError> {
    if width == 0 || height == 0 {
        return Err(ImageError::ColorConversion(format!(
            "图片尺寸非法：{}x{}",
            width, height
        )));
    }

    let expected = RgbFrame::expected_len(width, height, channels)
        .ok_or_else(|| ImageError::ColorConversion("图片尺寸导致缓冲长度溢出".to_string()))?;

    if expected != actual {
        return Err(ImageError::ColorConversion(format!(
            "像素数据长度异常：期望 {} 实际 {}",
            expected, actual
        )));
    }

    Ok(())
}

fn expand_palette(indices: &[u8], palette: &[[u8; 4]]) -> Result<Vec<u8>, ImageError> {
    let mut rgba = Vec::with_capacity(indices.len() * 4);
    for index in indices {
        let entry = palette.get(*index as usize).ok_or_else(|| {
            ImageError::ColorConversion(format!(
                "调色板索引越界：{}（调色板大小 {}）",
                index,
                palette.len()
            ))
        })?;
        rgba.extend_from_slice(entry);
    }
    Ok(rgba)
}

fn blend_rgba_on_white(rgba: &[u8]) -> Vec<u8> {
    rgba.chunks_exact(4)
        .flat_map(|px| {
            let alpha = px[3] as u16;
            let blend = |channel: u8| {
                ((channel as u16 * alpha + WHITE * (255 - alpha) + 127) / 255) as u8
            };
            [blend(px[0]), blend(px[1]), blend(px[2])]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decoded(width: u32, height: u32, mode: ColorMode) -> DecodedImage {
        DecodedImage {
            width,
            height,
            mode,
        }
    }

    #[test]
    fn transparent_pixels_become_white() {
        let rgba = vec![
            0, 0, 0, 0, // 全透明黑
            255, 0, 0, 255, // 不透明红
            0, 0, 255, 128, // 半透明蓝
            10, 20, 30, 255,
        ];
        let frame = normalize_to_rgb(&decoded(2, 2, ColorMode::AlphaChannel { rgba }))
            .expect("normalize should succeed");

        assert_eq!(&frame.pixels[0..3], &[255, 255, 255]);
        assert_eq!(&frame.pixels[3..6], &[255, 0, 0]);
        assert_eq!(&frame.pixels[6..9], &[127, 127, 255]);
        assert_eq!(&frame.pixels[9..12], &[10, 20, 30]);
    }

    #[test]
    fn palette_with_transparent_entry_composites_on_white() {
        let palette = vec![[0, 0, 0, 0], [0, 128, 0, 255]];
        let indices = vec![0, 1, 1, 0];
        let frame = normalize_to_rgb(&decoded(2, 2, ColorMode::Palette { indices, palette }))
            .expect("normalize should succeed");

        assert_eq!(
            frame.pixels,
            vec![255, 255, 255, 0, 128, 0, 0, 128, 0, 255, 255, 255]
        );
    }

    #[test]
    fn out_of_range_palette_index_falls_back_to_direct_conversion() {
        let palette = vec![[200, 100, 50, 255]];
        let indices = vec![0, 7];
        let frame = normalize_to_rgb(&decoded(2, 1, ColorMode::Palette { indices, palette }))
            .expect("fallback should succeed");

        assert_eq!(frame.pixels, vec![200, 100, 50, 0, 0, 0]);
    }

    #[test]
    fn mismatched_buffer_fails_both_paths() {
        let result = normalize_to_rgb(&decoded(4, 4, ColorMode::Opaque { rgb: vec![0; 10] }));
        assert!(matches!(result, Err(ImageError::ColorConversion(_))));

        let result = normalize_to_rgb(&decoded(0, 4, ColorMode::AlphaChannel { rgba: Vec::new() }));
        assert!(matches!(result, Err(ImageError::ColorConversion(_))));
    }
}
