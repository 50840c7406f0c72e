//! # 内置光栅编解码器
//!
//! ## 设计思路
//!
//! 基于 `image` + `fast_image_resize` + `gif` 实现 `ImageCodec`：
//! - 解码只取首帧；GIF 在首帧覆盖整个逻辑画布时按调色板模式解码，保留透明索引
//! - 其他格式交给 `image`，根据是否带 alpha 输出 `AlphaChannel` 或 `Opaque`
//! - 缩放优先 `fast_image_resize`，失败时回退 `image::imageops::resize`
//! - 输出统一为 JPEG，由 `jpeg-encoder` 编码并启用优化的 Huffman 表

use fast_image_resize as fr;
use image::{ImageBuffer, ImageFormat, ImageReader, Rgb};
use jpeg_encoder::{ColorType, Encoder};
use std::io::Cursor;

use super::ImageError;
use super::codec::ImageCodec;
use super::config::ResampleFilter;
use super::source::{ColorMode, DecodedImage, RgbFrame};

/// 默认光栅编解码器。
#[derive(Debug, Default, Clone, Copy)]
pub struct RasterCodec;

impl RasterCodec {
    pub fn new() -> Self {
        Self
    }

    /// 以调色板模式读取 GIF 首帧。
    ///
    /// 首帧未覆盖整个逻辑画布时返回 `Ok(None)`，交由通用路径合成画布。
    fn decode_gif_indexed(bytes: &[u8]) -> Result<Option<DecodedImage>, ImageError> {
        let mut options = gif::DecodeOptions::new();
        options.set_color_output(gif::ColorOutput::Indexed);

        let mut decoder = options
            .read_info(Cursor::new(bytes))
            .map_err(|e| ImageError::Decode(format!("GIF 头解析失败：{}", e)))?;

        let screen_width = decoder.width() as u32;
        let screen_height = decoder.height() as u32;
        let global_palette = decoder.global_palette().map(|p| p.to_vec());

        let frame = decoder
            .read_next_frame()
            .map_err(|e| ImageError::Decode(format!("GIF 首帧解码失败：{}", e)))?
            .ok_or_else(|| ImageError::Decode("GIF 不包含任何帧".to_string()))?;

        let covers_screen = frame.left == 0
            && frame.top == 0
            && frame.width as u32 == screen_width
            && frame.height as u32 == screen_height;
        if !covers_screen {
            return Ok(None);
        }

        let Some(rgb_palette) = frame.palette.clone().or(global_palette) else {
            return Err(ImageError::Decode("GIF 缺少调色板".to_string()));
        };

        let palette = rgb_palette
            .chunks_exact(3)
            .enumerate()
            .map(|(index, rgb)| {
                let alpha = if frame.transparent == Some(index as u8) { 0 } else { 255 };
                [rgb[0], rgb[1], rgb[2], alpha]
            })
            .collect();

        Ok(Some(DecodedImage {
            width: screen_width,
            height: screen_height,
            mode: ColorMode::Palette {
                indices: frame.buffer.to_vec(),
                palette,
            },
        }))
    }

    /// 通用解码路径；动图格式只返回首帧。
    fn decode_generic(bytes: &[u8]) -> Result<DecodedImage, ImageError> {
        let decoded = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| ImageError::Decode(format!("无法识别图片格式：{}", e)))?
            .decode()
            .map_err(|e| ImageError::Decode(format!("图片解码失败：{}", e)))?;

        let (width, height) = (decoded.width(), decoded.height());
        let mode = if decoded.color().has_alpha() {
            ColorMode::AlphaChannel {
                rgba: decoded.to_rgba8().into_raw(),
            }
        } else {
            ColorMode::Opaque {
                rgb: decoded.to_rgb8().into_raw(),
            }
        };

        Ok(DecodedImage {
            width,
            height,
            mode,
        })
    }

    fn resize_with_fast_image_resize(
        frame: &RgbFrame,
        width: u32,
        height: u32,
        filter: ResampleFilter,
    ) -> Result<RgbFrame, ImageError> {
        let src_image = fr::images::Image::from_vec_u8(
            frame.width,
            frame.height,
            frame.pixels.clone(),
            fr::PixelType::U8x3,
        )
        .map_err(|e| ImageError::Resize(format!("构建源图像缓冲失败：{}", e)))?;

        let mut dst_image = fr::images::Image::new(width, height, fr::PixelType::U8x3);

        let mut resizer = fr::Resizer::new();
        let options = fr::ResizeOptions::new()
            .resize_alg(fr::ResizeAlg::Convolution(Self::to_fast_filter(filter)));

        resizer
            .resize(&src_image, &mut dst_image, Some(&options))
            .map_err(|e| ImageError::Resize(format!("fast_image_resize 执行失败：{}", e)))?;

        Ok(RgbFrame {
            width,
            height,
            pixels: dst_image.into_vec(),
        })
    }

    fn resize_with_image(
        frame: &RgbFrame,
        width: u32,
        height: u32,
        filter: ResampleFilter,
    ) -> Result<RgbFrame, ImageError> {
        let src = ImageBuffer::<Rgb<u8>, Vec<u8>>::from_raw(
            frame.width,
            frame.height,
            frame.pixels.clone(),
        )
        .ok_or_else(|| ImageError::Resize("源像素缓冲长度异常".to_string()))?;

        let resized = image::imageops::resize(&src, width, height, Self::to_image_filter(filter));

        Ok(RgbFrame {
            width,
            height,
            pixels: resized.into_raw(),
        })
    }

    fn to_fast_filter(filter: ResampleFilter) -> fr::FilterType {
        match filter {
            ResampleFilter::Lanczos3 => fr::FilterType::Lanczos3,
            ResampleFilter::CatmullRom => fr::FilterType::CatmullRom,
            ResampleFilter::Bilinear => fr::FilterType::Bilinear,
        }
    }

    fn to_image_filter(filter: ResampleFilter) -> image::imageops::FilterType {
        match filter {
            ResampleFilter::Lanczos3 => image::imageops::FilterType::Lanczos3,
            ResampleFilter::CatmullRom => image::imageops::FilterType::CatmullRom,
            ResampleFilter::Bilinear => image::imageops::FilterType::Triangle,
        }
    }
}

impl ImageCodec for RasterCodec {
    fn name(&self) -> &'static str {
        "raster"
    }

    fn decode_first_frame(&self, bytes: &[u8]) -> Result<DecodedImage, ImageError> {
        let format = image::guess_format(bytes)
            .map_err(|e| ImageError::Decode(format!("不支持的图片格式：{}", e)))?;

        if format == ImageFormat::Gif {
            if let Some(decoded) = Self::decode_gif_indexed(bytes)? {
                return Ok(decoded);
            }
        }

        Self::decode_generic(bytes)
    }

    fn resize(
        &self,
        frame: &RgbFrame,
        width: u32,
        height: u32,
        filter: ResampleFilter,
    ) -> Result<RgbFrame, ImageError> {
        match Self::resize_with_fast_image_resize(frame, width, height, filter) {
            Ok(resized) => Ok(resized),
            Err(err) => {
                log::warn!(
                    "⚠️ fast_image_resize 降采样失败，回退 image::imageops::resize：{}",
                    err
                );
                Self::resize_with_image(frame, width, height, filter)
            }
        }
    }

    fn encode_jpeg(&self, frame: &RgbFrame, quality: u8) -> Result<Vec<u8>, ImageError> {
        // JPEG 帧头的宽高字段只有 16 位
        let (Ok(width), Ok(height)) = (u16::try_from(frame.width), u16::try_from(frame.height))
        else {
            return Err(ImageError::Encode(format!(
                "尺寸 {}x{} 超出 JPEG 上限",
                frame.width, frame.height
            )));
        };

        let mut buf = Vec::new();
        let mut encoder = Encoder::new(&mut buf, quality);
        encoder.set_optimized_huffman_tables(true);
        encoder
            .encode(&frame.pixels, width, height, ColorType::Rgb)
            .map_err(|e| {
                ImageError::Encode(format!("JPEG 编码失败（quality={}）：{}", quality, e))
            })?;
        Ok(buf)
    }
}
