//! # 自适应压缩器
//!
//! ## 设计思路
//!
//! `ImageCompressor` 负责“解码 → 颜色归一化 → 网格搜索”整条链路，是一个纯函数：
//! 输入字节 + 预算，输出不超过预算的 JPEG 或失败，不修改调用方数据。
//!
//! ## 实现思路
//!
//! - 搜索顺序固定：外层缩放、内层质量，首个满足预算的组合立即返回（first-fit）
//! - 同一缩放下各质量档共享一次缩放结果
//! - 单个组合的缩放/编码失败只跳过该组合，不中断搜索
//! - 网格耗尽仍不满足预算时返回 `BudgetUnsatisfiable`，绝不返回超限结果

use std::sync::Arc;
use std::time::Instant;

use super::codec::ImageCodec;
use super::pipeline::normalize_to_rgb;
use super::source::{CompressedImage, CompressionCandidate, RgbFrame};
use super::{CompressionConfig, ImageError};

/// 图片压缩器。
///
/// 构造后只读，可通过 `Arc` 在请求间共享。
pub struct ImageCompressor {
    codec: Arc<dyn ImageCodec>,
    config: CompressionConfig,
}

impl ImageCompressor {
    /// 以指定编解码器与配置创建压缩器，非法配置在此处直接拒绝。
    ///
    /// # 示例
    /// ```rust,ignore
    /// use service_rating::image_handler::{default_codec, CompressionConfig, ImageCompressor};
    ///
    /// let compressor = ImageCompressor::new(default_codec()?, CompressionConfig::default())?;
    /// # Ok::<(), service_rating::image_handler::ImageError>(())
    /// ```
    pub fn new(codec: Arc<dyn ImageCodec>, config: CompressionConfig) -> Result<Self, ImageError> {
        config.validate()?;
        log::debug!(
            "⚙️ 压缩器就绪 - codec={} scales={:?} qualities={:?} max_attempts={}",
            codec.name(),
            config.scale_steps,
            config.quality_steps,
            config.max_attempts()
        );
        Ok(Self { codec, config })
    }

    /// 将图片压缩到 `target_bytes` 以内。
    pub fn compress(&self, raw: &[u8], target_bytes: usize) -> Result<CompressedImage, ImageError> {
        if target_bytes == 0 {
            return Err(ImageError::InvalidConfig("目标字节数必须大于 0".to_string()));
        }

        let start = Instant::now();
        let decoded = self.codec.decode_first_frame(raw)?;
        let mode = decoded.mode.name();
        let frame = normalize_to_rgb(&decoded)?;
        drop(decoded);

        let result = self.search(&frame, target_bytes);

        match &result {
            Ok(compressed) => log::info!(
                "✅ 图片压缩成功 - 模式: {} 原始: {}x{} {} bytes 输出: {}x{} {} bytes scale={} quality={} attempts={} elapsed={}ms",
                mode,
                frame.width,
                frame.height,
                raw.len(),
                compressed.width,
                compressed.height,
                compressed.encoded_size(),
                compressed.candidate.scale,
                compressed.candidate.quality,
                compressed.attempts,
                start.elapsed().as_millis()
            ),
            Err(err) => log::warn!(
                "⚠️ 图片压缩失败 - 模式: {} 原始: {}x{} {} bytes 目标: {} bytes 原因: {} elapsed={}ms",
                mode,
                frame.width,
                frame.height,
                raw.len(),
                target_bytes,
                err,
                start.elapsed().as_millis()
            ),
        }

        result
    }

    fn search(&self, frame: &RgbFrame, target_bytes: usize) -> Result<CompressedImage, ImageError> {
        let mut attempts = 0usize;
        let mut smallest: Option<usize> = None;

        for &scale in &self.config.scale_steps {
            let (width, height) = self.config.target_dimensions(frame.width, frame.height, scale);

            let resized;
            let candidate_frame = if scale < 1.0 {
                match self
                    .codec
                    .resize(frame, width, height, self.config.resize_filter)
                {
                    Ok(scaled) => {
                        resized = scaled;
                        &resized
                    }
                    Err(err) => {
                        attempts += self.config.quality_steps.len();
                        log::debug!("跳过缩放 {}（{}x{}）：{}", scale, width, height, err);
                        continue;
                    }
                }
            } else {
                frame
            };

            for &quality in &self.config.quality_steps {
                attempts += 1;
                let candidate = CompressionCandidate { scale, quality };

                let encoded = match self.codec.encode_jpeg(candidate_frame, quality) {
                    Ok(encoded) => encoded,
                    Err(err) => {
                        log::debug!("跳过组合 {:?}：{}", candidate, err);
                        continue;
                    }
                };

                log::debug!(
                    "尝试组合 scale={} quality={} -> {} bytes（目标 {}）",
                    scale,
                    quality,
                    encoded.len(),
                    target_bytes
                );

                if encoded.len() <= target_bytes {
                    return Ok(CompressedImage {
                        bytes: encoded,
                        width: candidate_frame.width,
                        height: candidate_frame.height,
                        candidate,
                        attempts,
                    });
                }

                smallest = Some(smallest.map_or(encoded.len(), |s| s.min(encoded.len())));
            }
        }

        Err(ImageError::BudgetUnsatisfiable {
            target_bytes,
            smallest,
        })
    }
}
