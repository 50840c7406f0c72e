//! # 请求组装模块
//!
//! ## 设计思路
//!
//! 负责把一次评分提交转换为上游多模态内容列表：
//! 1. 校验每张图片声明的 MIME（缺失时按魔数推断）
//! 2. 计算 base64 编码长度，超过上限时调用 `ImageCompressor`
//! 3. 压缩成功则替换为 JPEG，失败则按图片序号拒绝整个请求
//! 4. 按“介绍文本 → (标签, 图片)… → 指令文本”的顺序组装
//!
//! ## 实现思路
//!
//! - 同步执行，顺序处理，序号只用于错误信息。
//! - 压缩器的失败原因只写日志，对外统一为一条“无法压缩”的提示。

use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose};

use super::prompt;
use super::request::RatingSubmission;
use crate::error::AppError;
use crate::image_handler::{ImageCompressor, RawImage};
use crate::llm::ContentBlock;

/// 上游可接受的 base64 图片载荷上限（字节）。
pub const MAX_ENCODED_IMAGE_BYTES: usize = 5 * 1024 * 1024;
/// 调用压缩器时预留的编码余量（字节）。
pub const COMPRESSION_SLACK_BYTES: usize = 1024;

const BASE_MEDIA_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/gif", "image/webp"];
const EXTENDED_MEDIA_TYPES: [&str; 3] = ["image/heif", "image/heic", "image/avif"];
const COMPRESSED_MEDIA_TYPE: &str = "image/jpeg";

/// 组装配置。
#[derive(Debug, Clone)]
pub struct AssemblerConfig {
    /// base64 载荷上限。
    pub max_encoded_bytes: usize,
    /// 压缩目标 = 上限 - 余量。
    pub slack_bytes: usize,
    /// 是否额外接受 HEIF / HEIC / AVIF。
    pub allow_extended_formats: bool,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            max_encoded_bytes: MAX_ENCODED_IMAGE_BYTES,
            slack_bytes: COMPRESSION_SLACK_BYTES,
            allow_extended_formats: true,
        }
    }
}

impl AssemblerConfig {
    pub fn compression_target(&self) -> usize {
        self.max_encoded_bytes.saturating_sub(self.slack_bytes)
    }

    fn is_allowed(&self, media_type: &str) -> bool {
        BASE_MEDIA_TYPES.contains(&media_type)
            || (self.allow_extended_formats && EXTENDED_MEDIA_TYPES.contains(&media_type))
    }
}

/// 处理后的单张图片。
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedImage {
    pub media_type: String,
    /// base64 数据（不含 data URL 前缀）。
    pub data: String,
    pub compressed: bool,
}

/// 请求组装器。
pub struct RequestAssembler {
    compressor: Arc<ImageCompressor>,
    config: AssemblerConfig,
}

impl RequestAssembler {
    pub fn new(
        compressor: Arc<ImageCompressor>,
        config: AssemblerConfig,
    ) -> Result<Self, AppError> {
        if config.compression_target() == 0 {
            return Err(AppError::Config(
                "max_encoded_bytes 必须大于 slack_bytes".to_string(),
            ));
        }
        Ok(Self { compressor, config })
    }

    /// 组装完整的多模态内容列表。
    pub fn assemble(&self, submission: &RatingSubmission) -> Result<Vec<ContentBlock>, AppError> {
        let mut content = Vec::with_capacity(submission.images.len() * 2 + 2);
        content.push(ContentBlock::text(prompt::intro_text(
            &submission.summary,
            &submission.details,
        )));

        for (position, image) in submission.images.iter().enumerate() {
            let index = position + 1;
            let prepared = self.prepare_image(index, image)?;
            content.push(ContentBlock::text(prompt::image_label(index)));
            content.push(ContentBlock::base64_image(prepared.media_type, prepared.data));
        }

        content.push(ContentBlock::text(prompt::instructions_text()));
        Ok(content)
    }

    /// 校验并（必要时）压缩单张图片，`index` 从 1 开始。
    pub fn prepare_image(&self, index: usize, image: &RawImage) -> Result<PreparedImage, AppError> {
        let media_type = Self::resolve_media_type(image)
            .filter(|media_type| self.config.is_allowed(media_type))
            .ok_or_else(|| AppError::BadRequest(invalid_type_message(index)))?;

        let encoded_len = base64::encoded_len(image.bytes.len(), true).unwrap_or(usize::MAX);
        if encoded_len <= self.config.max_encoded_bytes {
            return Ok(PreparedImage {
                media_type,
                data: general_purpose::STANDARD.encode(&image.bytes),
                compressed: false,
            });
        }

        log::info!(
            "🗜️ 图片 {} 超出载荷上限，开始压缩 - 文件: {} 类型: {} 原始: {} bytes base64: {} bytes 上限: {} bytes",
            index,
            image.file_name.as_deref().unwrap_or("-"),
            media_type,
            image.bytes.len(),
            encoded_len,
            self.config.max_encoded_bytes
        );

        let compressed = self
            .compressor
            .compress(&image.bytes, self.config.compression_target())
            .map_err(|err| {
                log::warn!("⚠️ 图片 {} 压缩失败（{}）：{}", index, err.code(), err);
                AppError::BadRequest(format!(
                    "Image {} exceeds {} limit and could not be compressed. Please upload a smaller image.",
                    index,
                    format_limit(self.config.max_encoded_bytes)
                ))
            })?;

        Ok(PreparedImage {
            media_type: COMPRESSED_MEDIA_TYPE.to_string(),
            data: general_purpose::STANDARD.encode(&compressed.bytes),
            compressed: true,
        })
    }

    /// 规范化声明类型；未声明时按魔数推断。
    fn resolve_media_type(image: &RawImage) -> Option<String> {
        let declared = image
            .media_type
            .as_deref()
            .map(|value| {
                value
                    .split(';')
                    .next()
                    .unwrap_or_default()
                    .trim()
                    .to_ascii_lowercase()
            })
            .filter(|value| !value.is_empty());

        declared.or_else(|| infer::get(&image.bytes).map(|kind| kind.mime_type().to_string()))
    }

}

/// 对外提示固定列出基础格式，扩展格式属于可选能力，不写进提示。
fn invalid_type_message(index: usize) -> String {
    format!("Image {} has invalid type. Allowed: JPEG, PNG, GIF, WebP", index)
}

/// 以 MB/KB 表示上限，用于对外提示。
fn format_limit(bytes: usize) -> String {
    const MIB: usize = 1024 * 1024;
    if bytes >= MIB && bytes % MIB == 0 {
        format!("{} MB", bytes / MIB)
    } else if bytes >= 1024 {
        format!("{} KB", bytes / 1024)
    } else {
        format!("{} bytes", bytes)
    }
}
