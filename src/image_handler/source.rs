//! # 数据源与中间模型
//!
//! ## 设计思路
//!
//! 将“外部输入”和“流水线中间结果”解耦：
//! - `RawImage` 表示调用方上传的原始字节与声明的 MIME
//! - `DecodedImage` 表示解码后的首帧位图，颜色模式在解码后一次性确定
//! - `RgbFrame` 表示归一化后的 RGB 位图，可直接交给 JPEG 编码
//! - `CompressedImage` 表示一次成功压缩的终态结果
//!
//! 所有值都只在单次请求内存活，不做缓存与共享。

use bytes::Bytes;

/// 调用方提供的原始图片。
#[derive(Debug, Clone)]
pub struct RawImage {
    /// 原始图片字节。
    pub bytes: Bytes,
    /// 上传时声明的 MIME 类型（可能缺失）。
    pub media_type: Option<String>,
    /// 上传文件名（仅用于日志）。
    pub file_name: Option<String>,
}

impl RawImage {
    pub fn new(bytes: impl Into<Bytes>, media_type: Option<String>) -> Self {
        Self {
            bytes: bytes.into(),
            media_type,
            file_name: None,
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }
}

/// 解码后的颜色模式，决定归一化路径。
#[derive(Debug, Clone)]
pub enum ColorMode {
    /// 不透明 RGB（`width * height * 3`）。
    Opaque { rgb: Vec<u8> },
    /// 带 alpha 通道的 RGBA（`width * height * 4`）。
    AlphaChannel { rgba: Vec<u8> },
    /// 调色板索引图；`palette` 每项为 RGBA，透明色的 alpha 为 0。
    Palette {
        indices: Vec<u8>,
        palette: Vec<[u8; 4]>,
    },
}

impl ColorMode {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Opaque { .. } => "opaque",
            Self::AlphaChannel { .. } => "alpha",
            Self::Palette { .. } => "palette",
        }
    }
}

/// 解码阶段输出：首帧位图。
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub mode: ColorMode,
}

/// 归一化后的 RGB8 位图。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbFrame {
    pub width: u32,
    pub height: u32,
    /// 紧密排列的 RGB 字节（`width * height * 3`）。
    pub pixels: Vec<u8>,
}

impl RgbFrame {
    /// 像素数 × 通道数，溢出时返回 `None`。
    pub(crate) fn expected_len(width: u32, height: u32, channels: usize) -> Option<usize> {
        (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(channels))
    }
}

/// 一次搜索尝试的 (缩放, 质量) 组合。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressionCandidate {
    pub scale: f64,
    pub quality: u8,
}

/// 压缩成功结果。
#[derive(Debug, Clone)]
pub struct CompressedImage {
    /// JPEG 字节，长度不超过目标预算。
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// 胜出的组合。
    pub candidate: CompressionCandidate,
    /// 实际编码尝试次数（含失败）。
    pub attempts: usize,
}

impl CompressedImage {
    pub fn encoded_size(&self) -> usize {
        self.bytes.len()
    }
}
