//! # 编解码能力接口
//!
//! ## 设计思路
//!
//! 压缩器只依赖 `ImageCodec` 这一能力接口，不直接绑定具体图像库。
//! 编解码器缺失时，在构造阶段通过 `default_codec()` 返回 `CodecUnavailable`，
//! 由进程启动流程处理，而不是在每次调用中静默返回空结果。

use std::sync::Arc;

use super::ImageError;
use super::config::ResampleFilter;
use super::source::{DecodedImage, RgbFrame};

/// 图片编解码能力。
///
/// 实现必须是无状态或内部只读的：同一实例会在多个请求间共享。
pub trait ImageCodec: Send + Sync {
    /// 编解码器名称（日志用）。
    fn name(&self) -> &'static str;

    /// 解码首帧，并确定颜色模式。
    fn decode_first_frame(&self, bytes: &[u8]) -> Result<DecodedImage, ImageError>;

    /// 将 RGB 位图缩放到指定尺寸。
    fn resize(
        &self,
        frame: &RgbFrame,
        width: u32,
        height: u32,
        filter: ResampleFilter,
    ) -> Result<RgbFrame, ImageError>;

    /// 以指定质量编码为 JPEG。
    fn encode_jpeg(&self, frame: &RgbFrame, quality: u8) -> Result<Vec<u8>, ImageError>;
}

/// 返回内置编解码器。
///
/// 未启用 `raster` 特性时返回 `CodecUnavailable`。
pub fn default_codec() -> Result<Arc<dyn ImageCodec>, ImageError> {
    #[cfg(feature = "raster")]
    {
        Ok(Arc::new(super::raster::RasterCodec::new()))
    }

    #[cfg(not(feature = "raster"))]
    {
        Err(ImageError::CodecUnavailable(
            "未启用 raster 特性，无可用的图片编解码器".to_string(),
        ))
    }
}
