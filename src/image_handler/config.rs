//! # 配置模块
//!
//! ## 设计思路
//!
//! 将压缩搜索的“可调策略”集中到 `CompressionConfig`，保证运行时行为可观测、可测试。
//! 默认值即线上使用的固定网格：缩放 `[1.0, 0.85, 0.70, 0.55]` × 质量 `[85, 70, 55, 40]`，
//! 外层缩放、内层质量，首个满足预算的组合胜出。
//!
//! ## 实现思路
//!
//! - `Default` 提供与线上一致的固定网格。
//! - `validate` 在构造压缩器时执行一次，非法配置直接拒绝，不在单次调用中兜底。
//! - `ResampleFilter` 与具体编解码器的滤镜类型解耦，由编解码器自行映射。

use super::ImageError;

/// 压缩后单边最小像素，缩放再小也不会低于该值。
pub const MIN_DIMENSION: u32 = 64;

/// 降采样滤镜策略。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResampleFilter {
    /// 高质量（面积/Lanczos 等效），默认值。
    Lanczos3,
    CatmullRom,
    Bilinear,
}

/// 压缩搜索配置。
#[derive(Debug, Clone)]
pub struct CompressionConfig {
    /// 缩放系数，必须严格递减且位于 (0, 1]。
    pub scale_steps: Vec<f64>,
    /// JPEG 质量档位，必须严格递减且位于 1..=100。
    pub quality_steps: Vec<u8>,
    /// 缩放后宽/高的下限（像素）。
    pub min_dimension: u32,
    /// 降采样滤镜。
    pub resize_filter: ResampleFilter,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            scale_steps: vec![1.0, 0.85, 0.70, 0.55],
            quality_steps: vec![85, 70, 55, 40],
            min_dimension: MIN_DIMENSION,
            resize_filter: ResampleFilter::Lanczos3,
        }
    }
}

impl CompressionConfig {
    /// 校验网格合法性。
    pub(crate) fn validate(&self) -> Result<(), ImageError> {
        if self.scale_steps.is_empty() {
            return Err(ImageError::InvalidConfig("scale_steps 不能为空".to_string()));
        }
        if self.quality_steps.is_empty() {
            return Err(ImageError::InvalidConfig("quality_steps 不能为空".to_string()));
        }
        if let Some(scale) = self
            .scale_steps
            .iter()
            .find(|scale| !(**scale > 0.0 && **scale <= 1.0))
        {
            return Err(ImageError::InvalidConfig(format!(
                "缩放系数 {} 超出范围 (0, 1]",
                scale
            )));
        }
        if let Some(quality) = self
            .quality_steps
            .iter()
            .find(|quality| !(1..=100).contains(*quality))
        {
            return Err(ImageError::InvalidConfig(format!(
                "质量档位 {} 超出范围 1~100",
                quality
            )));
        }
        if !self.scale_steps.windows(2).all(|pair| pair[0] > pair[1]) {
            return Err(ImageError::InvalidConfig("scale_steps 必须严格递减".to_string()));
        }
        if !self.quality_steps.windows(2).all(|pair| pair[0] > pair[1]) {
            return Err(ImageError::InvalidConfig("quality_steps 必须严格递减".to_string()));
        }
        if self.min_dimension == 0 {
            return Err(ImageError::InvalidConfig("min_dimension 不能为 0".to_string()));
        }
        Ok(())
    }

    /// 搜索上限：最多尝试的编码次数。
    pub fn max_attempts(&self) -> usize {
        self.scale_steps.len() * self.quality_steps.len()
    }

    /// 计算某一缩放系数下的目标尺寸。
    ///
    /// `scale >= 1.0` 时保持原尺寸；否则向下取整并钳制到 `min_dimension`。
    pub fn target_dimensions(&self, width: u32, height: u32, scale: f64) -> (u32, u32) {
        if scale >= 1.0 {
            return (width, height);
        }
        let scaled = |side: u32| ((side as f64 * scale).floor() as u32).max(self.min_dimension);
        (scaled(width), scaled(height))
    }
}
