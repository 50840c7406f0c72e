//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 使用单一错误枚举承载压缩链路中的所有错误来源，避免字符串拼接式错误处理。
//! 通过 `thiserror` 保持人类可读错误，同时让调用侧可按分支匹配。
//!
//! 对调用方而言，`Decode / ColorConversion / BudgetUnsatisfiable` 三类失败
//! 最终会折叠为同一个“无法压缩”的结果；`Resize / Encode` 只在单个候选内部出现，
//! 由搜索循环就地跳过，不会向外传播。

/// 图片压缩统一错误类型。
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("解码错误：{0}")]
    Decode(String),

    #[error("颜色转换错误：{0}")]
    ColorConversion(String),

    #[error("无法压缩到 {target_bytes} 字节以内（最小尝试结果：{}）", fmt_smallest(.smallest))]
    BudgetUnsatisfiable {
        target_bytes: usize,
        smallest: Option<usize>,
    },

    #[error("缩放错误：{0}")]
    Resize(String),

    #[error("编码错误：{0}")]
    Encode(String),

    #[error("配置错误：{0}")]
    InvalidConfig(String),

    #[error("编解码器不可用：{0}")]
    CodecUnavailable(String),
}

fn fmt_smallest(smallest: &Option<usize>) -> String {
    match smallest {
        Some(bytes) => format!("{} 字节", bytes),
        None => "无".to_string(),
    }
}

impl ImageError {
    /// 稳定的错误码，用于日志与诊断。
    pub fn code(&self) -> &'static str {
        match self {
            Self::Decode(_) => "decode_failure",
            Self::ColorConversion(_) => "color_conversion_failure",
            Self::BudgetUnsatisfiable { .. } => "budget_unsatisfiable",
            Self::Resize(_) => "resize_failure",
            Self::Encode(_) => "encode_failure",
            Self::InvalidConfig(_) => "invalid_config",
            Self::CodecUnavailable(_) => "codec_unavailable",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_failure_reports_smallest_attempt() {
        let err = ImageError::BudgetUnsatisfiable {
            target_bytes: 1000,
            smallest: Some(1638),
        };
        assert_eq!(err.code(), "budget_unsatisfiable");
        assert_eq!(err.to_string(), "无法压缩到 1000 字节以内（最小尝试结果：1638 字节）");

        let none = ImageError::BudgetUnsatisfiable {
            target_bytes: 10,
            smallest: None,
        };
        assert!(none.to_string().ends_with("（最小尝试结果：无）"));
    }

    #[test]
    fn codes_are_stable_per_variant() {
        assert_eq!(ImageError::Decode("x".into()).code(), "decode_failure");
        assert_eq!(ImageError::CodecUnavailable("x".into()).code(), "codec_unavailable");
    }
}
