//! 评分请求与响应模型。

use serde::{Deserialize, Serialize};

use crate::image_handler::RawImage;

/// 单次评分提交：文本 + 1~5 张图片。
#[derive(Debug, Clone)]
pub struct RatingSubmission {
    pub summary: String,
    pub details: String,
    pub images: Vec<RawImage>,
}

/// 评分结果，也是 `POST /rate-service` 的响应体。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingResponse {
    pub category: String,
    pub rating: f64,
    pub confidence: String,
    pub enhanced_summary: String,
    pub enhanced_description: String,
}
