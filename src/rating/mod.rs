//! # 评分模块（rating）
//!
//! - `request`：提交与响应模型
//! - `prompt`：提示词与类别列表
//! - `assembler`：图片校验/压缩与内容组装
//! - `service`：评分链路编排与模型回复解析

mod assembler;
mod prompt;
mod request;
mod service;

pub use assembler::{
    AssemblerConfig, COMPRESSION_SLACK_BYTES, MAX_ENCODED_IMAGE_BYTES, PreparedImage,
    RequestAssembler,
};
pub use prompt::{SERVICE_CATEGORIES, is_known_category};
pub use request::{RatingResponse, RatingSubmission};
pub use service::{MAX_IMAGES, MIN_IMAGES, RatingService, parse_rating_reply, strip_code_fences};
