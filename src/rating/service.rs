//! # 评分服务
//!
//! ## 设计思路
//!
//! `RatingService` 编排整条评分链路，不直接与 HTTP 绑定：
//! 1. 校验图片数量（1~5）
//! 2. 在阻塞线程中组装内容（含可能的图片压缩）
//! 3. 调用视觉模型
//! 4. 去除代码围栏并解析为 `RatingResponse`
//!
//! 记录 `assemble/model/parse/total` 阶段耗时，便于性能诊断。

use std::sync::Arc;
use std::time::Instant;

use super::assembler::RequestAssembler;
use super::prompt;
use super::request::{RatingResponse, RatingSubmission};
use crate::error::AppError;
use crate::llm::VisionModel;

pub const MIN_IMAGES: usize = 1;
pub const MAX_IMAGES: usize = 5;

/// 评分服务，构造后只读，可在请求间共享。
pub struct RatingService {
    assembler: Arc<RequestAssembler>,
    model: Arc<dyn VisionModel>,
}

impl RatingService {
    pub fn new(assembler: Arc<RequestAssembler>, model: Arc<dyn VisionModel>) -> Self {
        Self { assembler, model }
    }

    /// 处理主入口：组装、调用模型并解析评分。
    pub async fn rate(&self, submission: RatingSubmission) -> Result<RatingResponse, AppError> {
        Self::validate_image_count(submission.images.len())?;
        let total_start = Instant::now();

        let assemble_start = Instant::now();
        let assembler = Arc::clone(&self.assembler);
        let content = tokio::task::spawn_blocking(move || assembler.assemble(&submission))
            .await
            .map_err(|e| AppError::Processing(format!("image preparation task failed: {}", e)))??;
        let assemble_elapsed = assemble_start.elapsed();

        let model_start = Instant::now();
        let reply = self.model.complete(&content).await?;
        let model_elapsed = model_start.elapsed();

        let parse_start = Instant::now();
        let rating = parse_rating_reply(&reply)?;
        let parse_elapsed = parse_start.elapsed();

        if !prompt::is_known_category(&rating.category) {
            log::warn!("⚠️ 模型返回了类别列表之外的类别：{}", rating.category);
        }

        log::info!(
            "✅ 评分完成 - model={} category={} rating={} confidence={} assemble={}ms model={}ms parse={}ms total={}ms",
            self.model.name(),
            rating.category,
            rating.rating,
            rating.confidence,
            assemble_elapsed.as_millis(),
            model_elapsed.as_millis(),
            parse_elapsed.as_millis(),
            total_start.elapsed().as_millis()
        );

        Ok(rating)
    }

    pub fn validate_image_count(count: usize) -> Result<(), AppError> {
        if !(MIN_IMAGES..=MAX_IMAGES).contains(&count) {
            return Err(AppError::BadRequest(format!(
                "Please upload between {} and {} images",
                MIN_IMAGES, MAX_IMAGES
            )));
        }
        Ok(())
    }
}

/// 去除模型回复外层的 Markdown 代码围栏。
pub fn strip_code_fences(reply: &str) -> &str {
    let mut text = reply.trim();
    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    }
    if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

/// 解析模型回复：语法错误与结构错误分别映射为不同的错误。
pub fn parse_rating_reply(reply: &str) -> Result<RatingResponse, AppError> {
    let value: serde_json::Value = serde_json::from_str(strip_code_fences(reply))
        .map_err(|e| AppError::ResponseParse(e.to_string()))?;

    serde_json::from_value(value).map_err(|e| AppError::Processing(e.to_string()))
}
