//! 路由处理函数。

use axum::Json;
use axum::extract::{Multipart, State};
use axum::extract::multipart::MultipartError;
use serde_json::{Value, json};

use super::AppState;
use crate::error::AppError;
use crate::image_handler::RawImage;
use crate::rating::{RatingResponse, RatingSubmission};

/// 服务自描述。
pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "Service Rating API",
        "endpoint": "/rate-service",
        "method": "POST",
        "required_fields": {
            "summary": "string",
            "details": "string",
            "images": "1-5 image files",
        },
    }))
}

/// `POST /rate-service`：`summary` / `details` 文本字段 + 重复的 `images` 文件字段。
pub async fn rate_service(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<RatingResponse>, AppError> {
    let submission = read_submission(multipart).await?;
    log::info!(
        "📥 收到评分请求 - summary={} chars details={} chars images={}",
        submission.summary.chars().count(),
        submission.details.chars().count(),
        submission.images.len()
    );

    let rating = state.rating.rate(submission).await?;
    Ok(Json(rating))
}

async fn read_submission(mut multipart: Multipart) -> Result<RatingSubmission, AppError> {
    let mut summary = None;
    let mut details = None;
    let mut images = Vec::new();
    let mut saw_images_field = false;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match name.as_str() {
            "summary" => summary = Some(field.text().await.map_err(multipart_error)?),
            "details" => details = Some(field.text().await.map_err(multipart_error)?),
            "images" => {
                saw_images_field = true;
                let media_type = field.content_type().map(str::to_string);
                let file_name = field.file_name().map(str::to_string);
                let bytes = field.bytes().await.map_err(multipart_error)?;
                // 浏览器在未选择文件时会提交一个空的文件字段
                if bytes.is_empty() && file_name.as_deref().is_none_or(str::is_empty) {
                    continue;
                }
                let mut image = RawImage::new(bytes, media_type);
                if let Some(file_name) = file_name {
                    image = image.with_file_name(file_name);
                }
                images.push(image);
            }
            other => log::debug!("忽略未知表单字段：{}", other),
        }
    }

    if !saw_images_field {
        return Err(AppError::MissingField("images"));
    }

    Ok(RatingSubmission {
        summary: summary.ok_or(AppError::MissingField("summary"))?,
        details: details.ok_or(AppError::MissingField("details"))?,
        images,
    })
}

fn multipart_error(err: MultipartError) -> AppError {
    AppError::BadRequest(format!("Invalid multipart form: {}", err.body_text()))
}
