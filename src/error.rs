//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 定义全局统一的 `AppError` 枚举，HTTP 层所有处理函数统一返回
//! `Result<T, AppError>`，客户端收到一致的 `{"detail": "..."}` 结构。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息，消息即对外 `detail` 文本。
//! - 为 `LlmError` / `std::io::Error` 提供 `From` 转换，无需手动 map。
//! - 实现 `Serialize` 将错误序列化为字符串，`IntoResponse` 负责状态码映射。

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::json;

use crate::llm::LlmError;

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 请求内容不合法（图片数量、类型、无法压缩等）
    #[error("{0}")]
    BadRequest(String),

    /// 缺少必填表单字段
    #[error("Field required: {0}")]
    MissingField(&'static str),

    /// 模型回复不是合法 JSON
    #[error("Failed to parse model response: {0}")]
    ResponseParse(String),

    /// 处理过程中的其他错误（模型调用、结构校验、后台任务）
    #[error("Error processing request: {0}")]
    Processing(String),

    /// 上游模型调用失败
    #[error("Error processing request: {0}")]
    Llm(#[from] LlmError),

    /// 启动配置错误
    #[error("配置错误: {0}")]
    Config(String),

    /// 文件系统 / 网络 I/O 错误
    #[error("I/O 错误: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::MissingField(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::ResponseParse(_)
            | Self::Processing(_)
            | Self::Llm(_)
            | Self::Config(_)
            | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// 将错误序列化为人类可读的字符串。
impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("❌ 请求处理失败: {}", self);
        } else {
            log::warn!("🚫 请求被拒绝（{}）: {}", status.as_u16(), self);
        }
        (status, Json(json!({ "detail": self }))).into_response()
    }
}
