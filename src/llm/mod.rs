//! # 视觉模型客户端模块（llm）
//!
//! ## 设计思路
//!
//! 上游模型调用抽象为 `VisionModel` trait，由进程启动时构造一次并通过
//! `AppState` 显式传递，不使用全局客户端。测试中可替换为假实现。
//!
//! - `anthropic`：Messages API 的 reqwest 实现
//! - `types`：线上请求/响应结构

mod anthropic;
mod types;

use async_trait::async_trait;

pub use anthropic::{ANTHROPIC_VERSION, AnthropicClient, AnthropicConfig};
pub use types::{ContentBlock, ImageSource};

/// 模型调用错误。
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("模型客户端配置错误：{0}")]
    Configuration(String),

    #[error("模型请求失败：{0}")]
    Http(#[from] reqwest::Error),

    #[error("模型接口返回错误（HTTP {status}）：{message}")]
    Api { status: u16, message: String },

    #[error("模型响应无法解析：{0}")]
    InvalidResponse(String),

    #[error("模型响应不包含文本内容")]
    EmptyResponse,
}

/// 视觉模型能力：给定一条多模态 user 消息，返回模型的文本回复。
#[async_trait]
pub trait VisionModel: Send + Sync {
    fn name(&self) -> &str;

    async fn complete(&self, content: &[ContentBlock]) -> Result<String, LlmError>;
}
