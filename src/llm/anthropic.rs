//! Anthropic Messages API 客户端。

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};

use super::types::{
    ApiErrorResponse, ContentBlock, MessagesRequest, MessagesResponse, RequestMessage,
    ResponseBlock,
};
use super::{LlmError, VisionModel};

pub const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
const DEFAULT_MODEL: &str = "claude-sonnet-4-5";
const DEFAULT_MAX_TOKENS: u32 = 2048;

/// 客户端配置。
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout_secs: 120,
        }
    }
}

/// 基于 reqwest 的 Messages API 客户端。
pub struct AnthropicClient {
    client: Client,
    config: AnthropicConfig,
}

impl AnthropicClient {
    /// 构建客户端；API Key 为空或非法时直接报错。
    pub fn new(config: AnthropicConfig) -> Result<Self, LlmError> {
        if config.api_key.trim().is_empty() {
            return Err(LlmError::Configuration("API Key 不能为空".to_string()));
        }

        let headers = Self::headers(&config.api_key)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| LlmError::Configuration(format!("无法创建 HTTP 客户端：{}", e)))?;

        Ok(Self { client, config })
    }

    fn headers(api_key: &str) -> Result<HeaderMap, LlmError> {
        let mut headers = HeaderMap::new();
        let mut key = HeaderValue::from_str(api_key)
            .map_err(|_| LlmError::Configuration("API Key 含有非法字符".to_string()))?;
        key.set_sensitive(true);
        headers.insert("x-api-key", key);
        headers.insert("anthropic-version", HeaderValue::from_static(ANTHROPIC_VERSION));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    fn messages_url(&self) -> String {
        format!("{}/messages", self.config.base_url.trim_end_matches('/'))
    }

    fn parse_error(status: reqwest::StatusCode, body: &str) -> LlmError {
        let message = match serde_json::from_str::<ApiErrorResponse>(body) {
            Ok(error_response) if error_response.error.error_type.is_empty() => {
                error_response.error.message
            }
            Ok(error_response) => format!(
                "{}: {}",
                error_response.error.error_type, error_response.error.message
            ),
            Err(_) => body.to_string(),
        };

        LlmError::Api {
            status: status.as_u16(),
            message,
        }
    }

    fn first_text(response: MessagesResponse) -> Result<String, LlmError> {
        response
            .content
            .into_iter()
            .find_map(|block| match block {
                ResponseBlock::Text { text } => Some(text),
                ResponseBlock::Other => None,
            })
            .ok_or(LlmError::EmptyResponse)
    }
}

#[async_trait]
impl VisionModel for AnthropicClient {
    fn name(&self) -> &str {
        &self.config.model
    }

    async fn complete(&self, content: &[ContentBlock]) -> Result<String, LlmError> {
        let request = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            messages: vec![RequestMessage {
                role: "user",
                content,
            }],
        };

        let start = Instant::now();
        let response = self
            .client
            .post(self.messages_url())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let err = Self::parse_error(status, &body);
            log::error!("❌ 模型接口调用失败 - model={} {}", self.config.model, err);
            return Err(err);
        }

        let parsed: MessagesResponse = serde_json::from_str(&body)
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        if let Some(usage) = &parsed.usage {
            log::info!(
                "✅ 模型调用完成 - model={} input_tokens={} output_tokens={} stop_reason={:?} elapsed={}ms",
                self.config.model,
                usage.input_tokens,
                usage.output_tokens,
                parsed.stop_reason,
                start.elapsed().as_millis()
            );
        }

        Self::first_text(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_api_key() {
        let result = AnthropicClient::new(AnthropicConfig::default());
        assert!(matches!(result, Err(LlmError::Configuration(_))));
    }

    #[test]
    fn parses_structured_error_body() {
        let body = r#"{"type":"error","error":{"type":"invalid_request_error","message":"image too large"}}"#;
        let err = AnthropicClient::parse_error(reqwest::StatusCode::BAD_REQUEST, body);

        match err {
            LlmError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "invalid_request_error: image too large");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn falls_back_to_raw_error_body() {
        let err = AnthropicClient::parse_error(reqwest::StatusCode::BAD_GATEWAY, "upstream down");
        assert!(matches!(
            err,
            LlmError::Api { status: 502, ref message } if message == "upstream down"
        ));
    }

    #[test]
    fn messages_url_tolerates_trailing_slash() {
        let client = AnthropicClient::new(AnthropicConfig {
            api_key: "test-key".to_string(),
            base_url: "http://localhost:9999/v1/".to_string(),
            ..AnthropicConfig::default()
        })
        .expect("client should build");

        assert_eq!(client.messages_url(), "http://localhost:9999/v1/messages");
    }
}
