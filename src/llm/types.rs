//! Messages API 线上数据结构。
//!
//! 只建模本服务用到的子集：单条 user 消息、文本与 base64 图片内容块。

use serde::{Deserialize, Serialize};

/// 单个内容块。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },
    Image { source: ImageSource },
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn base64_image(media_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self::Image {
            source: ImageSource::Base64 {
                media_type: media_type.into(),
                data: data.into(),
            },
        }
    }
}

/// 图片来源，上游只接受 base64。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ImageSource {
    Base64 { media_type: String, data: String },
}

#[derive(Debug, Serialize)]
pub(crate) struct MessagesRequest<'a> {
    pub(crate) model: &'a str,
    pub(crate) max_tokens: u32,
    pub(crate) messages: Vec<RequestMessage<'a>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RequestMessage<'a> {
    pub(crate) role: &'static str,
    pub(crate) content: &'a [ContentBlock],
}

#[derive(Debug, Deserialize)]
pub(crate) struct MessagesResponse {
    #[serde(default)]
    pub(crate) content: Vec<ResponseBlock>,
    #[serde(default)]
    pub(crate) stop_reason: Option<String>,
    #[serde(default)]
    pub(crate) usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum ResponseBlock {
    Text { text: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Usage {
    #[serde(default)]
    pub(crate) input_tokens: u64,
    #[serde(default)]
    pub(crate) output_tokens: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorResponse {
    pub(crate) error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorDetail {
    #[serde(rename = "type", default)]
    pub(crate) error_type: String,
    pub(crate) message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn content_blocks_serialize_in_wire_shape() {
        let blocks = vec![
            ContentBlock::text("Image 1:"),
            ContentBlock::base64_image("image/png", "AAAA"),
        ];

        assert_eq!(
            serde_json::to_value(&blocks).expect("serialize"),
            json!([
                {"type": "text", "text": "Image 1:"},
                {"type": "image", "source": {"type": "base64", "media_type": "image/png", "data": "AAAA"}}
            ])
        );
    }

    #[test]
    fn response_ignores_non_text_blocks() {
        let body = json!({
            "id": "msg_1",
            "content": [
                {"type": "thinking", "thinking": "..."},
                {"type": "text", "text": "{}"}
            ],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 10, "output_tokens": 2}
        });

        let parsed: MessagesResponse = serde_json::from_value(body).expect("deserialize");
        assert_eq!(parsed.content.len(), 2);
        assert!(matches!(parsed.content[0], ResponseBlock::Other));
        assert!(matches!(&parsed.content[1], ResponseBlock::Text { text } if text == "{}"));
    }
}
