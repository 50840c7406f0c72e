//! 进程配置模块
//!
//! # 设计思路
//!
//! 所有运行参数从环境变量读取（启动时先加载 `.env`），集中到 `AppConfig`。
//! 缺失或非法的值在启动阶段报错，不在请求处理中途暴露。
//!
//! | 变量 | 默认值 |
//! |------|--------|
//! | `ANTHROPIC_API_KEY` | 必填 |
//! | `ANTHROPIC_BASE_URL` | `https://api.anthropic.com/v1` |
//! | `ANTHROPIC_MODEL` | `claude-sonnet-4-5` |
//! | `ANTHROPIC_MAX_TOKENS` | `2048` |
//! | `ANTHROPIC_TIMEOUT_SECS` | `120` |
//! | `BIND_ADDR` | `0.0.0.0:8000` |
//! | `MAX_REQUEST_BYTES` | `104857600`（100 MiB） |
//! | `ALLOW_EXTENDED_IMAGE_FORMATS` | `true` |

use std::net::SocketAddr;
use std::str::FromStr;

use crate::error::AppError;
use crate::llm::AnthropicConfig;
use crate::rating::AssemblerConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_MAX_REQUEST_BYTES: usize = 100 * 1024 * 1024;

/// 进程级配置。
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    /// 单个请求体上限（字节），需容纳 5 张超限原图。
    pub max_request_bytes: usize,
    pub anthropic: AnthropicConfig,
    pub assembler: AssemblerConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            max_request_bytes: DEFAULT_MAX_REQUEST_BYTES,
            anthropic: AnthropicConfig::default(),
            assembler: AssemblerConfig::default(),
        }
    }
}

impl AppConfig {
    /// 从进程环境读取配置。
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源读取配置，便于测试注入。
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_key = get("ANTHROPIC_API_KEY")
            .ok_or_else(|| AppError::Config("缺少环境变量 ANTHROPIC_API_KEY".to_string()))?;

        let anthropic = AnthropicConfig {
            api_key,
            base_url: get("ANTHROPIC_BASE_URL").unwrap_or(defaults.anthropic.base_url),
            model: get("ANTHROPIC_MODEL").unwrap_or(defaults.anthropic.model),
            max_tokens: parse_or(&get, "ANTHROPIC_MAX_TOKENS", defaults.anthropic.max_tokens)?,
            timeout_secs: parse_or(
                &get,
                "ANTHROPIC_TIMEOUT_SECS",
                defaults.anthropic.timeout_secs,
            )?,
        };

        let assembler = AssemblerConfig {
            allow_extended_formats: parse_bool_or(
                &get,
                "ALLOW_EXTENDED_IMAGE_FORMATS",
                defaults.assembler.allow_extended_formats,
            )?,
            ..defaults.assembler
        };

        let bind_addr = match get("BIND_ADDR") {
            Some(raw) => parse_value("BIND_ADDR", &raw)?,
            None => parse_value("BIND_ADDR", DEFAULT_BIND_ADDR)?,
        };

        Ok(Self {
            bind_addr,
            max_request_bytes: parse_or(&get, "MAX_REQUEST_BYTES", defaults.max_request_bytes)?,
            anthropic,
            assembler,
        })
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>()
        .map_err(|e| AppError::Config(format!("环境变量 {} 的值 '{}' 无效: {}", key, raw, e)))
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => parse_value(key, &raw),
        None => Ok(default),
    }
}

fn parse_bool_or<G>(get: &G, key: &str, default: bool) -> Result<bool, AppError>
where
    G: Fn(&str) -> Option<String>,
{
    match get(key).map(|v| v.to_ascii_lowercase()) {
        None => Ok(default),
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => Ok(true),
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => Ok(false),
        Some(v) => Err(AppError::Config(format!(
            "环境变量 {} 的值 '{}' 不是布尔值",
            key, v
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_key_is_set() {
        let config = AppConfig::from_lookup(lookup(&[("ANTHROPIC_API_KEY", "sk-test")]))
            .expect("config should load");

        assert_eq!(config.anthropic.api_key, "sk-test");
        assert_eq!(config.anthropic.model, "claude-sonnet-4-5");
        assert_eq!(config.anthropic.max_tokens, 2048);
        assert_eq!(config.bind_addr, "0.0.0.0:8000".parse::<SocketAddr>().expect("addr"));
        assert_eq!(config.assembler.max_encoded_bytes, 5 * 1024 * 1024);
        assert!(config.assembler.allow_extended_formats);
    }

    #[test]
    fn missing_api_key_is_a_config_error() {
        let result = AppConfig::from_lookup(lookup(&[("ANTHROPIC_API_KEY", "   ")]));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn overrides_are_parsed() {
        let config = AppConfig::from_lookup(lookup(&[
            ("ANTHROPIC_API_KEY", "sk-test"),
            ("ANTHROPIC_MODEL", "claude-haiku-4-5"),
            ("ANTHROPIC_MAX_TOKENS", "512"),
            ("BIND_ADDR", "127.0.0.1:9000"),
            ("ALLOW_EXTENDED_IMAGE_FORMATS", "off"),
        ]))
        .expect("config should load");

        assert_eq!(config.anthropic.model, "claude-haiku-4-5");
        assert_eq!(config.anthropic.max_tokens, 512);
        assert_eq!(config.bind_addr.port(), 9000);
        assert!(!config.assembler.allow_extended_formats);
    }

    #[test]
    fn invalid_numbers_name_the_variable() {
        let err = AppConfig::from_lookup(lookup(&[
            ("ANTHROPIC_API_KEY", "sk-test"),
            ("ANTHROPIC_MAX_TOKENS", "lots"),
        ]))
        .expect_err("should fail");

        assert!(err.to_string().contains("ANTHROPIC_MAX_TOKENS"));
    }
}
