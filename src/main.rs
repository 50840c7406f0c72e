//! # 服务评分 API — 进程入口
//!
//! 本文件仅负责配置加载、依赖构造与服务启动。
//! 业务逻辑分布在各子模块中，详见 `lib.rs` 架构文档。

use std::sync::Arc;

use service_rating::config::AppConfig;
use service_rating::error::AppError;
use service_rating::image_handler::{self, CompressionConfig, ImageCompressor};
use service_rating::llm::AnthropicClient;
use service_rating::rating::{RatingService, RequestAssembler};
use service_rating::server::{self, AppState};

#[tokio::main]
async fn main() {
    if let Err(err) = dotenvy::dotenv() {
        if !err.not_found() {
            eprintln!(".env 加载失败: {err}");
        }
    }
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run().await {
        log::error!("启动失败: {err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    let config = AppConfig::from_env()?;
    log::info!(
        "setup: config loaded (bind={}, model={})",
        config.bind_addr,
        config.anthropic.model
    );

    let codec = image_handler::default_codec().map_err(|e| AppError::Config(e.to_string()))?;
    let compressor = ImageCompressor::new(codec, CompressionConfig::default())
        .map_err(|e| AppError::Config(e.to_string()))?;
    log::info!("setup: image compressor ready");

    let assembler = RequestAssembler::new(Arc::new(compressor), config.assembler.clone())?;
    let model = AnthropicClient::new(config.anthropic.clone())
        .map_err(|e| AppError::Config(e.to_string()))?;
    log::info!("setup: model client ready");

    let rating = RatingService::new(Arc::new(assembler), Arc::new(model));
    let app = server::app_router(AppState::new(Arc::new(rating)), config.max_request_bytes);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    log::info!("🚀 服务已启动: http://{}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("服务已停止");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log::warn!("监听退出信号失败: {err}");
    }
}
