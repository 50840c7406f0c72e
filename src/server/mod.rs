//! # HTTP 服务层
//!
//! ## 设计思路
//!
//! 路由层只做参数接收与结果返回，不承载业务逻辑；
//! 实际处理交由 `AppState` 中注入的 `RatingService`。
//!
//! - `GET /`：服务自描述
//! - `POST /rate-service`：multipart 表单评分
//!
//! 中间件：请求日志、请求体上限、宽松 CORS。

mod handlers;

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::extract::{DefaultBodyLimit, Request};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;

use crate::rating::RatingService;

pub use handlers::{rate_service, root};

/// 路由共享状态。
#[derive(Clone)]
pub struct AppState {
    pub rating: Arc<RatingService>,
}

impl AppState {
    pub fn new(rating: Arc<RatingService>) -> Self {
        Self { rating }
    }
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    log::info!(
        "{} {} -> {} ({}ms)",
        method,
        path,
        response.status().as_u16(),
        start.elapsed().as_millis()
    );
    response
}

/// 构建应用路由。
pub fn app_router(state: AppState, max_request_bytes: usize) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/rate-service", post(rate_service))
        .layer(DefaultBodyLimit::max(max_request_bytes))
        .layer(middleware::from_fn(log_request))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
