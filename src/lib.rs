//! # 服务评分 API — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │        客户端（multipart: summary / details / images）    │
//! └───────┬──────────────────────────────────────────────────┘
//!         ↕ HTTP (JSON / {"detail": ...})
//! ┌───────┼──────────────────────────────────────────────────┐
//! │       ↕            后端 (Rust)                           │
//! │                                                          │
//! │  ┌─ server ─────── axum 路由 + 日志中间件 + CORS          │
//! │  │                                                       │
//! │  ├─ rating ─────── 评分链路编排                          │
//! │  │   ├─ assembler   MIME 校验 · base64 上限 · 内容组装   │
//! │  │   ├─ prompt      提示词与类别列表                     │
//! │  │   └─ service     调用模型 · 解析回复                  │
//! │  │                                                       │
//! │  ├─ image_handler  首帧解码 · 白底归一化 · 网格压缩      │
//! │  ├─ llm            VisionModel trait + Anthropic 客户端  │
//! │  ├─ config         环境变量配置                          │
//! │  └─ error ──────── AppError (统一错误类型)               │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError`，所有路由的错误返回类型 |
//! | [`config`] | 从环境变量加载 `AppConfig` |
//! | [`image_handler`] | 将图片压缩到 base64 载荷上限以内 |
//! | [`llm`] | 视觉模型调用抽象与 Anthropic Messages API 实现 |
//! | [`rating`] | 请求组装、模型调用与评分解析 |
//! | [`server`] | HTTP 路由与中间件 |

pub mod config;
pub mod error;
pub mod image_handler;
pub mod llm;
pub mod rating;
pub mod server;
