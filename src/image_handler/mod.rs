//! # 图片尺寸适配模块（image_handler）
//!
//! ## 设计思路
//!
//! 上游模型 API 对单张图片的 base64 载荷有硬上限。该模块把任意受支持的图片
//! 压缩为不超过目标字节数的 JPEG，或明确报告失败。按职责拆分为多个子模块：
//!
//! - `compressor`：编排“解码 → 归一化 → 网格搜索”
//! - `codec`：编解码能力接口 `ImageCodec` 与 `default_codec()`
//! - `raster`：基于 `image` / `fast_image_resize` / `gif` 的默认实现
//! - `pipeline`：颜色归一化（白底合成 + 回退转换）
//! - `config/error/source`：配置、错误、中间数据模型
//!
//! ## 新同事快速上手
//!
//! ```text
//! RequestAssembler（rating::assembler）
//!    ↓ 原始字节 + 目标字节数
//! compressor.rs（ImageCompressor::compress）
//!    ├─ codec.decode_first_frame（只取首帧，确定 ColorMode）
//!    ├─ pipeline.rs（Opaque / AlphaChannel / Palette → RGB）
//!    └─ 网格搜索：scale × quality，codec.resize + codec.encode_jpeg
//!    ↓
//! CompressedImage（≤ 目标字节）或 ImageError
//! ```

mod codec;
mod compressor;
mod config;
mod error;
mod pipeline;
#[cfg(feature = "raster")]
mod raster;
mod source;

pub use codec::{ImageCodec, default_codec};
pub use compressor::ImageCompressor;
pub use config::{CompressionConfig, MIN_DIMENSION, ResampleFilter};
pub use error::ImageError;
#[cfg(feature = "raster")]
pub use raster::RasterCodec;
pub use source::{
    ColorMode, CompressedImage, CompressionCandidate, DecodedImage, RawImage, RgbFrame,
};
