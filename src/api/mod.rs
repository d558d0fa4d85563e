//! API 模块
//!
//! 对外暴露的 HTTP 接口，只做上传解析与错误映射，评审逻辑全部委托编排层

pub mod review_api;

pub use review_api::{router, serve};
