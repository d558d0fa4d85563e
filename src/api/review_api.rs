//! 评审 HTTP 接口
//!
//! `POST /review`：multipart 上传，字段 `file`（一个文件）+ `review_points`（可重复）。
//! 文件扩展名在写入磁盘前校验，不支持的格式直接返回 400，不会调用后端。

use std::path::Path;
use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::DocumentFormat;
use crate::orchestrator::ReviewOrchestrator;

/// 错误响应体
#[derive(Debug, Serialize)]
struct ErrorResponse {
    detail: String,
}

fn error_response(status: StatusCode, detail: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            detail: detail.into(),
        }),
    )
        .into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else if matches!(self, AppError::Backend { .. }) {
            StatusCode::BAD_GATEWAY
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        error_response(status, self.to_string())
    }
}

/// 构建路由
pub fn router(orchestrator: Arc<ReviewOrchestrator>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/review", post(handle_review))
        .route("/health", get(|| async { "ok" }))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(orchestrator)
}

/// 启动 HTTP 服务，收到 Ctrl+C 后优雅退出
pub async fn serve(config: &Config) -> AppResult<()> {
    let orchestrator = Arc::new(ReviewOrchestrator::from_config(config)?);
    let app = router(orchestrator, config.max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(&config.server_bind_addr)
        .await
        .map_err(|e| AppError::Server(format!("无法监听 {}: {}", config.server_bind_addr, e)))?;
    info!("🌐 评审服务已启动: http://{}", config.server_bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Server(e.to_string()))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("监听退出信号失败: {}", e);
        return;
    }
    info!("收到退出信号，服务即将关闭");
}

async fn handle_review(
    State(orchestrator): State<Arc<ReviewOrchestrator>>,
    mut multipart: Multipart,
) -> Response {
    let mut upload: Option<(DocumentFormat, Vec<u8>)> = None;
    let mut review_points = Vec::new();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                warn!("解析上传表单失败: {}", e);
                return error_response(StatusCode::BAD_REQUEST, format!("表单解析失败: {}", e));
            }
        };

        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or("").to_string();
                let format = match DocumentFormat::from_path(Path::new(&filename)) {
                    Ok(format) => format,
                    Err(e) => {
                        warn!("拒绝上传文件: {}", e);
                        return AppError::from(e).into_response();
                    }
                };
                match field.bytes().await {
                    Ok(bytes) => upload = Some((format, bytes.to_vec())),
                    Err(e) => {
                        warn!("读取上传文件失败: {}", e);
                        return error_response(StatusCode::BAD_REQUEST, "读取上传文件失败");
                    }
                }
            }
            "review_points" => match field.text().await {
                Ok(point) => review_points.push(point),
                Err(e) => {
                    return error_response(
                        StatusCode::BAD_REQUEST,
                        format!("读取评审要点失败: {}", e),
                    );
                }
            },
            _ => {}
        }
    }

    let Some((format, bytes)) = upload else {
        return error_response(StatusCode::BAD_REQUEST, "缺少上传文件字段 file");
    };

    // 临时文件在本函数结束时删除
    let staged = match tempfile::Builder::new()
        .prefix("aidoc-review-")
        .suffix(format.suffix())
        .tempfile()
    {
        Ok(file) => file,
        Err(e) => {
            error!("创建临时文件失败: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "保存上传文件失败");
        }
    };
    if let Err(e) = tokio::fs::write(staged.path(), &bytes).await {
        error!("写入临时文件失败: {}", e);
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, "保存上传文件失败");
    }

    info!(
        "📥 收到评审请求: {} 文件 {} 字节, {} 个评审要点",
        format,
        bytes.len(),
        review_points.len()
    );

    match orchestrator.review(staged.path(), &review_points).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => e.into_response(),
    }
}
