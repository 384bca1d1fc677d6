//! HTTP 任务提交接口
//!
//! POST /execute 受理任务后即刻返回，控制循环在独立的 tokio 任务上运行（fire-and-forget）；
//! GET /logs 与 /logs/:filename 暴露审计日志；/health 独立探测 LLM 与知识库的可达性。
//! 同时运行的任务数量不设上限，任务提交后也无法取消；步数预算是唯一的终止保证。

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::agent::{run_task, AgentComponents};
use crate::audit::AuditSink;
use crate::config::AppConfig;

/// GET /logs 返回的条数上限
const MAX_LOG_LISTING: usize = 10;
/// 健康检查探测超时（秒）
const PROBE_TIMEOUT_SECS: u64 = 2;

pub struct AppState {
    pub components: Arc<AgentComponents>,
    pub audit: AuditSink,
    pub default_max_steps: usize,
    llm_health_url: String,
    rag_base_url: String,
    probe: reqwest::Client,
}

impl AppState {
    pub fn new(cfg: &AppConfig, components: AgentComponents, audit: AuditSink) -> Self {
        let probe = reqwest::Client::builder()
            .timeout(Duration::from_secs(PROBE_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();
        Self {
            components: Arc::new(components),
            audit,
            default_max_steps: cfg.agent.max_steps,
            llm_health_url: cfg.llm.health_url.clone(),
            rag_base_url: cfg.rag.base_url.clone(),
            probe,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TaskRequest {
    pub task: String,
    #[serde(default)]
    pub max_steps: Option<usize>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/execute", post(execute_task))
        .route("/logs", get(list_logs))
        .route("/logs/:filename", get(get_log))
        .with_state(state)
}

pub async fn serve(state: Arc<AppState>, host: &str, port: u16) -> anyhow::Result<()> {
    let addr: std::net::SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("ops agent API: http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state)).await?;
    Ok(())
}

/// GET /：服务横幅与端点一览
async fn root() -> Json<Value> {
    Json(json!({
        "service": "Ops Agent API",
        "status": "running",
        "endpoints": {
            "POST /execute": "Execute a task",
            "GET /logs": "List recent logs",
            "GET /health": "Health check"
        }
    }))
}

/// GET /health：agent 自身、LLM、知识库三项独立探测
async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    let llm_ok = probe(&state.probe, &state.llm_health_url).await;
    let rag_ok = probe(&state.probe, &state.rag_base_url).await;
    Json(json!({
        "agent": "ok",
        "llm": if llm_ok { "ok" } else { "error" },
        "rag": if rag_ok { "ok" } else { "error" },
    }))
}

async fn probe(client: &reqwest::Client, url: &str) -> bool {
    client.get(url).send().await.is_ok()
}

/// POST /execute：受理即返回；循环在后台任务上运行
async fn execute_task(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TaskRequest>,
) -> Json<Value> {
    tracing::info!(task = %req.task, "received task via API");
    let max_steps = req.max_steps.unwrap_or(state.default_max_steps).max(1);

    let task = req.task.clone();
    let state_bg = Arc::clone(&state);
    // fire-and-forget：并发任务数不设上限，提交后不可取消
    tokio::spawn(async move {
        match state_bg.audit.open_task_log() {
            Ok(log) => {
                let report = run_task(&state_bg.components, &task, max_steps, log).await;
                tracing::info!(
                    status = ?report.status,
                    steps = report.steps,
                    log = %report.log_file.display(),
                    "task finished"
                );
            }
            Err(e) => tracing::error!("agent failed: {}", e),
        }
    });

    Json(json!({
        "status": "accepted",
        "message": "Task execution started",
        "task": req.task,
    }))
}

/// GET /logs：最近 10 个任务日志，新者在前
async fn list_logs(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({"logs": state.audit.list_recent(MAX_LOG_LISTING)}))
}

/// GET /logs/:filename：按名读取日志内容
async fn get_log(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Json<Value>, (StatusCode, String)> {
    match state.audit.read_log(&filename) {
        Some(content) => Ok(Json(json!({"filename": filename, "content": content}))),
        None => Err((StatusCode::NOT_FOUND, "Log file not found".to_string())),
    }
}
