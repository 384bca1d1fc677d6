//! wrench - 自治运维智能体服务
//!
//! 启动：加载配置 -> 构建组件（LLM / 检索 / 工具注册表）-> 启动 HTTP API。

use std::sync::Arc;

use anyhow::Context;

use wrench::agent::{AgentComponents, Oracle, SYSTEM_PROMPT};
use wrench::audit::AuditSink;
use wrench::config::load_config;
use wrench::llm::OpenAiClient;
use wrench::observability;
use wrench::rag::ContextRetriever;
use wrench::server::{serve, AppState};
use wrench::tools::default_registry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init();

    let cfg = load_config(None).context("failed to load config")?;
    tracing::info!("starting ops agent API...");
    tracing::info!("logs directory: {}", cfg.agent.log_dir.display());

    let llm = Arc::new(OpenAiClient::new(&cfg.llm));
    let components = AgentComponents {
        oracle: Oracle::new(llm, SYSTEM_PROMPT),
        retriever: ContextRetriever::new(&cfg.rag),
        registry: default_registry(&cfg.tools),
    };
    let audit = AuditSink::new(&cfg.agent.log_dir)?;

    let state = Arc::new(AppState::new(&cfg, components, audit));
    serve(state, &cfg.http.host, cfg.http.port).await
}
