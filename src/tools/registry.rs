//! 工具注册表
//!
//! 所有能力实现 Tool trait（name / params / execute），由 ToolRegistry 按名注册与查找。
//! execute 永不越界抛错：任何结果都是 JSON 载荷，失败以 {"error": ...} 表达。
//! 派发前按 params 声明过滤参数（静态名单，不做运行时内省），未声明的键静默丢弃。

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde_json::{Map, Value};

/// 能力 trait：名称、声明的参数名、异步执行（args 为已过滤的 JSON 对象）
#[async_trait]
pub trait Tool: Send + Sync {
    /// 工具名称（用于 JSON 中的 "tool" 字段）
    fn name(&self) -> &str;

    /// 声明的参数名；派发时以此过滤 LLM 给出的 args
    fn params(&self) -> &'static [&'static str];

    /// 执行能力；永不 panic、永不返回 Err，失败以 {"error": ...} 载荷表达
    async fn execute(&self, args: &Map<String, Value>) -> Value;
}

/// 工具注册表：按名称存储 Arc<dyn Tool>，进程启动时构建后不再变更
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: impl Tool + 'static) {
        let name = tool.name().to_string();
        self.tools.insert(name, Arc::new(tool));
    }

    pub fn resolve(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    /// 过滤参数：仅保留该工具声明过的键
    pub fn filter_args(tool: &dyn Tool, args: &Map<String, Value>) -> Map<String, Value> {
        args.iter()
            .filter(|(k, _)| tool.params().contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

/// 执行已解析的工具调用：计时并输出结构化审计事件（JSON）
pub async fn run(tool: &dyn Tool, args: &Map<String, Value>) -> Value {
    let start = Instant::now();
    let payload = tool.execute(args).await;
    let ok = payload.get("error").is_none();
    let audit = serde_json::json!({
        "event": "tool_audit",
        "tool": tool.name(),
        "ok": ok,
        "duration_ms": start.elapsed().as_millis() as u64,
        "args_preview": args_preview(args),
    });
    tracing::info!(audit = %audit, "tool");
    payload
}

fn args_preview(args: &Map<String, Value>) -> String {
    let s = Value::Object(args.clone()).to_string();
    if s.len() > 200 {
        format!("{}...", s.chars().take(200).collect::<String>())
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct NoopTool;

    #[async_trait]
    impl Tool for NoopTool {
        fn name(&self) -> &str {
            "noop"
        }

        fn params(&self) -> &'static [&'static str] {
            &["name"]
        }

        async fn execute(&self, _args: &Map<String, Value>) -> Value {
            json!({"status": "ok"})
        }
    }

    #[test]
    fn test_resolve_unknown_is_none() {
        let registry = ToolRegistry::new();
        assert!(registry.resolve("frobnicate").is_none());
    }

    #[test]
    fn test_resolve_registered() {
        let mut registry = ToolRegistry::new();
        registry.register(NoopTool);
        assert!(registry.resolve("noop").is_some());
    }

    #[test]
    fn test_filter_args_drops_undeclared_keys() {
        let tool = NoopTool;
        let args = json!({"name": "x", "unexpected": 1})
            .as_object()
            .cloned()
            .unwrap();
        let filtered = ToolRegistry::filter_args(&tool, &args);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered.get("name"), Some(&json!("x")));
        assert!(filtered.get("unexpected").is_none());
    }

    #[tokio::test]
    async fn test_run_returns_payload() {
        let tool = NoopTool;
        let payload = run(&tool, &Map::new()).await;
        assert_eq!(payload, json!({"status": "ok"}));
    }
}
