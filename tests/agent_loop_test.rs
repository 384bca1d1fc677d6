//! 控制循环集成测试
//!
//! 用脚本化 Mock LLM 驱动完整循环，验证步数预算上限、致命信号、未知工具、
//! 参数过滤与散文包裹 JSON 的恢复路径。

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tempfile::TempDir;

use wrench::agent::{
    run_task, AgentComponents, Oracle, StepOutcome, TaskReport, TaskStatus, SYSTEM_PROMPT,
};
use wrench::audit::AuditSink;
use wrench::config::RagSection;
use wrench::llm::MockLlmClient;
use wrench::rag::ContextRetriever;
use wrench::tools::{Tool, ToolRegistry};

/// 记录每次调用参数的测试工具
struct ProbeTool {
    name: &'static str,
    params: &'static [&'static str],
    calls: Calls,
}

type Calls = Arc<Mutex<Vec<Map<String, Value>>>>;

#[async_trait]
impl Tool for ProbeTool {
    fn name(&self) -> &str {
        self.name
    }

    fn params(&self) -> &'static [&'static str] {
        self.params
    }

    async fn execute(&self, args: &Map<String, Value>) -> Value {
        self.calls.lock().unwrap().push(args.clone());
        json!({"status": "ok"})
    }
}

fn probe_registry(name: &'static str, params: &'static [&'static str]) -> (ToolRegistry, Calls) {
    let calls: Calls = Arc::new(Mutex::new(Vec::new()));
    let mut registry = ToolRegistry::new();
    registry.register(ProbeTool {
        name,
        params,
        calls: Arc::clone(&calls),
    });
    (registry, calls)
}

fn components<S: Into<String>>(script: Vec<S>, registry: ToolRegistry) -> AgentComponents {
    let llm = Arc::new(MockLlmClient::scripted(script));
    AgentComponents {
        oracle: Oracle::new(llm, SYSTEM_PROMPT),
        // 不可达端口：检索降级为空上下文
        retriever: ContextRetriever::new(&RagSection {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 1,
            snippet_chars: 300,
            top_hits: 3,
        }),
        registry,
    }
}

async fn run(components: &AgentComponents, task: &str, max_steps: usize) -> (TaskReport, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let sink = AuditSink::new(dir.path()).unwrap();
    let log = sink.open_task_log().unwrap();
    let report = run_task(components, task, max_steps, log).await;
    (report, dir)
}

const PROBE_CALL: &str = r#"{"tool": "probe", "args": {"name": "x"}}"#;

#[tokio::test]
async fn test_budget_exhaustion_produces_exactly_n_records() {
    for budget in [1usize, 5] {
        let (registry, calls) = probe_registry("probe", &["name"]);
        let c = components(vec![PROBE_CALL], registry);
        let (report, _dir) = run(&c, "demo task", budget).await;
        assert_eq!(report.status, TaskStatus::Completed);
        assert_eq!(report.steps, budget);
        assert_eq!(report.records.len(), budget);
        assert_eq!(calls.lock().unwrap().len(), budget);
        assert!(report
            .records
            .iter()
            .all(|r| matches!(r.outcome, StepOutcome::Result(_))));
    }
}

#[tokio::test]
async fn test_zero_budget_is_clamped_to_one() {
    let (registry, _calls) = probe_registry("probe", &["name"]);
    let c = components(vec![PROBE_CALL], registry);
    let (report, _dir) = run(&c, "demo", 0).await;
    assert_eq!(report.records.len(), 1);
}

#[tokio::test]
async fn test_fatal_error_terminates_with_records_so_far() {
    let (registry, calls) = probe_registry("probe", &["name"]);
    let c = components(vec![r#"{"error": "LLM error: timeout"}"#], registry);
    let (report, _dir) = run(&c, "demo", 10).await;
    assert_eq!(report.status, TaskStatus::Failed);
    assert_eq!(report.records.len(), 1);
    assert_eq!(
        report.records[0].outcome,
        StepOutcome::Error("LLM error: timeout".to_string())
    );
    assert!(calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_fatal_error_after_successful_steps() {
    let (registry, calls) = probe_registry("probe", &["name"]);
    let c = components(
        vec![PROBE_CALL, PROBE_CALL, r#"{"error": "LLM error: gone"}"#],
        registry,
    );
    let (report, _dir) = run(&c, "demo", 10).await;
    assert_eq!(report.status, TaskStatus::Failed);
    assert_eq!(report.records.len(), 3);
    assert_eq!(calls.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_unknown_tool_is_nonfatal() {
    let (registry, calls) = probe_registry("probe", &["name"]);
    let c = components(
        vec![r#"{"tool": "frobnicate", "args": {}}"#, PROBE_CALL],
        registry,
    );
    let (report, _dir) = run(&c, "demo", 2).await;
    assert_eq!(report.status, TaskStatus::Completed);
    assert_eq!(report.records.len(), 2);
    assert_eq!(
        report.records[0].outcome,
        StepOutcome::Error("unknown_tool: frobnicate".to_string())
    );
    assert!(matches!(report.records[1].outcome, StepOutcome::Result(_)));
    assert_eq!(calls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_round_trip_service_dispatch() {
    let (registry, calls) = probe_registry("service", &["action", "name"]);
    let c = components(
        vec![r#"{"tool": "service", "args": {"action": "status", "name": "nginx"}}"#],
        registry,
    );
    let (report, _dir) = run(&c, "check nginx", 1).await;
    assert_eq!(report.records[0].tool.as_deref(), Some("service"));
    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].len(), 2);
    assert_eq!(calls[0].get("action"), Some(&json!("status")));
    assert_eq!(calls[0].get("name"), Some(&json!("nginx")));
}

#[tokio::test]
async fn test_argument_filtering_drops_undeclared_keys() {
    let (registry, calls) = probe_registry("probe", &["name"]);
    let c = components(
        vec![r#"{"tool": "probe", "args": {"name": "x", "unexpected": 1}}"#],
        registry,
    );
    let (_report, _dir) = run(&c, "demo", 1).await;
    let calls = calls.lock().unwrap();
    assert_eq!(calls[0].len(), 1);
    assert_eq!(calls[0].get("name"), Some(&json!("x")));
}

#[tokio::test]
async fn test_prose_wrapped_json_is_recovered() {
    let (registry, calls) = probe_registry("shell", &["cmd"]);
    let c = components(
        vec!["Sure! Let me check... {\"tool\": \"shell\", \"args\": {\"cmd\": \"ls\"}} done."],
        registry,
    );
    let (report, _dir) = run(&c, "demo", 1).await;
    assert!(matches!(report.records[0].outcome, StepOutcome::Result(_)));
    assert_eq!(calls.lock().unwrap()[0].get("cmd"), Some(&json!("ls")));
}

#[tokio::test]
async fn test_parse_failure_consumes_step_then_continues() {
    let (registry, calls) = probe_registry("probe", &["name"]);
    let c = components(vec!["no json here at all", PROBE_CALL], registry);
    let (report, _dir) = run(&c, "demo", 2).await;
    assert_eq!(report.status, TaskStatus::Completed);
    assert_eq!(
        report.records[0].outcome,
        StepOutcome::Error("parse_error".to_string())
    );
    assert!(matches!(report.records[1].outcome, StepOutcome::Result(_)));
    assert_eq!(calls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_capability_timeout_is_structured_and_loop_continues() {
    use wrench::tools::ShellTool;

    let calls: Calls = Arc::new(Mutex::new(Vec::new()));
    let mut registry = ToolRegistry::new();
    // 1 秒超时的 shell，外加一个探针工具
    registry.register(ShellTool::new(1, 2000));
    registry.register(ProbeTool {
        name: "probe",
        params: &["name"],
        calls: Arc::clone(&calls),
    });
    let c = components(
        vec![r#"{"tool": "shell", "args": {"cmd": "sleep 3"}}"#, PROBE_CALL],
        registry,
    );
    let (report, _dir) = run(&c, "demo", 2).await;
    assert_eq!(report.status, TaskStatus::Completed);
    assert_eq!(report.records.len(), 2);
    // 超时是结构化结果载荷，不是步骤级错误
    match &report.records[0].outcome {
        StepOutcome::Result(payload) => {
            assert_eq!(payload["error"], "timeout");
            assert_eq!(payload["returncode"], -1);
        }
        other => panic!("expected result payload, got {:?}", other),
    }
    assert_eq!(calls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_audit_log_contains_task_banner_and_steps() {
    let (registry, _calls) = probe_registry("probe", &["name"]);
    let c = components(vec![PROBE_CALL], registry);
    let (report, _dir) = run(&c, "install nginx", 2).await;
    let content = std::fs::read_to_string(&report.log_file).unwrap();
    assert!(content.contains("NEW TASK: install nginx"));
    assert!(content.contains("--- Step 1/2 ---"));
    assert!(content.contains("--- Step 2/2 ---"));
    assert!(content.contains("Task completed: 2 steps"));
}
