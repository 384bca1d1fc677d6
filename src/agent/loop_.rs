//! 控制循环
//!
//! Seeding -> Requesting -> Interpreting -> Dispatching -> Recording 的逐步状态机：
//! 检索上下文播种历史，循环内向 Oracle 请求下一动作、解析、派发、记录，
//! 直至 Oracle 报致命错误或步数预算耗尽。预算是除自然完成外唯一的终止保证：
//! 无论 Oracle 输出什么，步数都不会超过它。

use std::path::PathBuf;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::agent::{interpret, Interpretation, Oracle};
use crate::audit::TaskLog;
use crate::core::AgentError;
use crate::memory::{Message, TaskHistory};
use crate::rag::ContextRetriever;
use crate::tools::{self, ToolRegistry};

/// 解析失败记录原文预览的最大字符数
const FAILURE_PREVIEW_CHARS: usize = 300;

/// 单步结果：序列化后与审计记录同构
/// （成功 {"step","tool","args","result"}，失败 {"step","error"}）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepRecord {
    pub step: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub outcome: StepOutcome,
}

/// 步骤产出：结果载荷或错误标签
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepOutcome {
    Result(Value),
    Error(String),
}

/// 任务终态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Completed,
    Failed,
}

/// 聚合结果：终态、步数、逐步记录与审计日志位置
#[derive(Debug, Serialize)]
pub struct TaskReport {
    pub status: TaskStatus,
    pub steps: usize,
    pub records: Vec<StepRecord>,
    pub log_file: PathBuf,
}

/// 循环所需的组件集合
pub struct AgentComponents {
    pub oracle: Oracle,
    pub retriever: ContextRetriever,
    pub registry: ToolRegistry,
}

/// 执行一个任务：步数预算为硬上限，TaskLog 在函数返回时随 Drop 关闭
pub async fn run_task(
    components: &AgentComponents,
    task: &str,
    max_steps: usize,
    mut log: TaskLog,
) -> TaskReport {
    let max_steps = max_steps.max(1);

    log.banner();
    log.line(&format!("NEW TASK: {}", task));
    log.banner();

    // Seeding：检索上下文 + 任务文本
    let context = components.retriever.retrieve(task).await;
    let mut history = TaskHistory::seed(&context, task);

    let mut records: Vec<StepRecord> = Vec::new();
    let mut status = TaskStatus::Completed;

    for step in 1..=max_steps {
        log.line(&format!("--- Step {}/{} ---", step, max_steps));

        // Requesting：Oracle 失败也会降级为可解析的 error 载荷，绝不在此中断
        let raw = components.oracle.next_action(&history).await;
        log.line(&format!("LLM: {}", raw));

        // Interpreting
        let request = match interpret(&raw) {
            Interpretation::Action(request) => request,
            Interpretation::Fatal(msg) => {
                tracing::error!("LLM error: {}", msg);
                log.line(&format!("LLM error: {}", msg));
                records.push(StepRecord {
                    step,
                    tool: None,
                    args: None,
                    outcome: StepOutcome::Error(msg),
                });
                status = TaskStatus::Failed;
                break;
            }
            Interpretation::Failure => {
                let preview: String = raw.chars().take(FAILURE_PREVIEW_CHARS).collect();
                let err = AgentError::JsonParseError(preview);
                tracing::error!("{}", err);
                log.line(&format!("{}", err));
                records.push(StepRecord {
                    step,
                    tool: None,
                    args: None,
                    outcome: StepOutcome::Error("parse_error".to_string()),
                });
                continue;
            }
        };

        // Dispatching：未知工具记错并继续；已知工具按声明过滤参数后执行
        let Some(tool) = components.registry.resolve(&request.tool) else {
            let err = AgentError::UnknownTool(request.tool.clone());
            tracing::error!("{}", err);
            log.line(&format!("{}", err));
            records.push(StepRecord {
                step,
                tool: None,
                args: None,
                outcome: StepOutcome::Error(format!("unknown_tool: {}", request.tool)),
            });
            continue;
        };

        let args = ToolRegistry::filter_args(tool.as_ref(), &request.args);
        log.line(&format!("Calling {}({})", request.tool, Value::Object(args.clone())));
        let result = tools::run(tool.as_ref(), &args).await;
        log.line(&format!("Result: {}", result));

        // Recording：记录一步，历史恰好追加两条
        records.push(StepRecord {
            step,
            tool: Some(request.tool.clone()),
            args: Some(args),
            outcome: StepOutcome::Result(result.clone()),
        });
        history.push(Message::assistant(raw));
        history.push(Message::user(format!(
            "Result: {}\n\nContinue or report completion.",
            result
        )));
    }

    let log_file = log.path().to_path_buf();
    log.banner();
    log.line(&format!("Task completed: {} steps", records.len()));
    log.line(&format!("Log: {}", log_file.display()));
    log.banner();

    TaskReport {
        status,
        steps: records.len(),
        records,
        log_file,
    }
}
