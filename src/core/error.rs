//! Agent 错误类型
//!
//! 组件内部的失败信号。循环层面只有 Oracle 显式返回的 error 载荷是致命的，
//! 其余错误均降级为步骤级记录，任务继续执行。

use thiserror::Error;

/// Agent 运行过程中可能出现的错误（LLM、解析、工具派发、审计 IO）
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("JSON parse error: {0}")]
    JsonParseError(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
