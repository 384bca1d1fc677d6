//! Agent：Oracle 客户端、响应解析级联与控制循环

pub mod interpreter;
pub mod loop_;
pub mod oracle;
pub mod prompt;

pub use interpreter::{interpret, ActionRequest, Interpretation};
pub use loop_::{run_task, AgentComponents, StepOutcome, StepRecord, TaskReport, TaskStatus};
pub use oracle::Oracle;
pub use prompt::SYSTEM_PROMPT;
