//! Wrench - 自治 Linux 运维智能体
//!
//! 通过 HTTP 接收自然语言任务，循环向 LLM Oracle 请求下一动作并在主机上执行，
//! 结果回灌对话历史，直至 Oracle 报告致命错误或步数预算耗尽。
//!
//! 模块划分：
//! - **agent**: Oracle 客户端、响应解析级联、控制循环
//! - **audit**: 每任务审计日志与日志目录管理
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 错误类型
//! - **llm**: LLM 客户端抽象与实现（OpenAI 兼容 / Mock）
//! - **memory**: 任务内对话历史
//! - **rag**: 知识库检索客户端
//! - **server**: HTTP 任务提交接口（axum）
//! - **tools**: 运维能力（shell / pkg_install / service / read_file / write_file）与注册表

pub mod agent;
pub mod audit;
pub mod config;
pub mod core;
pub mod llm;
pub mod memory;
pub mod observability;
pub mod rag;
pub mod server;
pub mod tools;
