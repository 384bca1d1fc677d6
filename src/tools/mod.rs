//! 工具箱：运维能力与注册表
//!
//! 五项能力：shell / pkg_install / service / read_file / write_file。
//! 无白名单、无权限模型：Oracle 拥有不受限的主机执行能力。

pub mod file;
pub mod pkg;
pub mod registry;
pub mod service;
pub mod shell;

pub use file::{ReadFileTool, WriteFileTool};
pub use pkg::PkgInstallTool;
pub use registry::{run, Tool, ToolRegistry};
pub use service::ServiceTool;
pub use shell::{run_cmd, shell_quote, ShellTool};

use crate::config::ToolsSection;

/// 构建默认注册表：五项能力，超时与截断参数来自配置
pub fn default_registry(cfg: &ToolsSection) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(ShellTool::new(cfg.shell_timeout_secs, cfg.output_tail_chars));
    registry.register(PkgInstallTool::new(
        cfg.install_timeout_secs,
        cfg.output_tail_chars,
    ));
    registry.register(ServiceTool::new(
        cfg.shell_timeout_secs,
        cfg.output_tail_chars,
    ));
    registry.register(ReadFileTool::new(cfg.read_cap_chars));
    registry.register(WriteFileTool);
    registry
}
