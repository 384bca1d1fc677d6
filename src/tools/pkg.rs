//! 软件包安装
//!
//! shell 出系统包管理器（apt-get），长超时；包名做 shell 转义后拼入命令行。

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::tools::shell::{run_cmd, shell_quote};
use crate::tools::Tool;

/// pkg_install 工具：sudo apt-get update && install -y
pub struct PkgInstallTool {
    timeout_secs: u64,
    tail_chars: usize,
}

impl PkgInstallTool {
    pub fn new(timeout_secs: u64, tail_chars: usize) -> Self {
        Self {
            timeout_secs,
            tail_chars,
        }
    }
}

#[async_trait]
impl Tool for PkgInstallTool {
    fn name(&self) -> &str {
        "pkg_install"
    }

    fn params(&self) -> &'static [&'static str] {
        &["name"]
    }

    async fn execute(&self, args: &Map<String, Value>) -> Value {
        let name = args.get("name").and_then(|v| v.as_str()).unwrap_or("");
        tracing::info!(package = %name, "installing package");
        let cmd = format!(
            "sudo apt-get update && sudo apt-get install -y {}",
            shell_quote(name)
        );
        run_cmd(&cmd, self.timeout_secs, self.tail_chars).await
    }
}
