//! 服务管理（systemd）
//!
//! status / start / stop / restart / enable / disable 统一走 systemctl；
//! 只对单元名做 shell 转义，动作词原样透传，由 systemctl 自行拒绝未知动作。

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::tools::shell::{run_cmd, shell_quote};
use crate::tools::Tool;

/// service 工具：sudo systemctl <action> <name>
pub struct ServiceTool {
    timeout_secs: u64,
    tail_chars: usize,
}

impl ServiceTool {
    pub fn new(timeout_secs: u64, tail_chars: usize) -> Self {
        Self {
            timeout_secs,
            tail_chars,
        }
    }
}

#[async_trait]
impl Tool for ServiceTool {
    fn name(&self) -> &str {
        "service"
    }

    fn params(&self) -> &'static [&'static str] {
        &["action", "name"]
    }

    async fn execute(&self, args: &Map<String, Value>) -> Value {
        let action = args.get("action").and_then(|v| v.as_str()).unwrap_or("");
        let name = args.get("name").and_then(|v| v.as_str()).unwrap_or("");
        tracing::info!(action = %action, service = %name, "service control");
        let cmd = format!("sudo systemctl {} {}", action, shell_quote(name));
        run_cmd(&cmd, self.timeout_secs, self.tail_chars).await
    }
}
