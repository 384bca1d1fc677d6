//! Shell 执行
//!
//! run_cmd 经 sh -c 执行任意命令，带超时；stdout / stderr 各保留末尾 N 字符。
//! 无白名单、无沙箱：Oracle 拥有对主机的完全执行能力，这是本系统的既定属性。

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tokio::process::Command;

use crate::tools::Tool;

/// 通用命令执行：返回 {"returncode", "stdout", "stderr"}；
/// 超时返回 {"error": "timeout", "returncode": -1}，启动失败返回 {"error": <原因>, "returncode": -1}
pub async fn run_cmd(cmd: &str, timeout_secs: u64, tail_chars: usize) -> Value {
    tracing::info!(command = %cmd, "executing");

    let mut command = Command::new("sh");
    command.args(["-c", cmd]);

    let output = match tokio::time::timeout(Duration::from_secs(timeout_secs), command.output()).await
    {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            tracing::error!(command = %cmd, "exception: {}", e);
            return json!({"error": e.to_string(), "returncode": -1});
        }
        Err(_) => {
            tracing::error!(command = %cmd, "command timed out");
            return json!({"error": "timeout", "returncode": -1});
        }
    };

    let returncode = output.status.code().unwrap_or(-1);
    tracing::info!(returncode, "command finished");

    json!({
        "returncode": returncode,
        "stdout": tail(&String::from_utf8_lossy(&output.stdout), tail_chars),
        "stderr": tail(&String::from_utf8_lossy(&output.stderr), tail_chars),
    })
}

/// 末尾 n 字符（UTF-8 安全）
fn tail(s: &str, n: usize) -> String {
    let count = s.chars().count();
    if count <= n {
        s.to_string()
    } else {
        s.chars().skip(count - n).collect()
    }
}

/// 单引号包裹做 shell 转义；纯安全字符的串原样返回
pub fn shell_quote(s: &str) -> String {
    let safe = !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '/' | ':' | '='));
    if safe {
        s.to_string()
    } else {
        format!("'{}'", s.replace('\'', r"'\''"))
    }
}

/// Shell 工具：执行任意命令
pub struct ShellTool {
    timeout_secs: u64,
    tail_chars: usize,
}

impl ShellTool {
    pub fn new(timeout_secs: u64, tail_chars: usize) -> Self {
        Self {
            timeout_secs,
            tail_chars,
        }
    }
}

#[async_trait]
impl Tool for ShellTool {
    fn name(&self) -> &str {
        "shell"
    }

    fn params(&self) -> &'static [&'static str] {
        &["cmd"]
    }

    async fn execute(&self, args: &Map<String, Value>) -> Value {
        let cmd = args.get("cmd").and_then(|v| v.as_str()).unwrap_or("").trim();
        run_cmd(cmd, self.timeout_secs, self.tail_chars).await
    }
}
