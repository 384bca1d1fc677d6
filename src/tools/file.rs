//! 文件读写
//!
//! read_file 限量读取（默认 10000 字符），write_file 全量覆盖；
//! 路径不做沙箱约束，失败以 {"error": ...} 载荷表达。

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use crate::tools::Tool;

/// read_file 工具：读取文件前 cap_chars 字符
pub struct ReadFileTool {
    cap_chars: usize,
}

impl ReadFileTool {
    pub fn new(cap_chars: usize) -> Self {
        Self { cap_chars }
    }
}

#[async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &str {
        "read_file"
    }

    fn params(&self) -> &'static [&'static str] {
        &["path"]
    }

    async fn execute(&self, args: &Map<String, Value>) -> Value {
        let path = args.get("path").and_then(|v| v.as_str()).unwrap_or("");
        tracing::info!(path = %path, "reading file");
        match tokio::fs::read(path).await {
            Ok(bytes) => {
                let content: String = String::from_utf8_lossy(&bytes)
                    .chars()
                    .take(self.cap_chars)
                    .collect();
                json!({"content": content})
            }
            Err(e) => {
                tracing::error!("failed to read {}: {}", path, e);
                json!({"error": e.to_string()})
            }
        }
    }
}

/// write_file 工具：全量覆盖写入
pub struct WriteFileTool;

#[async_trait]
impl Tool for WriteFileTool {
    fn name(&self) -> &str {
        "write_file"
    }

    fn params(&self) -> &'static [&'static str] {
        &["path", "content"]
    }

    async fn execute(&self, args: &Map<String, Value>) -> Value {
        let path = args.get("path").and_then(|v| v.as_str()).unwrap_or("");
        let Some(content) = args.get("content").and_then(|v| v.as_str()) else {
            return json!({"error": "content must be a string"});
        };
        tracing::info!(path = %path, "writing to file");
        match tokio::fs::write(path, content).await {
            Ok(()) => json!({"status": "ok"}),
            Err(e) => {
                tracing::error!("failed to write {}: {}", path, e);
                json!({"error": e.to_string()})
            }
        }
    }
}
