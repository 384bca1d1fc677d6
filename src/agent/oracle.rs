//! Oracle 客户端
//!
//! 持有 LlmClient 与系统提示词；next_action 组装 system + 历史后调用 LLM。
//! 调用失败不向上抛错：降级为 {"error": "LLM error: ..."} JSON 文本，
//! 下游解析照常拿到一个结构良好的字符串，并将其识别为致命信号。

use std::sync::Arc;

use serde_json::json;

use crate::core::AgentError;
use crate::llm::LlmClient;
use crate::memory::{Message, TaskHistory};

/// 响应预览的最大字符数（进程日志用）
const RESPONSE_PREVIEW_CHARS: usize = 200;

pub struct Oracle {
    llm: Arc<dyn LlmClient>,
    system_prompt: String,
}

impl Oracle {
    pub fn new(llm: Arc<dyn LlmClient>, system_prompt: impl Into<String>) -> Self {
        Self {
            llm,
            system_prompt: system_prompt.into(),
        }
    }

    /// 请求下一动作的原文；失败时返回合成的 error 载荷而非 Err
    pub async fn next_action(&self, history: &TaskHistory) -> String {
        tracing::info!("calling LLM...");
        let mut messages = vec![Message::system(self.system_prompt.clone())];
        messages.extend_from_slice(history.messages());

        match self.llm.complete(&messages).await {
            Ok(content) => {
                let preview: String = content.chars().take(RESPONSE_PREVIEW_CHARS).collect();
                tracing::info!(response = %preview, "LLM response");
                content
            }
            Err(e) => {
                let err = AgentError::LlmError(e);
                tracing::error!("LLM call failed: {}", err);
                json!({"error": err.to_string()}).to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FailingClient;

    #[async_trait]
    impl LlmClient for FailingClient {
        async fn complete(&self, _messages: &[Message]) -> Result<String, String> {
            Err("connection refused".to_string())
        }
    }

    #[tokio::test]
    async fn test_failure_degrades_to_error_payload() {
        let oracle = Oracle::new(Arc::new(FailingClient), "system");
        let raw = oracle.next_action(&TaskHistory::seed("", "t")).await;
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["error"], "LLM error: connection refused");
    }
}
