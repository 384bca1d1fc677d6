//! Mock LLM 客户端（用于测试，无需 API）
//!
//! 按脚本顺序返回预设响应，脚本耗尽后重复最后一条；便于驱动多步控制循环测试。

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::llm::LlmClient;
use crate::memory::Message;

/// Mock 客户端：逐条吐出脚本化响应
pub struct MockLlmClient {
    script: Mutex<VecDeque<String>>,
    fallback: String,
}

impl MockLlmClient {
    pub fn scripted<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let script: VecDeque<String> = responses.into_iter().map(Into::into).collect();
        let fallback = script
            .back()
            .cloned()
            .unwrap_or_else(|| r#"{"tool": "shell", "args": {"cmd": "true"}}"#.to_string());
        Self {
            script: Mutex::new(script),
            fallback,
        }
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, _messages: &[Message]) -> Result<String, String> {
        let mut script = self.script.lock().await;
        Ok(script.pop_front().unwrap_or_else(|| self.fallback.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_order_then_fallback() {
        let mock = MockLlmClient::scripted(["first", "second"]);
        assert_eq!(mock.complete(&[]).await.unwrap(), "first");
        assert_eq!(mock.complete(&[]).await.unwrap(), "second");
        // 脚本耗尽后重复最后一条
        assert_eq!(mock.complete(&[]).await.unwrap(), "second");
        assert_eq!(mock.complete(&[]).await.unwrap(), "second");
    }
}
