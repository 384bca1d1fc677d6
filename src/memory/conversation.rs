//! 任务内对话历史
//!
//! Role / Message 与 LLM API 对齐；TaskHistory 仅追加、不剪枝：
//! 每个完成的步骤恰好追加两条（assistant 原文 + user 结果报告），步数预算即增长上限。

use serde::{Deserialize, Serialize};

/// 消息角色（与 LLM API 一致）
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    User,
    Assistant,
    System,
}

/// 单条消息
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

/// 任务内历史：以检索上下文 + 任务文本开场，之后只增不减。
/// 系统提示词不存入历史，由 Oracle 在每次调用时置前。
#[derive(Clone, Debug, Default)]
pub struct TaskHistory {
    messages: Vec<Message>,
}

impl TaskHistory {
    /// 播种：user 消息 "Context:\n{context}\n\nTask: {task}"
    pub fn seed(context: &str, task: &str) -> Self {
        Self {
            messages: vec![Message::user(format!(
                "Context:\n{}\n\nTask: {}",
                context, task
            ))],
        }
    }

    pub fn push(&mut self, msg: Message) {
        self.messages.push(msg);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_contains_context_and_task() {
        let h = TaskHistory::seed("nginx runs on port 80", "check nginx");
        assert_eq!(h.len(), 1);
        assert_eq!(h.messages()[0].role, Role::User);
        assert!(h.messages()[0].content.contains("Context:\nnginx runs on port 80"));
        assert!(h.messages()[0].content.contains("Task: check nginx"));
    }

    #[test]
    fn test_seed_with_empty_context() {
        let h = TaskHistory::seed("", "install htop");
        assert!(h.messages()[0].content.starts_with("Context:\n\n"));
    }

    #[test]
    fn test_push_appends_in_order() {
        let mut h = TaskHistory::seed("", "t");
        h.push(Message::assistant("a"));
        h.push(Message::user("b"));
        assert_eq!(h.len(), 3);
        assert_eq!(h.messages()[1].role, Role::Assistant);
        assert_eq!(h.messages()[2].role, Role::User);
    }
}
