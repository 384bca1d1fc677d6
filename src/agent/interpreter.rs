//! 响应解析：从 Oracle 原文中提取 Action Request
//!
//! Oracle 的文本生成并不可靠：JSON 可能被散文包裹、可能一次输出多个候选对象、可能残缺。
//! 解析按固定顺序尝试一组抽取策略，取第一个成功者（first-match-wins）：
//!   1. 整段文本即单个 JSON 对象（要求 tool 字符串与 args 对象）
//!   2. ``` / ```json 围栏代码块内部（同样形状）
//!   3. 第一个匹配 {"tool": "...", "args": {...}}（args 非嵌套）严格模式的子串；
//!      原文还有其余内容时记录告警，可观测但不升级为失败
//!   4. 最宽松：以 { 开头、含字面键 "tool"、到第一个 } 截止的子串，args 可缺省
//!
//! 任一阶段解析出的对象若顶层含 "error" 键，视为 Oracle 上游失败（任务级致命）。
//! 四段全部失败为 Failure（步骤级，消耗一步后循环继续）。
//! interpret 绝不 panic、绝不上抛。

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

/// 解析出的动作意图
#[derive(Debug, Clone, PartialEq)]
pub struct ActionRequest {
    pub tool: String,
    pub args: Map<String, Value>,
}

/// 解析结果
#[derive(Debug, Clone, PartialEq)]
pub enum Interpretation {
    /// 有效动作
    Action(ActionRequest),
    /// Oracle 报告的上游错误（顶层 error 键），任务级致命
    Fatal(String),
    /// 全部策略失败，步骤级错误
    Failure,
}

struct Strategy {
    name: &'static str,
    extract: fn(&str) -> Option<Value>,
    /// 该阶段是否要求 args 对象必须存在
    args_required: bool,
}

const STRATEGIES: &[Strategy] = &[
    Strategy {
        name: "whole_text",
        extract: whole_text,
        args_required: true,
    },
    Strategy {
        name: "fenced_block",
        extract: fenced_block,
        args_required: true,
    },
    Strategy {
        name: "first_strict",
        extract: first_strict,
        args_required: true,
    },
    Strategy {
        name: "first_lenient",
        extract: first_lenient,
        args_required: false,
    },
];

pub fn interpret(raw: &str) -> Interpretation {
    for strategy in STRATEGIES {
        let Some(value) = (strategy.extract)(raw) else {
            continue;
        };
        let Some(obj) = value.as_object() else {
            continue;
        };

        if let Some(err) = obj.get("error") {
            let msg = err
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| err.to_string());
            return Interpretation::Fatal(msg);
        }

        let Some(tool) = obj.get("tool").and_then(Value::as_str) else {
            continue;
        };
        let args = match obj.get("args") {
            Some(Value::Object(m)) => m.clone(),
            Some(_) => continue,
            None if strategy.args_required => continue,
            None => Map::new(),
        };

        tracing::debug!(strategy = strategy.name, tool = %tool, "action extracted");
        return Interpretation::Action(ActionRequest {
            tool: tool.to_string(),
            args,
        });
    }

    Interpretation::Failure
}

/// 策略 1：整段即 JSON
fn whole_text(raw: &str) -> Option<Value> {
    serde_json::from_str(raw.trim()).ok().filter(Value::is_object)
}

/// 策略 2：围栏代码块内部
fn fenced_block(raw: &str) -> Option<Value> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").expect("fenced block regex")
    });
    let caps = re.captures(raw)?;
    serde_json::from_str(caps.get(1)?.as_str())
        .ok()
        .filter(Value::is_object)
}

/// 策略 3：第一个严格平铺模式的子串
fn first_strict(raw: &str) -> Option<Value> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r#"\{\s*"tool"\s*:\s*"[^"]+"\s*,\s*"args"\s*:\s*\{[^}]*\}\s*\}"#)
            .expect("strict pattern regex")
    });
    let matched = re.find(raw)?.as_str();
    let value: Value = serde_json::from_str(matched).ok()?;
    if raw.trim() != matched {
        tracing::warn!("LLM returned extra content around the JSON object, using first match only");
    }
    Some(value)
}

/// 策略 4：最宽松，{ 开头、含 "tool"、到第一个 } 截止
fn first_lenient(raw: &str) -> Option<Value> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r#"\{[^{]*?"tool"[^}]*?\}"#).expect("lenient pattern regex")
    });
    serde_json::from_str(re.find(raw)?.as_str()).ok()
}
