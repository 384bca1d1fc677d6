//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `WRENCH__*` 覆盖
//! （双下划线表示嵌套，如 `WRENCH__HTTP__PORT=9100`）。

use std::path::PathBuf;

use serde::Deserialize;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default)]
    pub agent: AgentSection,
    #[serde(default)]
    pub llm: LlmSection,
    #[serde(default)]
    pub rag: RagSection,
    #[serde(default)]
    pub tools: ToolsSection,
    #[serde(default)]
    pub http: HttpSection,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            agent: AgentSection::default(),
            llm: LlmSection::default(),
            rag: RagSection::default(),
            tools: ToolsSection::default(),
            http: HttpSection::default(),
        }
    }
}

/// [agent] 段：审计日志目录与默认步数预算
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AgentSection {
    /// 每任务审计日志所在目录
    pub log_dir: PathBuf,
    /// 提交时未指定 max_steps 的默认值
    pub max_steps: usize,
}

impl Default for AgentSection {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("logs"),
            max_steps: default_max_steps(),
        }
    }
}

fn default_max_steps() -> usize {
    15
}

/// [llm] 段：OpenAI 兼容端点与请求参数
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    /// 推理服务端点（OpenAI 兼容）
    pub base_url: String,
    pub model: String,
    /// API key；缺省时读 OPENAI_API_KEY 环境变量
    pub api_key: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    /// 单次补全请求超时（秒）
    pub timeout_secs: u64,
    /// 健康检查探测地址
    pub health_url: String,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080/v1".to_string(),
            model: "local".to_string(),
            api_key: None,
            temperature: 0.2,
            max_tokens: 300,
            timeout_secs: default_llm_timeout_secs(),
            health_url: "http://127.0.0.1:8080/health".to_string(),
        }
    }
}

fn default_llm_timeout_secs() -> u64 {
    180
}

/// [rag] 段：知识库检索端点、超时与截断参数
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RagSection {
    pub base_url: String,
    pub timeout_secs: u64,
    /// 单条 hit 保留的前缀字符数
    pub snippet_chars: usize,
    /// 拼接的 hit 条数上限
    pub top_hits: usize,
}

impl Default for RagSection {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:7000".to_string(),
            timeout_secs: 5,
            snippet_chars: 300,
            top_hits: 3,
        }
    }
}

/// [tools] 段：能力执行的超时与截断参数
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ToolsSection {
    /// shell / service 命令超时（秒）
    pub shell_timeout_secs: u64,
    /// 软件包安装超时（秒）
    pub install_timeout_secs: u64,
    /// read_file 读取上限（字符）
    pub read_cap_chars: usize,
    /// stdout / stderr 各自保留的末尾字符数
    pub output_tail_chars: usize,
}

impl Default for ToolsSection {
    fn default() -> Self {
        Self {
            shell_timeout_secs: 60,
            install_timeout_secs: 300,
            read_cap_chars: 10_000,
            output_tail_chars: 2_000,
        }
    }
}

/// [http] 段：监听地址
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpSection {
    pub host: String,
    pub port: u16,
}

impl Default for HttpSection {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 9000,
        }
    }
}

/// 从 config 目录加载配置，环境变量 WRENCH__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 WRENCH__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("WRENCH")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sections() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.agent.max_steps, 15);
        assert_eq!(cfg.llm.timeout_secs, 180);
        assert_eq!(cfg.llm.max_tokens, 300);
        assert_eq!(cfg.rag.timeout_secs, 5);
        assert_eq!(cfg.rag.top_hits, 3);
        assert_eq!(cfg.tools.shell_timeout_secs, 60);
        assert_eq!(cfg.tools.install_timeout_secs, 300);
        assert_eq!(cfg.http.port, 9000);
    }

    #[test]
    fn test_load_config_missing_file_falls_back_to_defaults() {
        let cfg = load_config(Some(PathBuf::from("/nonexistent/wrench.toml")))
            .unwrap_or_default();
        assert_eq!(cfg.llm.model, "local");
        assert_eq!(cfg.tools.read_cap_chars, 10_000);
    }
}
