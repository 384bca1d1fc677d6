//! 审计日志
//!
//! 进程级 AuditSink 持有日志目录，负责新建任务日志与列目录 / 读取；
//! 每个任务在运行期间持有独立的 TaskLog，逐行写入带时间戳的可读文本，
//! 任务结束（含提前终止）随 Drop 释放文件句柄。
//! 与 tracing 的分工：tracing 是进程级诊断流，TaskLog 是产品工件（审计追溯）。

use std::fs::{self, File, OpenOptions};
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use chrono::Local;
use serde::Serialize;

use crate::core::AgentError;

/// 日志文件描述符（GET /logs 列表项）
#[derive(Debug, Clone, Serialize)]
pub struct LogDescriptor {
    pub file: String,
    pub size: u64,
    /// 修改时间（epoch 秒）
    pub modified: u64,
}

/// 进程级审计汇：持有日志目录
pub struct AuditSink {
    log_dir: PathBuf,
}

impl AuditSink {
    pub fn new(log_dir: impl Into<PathBuf>) -> Result<Self, AgentError> {
        let log_dir = log_dir.into();
        fs::create_dir_all(&log_dir)?;
        Ok(Self { log_dir })
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// 以时间戳命名新建任务日志：task_YYYYmmdd_HHMMSS.log
    pub fn open_task_log(&self) -> Result<TaskLog, AgentError> {
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let path = self.log_dir.join(format!("task_{}.log", timestamp));
        TaskLog::create(path)
    }

    /// 最近的任务日志，新者在前，至多 limit 条
    pub fn list_recent(&self, limit: usize) -> Vec<LogDescriptor> {
        let Ok(entries) = fs::read_dir(&self.log_dir) else {
            return Vec::new();
        };
        let mut logs: Vec<LogDescriptor> = entries
            .flatten()
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy().to_string();
                if !name.starts_with("task_") || !name.ends_with(".log") {
                    return None;
                }
                let meta = entry.metadata().ok()?;
                let modified = meta
                    .modified()
                    .ok()
                    .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                    .map(|d| d.as_secs())
                    .unwrap_or(0);
                Some(LogDescriptor {
                    file: name,
                    size: meta.len(),
                    modified,
                })
            })
            .collect();
        // 同秒内创建的文件按文件名兜底排序
        logs.sort_by(|a, b| b.modified.cmp(&a.modified).then(b.file.cmp(&a.file)));
        logs.truncate(limit);
        logs
    }

    /// 按文件名读取日志；含路径分隔符或 .. 的名字直接拒绝
    pub fn read_log(&self, filename: &str) -> Option<String> {
        if filename.contains('/') || filename.contains('\\') || filename.contains("..") {
            return None;
        }
        fs::read_to_string(self.log_dir.join(filename)).ok()
    }
}

/// 单任务日志：追加写、带时间戳的文本行
pub struct TaskLog {
    path: PathBuf,
    file: File,
}

impl TaskLog {
    fn create(path: PathBuf) -> Result<Self, AgentError> {
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 追加一行 "YYYY-MM-DD HH:MM:SS [INFO] msg"；写失败仅告警，不拖垮任务
    pub fn line(&mut self, msg: &str) {
        let stamped = format!("{} [INFO] {}\n", Local::now().format("%Y-%m-%d %H:%M:%S"), msg);
        if let Err(e) = self.file.write_all(stamped.as_bytes()) {
            tracing::warn!("task log write failed: {}", e);
        }
    }

    /// 分隔横线
    pub fn banner(&mut self) {
        self.line(&"=".repeat(70));
    }
}
