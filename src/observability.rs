//! 可观测性
//!
//! tracing 是进程级诊断流（RUST_LOG 可调）；每任务的审计文件见 audit 模块，两者互不影响。

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub fn init() {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .with(fmt::layer())
        .init();
}
