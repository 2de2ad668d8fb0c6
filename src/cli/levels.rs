//! # levels 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/levels.rs`

use clap::Args;
use std::path::PathBuf;

/// levels 子命令参数
#[derive(Args, Debug)]
pub struct LevelsArgs {
    /// CP2K .MOLog or output file
    pub input: PathBuf,

    /// List levels within [fermi - window, fermi + window] in eV (with --all)
    #[arg(short, long, default_value_t = 3.0)]
    pub window: f64,

    /// List every level inside the window, not only the summary
    #[arg(long, default_value_t = false)]
    pub all: bool,
}
