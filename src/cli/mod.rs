//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `dos`: 由能级计算高斯展宽态密度（单文件或目录批量）
//! - `levels`: 打印各自旋通道的能级摘要
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: dos, levels

pub mod dos;
pub mod levels;

use clap::{Parser, Subcommand};

/// cp2kdos - CP2K 能级与态密度工具
#[derive(Parser)]
#[command(name = "cp2kdos")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(about = "Density of states from CP2K MOLog and output files", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Compute the Gaussian-broadened density of states per spin channel
    Dos(dos::DosArgs),

    /// Print a summary of the energy levels per spin channel
    Levels(levels::LevelsArgs),
}
