//! # 批量处理模块
//!
//! 目录模式：收集目录下所有能级文件并并行计算 DOS。
//!
//! ## 功能
//! - 按 glob 模式收集文件（可递归）
//! - rayon 并行处理
//! - 进度反馈与统计
//!
//! ## 依赖关系
//! - 被 `commands/dos.rs` 使用
//! - 使用 `rayon` 进行并行处理
//! - 使用 `indicatif` 显示进度

pub mod collector;
pub mod runner;

pub use collector::FileCollector;
pub use runner::{BatchRunner, ProcessResult};
