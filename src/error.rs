//! # 统一错误处理模块
//!
//! 定义 cp2kdos 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 错误分类
//! - I/O 错误：文件读写失败
//! - `ParseError`：能级文本不符合 EIGENVALUES 块结构，或数值字段无法解析
//! - `ConfigError`：DOS 参数非法（sigma/deltaE 非正、nsigma < 1、网格过大）
//! - `EmptyInput`：DOS 计算没有任何能级输入
//!
//! 非致命的一致性警告（Fermi 能级不一致、高斯核欠采样）不属于错误，
//! 通过 `utils::output::print_warning` 报告。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// cp2kdos 统一错误类型
#[derive(Error, Debug)]
pub enum Cp2kDosError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 解析错误
    // ─────────────────────────────────────────────────────────────
    #[error("Parse error: {0}")]
    ParseError(String),

    // ─────────────────────────────────────────────────────────────
    // DOS 计算错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid DOS configuration: {0}")]
    ConfigError(String),

    #[error("No energy levels supplied to the DOS computation")]
    EmptyInput,

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ─────────────────────────────────────────────────────────────
    // 输出错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Plot error: {0}")]
    PlotError(String),
}

impl Cp2kDosError {
    /// 包装写文件错误
    pub fn write_error(path: &std::path::Path, source: std::io::Error) -> Self {
        Cp2kDosError::FileWriteError {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, Cp2kDosError>;
