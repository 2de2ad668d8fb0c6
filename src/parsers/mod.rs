//! # 解析器模块
//!
//! 读取 CP2K 能级输出（`.MOLog` 或主输出文件）。两种文件中的
//! EIGENVALUES 块格式相同，共用 `molog` 解析器。
//!
//! ## 依赖关系
//! - 被 `commands/` 模块使用
//! - 使用 `models/` 数据模型
//! - 子模块: molog

pub mod molog;

use crate::error::{Cp2kDosError, Result};
use crate::models::Spectrum;
use std::fs;
use std::path::Path;

/// 能级来源文件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelSource {
    /// `.MOLog` 文件
    MoLog,
    /// CP2K 主输出
    Output,
}

impl LevelSource {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("molog") => LevelSource::MoLog,
            _ => LevelSource::Output,
        }
    }
}

impl std::fmt::Display for LevelSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LevelSource::MoLog => write!(f, "MOLog"),
            LevelSource::Output => write!(f, "CP2K output"),
        }
    }
}

/// 读取文件并解析能级谱
pub fn parse_spectrum_file(path: &Path) -> Result<Spectrum> {
    if !path.is_file() {
        return Err(Cp2kDosError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let content = fs::read_to_string(path).map_err(|e| Cp2kDosError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    molog::parse_spectrum(&content).map_err(|e| match e {
        Cp2kDosError::ParseError(reason) => Cp2kDosError::ParseError(format!(
            "{} ({}): {}",
            path.display(),
            LevelSource::from_path(path),
            reason
        )),
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_source_from_extension() {
        assert_eq!(LevelSource::from_path(Path::new("run.MOLog")), LevelSource::MoLog);
        assert_eq!(LevelSource::from_path(Path::new("run.molog")), LevelSource::MoLog);
        assert_eq!(LevelSource::from_path(Path::new("cp2k.out")), LevelSource::Output);
    }

    #[test]
    fn test_missing_file() {
        let err = parse_spectrum_file(Path::new("does/not/exist.MOLog")).unwrap_err();
        assert!(matches!(err, Cp2kDosError::FileNotFound { .. }));
    }
}
