//! # 文件收集器
//!
//! 根据输入目录和 glob 模式收集待处理的能级文件。
//!
//! ## 功能
//! - 多模式（逗号分隔），文件名匹配不区分大小写
//! - 可选递归搜索
//! - 结果按路径排序，输出顺序稳定
//!
//! ## 依赖关系
//! - 被 `commands/dos.rs` 调用
//! - 使用 `walkdir` 遍历目录，`glob` 匹配文件名

use crate::error::{Cp2kDosError, Result};

use glob::{MatchOptions, Pattern};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 默认匹配的能级文件
pub const DEFAULT_PATTERN: &str = "*.MOLog,*.out";

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// 文件收集器
pub struct FileCollector {
    /// 输入目录
    input: PathBuf,
    /// 匹配模式列表
    patterns: Vec<Pattern>,
    /// 是否递归
    recursive: bool,
}

impl FileCollector {
    pub fn new(input: PathBuf) -> Self {
        Self {
            input,
            patterns: Vec::new(),
            recursive: false,
        }
    }

    /// 设置匹配模式（逗号分隔的多模式）
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self> {
        self.patterns = pattern
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| {
                Pattern::new(s).map_err(|e| {
                    Cp2kDosError::InvalidArgument(format!("invalid glob pattern '{}': {}", s, e))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(self)
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// 收集所有匹配的文件
    pub fn collect(&self) -> Vec<PathBuf> {
        if self.input.is_file() {
            return vec![self.input.clone()];
        }

        if !self.input.is_dir() {
            return vec![];
        }

        let max_depth = if self.recursive { usize::MAX } else { 1 };

        let mut files: Vec<PathBuf> = WalkDir::new(&self.input)
            .max_depth(max_depth)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| self.matches_patterns(e.path()))
            .map(|e| e.path().to_path_buf())
            .collect();

        files.sort();
        files
    }

    /// 检查文件名是否匹配任一模式；未设置模式时全部匹配
    fn matches_patterns(&self, path: &Path) -> bool {
        let filename = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name,
            None => return false,
        };

        self.patterns.is_empty()
            || self
                .patterns
                .iter()
                .any(|p| p.matches_with(filename, MATCH_OPTIONS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pattern_matches() {
        let collector = FileCollector::new(PathBuf::from("."))
            .with_pattern(DEFAULT_PATTERN)
            .unwrap();

        assert!(collector.matches_patterns(Path::new("dir/water-MOS-1_0.MOLog")));
        assert!(collector.matches_patterns(Path::new("run.molog")));
        assert!(collector.matches_patterns(Path::new("cp2k.out")));
        assert!(!collector.matches_patterns(Path::new("wfn.cube")));
    }

    #[test]
    fn test_empty_pattern_matches_all() {
        let collector = FileCollector::new(PathBuf::from(".")).with_pattern(" , ").unwrap();
        assert!(collector.matches_patterns(Path::new("anything.txt")));
    }

    #[test]
    fn test_invalid_pattern() {
        let result = FileCollector::new(PathBuf::from(".")).with_pattern("[*.out");
        assert!(matches!(result, Err(Cp2kDosError::InvalidArgument(_))));
    }
}
