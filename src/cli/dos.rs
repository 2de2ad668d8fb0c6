//! # dos 子命令 CLI 定义
//!
//! 参数默认值沿用常用设置：sigma 0.075 eV、网格间距 0.001 eV、
//! 截断 10 sigma、显示窗口 Fermi ± 3 eV。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/dos.rs`

use crate::batch::collector::DEFAULT_PATTERN;
use crate::dos::config::{DEFAULT_DELTA_E, DEFAULT_MAX_POINTS, DEFAULT_NSIGMA, DEFAULT_SIGMA};

use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// 图像输出格式
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum PlotFormat {
    /// PNG image
    Png,
    /// SVG vector image
    Svg,
}

/// dos 子命令参数
#[derive(Args, Debug)]
pub struct DosArgs {
    /// CP2K .MOLog or output file, or a directory of such files (batch mode)
    pub input: PathBuf,

    /// Sigma of the Gaussian broadening in eV (FWHM = sigma * sqrt(8 ln 2))
    #[arg(long, default_value_t = DEFAULT_SIGMA)]
    pub sigma: f64,

    /// Energy grid spacing in eV
    #[arg(long, visible_alias = "delta-e", default_value_t = DEFAULT_DELTA_E)]
    pub delta: f64,

    /// Evaluate each Gaussian up to this many sigma
    #[arg(long, default_value_t = DEFAULT_NSIGMA)]
    pub nsigma: usize,

    /// Plot range [fermi - window, fermi + window] in eV (display only)
    #[arg(short, long, default_value_t = 3.0)]
    pub window: f64,

    /// Write the DOS of spin s to 'spin_<s>_<FILENAME>' (.csv for CSV, otherwise two columns)
    #[arg(long, value_name = "FILENAME")]
    pub tofile: Option<PathBuf>,

    /// Plot file (PNG or SVG)
    #[arg(long, default_value = "dos.png")]
    pub plot: PathBuf,

    /// Plot format (auto-detected from extension if not specified)
    #[arg(short, long, value_enum)]
    pub format: Option<PlotFormat>,

    /// Skip plot generation
    #[arg(long, default_value_t = false)]
    pub no_plot: bool,

    /// Figure width in pixels (for PNG) or points (for SVG)
    #[arg(long, default_value_t = 1000)]
    pub width: u32,

    /// Figure height in pixels (for PNG) or points (for SVG)
    #[arg(long, default_value_t = 1200)]
    pub height: u32,

    /// Shift all energies so that the Fermi level sits at 0 eV
    #[arg(long, default_value_t = false)]
    pub zero_fermi: bool,

    /// Refuse energy grids with more points than this
    #[arg(long, default_value_t = DEFAULT_MAX_POINTS)]
    pub max_points: usize,

    // ─────────────────────────────────────────────────────────────
    // 批量处理参数
    // ─────────────────────────────────────────────────────────────
    /// Glob pattern for input files (batch mode, comma separated)
    #[arg(long, default_value = DEFAULT_PATTERN)]
    pub pattern: String,

    /// Recurse into subdirectories (batch mode)
    #[arg(long, default_value_t = false)]
    pub recursive: bool,

    /// Number of parallel jobs (0 = auto, batch mode only)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,

    /// Output directory (batch mode)
    #[arg(short, long, default_value = "dos_output")]
    pub output_dir: PathBuf,

    /// Overwrite existing output files (batch mode)
    #[arg(long, default_value_t = false)]
    pub overwrite: bool,
}
