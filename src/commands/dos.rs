//! # dos 命令实现
//!
//! 从 CP2K 能级计算每个自旋通道的高斯展宽态密度。
//!
//! ## 功能
//! - 单文件：打印能级概要、计算 DOS、导出数据、绘图
//! - 目录：批量并行处理，每个文件写出 `<stem>_spin_<s>.dat`
//! - 可选将 Fermi 能级平移到 0 eV
//!
//! ## 依赖关系
//! - 使用 `cli/dos.rs` 定义的 DosArgs
//! - 使用 `dos/` 模块进行计算、导出与绘图
//! - 使用 `batch/` 模块进行批量处理
//! - 使用 `parsers/` 读取能级

use crate::batch::{BatchRunner, FileCollector, ProcessResult};
use crate::cli::dos::{DosArgs, PlotFormat};
use crate::dos::export;
use crate::dos::plot::{self, DosPlotOptions};
use crate::dos::{DosConfig, DosCurve, DosEngine};
use crate::error::{Cp2kDosError, Result};
use crate::models::Spectrum;
use crate::parsers;
use crate::utils::output;

use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tabled::{Table, Tabled};

/// DOS 概要行
#[derive(Debug, Clone, Tabled)]
struct DosRow {
    #[tabled(rename = "Spin")]
    spin: usize,
    #[tabled(rename = "Levels")]
    levels: usize,
    #[tabled(rename = "Grid points")]
    points: usize,
    #[tabled(rename = "E range (eV)")]
    range: String,
    #[tabled(rename = "∫DOS")]
    integral: String,
    #[tabled(rename = "Peak (eV)")]
    peak: String,
}

/// 执行 dos 命令
pub fn execute(args: DosArgs) -> Result<()> {
    output::print_header("Density of States from CP2K Energy Levels");

    if args.window <= 0.0 || !args.window.is_finite() {
        return Err(Cp2kDosError::InvalidArgument(format!(
            "window must be a positive number of eV, got {}",
            args.window
        )));
    }

    if args.input.is_file() {
        execute_single_file(&args)
    } else if args.input.is_dir() {
        execute_batch(&args)
    } else {
        Err(Cp2kDosError::FileNotFound {
            path: args.input.display().to_string(),
        })
    }
}

/// 由命令行参数构造展宽配置
fn build_config(args: &DosArgs) -> DosConfig {
    DosConfig::new(args.sigma, args.delta, args.nsigma).with_max_points(args.max_points)
}

/// 单文件模式
fn execute_single_file(args: &DosArgs) -> Result<()> {
    output::print_info(&format!("Single file mode: '{}'", args.input.display()));

    // 先检查配置，再读取文件
    let engine = DosEngine::new(build_config(args))?;
    output::print_info(&format!(
        "sigma = {} eV, deltaE = {} eV, Gaussian kernel of {} points",
        engine.config().sigma,
        engine.config().delta_e,
        engine.kernel().len()
    ));

    let mut spectrum = parsers::parse_spectrum_file(&args.input)?;
    println!("{}", spectrum);

    let fermi = prepare_spectrum(&mut spectrum, args.zero_fermi)?;
    if args.zero_fermi {
        output::print_info("Energies shifted so that the Fermi level is at 0 eV");
    }
    output::print_info(&format!("Fermi energy: {:.6} eV", fermi));

    let curves = compute_channels(&engine, &spectrum)?;

    // 概要表格
    let rows: Vec<DosRow> = curves
        .iter()
        .map(|(spin, curve)| summary_row(*spin, &spectrum, curve))
        .collect();
    println!("{}", Table::new(&rows));

    // 数据导出
    if let Some(tofile) = &args.tofile {
        for (spin, curve) in &curves {
            let path = spin_file_path(tofile, *spin);
            let header = dos_header(&args.input, engine.config(), *spin);
            export::save(curve, &header, &path)?;
            output::print_written(&format!("DOS of spin {}", spin), &path.display().to_string());
        }
    }

    // 绘图
    if !args.no_plot {
        let use_svg = use_svg(&args.plot, args.format);
        let title = format!(
            "DOS of {}",
            args.input
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("spectrum")
        );
        let options = DosPlotOptions {
            title,
            fermi,
            window: args.window,
            width: args.width,
            height: args.height,
            use_svg,
        };
        let refs: Vec<(usize, &DosCurve)> = curves.iter().map(|(s, c)| (*s, c)).collect();
        plot::generate_dos_plot(&refs, &spectrum.energies(), &args.plot, &options)?;
        output::print_written("Plot", &args.plot.display().to_string());
    }

    output::print_done(&format!(
        "Computed DOS for {} spin channel(s) of '{}'",
        curves.len(),
        args.input.display()
    ));

    Ok(())
}

/// 批量配置（各线程共享）
struct BatchDosConfig {
    engine: DosEngine,
    output_dir: PathBuf,
    zero_fermi: bool,
    overwrite: bool,
}

/// 批量处理模式
fn execute_batch(args: &DosArgs) -> Result<()> {
    output::print_info(&format!("Batch mode: directory '{}'", args.input.display()));

    let engine = DosEngine::new(build_config(args))?;

    let collector = FileCollector::new(args.input.clone())
        .with_pattern(&args.pattern)?
        .recursive(args.recursive);

    let files = collector.collect();

    if files.is_empty() {
        output::print_warning(&format!(
            "No matching files found with pattern '{}'",
            args.pattern
        ));
        return Ok(());
    }

    output::print_info(&format!("Found {} energy level files", files.len()));

    fs::create_dir_all(&args.output_dir)
        .map_err(|e| Cp2kDosError::write_error(&args.output_dir, e))?;

    let config = Arc::new(BatchDosConfig {
        engine,
        output_dir: args.output_dir.clone(),
        zero_fermi: args.zero_fermi,
        overwrite: args.overwrite,
    });

    let runner = BatchRunner::new(args.jobs);
    output::print_info(&format!("Using {} parallel job(s)", runner.jobs()));
    let result = runner.run(files, |file| process_batch_file(file, &config));

    output::print_separator();
    output::print_success(&format!(
        "Batch complete ({} files): {} success, {} skipped, {} failed",
        result.total(),
        result.success, result.skipped, result.failed
    ));

    if !result.failures.is_empty() {
        output::print_warning("Failed files:");
        for (path, err) in result.failures.iter().take(10) {
            output::print_error(&format!("  {}: {}", path, err));
        }
        if result.failures.len() > 10 {
            output::print_warning(&format!("  ... and {} more", result.failures.len() - 10));
        }
    }

    Ok(())
}

/// 处理批量模式中的单个文件
fn process_batch_file(input: &Path, config: &BatchDosConfig) -> ProcessResult {
    let input_str = input.display().to_string();
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("spectrum")
        .to_string();

    let first_output = config.output_dir.join(format!("{}_spin_0.dat", stem));
    if first_output.exists() && !config.overwrite {
        return ProcessResult::Skipped(format!("{} (output exists)", input_str));
    }

    let run = || -> Result<usize> {
        let mut spectrum = parsers::parse_spectrum_file(input)?;
        prepare_spectrum(&mut spectrum, config.zero_fermi)?;

        let mut written = 0;
        for (spin, levels) in spectrum.channels() {
            let curve = config.engine.compute(&levels.energies())?;
            let path = config.output_dir.join(format!("{}_spin_{}.dat", stem, spin));
            let header = dos_header(input, config.engine.config(), spin);
            export::save(&curve, &header, &path)?;
            written += 1;
        }
        Ok(written)
    };

    match run() {
        Ok(n) => ProcessResult::Success(format!("{} ({} spin channel(s))", input_str, n)),
        Err(e) => ProcessResult::Failed(input_str, e.to_string()),
    }
}

/// 解析共同 Fermi 能级，按需把能量零点移到 Fermi 能级；返回报告用的 Fermi 值
fn prepare_spectrum(spectrum: &mut Spectrum, zero_fermi: bool) -> Result<f64> {
    let fermi = spectrum.fermi().ok_or(Cp2kDosError::EmptyInput)?;
    if zero_fermi {
        spectrum.shift(-fermi);
        Ok(0.0)
    } else {
        Ok(fermi)
    }
}

/// 各自旋通道并行计算
fn compute_channels(engine: &DosEngine, spectrum: &Spectrum) -> Result<Vec<(usize, DosCurve)>> {
    let channels: Vec<_> = spectrum.channels().collect();
    channels
        .par_iter()
        .map(|(spin, levels)| engine.compute(&levels.energies()).map(|c| (*spin, c)))
        .collect()
}

fn summary_row(spin: usize, spectrum: &Spectrum, curve: &DosCurve) -> DosRow {
    let levels = spectrum.channel(spin).map(|l| l.len()).unwrap_or(0);
    let range = match (curve.energies.first(), curve.energies.last()) {
        (Some(lo), Some(hi)) => format!("{:.3} .. {:.3}", lo, hi),
        _ => "-".to_string(),
    };
    let peak = curve
        .peak()
        .map(|(e, d)| format!("{:.3} ({:.2})", e, d))
        .unwrap_or_else(|| "-".to_string());

    DosRow {
        spin,
        levels,
        points: curve.len(),
        range,
        integral: format!("{:.4}", curve.integral()),
        peak,
    }
}

/// `dir/NAME` -> `dir/spin_<s>_NAME`
fn spin_file_path(tofile: &Path, spin: usize) -> PathBuf {
    let name = tofile
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dos.dat".to_string());
    let file = format!("spin_{}_{}", spin, name);
    match tofile.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.join(file),
        _ => PathBuf::from(file),
    }
}

fn dos_header(input: &Path, config: &DosConfig, spin: usize) -> String {
    format!(
        "DOS from {}, sigma={}, nsigma={}, spin={}",
        input.display(),
        config.sigma,
        config.nsigma,
        spin
    )
}

/// 显式格式优先，否则按扩展名判断
fn use_svg(path: &Path, format: Option<PlotFormat>) -> bool {
    match format {
        Some(PlotFormat::Svg) => true,
        Some(PlotFormat::Png) => false,
        None => path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("svg"))
            .unwrap_or(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EnergyLevel, EnergyLevelSet};

    fn two_spin_spectrum() -> Spectrum {
        let up = EnergyLevelSet::new(
            vec![EnergyLevel::new(1, -1.0, 1.0), EnergyLevel::new(2, 1.0, 0.0)],
            0.5,
        );
        let down = EnergyLevelSet::new(vec![EnergyLevel::new(1, -0.5, 1.0)], 0.5);
        Spectrum::from_channels(vec![up, down])
    }

    #[test]
    fn test_spin_file_path() {
        assert_eq!(spin_file_path(Path::new("dos.dat"), 0), PathBuf::from("spin_0_dos.dat"));
        assert_eq!(
            spin_file_path(Path::new("out/dos.csv"), 1),
            PathBuf::from("out/spin_1_dos.csv")
        );
    }

    #[test]
    fn test_dos_header() {
        let config = DosConfig::new(0.075, 0.001, 10);
        let header = dos_header(Path::new("run.MOLog"), &config, 1);
        assert_eq!(header, "DOS from run.MOLog, sigma=0.075, nsigma=10, spin=1");
    }

    #[test]
    fn test_use_svg() {
        assert!(use_svg(Path::new("dos.SVG"), None));
        assert!(!use_svg(Path::new("dos.png"), None));
        assert!(!use_svg(Path::new("dos.svg"), Some(PlotFormat::Png)));
        assert!(use_svg(Path::new("dos"), Some(PlotFormat::Svg)));
    }

    #[test]
    fn test_prepare_spectrum_zero_fermi() {
        let mut spectrum = two_spin_spectrum();
        let fermi = prepare_spectrum(&mut spectrum, true).unwrap();
        assert_eq!(fermi, 0.0);
        let up = spectrum.channel(0).unwrap();
        assert!((up.levels()[0].energy + 1.5).abs() < 1e-12);
        assert!((up.levels()[1].energy - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_prepare_spectrum_keeps_energies() {
        let mut spectrum = two_spin_spectrum();
        let fermi = prepare_spectrum(&mut spectrum, false).unwrap();
        assert!((fermi - 0.5).abs() < 1e-12);
        assert!((spectrum.channel(1).unwrap().levels()[0].energy + 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_compute_channels() {
        let spectrum = two_spin_spectrum();
        let engine = DosEngine::new(DosConfig::new(0.1, 0.01, 4)).unwrap();
        let curves = compute_channels(&engine, &spectrum).unwrap();

        assert_eq!(curves.len(), 2);
        assert_eq!(curves[0].0, 0);
        assert_eq!(curves[1].0, 1);
        assert!((curves[0].1.integral() - 2.0).abs() < 1e-2);
        assert!((curves[1].1.integral() - 1.0).abs() < 1e-2);

        let row = summary_row(0, &spectrum, &curves[0].1);
        assert_eq!(row.levels, 2);
        assert_eq!(row.points, curves[0].1.len());
    }
}
