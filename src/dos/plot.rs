//! # DOS 图表生成
//!
//! 使用 `plotters` 绘制态密度：横轴为 DOS，纵轴为能量 (eV)。
//!
//! ## 内容
//! - 每个自旋通道一条曲线
//! - Fermi 能级虚线
//! - 离散能级以标记点画在 DOS = 0 处
//! - 纵轴范围 [fermi - window, fermi + window]，只影响显示
//!
//! ## 依赖关系
//! - 被 `commands/dos.rs` 调用
//! - 使用 `dos/engine.rs` 的 DosCurve

use crate::dos::DosCurve;
use crate::error::{Cp2kDosError, Result};

use plotters::prelude::*;
use std::path::Path;

/// 自旋通道曲线颜色
const SPIN_COLORS: [RGBColor; 4] = [
    RGBColor(0, 102, 204),
    RGBColor(204, 51, 0),
    RGBColor(0, 153, 76),
    RGBColor(153, 51, 153),
];

/// 绘图参数
#[derive(Debug, Clone)]
pub struct DosPlotOptions {
    pub title: String,
    /// Fermi 能级 (eV)
    pub fermi: f64,
    /// 显示窗口半宽 (eV)
    pub window: f64,
    pub width: u32,
    pub height: u32,
    pub use_svg: bool,
}

/// 生成 DOS 图表
pub fn generate_dos_plot(
    curves: &[(usize, &DosCurve)],
    levels: &[f64],
    output_path: &Path,
    options: &DosPlotOptions,
) -> Result<()> {
    if curves.iter().all(|(_, curve)| curve.is_empty()) {
        return Err(Cp2kDosError::PlotError("no DOS data to plot".to_string()));
    }

    if options.use_svg {
        let root = SVGBackend::new(output_path, (options.width, options.height)).into_drawing_area();
        draw_dos_chart(&root, curves, levels, options)?;
        root.present()
            .map_err(|e| Cp2kDosError::PlotError(e.to_string()))?;
    } else {
        let root =
            BitMapBackend::new(output_path, (options.width, options.height)).into_drawing_area();
        draw_dos_chart(&root, curves, levels, options)?;
        root.present()
            .map_err(|e| Cp2kDosError::PlotError(e.to_string()))?;
    }
    Ok(())
}

/// 绘制图表的核心逻辑
fn draw_dos_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    curves: &[(usize, &DosCurve)],
    levels: &[f64],
    options: &DosPlotOptions,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)
        .map_err(|e| Cp2kDosError::PlotError(format!("{:?}", e)))?;

    let e_min = options.fermi - options.window;
    let e_max = options.fermi + options.window;

    let windowed: Vec<(usize, Vec<(f64, f64)>)> = curves
        .iter()
        .map(|(spin, curve)| (*spin, curve.window(e_min, e_max)))
        .collect();

    let dos_max = windowed
        .iter()
        .flat_map(|(_, pts)| pts.iter().map(|(_, d)| *d))
        .fold(0.0_f64, f64::max);
    let x_max = if dos_max > 0.0 { dos_max * 1.05 } else { 1.0 };

    let mut chart = ChartBuilder::on(root)
        .caption(&options.title, ("sans-serif", 28).into_font())
        .margin(30)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..x_max, e_min..e_max)
        .map_err(|e| Cp2kDosError::PlotError(format!("{:?}", e)))?;

    chart
        .configure_mesh()
        .x_desc("DOS (states/eV)")
        .y_desc("E (eV)")
        .x_label_style(("sans-serif", 16))
        .y_label_style(("sans-serif", 16))
        .axis_desc_style(("sans-serif", 18))
        .draw()
        .map_err(|e| Cp2kDosError::PlotError(format!("{:?}", e)))?;

    for (i, (spin, points)) in windowed.iter().enumerate() {
        let color = SPIN_COLORS[i % SPIN_COLORS.len()];
        chart
            .draw_series(LineSeries::new(
                points.iter().map(|(e, d)| (*d, *e)),
                color.stroke_width(2),
            ))
            .map_err(|e| Cp2kDosError::PlotError(format!("{:?}", e)))?
            .label(format!("spin {}", spin))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }

    // Fermi 能级虚线
    chart
        .draw_series(
            dashed_segments(0.0, x_max, 40)
                .into_iter()
                .map(|(a, b)| {
                    PathElement::new(vec![(a, options.fermi), (b, options.fermi)], BLACK.stroke_width(1))
                }),
        )
        .map_err(|e| Cp2kDosError::PlotError(format!("{:?}", e)))?;

    // 离散能级
    chart
        .draw_series(
            levels
                .iter()
                .filter(|e| **e >= e_min && **e <= e_max)
                .map(|e| Circle::new((0.0, *e), 3, RED.filled())),
        )
        .map_err(|e| Cp2kDosError::PlotError(format!("{:?}", e)))?;

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .position(SeriesLabelPosition::UpperRight)
        .label_font(("sans-serif", 14))
        .draw()
        .map_err(|e| Cp2kDosError::PlotError(format!("{:?}", e)))?;

    Ok(())
}

/// 将 [from, to] 等分为 n 段，取偶数段作为虚线
fn dashed_segments(from: f64, to: f64, n: usize) -> Vec<(f64, f64)> {
    let step = (to - from) / n as f64;
    (0..n)
        .step_by(2)
        .map(|i| (from + i as f64 * step, from + (i + 1) as f64 * step))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_curves_rejected() {
        let empty = DosCurve {
            energies: Vec::new(),
            density: Vec::new(),
            delta_e: 0.01,
        };
        let options = DosPlotOptions {
            title: "empty".to_string(),
            fermi: 0.0,
            window: 1.0,
            width: 100,
            height: 100,
            use_svg: true,
        };
        let err = generate_dos_plot(&[(0, &empty)], &[], Path::new("unused.svg"), &options)
            .unwrap_err();
        assert!(matches!(err, Cp2kDosError::PlotError(_)));
        assert!(!Path::new("unused.svg").exists());
    }

    #[test]
    fn test_dashed_segments() {
        let segs = dashed_segments(0.0, 1.0, 10);
        assert_eq!(segs.len(), 5);
        assert!((segs[0].1 - 0.1).abs() < 1e-12);
        assert!((segs[4].0 - 0.8).abs() < 1e-12);
    }
}
