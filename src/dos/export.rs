//! # DOS 数据导出
//!
//! ## 支持格式
//! - DAT: 注释头 + 每个网格点一行 `<energy> <density>`
//! - CSV: `energy_ev,density` 两列
//!
//! ## 依赖关系
//! - 被 `commands/dos.rs` 调用
//! - 使用 `dos/engine.rs` 的 DosCurve
//! - 使用 `csv` 库写入 CSV 文件

use crate::dos::DosCurve;
use crate::error::{Cp2kDosError, Result};

use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// 导出文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DosFileFormat {
    Dat,
    Csv,
}

impl DosFileFormat {
    /// 从文件扩展名推断格式
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_lowercase())
            .as_deref()
        {
            Some("csv") => DosFileFormat::Csv,
            _ => DosFileFormat::Dat,
        }
    }
}

#[derive(Serialize)]
struct DosRow {
    energy_ev: f64,
    density: f64,
}

/// 写出两列文本
pub fn write_dat<W: Write>(writer: &mut W, curve: &DosCurve, header: &str) -> std::io::Result<()> {
    writeln!(writer, "# {}", header.trim())?;
    for (energy, density) in curve.points() {
        writeln!(writer, "{:.6} {:.8e}", energy, density)?;
    }
    Ok(())
}

/// 写出 CSV，`output_path` 用于错误信息
pub fn write_csv<W: Write>(writer: W, curve: &DosCurve, output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for (energy_ev, density) in curve.points() {
        wtr.serialize(DosRow { energy_ev, density })?;
    }
    wtr.flush()
        .map_err(|e| Cp2kDosError::write_error(output_path, e))
}

/// 按扩展名保存 DOS 曲线
pub fn save(curve: &DosCurve, header: &str, output_path: &Path) -> Result<()> {
    let file = File::create(output_path).map_err(|e| Cp2kDosError::write_error(output_path, e))?;
    let mut writer = BufWriter::new(file);

    match DosFileFormat::from_path(output_path) {
        DosFileFormat::Csv => write_csv(writer, curve, output_path),
        DosFileFormat::Dat => {
            write_dat(&mut writer, curve, header)
                .and_then(|_| writer.flush())
                .map_err(|e| Cp2kDosError::write_error(output_path, e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_curve() -> DosCurve {
        DosCurve {
            energies: vec![-0.01, 0.0, 0.01],
            density: vec![0.5, 1.0, 0.5],
            delta_e: 0.01,
        }
    }

    #[test]
    fn test_write_dat() {
        let mut buf = Vec::new();
        write_dat(&mut buf, &sample_curve(), "DOS from test, spin=0\n").unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "# DOS from test, spin=0");

        let cols: Vec<f64> = lines[2]
            .split_whitespace()
            .map(|x| x.parse().unwrap())
            .collect();
        assert_eq!(cols.len(), 2);
        assert!(cols[0].abs() < 1e-12);
        assert!((cols[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_write_csv() {
        let mut buf = Vec::new();
        write_csv(&mut buf, &sample_curve(), Path::new("dos.csv")).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "energy_ev,density");
        assert_eq!(lines.len(), 4);
    }

    /// 总是写入失败的输出
    struct BrokenWriter;

    impl Write for BrokenWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_csv_write_failure_keeps_path() {
        let err = write_csv(BrokenWriter, &sample_curve(), Path::new("out/dos.csv")).unwrap_err();
        match err {
            Cp2kDosError::FileWriteError { path, .. } => assert_eq!(path, "out/dos.csv"),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(DosFileFormat::from_path(Path::new("dos.CSV")), DosFileFormat::Csv);
        assert_eq!(DosFileFormat::from_path(Path::new("dos.dat")), DosFileFormat::Dat);
        assert_eq!(DosFileFormat::from_path(Path::new("dos")), DosFileFormat::Dat);
    }
}
