//! CSV ingest of raw tensile-test measurements.
//!
//! This module turns a two-column measurement export into a normalized
//! [`Curve`]. Lab software writes these files with whatever conventions the
//! machine was configured for, so we:
//! - sniff the delimiter (`;`, `,`, tab, `|`, space) from the first lines
//! - skip a header row if the first non-empty record is not fully numeric
//! - accept a decimal comma when the delimiter is not a comma
//!
//! The schema itself is strict: every data row has exactly two columns.

use std::path::Path;

use csv::StringRecord;

use crate::domain::{Curve, CurvePoint};
use crate::error::AppError;
use crate::material::normalize;

/// Delimiters tried in priority order.
const DELIMITER_CANDIDATES: [u8; 5] = [b';', b',', b'\t', b'|', b' '];

/// Number of leading lines inspected by the sniffer.
const SNIFF_LINES: usize = 10;

/// Resolved layout of an input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvLayout {
    pub delimiter: u8,
    pub has_header: bool,
}

/// Load a curve file and zero-offset it.
pub fn load_curve(path: &Path) -> Result<Curve, AppError> {
    let raw = read_raw_table(path)?;
    let curve = normalize(&raw)?;
    log::info!("Loaded {} samples from {}", curve.len(), path.display());
    Ok(curve)
}

/// Read the raw two-column table without normalization.
pub fn read_raw_table(path: &Path) -> Result<Vec<CurvePoint>, AppError> {
    if !path.is_file() {
        return Err(AppError::File {
            path: path.to_path_buf(),
        });
    }

    let text = std::fs::read_to_string(path)
        .map_err(|e| AppError::Io(format!("Failed to read '{}': {e}", path.display())))?;
    parse_table(&text)
}

/// Parse a two-column table from text.
pub fn parse_table(text: &str) -> Result<Vec<CurvePoint>, AppError> {
    let text = text.trim_start_matches('\u{feff}');
    let layout = sniff_layout(text);
    log::debug!(
        "CSV layout: delimiter={:?} header={}",
        layout.delimiter as char,
        layout.has_header
    );

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(layout.delimiter)
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut points = Vec::new();
    let mut header_pending = layout.has_header;
    for (idx, result) in reader.records().enumerate() {
        let record = result.map_err(|e| AppError::Parse {
            line: e.position().map_or(idx + 1, |p| p.line() as usize),
            reason: format!("CSV parse error: {e}"),
        })?;
        let line = record.position().map_or(idx + 1, |p| p.line() as usize);

        let fields = significant_fields(&record, layout.delimiter);
        if fields.is_empty() {
            continue;
        }
        if header_pending {
            header_pending = false;
            log::debug!("Skipping header row: {}", fields.join(" | "));
            continue;
        }
        if fields.len() != 2 {
            return Err(AppError::Data { columns: fields.len() });
        }

        let strain = parse_number(fields[0], layout.delimiter, line)?;
        let stress = parse_number(fields[1], layout.delimiter, line)?;
        points.push(CurvePoint::new(strain, stress));
    }

    if points.is_empty() {
        return Err(AppError::NoSamples);
    }
    Ok(points)
}

/// Detect delimiter and header from the first few non-empty lines.
pub fn sniff_layout(text: &str) -> CsvLayout {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .take(SNIFF_LINES)
        .collect();

    // Judge consistency on the data lines; the first line may be a header.
    let body = if lines.len() > 1 { &lines[1..] } else { &lines[..] };

    let delimiter = DELIMITER_CANDIDATES
        .iter()
        .copied()
        .find(|&d| {
            let counts: Vec<usize> = body.iter().map(|l| field_count(l, d)).collect();
            counts.first().is_some_and(|&c| c > 1 && counts.iter().all(|&n| n == c))
        })
        .unwrap_or(b',');

    let has_header = lines
        .first()
        .map(|l| {
            split_fields(l, delimiter)
                .iter()
                .any(|f| parse_decimal(f, delimiter).is_none())
        })
        .unwrap_or(false);

    CsvLayout { delimiter, has_header }
}

fn field_count(line: &str, delimiter: u8) -> usize {
    split_fields(line, delimiter).len()
}

fn split_fields(line: &str, delimiter: u8) -> Vec<&str> {
    let parts = line.split(delimiter as char).map(str::trim);
    if is_whitespace_delimiter(delimiter) {
        parts.filter(|f| !f.is_empty()).collect()
    } else {
        parts.collect()
    }
}

fn significant_fields(record: &StringRecord, delimiter: u8) -> Vec<&str> {
    let mut fields: Vec<&str> = record.iter().collect();
    if is_whitespace_delimiter(delimiter) {
        fields.retain(|f| !f.is_empty());
    } else {
        // A trailing delimiter produces one empty field; it is not a column.
        while fields.last().is_some_and(|f| f.is_empty()) {
            fields.pop();
        }
    }
    fields
}

fn is_whitespace_delimiter(delimiter: u8) -> bool {
    delimiter == b' ' || delimiter == b'\t'
}

fn parse_number(field: &str, delimiter: u8, line: usize) -> Result<f64, AppError> {
    parse_decimal(field, delimiter).ok_or_else(|| AppError::Parse {
        line,
        reason: format!("'{field}' is not a finite number"),
    })
}

fn parse_decimal(field: &str, delimiter: u8) -> Option<f64> {
    let field = field.trim().trim_matches('"');
    let value = if delimiter != b',' && field.contains(',') {
        field.replace(',', ".").parse::<f64>().ok()
    } else {
        field.parse::<f64>().ok()
    };
    value.filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn semicolon_with_header_and_decimal_comma() {
        let text = "Dehnung;Spannung\n0,01;5,0\n0,011;205,5\n0,012;215,0\n";
        let layout = sniff_layout(text);
        assert_eq!(layout, CsvLayout { delimiter: b';', has_header: true });

        let points = parse_table(text).unwrap();
        assert_eq!(points.len(), 3);
        assert!((points[1].strain - 0.011).abs() < 1e-12);
        assert!((points[1].stress - 205.5).abs() < 1e-12);
    }

    #[test]
    fn comma_without_header() {
        let text = "0.0,0.0\n0.001,200.0\n0.002,300.0\n";
        assert_eq!(sniff_layout(text), CsvLayout { delimiter: b',', has_header: false });
        assert_eq!(parse_table(text).unwrap().len(), 3);
    }

    #[test]
    fn tab_separated_values() {
        let text = "strain\tstress\n0\t0\n0.001\t210\n";
        let layout = sniff_layout(text);
        assert_eq!(layout.delimiter, b'\t');
        assert!(layout.has_header);
        let points = parse_table(text).unwrap();
        assert_eq!(points[1], CurvePoint::new(0.001, 210.0));
    }

    #[test]
    fn three_columns_is_a_data_error() {
        let text = "0.0,0.0,1\n0.001,200.0,1\n0.002,300.0,1\n";
        match parse_table(text) {
            Err(AppError::Data { columns }) => assert_eq!(columns, 3),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn garbage_value_reports_line() {
        let text = "0.0,0.0\n0.001,abc\n0.002,300.0\n";
        match parse_table(text) {
            Err(AppError::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn header_after_blank_line_is_skipped() {
        let points = parse_table("   \nstrain;stress\n0;0\n0,001;200\n").unwrap();
        assert_eq!(points, vec![CurvePoint::new(0.0, 0.0), CurvePoint::new(0.001, 200.0)]);
    }

    #[test]
    fn parse_error_reports_file_line() {
        match parse_table("0;0\n\n\n0,001;abc\n") {
            Err(AppError::Parse { line, .. }) => assert_eq!(line, 4),
            other => panic!("unexpected result: {other:?}"),
        }
        match parse_table("strain;stress\n\n0;0\n0,001;x\n") {
            Err(AppError::Parse { line, .. }) => assert_eq!(line, 4),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_a_file_error() {
        let path = std::env::temp_dir().join("flow_curves_definitely_missing.csv");
        match load_curve(&path) {
            Err(AppError::File { path: p }) => assert_eq!(p, path),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn load_curve_normalizes_to_origin() {
        let path = std::env::temp_dir().join(format!("flow_curves_ingest_{}.csv", std::process::id()));
        std::fs::write(&path, "strain;stress\n0.5;10\n0.6;210\n").unwrap();
        let curve = load_curve(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(curve.points()[0], CurvePoint::new(0.0, 0.0));
        assert!((curve.strain(1) - 0.1).abs() < 1e-12);
        assert!((curve.stress(1) - 200.0).abs() < 1e-12);
    }

    #[test]
    fn header_only_has_no_samples() {
        assert!(matches!(parse_table("strain;stress\n"), Err(AppError::NoSamples)));
    }
}
