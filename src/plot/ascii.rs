//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - measured plastic branch: `o`
//! - fitted/extrapolated flow curve: `-` line

use crate::domain::{CurveFile, ExtrapolatedCurve, PlasticCurve};

/// Render the measured plastic branch over the extrapolated flow curve.
pub fn render_flow_plot(plastic: &PlasticCurve, fitted: &ExtrapolatedCurve, width: usize, height: usize) -> String {
    let measured: Vec<(f64, f64)> = plastic.curve.points().iter().map(|p| (p.strain, p.stress)).collect();
    let curve: Vec<(f64, f64)> = fitted.strain.iter().copied().zip(fitted.stress.iter().copied()).collect();
    render_plot(&measured, &curve, width, height)
}

/// Render a plot from a saved curve JSON file (curve only, no overlay points).
pub fn render_curve_file(curve: &CurveFile, width: usize, height: usize) -> String {
    let points: Vec<(f64, f64)> = curve
        .grid
        .strain
        .iter()
        .copied()
        .zip(curve.grid.stress.iter().copied())
        .collect();
    render_plot(&[], &points, width, height)
}

fn render_plot(measured: &[(f64, f64)], curve: &[(f64, f64)], width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let all = || measured.iter().chain(curve);
    let (x_min, x_max) = range(all().map(|p| p.0)).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = range(all().map(|p| p.1)).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Draw curve first (so points can overlay).
    draw_curve(&mut grid, curve, (x_min, x_max), (y_min, y_max));

    for &(x, y) in measured {
        if !(x.is_finite() && y.is_finite()) {
            continue;
        }
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        grid[row][col] = 'o';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: plastic strain=[{x_min:.4}, {x_max:.4}] | true stress=[{y_min:.2}, {y_max:.2}]\n"
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out
}

fn range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let (min, max) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    (min.is_finite() && max > min).then_some((min, max))
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], x_range: (f64, f64), y_range: (f64, f64)) {
    if curve.len() < 2 {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in curve {
        if !(x.is_finite() && y.is_finite()) {
            continue;
        }
        let col = map_x(x, x_range.0, x_range.1, width);
        let row = map_y(y, y_range.0, y_range.1, height);
        if let Some((c0, r0)) = prev {
            draw_line(grid, c0, r0, col, row, '-');
        } else {
            grid[row][col] = '-';
        }
        prev = Some((col, row));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Curve, FitModel, VoceParams};

    #[test]
    fn plot_golden_snapshot_small() {
        let plastic = PlasticCurve {
            offset: 3,
            curve: Curve::from_pairs(&[(0.0, 300.0), (1.0, 400.0)]),
        };
        let fitted = ExtrapolatedCurve {
            strain: vec![0.0, 1.0],
            stress: vec![300.0, 300.0],
            model: FitModel::Voce(VoceParams { sigma: 300.0, r: 0.0, b: 1.0 }),
        };

        let txt = render_flow_plot(&plastic, &fitted, 10, 5);
        let expected = concat!(
            "Plot: plastic strain=[0.0000, 1.0000] | true stress=[295.00, 405.00]\n",
            "         o\n",
            "          \n",
            "          \n",
            "          \n",
            "o---------\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn degenerate_curve_still_renders() {
        let fitted = ExtrapolatedCurve {
            strain: vec![0.0, 0.0],
            stress: vec![f64::NAN, 300.0],
            model: FitModel::Voce(VoceParams { sigma: 300.0, r: 0.0, b: 1.0 }),
        };
        let plastic = PlasticCurve {
            offset: 0,
            curve: Curve::from_pairs(&[]),
        };
        let txt = render_flow_plot(&plastic, &fitted, 12, 6);
        assert_eq!(txt.lines().count(), 7);
        assert!(txt.lines().skip(1).all(|l| l.chars().count() == 12));
    }
}
