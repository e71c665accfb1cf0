//! Text rendering for estimates, importances, the location map and the
//! laboratory scatter plot
//!
//! Builders return plain strings; the CLI layer decides about color.

use crate::experiment::PredictionPair;

/// California bounding box used by the ASCII map.
const LAT_RANGE: (f64, f64) = (32.3, 42.2);
const LON_RANGE: (f64, f64) = (-124.6, -114.0);

const MAP_WIDTH: usize = 42;
const MAP_HEIGHT: usize = 13;

const PLOT_WIDTH: usize = 44;
const PLOT_HEIGHT: usize = 16;

/// Reference cities drawn on the map.
const CITIES: [(&str, f64, f64); 5] = [
    ("San Francisco", 37.77, -122.42),
    ("Sacramento", 38.58, -121.49),
    ("Fresno", 36.75, -119.77),
    ("Los Angeles", 34.05, -118.24),
    ("San Diego", 32.72, -117.16),
];

/// Format a dollar amount with thousands separators, two decimals.
pub fn format_currency(value: f64) -> String {
    let negative = value < 0.0;
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let frac = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    format!(
        "{}${}.{:02}",
        if negative { "-" } else { "" },
        grouped,
        frac
    )
}

/// Horizontal bar chart of (label, importance) pairs, already sorted.
pub fn importance_chart(ranked: &[(&str, f64)]) -> String {
    let max = ranked
        .iter()
        .map(|(_, v)| *v)
        .fold(f64::MIN, f64::max)
        .max(f64::EPSILON);

    let bar_width = 28usize;
    let mut out = String::new();
    for (label, value) in ranked {
        let filled = ((value / max) * bar_width as f64).round() as usize;
        out.push_str(&format!(
            "  {:<22} {:<bar_width$} {:.3}\n",
            label,
            "█".repeat(filled.min(bar_width)),
            value,
        ));
    }
    out
}

/// ASCII map of California with reference cities and the entered location.
///
/// The marker is clamped to the bounding box; a note is appended when the
/// coordinates fall outside it.
pub fn california_map(latitude: f64, longitude: f64) -> String {
    let mut grid = vec![vec![' '; MAP_WIDTH]; MAP_HEIGHT];

    for (_, lat, lon) in &CITIES {
        let (row, col) = to_cell(*lat, *lon);
        grid[row][col] = '•';
    }

    let out_of_bounds = !(LAT_RANGE.0..=LAT_RANGE.1).contains(&latitude)
        || !(LON_RANGE.0..=LON_RANGE.1).contains(&longitude);
    let (row, col) = to_cell(latitude, longitude);
    grid[row][col] = '◉';

    let mut out = String::new();
    out.push_str(&format!("  ┌{}┐\n", "─".repeat(MAP_WIDTH)));
    for (i, line) in grid.iter().enumerate() {
        let label = match i {
            0 => format!(" {:.1}°N", LAT_RANGE.1),
            _ if i == MAP_HEIGHT - 1 => format!(" {:.1}°N", LAT_RANGE.0),
            _ => String::new(),
        };
        out.push_str(&format!(
            "  │{}│{}\n",
            line.iter().collect::<String>(),
            label
        ));
    }
    out.push_str(&format!("  └{}┘\n", "─".repeat(MAP_WIDTH)));
    out.push_str(&format!(
        "   {:.1}°W{}{:.1}°W\n",
        -LON_RANGE.0,
        " ".repeat(MAP_WIDTH.saturating_sub(12)),
        -LON_RANGE.1
    ));
    out.push_str(&format!(
        "   ◉ entered location ({:.2}, {:.2})   • reference cities\n",
        latitude, longitude
    ));
    if out_of_bounds {
        out.push_str("   note: coordinates outside California, marker clamped\n");
    }
    out
}

fn to_cell(latitude: f64, longitude: f64) -> (usize, usize) {
    let lat = latitude.clamp(LAT_RANGE.0, LAT_RANGE.1);
    let lon = longitude.clamp(LON_RANGE.0, LON_RANGE.1);

    // Row 0 is the northern edge
    let row_f = (LAT_RANGE.1 - lat) / (LAT_RANGE.1 - LAT_RANGE.0) * (MAP_HEIGHT - 1) as f64;
    let col_f = (lon - LON_RANGE.0) / (LON_RANGE.1 - LON_RANGE.0) * (MAP_WIDTH - 1) as f64;
    (row_f.round() as usize, col_f.round() as usize)
}

/// Scatter of actual vs predicted prices ($100k units) with an identity line.
pub fn scatter_plot(pairs: &[PredictionPair]) -> String {
    if pairs.is_empty() {
        return String::from("  (no held-out points)\n");
    }

    let mut lo = f64::MAX;
    let mut hi = f64::MIN;
    for p in pairs {
        lo = lo.min(p.actual).min(p.predicted);
        hi = hi.max(p.actual).max(p.predicted);
    }
    if hi - lo < 1e-9 {
        hi = lo + 1.0;
    }
    let span = hi - lo;

    let mut grid = vec![vec![' '; PLOT_WIDTH]; PLOT_HEIGHT];

    // Identity line first, points on top
    for col in 0..PLOT_WIDTH {
        let value = lo + span * col as f64 / (PLOT_WIDTH - 1) as f64;
        let row = value_to_row(value, lo, span);
        grid[row][col] = '·';
    }
    for p in pairs {
        let col_f = (p.actual - lo) / span * (PLOT_WIDTH - 1) as f64;
        let col = col_f.round() as usize;
        let row = value_to_row(p.predicted, lo, span);
        grid[row][col] = 'o';
    }

    let mut out = String::new();
    out.push_str("  predicted ($100k)\n");
    out.push_str(&format!("  {:>5.1} ┤{}\n", hi, grid[0].iter().collect::<String>()));
    for line in grid.iter().take(PLOT_HEIGHT - 1).skip(1) {
        out.push_str(&format!("        │{}\n", line.iter().collect::<String>()));
    }
    out.push_str(&format!(
        "  {:>5.1} ┤{}\n",
        lo,
        grid[PLOT_HEIGHT - 1].iter().collect::<String>()
    ));
    out.push_str(&format!("        └{}\n", "─".repeat(PLOT_WIDTH)));
    out.push_str(&format!(
        "        {:<8.1}{}{:>8.1}  actual ($100k)\n",
        lo,
        " ".repeat(PLOT_WIDTH.saturating_sub(16)),
        hi
    ));
    out
}

fn value_to_row(value: f64, lo: f64, span: f64) -> usize {
    // Row 0 is the top of the plot
    let norm = ((value - lo) / span).clamp(0.0, 1.0);
    ((1.0 - norm) * (PLOT_HEIGHT - 1) as f64).round() as usize
}
