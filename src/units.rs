use serde::{Deserialize, Serialize};

pub const MM_PER_INCH: f64 = 25.4;
pub const POINTS_PER_INCH: f64 = 72.0;
pub const DEFAULT_DPI: u32 = 203;

/// Millimeters to PDF user-space points.
pub fn mm_to_points(mm: f64) -> f64 {
    mm / MM_PER_INCH * POINTS_PER_INCH
}

/// Millimeters to printer dots at `dpi`, rounded to the nearest dot.
pub fn mm_to_dots(mm: f64, dpi: u32) -> i64 {
    (mm / MM_PER_INCH * dpi as f64).round() as i64
}

/// How prices are written on a label. Defaults to Argentine peso style
/// (`$ 58.999,00`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CurrencyFormat {
    pub symbol: String,
    pub thousands_separator: char,
    pub decimal_separator: char,
    pub fraction_digits: usize,
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        Self {
            symbol: "$".to_string(),
            thousands_separator: '.',
            decimal_separator: ',',
            fraction_digits: 2,
        }
    }
}

/// Placeholder written when there is no amount to show.
pub const MISSING_AMOUNT: &str = "-";

/// Format an amount for display. `None` and NaN become [`MISSING_AMOUNT`].
pub fn format_currency(value: Option<f64>, format: &CurrencyFormat) -> String {
    let Some(value) = value.filter(|v| v.is_finite()) else {
        return MISSING_AMOUNT.to_string();
    };

    let fixed = format!("{:.*}", format.fraction_digits, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(format.thousands_separator);
        }
        grouped.push(ch);
    }
    if let Some(frac) = frac_part {
        grouped.push(format.decimal_separator);
        grouped.push_str(frac);
    }

    let sign = if value < 0.0 && value.abs() >= 0.5 * 10f64.powi(-(format.fraction_digits as i32)) {
        "-"
    } else {
        ""
    };
    format!("{sign}{} {grouped}", format.symbol)
}
