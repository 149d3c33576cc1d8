//! Label encoders.
//!
//! All three output formats share [`walk_cell`], which resolves the field
//! boxes for a cell and emits the visible fields in a fixed order into a
//! format-specific [`FieldSink`].

mod pdf;
mod tspl;
mod zpl;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::fields::{FieldLayout, resolve_positions};
use crate::model::{FieldConfig, FieldKey, FieldPosition, PlacedCell, Product};
use crate::units::{CurrencyFormat, DEFAULT_DPI, format_currency};

pub use pdf::{PdfOptions, render_pdf};
pub use tspl::{TsplOptions, render_tspl};
pub use zpl::{ZplOptions, render_zpl};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Pdf,
    Zpl,
    Tspl,
}

impl OutputFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Pdf => "application/pdf",
            OutputFormat::Zpl | OutputFormat::Tspl => "text/plain",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Pdf => "pdf",
            OutputFormat::Zpl => "zpl",
            OutputFormat::Tspl => "tspl",
        }
    }

    fn valid_until_prefix(self) -> &'static str {
        match self {
            OutputFormat::Pdf => "Validez: ",
            OutputFormat::Zpl | OutputFormat::Tspl => "Val: ",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pdf" => Ok(OutputFormat::Pdf),
            "zpl" => Ok(OutputFormat::Zpl),
            "tspl" => Ok(OutputFormat::Tspl),
            other => Err(format!("unknown output format {other:?} (expected pdf, zpl or tspl)")),
        }
    }
}

/// Everything the encoders need besides the layout and field config.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderConfig {
    /// Printer resolution for ZPL and TSPL coordinates.
    pub dpi: u32,
    pub currency: CurrencyFormat,
    pub field_layout: FieldLayout,
    pub pdf: PdfOptions,
    pub zpl: ZplOptions,
    pub tspl: TsplOptions,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_DPI,
            currency: CurrencyFormat::default(),
            field_layout: FieldLayout::default(),
            pdf: PdfOptions::default(),
            zpl: ZplOptions::default(),
            tspl: TsplOptions::default(),
        }
    }
}

/// Receives the blocks of one label cell, in emission order.
pub(crate) trait FieldSink {
    fn frame(&mut self, cell: &PlacedCell);
    fn text(&mut self, cell: &PlacedCell, field: FieldKey, rect: &FieldPosition, text: &str);
    fn barcode(&mut self, cell: &PlacedCell, rect: &FieldPosition, value: &str);
}

/// Emit one cell: frame, then description, product code, price, promo price,
/// unit, validity and barcode, each only when visible and (for promo and
/// validity) present on the product.
pub(crate) fn walk_cell(
    cell: &PlacedCell,
    fields: &FieldConfig,
    config: &RenderConfig,
    format: OutputFormat,
    sink: &mut impl FieldSink,
) {
    let positions = resolve_positions(
        fields.positions.as_ref(),
        &config.field_layout,
        cell.width,
        cell.height,
    );

    sink.frame(cell);
    for key in FieldKey::ALL {
        if !fields.is_visible(key) {
            continue;
        }
        let rect = positions.get(key);
        if key == FieldKey::Barcode {
            sink.barcode(cell, rect, &cell.product.barcode);
        } else if let Some(text) = field_text(key, cell.product, &config.currency, format) {
            sink.text(cell, key, rect, &text);
        }
    }
}

fn field_text(
    key: FieldKey,
    product: &Product,
    currency: &CurrencyFormat,
    format: OutputFormat,
) -> Option<String> {
    match key {
        FieldKey::Description => Some(product.description.clone()),
        FieldKey::ProductCode => Some(format!("Cod: {}", product.product_code)),
        FieldKey::Price => Some(format_currency(Some(product.price), currency)),
        FieldKey::PromoPrice => product
            .promo_price
            .map(|promo| format!("Promo: {}", format_currency(Some(promo), currency))),
        FieldKey::Unit => Some(format!("Unidad: {}", product.unit)),
        FieldKey::ValidUntil => product
            .valid_until
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .map(|v| format!("{}{v}", format.valid_until_prefix())),
        FieldKey::Barcode => None,
    }
}
