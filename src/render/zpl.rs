use crate::model::{FieldConfig, FieldKey, FieldPosition, LayoutResult, PlacedCell};
use crate::units::mm_to_dots;

use super::{FieldSink, OutputFormat, RenderConfig, walk_cell};

/// ZPL II tuning. Font heights are in dots.
#[derive(Clone, Debug, PartialEq)]
pub struct ZplOptions {
    /// Dots per point of the configured font size; `^A0` glyphs run small.
    pub font_scale: f64,
    pub min_text_height: i64,
    pub min_price_height: i64,
    /// Added to the body text height for the promo line.
    pub promo_boost: i64,
    pub min_block_width: i64,
    pub barcode_module_width: u32,
    pub min_barcode_height: i64,
    pub frame_thickness: u32,
    /// Close and reopen the label format (`^XZ`/`^XA`) at every layout page
    /// instead of writing all cells into one format.
    pub format_per_page: bool,
}

impl Default for ZplOptions {
    fn default() -> Self {
        Self {
            font_scale: 2.0,
            min_text_height: 18,
            min_price_height: 26,
            promo_boost: 4,
            min_block_width: 20,
            barcode_module_width: 2,
            min_barcode_height: 30,
            frame_thickness: 2,
            format_per_page: false,
        }
    }
}

struct ZplSink<'a> {
    lines: Vec<String>,
    dpi: u32,
    opts: &'a ZplOptions,
    text_height: i64,
    price_height: i64,
}

impl ZplSink<'_> {
    fn origin(&self, cell: &PlacedCell, rect: &FieldPosition) -> (i64, i64) {
        (
            mm_to_dots(cell.x, self.dpi) + mm_to_dots(rect.x_mm, self.dpi),
            mm_to_dots(cell.y, self.dpi) + mm_to_dots(rect.y_mm, self.dpi),
        )
    }
}

impl FieldSink for ZplSink<'_> {
    fn frame(&mut self, cell: &PlacedCell) {
        let x = mm_to_dots(cell.x, self.dpi);
        let y = mm_to_dots(cell.y, self.dpi);
        let w = mm_to_dots(cell.width, self.dpi);
        let h = mm_to_dots(cell.height, self.dpi);
        self.lines
            .push(format!("^FO{x},{y}^GB{w},{h},{}^FS", self.opts.frame_thickness));
    }

    fn text(&mut self, cell: &PlacedCell, field: FieldKey, rect: &FieldPosition, text: &str) {
        let (x, y) = self.origin(cell, rect);
        let size = match field {
            FieldKey::Price => self.price_height,
            FieldKey::PromoPrice => self.text_height + self.opts.promo_boost,
            _ => self.text_height,
        };
        let width = mm_to_dots(rect.width_mm, self.dpi).max(self.opts.min_block_width);
        let max_lines = (mm_to_dots(rect.height_mm, self.dpi) / size.max(1)).max(1);
        self.lines.push(format!(
            "^FO{x},{y}^A0N,{size},{size}^FB{width},{max_lines},0,L,0^FD{}^FS",
            sanitize(text)
        ));
    }

    fn barcode(&mut self, cell: &PlacedCell, rect: &FieldPosition, value: &str) {
        let (x, y) = self.origin(cell, rect);
        let height = mm_to_dots(rect.height_mm, self.dpi).max(self.opts.min_barcode_height);
        self.lines.push(format!(
            "^FO{x},{y}^BY{}^BCN,{height},N,N,N^FD{}^FS",
            self.opts.barcode_module_width,
            sanitize(value)
        ));
    }
}

/// `^` and `~` start commands, so field data cannot contain them. Control
/// characters are flattened too.
fn sanitize(text: &str) -> String {
    text.chars()
        .map(|ch| match ch {
            '^' | '~' => ' ',
            c if c.is_control() => ' ',
            c => c,
        })
        .collect()
}

/// Encode the layout as ZPL II: one `^XA`…`^XZ` label format holding every
/// cell, or one per page with [`ZplOptions::format_per_page`]. Field data is
/// UTF-8 (`^CI28`).
pub fn render_zpl(layout: &LayoutResult, fields: &FieldConfig, config: &RenderConfig) -> String {
    let opts = &config.zpl;
    let mut sink = ZplSink {
        lines: Vec::new(),
        dpi: config.dpi,
        opts,
        text_height: ((fields.text_font_size * opts.font_scale).round() as i64).max(opts.min_text_height),
        price_height: ((fields.price_font_size * opts.font_scale).round() as i64).max(opts.min_price_height),
    };

    let open = |lines: &mut Vec<String>| {
        lines.push("^XA".to_string());
        lines.push("^CI28".to_string());
    };

    open(&mut sink.lines);
    for (page_index, page) in layout.pages.iter().enumerate() {
        if opts.format_per_page && page_index > 0 {
            sink.lines.push("^XZ".to_string());
            open(&mut sink.lines);
        }
        for cell in page {
            walk_cell(cell, fields, config, OutputFormat::Zpl, &mut sink);
        }
        log::debug!("ZPL: page {} with {} label(s)", page_index + 1, page.len());
    }
    sink.lines.push("^XZ".to_string());

    sink.lines.join("\n")
}
