use crate::model::{FieldConfig, FieldKey, FieldPosition, LayoutResult, PlacedCell};
use crate::units::mm_to_dots;

use super::{FieldSink, OutputFormat, RenderConfig, walk_cell};

#[derive(Clone, Debug, PartialEq)]
pub struct TsplOptions {
    /// Gap-sensor setting, emitted verbatim after `SIZE`.
    pub gap: String,
    /// Built-in font for body text.
    pub text_font: String,
    pub price_font: String,
    pub min_barcode_height: i64,
    pub frame_thickness: u32,
}

impl Default for TsplOptions {
    fn default() -> Self {
        Self {
            gap: "GAP 2 mm,0 mm".to_string(),
            text_font: "3".to_string(),
            price_font: "4".to_string(),
            min_barcode_height: 36,
            frame_thickness: 2,
        }
    }
}

struct TsplSink<'a> {
    lines: Vec<String>,
    dpi: u32,
    opts: &'a TsplOptions,
}

impl TsplSink<'_> {
    fn origin(&self, cell: &PlacedCell, rect: &FieldPosition) -> (i64, i64) {
        (
            mm_to_dots(cell.x, self.dpi) + mm_to_dots(rect.x_mm, self.dpi),
            mm_to_dots(cell.y, self.dpi) + mm_to_dots(rect.y_mm, self.dpi),
        )
    }
}

impl FieldSink for TsplSink<'_> {
    fn frame(&mut self, cell: &PlacedCell) {
        let x = mm_to_dots(cell.x, self.dpi);
        let y = mm_to_dots(cell.y, self.dpi);
        let x2 = x + mm_to_dots(cell.width, self.dpi);
        let y2 = y + mm_to_dots(cell.height, self.dpi);
        self.lines
            .push(format!("BOX {x},{y},{x2},{y2},{}", self.opts.frame_thickness));
    }

    fn text(&mut self, cell: &PlacedCell, field: FieldKey, rect: &FieldPosition, text: &str) {
        let (x, y) = self.origin(cell, rect);
        let font = match field {
            FieldKey::Price => &self.opts.price_font,
            _ => &self.opts.text_font,
        };
        self.lines
            .push(format!("TEXT {x},{y},\"{font}\",0,1,1,\"{}\"", sanitize(text)));
    }

    fn barcode(&mut self, cell: &PlacedCell, rect: &FieldPosition, value: &str) {
        let (x, y) = self.origin(cell, rect);
        let height = mm_to_dots(rect.height_mm, self.dpi).max(self.opts.min_barcode_height);
        self.lines.push(format!(
            "BARCODE {x},{y},\"128\",{height},1,0,2,2,\"{}\"",
            sanitize(value)
        ));
    }
}

/// Double quotes delimit TSPL strings and every command is one line, so quotes
/// become `'` and control characters (CR/LF included) become spaces.
fn sanitize(text: &str) -> String {
    text.chars()
        .map(|ch| match ch {
            '"' => '\'',
            c if c.is_control() => ' ',
            c => c,
        })
        .collect()
}

/// Encode the layout as one TSPL print buffer: setup lines, every cell, and a
/// single trailing `PRINT 1,1`.
pub fn render_tspl(layout: &LayoutResult, fields: &FieldConfig, config: &RenderConfig) -> String {
    let mut sink = TsplSink {
        lines: vec![
            format!(
                "SIZE {} mm,{} mm",
                layout.page.width_mm.round() as i64,
                layout.page.height_mm.round() as i64
            ),
            config.tspl.gap.clone(),
            "DIRECTION 1".to_string(),
            "CLS".to_string(),
        ],
        dpi: config.dpi,
        opts: &config.tspl,
    };

    for cell in layout.cells() {
        walk_cell(cell, fields, config, OutputFormat::Tspl, &mut sink);
    }
    log::debug!("TSPL: {} label(s) in one buffer", layout.cells().count());

    sink.lines.push("PRINT 1,1".to_string());
    sink.lines.join("\n")
}
