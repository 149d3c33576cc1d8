use std::io::Cursor;

use barcoders::sym::code128::Code128;
use image::{GrayImage, Luma};

use crate::error::Error;

/// Turns a barcode value into a raster image (PNG bytes).
///
/// Implementations must be thread-safe: the PDF encoder rasterizes distinct
/// barcode values in parallel.
pub trait BarcodeRasterizer: Send + Sync {
    fn render_png(&self, text: &str) -> Result<Vec<u8>, Error>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BarcodeOptions {
    /// Width of the narrowest bar in pixels.
    pub module_px: u32,
    pub bar_height_px: u32,
    /// Blank margin on each side, in modules.
    pub quiet_zone_modules: u32,
}

impl Default for BarcodeOptions {
    fn default() -> Self {
        Self {
            module_px: 2,
            bar_height_px: 50,
            quiet_zone_modules: 10,
        }
    }
}

/// Code-128 rasterizer. Even-length all-digit values use code set C, everything
/// else code set B (printable ASCII).
#[derive(Clone, Debug, Default)]
pub struct Code128Rasterizer {
    pub options: BarcodeOptions,
}

impl Code128Rasterizer {
    pub fn new(options: BarcodeOptions) -> Self {
        Self { options }
    }

    /// Bar pattern for `text`, one entry per module (1 = bar, 0 = space).
    pub fn modules(&self, text: &str) -> Result<Vec<u8>, Error> {
        if text.is_empty() {
            return Err(barcode_error(text, "empty barcode value"));
        }
        // barcoders reads some non-ASCII chars as code-set switches
        if let Some(ch) = text.chars().find(|c| !(' '..='~').contains(c)) {
            return Err(barcode_error(
                text,
                &format!("character {ch:?} is outside the Code-128 printable range"),
            ));
        }
        let numeric = text.len() >= 2 && text.len() % 2 == 0 && text.bytes().all(|b| b.is_ascii_digit());
        // barcoders selects the starting code set from a marker character
        let data = if numeric {
            format!("\u{0106}{text}")
        } else {
            format!("\u{0181}{text}")
        };
        let symbol = Code128::new(&data).map_err(|e| barcode_error(text, &format!("{e:?}")))?;
        Ok(symbol.encode())
    }
}

impl BarcodeRasterizer for Code128Rasterizer {
    fn render_png(&self, text: &str) -> Result<Vec<u8>, Error> {
        let modules = self.modules(text)?;
        let module_px = self.options.module_px.max(1);
        let quiet = self.options.quiet_zone_modules * module_px;
        let width = modules.len() as u32 * module_px + 2 * quiet;
        let height = self.options.bar_height_px.max(1);

        let img = GrayImage::from_fn(width, height, |x, _| {
            if x < quiet || x >= width - quiet {
                return Luma([255]);
            }
            match modules[((x - quiet) / module_px) as usize] {
                1 => Luma([0]),
                _ => Luma([255]),
            }
        });

        let mut png = Vec::new();
        img.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .map_err(|e| barcode_error(text, &e.to_string()))?;
        Ok(png)
    }
}

fn barcode_error(text: &str, reason: &str) -> Error {
    Error::Barcode {
        text: text.to_string(),
        reason: reason.to_string(),
    }
}
