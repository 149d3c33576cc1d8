mod barcode;
mod catalog;
mod error;
mod fields;
mod fonts;
mod layout;
mod model;
mod render;
mod store;
mod templates;
mod units;

pub use barcode::{BarcodeOptions, BarcodeRasterizer, Code128Rasterizer};
pub use catalog::{LookupFailure, LookupReport, MockCatalog, ProductLookup, fetch_products, parse_csv_barcodes};
pub use error::Error;
pub use fields::{FieldLayout, PercentRect, compute_default_positions, resolve_positions};
pub use layout::{Preview, build_layout, build_preview, page_dimensions};
pub use model::{
    FieldConfig, FieldKey, FieldPosition, GridSpec, LayoutResult, Orientation, PageInfo, PageSize,
    PartialPosition, PartialPositions, PlacedCell, Positions, Product,
};
pub use render::{
    OutputFormat, PdfOptions, RenderConfig, TsplOptions, ZplOptions, render_pdf, render_tspl,
    render_zpl,
};
pub use store::{ConfigStore, SavedConfig};
pub use templates::{DEFAULT_TEMPLATE, Template, template_by_key, templates};
pub use units::{CurrencyFormat, DEFAULT_DPI, MISSING_AMOUNT, format_currency, mm_to_dots, mm_to_points};

use std::path::Path;
use std::time::Instant;

use serde::{Deserialize, Serialize};

/// One export request: grid, field configuration and the products to print.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LabelJob {
    pub layout: GridSpec,
    #[serde(default)]
    pub fields: FieldConfig,
    pub products: Vec<Product>,
}

impl LabelJob {
    pub fn from_json(data: &[u8]) -> Result<Self, Error> {
        Ok(serde_json::from_slice(data)?)
    }
}

/// A finished payload for one output format.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Export {
    pub format: OutputFormat,
    pub bytes: Vec<u8>,
}

impl Export {
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }
}

/// Lay out `job` and encode it as `format`.
pub fn export_labels(
    job: &LabelJob,
    format: OutputFormat,
    config: &RenderConfig,
    rasterizer: &dyn BarcodeRasterizer,
) -> Result<Export, Error> {
    if config.dpi == 0 {
        return Err(Error::InvalidConfig("printer resolution must be at least 1 dpi".into()));
    }
    let t0 = Instant::now();

    let layout = build_layout(&job.layout, &job.products)?;
    let t_layout = t0.elapsed();

    let bytes = match format {
        OutputFormat::Pdf => render_pdf(&layout, &job.fields, config, rasterizer)?,
        OutputFormat::Zpl => render_zpl(&layout, &job.fields, config).into_bytes(),
        OutputFormat::Tspl => render_tspl(&layout, &job.fields, config).into_bytes(),
    };
    let t_total = t0.elapsed();

    log::info!(
        "Timing: layout={:.1}ms, render={:.1}ms, total={:.1}ms ({format}, output {} bytes)",
        t_layout.as_secs_f64() * 1000.0,
        (t_total - t_layout).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        bytes.len(),
    );

    Ok(Export { format, bytes })
}

/// Read a JSON job file, export it with the default Code-128 rasterizer and
/// write the payload to `output`.
pub fn export_job_file(
    input: &Path,
    output: &Path,
    format: OutputFormat,
    config: &RenderConfig,
) -> Result<(), Error> {
    let data = std::fs::read(input).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => Error::Io(
            std::io::Error::new(e.kind(), format!("{}: {}", e, input.display())),
        ),
        _ => Error::Io(e),
    })?;
    let job = LabelJob::from_json(&data)?;
    let export = export_labels(&job, format, config, &Code128Rasterizer::default())?;
    std::fs::write(output, &export.bytes)?;
    Ok(())
}
