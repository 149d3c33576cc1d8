use std::collections::HashMap;

use pdf_writer::{Content, Filter, Name, Pdf, Rect, Ref, Str, TextStr};
use rayon::prelude::*;

use crate::barcode::BarcodeRasterizer;
use crate::error::Error;
use crate::fonts::{ASCENDER_RATIO, FontEntry, LABEL_FONT, LINE_HEIGHT_RATIO, register_label_font, to_winansi_bytes};
use crate::model::{FieldConfig, FieldKey, FieldPosition, LayoutResult, PlacedCell};
use crate::units::mm_to_points;

use super::{FieldSink, OutputFormat, RenderConfig, walk_cell};

#[derive(Clone, Debug, PartialEq)]
pub struct PdfOptions {
    pub title: String,
    pub author: String,
    /// Stroke width of the cell frame, in points.
    pub frame_line_width: f32,
    pub promo_color: [u8; 3],
    /// Floor for the secondary fields (code, unit, validity), in points.
    pub min_secondary_font_size: f64,
    /// Deflate page content streams.
    pub compress: bool,
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self {
            title: "Etiquetas de Gondola".to_string(),
            author: "shelf-labels".to_string(),
            frame_line_width: 0.8,
            promo_color: [255, 0, 0],
            min_secondary_font_size: 7.0,
            compress: true,
        }
    }
}

struct EmbeddedBarcode {
    pdf_name: String,
    pixel_width: u32,
    pixel_height: u32,
}

/// Decode a rasterized barcode and write it as a grayscale image XObject.
fn embed_barcode(
    pdf: &mut Pdf,
    xobj_ref: Ref,
    pdf_name: String,
    text: &str,
    png: &[u8],
) -> Result<EmbeddedBarcode, Error> {
    let decoded = image::load_from_memory_with_format(png, image::ImageFormat::Png)
        .map_err(|e| Error::Pdf(format!("barcode image for {text:?} is not a valid PNG: {e}")))?;
    let gray: image::GrayImage = decoded.to_luma8();
    let (w, h) = (gray.width(), gray.height());
    let compressed = miniz_oxide::deflate::compress_to_vec_zlib(gray.as_raw(), 6);

    let mut xobj = pdf.image_xobject(xobj_ref, &compressed);
    xobj.filter(Filter::FlateDecode);
    xobj.width(w as i32);
    xobj.height(h as i32);
    xobj.color_space().device_gray();
    xobj.bits_per_component(8);

    Ok(EmbeddedBarcode {
        pdf_name,
        pixel_width: w,
        pixel_height: h,
    })
}

struct PdfSink<'a> {
    content: Content,
    page_height_pt: f64,
    font: &'a FontEntry,
    barcodes: &'a HashMap<&'a str, EmbeddedBarcode>,
    fields: &'a FieldConfig,
    opts: &'a PdfOptions,
}

impl PdfSink<'_> {
    /// Top-left corner of a field box in PDF space (origin bottom-left).
    fn box_top_left(&self, cell: &PlacedCell, rect: &FieldPosition) -> (f64, f64) {
        let x = mm_to_points(cell.x) + mm_to_points(rect.x_mm);
        let y = mm_to_points(cell.y) + mm_to_points(rect.y_mm);
        (x, self.page_height_pt - y)
    }

    fn font_size(&self, field: FieldKey) -> f64 {
        let text = self.fields.text_font_size;
        match field {
            FieldKey::Price => self.fields.price_font_size,
            FieldKey::PromoPrice => text + 1.0,
            FieldKey::ProductCode | FieldKey::Unit | FieldKey::ValidUntil => {
                (text - 1.0).max(self.opts.min_secondary_font_size)
            }
            FieldKey::Description | FieldKey::Barcode => text,
        }
    }
}

impl FieldSink for PdfSink<'_> {
    fn frame(&mut self, cell: &PlacedCell) {
        let x = mm_to_points(cell.x);
        let w = mm_to_points(cell.width);
        let h = mm_to_points(cell.height);
        let y_bottom = self.page_height_pt - mm_to_points(cell.y) - h;
        self.content
            .set_line_width(self.opts.frame_line_width)
            .rect(x as f32, y_bottom as f32, w as f32, h as f32)
            .stroke();
    }

    fn text(&mut self, cell: &PlacedCell, field: FieldKey, rect: &FieldPosition, text: &str) {
        let font_size = self.font_size(field);
        if font_size <= 0.0 {
            return;
        }
        let lines = self.font.fit_lines(
            text,
            font_size,
            mm_to_points(rect.width_mm),
            mm_to_points(rect.height_mm),
        );
        if lines.is_empty() {
            return;
        }

        let (x, top) = self.box_top_left(cell, rect);
        let baseline = top - font_size * ASCENDER_RATIO;
        let line_h = font_size * LINE_HEIGHT_RATIO;
        let promo = field == FieldKey::PromoPrice;

        if promo {
            let [r, g, b] = self.opts.promo_color;
            self.content
                .set_fill_rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0);
        }
        self.content.begin_text();
        self.content
            .set_font(Name(LABEL_FONT.as_bytes()), font_size as f32);
        for (i, line) in lines.iter().enumerate() {
            if i == 0 {
                self.content.next_line(x as f32, baseline as f32);
            } else {
                self.content.next_line(0.0, -line_h as f32);
            }
            self.content.show(Str(&to_winansi_bytes(line)));
        }
        self.content.end_text();
        if promo {
            self.content.set_fill_gray(0.0);
        }
    }

    fn barcode(&mut self, cell: &PlacedCell, rect: &FieldPosition, value: &str) {
        let Some(img) = self.barcodes.get(value) else {
            return;
        };
        let box_w = mm_to_points(rect.width_mm);
        let box_h = mm_to_points(rect.height_mm);
        let scale = (box_w / img.pixel_width as f64).min(box_h / img.pixel_height as f64);
        if scale <= 0.0 {
            return;
        }
        let draw_w = img.pixel_width as f64 * scale;
        let draw_h = img.pixel_height as f64 * scale;
        let (x, top) = self.box_top_left(cell, rect);

        self.content.save_state();
        self.content.transform([
            draw_w as f32,
            0.0,
            0.0,
            draw_h as f32,
            x as f32,
            (top - draw_h) as f32,
        ]);
        self.content.x_object(Name(img.pdf_name.as_bytes()));
        self.content.restore_state();
    }
}

/// Render the layout as a PDF, one page per layout page.
///
/// Every distinct barcode value is rasterized once, in parallel, before any
/// page is drawn; a value the rasterizer rejects fails the whole document.
pub fn render_pdf(
    layout: &LayoutResult,
    fields: &FieldConfig,
    config: &RenderConfig,
    rasterizer: &dyn BarcodeRasterizer,
) -> Result<Vec<u8>, Error> {
    let t0 = std::time::Instant::now();
    let opts = &config.pdf;
    let mut pdf = Pdf::new();
    let mut next_id = 1i32;
    let mut alloc = || {
        let r = Ref::new(next_id);
        next_id += 1;
        r
    };

    let catalog_id = alloc();
    let pages_id = alloc();
    let info_id = alloc();
    let font = register_label_font(&mut pdf, &mut alloc);

    // Phase 1: rasterize and embed barcodes
    let mut barcode_values: Vec<&str> = Vec::new();
    if fields.show_barcode {
        for cell in layout.cells() {
            let value = cell.product.barcode.as_str();
            if !barcode_values.contains(&value) {
                barcode_values.push(value);
            }
        }
    }
    let rasters: Vec<Vec<u8>> = barcode_values
        .par_iter()
        .map(|value| rasterizer.render_png(value))
        .collect::<Result<_, _>>()?;

    let mut barcodes: HashMap<&str, EmbeddedBarcode> = HashMap::with_capacity(rasters.len());
    let mut image_xobjects: Vec<(String, Ref)> = Vec::with_capacity(rasters.len());
    for (&value, png) in barcode_values.iter().zip(&rasters) {
        let xobj_ref = alloc();
        let pdf_name = format!("Im{}", image_xobjects.len() + 1);
        let embedded = embed_barcode(&mut pdf, xobj_ref, pdf_name.clone(), value, png)?;
        image_xobjects.push((pdf_name, xobj_ref));
        barcodes.insert(value, embedded);
    }
    let t_barcodes = t0.elapsed();
    log::debug!("PDF: embedded {} barcode image(s)", image_xobjects.len());

    // Phase 2: one content stream per page
    let page_w = mm_to_points(layout.page.width_mm);
    let page_h = mm_to_points(layout.page.height_mm);
    let mut all_contents: Vec<Content> = Vec::with_capacity(layout.pages.len());
    for page in &layout.pages {
        let mut sink = PdfSink {
            content: Content::new(),
            page_height_pt: page_h,
            font: &font,
            barcodes: &barcodes,
            fields,
            opts,
        };
        for cell in page {
            walk_cell(cell, fields, config, OutputFormat::Pdf, &mut sink);
        }
        all_contents.push(sink.content);
    }
    let t_pages = t0.elapsed();

    // Phase 3: document structure
    let n = all_contents.len();
    let page_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();
    let content_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();

    for (i, c) in all_contents.into_iter().enumerate() {
        let raw = c.finish();
        if opts.compress {
            let compressed = miniz_oxide::deflate::compress_to_vec_zlib(raw.as_slice(), 6);
            pdf.stream(content_ids[i], &compressed).filter(Filter::FlateDecode);
        } else {
            pdf.stream(content_ids[i], raw.as_slice());
        }
    }

    pdf.catalog(catalog_id).pages(pages_id);
    pdf.pages(pages_id)
        .kids(page_ids.iter().copied())
        .count(n as i32);
    pdf.document_info(info_id)
        .title(TextStr(&opts.title))
        .author(TextStr(&opts.author));

    for i in 0..n {
        let mut page = pdf.page(page_ids[i]);
        page.media_box(Rect::new(0.0, 0.0, page_w as f32, page_h as f32))
            .parent(pages_id)
            .contents(content_ids[i]);
        let mut resources = page.resources();
        resources.fonts().pair(Name(LABEL_FONT.as_bytes()), font.font_ref);
        if !image_xobjects.is_empty() {
            let mut xobjects = resources.x_objects();
            for (name, xobj_ref) in &image_xobjects {
                xobjects.pair(Name(name.as_bytes()), *xobj_ref);
            }
        }
    }

    log::info!(
        "PDF phases: barcodes={:.1}ms, pages={:.1}ms, assembly={:.1}ms ({} page(s))",
        t_barcodes.as_secs_f64() * 1000.0,
        (t_pages - t_barcodes).as_secs_f64() * 1000.0,
        (t0.elapsed() - t_pages).as_secs_f64() * 1000.0,
        n,
    );

    Ok(pdf.finish())
}
