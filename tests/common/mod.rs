#![allow(dead_code)]

use shelf_labels::{
    FieldConfig, GridSpec, Orientation, PageSize, Product, RenderConfig,
};

/// The A4 sheet from the office-printer setup: 3x8 labels of 50x30mm,
/// 6mm margins, 2mm gaps.
pub fn a4_grid() -> GridSpec {
    GridSpec {
        label_width_mm: 50.0,
        label_height_mm: 30.0,
        page_size: PageSize::A4,
        page_width_mm: None,
        page_height_mm: None,
        columns: 3,
        rows: 8,
        margin_top_mm: 6.0,
        margin_left_mm: 6.0,
        margin_right_mm: 6.0,
        margin_bottom_mm: 6.0,
        gap_x_mm: 2.0,
        gap_y_mm: 2.0,
        orientation: Orientation::Vertical,
    }
}

/// A thermal roll where every page is a single 50x30mm label.
pub fn roll_grid() -> GridSpec {
    GridSpec {
        label_width_mm: 50.0,
        label_height_mm: 30.0,
        page_size: PageSize::Roll,
        page_width_mm: Some(50.0),
        page_height_mm: Some(30.0),
        columns: 1,
        rows: 1,
        margin_top_mm: 0.0,
        margin_left_mm: 0.0,
        margin_right_mm: 0.0,
        margin_bottom_mm: 0.0,
        gap_x_mm: 0.0,
        gap_y_mm: 0.0,
        orientation: Orientation::Vertical,
    }
}

pub fn product(n: usize) -> Product {
    Product {
        barcode: format!("77912345{n:05}"),
        product_code: format!("PINT-{n:03}"),
        description: format!("Latex Interior {n}"),
        price: 1000.0 + n as f64,
        promo_price: None,
        unit: "UN".to_string(),
        valid_until: Some("2026-12-31".to_string()),
    }
}

pub fn products(count: usize) -> Vec<Product> {
    (0..count).map(product).collect()
}

pub fn promo_product() -> Product {
    Product {
        promo_price: Some(52999.0),
        price: 58999.0,
        ..product(1)
    }
}

pub fn all_fields() -> FieldConfig {
    FieldConfig::default()
}

/// Render config with uncompressed PDF content streams so tests can read them.
pub fn readable_config() -> RenderConfig {
    let mut config = RenderConfig::default();
    config.pdf.compress = false;
    config
}

pub fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

pub fn count(haystack: &[u8], needle: &[u8]) -> usize {
    haystack.windows(needle.len()).filter(|w| *w == needle).count()
}

/// Whether a string operand starting with `prefix` (WinAnsi bytes) appears in
/// an uncompressed content stream. Operands with non-ASCII bytes are written
/// as hex strings.
pub fn pdf_shows(pdf: &[u8], prefix: &[u8]) -> bool {
    let mut literal = vec![b'('];
    literal.extend_from_slice(prefix);
    let hex: String = prefix.iter().map(|b| format!("{b:02X}")).collect();
    contains(pdf, &literal)
        || contains(pdf, format!("<{hex}").as_bytes())
        || contains(pdf, format!("<{}", hex.to_lowercase()).as_bytes())
}

/// Text of the last stream in the file. Content streams are written after
/// the image XObjects, so for a one-page document this is its content.
pub fn pdf_last_stream(pdf: &[u8]) -> String {
    let end = rfind(pdf, b"endstream").expect("no stream in PDF");
    let start = rfind(&pdf[..end], b"stream\n").expect("no stream start") + b"stream\n".len();
    String::from_utf8_lossy(&pdf[start..end]).into_owned()
}

fn rfind(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).rposition(|w| w == needle)
}

/// Number of page objects (`/Type /Page`, not the `/Pages` tree node).
pub fn pdf_page_count(pdf: &[u8]) -> usize {
    let needle = b"/Type /Page";
    pdf.windows(needle.len() + 1)
        .filter(|w| &w[..needle.len()] == needle && w[needle.len()] != b's')
        .count()
}

/// Operands of every `re` operator in uncompressed content streams.
pub fn pdf_rects(pdf: &[u8]) -> Vec<[f32; 4]> {
    let text = String::from_utf8_lossy(pdf);
    let tokens: Vec<&str> = text.split_ascii_whitespace().collect();
    tokens
        .windows(5)
        .filter(|w| w[4] == "re")
        .filter_map(|w| {
            let nums: Vec<f32> = w[..4].iter().filter_map(|t| t.parse().ok()).collect();
            (nums.len() == 4).then(|| [nums[0], nums[1], nums[2], nums[3]])
        })
        .collect()
}

pub fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected} ± {tolerance}, got {actual}"
    );
}
