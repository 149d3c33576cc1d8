use serde::Serialize;

use crate::error::Error;
use crate::fields::{FieldLayout, resolve_positions};
use crate::model::{
    FieldConfig, GridSpec, LayoutResult, Orientation, PageInfo, PageSize, PlacedCell, Positions,
    Product,
};

/// Page size in millimeters for a preset, or the custom dimensions for a roll.
pub fn page_dimensions(
    page_size: PageSize,
    custom_width_mm: Option<f64>,
    custom_height_mm: Option<f64>,
) -> Result<(f64, f64), Error> {
    match page_size {
        PageSize::A4 => Ok((210.0, 297.0)),
        PageSize::A5 => Ok((148.0, 210.0)),
        PageSize::Roll => match (custom_width_mm, custom_height_mm) {
            (Some(w), Some(h)) if is_positive(w) && is_positive(h) => Ok((w, h)),
            _ => Err(Error::InvalidConfig(format!(
                "roll/custom page needs positive pageWidthMm and pageHeightMm (got {custom_width_mm:?} x {custom_height_mm:?})"
            ))),
        },
    }
}

fn is_positive(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

fn validate(spec: &GridSpec, products: &[Product]) -> Result<(), Error> {
    if spec.columns == 0 || spec.rows == 0 {
        return Err(Error::InvalidConfig(format!(
            "grid needs at least one column and one row (got {}x{})",
            spec.columns, spec.rows
        )));
    }
    if !is_positive(spec.label_width_mm) || !is_positive(spec.label_height_mm) {
        return Err(Error::InvalidConfig(format!(
            "label size must be positive (got {} x {} mm)",
            spec.label_width_mm, spec.label_height_mm
        )));
    }
    let spacing = [
        ("marginTopMm", spec.margin_top_mm),
        ("marginLeftMm", spec.margin_left_mm),
        ("marginRightMm", spec.margin_right_mm),
        ("marginBottomMm", spec.margin_bottom_mm),
        ("gapXmm", spec.gap_x_mm),
        ("gapYmm", spec.gap_y_mm),
    ];
    for (name, value) in spacing {
        if !value.is_finite() || value < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "{name} must be a non-negative number (got {value})"
            )));
        }
    }
    if products.is_empty() {
        return Err(Error::InvalidConfig("no products to lay out".into()));
    }
    Ok(())
}

/// Place `products` row-major into grid cells, filling pages in input order.
///
/// Cells that cross the printable area are still placed and flagged with
/// `frame_overflow`.
pub fn build_layout<'a>(spec: &GridSpec, products: &'a [Product]) -> Result<LayoutResult<'a>, Error> {
    validate(spec, products)?;

    let (page_w, page_h) = page_dimensions(spec.page_size, spec.page_width_mm, spec.page_height_mm)?;
    let (eff_w, eff_h) = match spec.orientation {
        Orientation::Horizontal => (page_h, page_w),
        Orientation::Vertical => (page_w, page_h),
    };

    let columns = spec.columns as usize;
    let slots_per_page = columns * spec.rows as usize;
    let max_x = eff_w - spec.margin_right_mm;
    let max_y = eff_h - spec.margin_bottom_mm;

    let mut pages: Vec<Vec<PlacedCell<'a>>> = Vec::with_capacity(products.len().div_ceil(slots_per_page));
    let mut overflowing = 0usize;

    for (index, product) in products.iter().enumerate() {
        let page_index = index / slots_per_page;
        let slot = index % slots_per_page;
        let row = slot / columns;
        let col = slot % columns;

        let x = spec.margin_left_mm + col as f64 * (spec.label_width_mm + spec.gap_x_mm);
        let y = spec.margin_top_mm + row as f64 * (spec.label_height_mm + spec.gap_y_mm);
        let frame_overflow = x + spec.label_width_mm > max_x || y + spec.label_height_mm > max_y;
        if frame_overflow {
            overflowing += 1;
        }

        if pages.len() <= page_index {
            pages.push(Vec::with_capacity(slots_per_page));
        }
        pages[page_index].push(PlacedCell {
            page_index,
            slot,
            row,
            col,
            x,
            y,
            width: spec.label_width_mm,
            height: spec.label_height_mm,
            frame_overflow,
            product,
        });
    }

    log::info!(
        "Layout: {} products on {} page(s) of {:.1}x{:.1}mm, {} slots/page",
        products.len(),
        pages.len(),
        eff_w,
        eff_h,
        slots_per_page,
    );
    if overflowing > 0 {
        log::warn!("{overflowing} label cell(s) extend past the printable area");
    }

    Ok(LayoutResult {
        page: PageInfo {
            width_mm: eff_w,
            height_mm: eff_h,
            orientation: spec.orientation,
        },
        total_pages: pages.len(),
        pages,
    })
}

/// Layout plus the field boxes an editor should draw inside each cell.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Preview<'a> {
    #[serde(flatten)]
    pub layout: LayoutResult<'a>,
    pub positions: Positions,
}

pub fn build_preview<'a>(
    spec: &GridSpec,
    fields: &FieldConfig,
    field_layout: &FieldLayout,
    products: &'a [Product],
) -> Result<Preview<'a>, Error> {
    let layout = build_layout(spec, products)?;
    let positions = resolve_positions(
        fields.positions.as_ref(),
        field_layout,
        spec.label_width_mm,
        spec.label_height_mm,
    );
    Ok(Preview { layout, positions })
}
