//! Field position resolution.
//!
//! Default boxes are percentages of the label size so they scale with any
//! label; caller overrides are merged over them axis by axis.

use serde::{Deserialize, Serialize};

use crate::model::{FieldKey, FieldPosition, PartialPositions, Positions};

/// A box expressed in percent of the label width (`x`, `width`) and height
/// (`y`, `height`).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PercentRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PercentRect {
    const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    fn to_mm(self, label_width_mm: f64, label_height_mm: f64) -> FieldPosition {
        FieldPosition {
            x_mm: round2(self.x / 100.0 * label_width_mm),
            y_mm: round2(self.y / 100.0 * label_height_mm),
            width_mm: round2(self.width / 100.0 * label_width_mm),
            height_mm: round2(self.height / 100.0 * label_height_mm),
        }
    }
}

/// Default field boxes. Description takes the top band and the barcode the
/// bottom one; price and promo share the left of the middle band with unit
/// and validity on the right.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldLayout {
    pub description: PercentRect,
    pub product_code: PercentRect,
    pub price: PercentRect,
    pub promo_price: PercentRect,
    pub unit: PercentRect,
    pub valid_until: PercentRect,
    pub barcode: PercentRect,
}

impl Default for FieldLayout {
    fn default() -> Self {
        Self {
            description: PercentRect::new(4.0, 6.0, 92.0, 20.0),
            product_code: PercentRect::new(4.0, 28.0, 60.0, 10.0),
            price: PercentRect::new(4.0, 40.0, 55.0, 22.0),
            promo_price: PercentRect::new(4.0, 64.0, 60.0, 10.0),
            unit: PercentRect::new(62.0, 40.0, 34.0, 10.0),
            valid_until: PercentRect::new(62.0, 64.0, 34.0, 10.0),
            barcode: PercentRect::new(4.0, 76.0, 92.0, 18.0),
        }
    }
}

impl FieldLayout {
    pub fn get(&self, key: FieldKey) -> PercentRect {
        match key {
            FieldKey::Description => self.description,
            FieldKey::ProductCode => self.product_code,
            FieldKey::Price => self.price,
            FieldKey::PromoPrice => self.promo_price,
            FieldKey::Unit => self.unit,
            FieldKey::ValidUntil => self.valid_until,
            FieldKey::Barcode => self.barcode,
        }
    }
}

/// Default boxes for a label of the given size, rounded to 0.01mm.
pub fn compute_default_positions(
    layout: &FieldLayout,
    label_width_mm: f64,
    label_height_mm: f64,
) -> Positions {
    let mut positions = Positions::default();
    for key in FieldKey::ALL {
        *positions.get_mut(key) = layout.get(key).to_mm(label_width_mm, label_height_mm);
    }
    positions
}

/// Merge `partial` over the defaults for this label size. Total: every field
/// gets a box, and every axis ends up a finite, non-negative number rounded
/// to 0.01mm. Malformed axes become 0 instead of failing.
pub fn resolve_positions(
    partial: Option<&PartialPositions>,
    layout: &FieldLayout,
    label_width_mm: f64,
    label_height_mm: f64,
) -> Positions {
    let defaults = compute_default_positions(layout, label_width_mm, label_height_mm);
    let mut resolved = Positions::default();

    for key in FieldKey::ALL {
        let base = defaults.get(key);
        let over = partial.and_then(|p| p.get(key)).copied().unwrap_or_default();
        *resolved.get_mut(key) = FieldPosition {
            x_mm: non_negative(over.x_mm.unwrap_or(base.x_mm)),
            y_mm: non_negative(over.y_mm.unwrap_or(base.y_mm)),
            width_mm: non_negative(over.width_mm.unwrap_or(base.width_mm)),
            height_mm: non_negative(over.height_mm.unwrap_or(base.height_mm)),
        };
    }
    resolved
}

fn non_negative(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    round2(value.max(0.0))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
