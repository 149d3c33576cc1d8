use serde::{Deserialize, Deserializer, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSize {
    A4,
    A5,
    /// Printer roll or any other keyword: dimensions come from the grid spec.
    #[default]
    #[serde(rename = "roll", other)]
    Roll,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    #[serde(alias = "portrait")]
    Vertical,
    /// Landscape: page width and height are swapped.
    #[serde(alias = "landscape")]
    Horizontal,
}

/// Page and grid configuration. All lengths are millimeters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridSpec {
    pub label_width_mm: f64,
    pub label_height_mm: f64,
    #[serde(default)]
    pub page_size: PageSize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_width_mm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_height_mm: Option<f64>,
    pub columns: u32,
    pub rows: u32,
    #[serde(default)]
    pub margin_top_mm: f64,
    #[serde(default)]
    pub margin_left_mm: f64,
    #[serde(default)]
    pub margin_right_mm: f64,
    #[serde(default)]
    pub margin_bottom_mm: f64,
    #[serde(default, rename = "gapXmm")]
    pub gap_x_mm: f64,
    #[serde(default, rename = "gapYmm")]
    pub gap_y_mm: f64,
    #[serde(default)]
    pub orientation: Orientation,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub barcode: String,
    #[serde(default)]
    pub product_code: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: f64,
    /// `None` means the product is not on promotion.
    #[serde(default)]
    pub promo_price: Option<f64>,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub valid_until: Option<String>,
}

/// The seven renderable label fields, in emission order (barcode last).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKey {
    Description,
    ProductCode,
    Price,
    PromoPrice,
    Unit,
    ValidUntil,
    Barcode,
}

impl FieldKey {
    pub const ALL: [FieldKey; 7] = [
        FieldKey::Description,
        FieldKey::ProductCode,
        FieldKey::Price,
        FieldKey::PromoPrice,
        FieldKey::Unit,
        FieldKey::ValidUntil,
        FieldKey::Barcode,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FieldKey::Description => "description",
            FieldKey::ProductCode => "productCode",
            FieldKey::Price => "price",
            FieldKey::PromoPrice => "promoPrice",
            FieldKey::Unit => "unit",
            FieldKey::ValidUntil => "validUntil",
            FieldKey::Barcode => "barcode",
        }
    }
}

/// A field box relative to the label cell's top-left corner, in millimeters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldPosition {
    pub x_mm: f64,
    pub y_mm: f64,
    pub width_mm: f64,
    pub height_mm: f64,
}

/// A complete position set: every field always has a box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Positions {
    pub description: FieldPosition,
    pub product_code: FieldPosition,
    pub price: FieldPosition,
    pub promo_price: FieldPosition,
    pub unit: FieldPosition,
    pub valid_until: FieldPosition,
    pub barcode: FieldPosition,
}

impl Positions {
    pub fn get(&self, key: FieldKey) -> &FieldPosition {
        match key {
            FieldKey::Description => &self.description,
            FieldKey::ProductCode => &self.product_code,
            FieldKey::Price => &self.price,
            FieldKey::PromoPrice => &self.promo_price,
            FieldKey::Unit => &self.unit,
            FieldKey::ValidUntil => &self.valid_until,
            FieldKey::Barcode => &self.barcode,
        }
    }

    pub fn get_mut(&mut self, key: FieldKey) -> &mut FieldPosition {
        match key {
            FieldKey::Description => &mut self.description,
            FieldKey::ProductCode => &mut self.product_code,
            FieldKey::Price => &mut self.price,
            FieldKey::PromoPrice => &mut self.promo_price,
            FieldKey::Unit => &mut self.unit,
            FieldKey::ValidUntil => &mut self.valid_until,
            FieldKey::Barcode => &mut self.barcode,
        }
    }
}

/// Caller-supplied override for one field. Each axis is independent: a
/// missing axis keeps the computed default.
///
/// Axis values are read leniently, the way interactive editors send them:
/// numeric strings are parsed, `null`/`""` read as 0 and anything else as
/// NaN (later clamped to 0).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialPosition {
    #[serde(default, deserialize_with = "lenient_axis", skip_serializing_if = "Option::is_none")]
    pub x_mm: Option<f64>,
    #[serde(default, deserialize_with = "lenient_axis", skip_serializing_if = "Option::is_none")]
    pub y_mm: Option<f64>,
    #[serde(default, deserialize_with = "lenient_axis", skip_serializing_if = "Option::is_none")]
    pub width_mm: Option<f64>,
    #[serde(default, deserialize_with = "lenient_axis", skip_serializing_if = "Option::is_none")]
    pub height_mm: Option<f64>,
}

/// Sparse per-field overrides. Unknown field names are ignored and entries
/// that are not objects count as absent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialPositions {
    #[serde(default, deserialize_with = "lenient_object", skip_serializing_if = "Option::is_none")]
    pub description: Option<PartialPosition>,
    #[serde(default, deserialize_with = "lenient_object", skip_serializing_if = "Option::is_none")]
    pub product_code: Option<PartialPosition>,
    #[serde(default, deserialize_with = "lenient_object", skip_serializing_if = "Option::is_none")]
    pub price: Option<PartialPosition>,
    #[serde(default, deserialize_with = "lenient_object", skip_serializing_if = "Option::is_none")]
    pub promo_price: Option<PartialPosition>,
    #[serde(default, deserialize_with = "lenient_object", skip_serializing_if = "Option::is_none")]
    pub unit: Option<PartialPosition>,
    #[serde(default, deserialize_with = "lenient_object", skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<PartialPosition>,
    #[serde(default, deserialize_with = "lenient_object", skip_serializing_if = "Option::is_none")]
    pub barcode: Option<PartialPosition>,
}

impl PartialPositions {
    pub fn get(&self, key: FieldKey) -> Option<&PartialPosition> {
        match key {
            FieldKey::Description => self.description.as_ref(),
            FieldKey::ProductCode => self.product_code.as_ref(),
            FieldKey::Price => self.price.as_ref(),
            FieldKey::PromoPrice => self.promo_price.as_ref(),
            FieldKey::Unit => self.unit.as_ref(),
            FieldKey::ValidUntil => self.valid_until.as_ref(),
            FieldKey::Barcode => self.barcode.as_ref(),
        }
    }

    pub fn set(&mut self, key: FieldKey, value: PartialPosition) {
        let slot = match key {
            FieldKey::Description => &mut self.description,
            FieldKey::ProductCode => &mut self.product_code,
            FieldKey::Price => &mut self.price,
            FieldKey::PromoPrice => &mut self.promo_price,
            FieldKey::Unit => &mut self.unit,
            FieldKey::ValidUntil => &mut self.valid_until,
            FieldKey::Barcode => &mut self.barcode,
        };
        *slot = Some(value);
    }
}

impl From<&Positions> for PartialPositions {
    fn from(positions: &Positions) -> Self {
        let mut partial = PartialPositions::default();
        for key in FieldKey::ALL {
            let p = positions.get(key);
            partial.set(
                key,
                PartialPosition {
                    x_mm: Some(p.x_mm),
                    y_mm: Some(p.y_mm),
                    width_mm: Some(p.width_mm),
                    height_mm: Some(p.height_mm),
                },
            );
        }
        partial
    }
}

/// Visibility, font sizes and (possibly partial) positions of the label fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldConfig {
    pub show_description: bool,
    pub show_product_code: bool,
    pub show_price: bool,
    pub show_promo_price: bool,
    pub show_unit: bool,
    pub show_valid_until: bool,
    pub show_barcode: bool,
    /// Body text size in points.
    pub text_font_size: f64,
    /// Price text size in points.
    pub price_font_size: f64,
    /// `None` means every field uses its computed default box.
    #[serde(deserialize_with = "lenient_object", skip_serializing_if = "Option::is_none")]
    pub positions: Option<PartialPositions>,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            show_description: true,
            show_product_code: true,
            show_price: true,
            show_promo_price: true,
            show_unit: true,
            show_valid_until: true,
            show_barcode: true,
            text_font_size: 10.0,
            price_font_size: 20.0,
            positions: None,
        }
    }
}

impl FieldConfig {
    pub fn is_visible(&self, key: FieldKey) -> bool {
        match key {
            FieldKey::Description => self.show_description,
            FieldKey::ProductCode => self.show_product_code,
            FieldKey::Price => self.show_price,
            FieldKey::PromoPrice => self.show_promo_price,
            FieldKey::Unit => self.show_unit,
            FieldKey::ValidUntil => self.show_valid_until,
            FieldKey::Barcode => self.show_barcode,
        }
    }
}

/// One product placed in one grid slot. Coordinates are millimeters from the
/// page's top-left corner.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedCell<'a> {
    pub page_index: usize,
    pub slot: usize,
    pub row: usize,
    pub col: usize,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// The cell crosses the printable area. Advisory only.
    pub frame_overflow: bool,
    pub product: &'a Product,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// Effective width after the orientation swap.
    pub width_mm: f64,
    pub height_mm: f64,
    pub orientation: Orientation,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutResult<'a> {
    pub page: PageInfo,
    pub pages: Vec<Vec<PlacedCell<'a>>>,
    pub total_pages: usize,
}

impl<'a> LayoutResult<'a> {
    /// All cells in page order, then row-major slot order.
    pub fn cells(&self) -> impl Iterator<Item = &PlacedCell<'a>> {
        self.pages.iter().flatten()
    }
}

fn lenient_axis<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    use serde_json::Value;

    let value = Value::deserialize(deserializer)?;
    let num = match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) if s.trim().is_empty() => 0.0,
        Value::String(s) => s.trim().parse().unwrap_or(f64::NAN),
        Value::Bool(b) => f64::from(u8::from(b)),
        Value::Null => 0.0,
        Value::Array(_) | Value::Object(_) => f64::NAN,
    };
    Ok(Some(num))
}

fn lenient_object<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    if !value.is_object() {
        return Ok(None);
    }
    Ok(serde_json::from_value(value).ok())
}
