use serde::Serialize;

use crate::fields::{FieldLayout, compute_default_positions};
use crate::model::{FieldConfig, PartialPositions};

/// Label size the built-in templates' positions are computed for.
pub const TEMPLATE_LABEL_WIDTH_MM: f64 = 50.0;
pub const TEMPLATE_LABEL_HEIGHT_MM: f64 = 30.0;

pub const DEFAULT_TEMPLATE: &str = "basic";

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Template {
    pub key: &'static str,
    pub name: &'static str,
    pub fields: FieldConfig,
}

fn template(key: &'static str, name: &'static str, fields: FieldConfig) -> Template {
    let positions = compute_default_positions(
        &FieldLayout::default(),
        TEMPLATE_LABEL_WIDTH_MM,
        TEMPLATE_LABEL_HEIGHT_MM,
    );
    Template {
        key,
        name,
        fields: FieldConfig {
            positions: Some(PartialPositions::from(&positions)),
            ..fields
        },
    }
}

/// The built-in presets: `basic`, `compact` and `promo`.
pub fn templates() -> Vec<Template> {
    vec![
        template("basic", "Basica", FieldConfig::default()),
        template(
            "compact",
            "Compacta",
            FieldConfig {
                show_product_code: false,
                show_promo_price: false,
                show_valid_until: false,
                price_font_size: 18.0,
                text_font_size: 9.0,
                ..FieldConfig::default()
            },
        ),
        template(
            "promo",
            "Promocion",
            FieldConfig {
                price_font_size: 24.0,
                ..FieldConfig::default()
            },
        ),
    ]
}

/// Template by key; unknown keys fall back to `basic`.
pub fn template_by_key(key: &str) -> Template {
    let mut all = templates();
    match all.iter().position(|t| t.key == key) {
        Some(i) => all.swap_remove(i),
        None => {
            log::warn!("Unknown template {key:?}, using {DEFAULT_TEMPLATE}");
            all.swap_remove(0)
        }
    }
}
