//! Product lookup boundary. The layout core only consumes the resulting
//! `Product` list.

use serde::Serialize;

use crate::error::Error;
use crate::model::Product;

pub trait ProductLookup {
    /// Fails with [`Error::ProductLookup`] when the barcode is unknown or the
    /// backing service is unreachable.
    fn fetch_product(&self, barcode: &str) -> Result<Product, Error>;
}

/// Offline catalog with a few seeded products. Unknown barcodes get a
/// synthesized product derived from their digits.
#[derive(Clone, Debug)]
pub struct MockCatalog {
    products: Vec<Product>,
}

fn seeded(
    barcode: &str,
    product_code: &str,
    description: &str,
    price: f64,
    promo_price: Option<f64>,
    valid_until: &str,
) -> Product {
    Product {
        barcode: barcode.to_string(),
        product_code: product_code.to_string(),
        description: description.to_string(),
        price,
        promo_price,
        unit: "UN".to_string(),
        valid_until: Some(valid_until.to_string()),
    }
}

impl Default for MockCatalog {
    fn default() -> Self {
        Self {
            products: vec![
                seeded("7791234567001", "PINT-001", "Latex Interior Blanco 20L", 58999.0, Some(52999.0), "2026-12-31"),
                seeded("7791234567002", "PINT-002", "Esmalte Sintetico Satinado 4L", 21990.0, None, "2026-11-30"),
                seeded("7791234567003", "ACC-015", "Rodillo Antigota 22cm", 8990.0, Some(7490.0), "2026-10-15"),
                seeded("7791234567004", "ACC-031", "Cinta Enmascarar 24mm x 40m", 3250.0, None, "2026-12-31"),
                seeded("7791234567005", "PINT-088", "Revestimiento Texturado Exterior 30kg", 47200.0, Some(43800.0), "2026-09-30"),
            ],
        }
    }
}

impl MockCatalog {
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    fn synthesize(barcode: &str) -> Product {
        let last6 = tail(barcode, 6);
        let base = tail(barcode, 4)
            .parse::<u64>()
            .ok()
            .filter(|&n| n > 0)
            .unwrap_or(1234);
        let price = 1000 + base;
        Product {
            barcode: barcode.to_string(),
            product_code: format!("AUTO-{last6}"),
            description: format!("Producto simulado {last6}"),
            price: price as f64,
            promo_price: (price % 2 == 0).then(|| (price - 150) as f64),
            unit: "UN".to_string(),
            valid_until: Some("2026-12-31".to_string()),
        }
    }
}

impl ProductLookup for MockCatalog {
    fn fetch_product(&self, barcode: &str) -> Result<Product, Error> {
        let found = self.products.iter().find(|p| p.barcode == barcode);
        Ok(found.cloned().unwrap_or_else(|| Self::synthesize(barcode)))
    }
}

fn tail(s: &str, n: usize) -> &str {
    let start = s.char_indices().rev().nth(n - 1).map(|(i, _)| i).unwrap_or(0);
    &s[start..]
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LookupFailure {
    pub barcode: String,
    pub message: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct LookupReport {
    pub products: Vec<Product>,
    pub errors: Vec<LookupFailure>,
}

/// Look up every barcode in order. Failures are collected, not fatal.
pub fn fetch_products(lookup: &dyn ProductLookup, barcodes: &[String]) -> LookupReport {
    let mut report = LookupReport::default();
    for barcode in barcodes {
        match lookup.fetch_product(barcode) {
            Ok(product) => report.products.push(product),
            Err(e) => {
                log::warn!("Lookup failed for {barcode}: {e}");
                report.errors.push(LookupFailure {
                    barcode: barcode.clone(),
                    message: e.to_string(),
                });
            }
        }
    }
    report
}

/// First column of each non-blank CSV line, skipping a `barcode` header.
pub fn parse_csv_barcodes(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| line.split(',').next())
        .map(str::trim)
        .filter(|cell| !cell.is_empty() && !cell.eq_ignore_ascii_case("barcode"))
        .map(str::to_string)
        .collect()
}
