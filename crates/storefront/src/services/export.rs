//! CSV export of catalog products.
//!
//! Column order is fixed: `name,description,category,price,sku,image`.
//! Fields are quoted when they contain a delimiter, quote or line break,
//! with embedded quotes doubled; records end in CRLF.

use std::fmt::Write;

use crate::config::MediaConfig;
use crate::models::Product;

/// Header row of every export.
pub const CSV_HEADER: [&str; 6] = ["name", "description", "category", "price", "sku", "image"];

/// Render products as a CSV document, header first.
#[must_use]
pub fn products_csv<'a>(
    products: impl IntoIterator<Item = &'a Product>,
    media: &MediaConfig,
) -> String {
    let mut csv = String::new();
    write_record(&mut csv, CSV_HEADER);

    for product in products {
        let price = product.price.to_string();
        let image = product
            .image
            .as_deref()
            .filter(|path| !path.is_empty())
            .map(|path| media.absolute_url(path))
            .unwrap_or_default();

        write_record(
            &mut csv,
            [
                product.name.as_str(),
                product.description.as_str(),
                product.category.as_str(),
                price.as_str(),
                product.sku.as_str(),
                image.as_str(),
            ],
        );
    }

    csv
}

fn write_record(out: &mut String, fields: [&str; 6]) {
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_field(out, field);
    }
    out.push_str("\r\n");
}

fn write_field(out: &mut String, field: &str) {
    if field.contains([',', '"', '\r', '\n']) {
        let _ = write!(out, "\"{}\"", field.replace('"', "\"\""));
    } else {
        out.push_str(field);
    }
}
