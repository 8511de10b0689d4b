//! Slot payload encoding
//!
//! The payload is a bare JSON array of line items, each shaped as
//! `{product, quantity, size, color, customization}`.

use thiserror::Error;

use crate::items::LineItem;

/// A payload that does not describe a valid cart.
#[derive(Debug, Error)]
#[error("malformed cart payload: {0}")]
pub struct CodecError(#[from] serde_json::Error);

/// Serialize line items for a slot.
///
/// # Errors
///
/// Returns a [`CodecError`] if serialization fails.
pub fn encode(items: &[LineItem]) -> Result<String, CodecError> {
    Ok(serde_json::to_string(items)?)
}

/// Parse a slot payload back into line items.
///
/// Items are validated on the way in: a zero quantity or an invalid product snapshot makes
/// the whole payload malformed.
///
/// # Errors
///
/// Returns a [`CodecError`] if the payload is not a valid cart.
pub fn decode(payload: &str) -> Result<Vec<LineItem>, CodecError> {
    Ok(serde_json::from_str(payload)?)
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;

    use rust_decimal::Decimal;
    use serde_json::{Value, json};
    use testresult::TestResult;

    use crate::{items::Selection, products::Product};

    use super::*;

    fn items() -> TestResult<Vec<LineItem>> {
        let tee = Product::new("tee", "Basic Tee", Decimal::from(60))?
            .with_discount(Decimal::new(125, 1))?
            .with_stock(4)
            .with_sizes(["M"]);

        Ok(vec![
            LineItem::new(
                tee,
                NonZeroU32::MIN.saturating_add(1),
                Selection::variant(Some("M"), Some("Sienna")),
            ),
            LineItem::new(
                Product::new("print", "Custom Print", Decimal::new(24_99, 2))?,
                NonZeroU32::MIN,
                Selection::default().with_customization(json!({"text": "hello", "size": 12})),
            ),
        ])
    }

    #[test]
    fn payload_is_array_of_line_items() -> TestResult {
        let payload = encode(&items()?)?;
        let value: Value = serde_json::from_str(&payload)?;

        let first = value.get(0).ok_or("missing first item")?;

        assert!(value.is_array());
        assert_eq!(first.get("quantity"), Some(&json!(2)));
        assert_eq!(first.get("size"), Some(&json!("M")));
        assert_eq!(first.pointer("/product/_id"), Some(&json!("tee")));

        Ok(())
    }

    #[test]
    fn decode_restores_encoded_items() -> TestResult {
        let items = items()?;

        assert_eq!(decode(&encode(&items)?)?, items);

        Ok(())
    }

    #[test]
    fn decode_accepts_numeric_prices() -> TestResult {
        let payload = r#"[{
            "product": {"_id": "a1", "name": "Hip Bag", "price": 59.99, "discount": 10, "stock": 3},
            "quantity": 1,
            "size": null,
            "color": "red",
            "customization": null
        }]"#;

        let items = decode(payload)?;
        let item = items.first().ok_or("missing item")?;

        assert_eq!(item.product().price(), Decimal::new(59_99, 2));
        assert_eq!(item.color(), Some("red"));

        Ok(())
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(decode("not json").is_err(), "garbage should be malformed");
        assert!(decode(r#"{"items": []}"#).is_err(), "objects are not carts");
        assert!(
            decode(r#"[{"product": {"_id": "a", "price": -1}, "quantity": 1}]"#).is_err(),
            "negative prices are malformed"
        );
    }
}
