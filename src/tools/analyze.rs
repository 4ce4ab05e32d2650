use crate::core::AnalyzeError;
use crate::scoring::score_item;
use crate::types::ScoreResult;
use serde_json::Value;

fn read_price(value: &Value) -> Result<f64, AnalyzeError> {
    let price = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    price
        .filter(|p| p.is_finite() && *p >= 0.0)
        .ok_or(AnalyzeError::InvalidPrice)
}

/// Score a caller-supplied `{ "title": ..., "price": ... }` object.
///
/// `price` may be a JSON number or a numeric string. Missing keys (or a body
/// that is not an object) give [`AnalyzeError::MissingField`].
pub fn analyze_item(payload: &Value) -> Result<ScoreResult, AnalyzeError> {
    let object = payload.as_object().ok_or(AnalyzeError::MissingField)?;
    let (Some(title), Some(price)) = (object.get("title"), object.get("price")) else {
        return Err(AnalyzeError::MissingField);
    };

    let title = title.as_str().ok_or(AnalyzeError::InvalidTitle)?;
    let price = read_price(price)?;

    Ok(score_item(title, price))
}
