//! Route stops: display text and form parsing.

use aventura_backend::models::lenient::{as_i64, as_string};
use aventura_backend::models::Escala;
use serde_json::Value;

/// Stops of a route in order, from either backend encoding: a plain list, or
/// a linked list `{"header": {"info": {...}, "next": {...}}}`.
#[must_use]
pub fn stops(escalas: &Value) -> Vec<Escala> {
    let parse = |info: &Value| Escala {
        id_escala: info.get("id_escala").and_then(as_i64),
        lugar_escala: info.get("lugar_escala").map(as_string).unwrap_or_default(),
        tiempo: info.get("tiempo").map(as_string).unwrap_or_default(),
    };

    match escalas {
        Value::Array(items) => items.iter().map(parse).collect(),
        Value::Object(map) => {
            let mut out = Vec::new();
            let mut node = map.get("header");
            while let Some(current) = node.filter(|n| n.is_object()) {
                if let Some(info) = current.get("info").filter(|i| i.is_object()) {
                    out.push(parse(info));
                }
                node = current.get("next");
            }
            out
        }
        _ => Vec::new(),
    }
}

/// `"Catamayo (15 min), Saraguro (10 min)"`, or `Sin escalas`.
///
/// Stops missing a place or a time are left out.
#[must_use]
pub fn describe_stops(escalas: &Value) -> String {
    let parts: Vec<String> = stops(escalas)
        .into_iter()
        .filter(|e| !e.lugar_escala.is_empty() && !e.tiempo.is_empty())
        .map(|e| format!("{} ({})", e.lugar_escala, e.tiempo))
        .collect();

    if parts.is_empty() {
        "Sin escalas".to_string()
    } else {
        parts.join(", ")
    }
}

/// Stops submitted as `lugar_escala_{i}`, `tiempo_escala_{i}` and optional
/// `id_escala_{i}`, for `i = 0, 1, …` until the first missing index.
/// Blank places are skipped.
#[must_use]
pub fn stops_from_form(form: &[(String, String)]) -> Vec<Escala> {
    let field = |name: String| {
        form.iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.trim())
    };

    (0..)
        .map_while(|i| field(format!("lugar_escala_{i}")).map(|lugar| (i, lugar)))
        .filter(|(_, lugar)| !lugar.is_empty())
        .map(|(i, lugar)| Escala {
            id_escala: field(format!("id_escala_{i}")).and_then(|id| id.parse().ok()),
            lugar_escala: lugar.to_string(),
            tiempo: field(format!("tiempo_escala_{i}")).unwrap_or_default().to_string(),
        })
        .collect()
}
