//! Discount stacking for the payment screen.

use super::schedule::parse_dmy;
use aventura_backend::models::Descuento;
use chrono::NaiveDate;
use serde::Serialize;

/// Discount type of date-bounded campaigns.
pub const PROMOTIONAL: &str = "Promocional";

/// One discount that applies to the purchase.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppliedDiscount {
    /// Discount name.
    pub nombre: String,
    /// Percentage off.
    pub porcentaje: f64,
    /// `Tarifa Base` or `Promocional`.
    pub tipo: &'static str,
    /// `Válido hasta {fecha_fin}` for promotions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vigencia: Option<String>,
}

/// Price breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quote {
    /// Discounts in application order: fare base first, then promotions.
    pub descuentos_aplicables: Vec<AppliedDiscount>,
    /// `precio_unitario × seats`.
    pub precio_original: f64,
    /// Original minus savings.
    pub precio_final: f64,
    /// Amount saved.
    pub ahorro_total: f64,
    /// Sum of the applied percentages.
    pub porcentaje_descuento_total: f64,
}

fn promotion_running(descuento: &Descuento, today: NaiveDate) -> bool {
    match (parse_dmy(&descuento.fecha_inicio), parse_dmy(&descuento.fecha_fin)) {
        (Some(inicio), Some(fin)) => inicio <= today && today <= fin,
        _ => false,
    }
}

/// Price `seats` seats for a passenger on fare `tipo_tarifa`.
///
/// Active discounts whose type equals the fare apply, then active promotions
/// running on `today`. Percentages add up.
#[must_use]
pub fn quote(
    precio_unitario: f64,
    seats: usize,
    tipo_tarifa: &str,
    descuentos: &[Descuento],
    today: NaiveDate,
) -> Quote {
    let fare_base = descuentos
        .iter()
        .filter(|d| d.is_active() && d.tipo_descuento == tipo_tarifa)
        .map(|d| AppliedDiscount {
            nombre: d.nombre_descuento.clone(),
            porcentaje: d.porcentaje,
            tipo: "Tarifa Base",
            vigencia: None,
        });

    let promotions = descuentos
        .iter()
        .filter(|d| d.is_active() && d.tipo_descuento == PROMOTIONAL)
        .filter(|d| promotion_running(d, today))
        .map(|d| AppliedDiscount {
            nombre: d.nombre_descuento.clone(),
            porcentaje: d.porcentaje,
            tipo: PROMOTIONAL,
            vigencia: Some(format!("Válido hasta {}", d.fecha_fin)),
        });

    let descuentos_aplicables: Vec<_> = fare_base.chain(promotions).collect();
    let porcentaje_descuento_total = descuentos_aplicables.iter().map(|d| d.porcentaje).sum();

    #[allow(clippy::cast_precision_loss)]
    let precio_original = precio_unitario * seats as f64;
    let ahorro_total = precio_original * porcentaje_descuento_total / 100.0;

    Quote {
        descuentos_aplicables,
        precio_original,
        precio_final: precio_original - ahorro_total,
        ahorro_total,
        porcentaje_descuento_total,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn descuento(nombre: &str, tipo: &str, pct: f64, estado: &str, rango: (&str, &str)) -> Descuento {
        Descuento {
            nombre_descuento: nombre.into(),
            tipo_descuento: tipo.into(),
            porcentaje: pct,
            estado_descuento: estado.into(),
            fecha_inicio: rango.0.into(),
            fecha_fin: rango.1.into(),
            ..Descuento::default()
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    #[test]
    fn test_fare_and_promotion_stack() {
        let descuentos = vec![
            descuento("Tercera edad", "Tercera_edad", 50.0, "Activo", ("", "")),
            descuento("Verano", PROMOTIONAL, 10.0, "Activo", ("01/06/2025", "30/06/2025")),
            descuento("Navidad", PROMOTIONAL, 20.0, "Activo", ("01/12/2025", "31/12/2025")),
            descuento("Estudiante", "Estudiante", 30.0, "Activo", ("", "")),
            descuento("Viejo", "Tercera_edad", 5.0, "Inactivo", ("", "")),
        ];

        let q = quote(10.0, 2, "Tercera_edad", &descuentos, today());

        assert_eq!(q.descuentos_aplicables.len(), 2);
        assert_eq!(q.descuentos_aplicables[0].tipo, "Tarifa Base");
        assert_eq!(
            q.descuentos_aplicables[1].vigencia.as_deref(),
            Some("Válido hasta 30/06/2025")
        );
        assert!((q.porcentaje_descuento_total - 60.0).abs() < f64::EPSILON);
        assert!((q.precio_original - 20.0).abs() < f64::EPSILON);
        assert!((q.ahorro_total - 12.0).abs() < 1e-9);
        assert!((q.precio_final - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_promotion_bounds_are_inclusive() {
        let descuentos = vec![descuento("Junio", PROMOTIONAL, 10.0, "Activo", ("15/06/2025", "15/06/2025"))];
        assert_eq!(quote(5.0, 1, "General", &descuentos, today()).descuentos_aplicables.len(), 1);
    }

    #[test]
    fn test_no_discounts() {
        let q = quote(7.5, 0, "General", &[], today());
        assert!(q.descuentos_aplicables.is_empty());
        assert!(q.precio_final.abs() < f64::EPSILON);
    }
}
