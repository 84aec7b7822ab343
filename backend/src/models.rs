//! Lenient views over backend JSON.
//!
//! The backend is not consistent about number encoding: identifiers, phone
//! numbers and prices arrive as JSON numbers in one endpoint and as strings in
//! another. Every struct here defaults missing fields and accepts both forms.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Deserializers that accept numbers or numeric strings.
pub mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// `12`, `"12"` or `12.0` → `Some(12)`; anything else → `None`.
    ///
    /// # Errors
    ///
    /// Only when the input is not valid JSON.
    pub fn opt_i64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
        Ok(as_i64(&Value::deserialize(d)?))
    }

    /// Number or numeric string → `f64`, defaulting to `0.0`.
    ///
    /// # Errors
    ///
    /// Only when the input is not valid JSON.
    pub fn f64<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        Ok(as_f64(&Value::deserialize(d)?).unwrap_or(0.0))
    }

    /// String or number → `String`, with `null` as empty.
    ///
    /// # Errors
    ///
    /// Only when the input is not valid JSON.
    pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(as_string(&Value::deserialize(d)?))
    }

    /// `[1, "2"]`, `"1, 2"` or `3` → list of integers; unparsable items are
    /// dropped.
    ///
    /// # Errors
    ///
    /// Only when the input is not valid JSON.
    pub fn int_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<i64>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Array(items) => items.iter().filter_map(as_i64).collect(),
            Value::String(s) => s
                .split(',')
                .filter_map(|part| part.trim().parse().ok())
                .collect(),
            other => as_i64(&other).into_iter().collect(),
        })
    }

    /// Integer view of a JSON value.
    #[must_use]
    pub fn as_i64(value: &Value) -> Option<i64> {
        match value {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Float view of a JSON value.
    #[must_use]
    pub fn as_f64(value: &Value) -> Option<f64> {
        match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Display string of a JSON scalar; empty for `null` and containers.
    #[must_use]
    pub fn as_string(value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => String::new(),
        }
    }
}

/// Login account attached to a persona.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cuenta {
    /// Primary key.
    #[serde(deserialize_with = "lenient::opt_i64")]
    pub id_cuenta: Option<i64>,
    /// Login email.
    #[serde(deserialize_with = "lenient::string")]
    pub correo: String,
    /// Password as the backend stores it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contrasenia: Option<String>,
    /// `Administrador` or `Cliente`.
    #[serde(deserialize_with = "lenient::string")]
    pub tipo_cuenta: String,
    /// `Activo`, `Bloqueado`…
    #[serde(deserialize_with = "lenient::string")]
    pub estado_cuenta: String,
    /// Fields this layer does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Payment method; also the `pago` resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetodoPago {
    /// Primary key.
    #[serde(deserialize_with = "lenient::opt_i64")]
    pub id_pago: Option<i64>,
    /// `Tarjeta_credito`, `Tarjeta_debito`…
    #[serde(deserialize_with = "lenient::string")]
    pub opcion_pago: String,
    /// Card holder.
    #[serde(deserialize_with = "lenient::string")]
    pub titular: String,
    /// Card number.
    #[serde(deserialize_with = "lenient::string")]
    pub numero_tarjeta: String,
    /// Expiry date.
    #[serde(deserialize_with = "lenient::string")]
    pub fecha_vencimiento: String,
    /// CVV.
    #[serde(deserialize_with = "lenient::string")]
    pub codigo_seguridad: String,
    /// Balance on the method.
    #[serde(deserialize_with = "lenient::f64")]
    pub saldo: f64,
}

/// Passenger or administrator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Persona {
    /// Primary key.
    #[serde(deserialize_with = "lenient::opt_i64")]
    pub id_persona: Option<i64>,
    /// `Cedula`, `Pasaporte`, `Licencia_conducir`.
    #[serde(deserialize_with = "lenient::string")]
    pub tipo_identificacion: String,
    /// Document number.
    #[serde(deserialize_with = "lenient::string")]
    pub numero_identificacion: String,
    /// Given name.
    #[serde(deserialize_with = "lenient::string")]
    pub nombre: String,
    /// Family name.
    #[serde(deserialize_with = "lenient::string")]
    pub apellido: String,
    /// Contact email; often empty, see [`Persona::email`].
    #[serde(deserialize_with = "lenient::string")]
    pub correo: String,
    /// Phone number.
    #[serde(deserialize_with = "lenient::string")]
    pub telefono: String,
    /// Address.
    #[serde(deserialize_with = "lenient::string")]
    pub direccion: String,
    /// Birth date as the backend formats it.
    #[serde(deserialize_with = "lenient::string")]
    pub fecha_nacimiento: String,
    /// `No_definido`, `Masculino`, `Femenino`, `Otro`.
    #[serde(deserialize_with = "lenient::string")]
    pub genero: String,
    /// Fare category, e.g. `Tercera_edad`.
    #[serde(deserialize_with = "lenient::string")]
    pub tipo_tarifa: String,
    /// Wallet balance.
    #[serde(deserialize_with = "lenient::f64")]
    pub saldo_disponible: f64,
    /// Login account.
    pub cuenta: Option<Cuenta>,
    /// Saved payment method.
    pub metodo_pago: Option<MetodoPago>,
    /// Fields this layer does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Persona {
    /// `correo`, falling back to the account email.
    #[must_use]
    pub fn email(&self) -> &str {
        if self.correo.is_empty() {
            self.cuenta.as_ref().map_or("", |c| c.correo.as_str())
        } else {
            &self.correo
        }
    }

    /// Account type, `Cliente` when the persona has no account.
    #[must_use]
    pub fn tipo_cuenta(&self) -> &str {
        self.cuenta
            .as_ref()
            .map(|c| c.tipo_cuenta.as_str())
            .filter(|t| !t.is_empty())
            .unwrap_or("Cliente")
    }
}

/// Transport cooperative.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cooperativa {
    /// Primary key.
    #[serde(deserialize_with = "lenient::opt_i64")]
    pub id_cooperativa: Option<i64>,
    /// Trading name.
    #[serde(deserialize_with = "lenient::string")]
    pub nombre_cooperativa: String,
    /// Tax id.
    #[serde(deserialize_with = "lenient::string")]
    pub ruc: String,
    /// Address.
    #[serde(deserialize_with = "lenient::string")]
    pub direccion: String,
    /// Phone number.
    #[serde(deserialize_with = "lenient::string")]
    pub telefono: String,
    /// Corporate email.
    #[serde(deserialize_with = "lenient::string")]
    pub correo_empresarial: String,
}

/// Bus.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bus {
    /// Primary key.
    #[serde(deserialize_with = "lenient::opt_i64")]
    pub id_bus: Option<i64>,
    /// Fleet number.
    #[serde(deserialize_with = "lenient::opt_i64")]
    pub numero_bus: Option<i64>,
    /// License plate.
    #[serde(deserialize_with = "lenient::string")]
    pub placa: String,
    /// Make.
    #[serde(deserialize_with = "lenient::string")]
    pub marca: String,
    /// Model.
    #[serde(deserialize_with = "lenient::string")]
    pub modelo: String,
    /// Seat count.
    #[serde(deserialize_with = "lenient::opt_i64")]
    pub capacidad_pasajeros: Option<i64>,
    /// Top speed.
    #[serde(deserialize_with = "lenient::f64")]
    pub velocidad: f64,
    /// `Disponible`, `Mantenimiento`…
    #[serde(deserialize_with = "lenient::string")]
    pub estado_bus: String,
    /// Owning cooperative.
    pub cooperativa: Option<Cooperativa>,
}

/// Route between two cities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ruta {
    /// Primary key.
    #[serde(deserialize_with = "lenient::opt_i64")]
    pub id_ruta: Option<i64>,
    /// Departure city.
    #[serde(deserialize_with = "lenient::string")]
    pub origen: String,
    /// Arrival city.
    #[serde(deserialize_with = "lenient::string")]
    pub destino: String,
    /// Price per seat.
    #[serde(deserialize_with = "lenient::f64")]
    pub precio_unitario: f64,
    /// Distance in km.
    #[serde(deserialize_with = "lenient::f64")]
    pub distancia: f64,
    /// Travel time as entered.
    #[serde(deserialize_with = "lenient::string")]
    pub tiempo_estimado: String,
    /// `Disponible`, `No_disponible`.
    #[serde(deserialize_with = "lenient::string")]
    pub estado_ruta: String,
    /// Assigned bus.
    pub bus: Option<Bus>,
    /// Stops: a list or a `{header:{info,next}}` linked list.
    pub escalas: Value,
}

/// Intermediate stop.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Escala {
    /// Primary key.
    #[serde(deserialize_with = "lenient::opt_i64")]
    pub id_escala: Option<i64>,
    /// Place.
    #[serde(deserialize_with = "lenient::string")]
    pub lugar_escala: String,
    /// Stop duration.
    #[serde(deserialize_with = "lenient::string")]
    pub tiempo: String,
}

/// Daily schedule on a route.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Horario {
    /// Primary key.
    #[serde(deserialize_with = "lenient::opt_i64")]
    pub id_horario: Option<i64>,
    /// `HH:MM`.
    #[serde(deserialize_with = "lenient::string")]
    pub hora_salida: String,
    /// `HH:MM`.
    #[serde(deserialize_with = "lenient::string")]
    pub hora_llegada: String,
    /// `Disponible`, `No_disponible`.
    #[serde(deserialize_with = "lenient::string")]
    pub estado_horario: String,
    /// Route served.
    pub ruta: Option<Ruta>,
    /// Repetition pattern; some endpoints hang the route off it instead.
    pub frecuencia: Option<Box<Frecuencia>>,
}

impl Horario {
    /// `ruta`, else `frecuencia.ruta`.
    #[must_use]
    pub fn route(&self) -> Option<&Ruta> {
        self.ruta
            .as_ref()
            .or_else(|| self.frecuencia.as_ref().and_then(|f| f.ruta.as_ref()))
    }
}

/// Repetition pattern of a schedule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Frecuencia {
    /// Primary key.
    #[serde(deserialize_with = "lenient::opt_i64")]
    pub id_frecuencia: Option<i64>,
    /// Repetitions per period.
    #[serde(deserialize_with = "lenient::opt_i64")]
    pub numero_repeticiones: Option<i64>,
    /// `Diario`, `Semanal`…
    #[serde(deserialize_with = "lenient::string")]
    pub periodo: String,
    /// Trip price.
    #[serde(deserialize_with = "lenient::f64")]
    pub precio_recorrido: f64,
    /// `dd/mm/YYYY`, when present.
    #[serde(deserialize_with = "lenient::string")]
    pub fecha_salida: String,
    /// Route, on payloads nested under a horario.
    pub ruta: Option<Ruta>,
    /// Owning schedule.
    pub horario: Option<Box<Horario>>,
}

/// Dated departure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Turno {
    /// Primary key.
    #[serde(deserialize_with = "lenient::opt_i64")]
    pub id_turno: Option<i64>,
    /// Departure number; numeric or free text.
    #[serde(deserialize_with = "lenient::string")]
    pub numero_turno: String,
    /// `dd/mm/YYYY`.
    #[serde(deserialize_with = "lenient::string")]
    pub fecha_salida: String,
    /// `Disponible`, `Cancelado`, `Agotado`.
    #[serde(deserialize_with = "lenient::string")]
    pub estado_turno: String,
    /// Schedule.
    pub horario: Option<Horario>,
    /// Bus, when assigned directly.
    pub bus: Option<Bus>,
}

/// Ticket.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Boleto {
    /// Primary key.
    #[serde(deserialize_with = "lenient::opt_i64")]
    pub id_boleto: Option<i64>,
    /// `dd/mm/YYYY`.
    #[serde(deserialize_with = "lenient::string")]
    pub fecha_compra: String,
    /// Seat.
    #[serde(deserialize_with = "lenient::opt_i64")]
    pub numero_asiento: Option<i64>,
    /// Seats requested on creation.
    #[serde(deserialize_with = "lenient::int_list")]
    pub asientos: Vec<i64>,
    /// Price per seat.
    #[serde(deserialize_with = "lenient::f64")]
    pub precio_unitario: f64,
    /// Price after discounts.
    #[serde(deserialize_with = "lenient::f64")]
    pub precio_final: f64,
    /// `Vendido`, `Reservado`, `Disponible`, `Cancelado`.
    #[serde(deserialize_with = "lenient::string")]
    pub estado_boleto: String,
    /// Passenger.
    pub persona: Option<Persona>,
    /// Departure.
    pub turno: Option<Turno>,
}

impl Boleto {
    /// Passenger id.
    #[must_use]
    pub fn persona_id(&self) -> Option<i64> {
        self.persona.as_ref().and_then(|p| p.id_persona)
    }

    /// Seat: `numero_asiento`, else the first requested seat.
    #[must_use]
    pub fn seat(&self) -> Option<i64> {
        self.numero_asiento.or_else(|| self.asientos.first().copied())
    }
}

/// Discount.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Descuento {
    /// Primary key.
    #[serde(deserialize_with = "lenient::opt_i64")]
    pub id_descuento: Option<i64>,
    /// Name.
    #[serde(deserialize_with = "lenient::string")]
    pub nombre_descuento: String,
    /// Description.
    #[serde(deserialize_with = "lenient::string")]
    pub descripcion: String,
    /// Percentage off.
    #[serde(deserialize_with = "lenient::f64")]
    pub porcentaje: f64,
    /// `Activo`, `Inactivo`, `Expirado`, `Agotado`.
    #[serde(deserialize_with = "lenient::string")]
    pub estado_descuento: String,
    /// A fare category (`Tercera_edad`…) or `Promocional`.
    #[serde(deserialize_with = "lenient::string")]
    pub tipo_descuento: String,
    /// `dd/mm/YYYY`, promotional only.
    #[serde(deserialize_with = "lenient::string")]
    pub fecha_inicio: String,
    /// `dd/mm/YYYY`, promotional only.
    #[serde(deserialize_with = "lenient::string")]
    pub fecha_fin: String,
}

impl Descuento {
    /// `estado_descuento == "Activo"`.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.estado_descuento == "Activo"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_persona_accepts_mixed_numbers() {
        let persona: Persona = serde_json::from_value(json!({
            "id_persona": "7",
            "nombre": "Ana",
            "telefono": 991234567,
            "numero_identificacion": 1712345678,
            "saldo_disponible": "25.50",
            "cuenta": {"id_cuenta": 3, "correo": "ana@example.com", "tipo_cuenta": "Cliente"}
        }))
        .unwrap();

        assert_eq!(persona.id_persona, Some(7));
        assert_eq!(persona.telefono, "991234567");
        assert_eq!(persona.numero_identificacion, "1712345678");
        assert!((persona.saldo_disponible - 25.5).abs() < f64::EPSILON);
        assert_eq!(persona.email(), "ana@example.com");
        assert_eq!(persona.tipo_cuenta(), "Cliente");
    }

    #[test]
    fn test_persona_keeps_unknown_fields() {
        let persona: Persona = serde_json::from_value(json!({
            "id_persona": 1,
            "historial": [1, 2],
            "cuenta": {"id_cuenta": 1, "intentos": 2}
        }))
        .unwrap();

        let back = serde_json::to_value(&persona).unwrap();
        assert_eq!(back["historial"], json!([1, 2]));
        assert_eq!(back["cuenta"]["intentos"], json!(2));
    }

    #[test]
    fn test_nulls_default() {
        let bus: Bus = serde_json::from_value(json!({
            "id_bus": null,
            "placa": null,
            "numero_bus": "12"
        }))
        .unwrap();
        assert_eq!(bus.id_bus, None);
        assert_eq!(bus.placa, "");
        assert_eq!(bus.numero_bus, Some(12));
    }

    #[test]
    fn test_seat_lists() {
        let boleto: Boleto = serde_json::from_value(json!({"asientos": "3, 4,x"})).unwrap();
        assert_eq!(boleto.asientos, vec![3, 4]);
        assert_eq!(boleto.seat(), Some(3));

        let boleto: Boleto =
            serde_json::from_value(json!({"asientos": [5, "6"], "numero_asiento": 9})).unwrap();
        assert_eq!(boleto.asientos, vec![5, 6]);
        assert_eq!(boleto.seat(), Some(9));
    }

    #[test]
    fn test_route_through_frecuencia() {
        let horario: Horario = serde_json::from_value(json!({
            "hora_salida": "08:00",
            "frecuencia": {"ruta": {"origen": "Loja", "destino": "Quito"}}
        }))
        .unwrap();
        assert_eq!(horario.route().map(|r| r.origen.as_str()), Some("Loja"));
    }
}
