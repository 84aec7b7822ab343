//! Backend resource catalogue.

use std::fmt;
use std::str::FromStr;

/// An entity family exposed under `/api/{slug}/…`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    /// Transport cooperative.
    Cooperativa,
    /// Bus.
    Bus,
    /// Route between two cities.
    Ruta,
    /// Intermediate stop.
    Escala,
    /// Daily schedule on a route.
    Horario,
    /// Dated departure of a schedule.
    Turno,
    /// Repetition pattern of a schedule.
    Frecuencia,
    /// Passenger or administrator.
    Persona,
    /// Login account.
    Cuenta,
    /// Payment method.
    Pago,
    /// Ticket.
    Boleto,
    /// Discount.
    Descuento,
}

impl Resource {
    /// Every resource, in menu order.
    pub const ALL: [Self; 12] = [
        Self::Cooperativa,
        Self::Bus,
        Self::Ruta,
        Self::Escala,
        Self::Horario,
        Self::Turno,
        Self::Frecuencia,
        Self::Persona,
        Self::Cuenta,
        Self::Pago,
        Self::Boleto,
        Self::Descuento,
    ];

    /// Path segment (`/api/{slug}/lista`).
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Cooperativa => "cooperativa",
            Self::Bus => "bus",
            Self::Ruta => "ruta",
            Self::Escala => "escala",
            Self::Horario => "horario",
            Self::Turno => "turno",
            Self::Frecuencia => "frecuencia",
            Self::Persona => "persona",
            Self::Cuenta => "cuenta",
            Self::Pago => "pago",
            Self::Boleto => "boleto",
            Self::Descuento => "descuento",
        }
    }

    /// Key holding the array in a `lista` response.
    #[must_use]
    pub const fn collection_key(self) -> &'static str {
        match self {
            Self::Cooperativa => "cooperativas",
            Self::Bus => "buses",
            Self::Ruta => "rutas",
            Self::Escala => "escalas",
            Self::Horario => "horarios",
            Self::Turno => "turnos",
            Self::Frecuencia => "frecuencias",
            Self::Persona => "personas",
            Self::Cuenta => "cuentas",
            Self::Pago => "pagos",
            Self::Boleto => "boletos",
            Self::Descuento => "descuentos",
        }
    }

    /// Key holding the object in a `lista/{id}` response.
    #[must_use]
    pub const fn item_key(self) -> &'static str {
        self.slug()
    }

    /// Primary-key field, `id_{slug}`.
    #[must_use]
    pub fn id_field(self) -> String {
        format!("id_{}", self.slug())
    }

    /// Human-readable singular name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cooperativa => "Cooperativa",
            Self::Bus => "Bus",
            Self::Ruta => "Ruta",
            Self::Escala => "Escala",
            Self::Horario => "Horario",
            Self::Turno => "Turno",
            Self::Frecuencia => "Frecuencia",
            Self::Persona => "Persona",
            Self::Cuenta => "Cuenta",
            Self::Pago => "Método de pago",
            Self::Boleto => "Boleto",
            Self::Descuento => "Descuento",
        }
    }

    /// Grammatical gender of [`label`](Self::label), for participles.
    #[must_use]
    pub const fn is_feminine(self) -> bool {
        matches!(
            self,
            Self::Cooperativa
                | Self::Ruta
                | Self::Escala
                | Self::Frecuencia
                | Self::Persona
                | Self::Cuenta
        )
    }

    /// `participle` with the gender ending (`creado` → `creada`).
    #[must_use]
    pub fn agree(self, participle: &str) -> String {
        match participle.strip_suffix('o') {
            Some(stem) if self.is_feminine() => format!("{stem}a"),
            _ => participle.to_string(),
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Resource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.slug() == s)
            .ok_or_else(|| format!("unknown resource: {s}"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_keys() {
        assert_eq!(Resource::Bus.collection_key(), "buses");
        assert_eq!(Resource::Bus.item_key(), "bus");
        assert_eq!(Resource::Cooperativa.id_field(), "id_cooperativa");
        assert_eq!(Resource::Pago.id_field(), "id_pago");
    }

    #[test]
    fn test_slug_roundtrip() {
        for resource in Resource::ALL {
            assert_eq!(resource.slug().parse::<Resource>().unwrap(), resource);
        }
        assert!("nave".parse::<Resource>().is_err());
    }

    #[test]
    fn test_agreement() {
        assert_eq!(Resource::Ruta.agree("creado"), "creada");
        assert_eq!(Resource::Bus.agree("creado"), "creado");
        assert_eq!(Resource::Cuenta.agree("eliminado"), "eliminada");
    }
}
