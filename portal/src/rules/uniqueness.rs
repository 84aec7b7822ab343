//! Duplicate checks run against the backend's full listing before a write.
//!
//! Each `*_conflict` function returns the message to show, or `None`.
//! `exclude_id` skips the row being edited.

use aventura_backend::models::{Bus, Cooperativa, Cuenta, Descuento, Persona, Ruta};

/// Strip the separators people type into phone numbers.
#[must_use]
pub fn normalize_phone(phone: &str) -> String {
    phone
        .chars()
        .filter(|c| !matches!(c, ' ' | '(' | ')' | '-'))
        .collect()
}

const fn is_excluded(id: Option<i64>, exclude_id: Option<i64>) -> bool {
    matches!((id, exclude_id), (Some(a), Some(b)) if a == b)
}

/// Cooperativa: name, RUC, phone, email; the first field that collides on
/// the first colliding row wins.
#[must_use]
pub fn cooperativa_conflict(
    existing: &[Cooperativa],
    candidate: &Cooperativa,
    exclude_id: Option<i64>,
) -> Option<&'static str> {
    let nombre = candidate.nombre_cooperativa.trim().to_lowercase();
    let ruc = candidate.ruc.trim();
    let telefono = normalize_phone(&candidate.telefono);
    let correo = candidate.correo_empresarial.trim().to_lowercase();

    existing
        .iter()
        .filter(|c| !is_excluded(c.id_cooperativa, exclude_id))
        .find_map(|c| {
            if c.nombre_cooperativa.trim().to_lowercase() == nombre {
                Some("El nombre de la cooperativa ya existe")
            } else if !ruc.is_empty() && c.ruc.trim() == ruc {
                Some("El RUC ya está registrado")
            } else if !telefono.is_empty() && normalize_phone(&c.telefono) == telefono {
                Some("El teléfono ya está registrado")
            } else if !correo.is_empty() && c.correo_empresarial.trim().to_lowercase() == correo {
                Some("El correo ya está registrado")
            } else {
                None
            }
        })
}

/// Bus: fleet number, then plate (case-insensitive).
#[must_use]
pub fn bus_conflict(
    existing: &[Bus],
    numero_bus: Option<i64>,
    placa: &str,
    exclude_id: Option<i64>,
) -> Option<&'static str> {
    let placa = placa.trim().to_uppercase();
    let others = || existing.iter().filter(|b| !is_excluded(b.id_bus, exclude_id));

    if numero_bus.is_some() && others().any(|b| b.numero_bus == numero_bus) {
        return Some("El número de bus ya existe");
    }
    if !placa.is_empty() && others().any(|b| b.placa.trim().to_uppercase() == placa) {
        return Some("La placa ya está registrada");
    }
    None
}

/// Next fleet number: highest + 1, or 1 for an empty fleet.
#[must_use]
pub fn next_bus_number(existing: &[Bus]) -> i64 {
    existing
        .iter()
        .filter_map(|b| b.numero_bus)
        .max()
        .map_or(1, |n| n + 1)
}

/// Persona whose contact or account email equals `correo` (case-insensitive).
#[must_use]
pub fn persona_with_email<'a>(personas: &'a [Persona], correo: &str) -> Option<&'a Persona> {
    let correo = correo.trim().to_lowercase();
    if correo.is_empty() {
        return None;
    }
    personas.iter().find(|p| {
        p.correo.trim().to_lowercase() == correo
            || p.cuenta
                .as_ref()
                .is_some_and(|c| c.correo.trim().to_lowercase() == correo)
    })
}

/// Persona with the same normalized phone; never matches an empty phone.
#[must_use]
pub fn persona_with_phone<'a>(personas: &'a [Persona], telefono: &str) -> Option<&'a Persona> {
    let telefono = normalize_phone(telefono);
    if telefono.is_empty() {
        return None;
    }
    personas
        .iter()
        .find(|p| normalize_phone(&p.telefono) == telefono)
}

/// Persona: id number, then email (persona or account), then phone.
#[must_use]
pub fn persona_conflict(
    existing: &[Persona],
    numero_identificacion: &str,
    correo: &str,
    telefono: &str,
    exclude_id: Option<i64>,
) -> Option<&'static str> {
    let numero = numero_identificacion.trim();
    let others = || existing.iter().filter(|p| !is_excluded(p.id_persona, exclude_id));

    if !numero.is_empty() && others().any(|p| p.numero_identificacion.trim() == numero) {
        return Some("Ya existe una persona registrada con este número de identificación");
    }
    let others: Vec<Persona> = others().cloned().collect();
    if persona_with_email(&others, correo).is_some() {
        return Some("Ya existe una persona registrada con este correo electrónico");
    }
    if persona_with_phone(&others, telefono).is_some() {
        return Some("Ya existe una persona registrada con este número de teléfono");
    }
    None
}

/// Cuenta: email (case-insensitive).
#[must_use]
pub fn cuenta_conflict(
    existing: &[Cuenta],
    correo: &str,
    exclude_id: Option<i64>,
) -> Option<&'static str> {
    let correo = correo.trim().to_lowercase();
    existing
        .iter()
        .filter(|c| !is_excluded(c.id_cuenta, exclude_id))
        .any(|c| c.correo.trim().to_lowercase() == correo)
        .then_some("El correo ya está registrado")
}

/// Descuento: name (case-insensitive).
#[must_use]
pub fn descuento_conflict(
    existing: &[Descuento],
    nombre: &str,
    exclude_id: Option<i64>,
) -> Option<&'static str> {
    let nombre = nombre.trim().to_lowercase();
    existing
        .iter()
        .filter(|d| !is_excluded(d.id_descuento, exclude_id))
        .any(|d| d.nombre_descuento.trim().to_lowercase() == nombre)
        .then_some("Ya existe un descuento con ese nombre")
}

/// Ruta: an available route with the same origin and destination already on
/// this bus.
#[must_use]
pub fn ruta_conflict(
    existing: &[Ruta],
    origen: &str,
    destino: &str,
    bus_id: i64,
    exclude_id: Option<i64>,
) -> Option<&'static str> {
    let origen = origen.trim().to_lowercase();
    let destino = destino.trim().to_lowercase();

    existing
        .iter()
        .filter(|r| !is_excluded(r.id_ruta, exclude_id))
        .any(|r| {
            r.origen.trim().to_lowercase() == origen
                && r.destino.trim().to_lowercase() == destino
                && r.bus.as_ref().and_then(|b| b.id_bus) == Some(bus_id)
                && r.estado_ruta == "Disponible"
        })
        .then_some("Este bus ya tiene asignada una ruta con el mismo origen y destino")
}
