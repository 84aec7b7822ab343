//! Schedule arithmetic: minute-of-day overlaps, date formats and departure
//! numbering.

use aventura_backend::models::{Horario, Turno};
use chrono::NaiveDate;

/// Date format the backend stores.
pub const DMY: &str = "%d/%m/%Y";
/// Date format of HTML date inputs.
pub const ISO: &str = "%Y-%m-%d";

/// `"HH:MM"` (seconds ignored) → minutes since midnight.
#[must_use]
pub fn minutes_of_day(hhmm: &str) -> Option<u32> {
    let mut parts = hhmm.trim().split(':');
    let hours: u32 = parts.next()?.trim().parse().ok()?;
    let minutes: u32 = parts.next()?.trim().parse().ok()?;
    (hours < 24 && minutes < 60).then_some(hours * 60 + minutes)
}

/// Half-open interval overlap in minutes: touching ends do not overlap.
#[must_use]
pub const fn overlaps(new: (u32, u32), existing: (u32, u32)) -> bool {
    !(new.1 <= existing.0 || new.0 >= existing.1)
}

/// First horario on `ruta_id` whose time range overlaps `salida..llegada`.
///
/// Rows with unparsable times are ignored.
#[must_use]
pub fn find_schedule_conflict(
    horarios: &[Horario],
    ruta_id: i64,
    salida: &str,
    llegada: &str,
    exclude_id: Option<i64>,
) -> Option<&'static str> {
    let (Some(start), Some(end)) = (minutes_of_day(salida), minutes_of_day(llegada)) else {
        return None;
    };

    horarios
        .iter()
        .filter(|h| exclude_id.is_none() || h.id_horario != exclude_id)
        .filter(|h| h.ruta.as_ref().and_then(|r| r.id_ruta) == Some(ruta_id))
        .filter_map(|h| Some((minutes_of_day(&h.hora_salida)?, minutes_of_day(&h.hora_llegada)?)))
        .any(|existing| overlaps((start, end), existing))
        .then_some("Ya existe un horario para esta ruta en ese rango de tiempo")
}

/// `YYYY-MM-DD` → `dd/mm/YYYY`.
#[must_use]
pub fn iso_to_dmy(iso: &str) -> Option<String> {
    NaiveDate::parse_from_str(iso.trim(), ISO)
        .ok()
        .map(|d| d.format(DMY).to_string())
}

/// `dd/mm/YYYY` → `YYYY-MM-DD`, for prefilling date inputs.
#[must_use]
pub fn dmy_to_iso(dmy: &str) -> Option<String> {
    parse_dmy(dmy).map(|d| d.format(ISO).to_string())
}

/// Parse a backend date.
#[must_use]
pub fn parse_dmy(dmy: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(dmy.trim(), DMY).ok()
}

/// Numeric value of a departure number; `"T12"` counts as 12.
#[must_use]
pub fn turn_number_value(numero: &str) -> Option<i64> {
    let digits: String = numero.chars().filter(char::is_ascii_digit).collect();
    digits.parse().ok()
}

/// Next departure number: highest + 1, or 1.
#[must_use]
pub fn next_turn_number(turnos: &[Turno]) -> i64 {
    turnos
        .iter()
        .filter_map(|t| turn_number_value(&t.numero_turno))
        .max()
        .unwrap_or(0)
        + 1
}

/// A departure already exists for this date (`dd/mm/YYYY`) and horario, or
/// the number is taken by another row.
#[must_use]
pub fn turno_conflict(
    turnos: &[Turno],
    fecha_salida: &str,
    horario_id: i64,
    numero: Option<i64>,
    exclude_id: Option<i64>,
) -> Option<&'static str> {
    let others = || {
        turnos
            .iter()
            .filter(move |t| exclude_id.is_none() || t.id_turno != exclude_id)
    };

    if numero.is_some() && others().any(|t| turn_number_value(&t.numero_turno) == numero) {
        return Some("Ya existe un turno con ese número");
    }
    others()
        .any(|t| {
            t.fecha_salida == fecha_salida
                && t.horario.as_ref().and_then(|h| h.id_horario) == Some(horario_id)
        })
        .then_some("Ya existe un turno para esta fecha y horario")
}
