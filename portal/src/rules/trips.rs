//! Trip lookups: matching a cart to a departure, flattening tickets for the
//! dashboard and PDFs, and the dashboard statistics.

use super::schedule::parse_dmy;
use aventura_backend::models::{Boleto, Bus, Cooperativa, Ruta, Turno};
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{json, Value};

/// Departure matching the trip the client picked.
///
/// `fecha` is `dd/mm/YYYY`; `hora`, `origen` and `destino` must match exactly.
#[must_use]
pub fn find_departure<'a>(
    turnos: &'a [Turno],
    fecha: NaiveDate,
    hora: &str,
    origen: &str,
    destino: &str,
) -> Option<&'a Turno> {
    turnos.iter().find(|turno| {
        let Some(horario) = turno.horario.as_ref() else {
            return false;
        };
        let Some(ruta) = horario.route() else {
            return false;
        };
        parse_dmy(&turno.fecha_salida) == Some(fecha)
            && horario.hora_salida == hora
            && ruta.origen == origen
            && ruta.destino == destino
    })
}

/// Everything a ticket shows, resolved from the nested backend payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TicketView {
    /// Ticket id.
    pub id: i64,
    /// `dd/mm/YYYY`.
    pub fecha_compra: String,
    /// Seat.
    pub asiento: i64,
    /// Price per seat.
    pub precio: f64,
    /// `Vendido`, `Reservado`…
    pub estado: String,
    /// Departure city.
    pub origen: String,
    /// Arrival city.
    pub destino: String,
    /// Route distance.
    pub distancia: f64,
    /// `HH:MM`.
    pub hora_salida: String,
    /// `HH:MM`.
    pub hora_llegada: String,
    /// Departure date, `dd/mm/YYYY`.
    pub fecha_salida: String,
    /// Cooperative name.
    pub operador: String,
    /// Cooperative address.
    pub operador_direccion: String,
    /// Cooperative phone.
    pub operador_telefono: String,
    /// Fleet number, as text.
    pub bus_numero: String,
    /// Plate.
    pub bus_placa: String,
    /// Model.
    pub bus_modelo: String,
    /// Passenger id.
    pub persona_id: Option<i64>,
    /// Passenger given name.
    pub pasajero_nombre: String,
    /// Passenger family name.
    pub pasajero_apellido: String,
    /// Passenger document number.
    pub pasajero_identificacion: String,
    /// Passenger phone.
    pub pasajero_telefono: String,
}

impl TicketView {
    /// Flatten a ticket.
    ///
    /// Route: `horario.ruta`, else `horario.frecuencia.ruta`. Bus:
    /// `turno.bus`, else the route's bus. Date: `turno.fecha_salida`, else
    /// the frequency's.
    #[must_use]
    pub fn from_boleto(boleto: &Boleto) -> Self {
        let turno = boleto.turno.as_ref();
        let horario = turno.and_then(|t| t.horario.as_ref());
        let ruta: Option<&Ruta> = horario.and_then(|h| h.route());
        let bus: Option<&Bus> = turno
            .and_then(|t| t.bus.as_ref())
            .or_else(|| ruta.and_then(|r| r.bus.as_ref()));
        let cooperativa: Option<&Cooperativa> = bus.and_then(|b| b.cooperativa.as_ref());
        let persona = boleto.persona.as_ref();

        let fecha_salida = turno
            .map(|t| t.fecha_salida.clone())
            .filter(|f| !f.is_empty())
            .or_else(|| {
                horario
                    .and_then(|h| h.frecuencia.as_ref())
                    .map(|f| f.fecha_salida.clone())
            })
            .unwrap_or_default();

        Self {
            id: boleto.id_boleto.unwrap_or_default(),
            fecha_compra: boleto.fecha_compra.clone(),
            asiento: boleto.seat().unwrap_or_default(),
            precio: boleto.precio_unitario,
            estado: boleto.estado_boleto.clone(),
            origen: ruta.map(|r| r.origen.clone()).unwrap_or_default(),
            destino: ruta.map(|r| r.destino.clone()).unwrap_or_default(),
            distancia: ruta.map_or(0.0, |r| r.distancia),
            hora_salida: horario.map(|h| h.hora_salida.clone()).unwrap_or_default(),
            hora_llegada: horario.map(|h| h.hora_llegada.clone()).unwrap_or_default(),
            fecha_salida,
            operador: cooperativa.map(|c| c.nombre_cooperativa.clone()).unwrap_or_default(),
            operador_direccion: cooperativa.map(|c| c.direccion.clone()).unwrap_or_default(),
            operador_telefono: cooperativa.map(|c| c.telefono.clone()).unwrap_or_default(),
            bus_numero: bus
                .and_then(|b| b.numero_bus)
                .map(|n| n.to_string())
                .unwrap_or_default(),
            bus_placa: bus.map(|b| b.placa.clone()).unwrap_or_default(),
            bus_modelo: bus.map(|b| b.modelo.clone()).unwrap_or_default(),
            persona_id: boleto.persona_id(),
            pasajero_nombre: persona.map(|p| p.nombre.clone()).unwrap_or_default(),
            pasajero_apellido: persona.map(|p| p.apellido.clone()).unwrap_or_default(),
            pasajero_identificacion: persona
                .map(|p| p.numero_identificacion.clone())
                .unwrap_or_default(),
            pasajero_telefono: persona.map(|p| p.telefono.clone()).unwrap_or_default(),
        }
    }

    /// `"{origen} - {destino}"`.
    #[must_use]
    pub fn route_label(&self) -> String {
        format!("{} - {}", self.origen, self.destino)
    }

    /// Entry of the client dashboard's ticket list.
    #[must_use]
    pub fn dashboard_entry(&self) -> Value {
        json!({
            "id": self.id.to_string(),
            "fecha_compra": self.fecha_compra,
            "asiento": self.asiento,
            "precio": self.precio,
            "origen": self.origen,
            "destino": self.destino,
            "hora_salida": self.hora_salida,
            "hora_llegada": self.hora_llegada,
            "fecha_salida": self.fecha_salida,
            "operador": self.operador,
            "bus_placa": self.bus_placa,
            "distancia": self.distancia,
            "estado": "Activo",
        })
    }
}

/// Client dashboard counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    /// Tickets bought.
    pub viajes_realizados: usize,
    /// Distinct destinations.
    pub destinos_visitados: usize,
    /// Tickets departing today or later.
    pub boletos_activos: usize,
    /// Distinct `origen - destino` pairs.
    pub rutas_favoritas: usize,
    /// Most frequent pair, `Ninguna` without tickets.
    pub ruta_favorita: String,
}

/// Compute the dashboard counters.
#[must_use]
pub fn dashboard_stats(tickets: &[TicketView], today: NaiveDate) -> DashboardStats {
    let mut destinos: Vec<&str> = tickets
        .iter()
        .map(|t| t.destino.as_str())
        .filter(|d| !d.is_empty())
        .collect();
    destinos.sort_unstable();
    destinos.dedup();

    let boletos_activos = tickets
        .iter()
        .filter_map(|t| parse_dmy(&t.fecha_salida))
        .filter(|fecha| *fecha >= today)
        .count();

    // Insertion-ordered counts so ties go to the first route seen.
    let mut counts: Vec<(String, usize)> = Vec::new();
    for label in tickets.iter().map(TicketView::route_label) {
        match counts.iter_mut().find(|(l, _)| *l == label) {
            Some((_, n)) => *n += 1,
            None => counts.push((label, 1)),
        }
    }
    let ruta_favorita = counts
        .iter()
        .fold(None::<&(String, usize)>, |best, entry| match best {
            Some(b) if b.1 >= entry.1 => Some(b),
            _ => Some(entry),
        })
        .map_or_else(|| "Ninguna".to_string(), |(label, _)| label.clone());

    DashboardStats {
        viajes_realizados: tickets.len(),
        destinos_visitados: destinos.len(),
        boletos_activos,
        rutas_favoritas: counts.len(),
        ruta_favorita,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn turnos() -> Vec<Turno> {
        serde_json::from_value(json!([
            {"id_turno": 1, "fecha_salida": "10/07/2025",
             "horario": {"hora_salida": "08:00", "ruta": {"origen": "Loja", "destino": "Quito"}}},
            {"id_turno": 2, "fecha_salida": "10/07/2025",
             "horario": {"hora_salida": "14:00", "ruta": {"origen": "Loja", "destino": "Quito"}}},
            {"id_turno": 3, "fecha_salida": "10/07/2025"}
        ]))
        .unwrap()
    }

    #[test]
    fn test_find_departure() {
        let turnos = turnos();
        let fecha = NaiveDate::from_ymd_opt(2025, 7, 10).unwrap();

        let found = find_departure(&turnos, fecha, "14:00", "Loja", "Quito").unwrap();
        assert_eq!(found.id_turno, Some(2));
        assert!(find_departure(&turnos, fecha, "14:00", "Quito", "Loja").is_none());

        let other_day = NaiveDate::from_ymd_opt(2025, 7, 11).unwrap();
        assert!(find_departure(&turnos, other_day, "08:00", "Loja", "Quito").is_none());
    }

    #[test]
    fn test_ticket_view_resolves_through_frecuencia() {
        let boleto: Boleto = serde_json::from_value(json!({
            "id_boleto": 9,
            "numero_asiento": 4,
            "precio_unitario": "12.5",
            "persona": {"id_persona": 3, "nombre": "Ana", "apellido": "Mora"},
            "turno": {
                "horario": {
                    "hora_salida": "08:00",
                    "frecuencia": {
                        "fecha_salida": "01/08/2025",
                        "ruta": {"origen": "Loja", "destino": "Cuenca",
                                 "bus": {"placa": "LBA-100", "numero_bus": 7,
                                         "cooperativa": {"nombre_cooperativa": "Viajeros"}}}
                    }
                }
            }
        }))
        .unwrap();

        let view = TicketView::from_boleto(&boleto);
        assert_eq!(view.id, 9);
        assert_eq!(view.route_label(), "Loja - Cuenca");
        assert_eq!(view.fecha_salida, "01/08/2025");
        assert_eq!(view.bus_placa, "LBA-100");
        assert_eq!(view.bus_numero, "7");
        assert_eq!(view.operador, "Viajeros");
        assert_eq!(view.persona_id, Some(3));
        assert_eq!(view.dashboard_entry()["id"], "9");
    }

    fn ticket(origen: &str, destino: &str, fecha: &str) -> TicketView {
        TicketView {
            origen: origen.into(),
            destino: destino.into(),
            fecha_salida: fecha.into(),
            ..TicketView::default()
        }
    }

    #[test]
    fn test_dashboard_stats() {
        let today = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
        let tickets = vec![
            ticket("Loja", "Quito", "01/07/2025"),
            ticket("Loja", "Cuenca", "30/06/2025"),
            ticket("Loja", "Cuenca", "05/07/2025"),
            ticket("Loja", "Quito", "sin fecha"),
        ];

        let stats = dashboard_stats(&tickets, today);
        assert_eq!(stats.viajes_realizados, 4);
        assert_eq!(stats.destinos_visitados, 2);
        assert_eq!(stats.boletos_activos, 2);
        assert_eq!(stats.rutas_favoritas, 2);
        assert_eq!(stats.ruta_favorita, "Loja - Quito");
    }

    #[test]
    fn test_empty_dashboard() {
        let today = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
        let stats = dashboard_stats(&[], today);
        assert_eq!(stats.ruta_favorita, "Ninguna");
        assert_eq!(stats.viajes_realizados, 0);
    }
}
