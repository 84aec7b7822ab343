//! Printable tickets: the A5 boarding pass and the thermal-printer receipt.

pub mod pdf;
pub mod qr;

pub use pdf::{render_boarding_pass, render_receipt};

use crate::rules::trips::TicketView;
use thiserror::Error;

/// Ticket rendering failures.
#[derive(Debug, Error)]
pub enum TicketError {
    /// QR payload could not be encoded.
    #[error("QR encoding failed: {0}")]
    Qr(#[from] qr::QrError),

    /// PDF could not be built or serialized.
    #[error("PDF rendering failed: {0}")]
    Pdf(#[from] printpdf::Error),
}

/// QR text printed on the boarding pass.
#[must_use]
pub fn boarding_pass_qr(ticket: &TicketView) -> String {
    format!(
        "Boleto #{}\nPasajero: {} {}\nRuta: {}",
        ticket.id,
        ticket.pasajero_nombre,
        ticket.pasajero_apellido,
        ticket.route_label()
    )
}

/// QR text printed on the receipt.
#[must_use]
pub fn receipt_qr(ticket: &TicketView) -> String {
    format!(
        "Ticket #{}\nRuta: {}\nFecha: {}",
        ticket.id,
        ticket.route_label(),
        ticket.fecha_salida
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qr_payloads() {
        let ticket = TicketView {
            id: 3,
            origen: "Loja".into(),
            destino: "Cuenca".into(),
            fecha_salida: "20/10/2026".into(),
            pasajero_nombre: "Ana".into(),
            pasajero_apellido: "Torres".into(),
            ..TicketView::default()
        };
        assert_eq!(
            boarding_pass_qr(&ticket),
            "Boleto #3\nPasajero: Ana Torres\nRuta: Loja - Cuenca"
        );
        assert_eq!(
            receipt_qr(&ticket),
            "Ticket #3\nRuta: Loja - Cuenca\nFecha: 20/10/2026"
        );
    }
}
