//! Ticket layouts.
//!
//! Coordinates are millimetres from the top-left corner; [`Page`] flips
//! them to the PDF's bottom-left origin.

use super::qr::QrMatrix;
use super::{boarding_pass_qr, receipt_qr, TicketError};
use crate::rules::trips::TicketView;
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
    Rect, Rgb,
};

const BRAND: (u8, u8, u8) = (122, 183, 48);
const WHITE: (u8, u8, u8) = (255, 255, 255);
const BLACK: (u8, u8, u8) = (0, 0, 0);
const GREY: (u8, u8, u8) = (110, 110, 110);

const A5: (f32, f32) = (148.0, 210.0);
const RECEIPT: (f32, f32) = (80.0, 160.0);

fn rgb((r, g, b): (u8, u8, u8)) -> Color {
    Color::Rgb(Rgb::new(
        f32::from(r) / 255.0,
        f32::from(g) / 255.0,
        f32::from(b) / 255.0,
        None,
    ))
}

fn or_na(value: &str) -> &str {
    if value.is_empty() { "N/A" } else { value }
}

struct Page {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    height: f32,
}

impl Page {
    fn new(title: &str, (width, height): (f32, f32)) -> Result<Self, TicketError> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(width), Mm(height), "Layer 1");
        let regular = doc.add_builtin_font(BuiltinFont::Helvetica)?;
        let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;
        let layer = doc.get_page(page).get_layer(layer);
        Ok(Self { doc, layer, regular, bold, height })
    }

    fn color(&self, color: (u8, u8, u8)) {
        self.layer.set_fill_color(rgb(color));
    }

    fn text(&self, text: &str, size: f32, x: f32, top: f32) {
        self.layer
            .use_text(text, size, Mm(x), Mm(self.height - top), &self.regular);
    }

    fn bold(&self, text: &str, size: f32, x: f32, top: f32) {
        self.layer
            .use_text(text, size, Mm(x), Mm(self.height - top), &self.bold);
    }

    fn rect(&self, x: f32, top: f32, width: f32, height: f32) {
        let bottom = self.height - top - height;
        self.layer
            .add_rect(Rect::new(Mm(x), Mm(bottom), Mm(x + width), Mm(bottom + height)));
    }

    /// Draw a `label: value` row; returns the next row's top.
    fn row(&self, label: &str, value: &str, x: f32, top: f32) -> f32 {
        self.bold(&format!("{label}:"), 9.0, x, top);
        self.text(or_na(value), 9.0, x + 38.0, top);
        top + 6.0
    }

    #[allow(clippy::cast_precision_loss)]
    fn qr(&self, qr: &QrMatrix, x: f32, top: f32, size: f32) {
        let module = size / qr.width() as f32;
        self.color(BLACK);
        for (row, col) in qr.dark_modules() {
            self.rect(x + col as f32 * module, top + row as f32 * module, module, module);
        }
    }

    fn finish(self) -> Result<Vec<u8>, TicketError> {
        Ok(self.doc.save_to_bytes()?)
    }
}

/// A5 boarding pass.
///
/// # Errors
///
/// When the QR payload does not fit or the document cannot be serialized.
pub fn render_boarding_pass(ticket: &TicketView) -> Result<Vec<u8>, TicketError> {
    let qr = QrMatrix::encode(&boarding_pass_qr(ticket))?;
    let page = Page::new(&format!("Boleto {}", ticket.id), A5)?;
    let (width, _) = A5;

    page.color(BRAND);
    page.rect(0.0, 0.0, width, 20.0);
    page.color(WHITE);
    page.bold("BOLETO", 16.0, 60.0, 13.0);

    page.color(BLACK);
    page.bold(&format!("Boleto N° {}", ticket.id), 11.0, 55.0, 32.0);

    page.color(BRAND);
    page.bold("DETALLES DEL VIAJE", 10.0, 10.0, 44.0);
    page.color(BLACK);
    let mut top = 51.0;
    top = page.row("Fecha de compra", &ticket.fecha_compra, 10.0, top);
    top = page.row("Fecha de viaje", &ticket.fecha_salida, 10.0, top);
    top = page.row("Hora de salida", &ticket.hora_salida, 10.0, top);
    top = page.row("Origen", &ticket.origen, 10.0, top);
    top = page.row("Destino", &ticket.destino, 10.0, top);
    top = page.row("Estado", &ticket.estado, 10.0, top);

    page.color(BRAND);
    page.bold("INFORMACIÓN DEL BUS", 10.0, 10.0, top + 4.0);
    page.color(BLACK);
    top += 11.0;
    top = page.row("Cooperativa", &ticket.operador, 10.0, top);
    top = page.row("Bus N°", &ticket.bus_numero, 10.0, top);
    top = page.row("Placa", &ticket.bus_placa, 10.0, top);
    top = page.row("Asiento", &ticket.asiento.to_string(), 10.0, top);
    top = page.row("Precio", &format!("${:.2}", ticket.precio), 10.0, top);
    top = page.row("Modelo", &ticket.bus_modelo, 10.0, top);

    page.color(BRAND);
    page.bold("DATOS DEL PASAJERO", 10.0, 10.0, top + 4.0);
    page.color(BLACK);
    top += 11.0;
    let nombre = format!("{} {}", ticket.pasajero_nombre, ticket.pasajero_apellido);
    top = page.row("Nombre", nombre.trim(), 10.0, top);
    top = page.row("Identificación", &ticket.pasajero_identificacion, 10.0, top);
    page.row("Teléfono", &ticket.pasajero_telefono, 10.0, top);

    page.qr(&qr, 100.0, 48.0, 38.0);

    page.color(GREY);
    page.text(or_na(&ticket.operador_direccion), 8.0, 10.0, 196.0);
    page.text(&format!("Tel: {}", or_na(&ticket.operador_telefono)), 8.0, 10.0, 201.0);
    page.text("Presente este boleto al abordar", 8.0, 90.0, 201.0);

    page.finish()
}

/// 80×160 mm receipt.
///
/// # Errors
///
/// When the QR payload does not fit or the document cannot be serialized.
pub fn render_receipt(ticket: &TicketView) -> Result<Vec<u8>, TicketError> {
    let qr = QrMatrix::encode(&receipt_qr(ticket))?;
    let page = Page::new(&format!("Ticket {}", ticket.id), RECEIPT)?;
    let (width, _) = RECEIPT;

    page.color(BRAND);
    page.rect(0.0, 0.0, width, 16.0);
    page.color(WHITE);
    page.bold(or_na(&ticket.operador), 11.0, 5.0, 10.0);

    page.color(BLACK);
    page.bold(&format!("TICKET #{}", ticket.id), 12.0, 22.0, 25.0);

    let row = |label: &str, value: &str, top: f32| {
        page.bold(label, 7.0, 5.0, top);
        page.text(or_na(value), 7.0, 30.0, top);
        top + 5.0
    };

    page.bold("VIAJE", 8.0, 5.0, 34.0);
    let mut top = 40.0;
    top = row("Ruta", &ticket.route_label(), top);
    top = row("Fecha", &ticket.fecha_salida, top);
    top = row("Salida", &ticket.hora_salida, top);
    top = row("Llegada", &ticket.hora_llegada, top);

    page.bold("PASAJERO", 8.0, 5.0, top + 2.0);
    top += 8.0;
    let nombre = format!("{} {}", ticket.pasajero_nombre, ticket.pasajero_apellido);
    top = row("Nombre", nombre.trim(), top);
    top = row("Cédula", &ticket.pasajero_identificacion, top);

    page.bold("SERVICIO", 8.0, 5.0, top + 2.0);
    top += 8.0;
    top = row("Bus", &ticket.bus_numero, top);
    top = row("Placa", &ticket.bus_placa, top);
    top = row("Asiento", &ticket.asiento.to_string(), top);
    top = row("Total", &format!("${:.2}", ticket.precio), top);

    page.qr(&qr, 22.0, top + 3.0, 36.0);

    page.color(GREY);
    page.text("Gracias por viajar con nosotros", 7.0, 14.0, 150.0);
    page.text(&format!("Compra: {}", or_na(&ticket.fecha_compra)), 7.0, 22.0, 155.0);

    page.finish()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn ticket() -> TicketView {
        TicketView {
            id: 12,
            fecha_compra: "01/10/2026".into(),
            asiento: 7,
            precio: 15.5,
            estado: "Vendido".into(),
            origen: "Loja".into(),
            destino: "Quito".into(),
            hora_salida: "08:00".into(),
            fecha_salida: "20/10/2026".into(),
            operador: "Cooperativa Loja".into(),
            pasajero_nombre: "Ana".into(),
            pasajero_apellido: "Torres".into(),
            ..TicketView::default()
        }
    }

    #[test]
    fn test_boarding_pass_is_pdf() {
        let bytes = render_boarding_pass(&ticket()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_receipt_is_pdf() {
        let bytes = render_receipt(&ticket()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_missing_values_show_placeholder() {
        assert_eq!(or_na(""), "N/A");
        assert_eq!(or_na("Loja"), "Loja");
    }
}
