//! Per-entity table columns, form fields and save payloads.

use crate::handlers::{form_value, today};
use crate::rules::escalas::{describe_stops, stops, stops_from_form};
use crate::rules::pricing::PROMOTIONAL;
use crate::rules::schedule::{
    dmy_to_iso, find_schedule_conflict, iso_to_dmy, minutes_of_day, next_turn_number,
    turn_number_value, turno_conflict, DMY,
};
use crate::rules::uniqueness::{
    bus_conflict, cooperativa_conflict, cuenta_conflict, descuento_conflict, next_bus_number,
    persona_conflict, ruta_conflict,
};
use crate::views::pages::{GENEROS, TIPOS_IDENTIFICACION, TIPOS_TARIFA};
use crate::views::{escape, Column, Field, FieldKind, FormView};
use aventura_backend::models::lenient::{as_i64, as_string};
use aventura_backend::models::{
    Bus, Cooperativa, Cuenta, Descuento, Horario, Persona, Ruta, Turno,
};
use aventura_backend::{BackendClient, BackendError, Resource};
use chrono::Duration;
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use std::fmt::Write;

const ESTADOS_BUS: [&str; 3] = ["Disponible", "Mantenimiento", "No_disponible"];
const ESTADOS_DISPONIBILIDAD: [&str; 2] = ["Disponible", "No_disponible"];
const ESTADOS_TURNO: [&str; 3] = ["Disponible", "Cancelado", "Agotado"];
const ESTADOS_BOLETO: [&str; 4] = ["Vendido", "Reservado", "Disponible", "Cancelado"];
const ESTADOS_DESCUENTO: [&str; 4] = ["Activo", "Inactivo", "Expirado", "Agotado"];
const PERIODOS: [&str; 3] = ["Diario", "Semanal", "Mensual"];
const TIPOS_CUENTA: [&str; 2] = ["Administrador", "Cliente"];
const ESTADOS_CUENTA: [&str; 3] = ["Activo", "Inactivo", "Suspendido"];
const OPCIONES_PAGO: [&str; 2] = ["Tarjeta_credito", "Tarjeta_debito"];
const PAYMENT_FIELDS: [&str; 6] = [
    "opcion_pago",
    "titular",
    "numero_tarjeta",
    "fecha_vencimiento",
    "codigo_seguridad",
    "saldo",
];

/// Fare-category discounts seeded by the backend; their type and dates are
/// fixed.
const LAST_BUILTIN_DISCOUNT: i64 = 5;
const PROMOTION_DAYS: i64 = 30;

/// Create or edit an existing id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// New item.
    Create,
    /// Existing item.
    Edit(i64),
}

impl Mode {
    const fn exclude(self) -> Option<i64> {
        match self {
            Self::Create => None,
            Self::Edit(id) => Some(id),
        }
    }

    /// POST target of the form.
    #[must_use]
    pub fn action(self, resource: Resource) -> String {
        match self {
            Self::Create => format!("/{}/crear", resource.slug()),
            Self::Edit(id) => format!("/{}/editar/{id}", resource.slug()),
        }
    }

    fn title(self, resource: Resource) -> String {
        match self {
            Self::Create => format!("Crear {}", resource.label().to_lowercase()),
            Self::Edit(_) => format!("Editar {}", resource.label().to_lowercase()),
        }
    }
}

/// Why a submitted form was not saved.
#[derive(Debug)]
pub enum Rejection {
    /// Input failed a check; shown above the form.
    Invalid(String),
    /// Loading the data the checks need failed.
    Backend(BackendError),
}

impl From<BackendError> for Rejection {
    fn from(e: BackendError) -> Self {
        Self::Backend(e)
    }
}

impl From<&str> for Rejection {
    fn from(message: &str) -> Self {
        Self::Invalid(message.to_string())
    }
}

type Checked<T> = Result<T, Rejection>;

// ═══════════════════════════════════════════════════════════════════════
// Small helpers
// ═══════════════════════════════════════════════════════════════════════

/// Text at a dotted path of an item, empty when absent.
fn at(item: Option<&Value>, path: &str) -> String {
    item.and_then(|item| path.split('.').try_fold(item, |v, key| v.get(key)))
        .map(as_string)
        .unwrap_or_default()
}

fn int(form: &[(String, String)], name: &str, message: &str) -> Checked<i64> {
    form_value(form, name).parse().map_err(|_| message.into())
}

fn float(form: &[(String, String)], name: &str, message: &str) -> Checked<f64> {
    form_value(form, name).parse().map_err(|_| message.into())
}

fn require(form: &[(String, String)], names: &[&str], message: &str) -> Checked<()> {
    if names.iter().any(|name| form_value(form, name).is_empty()) {
        Err(message.into())
    } else {
        Ok(())
    }
}

fn text(form: &[(String, String)], name: &str) -> Value {
    Value::String(form_value(form, name).to_string())
}

/// Insert the primary key when editing.
fn with_id(mut payload: Value, key: &str, mode: Mode) -> Value {
    if let (Mode::Edit(id), Some(map)) = (mode, payload.as_object_mut()) {
        map.insert(key.to_string(), json!(id));
    }
    payload
}

/// Items for a select; a failed load leaves the select empty.
async fn load<T: DeserializeOwned>(backend: &BackendClient, resource: Resource) -> Vec<T> {
    backend.list(resource).await.unwrap_or_else(|e| {
        tracing::warn!(%resource, error = %e, "Could not load form options");
        Vec::new()
    })
}

fn choices<T>(
    items: &[T],
    id: impl Fn(&T) -> Option<i64>,
    label: impl Fn(&T) -> String,
) -> FieldKind {
    FieldKind::Select(
        items
            .iter()
            .filter_map(|item| id(item).map(|id| (id.to_string(), label(item))))
            .collect(),
    )
}

/// Backend-provided option list, or the fallback.
async fn options_or(
    backend: &BackendClient,
    resource: Resource,
    name: &str,
    key: &str,
    fallback: &[&str],
) -> Vec<String> {
    match backend.options(resource, name, key).await {
        Ok(options) if !options.is_empty() => options,
        Ok(_) => fallback.iter().map(ToString::to_string).collect(),
        Err(e) => {
            tracing::warn!(%resource, name, error = %e, "Falling back to built-in options");
            fallback.iter().map(ToString::to_string).collect()
        }
    }
}

fn route_label(ruta: &Ruta) -> String {
    format!("{} - {}", ruta.origen, ruta.destino)
}

fn horario_label(horario: &Horario) -> String {
    let route = horario.route().map(route_label).unwrap_or_default();
    format!("{} - {} ({route})", horario.hora_salida, horario.hora_llegada)
}

// ═══════════════════════════════════════════════════════════════════════
// Tables
// ═══════════════════════════════════════════════════════════════════════

/// Columns of the admin list.
#[must_use]
pub fn columns(resource: Resource) -> Vec<Column> {
    match resource {
        Resource::Cooperativa => vec![
            Column::new("Nombre", "nombre_cooperativa"),
            Column::new("RUC", "ruc"),
            Column::new("Dirección", "direccion"),
            Column::new("Teléfono", "telefono"),
            Column::new("Correo", "correo_empresarial"),
        ],
        Resource::Bus => vec![
            Column::new("Número", "numero_bus"),
            Column::new("Placa", "placa"),
            Column::new("Marca", "marca"),
            Column::new("Modelo", "modelo"),
            Column::new("Capacidad", "capacidad_pasajeros"),
            Column::new("Estado", "estado_bus"),
            Column::new("Cooperativa", "cooperativa.nombre_cooperativa"),
        ],
        Resource::Ruta => vec![
            Column::new("Origen", "origen"),
            Column::new("Destino", "destino"),
            Column::new("Precio", "precio_unitario"),
            Column::new("Distancia", "distancia"),
            Column::new("Tiempo estimado", "tiempo_estimado"),
            Column::new("Estado", "estado_ruta"),
            Column::new("Bus", "bus.placa"),
            Column::new("Escalas", "escalas_texto"),
        ],
        Resource::Escala => vec![
            Column::new("Lugar", "lugar_escala"),
            Column::new("Tiempo", "tiempo"),
        ],
        Resource::Horario => vec![
            Column::new("Salida", "hora_salida"),
            Column::new("Llegada", "hora_llegada"),
            Column::new("Estado", "estado_horario"),
            Column::new("Origen", "ruta.origen"),
            Column::new("Destino", "ruta.destino"),
        ],
        Resource::Turno => vec![
            Column::new("Número", "numero_turno"),
            Column::new("Fecha", "fecha_salida"),
            Column::new("Estado", "estado_turno"),
            Column::new("Salida", "horario.hora_salida"),
            Column::new("Llegada", "horario.hora_llegada"),
        ],
        Resource::Frecuencia => vec![
            Column::new("Repeticiones", "numero_repeticiones"),
            Column::new("Periodo", "periodo"),
            Column::new("Precio", "precio_recorrido"),
            Column::new("Salida", "horario.hora_salida"),
        ],
        Resource::Persona => vec![
            Column::new("Identificación", "numero_identificacion"),
            Column::new("Nombre", "nombre"),
            Column::new("Apellido", "apellido"),
            Column::new("Correo", "correo"),
            Column::new("Teléfono", "telefono"),
            Column::new("Tarifa", "tipo_tarifa"),
            Column::new("Saldo", "saldo_disponible"),
            Column::new("Cuenta", "cuenta.tipo_cuenta"),
        ],
        Resource::Cuenta => vec![
            Column::new("Correo", "correo"),
            Column::new("Tipo", "tipo_cuenta"),
            Column::new("Estado", "estado_cuenta"),
        ],
        Resource::Pago => vec![
            Column::new("Opción", "opcion_pago"),
            Column::new("Titular", "titular"),
            Column::new("Tarjeta", "numero_tarjeta"),
            Column::new("Vencimiento", "fecha_vencimiento"),
            Column::new("Saldo", "saldo"),
        ],
        Resource::Boleto => vec![
            Column::new("Fecha de compra", "fecha_compra"),
            Column::new("Asiento", "numero_asiento"),
            Column::new("Precio", "precio_unitario"),
            Column::new("Estado", "estado_boleto"),
            Column::new("Pasajero", "persona.nombre"),
            Column::new("Turno", "turno.numero_turno"),
        ],
        Resource::Descuento => vec![
            Column::new("Nombre", "nombre_descuento"),
            Column::new("Descripción", "descripcion"),
            Column::new("Porcentaje", "porcentaje"),
            Column::new("Estado", "estado_descuento"),
            Column::new("Tipo", "tipo_descuento"),
            Column::new("Inicio", "fecha_inicio"),
            Column::new("Fin", "fecha_fin"),
        ],
    }
}

/// Add derived display fields to a backend row.
pub fn decorate(resource: Resource, row: &mut Value) {
    if resource != Resource::Ruta {
        return;
    }
    let stops = describe_stops(row.get("escalas").unwrap_or(&Value::Null));
    if let Some(map) = row.as_object_mut() {
        map.insert("escalas_texto".into(), Value::String(stops));
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Forms
// ═══════════════════════════════════════════════════════════════════════

/// Create/edit form, prefilled from `item` when editing.
pub async fn form(
    backend: &BackendClient,
    resource: Resource,
    mode: Mode,
    item: Option<&Value>,
) -> FormView {
    let view = FormView::new(
        mode.title(resource),
        mode.action(resource),
        format!("/{}/lista", resource.slug()),
    );
    let v = |path: &str| at(item, path);

    match resource {
        Resource::Cooperativa => view
            .field(Field::new("nombre_cooperativa", "Nombre", FieldKind::Text).value(v("nombre_cooperativa")))
            .field(Field::new("ruc", "RUC", FieldKind::Text).value(v("ruc")))
            .field(Field::new("direccion", "Dirección", FieldKind::Text).value(v("direccion")))
            .field(Field::new("telefono", "Teléfono", FieldKind::Text).value(v("telefono")))
            .field(
                Field::new("correo_empresarial", "Correo empresarial", FieldKind::Email)
                    .value(v("correo_empresarial")),
            ),

        Resource::Bus => {
            let cooperativas: Vec<Cooperativa> = load(backend, Resource::Cooperativa).await;
            let mut view = view;
            if mode == Mode::Create {
                let buses: Vec<Bus> = load(backend, Resource::Bus).await;
                view = view.extra(format!(
                    "<p>Número asignado: {}</p>",
                    next_bus_number(&buses)
                ));
            } else {
                view = view.field(
                    Field::new("numero_bus", "Número", FieldKind::Number("1")).value(v("numero_bus")),
                );
            }
            view.field(Field::new("placa", "Placa", FieldKind::Text).value(v("placa")))
                .field(Field::new("marca", "Marca", FieldKind::Text).value(v("marca")))
                .field(Field::new("modelo", "Modelo", FieldKind::Text).value(v("modelo")))
                .field(
                    Field::new("capacidad_pasajeros", "Capacidad", FieldKind::Number("1"))
                        .value(v("capacidad_pasajeros")),
                )
                .field(Field::new("velocidad", "Velocidad", FieldKind::Number("any")).value(v("velocidad")))
                .field(
                    Field::new("estado_bus", "Estado", FieldKind::select_of(&ESTADOS_BUS))
                        .value(v("estado_bus")),
                )
                .field(
                    Field::new(
                        "cooperativa_id",
                        "Cooperativa",
                        choices(&cooperativas, |c| c.id_cooperativa, |c| c.nombre_cooperativa.clone()),
                    )
                    .value(v("cooperativa.id_cooperativa")),
                )
        }

        Resource::Ruta => {
            let buses: Vec<Bus> = load(backend, Resource::Bus).await;
            let current_stops = item
                .and_then(|i| i.get("escalas"))
                .map(stops)
                .unwrap_or_default();
            view.field(Field::new("origen", "Origen", FieldKind::Text).value(v("origen")))
                .field(Field::new("destino", "Destino", FieldKind::Text).value(v("destino")))
                .field(
                    Field::new("precio_unitario", "Precio", FieldKind::Number("0.01"))
                        .value(v("precio_unitario")),
                )
                .field(Field::new("distancia", "Distancia (km)", FieldKind::Number("1")).value(v("distancia")))
                .field(
                    Field::new("tiempo_estimado", "Tiempo estimado", FieldKind::Text)
                        .value(v("tiempo_estimado")),
                )
                .field(
                    Field::new("estado_ruta", "Estado", FieldKind::select_of(&ESTADOS_DISPONIBILIDAD))
                        .value(v("estado_ruta")),
                )
                .field(
                    Field::new(
                        "bus_id",
                        "Bus",
                        choices(&buses, |b| b.id_bus, |b| {
                            format!("N° {} - {}", b.numero_bus.unwrap_or_default(), b.placa)
                        }),
                    )
                    .value(v("bus.id_bus")),
                )
                .extra(stops_editor(&current_stops))
        }

        Resource::Escala => view
            .field(Field::new("lugar_escala", "Lugar", FieldKind::Text).value(v("lugar_escala")))
            .field(Field::new("tiempo", "Tiempo", FieldKind::Text).value(v("tiempo"))),

        Resource::Horario => {
            let rutas: Vec<Ruta> = load(backend, Resource::Ruta).await;
            view.field(Field::new("hora_salida", "Hora de salida", FieldKind::Time).value(v("hora_salida")))
                .field(
                    Field::new("hora_llegada", "Hora de llegada", FieldKind::Time).value(v("hora_llegada")),
                )
                .field(
                    Field::new(
                        "estado_horario",
                        "Estado",
                        FieldKind::select_of(&ESTADOS_DISPONIBILIDAD),
                    )
                    .value(v("estado_horario")),
                )
                .field(
                    Field::new("ruta_id", "Ruta", choices(&rutas, |r| r.id_ruta, route_label))
                        .value(v("ruta.id_ruta")),
                )
        }

        Resource::Turno => {
            let horarios: Vec<Horario> = load(backend, Resource::Horario).await;
            let fecha = v("fecha_salida");
            let mut view = view;
            if let Mode::Edit(_) = mode {
                view = view.field(
                    Field::new("numero_turno", "Número", FieldKind::Text).value(v("numero_turno")),
                );
            }
            view.field(
                Field::new("fecha_salida", "Fecha de salida", FieldKind::Date)
                    .value(dmy_to_iso(&fecha).unwrap_or(fecha)),
            )
            .field(
                Field::new("estado_turno", "Estado", FieldKind::select_of(&ESTADOS_TURNO))
                    .value(v("estado_turno")),
            )
            .field(
                Field::new("horario_id", "Horario", choices(&horarios, |h| h.id_horario, horario_label))
                    .value(v("horario.id_horario")),
            )
        }

        Resource::Frecuencia => {
            let horarios: Vec<Horario> = load(backend, Resource::Horario).await;
            view.field(
                Field::new("numero_repeticiones", "Repeticiones", FieldKind::Number("1"))
                    .value(v("numero_repeticiones")),
            )
            .field(Field::new("periodo", "Periodo", FieldKind::select_of(&PERIODOS)).value(v("periodo")))
            .field(
                Field::new("precio_recorrido", "Precio del recorrido", FieldKind::Number("0.01"))
                    .value(v("precio_recorrido")),
            )
            .field(
                Field::new("horario_id", "Horario", choices(&horarios, |h| h.id_horario, horario_label))
                    .value(v("horario.id_horario")),
            )
        }

        Resource::Persona => persona_form(view, mode, item),

        Resource::Cuenta => {
            let tipos = options_or(backend, Resource::Cuenta, "tipos", "tipos_cuenta", &TIPOS_CUENTA).await;
            let estados =
                options_or(backend, Resource::Cuenta, "estados", "estados_cuenta", &ESTADOS_CUENTA).await;
            let password = Field::new("contrasenia", "Contraseña", FieldKind::Password);
            view.field(Field::new("correo", "Correo", FieldKind::Email).value(v("correo")))
                .field(if mode == Mode::Create { password } else { password.optional() })
                .field(
                    Field::new("tipo_cuenta", "Tipo", FieldKind::select_of(&tipos)).value(v("tipo_cuenta")),
                )
                .field(
                    Field::new("estado_cuenta", "Estado", FieldKind::select_of(&estados))
                        .value(v("estado_cuenta")),
                )
        }

        Resource::Pago => {
            let opciones =
                options_or(backend, Resource::Pago, "opciones", "metodos_pago", &OPCIONES_PAGO).await;
            view.field(
                Field::new("opcion_pago", "Opción de pago", FieldKind::select_of(&opciones))
                    .value(v("opcion_pago")),
            )
            .field(Field::new("titular", "Titular", FieldKind::Text).value(v("titular")))
            .field(Field::new("numero_tarjeta", "Número de tarjeta", FieldKind::Text).value(v("numero_tarjeta")))
            .field(
                Field::new("fecha_vencimiento", "Fecha de vencimiento", FieldKind::Text)
                    .value(v("fecha_vencimiento")),
            )
            .field(
                Field::new("codigo_seguridad", "Código de seguridad", FieldKind::Text)
                    .value(v("codigo_seguridad")),
            )
            .field(Field::new("saldo", "Saldo", FieldKind::Number("0.01")).value(v("saldo")))
        }

        Resource::Boleto => {
            let personas: Vec<Persona> = load(backend, Resource::Persona).await;
            let turnos: Vec<Turno> = load(backend, Resource::Turno).await;
            let asientos = item
                .and_then(|i| i.get("asientos"))
                .and_then(Value::as_array)
                .map(|seats| seats.iter().map(as_string).collect::<Vec<_>>().join(", "))
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| v("numero_asiento"));
            view.field(Field::new("asientos", "Asientos (separados por coma)", FieldKind::Text).value(asientos))
                .field(
                    Field::new("precio_unitario", "Precio", FieldKind::Number("0.01"))
                        .value(v("precio_unitario")),
                )
                .field(
                    Field::new("estado_boleto", "Estado", FieldKind::select_of(&ESTADOS_BOLETO))
                        .value(v("estado_boleto")),
                )
                .field(
                    Field::new(
                        "persona_id",
                        "Pasajero",
                        choices(&personas, |p| p.id_persona, |p| format!("{} {}", p.nombre, p.apellido)),
                    )
                    .value(v("persona.id_persona")),
                )
                .field(
                    Field::new(
                        "turno_id",
                        "Turno",
                        choices(&turnos, |t| t.id_turno, |t| {
                            format!("N° {} - {}", t.numero_turno, t.fecha_salida)
                        }),
                    )
                    .value(v("turno.id_turno")),
                )
        }

        Resource::Descuento => {
            let estados = options_or(
                backend,
                Resource::Descuento,
                "estados",
                "estados_descuento",
                &ESTADOS_DESCUENTO,
            )
            .await;
            let view = view
                .field(
                    Field::new("nombre_descuento", "Nombre", FieldKind::Text).value(v("nombre_descuento")),
                )
                .field(Field::new("descripcion", "Descripción", FieldKind::TextArea).value(v("descripcion")))
                .field(Field::new("porcentaje", "Porcentaje", FieldKind::Number("1")).value(v("porcentaje")))
                .field(
                    Field::new("estado_descuento", "Estado", FieldKind::select_of(&estados))
                        .value(v("estado_descuento")),
                );
            match mode {
                Mode::Edit(id) if is_editable_promotion(id, &v("tipo_descuento")) => {
                    let inicio = v("fecha_inicio");
                    let fin = v("fecha_fin");
                    view.field(
                        Field::new("fecha_inicio", "Inicio", FieldKind::Date)
                            .value(dmy_to_iso(&inicio).unwrap_or(inicio)),
                    )
                    .field(
                        Field::new("fecha_fin", "Fin", FieldKind::Date)
                            .value(dmy_to_iso(&fin).unwrap_or(fin)),
                    )
                }
                _ => view,
            }
        }
    }
}

fn persona_form(view: FormView, mode: Mode, item: Option<&Value>) -> FormView {
    let v = |path: &str| at(item, path);
    let fecha = v("fecha_nacimiento");

    let view = view
        .field(
            Field::new(
                "tipo_identificacion",
                "Tipo de identificación",
                FieldKind::select_of(&TIPOS_IDENTIFICACION),
            )
            .value(v("tipo_identificacion")),
        )
        .field(
            Field::new("numero_identificacion", "Número de identificación", FieldKind::Text)
                .value(v("numero_identificacion")),
        )
        .field(Field::new("nombre", "Nombre", FieldKind::Text).value(v("nombre")))
        .field(Field::new("apellido", "Apellido", FieldKind::Text).value(v("apellido")))
        .field(Field::new("correo", "Correo", FieldKind::Email).value(v("correo")))
        .field(Field::new("telefono", "Teléfono", FieldKind::Text).value(v("telefono")))
        .field(Field::new("direccion", "Dirección", FieldKind::Text).value(v("direccion")).optional())
        .field(
            Field::new("fecha_nacimiento", "Fecha de nacimiento", FieldKind::Date)
                .value(dmy_to_iso(&fecha).unwrap_or(fecha)),
        )
        .field(Field::new("genero", "Género", FieldKind::select_of(&GENEROS)).value(v("genero")))
        .field(
            Field::new("tipo_tarifa", "Tarifa", FieldKind::select_of(&TIPOS_TARIFA)).value(v("tipo_tarifa")),
        );

    let view = match mode {
        Mode::Create => view
            .field(Field::new("usuario", "Usuario", FieldKind::Text))
            .field(Field::new("contrasenia", "Contraseña", FieldKind::Password)),
        Mode::Edit(_) => view
            .field(
                Field::new("saldo_disponible", "Saldo disponible", FieldKind::Number("0.01"))
                    .value(v("saldo_disponible")),
            )
            .field(Field::new("cuenta_correo", "Correo de la cuenta", FieldKind::Email).value(v("cuenta.correo")))
            .field(Field::new("contrasenia", "Nueva contraseña", FieldKind::Password).optional()),
    };

    let mut payment_kind = vec![(String::new(), "Sin método de pago".to_string())];
    if let FieldKind::Select(options) = FieldKind::select_of(&OPCIONES_PAGO) {
        payment_kind.extend(options);
    }

    let view = view
        .field(
            Field::new("tipo_cuenta", "Tipo de cuenta", FieldKind::select_of(&TIPOS_CUENTA))
                .value(v("cuenta.tipo_cuenta")),
        )
        .field(
            Field::new("estado_cuenta", "Estado de la cuenta", FieldKind::select_of(&ESTADOS_CUENTA))
                .value(v("cuenta.estado_cuenta")),
        )
        .field(
            Field::new("opcion_pago", "Método de pago", FieldKind::Select(payment_kind))
                .value(v("metodo_pago.opcion_pago"))
                .optional(),
        )
        .field(Field::new("titular", "Titular", FieldKind::Text).value(v("metodo_pago.titular")).optional())
        .field(
            Field::new("numero_tarjeta", "Número de tarjeta", FieldKind::Text)
                .value(v("metodo_pago.numero_tarjeta"))
                .optional(),
        )
        .field(
            Field::new("fecha_vencimiento", "Vencimiento", FieldKind::Text)
                .value(v("metodo_pago.fecha_vencimiento"))
                .optional(),
        )
        .field(
            Field::new("codigo_seguridad", "Código de seguridad", FieldKind::Text)
                .value(v("metodo_pago.codigo_seguridad"))
                .optional(),
        )
        .field(
            Field::new("saldo", "Saldo del método", FieldKind::Number("0.01"))
                .value(v("metodo_pago.saldo"))
                .optional(),
        );

    match mode {
        Mode::Create => view,
        Mode::Edit(_) => view.field(
            Field::new(
                "eliminar_metodo_pago",
                "Eliminar método de pago",
                FieldKind::Select(vec![("0".into(), "No".into()), ("1".into(), "Sí".into())]),
            )
            .value("0"),
        ),
    }
}

/// Rows of place/time inputs for route stops, plus a button adding rows.
fn stops_editor(current: &[aventura_backend::models::Escala]) -> String {
    let mut rows = String::new();
    for (i, escala) in current.iter().enumerate() {
        let id = escala.id_escala.map(|id| id.to_string()).unwrap_or_default();
        let _ = write!(
            rows,
            "<div class=\"escala\">\
<input type=\"hidden\" name=\"id_escala_{i}\" value=\"{}\">\
<input name=\"lugar_escala_{i}\" placeholder=\"Lugar\" value=\"{}\"> \
<input name=\"tiempo_escala_{i}\" placeholder=\"Tiempo\" value=\"{}\"></div>",
            escape(&id),
            escape(&escala.lugar_escala),
            escape(&escala.tiempo),
        );
    }

    format!(
        "<fieldset><legend>Escalas</legend><div id=\"escalas\">{rows}</div>\
<button type=\"button\" onclick=\"agregarEscala()\">Agregar escala</button></fieldset>\
<script>\
function agregarEscala(){{const c=document.getElementById('escalas');const i=c.children.length;\
const d=document.createElement('div');d.className='escala';\
d.innerHTML='<input name=\"lugar_escala_'+i+'\" placeholder=\"Lugar\"> <input name=\"tiempo_escala_'+i+'\" placeholder=\"Tiempo\">';\
c.appendChild(d);}}\
</script>"
    )
}

fn is_editable_promotion(id: i64, tipo: &str) -> bool {
    id > LAST_BUILTIN_DISCOUNT && tipo == PROMOTIONAL
}

// ═══════════════════════════════════════════════════════════════════════
// Payloads
// ═══════════════════════════════════════════════════════════════════════

/// Validate the submitted form and build the `guardar`/`actualizar` body.
///
/// # Errors
///
/// [`Rejection::Invalid`] when a check fails, [`Rejection::Backend`] when
/// the data a check needs cannot be loaded.
pub async fn payload(
    backend: &BackendClient,
    resource: Resource,
    mode: Mode,
    form: &[(String, String)],
    item: Option<&Value>,
) -> Checked<Value> {
    let exclude = mode.exclude();

    match resource {
        Resource::Cooperativa => {
            let candidate = Cooperativa {
                nombre_cooperativa: form_value(form, "nombre_cooperativa").to_string(),
                ruc: form_value(form, "ruc").to_string(),
                direccion: form_value(form, "direccion").to_string(),
                telefono: form_value(form, "telefono").to_string(),
                correo_empresarial: form_value(form, "correo_empresarial").to_string(),
                ..Cooperativa::default()
            };
            let existing: Vec<Cooperativa> = backend.list(resource).await?;
            if let Some(conflict) = cooperativa_conflict(&existing, &candidate, exclude) {
                return Err(conflict.into());
            }
            Ok(with_id(
                json!({
                    "nombre_cooperativa": candidate.nombre_cooperativa,
                    "ruc": candidate.ruc,
                    "direccion": candidate.direccion,
                    "telefono": candidate.telefono,
                    "correo_empresarial": candidate.correo_empresarial,
                }),
                "id",
                mode,
            ))
        }

        Resource::Bus => {
            let capacidad = int(form, "capacidad_pasajeros", "La capacidad debe ser un número entero")?;
            let velocidad = float(form, "velocidad", "La velocidad debe ser un número")?;
            let cooperativa_id = int(form, "cooperativa_id", "Seleccione una cooperativa")?;
            let placa = form_value(form, "placa");

            let buses: Vec<Bus> = backend.list(resource).await?;
            let numero = match mode {
                Mode::Create => next_bus_number(&buses),
                Mode::Edit(_) => form_value(form, "numero_bus")
                    .parse()
                    .ok()
                    .or_else(|| item.and_then(|i| i.get("numero_bus")).and_then(as_i64))
                    .ok_or("El número de bus debe ser un número entero")?,
            };
            if let Some(conflict) = bus_conflict(&buses, Some(numero), placa, exclude) {
                return Err(conflict.into());
            }
            Ok(with_id(
                json!({
                    "numero_bus": numero,
                    "placa": placa,
                    "marca": text(form, "marca"),
                    "modelo": text(form, "modelo"),
                    "capacidad_pasajeros": capacidad,
                    "velocidad": velocidad,
                    "estado_bus": text(form, "estado_bus"),
                    "cooperativa_id": cooperativa_id,
                }),
                "id",
                mode,
            ))
        }

        Resource::Ruta => {
            let precio = float(form, "precio_unitario", "El precio debe ser un número")?;
            let distancia = int(form, "distancia", "La distancia debe ser un número entero")?;
            let bus_id = int(form, "bus_id", "Seleccione un bus")?;
            let origen = form_value(form, "origen");
            let destino = form_value(form, "destino");

            let rutas: Vec<Ruta> = backend.list(resource).await?;
            if let Some(conflict) = ruta_conflict(&rutas, origen, destino, bus_id, exclude) {
                return Err(conflict.into());
            }
            Ok(with_id(
                json!({
                    "origen": origen,
                    "destino": destino,
                    "precio_unitario": precio,
                    "distancia": distancia,
                    "tiempo_estimado": text(form, "tiempo_estimado"),
                    "estado_ruta": text(form, "estado_ruta"),
                    "bus": { "id_bus": bus_id },
                    "escalas": stops_from_form(form),
                }),
                "id_ruta",
                mode,
            ))
        }

        Resource::Escala => {
            require(form, &["lugar_escala", "tiempo"], "Todos los campos son requeridos")?;
            Ok(with_id(
                json!({
                    "lugar_escala": text(form, "lugar_escala"),
                    "tiempo": text(form, "tiempo"),
                }),
                "id_escala",
                mode,
            ))
        }

        Resource::Horario => {
            let salida = form_value(form, "hora_salida");
            let llegada = form_value(form, "hora_llegada");
            let ruta_id = int(form, "ruta_id", "Seleccione una ruta")?;
            let (Some(start), Some(end)) = (minutes_of_day(salida), minutes_of_day(llegada)) else {
                return Err("Formato de hora inválido".into());
            };
            if end <= start {
                return Err("La hora de llegada debe ser posterior a la de salida".into());
            }

            let horarios: Vec<Horario> = backend.list(resource).await?;
            if let Some(conflict) = find_schedule_conflict(&horarios, ruta_id, salida, llegada, exclude) {
                return Err(conflict.into());
            }
            Ok(with_id(
                json!({
                    "hora_salida": salida,
                    "hora_llegada": llegada,
                    "estado_horario": text(form, "estado_horario"),
                    "ruta": { "id_ruta": ruta_id },
                }),
                "id_horario",
                mode,
            ))
        }

        Resource::Turno => {
            let fecha = iso_to_dmy(form_value(form, "fecha_salida")).ok_or("Fecha de salida inválida")?;
            let horario_id = int(form, "horario_id", "Seleccione un horario")?;
            let estado = match form_value(form, "estado_turno") {
                "" => "Disponible",
                other => other,
            };

            let turnos: Vec<Turno> = backend.list(resource).await?;
            let numero = match mode {
                Mode::Create => next_turn_number(&turnos),
                Mode::Edit(_) => turn_number_value(form_value(form, "numero_turno"))
                    .or_else(|| turn_number_value(&at(item, "numero_turno")))
                    .ok_or("El número de turno debe ser numérico")?,
            };
            if let Some(conflict) = turno_conflict(&turnos, &fecha, horario_id, Some(numero), exclude) {
                return Err(conflict.into());
            }
            Ok(with_id(
                json!({
                    "numero_turno": numero,
                    "fecha_salida": fecha,
                    "estado_turno": estado,
                    "horario": { "id_horario": horario_id },
                }),
                "id_turno",
                mode,
            ))
        }

        Resource::Frecuencia => {
            let repeticiones = int(form, "numero_repeticiones", "Las repeticiones deben ser un número entero")?;
            let precio = float(form, "precio_recorrido", "El precio debe ser un número")?;
            let horario_id = int(form, "horario_id", "Seleccione un horario")?;
            Ok(with_id(
                json!({
                    "numero_repeticiones": repeticiones,
                    "periodo": text(form, "periodo"),
                    "precio_recorrido": precio,
                    "horario": { "id_horario": horario_id },
                }),
                "id_frecuencia",
                mode,
            ))
        }

        Resource::Persona => persona_payload(backend, mode, form, item).await,

        Resource::Cuenta => {
            let required: &[&str] = match mode {
                Mode::Create => &["correo", "contrasenia", "tipo_cuenta", "estado_cuenta"],
                Mode::Edit(_) => &["correo", "tipo_cuenta", "estado_cuenta"],
            };
            require(form, required, "Todos los campos son requeridos")?;
            let correo = form_value(form, "correo");

            let cuentas: Vec<Cuenta> = backend.list(resource).await?;
            if let Some(conflict) = cuenta_conflict(&cuentas, correo, exclude) {
                return Err(conflict.into());
            }
            let mut body = json!({
                "correo": correo,
                "tipo_cuenta": text(form, "tipo_cuenta"),
                "estado_cuenta": text(form, "estado_cuenta"),
            });
            let contrasenia = form_value(form, "contrasenia");
            if !contrasenia.is_empty() {
                body["contrasenia"] = json!(contrasenia);
            }
            Ok(with_id(body, "id_cuenta", mode))
        }

        Resource::Pago => {
            let saldo = float(form, "saldo", "El saldo debe ser un número")?;
            Ok(with_id(
                json!({
                    "opcion_pago": text(form, "opcion_pago"),
                    "titular": text(form, "titular"),
                    "numero_tarjeta": text(form, "numero_tarjeta"),
                    "fecha_vencimiento": text(form, "fecha_vencimiento"),
                    "codigo_seguridad": text(form, "codigo_seguridad"),
                    "saldo": saldo,
                }),
                "id_pago",
                mode,
            ))
        }

        Resource::Boleto => {
            let asientos = parse_seats(form_value(form, "asientos")).ok_or("Asientos inválidos")?;
            let precio = float(form, "precio_unitario", "El precio debe ser un número")?;
            let persona_id = int(form, "persona_id", "Seleccione un pasajero")?;
            let turno_id = int(form, "turno_id", "Seleccione un turno")?;
            let fecha_compra = match at(item, "fecha_compra") {
                fecha if fecha.is_empty() => today().format(DMY).to_string(),
                fecha => fecha,
            };
            Ok(with_id(
                json!({
                    "fecha_compra": fecha_compra,
                    "asientos": asientos,
                    "precio_unitario": precio,
                    "estado_boleto": text(form, "estado_boleto"),
                    "persona": { "id_persona": persona_id },
                    "turno": { "id_turno": turno_id },
                }),
                "id_boleto",
                mode,
            ))
        }

        Resource::Descuento => descuento_payload(backend, mode, form, item).await,
    }
}

/// `"3, 4"` → `[3, 4]`; `None` when empty or any entry is not a number.
fn parse_seats(raw: &str) -> Option<Vec<i64>> {
    let seats: Vec<i64> = raw
        .split(',')
        .map(|part| part.trim().parse().ok())
        .collect::<Option<_>>()?;
    (!seats.is_empty()).then_some(seats)
}

/// `metodo_pago` object when every payment field was filled in.
fn payment_from_form(form: &[(String, String)], existing_id: Option<i64>) -> Checked<Option<Value>> {
    if PAYMENT_FIELDS.iter().any(|f| form_value(form, f).is_empty()) {
        return Ok(None);
    }
    let saldo = float(form, "saldo", "El saldo del método de pago debe ser un número")?;
    let mut metodo = Map::new();
    for field in &PAYMENT_FIELDS[..5] {
        metodo.insert((*field).to_string(), text(form, field));
    }
    metodo.insert("saldo".into(), json!(saldo));
    if let Some(id) = existing_id {
        metodo.insert("id_pago".into(), json!(id));
    }
    Ok(Some(Value::Object(metodo)))
}

async fn persona_payload(
    backend: &BackendClient,
    mode: Mode,
    form: &[(String, String)],
    item: Option<&Value>,
) -> Checked<Value> {
    require(
        form,
        &["tipo_identificacion", "numero_identificacion", "nombre", "apellido", "correo"],
        "Todos los campos obligatorios deben completarse",
    )?;
    let numero = form_value(form, "numero_identificacion");
    let correo = form_value(form, "correo");
    let telefono = form_value(form, "telefono");

    let personas: Vec<Persona> = backend.list(Resource::Persona).await?;
    if let Some(conflict) = persona_conflict(&personas, numero, correo, telefono, mode.exclude()) {
        return Err(conflict.into());
    }

    let fecha = form_value(form, "fecha_nacimiento");
    let tarifa = match form_value(form, "tipo_tarifa") {
        "" => "General",
        other => other,
    };
    let mut body = json!({
        "tipo_identificacion": text(form, "tipo_identificacion"),
        "numero_identificacion": numero,
        "nombre": text(form, "nombre"),
        "apellido": text(form, "apellido"),
        "fecha_nacimiento": iso_to_dmy(fecha).unwrap_or_else(|| fecha.to_string()),
        "telefono": telefono,
        "correo": correo,
        "genero": text(form, "genero"),
        "direccion": text(form, "direccion"),
        "tipo_tarifa": tarifa,
    });

    match mode {
        Mode::Create => {
            require(form, &["usuario", "contrasenia"], "Usuario y contraseña son requeridos")?;
            body["saldo_disponible"] = json!(0.0);
            body["usuario"] = text(form, "usuario");
            body["contrasenia"] = text(form, "contrasenia");
            body["tipo_cuenta"] = text(form, "tipo_cuenta");
            body["estado_cuenta"] = text(form, "estado_cuenta");
            if let Some(metodo) = payment_from_form(form, None)? {
                body["metodo_pago"] = metodo;
            }
        }
        Mode::Edit(id) => {
            let saldo = match form_value(form, "saldo_disponible") {
                "" => 0.0,
                raw => raw.parse().map_err(|_| Rejection::from("El saldo debe ser un número"))?,
            };
            let cuenta_correo = match form_value(form, "cuenta_correo") {
                "" => correo,
                other => other,
            };
            let mut cuenta = json!({
                "id_cuenta": item.and_then(|i| i.pointer("/cuenta/id_cuenta")).and_then(as_i64),
                "correo": cuenta_correo,
                "tipo_cuenta": text(form, "tipo_cuenta"),
                "estado_cuenta": text(form, "estado_cuenta"),
            });
            let contrasenia = form_value(form, "contrasenia");
            if !contrasenia.is_empty() {
                cuenta["contrasenia"] = json!(contrasenia);
            }
            body["id_persona"] = json!(id);
            body["saldo_disponible"] = json!(saldo);
            body["cuenta"] = cuenta;

            let existing_payment = item.and_then(|i| i.get("metodo_pago")).filter(|m| m.is_object());
            body["metodo_pago"] = if form_value(form, "eliminar_metodo_pago") == "1" {
                Value::Null
            } else {
                let existing_id = existing_payment.and_then(|m| m.get("id_pago")).and_then(as_i64);
                match payment_from_form(form, existing_id)? {
                    Some(metodo) => metodo,
                    None => existing_payment.cloned().unwrap_or(Value::Null),
                }
            };
        }
    }
    Ok(body)
}

async fn descuento_payload(
    backend: &BackendClient,
    mode: Mode,
    form: &[(String, String)],
    item: Option<&Value>,
) -> Checked<Value> {
    require(form, &["nombre_descuento"], "El nombre del descuento es requerido")?;
    let porcentaje = int(form, "porcentaje", "El porcentaje debe ser un número entero")?;
    let nombre = form_value(form, "nombre_descuento");

    let descuentos: Vec<Descuento> = backend.list(Resource::Descuento).await?;
    if let Some(conflict) = descuento_conflict(&descuentos, nombre, mode.exclude()) {
        return Err(conflict.into());
    }

    let mut body = json!({
        "nombre_descuento": nombre,
        "descripcion": text(form, "descripcion"),
        "porcentaje": porcentaje,
        "estado_descuento": text(form, "estado_descuento"),
    });

    match mode {
        Mode::Create => {
            let inicio = today();
            body["tipo_descuento"] = json!(PROMOTIONAL);
            body["fecha_inicio"] = json!(inicio.format(DMY).to_string());
            body["fecha_fin"] = json!((inicio + Duration::days(PROMOTION_DAYS)).format(DMY).to_string());
        }
        Mode::Edit(id) => {
            let tipo = at(item, "tipo_descuento");
            let stored_inicio = at(item, "fecha_inicio");
            let stored_fin = at(item, "fecha_fin");
            let (inicio, fin) = if is_editable_promotion(id, &tipo) {
                (
                    iso_to_dmy(form_value(form, "fecha_inicio")).unwrap_or(stored_inicio),
                    iso_to_dmy(form_value(form, "fecha_fin")).unwrap_or(stored_fin),
                )
            } else {
                (stored_inicio, stored_fin)
            };
            body["id_descuento"] = json!(id);
            body["tipo_descuento"] = json!(tipo);
            body["fecha_inicio"] = json!(inicio);
            body["fecha_fin"] = json!(fin);
        }
    }
    Ok(body)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_parse_seats() {
        assert_eq!(parse_seats("3, 4,5"), Some(vec![3, 4, 5]));
        assert_eq!(parse_seats("3, x"), None);
        assert_eq!(parse_seats(""), None);
    }

    #[test]
    fn test_payment_needs_every_field() {
        let partial = form(&[("opcion_pago", "Tarjeta_credito"), ("titular", "Ana")]);
        assert!(payment_from_form(&partial, None).unwrap().is_none());

        let full = form(&[
            ("opcion_pago", "Tarjeta_credito"),
            ("titular", "Ana"),
            ("numero_tarjeta", "4111"),
            ("fecha_vencimiento", "12/30"),
            ("codigo_seguridad", "123"),
            ("saldo", "50.5"),
        ]);
        let metodo = payment_from_form(&full, Some(2)).unwrap().unwrap();
        assert_eq!(metodo["saldo"], 50.5);
        assert_eq!(metodo["id_pago"], 2);
        assert_eq!(metodo["titular"], "Ana");
    }

    #[test]
    fn test_with_id_only_on_edit() {
        let created = with_id(json!({"a": 1}), "id_ruta", Mode::Create);
        assert!(created.get("id_ruta").is_none());
        let edited = with_id(json!({"a": 1}), "id_ruta", Mode::Edit(4));
        assert_eq!(edited["id_ruta"], 4);
    }

    #[test]
    fn test_builtin_discounts_are_not_editable_promotions() {
        assert!(!is_editable_promotion(3, PROMOTIONAL));
        assert!(is_editable_promotion(6, PROMOTIONAL));
        assert!(!is_editable_promotion(9, "Estudiante"));
    }

    #[test]
    fn test_route_rows_get_stop_text() {
        let mut row = json!({"escalas": [{"lugar_escala": "Catamayo", "tiempo": "15 min"}]});
        decorate(Resource::Ruta, &mut row);
        assert_eq!(row["escalas_texto"], "Catamayo (15 min)");

        let mut bus = json!({});
        decorate(Resource::Bus, &mut bus);
        assert!(bus.get("escalas_texto").is_none());
    }

    #[test]
    fn test_at_reads_nested_paths() {
        let item = json!({"cuenta": {"id_cuenta": 5, "correo": "a@x.ec"}});
        assert_eq!(at(Some(&item), "cuenta.id_cuenta"), "5");
        assert_eq!(at(Some(&item), "cuenta.nada"), "");
        assert_eq!(at(None, "cuenta"), "");
    }

    #[test]
    fn test_mode_action() {
        assert_eq!(Mode::Create.action(Resource::Bus), "/bus/crear");
        assert_eq!(Mode::Edit(3).action(Resource::Pago), "/pago/editar/3");
        assert_eq!(Mode::Edit(3).title(Resource::Ruta), "Editar ruta");
    }
}
