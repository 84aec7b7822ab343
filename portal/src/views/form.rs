use super::escape;
use std::fmt::Write;

/// Input widget.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// `<input type=text>`
    Text,
    /// `<input type=number>` with a step (`1`, `0.01`, `any`).
    Number(&'static str),
    /// `<input type=email>`
    Email,
    /// `<input type=password>`; never echoes its value.
    Password,
    /// `<input type=date>`, ISO value.
    Date,
    /// `<input type=time>`
    Time,
    /// `<select>` over `(value, label)` pairs.
    Select(Vec<(String, String)>),
    /// `<textarea>`
    TextArea,
    /// `<input type=hidden>`
    Hidden,
}

impl FieldKind {
    /// Select whose labels equal their values.
    #[must_use]
    pub fn select_of<S: AsRef<str>>(values: &[S]) -> Self {
        Self::Select(
            values
                .iter()
                .map(|v| (v.as_ref().to_string(), v.as_ref().replace('_', " ")))
                .collect(),
        )
    }
}

/// One form field.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Form name.
    pub name: String,
    /// Label text.
    pub label: String,
    /// Widget.
    pub kind: FieldKind,
    /// Current value.
    pub value: String,
    /// Adds the `required` attribute.
    pub required: bool,
}

impl Field {
    /// Required field with an empty value.
    #[must_use]
    pub fn new(name: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind,
            value: String::new(),
            required: true,
        }
    }

    /// Set the value.
    #[must_use]
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// Drop the `required` attribute.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    fn render(&self, out: &mut String) {
        let name = escape(&self.name);
        let value = escape(&self.value);
        let required = if self.required { " required" } else { "" };

        let input = |out: &mut String, kind: &str, value: &str| {
            let _ = write!(
                out,
                "<input type=\"{kind}\" id=\"{name}\" name=\"{name}\" value=\"{value}\"{required}>"
            );
        };

        if self.kind == FieldKind::Hidden {
            input(out, "hidden", &value);
            return;
        }

        let _ = write!(out, "<label for=\"{name}\">{}</label>", escape(&self.label));
        match &self.kind {
            FieldKind::Text | FieldKind::Hidden => input(out, "text", &value),
            FieldKind::Email => input(out, "email", &value),
            FieldKind::Password => input(out, "password", ""),
            FieldKind::Date => input(out, "date", &value),
            FieldKind::Time => input(out, "time", &value),
            FieldKind::Number(step) => {
                let _ = write!(
                    out,
                    "<input type=\"number\" step=\"{step}\" id=\"{name}\" name=\"{name}\" value=\"{value}\"{required}>"
                );
            }
            FieldKind::TextArea => {
                let _ = write!(out, "<textarea id=\"{name}\" name=\"{name}\"{required}>{value}</textarea>");
            }
            FieldKind::Select(options) => {
                let _ = write!(out, "<select id=\"{name}\" name=\"{name}\"{required}>");
                if !self.required {
                    out.push_str("<option value=\"\">Ninguno</option>");
                }
                for (option, label) in options {
                    let selected = if *option == self.value { " selected" } else { "" };
                    let _ = write!(
                        out,
                        "<option value=\"{}\"{selected}>{}</option>",
                        escape(option),
                        escape(label)
                    );
                }
                out.push_str("</select>");
            }
        }
    }
}

/// A create/edit form.
#[derive(Debug, Clone, PartialEq)]
pub struct FormView {
    /// Heading.
    pub title: String,
    /// POST target.
    pub action: String,
    /// Fields in order.
    pub fields: Vec<Field>,
    /// Inline error above the fields.
    pub error: Option<String>,
    /// Markup appended after the fields (dynamic rows, notes).
    pub extra: String,
    /// Where "Cancelar" goes.
    pub cancel: String,
}

impl FormView {
    /// Empty form.
    #[must_use]
    pub fn new(title: impl Into<String>, action: impl Into<String>, cancel: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            action: action.into(),
            fields: Vec::new(),
            error: None,
            extra: String::new(),
            cancel: cancel.into(),
        }
    }

    /// Append a field.
    #[must_use]
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Set the inline error.
    #[must_use]
    pub fn error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Append raw markup after the fields.
    #[must_use]
    pub fn extra(mut self, html: impl Into<String>) -> Self {
        self.extra.push_str(&html.into());
        self
    }

    /// Overwrite field values with what the user submitted, so a rejected
    /// form comes back as typed.
    #[must_use]
    pub fn refill(mut self, submitted: &[(String, String)]) -> Self {
        for field in &mut self.fields {
            if let Some((_, value)) = submitted.iter().find(|(k, _)| *k == field.name) {
                field.value.clone_from(value);
            }
        }
        self
    }

    /// Form markup.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = format!("<h1>{}</h1>", escape(&self.title));
        if let Some(error) = &self.error {
            let _ = write!(out, "<p class=\"error\">{}</p>", escape(error));
        }
        let _ = write!(out, "<form method=\"post\" action=\"{}\">", escape(&self.action));
        for field in &self.fields {
            field.render(&mut out);
        }
        out.push_str(&self.extra);
        let _ = write!(
            out,
            "<p><button type=\"submit\">Guardar</button> <a href=\"{}\">Cancelar</a></p></form>",
            escape(&self.cancel)
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submitted(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect()
    }

    #[test]
    fn test_refill_keeps_input_but_not_passwords() {
        let form = FormView::new("Crear cuenta", "/cuenta/crear", "/cuenta/lista")
            .field(Field::new("correo", "Correo", FieldKind::Email))
            .field(Field::new("contrasenia", "Contraseña", FieldKind::Password))
            .error("El correo ya está registrado")
            .refill(&submitted(&[("correo", "a\"b@x.ec"), ("contrasenia", "secreto")]));

        let html = form.render();
        assert!(html.contains("value=\"a&quot;b@x.ec\""));
        assert!(!html.contains("secreto"));
        assert!(html.contains("<p class=\"error\">El correo ya está registrado</p>"));
    }

    #[test]
    fn test_select_marks_current_value() {
        let html = FormView::new("t", "/x", "/")
            .field(
                Field::new("estado", "Estado", FieldKind::select_of(&["Activo", "No_disponible"]))
                    .value("No_disponible"),
            )
            .render();
        assert!(html.contains("<option value=\"No_disponible\" selected>No disponible</option>"));
        assert!(html.contains("<option value=\"Activo\">Activo</option>"));
    }

    #[test]
    fn test_hidden_has_no_label() {
        let html = FormView::new("t", "/x", "/")
            .field(Field::new("id", "Id", FieldKind::Hidden).value("7"))
            .render();
        assert!(html.contains("type=\"hidden\""));
        assert!(!html.contains("<label for=\"id\">"));
    }
}
