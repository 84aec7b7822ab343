use super::escape;
use aventura_auth::Flash;
use axum::response::Html;
use std::fmt::Write;

const STYLE: &str = "body{font-family:sans-serif;margin:0;background:#f6f8f3}\
header{background:#7ab730;color:#fff;padding:.75rem 1.5rem;display:flex;justify-content:space-between}\
header a{color:#fff;margin-left:1rem}main{padding:1.5rem;max-width:72rem;margin:auto}\
.alert{padding:.6rem 1rem;margin-bottom:.75rem;border-radius:4px}\
.alert-success{background:#dff0d8}.alert-info{background:#d9edf7}\
.alert-warning{background:#fcf8e3}.alert-danger{background:#f2dede}\
table{border-collapse:collapse;width:100%;background:#fff}\
th,td{border:1px solid #ddd;padding:.4rem .6rem;text-align:left}\
form.inline{display:inline}label{display:block;margin-top:.6rem}\
.error{color:#a94442;font-weight:bold}";

/// Full HTML document around `body`.
///
/// `user_label` is the name shown in the header; `None` renders the anonymous
/// header with a login link.
#[must_use]
pub fn layout(title: &str, user_label: Option<&str>, flashes: &[Flash], body: &str) -> Html<String> {
    let account = match user_label {
        Some(name) => format!(
            "<span>{}</span><a href=\"/perfil\">Perfil</a><a href=\"/logout\">Cerrar sesión</a>",
            escape(name)
        ),
        None => "<a href=\"/iniciar_sesion\">Iniciar sesión</a>".to_string(),
    };

    let alerts = flashes.iter().fold(String::new(), |mut out, flash| {
        let _ = write!(
            out,
            "<div class=\"alert alert-{}\">{}</div>",
            flash.level.as_str(),
            escape(&flash.message)
        );
        out
    });

    Html(format!(
        "<!DOCTYPE html>\n<html lang=\"es\"><head><meta charset=\"utf-8\">\
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
<title>{title} | AventuraBus</title><style>{STYLE}</style></head>\
<body><header><a href=\"/\"><strong>AventuraBus</strong></a><nav>{account}</nav></header>\
<main>{alerts}{body}</main></body></html>",
        title = escape(title),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use aventura_auth::FlashLevel;

    #[test]
    fn test_layout_escapes_and_shows_flashes() {
        let flashes = vec![Flash {
            level: FlashLevel::Danger,
            message: "<b>mal</b>".into(),
        }];
        let Html(page) = layout("Buses", Some("Ana <Admin>"), &flashes, "<p>ok</p>");

        assert!(page.contains("<title>Buses | AventuraBus</title>"));
        assert!(page.contains("Ana &lt;Admin&gt;"));
        assert!(page.contains("alert-danger\">&lt;b&gt;mal&lt;/b&gt;"));
        assert!(page.contains("<p>ok</p>"));
        assert!(page.contains("/logout"));
    }

    #[test]
    fn test_anonymous_header() {
        let Html(page) = layout("Inicio", None, &[], "");
        assert!(page.contains("/iniciar_sesion"));
        assert!(!page.contains("/logout"));
    }
}
