use super::escape;
use aventura_backend::models::lenient::{as_i64, as_string};
use aventura_backend::Resource;
use serde_json::Value;
use std::fmt::Write;

/// One table column: header text and a dotted path into the row JSON
/// (`bus.cooperativa.nombre_cooperativa`).
#[derive(Debug, Clone, Copy)]
pub struct Column {
    /// Header text.
    pub header: &'static str,
    /// Dotted JSON path.
    pub path: &'static str,
}

impl Column {
    /// Column shorthand.
    #[must_use]
    pub const fn new(header: &'static str, path: &'static str) -> Self {
        Self { header, path }
    }
}

/// Value at a dotted path, rendered as text.
fn cell(row: &Value, path: &str) -> String {
    path.split('.')
        .try_fold(row, |value, key| value.get(key))
        .map(as_string)
        .unwrap_or_default()
}

/// Admin list page for one resource.
#[derive(Debug, Clone)]
pub struct TableView {
    /// Listed resource.
    pub resource: Resource,
    /// Columns in display order.
    pub columns: Vec<Column>,
    /// Backend rows.
    pub rows: Vec<Value>,
}

impl TableView {
    /// Table with create link, per-row edit/delete actions and the
    /// sort/search controls.
    #[must_use]
    pub fn render(&self) -> String {
        let slug = self.resource.slug();
        let id_field = self.resource.id_field();

        let headers = self.columns.iter().fold(String::new(), |mut out, c| {
            let _ = write!(out, "<th>{}</th>", escape(c.header));
            out
        });

        let options = self.columns.iter().fold(String::new(), |mut out, c| {
            let attr = c.path.split('.').next().unwrap_or(c.path);
            let _ = write!(
                out,
                "<option value=\"{}\">{}</option>",
                escape(attr),
                escape(c.header)
            );
            out
        });

        let body = self.rows.iter().fold(String::new(), |mut out, row| {
            let id = row.get(&id_field).and_then(as_i64).unwrap_or_default();
            out.push_str("<tr>");
            for column in &self.columns {
                let _ = write!(out, "<td>{}</td>", escape(&cell(row, column.path)));
            }
            let _ = write!(
                out,
                "<td><a href=\"/{slug}/editar/{id}\">Editar</a> \
<form class=\"inline\" method=\"post\" action=\"/{slug}/eliminar/{id}\" \
onsubmit=\"return confirm('¿Eliminar este registro?')\">\
<button type=\"submit\">Eliminar</button></form></td></tr>"
            );
            out
        });

        let paths: Vec<&str> = self.columns.iter().map(|c| c.path).collect();
        let paths_json = serde_json::to_string(&paths).unwrap_or_else(|_| "[]".into());

        format!(
            "<h1>{label}</h1>\
<p><a href=\"/{slug}/crear\">Crear {label_lower}</a></p>\
<div id=\"controles\">\
<select id=\"atributo\">{options}</select> \
<input id=\"criterio\" placeholder=\"Buscar…\"> \
<button type=\"button\" onclick=\"buscar()\">Buscar</button> \
<button type=\"button\" onclick=\"ordenar('asc')\">Ascendente</button> \
<button type=\"button\" onclick=\"ordenar('desc')\">Descendente</button>\
<span id=\"estado\" class=\"error\"></span></div>\
<table><thead><tr>{headers}<th>Acciones</th></tr></thead><tbody id=\"filas\">{body}</tbody></table>\
<script>\
const SLUG={slug_json},KEY={key_json},ID={id_json},PATHS={paths_json};\
function esc(t){{return String(t??'').replace(/[&<>\"']/g,c=>'&#'+c.charCodeAt(0)+';');}}\
function at(o,p){{return p.split('.').reduce((v,k)=>v==null?v:v[k],o);}}\
function pintar(data){{const items=Array.isArray(data)?data:(data[KEY]||[]);\
document.getElementById('filas').innerHTML=items.map(r=>'<tr>'+PATHS.map(p=>{{const v=at(r,p);\
return '<td>'+esc(typeof v==='object'?'':v)+'</td>';}}).join('')+\
'<td><a href=\"/'+SLUG+'/editar/'+r[ID]+'\">Editar</a></td></tr>').join('');}}\
async function pedir(url){{const estado=document.getElementById('estado');estado.textContent='';\
const r=await fetch(url);const data=await r.json();\
if(!r.ok){{estado.textContent=data.error||'Error';return;}}pintar(data);}}\
function atributo(){{return encodeURIComponent(document.getElementById('atributo').value);}}\
function buscar(){{const c=document.getElementById('criterio').value.trim();\
if(!c){{location.reload();return;}}pedir('/'+SLUG+'/buscar/'+atributo()+'/'+encodeURIComponent(c));}}\
function ordenar(o){{pedir('/'+SLUG+'/ordenar/'+atributo()+'/'+o);}}\
</script>",
            label = escape(self.resource.label()),
            label_lower = escape(&self.resource.label().to_lowercase()),
            slug_json = Value::from(slug),
            key_json = Value::from(self.resource.collection_key()),
            id_json = Value::from(id_field.as_str()),
        )
    }
}
