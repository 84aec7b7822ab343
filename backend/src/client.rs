//! Backend API client implementation

use crate::{error::BackendError, resource::Resource};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;

/// Result of `POST /api/auth/login`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Credentials accepted
    Authenticated {
        /// Bearer token for later calls
        token: String,
    },
    /// Account locked (423)
    Locked {
        /// Backend explanation
        mensaje: String,
    },
    /// Any other answer
    Rejected,
}

/// Backend REST client
///
/// Cheap to clone; a per-request copy carrying the session's bearer token is
/// made with [`with_token`](Self::with_token).
#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl std::fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendClient")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.token.is_some())
            .finish_non_exhaustive()
    }
}

impl BackendClient {
    /// Create a client for `base_url` with a per-request `timeout`.
    #[must_use]
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, ?timeout, "HTTP client build failed, requests will not time out");
                Client::new()
            });

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Copy of this client that sends `Authorization: Bearer {token}`.
    #[must_use]
    pub fn with_token(&self, token: Option<String>) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            token: token.filter(|t| !t.is_empty()),
        }
    }

    /// Backend base URL, without trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}{path}", self.base_url));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request and return status plus JSON body (`Null` when empty or
    /// not JSON).
    async fn exchange(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<(StatusCode, Value, String), BackendError> {
        let mut builder = self.request(method.clone(), path);
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::warn!(%method, path, error = %e, "Backend request failed");
            BackendError::from(e)
        })?;

        let status = response.status();
        let text = response.text().await?;
        tracing::debug!(%method, path, status = status.as_u16(), "Backend call");

        let value = serde_json::from_str(&text).unwrap_or(Value::Null);
        Ok((status, value, text))
    }

    /// Like `exchange`, but a non-2xx status becomes an error.
    async fn call(
        &self,
        resource: Option<Resource>,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, BackendError> {
        let (status, value, text) = self.exchange(method.clone(), path, body).await?;

        if status.is_success() {
            return Ok(value);
        }

        tracing::warn!(%method, path, status = status.as_u16(), "Backend returned an error");
        if let Some(resource) = resource {
            metrics::counter!("portal_backend_errors_total", "resource" => resource.slug())
                .increment(1);
        }
        Err(BackendError::from_body(status, &text))
    }

    // ═══════════════════════════════════════════════════════════════════
    // Generic resource operations
    // ═══════════════════════════════════════════════════════════════════

    /// Raw `GET /api/{slug}/lista` body.
    ///
    /// # Errors
    ///
    /// Transport failure or non-2xx status.
    pub async fn list_raw(&self, resource: Resource) -> Result<Value, BackendError> {
        let path = format!("/api/{}/lista", resource.slug());
        self.call(Some(resource), Method::GET, &path, None).await
    }

    /// `GET /api/{slug}/lista`, decoded from the collection key. A missing key
    /// is an empty list.
    ///
    /// # Errors
    ///
    /// Transport failure, non-2xx status, or items that do not decode.
    pub async fn list<T: DeserializeOwned>(
        &self,
        resource: Resource,
    ) -> Result<Vec<T>, BackendError> {
        let mut body = self.list_raw(resource).await?;
        match body.get_mut(resource.collection_key()).map(Value::take) {
            Some(Value::Null) | None => Ok(Vec::new()),
            Some(items) => Ok(serde_json::from_value(items)?),
        }
    }

    /// Raw item object under the item key of `GET /api/{slug}/lista/{id}`.
    /// `None` on 404 or when the key is absent.
    ///
    /// # Errors
    ///
    /// Transport failure or a non-2xx status other than 404.
    pub async fn fetch_raw(
        &self,
        resource: Resource,
        id: i64,
    ) -> Result<Option<Value>, BackendError> {
        let path = format!("/api/{}/lista/{id}", resource.slug());
        match self.call(Some(resource), Method::GET, &path, None).await {
            Ok(mut body) => Ok(body
                .get_mut(resource.item_key())
                .map(Value::take)
                .filter(|v| !v.is_null())),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Typed [`fetch_raw`](Self::fetch_raw).
    ///
    /// # Errors
    ///
    /// As `fetch_raw`, plus an item that does not decode.
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        resource: Resource,
        id: i64,
    ) -> Result<Option<T>, BackendError> {
        self.fetch_raw(resource, id)
            .await?
            .map(serde_json::from_value)
            .transpose()
            .map_err(BackendError::from)
    }

    /// `POST /api/{slug}/guardar`.
    ///
    /// # Errors
    ///
    /// Transport failure or non-2xx status.
    pub async fn create(&self, resource: Resource, body: &Value) -> Result<Value, BackendError> {
        let path = format!("/api/{}/guardar", resource.slug());
        self.call(Some(resource), Method::POST, &path, Some(body)).await
    }

    /// `PUT /api/{slug}/actualizar`.
    ///
    /// # Errors
    ///
    /// Transport failure or non-2xx status.
    pub async fn update(&self, resource: Resource, body: &Value) -> Result<Value, BackendError> {
        let path = format!("/api/{}/actualizar", resource.slug());
        self.call(Some(resource), Method::PUT, &path, Some(body)).await
    }

    /// `DELETE /api/{slug}/eliminar/{id}`.
    ///
    /// # Errors
    ///
    /// Transport failure or non-2xx status.
    pub async fn delete(&self, resource: Resource, id: i64) -> Result<Value, BackendError> {
        let path = format!("/api/{}/eliminar/{id}", resource.slug());
        self.call(Some(resource), Method::DELETE, &path, None).await
    }

    /// `GET /api/{slug}/ordenar/{attr}/{order}`.
    ///
    /// # Errors
    ///
    /// Transport failure or non-2xx status.
    pub async fn sort(
        &self,
        resource: Resource,
        attr: &str,
        order: &str,
    ) -> Result<Value, BackendError> {
        let path = format!(
            "/api/{}/ordenar/{}/{}",
            resource.slug(),
            urlencoding::encode(attr),
            urlencoding::encode(order)
        );
        self.call(Some(resource), Method::GET, &path, None).await
    }

    /// `GET /api/{slug}/buscar/{attr}/{criterion}`.
    ///
    /// # Errors
    ///
    /// Transport failure or non-2xx status.
    pub async fn search(
        &self,
        resource: Resource,
        attr: &str,
        criterion: &str,
    ) -> Result<Value, BackendError> {
        let path = format!(
            "/api/{}/buscar/{}/{}",
            resource.slug(),
            urlencoding::encode(attr),
            urlencoding::encode(criterion)
        );
        self.call(Some(resource), Method::GET, &path, None).await
    }

    /// `GET /api/{slug}/{name}`, returning the strings under `key`
    /// (`cuenta/tipos` → `tipos`).
    ///
    /// # Errors
    ///
    /// Transport failure or non-2xx status.
    pub async fn options(
        &self,
        resource: Resource,
        name: &str,
        key: &str,
    ) -> Result<Vec<String>, BackendError> {
        let path = format!("/api/{}/{name}", resource.slug());
        let body = self.call(Some(resource), Method::GET, &path, None).await?;

        Ok(body
            .get(key)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(ToString::to_string))
                    .collect()
            })
            .unwrap_or_default())
    }

    // ═══════════════════════════════════════════════════════════════════
    // Special endpoints
    // ═══════════════════════════════════════════════════════════════════

    /// `POST /api/auth/login`.
    ///
    /// # Errors
    ///
    /// Transport failure only; refusals are [`LoginOutcome`] variants.
    pub async fn login(
        &self,
        correo: &str,
        contrasenia: &str,
    ) -> Result<LoginOutcome, BackendError> {
        let body = json!({ "correo": correo, "contrasenia": contrasenia });
        let (status, value, _) = self
            .exchange(Method::POST, "/api/auth/login", Some(&body))
            .await?;

        let outcome = match status {
            StatusCode::OK => {
                let token = ["token", "access_token"]
                    .iter()
                    .find_map(|key| value.get(key).and_then(Value::as_str))
                    .unwrap_or_default()
                    .to_string();
                LoginOutcome::Authenticated { token }
            }
            StatusCode::LOCKED => LoginOutcome::Locked {
                mensaje: value
                    .get("mensaje")
                    .and_then(Value::as_str)
                    .unwrap_or("Cuenta bloqueada")
                    .to_string(),
            },
            _ => LoginOutcome::Rejected,
        };
        Ok(outcome)
    }

    /// `POST /api/persona/transferir-saldo`.
    ///
    /// # Errors
    ///
    /// Transport failure or non-2xx status.
    pub async fn transfer_balance(&self, persona_id: i64) -> Result<Value, BackendError> {
        let body = json!({ "id_persona": persona_id });
        self.call(
            Some(Resource::Persona),
            Method::POST,
            "/api/persona/transferir-saldo",
            Some(&body),
        )
        .await
    }

    /// Raw passthrough: whatever status and JSON body the backend returns.
    ///
    /// # Errors
    ///
    /// Transport failure only.
    pub async fn forward(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<(StatusCode, Value), BackendError> {
        let (status, value, _) = self.exchange(method, path, body.as_ref()).await?;
        Ok((status, value))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::{Bus, Persona};
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> BackendClient {
        BackendClient::new(server.uri(), Duration::from_secs(5))
    }

    #[test]
    fn test_base_url_trimmed() {
        let client = BackendClient::new("http://localhost:8080/", Duration::from_secs(1));
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[tokio::test]
    async fn test_list_reads_collection_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/bus/lista"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "buses": [{"id_bus": 1, "numero_bus": 4, "placa": "ABC-123"}]
            })))
            .mount(&server)
            .await;

        let buses: Vec<Bus> = client_for(&server).list(Resource::Bus).await.unwrap();
        assert_eq!(buses.len(), 1);
        assert_eq!(buses[0].placa, "ABC-123");
    }

    #[tokio::test]
    async fn test_list_missing_key_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/ruta/lista"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"mensaje": "ok"})))
            .mount(&server)
            .await;

        let rutas: Vec<Value> = client_for(&server).list(Resource::Ruta).await.unwrap();
        assert!(rutas.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_not_found_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/persona/lista/9"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"mensaje": "No existe"})))
            .mount(&server)
            .await;

        let persona: Option<Persona> = client_for(&server)
            .fetch(Resource::Persona, 9)
            .await
            .unwrap();
        assert!(persona.is_none());
    }

    #[tokio::test]
    async fn test_token_sent_as_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/persona/lista/1"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"persona": {"id_persona": 1, "nombre": "Ana"}})),
            )
            .mount(&server)
            .await;

        let persona: Persona = client_for(&server)
            .with_token(Some("tok".into()))
            .fetch(Resource::Persona, 1)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(persona.nombre, "Ana");
    }

    #[tokio::test]
    async fn test_create_error_carries_backend_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/cooperativa/guardar"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"msg": "RUC inválido"})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .create(Resource::Cooperativa, &json!({"ruc": "x"}))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
        assert_eq!(err.to_string(), "RUC inválido");
    }

    #[tokio::test]
    async fn test_search_encodes_segments() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/ruta/buscar/origen/San%20Pedro"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"rutas": []})))
            .mount(&server)
            .await;

        let body = client_for(&server)
            .search(Resource::Ruta, "origen", "San Pedro")
            .await
            .unwrap();
        assert_eq!(body, json!({"rutas": []}));
    }

    #[tokio::test]
    async fn test_options() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/cuenta/tipos"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"tipos": ["Administrador", "Cliente"]})),
            )
            .mount(&server)
            .await;

        let tipos = client_for(&server)
            .options(Resource::Cuenta, "tipos", "tipos")
            .await
            .unwrap();
        assert_eq!(tipos, vec!["Administrador", "Cliente"]);
    }

    #[tokio::test]
    async fn test_login_outcomes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .and(body_json(json!({"correo": "ok@x.ec", "contrasenia": "1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "jwt"})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .and(body_json(json!({"correo": "lock@x.ec", "contrasenia": "1"})))
            .respond_with(ResponseTemplate::new(423).set_body_json(json!({})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert_eq!(
            client.login("ok@x.ec", "1").await.unwrap(),
            LoginOutcome::Authenticated { token: "jwt".into() }
        );
        assert_eq!(
            client.login("lock@x.ec", "1").await.unwrap(),
            LoginOutcome::Locked {
                mensaje: "Cuenta bloqueada".into()
            }
        );
        assert_eq!(
            client.login("bad@x.ec", "1").await.unwrap(),
            LoginOutcome::Rejected
        );
    }

    #[tokio::test]
    async fn test_forward_passes_status_through() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/bus/eliminar/3"))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({"mensaje": "en uso"})))
            .mount(&server)
            .await;

        let (status, body) = client_for(&server)
            .forward(Method::DELETE, "/api/bus/eliminar/3", None)
            .await
            .unwrap();
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["mensaje"], "en uso");
    }

    #[tokio::test]
    async fn test_transport_failure() {
        let client = BackendClient::new("http://127.0.0.1:1", Duration::from_secs(1));
        let err = client.list_raw(Resource::Bus).await.unwrap_err();
        assert!(matches!(
            err,
            BackendError::Transport(_) | BackendError::Timeout
        ));
    }

    #[tokio::test]
    async fn test_configured_timeout_applies() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/bus/lista"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"buses": []}))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let client = BackendClient::new(server.uri(), Duration::from_millis(200));
        let err = client.list_raw(Resource::Bus).await.unwrap_err();
        assert!(matches!(err, BackendError::Timeout));
    }
}
