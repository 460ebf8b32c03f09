//! HTTP surface of the user registry.

use crate::config::ServiceConfig;
use crate::docs;
use crate::error::{Result, ServiceError};
use crate::model::{User, UserPayload};
use crate::service::UserService;
use crate::storage::create_store;
use axum::{
    body::Bytes,
    extract::{
        rejection::{JsonRejection, PathRejection},
        DefaultBodyLimit, FromRequest, Path, Request, State,
    },
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

pub const WELCOME: &str = "Welcome to the User API";

const MAX_BODY_BYTES: usize = 64 * 1024;

#[derive(Clone)]
pub(crate) struct AppState {
    service: UserService,
}

/// Body of every error response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServiceError::InvalidId | ServiceError::InvalidInput | ServiceError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Io(_) | ServiceError::InvalidConfig(_) | ServiceError::Join(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let message = if self.is_client_error() {
            warn!("Request failed: {} - {}", status, self);
            self.to_string()
        } else {
            error!("Request failed: {} - {}", status, self);
            "Internal server error".to_string()
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

/// Builds the application router around `service` without binding a socket.
pub fn router(service: UserService) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .merge(
            SwaggerUi::new(docs::SWAGGER_PATH).url(docs::OPENAPI_PATH, docs::ApiDoc::openapi()),
        )
        .layer(
            tower::ServiceBuilder::new()
                .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
                .layer(TraceLayer::new_for_http()),
        )
        .with_state(AppState { service })
}

/// A running user registry.
///
/// The server runs on a background tokio task from [`UserRegistryServer::new`]
/// until [`UserRegistryServer::shutdown`] is called.
pub struct UserRegistryServer {
    addr: SocketAddr,
    shutdown_tx: oneshot::Sender<()>,
    handle: JoinHandle<std::io::Result<()>>,
}

impl UserRegistryServer {
    /// Creates and starts a new server with the given configuration.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use user_registry::{ServiceConfig, UserRegistryServer};
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let server = UserRegistryServer::new(ServiceConfig::seeded()).await?;
    /// println!("listening on {}", server.url());
    /// server.shutdown().await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn new(config: ServiceConfig) -> Result<Self> {
        let service = UserService::new(create_store(&config));
        let app = router(service);

        let listener = TcpListener::bind(config.bind_addr()).await?;
        let addr = listener.local_addr()?;

        info!("User registry listening on {}", addr);

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
        });

        Ok(Self {
            addr,
            shutdown_tx,
            handle,
        })
    }

    /// Returns the socket address the server is bound to.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Returns the base URL of the server, e.g. `http://127.0.0.1:8080`.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Stops accepting connections, drains in-flight requests and waits for
    /// the server task to finish.
    pub async fn shutdown(self) -> Result<()> {
        self.shutdown_tx.send(()).ok();
        self.handle.await??;
        info!("User registry on {} stopped", self.addr);
        Ok(())
    }
}

#[utoipa::path(
    get,
    path = "/",
    tag = "users",
    responses((status = 200, description = "Greeting", body = String, content_type = "text/plain"))
)]
pub(crate) async fn root() -> &'static str {
    WELCOME
}

#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    responses((status = 200, description = "All users in insertion order", body = [User]))
)]
pub(crate) async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>> {
    Ok(Json(state.service.list_users().await?))
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "The user", body = User),
        (status = 400, description = "Invalid user ID", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
pub(crate) async fn get_user(
    State(state): State<AppState>,
    path: std::result::Result<Path<String>, PathRejection>,
) -> Result<Json<User>> {
    let Path(id) = path.map_err(reject_path)?;
    Ok(Json(state.service.get_user(&id).await?))
}

#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    request_body = UserPayload,
    responses(
        (status = 201, description = "User created with a server-assigned id", body = User),
        (status = 400, description = "Invalid input or validation failure", body = ErrorResponse)
    )
)]
pub(crate) async fn create_user(
    State(state): State<AppState>,
    payload: Result<UserBody>,
) -> Result<(StatusCode, Json<User>)> {
    let UserBody(payload) = payload?;
    let user = state.service.create_user(payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "users",
    params(("id" = i64, Path, description = "User ID")),
    request_body = UserPayload,
    responses(
        (status = 200, description = "User replaced", body = User),
        (status = 400, description = "Invalid user ID, invalid input or validation failure", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
pub(crate) async fn update_user(
    State(state): State<AppState>,
    path: std::result::Result<Path<String>, PathRejection>,
    payload: Result<UserBody>,
) -> Result<Json<User>> {
    // A bad id wins over a bad body.
    let Path(id) = path.map_err(reject_path)?;
    crate::service::parse_user_id(&id)?;
    let UserBody(payload) = payload?;
    Ok(Json(state.service.update_user(&id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "Invalid user ID", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
pub(crate) async fn delete_user(
    State(state): State<AppState>,
    path: std::result::Result<Path<String>, PathRejection>,
) -> Result<StatusCode> {
    let Path(id) = path.map_err(reject_path)?;
    state.service.delete_user(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// JSON user body. An empty body binds to an empty payload and is left for
/// validation to reject.
pub(crate) struct UserBody(UserPayload);

impl<S> FromRequest<S> for UserBody
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request(req: Request, state: &S) -> Result<Self> {
        let is_json = has_json_content_type(req.headers());
        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            warn!("Failed to read request body: {}", rejection.body_text());
            ServiceError::InvalidInput
        })?;

        if bytes.is_empty() {
            return Ok(UserBody(UserPayload::default()));
        }
        if !is_json {
            warn!("Rejected request body: missing JSON content type");
            return Err(ServiceError::InvalidInput);
        }

        let Json(payload) = Json::<UserPayload>::from_bytes(&bytes).map_err(reject_body)?;
        Ok(UserBody(payload))
    }
}

fn has_json_content_type(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| {
            let essence = ct.split(';').next().unwrap_or("").trim();
            essence.eq_ignore_ascii_case("application/json") || essence.ends_with("+json")
        })
        .unwrap_or(false)
}

fn reject_body(rejection: JsonRejection) -> ServiceError {
    warn!("Rejected request body: {}", rejection.body_text());
    ServiceError::InvalidInput
}

fn reject_path(rejection: PathRejection) -> ServiceError {
    warn!("Rejected path parameter: {}", rejection.body_text());
    ServiceError::InvalidId
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::seed_users;
    use crate::storage::MemoryStore;
    use axum::body::Body;
    use axum::http::Request;
    use std::sync::Arc;
    use tower::util::ServiceExt; // for `oneshot`

    fn app() -> Router {
        router(UserService::new(Arc::new(MemoryStore::with_users(
            seed_users(),
        ))))
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body.to_vec())
    }

    fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    fn error_of(body: &[u8]) -> String {
        serde_json::from_slice::<ErrorResponse>(body).unwrap().error
    }

    #[tokio::test]
    async fn test_root_greeting() {
        let (status, body) = send(app(), empty_request("GET", "/")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, WELCOME.as_bytes());
    }

    #[tokio::test]
    async fn test_get_user_errors() {
        let (status, body) = send(app(), empty_request("GET", "/users/abc")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_of(&body), "Invalid user ID");

        let (status, body) = send(app(), empty_request("GET", "/users/999")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(error_of(&body), "User not found");
    }

    #[tokio::test]
    async fn test_create_malformed_body() {
        let (status, body) = send(app(), json_request("POST", "/users", "{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_of(&body), "Invalid input");

        let (status, body) = send(
            app(),
            json_request("POST", "/users", r#"{"name":"Dana","age":"forty"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_of(&body), "Invalid input");
    }

    #[tokio::test]
    async fn test_create_without_content_type() {
        let request = Request::builder()
            .method("POST")
            .uri("/users")
            .body(Body::from(r#"{"name":"Dana","age":40}"#))
            .unwrap();
        let (status, body) = send(app(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_of(&body), "Invalid input");
    }

    #[tokio::test]
    async fn test_create_validation_message() {
        let (status, body) = send(
            app(),
            json_request("POST", "/users", r#"{"name":"X","age":-1}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_of(&body), "age must be 0 or greater");
    }

    #[tokio::test]
    async fn test_create_returns_created() {
        let (status, body) = send(
            app(),
            json_request("POST", "/users", r#"{"id":50,"name":"Dana","age":40}"#),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let user: User = serde_json::from_slice(&body).unwrap();
        assert_eq!(user, User { id: 4, name: "Dana".into(), age: 40 });
    }

    #[tokio::test]
    async fn test_update_invalid_id_before_body() {
        let (status, body) = send(app(), json_request("PUT", "/users/abc", "{broken")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_of(&body), "Invalid user ID");
    }

    #[tokio::test]
    async fn test_delete_no_content() {
        let (status, body) = send(app(), empty_request("DELETE", "/users/1")).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_non_utf8_id_is_json_error() {
        for request in [
            empty_request("GET", "/users/%FF"),
            empty_request("DELETE", "/users/%FF"),
            json_request("PUT", "/users/%FF", r#"{"name":"Dana","age":40}"#),
        ] {
            let (status, body) = send(app(), request).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(error_of(&body), "Invalid user ID");
        }
    }

    #[tokio::test]
    async fn test_empty_body_reaches_validation() {
        let (status, body) = send(app(), empty_request("POST", "/users")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_of(&body), "name is required; age is required");

        let (status, body) = send(app(), json_request("PUT", "/users/2", "")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_of(&body), "name is required; age is required");
    }

    #[tokio::test]
    async fn test_create_zero_age_rejected() {
        let (status, body) = send(
            app(),
            json_request("POST", "/users", r#"{"name":"a","age":0}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_of(&body), "age is required");
    }

    #[tokio::test]
    async fn test_swagger_ui() {
        let (status, body) = send(app(), empty_request("GET", "/swagger/")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(String::from_utf8_lossy(&body).contains("swagger"));
    }

    #[tokio::test]
    async fn test_openapi_document() {
        let (status, body) = send(app(), empty_request("GET", docs::OPENAPI_PATH)).await;
        assert_eq!(status, StatusCode::OK);
        let doc: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(doc["paths"]["/users"]["post"].is_object());
        assert!(doc["paths"]["/users/{id}"]["delete"]["responses"]["204"].is_object());
    }
}
