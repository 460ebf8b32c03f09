//! OpenAPI document for the route table, generated from the handler
//! annotations in [`crate::server`], and the Swagger UI that renders it.

use utoipa::OpenApi;

use crate::model::{User, UserPayload};
use crate::server::ErrorResponse;

/// Mount point of the interactive explorer.
pub const SWAGGER_PATH: &str = "/swagger";

/// Where the document is served.
pub const OPENAPI_PATH: &str = "/swagger/doc.json";

#[derive(OpenApi)]
#[openapi(
    info(title = "User API", description = "CRUD over an in-memory user collection"),
    paths(
        crate::server::root,
        crate::server::list_users,
        crate::server::get_user,
        crate::server::create_user,
        crate::server::update_user,
        crate::server::delete_user,
    ),
    components(schemas(User, UserPayload, ErrorResponse)),
    tags((name = "users", description = "User management"))
)]
pub struct ApiDoc;
