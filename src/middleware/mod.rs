/// Middleware layer para o Axum router
///
/// Autenticação dos endpoints administrativos da integração FreeScout.

pub mod admin_auth;

pub use admin_auth::require_admin_key;
