/// Middleware de autenticação para endpoints administrativos
///
/// Valida que a requisição contém um API key válido no header X-Admin-Key.
/// Protege a validação e a consulta das integrações FreeScout.

use axum::{
    extract::Request,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

pub const ADMIN_KEY_HEADER: &str = "X-Admin-Key";

/// Decisão de acesso a partir do key esperado, do key enviado e do ambiente
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminAccess {
    Granted,
    /// Sem ADMIN_API_KEY fora de produção
    GrantedUnconfigured,
    Denied,
    /// Sem ADMIN_API_KEY em produção
    Unavailable,
}

pub fn admin_access(expected: Option<&str>, provided: Option<&str>, is_production: bool) -> AdminAccess {
    match (expected, provided) {
        (Some(expected), Some(provided)) if expected == provided => AdminAccess::Granted,
        (Some(_), _) => AdminAccess::Denied,
        (None, _) if is_production => AdminAccess::Unavailable,
        (None, _) => AdminAccess::GrantedUnconfigured,
    }
}

/// Middleware que requer API key para acesso aos endpoints /admin/freescout/*
///
/// Configure `ADMIN_API_KEY` no ambiente e envie o mesmo valor no header:
///
/// ```bash
/// curl -X POST -H "X-Admin-Key: $ADMIN_API_KEY" \
///   -H "Content-Type: application/json" -d @integrations.json \
///   http://localhost:8080/admin/freescout/validate
/// ```
///
/// Sem `ADMIN_API_KEY`, o acesso é liberado em desenvolvimento (com warning)
/// e bloqueado com 503 quando `RUST_ENV=production`.
pub async fn require_admin_key(headers: HeaderMap, request: Request, next: Next) -> Result<Response, Response> {
    let provided_key = headers.get(ADMIN_KEY_HEADER).and_then(|v| v.to_str().ok());
    let expected_key = std::env::var("ADMIN_API_KEY").ok();
    let is_production = std::env::var("RUST_ENV").map(|env| env == "production").unwrap_or(false);

    match admin_access(expected_key.as_deref(), provided_key, is_production) {
        AdminAccess::Granted => {
            tracing::debug!("✅ Admin access granted");
            Ok(next.run(request).await)
        }
        AdminAccess::GrantedUnconfigured => {
            tracing::warn!("⚠️  ADMIN_API_KEY not configured - allowing admin access outside production");
            Ok(next.run(request).await)
        }
        AdminAccess::Denied => {
            tracing::warn!(
                "❌ Admin access denied - Invalid or missing X-Admin-Key: {:?}",
                provided_key.map(|_| "<redacted>")
            );
            Err(error_response(
                StatusCode::UNAUTHORIZED,
                "Missing or invalid X-Admin-Key header",
            ))
        }
        AdminAccess::Unavailable => {
            tracing::error!("🚨 ADMIN_API_KEY not configured in production! Blocking admin access.");
            Err(error_response(
                StatusCode::SERVICE_UNAVAILABLE,
                "ADMIN_API_KEY not configured on server",
            ))
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({
            "error": status.canonical_reason().unwrap_or("error"),
            "message": message
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, middleware, routing::get, Router};
    use tower::ServiceExt;

    #[test]
    fn test_admin_access_decisions() {
        assert_eq!(admin_access(Some("k"), Some("k"), true), AdminAccess::Granted);
        assert_eq!(admin_access(Some("k"), Some("x"), false), AdminAccess::Denied);
        assert_eq!(admin_access(Some("k"), None, false), AdminAccess::Denied);
        assert_eq!(admin_access(None, Some("k"), false), AdminAccess::GrantedUnconfigured);
        assert_eq!(admin_access(None, None, true), AdminAccess::Unavailable);
    }

    #[tokio::test]
    async fn test_middleware_rejects_wrong_key() {
        // único teste que mexe no ambiente do processo
        std::env::set_var("ADMIN_API_KEY", "test-key-123");

        let app = Router::new()
            .route("/admin/freescout/integrations", get(|| async { "ok" }))
            .layer(middleware::from_fn(require_admin_key));
        let request = |key: &str| {
            Request::builder()
                .uri("/admin/freescout/integrations")
                .header(ADMIN_KEY_HEADER, key)
                .body(Body::empty())
                .unwrap()
        };

        let ok = app.clone().oneshot(request("test-key-123")).await.unwrap();
        let denied = app.oneshot(request("wrong-key")).await.unwrap();
        std::env::remove_var("ADMIN_API_KEY");

        assert_eq!(ok.status(), StatusCode::OK);
        assert_eq!(denied.status(), StatusCode::UNAUTHORIZED);
    }
}
