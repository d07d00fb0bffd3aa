// ============================================================================
// Conversations - busca, criação e threads de conversas do FreeScout
// ============================================================================
//
// Endpoints usados:
//
// - GET  /api/conversations                 (busca por assunto)
// - POST /api/conversations                 (criação)
// - POST /api/conversations/{id}/threads    (nova thread em conversa existente)
//
// Uma conversa ativa com o mesmo assunto recebe uma nova thread em vez de
// gerar uma conversa duplicada.

use crate::client::FreeScoutClient;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Header com o ID da conversa criada
pub const RESOURCE_ID_HEADER: &str = "Resource-ID";

#[derive(Debug, Clone, Serialize)]
pub(crate) struct Customer<'a> {
    pub email: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct Thread<'a> {
    pub text: &'a str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<Customer<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imported: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ConversationPayload<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub mailbox_id: i64,
    pub subject: &'a str,
    pub customer: Customer<'a>,
    pub threads: Vec<Thread<'a>>,
    pub imported: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assign_to: Option<i64>,
    pub status: &'static str,
}

/// Conversa retornada pela busca
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConversationSummary {
    pub id: i64,
    #[serde(default)]
    pub subject: String,
}

#[derive(Debug, Default, Deserialize)]
struct SearchEmbedded {
    #[serde(default)]
    conversations: Vec<ConversationSummary>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(rename = "_embedded", default)]
    embedded: SearchEmbedded,
}

impl FreeScoutClient {
    /// Cria uma conversa, ou inclui uma thread na conversa ativa de mesmo assunto
    ///
    /// Retorna o ID da conversa (criada ou existente). Se o FreeScout não
    /// devolver o header `Resource-ID` na criação, o ID retornado é 0.
    pub async fn create_conversation(&self, subject: &str, message: &str) -> Result<i64> {
        if let Some(existing) = self.search_active_conversation(subject).await? {
            tracing::debug!(
                conversation_id = existing.id,
                "active conversation found for subject, appending thread"
            );
            self.append_thread(existing.id, message).await?;
            return Ok(existing.id);
        }

        self.create_new_conversation(subject, message).await
    }

    /// Busca a conversa ativa do mailbox configurado com exatamente esse assunto
    ///
    /// Ordena por `updatedAt` ascendente com página de 1 item: se houver mais
    /// de uma conversa com o mesmo assunto, a atualizada há mais tempo vence.
    pub async fn search_active_conversation(&self, subject: &str) -> Result<Option<ConversationSummary>> {
        let mailbox_id = self.options().mailbox_id.to_string();
        let query = [
            ("mailboxId", mailbox_id.as_str()),
            ("status", "active"),
            ("subject", subject),
            ("sortField", "updatedAt"),
            ("sortOrder", "asc"),
            ("pageSize", "1"),
        ];

        let response: SearchResponse = self.get_json("/api/conversations", &query).await?;

        Ok(response
            .embedded
            .conversations
            .into_iter()
            .next()
            .filter(|c| c.subject == subject))
    }

    /// Inclui uma thread de cliente em uma conversa existente
    pub async fn append_thread(&self, conversation_id: i64, message: &str) -> Result<()> {
        let opts = self.options();
        let payload = Thread {
            text: message,
            kind: "customer",
            customer: Some(Customer {
                email: &opts.customer_email,
            }),
            imported: Some(true),
        };

        let endpoint = format!("/api/conversations/{}/threads", conversation_id);
        self.post(&endpoint, &payload).await?;
        Ok(())
    }

    /// Cria uma conversa nova, sem verificar duplicatas
    pub async fn create_new_conversation(&self, subject: &str, message: &str) -> Result<i64> {
        let opts = self.options();
        let payload = ConversationPayload {
            kind: "email",
            mailbox_id: opts.mailbox_id,
            subject,
            customer: Customer {
                email: &opts.customer_email,
            },
            threads: vec![Thread {
                text: message,
                kind: "customer",
                customer: Some(Customer {
                    email: &opts.customer_email,
                }),
                imported: None,
            }],
            imported: true,
            assign_to: opts.assign_to.filter(|id| *id > 0),
            status: "active",
        };

        let response = self.post("/api/conversations", &payload).await?;

        // ID ausente ou inválido não é erro: a conversa foi criada
        let id = response
            .headers()
            .get(RESOURCE_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<i64>().ok())
            .unwrap_or(0);

        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{FreeScoutOptions, API_KEY_HEADER};
    use crate::error::FreeScoutError;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client_for(server: &MockServer, assign_to: Option<i64>) -> FreeScoutClient {
        FreeScoutClient::new(FreeScoutOptions {
            url: server.base_url(),
            api_token: "secret".to_string(),
            mailbox_id: 3,
            customer_email: "fleet@example.com".to_string(),
            assign_to,
        })
        .unwrap()
    }

    fn empty_search() -> serde_json::Value {
        json!({ "_embedded": { "conversations": [] }, "page": { "size": 1, "totalElements": 0 } })
    }

    #[tokio::test]
    async fn test_create_conversation_without_match_posts_new_conversation() {
        let server = MockServer::start_async().await;
        let search = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/conversations")
                    .header(API_KEY_HEADER, "secret")
                    .query_param("mailboxId", "3")
                    .query_param("status", "active")
                    .query_param("subject", "Disk policy failed on 2 host(s)")
                    .query_param("sortField", "updatedAt")
                    .query_param("sortOrder", "asc")
                    .query_param("pageSize", "1");
                then.status(200).json_body(empty_search());
            })
            .await;
        let create = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/conversations")
                    .header(API_KEY_HEADER, "secret")
                    .header("Content-Type", "application/json")
                    .json_body(json!({
                        "type": "email",
                        "mailboxId": 3,
                        "subject": "Disk policy failed on 2 host(s)",
                        "customer": { "email": "fleet@example.com" },
                        "threads": [{
                            "text": "body",
                            "type": "customer",
                            "customer": { "email": "fleet@example.com" }
                        }],
                        "imported": true,
                        "assignTo": 9,
                        "status": "active"
                    }));
                then.status(201).header(RESOURCE_ID_HEADER, "42");
            })
            .await;

        let client = client_for(&server, Some(9));
        let id = client
            .create_conversation("Disk policy failed on 2 host(s)", "body")
            .await
            .unwrap();

        assert_eq!(id, 42);
        search.assert_hits_async(1).await;
        create.assert_hits_async(1).await;
    }

    #[tokio::test]
    async fn test_create_conversation_appends_thread_to_existing_match() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/conversations");
                then.status(200).json_body(json!({
                    "_embedded": { "conversations": [{ "id": 17, "subject": "Same subject" }] }
                }));
            })
            .await;
        let append = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/conversations/17/threads")
                    .json_body(json!({
                        "text": "new body",
                        "type": "customer",
                        "customer": { "email": "fleet@example.com" },
                        "imported": true
                    }));
                then.status(201);
            })
            .await;
        let create = server
            .mock_async(|when, then| {
                when.method(POST).path("/api/conversations");
                then.status(201).header(RESOURCE_ID_HEADER, "99");
            })
            .await;

        let client = client_for(&server, None);
        let id = client.create_conversation("Same subject", "new body").await.unwrap();

        assert_eq!(id, 17);
        append.assert_hits_async(1).await;
        create.assert_hits_async(0).await;
    }

    #[tokio::test]
    async fn test_search_ignores_partial_subject_match() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/conversations");
                then.status(200).json_body(json!({
                    "_embedded": { "conversations": [{ "id": 5, "subject": "Same subject (old)" }] }
                }));
            })
            .await;

        let client = client_for(&server, None);
        let found = client.search_active_conversation("Same subject").await.unwrap();
        assert_eq!(found, None);
    }

    #[tokio::test]
    async fn test_missing_resource_id_header_returns_zero() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/conversations");
                then.status(200).json_body(empty_search());
            })
            .await;
        let create = server
            .mock_async(|when, then| {
                when.method(POST).path("/api/conversations");
                then.status(201);
            })
            .await;

        let client = client_for(&server, Some(0));
        let id = client.create_conversation("subject", "body").await.unwrap();

        assert_eq!(id, 0);
        create.assert_hits_async(1).await;
    }

    #[tokio::test]
    async fn test_unparsable_resource_id_header_returns_zero() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/conversations");
                then.status(201).header(RESOURCE_ID_HEADER, "abc");
            })
            .await;

        let client = client_for(&server, None);
        let id = client.create_new_conversation("subject", "body").await.unwrap();
        assert_eq!(id, 0);
    }

    #[tokio::test]
    async fn test_non_2xx_is_api_error_with_trimmed_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/conversations");
                then.status(401).body("  invalid api key \n");
            })
            .await;

        let client = client_for(&server, None);
        let err = client.create_conversation("subject", "body").await.unwrap_err();

        match err {
            FreeScoutError::Api { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "invalid api key");
            }
            other => panic!("expected api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_redirect_on_create_is_api_error_and_not_followed() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/conversations");
                then.status(200).json_body(empty_search());
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/conversations");
                then.status(302).header("Location", "/login");
            })
            .await;
        let login = server
            .mock_async(|when, then| {
                when.method(GET).path("/login");
                then.status(200).body("<html>login</html>");
            })
            .await;

        let client = client_for(&server, None);
        let err = client.create_conversation("subject", "body").await.unwrap_err();

        assert!(matches!(err, FreeScoutError::Api { status: 302, .. }), "{:?}", err);
        login.assert_hits_async(0).await;
    }

    #[tokio::test]
    async fn test_redirect_on_search_is_api_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/conversations");
                then.status(302).header("Location", "/login");
            })
            .await;
        let login = server
            .mock_async(|when, then| {
                when.method(GET).path("/login");
                then.status(200).json_body(empty_search());
            })
            .await;
        let create = server
            .mock_async(|when, then| {
                when.method(POST).path("/api/conversations");
                then.status(201).header(RESOURCE_ID_HEADER, "1");
            })
            .await;

        let client = client_for(&server, None);
        let err = client.create_conversation("subject", "body").await.unwrap_err();

        assert!(matches!(err, FreeScoutError::Api { status: 302, .. }), "{:?}", err);
        login.assert_hits_async(0).await;
        create.assert_hits_async(0).await;
    }

    #[tokio::test]
    async fn test_append_thread_server_error_is_api_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/conversations/99/threads");
                then.status(500).body("boom");
            })
            .await;

        let client = client_for(&server, None);
        let err = client.append_thread(99, "body").await.unwrap_err();

        match err {
            FreeScoutError::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "boom");
            }
            other => panic!("expected api error, got {:?}", other),
        }
    }
}
