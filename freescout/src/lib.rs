//! Cliente da API REST do FreeScout
//!
//! Cobre apenas o que a integração com o Fleet precisa:
//!
//! - Busca de conversa ativa por assunto (`GET /api/conversations`)
//! - Criação de conversa (`POST /api/conversations`)
//! - Nova thread em conversa existente (`POST /api/conversations/{id}/threads`)
//!
//! Autenticação via header estático `X-FreeScout-API-Key`. Qualquer resposta
//! fora de 2xx vira [`FreeScoutError::Api`]; não há retry neste nível.
//!
//! # Exemplo Básico
//!
//! ```rust,ignore
//! use freescout::{FreeScoutClient, FreeScoutOptions};
//!
//! #[tokio::main]
//! async fn main() -> freescout::Result<()> {
//!     let client = FreeScoutClient::new(FreeScoutOptions {
//!         url: "https://support.example.com".to_string(),
//!         api_token: std::env::var("FREESCOUT_API_TOKEN").unwrap_or_default(),
//!         mailbox_id: 1,
//!         customer_email: "fleet@example.com".to_string(),
//!         assign_to: None,
//!     })?;
//!
//!     let id = client.create_conversation("Assunto", "Mensagem").await?;
//!     println!("conversa {}", id);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod conversations;
pub mod error;

pub use client::{FreeScoutClient, FreeScoutOptions};
pub use conversations::ConversationSummary;
pub use error::{FreeScoutError, Result};
