// Handlers HTTP do worker FreeScout
pub mod admin;
pub mod health;
pub mod jobs;
pub mod worker;

pub use admin::*;
pub use health::*;
pub use jobs::*;
pub use worker::*;
