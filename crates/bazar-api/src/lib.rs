//! Application services for the bazar shop backend.
//!
//! Each module under [`services`] covers one resource: registration
//! and login, user administration, the catalog, carts and coupons,
//! orders, the address book, the blog, and contact messages. Services
//! are plain functions over an [`AppContext`]; an HTTP layer maps
//! their results into the [`ApiResponse`] envelope.

pub mod config;
pub mod context;
pub mod error;
pub mod mail;
pub mod response;
pub mod services;

pub use config::AppConfig;
pub use context::AppContext;
pub use error::ApiError;
pub use mail::{LogMailer, Mailer, MemoryMailer, OutboundMail};
pub use response::ApiResponse;
