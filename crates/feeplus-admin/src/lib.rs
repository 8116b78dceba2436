//! # feeplus-admin
//!
//! Transport layer for the commerce platform's GraphQL Admin API.
//!
//! The reconciliation core only ever talks to the [`AdminClient`] trait:
//! one `execute(document, variables)` call returning a [`GraphqlResponse`]
//! envelope. Authentication, transport-level failures and rate limiting are
//! handled here and surfaced as [`AdminError`].
//!
//! ## Example
//!
//! ```ignore
//! use feeplus_admin::{AdminApiConfig, AdminClient, HttpAdminClient};
//! use serde_json::json;
//!
//! let config = AdminApiConfig::new("example.myshopify.com", "shpat_xxx");
//! let client = HttpAdminClient::new(config)?;
//!
//! let response = client
//!     .execute("query ShopIdentity { shop { id } }", json!({}))
//!     .await?
//!     .into_data()?;
//! println!("{}", response["shop"]["id"]);
//! ```

mod client;
mod error;
mod http;
mod response;

pub use client::{AdminClient, DynAdminClient, operation_name};
pub use error::AdminError;
pub use http::{AdminApiConfig, HttpAdminClient};
pub use response::{GraphqlError, GraphqlResponse, UserError, join_messages};
