//! Client bindings for the Monarch Money GraphQL API.
//!
//! A [`Client`] wraps a [`Transport`] that knows how to deliver GraphQL
//! documents. [`HttpTransport`] talks to the hosted service; tests swap in
//! an in-memory transport.
mod auth;
mod client;
mod error;
pub mod model;
mod pagination;
mod query;
mod transport;

use lazy_static::lazy_static;
use url::Url;

pub use auth::{extend_token, login, Credentials, Token};
pub use client::{Client, TagQuery, TransactionFilters, TransactionOrdering, TransactionQuery};
pub use error::{Error, Result};
pub use pagination::{paginate, Page};
pub use query::Request;
pub use transport::{HttpTransport, Transport};

pub(crate) static CLIENT_PLATFORM: &str = "web";

lazy_static! {
    /// Root of the hosted API. Auth and GraphQL paths are resolved against it.
    pub static ref API_URL: Url = {
        Url::parse("https://api.monarchmoney.com/").unwrap()
    };
}
