mod client;
pub mod queries;

pub use client::{authenticated_tokens_header, GraphqlHttpClient, AUTHENTICATED_TOKENS_HEADER};
pub use queries::{BuiltinQueries, QueryProvider};
