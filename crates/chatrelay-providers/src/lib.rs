//! Chatrelay providers — talking to LLM HTTP APIs.
//!
//! - [`registry`] — static provider specs, endpoint resolution, candidate order
//! - [`adapters`] — per-family request building and response normalization
//! - [`transport`] — the HTTP POST itself (`reqwest`)
//! - [`dispatcher`] — sequential fail-over across candidates

pub mod adapters;
pub mod dispatcher;
pub mod error;
pub mod registry;
pub mod transport;

pub use adapters::{adapter_for, PreparedRequest, ProviderAdapter};
pub use dispatcher::Dispatcher;
pub use error::DispatchError;
pub use registry::{build_candidates, Candidate, ResolvedEndpoint};
pub use transport::{HttpResponse, ReqwestTransport, Transport};
