//! HTTP gateway that routes requests to remote functions.
//!
//! Each configured route owns a path prefix. A request under that prefix
//! names a function in its next path segment (or the route pins a single
//! function); the request is wrapped in a JSON envelope, sent to the
//! function through an [`Invoker`], and the reply is unwrapped back into an
//! HTTP response. Requests no route accepts continue down the handler chain.

pub mod config;
pub mod envelope;
pub mod error;
pub mod gateway;
pub mod http;
pub mod invoker;
pub mod lifecycle;
pub mod observability;
pub mod replacer;
pub mod routing;

pub use config::GatewayConfig;
pub use error::GatewayError;
pub use gateway::{Dispatch, Gateway, NextHandler};
pub use http::GatewayServer;
pub use invoker::{InvokeError, Invoker};
pub use lifecycle::Shutdown;
pub use replacer::Replacer;
