//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request path
//!     → router.rs (first route whose prefix matches)
//!     → route.rs (single function, or parse + filter)
//!         → resolver.rs (segment after prefix, include/exclude)
//!         → glob.rs (prefix/suffix/infix `*` rules)
//!     → Return: resolved function name or fall through
//!
//! Route Compilation (at startup):
//!     RouteConfig[] + one invoker per route
//!     → Route (immutable)
//!     → Router, in configuration order
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (prefix matching and simple globs only)
//! - Deterministic: same input always matches same route
//! - First match wins (configuration order)

pub mod glob;
pub mod resolver;
pub mod route;
pub mod router;

pub use glob::match_glob;
pub use resolver::{accepts_function, parse_function_name};
pub use route::{FunctionSelector, ResolvedFunction, Route};
pub use router::Router;
