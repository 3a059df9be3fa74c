//! JSON envelope codec.
//!
//! # Data Flow
//! ```text
//! HTTP request
//!     → request.rs (head + body → RequestEnvelope, path rewrite)
//!     → JSON bytes → invoker
//! invoker reply bytes
//!     → reply.rs (ReplyEnvelope or passthrough)
//!     → DecodedReply → HTTP response
//! ```
//!
//! # Wire Format
//! ```text
//! request: {"type":"HTTPJSON-REQ","meta":{"method","path","query","host","proto","headers"},"body"}
//! reply:   {"type":"HTTPJSON-REP","meta":{"status","headers"},"body"}
//! ```

pub mod reply;
pub mod request;

pub use reply::{decode_reply, DecodedReply, ReplyEnvelope, ReplyError, ReplyMeta, REPLY_TYPE};
pub use request::{
    decode_path, encode_request, path_for_metadata, RequestEnvelope, RequestMeta, REQUEST_TYPE,
};
