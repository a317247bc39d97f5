//! `croak` is a small CoAP server built around two pieces:
//! - a path router with composable middleware ([`server::Router`])
//! - a response builder that encodes options into a buffer that
//!   grows on demand ([`resp::builder::Builder`])
//!
//! ## CoAP
//! CoAP is an application-level network protocol that copies the semantics of HTTP
//! to an environment conducive to **constrained** devices. (weak hardware, small battery capacity, etc.)
//!
//! Requests are addressed by a path (carried in Uri-Path options), have a method
//! (GET, POST, PUT, DELETE) and are answered with a response code,
//! options (e.g. Content-Format) and a payload. Each response echoes
//! the token of the request it answers.
//!
//! ## Example
//! ```
//! use std::sync::Arc;
//!
//! use croak::logging::Log;
//! use croak::net::Addrd;
//! use croak::req::Req;
//! use croak::resp::{builder::Builder, code};
//! use croak::server::{Error, Logging, Router, Run};
//! use croak_msg::ContentFormat;
//!
//! let builder = Builder::default();
//! let router = Router::builder(Arc::new(Log)).use_middleware(Logging::new(Arc::new(Log)))
//!                                            .handle("/hello", move |req: &Addrd<Req>| {
//!                                              builder.build(req,
//!                                                            code::CONTENT,
//!                                                            ContentFormat::Text,
//!                                                            "hi!")
//!                                                     .map_err(Error::from)
//!                                            })
//!                                            .build();
//!
//! let req = Addrd(Req::get("hello"), "127.0.0.1:5683".parse().unwrap());
//! match router.dispatch(&req) {
//!   | Run::Matched(resp) => assert_eq!(resp.data().payload(), b"hi!"),
//!   | other => panic!("{:?}", other),
//! }
//!
//! assert_eq!(router.dispatch(&Addrd(Req::get("bye"), req.addr())), Run::Unmatched);
//! ```

#![cfg_attr(not(test), deny(unsafe_code))]
#![cfg_attr(not(test), warn(unreachable_pub, missing_debug_implementations))]
#![warn(missing_docs)]

macro_rules! code {
  (rfc7252($section:literal) $name:ident = $c:literal.$d:literal) => {
    #[doc = toad_macros::rfc_7252_doc!($section)]
    #[allow(clippy::zero_prefixed_literal)]
    pub const $name: croak_msg::Code = croak_msg::Code::new($c, $d);
  };
  (rfc7252($section:literal) $name:ident = $newtype:tt($c:literal.$d:literal)) => {
    #[doc = toad_macros::rfc_7252_doc!($section)]
    #[allow(clippy::zero_prefixed_literal)]
    pub const $name: $newtype = $newtype(croak_msg::Code::new($c, $d));
  };
}

pub(crate) use code;

#[cfg(test)]
pub(crate) mod test;

/// logging sink & message summaries
pub mod logging;

/// configuring runtime behavior
pub mod config;

/// network abstractions
pub mod net;

/// requests
pub mod req;

/// responses
pub mod resp;

/// routing, middleware & the datagram server
pub mod server;

/// the resources served by the `croak` binary
pub mod routes;
