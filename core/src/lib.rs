//! Blocking client for the Bitly v3 link API.
//!
//! # Overview
//! `Client` owns the base URL, access token and a `Transport`; `Links`
//! borrows a client and exposes expand, info, lookup, shorten, clicks and
//! popular. Every call is one GET round trip whose response envelope is
//! stripped before decoding.
//!
//! # Design
//! - Request building and response parsing are pure; only `Transport`
//!   touches the network, so every operation also has a `build_*`/`parse_*`
//!   pair for hosts that run their own I/O.
//! - `UreqTransport` is the default transport.
//! - Response types are defined independently of the mock-server crate;
//!   integration tests catch schema drift.

pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod http;
pub mod links;
pub mod types;

pub use client::Client;
pub use config::ClientConfig;
pub use envelope::Envelope;
pub use error::{BitlyError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, QueryParams, Transport, UreqTransport};
pub use links::Links;
pub use types::{Link, PopularLinks, TimeUnit, Units, ALL_TIME};
