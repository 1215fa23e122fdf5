// Allow large error types - the Error enum includes OIDs inline for debugging convenience.
// Boxing them would add complexity and allocations for a marginal size reduction.
#![allow(clippy::result_large_err)]

//! # microsnmp
//!
//! Embedded-style SNMP v1/v2c agent core for Rust.
//!
//! ## Features
//!
//! - GET, GETNEXT, and two-phase atomic SET
//! - Zero-copy BER decoding, tail-first encoding into a fixed-size buffer
//! - Callback-driven MIB registry for scalars and tables
//! - Transport-agnostic engine plus a ready-made async UDP agent on Tokio
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use microsnmp::{Agent, MibObject, MibRegistry, Value, oid};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), microsnmp::Error> {
//!     let mut mib = MibRegistry::new();
//!     mib.register(MibObject::scalar(
//!         oid!(1, 3, 6, 1, 2, 1, 1, 1, 0),
//!         Value::from("microsnmp demo agent"),
//!     ));
//!     mib.register(MibObject::scalar(
//!         oid!(1, 3, 6, 1, 2, 1, 1, 5, 0),
//!         Value::from("host1"),
//!     ));
//!
//!     let agent = Agent::builder()
//!         .bind("0.0.0.0:161")
//!         .community(b"public")
//!         .build()
//!         .await?;
//!
//!     agent.run(&mut mib).await
//! }
//! ```
//!
//! ## Without a socket
//!
//! The [`Engine`] is transport-agnostic; feed it datagrams from anywhere:
//!
//! ```rust
//! use microsnmp::{Engine, MibObject, MibRegistry, Value, oid};
//!
//! let mut mib = MibRegistry::new();
//! mib.register(MibObject::scalar(
//!     oid!(1, 3, 6, 1, 2, 1, 1, 7, 0),
//!     Value::Integer(72),
//! ));
//!
//! let engine = Engine::new(&b"public"[..]);
//! // let reply = engine.handle(&datagram, &mut mib)?;
//! ```

pub mod agent;
pub mod ber;
pub mod engine;
pub mod error;
pub mod message;
pub mod mib;
pub mod oid;
pub mod pdu;
pub mod value;
pub mod varbind;

// Re-exports for convenience
pub use agent::{Agent, AgentBuilder};
pub use engine::Engine;
pub use error::{
    DecodeErrorKind, EncodeErrorKind, Error, ErrorStatus, OidErrorKind, Result,
};
pub use message::{Message, Version};
pub use mib::{GetFn, MibObject, MibRegistry, NextFn, SetFn, Suffix};
pub use oid::Oid;
pub use pdu::{Pdu, PduType};
pub use value::Value;
pub use varbind::VarBind;
