//! # coapsub
//!
//! `coapsub` is a UDP CoAP (RFC 7252) gateway with an in-process
//! publish/subscribe broker. Constrained devices send CoAP datagrams; the
//! gateway decodes them, emits the protocol-required acknowledgements and
//! resets, and routes the payloads to subscribers of hierarchical topic
//! paths via per-subscriber mailboxes.
//!
//! ## Core Modules
//!
//! The library is structured into several modules, each with a distinct
//! responsibility:
//!
//! - `bytes`: byte-slice helpers shared by the codec.
//! - `codec`: the CoAP wire codec, the reply decision, and the message
//!   value types.
//! - `dedup`: the time-bounded duplicate tracker that absorbs
//!   retransmissions within an exchange lifetime.
//! - `broker`: the transactional topic/subscription/mailbox store.
//! - `transport`: the UDP ingress/egress and the per-datagram pipeline.
//! - `api`: the WebSocket subscription façade for remote subscribers.
//! - `config`: layered configuration loading.
//! - `utils`: shared error type and logging setup.

pub mod api;
pub mod broker;
pub mod bytes;
pub mod codec;
pub mod config;
pub mod dedup;
pub mod transport;
pub mod utils;
