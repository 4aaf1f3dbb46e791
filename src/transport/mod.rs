//! The `transport` module is responsible for the CoAP side of the
//! gateway: the UDP socket the devices talk to.
//!
//! It implements the ingress loop, the egress task that sends protocol
//! replies back out, and the per-datagram pipeline that connects the
//! codec, the duplicate tracker, and the broker.

pub mod pipeline;
pub mod udp;

pub use pipeline::{ExchangeKey, Pipeline};
pub use udp::start_udp_server;

#[cfg(test)]
mod tests;
