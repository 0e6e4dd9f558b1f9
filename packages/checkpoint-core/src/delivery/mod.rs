//! Broker wire bookkeeping that does not need a socket: splitting the
//! inbound byte stream into packets, tracking publish handshakes by packet
//! identifier, and deciding when the session owes the broker a ping.

mod frames;
mod keep_alive;
mod tracker;

pub use frames::{parse_ack, Ack, FrameBuffer, FrameStatus, PacketKind};
pub use keep_alive::{KeepAlive, KeepAliveStep};
pub use tracker::{
    publish_qos, AckOutcome, DeliveryTracker, InboundVerdict, Reply, TrackerFull,
};

#[cfg(test)]
mod tests;
