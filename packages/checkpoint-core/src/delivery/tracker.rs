use heapless::Vec;

use crate::types::Qos;

/// QoS of a PUBLISH, from its fixed header. `None` for the reserved value.
pub const fn publish_qos(header: u8) -> Option<Qos> {
    match (header >> 1) & 0x03 {
        0 => Some(Qos::AtMostOnce),
        1 => Some(Qos::AtLeastOnce),
        2 => Some(Qos::ExactlyOnce),
        _ => None,
    }
}

/// Packet the session must write back to the broker.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Reply {
    Puback(u16),
    Pubrec(u16),
    Pubrel(u16),
    Pubcomp(u16),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum InboundVerdict {
    /// Hand the message to the application, then send the reply if any.
    Deliver(Option<Reply>),
    /// Retransmission of a QoS 2 message already delivered.
    Duplicate(Reply),
    /// More unreleased QoS 2 messages than the session advertised.
    Overflow,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AckOutcome {
    Reply(Reply),
    Completed,
    /// The broker refused the message; the exchange is over.
    Rejected(u8),
    /// No exchange is waiting on this identifier at this stage.
    Unknown,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct TrackerFull;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Stage {
    AwaitingPuback,
    AwaitingPubrec,
    AwaitingPubcomp,
    AwaitingSuback,
}

#[derive(Clone, Copy, Debug)]
struct Exchange {
    packet_id: u16,
    stage: Stage,
}

/// Packet identifier bookkeeping for one broker session.
///
/// Outgoing QoS 1 and 2 publishes and subscriptions hold an identifier until
/// the broker completes them. Incoming QoS 2 identifiers are held from
/// delivery until PUBREL so a retransmission is not delivered twice.
pub struct DeliveryTracker<const N: usize> {
    outgoing: Vec<Exchange, N>,
    unreleased: Vec<u16, N>,
    last_id: u16,
}

impl<const N: usize> Default for DeliveryTracker<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> DeliveryTracker<N> {
    pub const fn new() -> Self {
        Self {
            outgoing: Vec::new(),
            unreleased: Vec::new(),
            last_id: 0,
        }
    }

    pub fn clear(&mut self) {
        self.outgoing.clear();
        self.unreleased.clear();
    }

    pub fn in_flight(&self) -> usize {
        self.outgoing.len()
    }

    pub fn is_full(&self) -> bool {
        self.outgoing.is_full()
    }

    /// Identifier for an outgoing publish, or `None` at QoS 0.
    pub fn begin_publish(&mut self, qos: Qos) -> Result<Option<u16>, TrackerFull> {
        let stage = match qos {
            Qos::AtMostOnce => return Ok(None),
            Qos::AtLeastOnce => Stage::AwaitingPuback,
            Qos::ExactlyOnce => Stage::AwaitingPubrec,
        };
        self.begin(stage).map(Some)
    }

    pub fn begin_subscribe(&mut self) -> Result<u16, TrackerFull> {
        self.begin(Stage::AwaitingSuback)
    }

    pub fn on_puback(&mut self, packet_id: u16) -> AckOutcome {
        match self.take(packet_id, Stage::AwaitingPuback) {
            true => AckOutcome::Completed,
            false => AckOutcome::Unknown,
        }
    }

    pub fn on_pubrec(&mut self, packet_id: u16, reason: u8) -> AckOutcome {
        let Some(index) = self
            .outgoing
            .iter()
            .position(|exchange| exchange.packet_id == packet_id)
        else {
            return AckOutcome::Unknown;
        };
        match self.outgoing[index].stage {
            Stage::AwaitingPubrec if reason >= 0x80 => {
                self.outgoing.swap_remove(index);
                AckOutcome::Rejected(reason)
            }
            // A repeated PUBREC gets the PUBREL again.
            Stage::AwaitingPubrec | Stage::AwaitingPubcomp => {
                self.outgoing[index].stage = Stage::AwaitingPubcomp;
                AckOutcome::Reply(Reply::Pubrel(packet_id))
            }
            Stage::AwaitingPuback | Stage::AwaitingSuback => AckOutcome::Unknown,
        }
    }

    pub fn on_pubcomp(&mut self, packet_id: u16) -> AckOutcome {
        match self.take(packet_id, Stage::AwaitingPubcomp) {
            true => AckOutcome::Completed,
            false => AckOutcome::Unknown,
        }
    }

    pub fn on_suback(&mut self, packet_id: u16) -> AckOutcome {
        match self.take(packet_id, Stage::AwaitingSuback) {
            true => AckOutcome::Completed,
            false => AckOutcome::Unknown,
        }
    }

    pub fn on_inbound_publish(&mut self, qos: Qos, packet_id: u16) -> InboundVerdict {
        match qos {
            Qos::AtMostOnce => InboundVerdict::Deliver(None),
            Qos::AtLeastOnce => InboundVerdict::Deliver(Some(Reply::Puback(packet_id))),
            Qos::ExactlyOnce => {
                if self.unreleased.contains(&packet_id) {
                    return InboundVerdict::Duplicate(Reply::Pubrec(packet_id));
                }
                match self.unreleased.push(packet_id) {
                    Ok(()) => InboundVerdict::Deliver(Some(Reply::Pubrec(packet_id))),
                    Err(_) => InboundVerdict::Overflow,
                }
            }
        }
    }

    /// PUBREL always gets a PUBCOMP, even for an identifier already released.
    pub fn on_pubrel(&mut self, packet_id: u16) -> Reply {
        self.unreleased.retain(|id| *id != packet_id);
        Reply::Pubcomp(packet_id)
    }

    fn begin(&mut self, stage: Stage) -> Result<u16, TrackerFull> {
        if self.outgoing.is_full() {
            return Err(TrackerFull);
        }
        let packet_id = self.next_free_id();
        self.outgoing
            .push(Exchange { packet_id, stage })
            .map_err(|_| TrackerFull)?;
        Ok(packet_id)
    }

    // Identifiers are non-zero and never shared by two live exchanges.
    fn next_free_id(&mut self) -> u16 {
        loop {
            self.last_id = self.last_id.wrapping_add(1);
            if self.last_id == 0 {
                continue;
            }
            let candidate = self.last_id;
            if !self
                .outgoing
                .iter()
                .any(|exchange| exchange.packet_id == candidate)
            {
                return candidate;
            }
        }
    }

    fn take(&mut self, packet_id: u16, stage: Stage) -> bool {
        let Some(index) = self
            .outgoing
            .iter()
            .position(|exchange| exchange.packet_id == packet_id && exchange.stage == stage)
        else {
            return false;
        };
        self.outgoing.swap_remove(index);
        true
    }
}
