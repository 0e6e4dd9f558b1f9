/// Control packet type, from the high nibble of the fixed header.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PacketKind {
    Connack,
    Publish,
    Puback,
    Pubrec,
    Pubrel,
    Pubcomp,
    Suback,
    Unsuback,
    Pingresp,
    Disconnect,
    Auth,
    /// Anything a broker must not send to a client.
    Unexpected(u8),
}

impl PacketKind {
    pub const fn from_header(header: u8) -> Self {
        match header >> 4 {
            2 => Self::Connack,
            3 => Self::Publish,
            4 => Self::Puback,
            5 => Self::Pubrec,
            6 => Self::Pubrel,
            7 => Self::Pubcomp,
            9 => Self::Suback,
            11 => Self::Unsuback,
            13 => Self::Pingresp,
            14 => Self::Disconnect,
            15 => Self::Auth,
            other => Self::Unexpected(other),
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Connack => "connack",
            Self::Publish => "publish",
            Self::Puback => "puback",
            Self::Pubrec => "pubrec",
            Self::Pubrel => "pubrel",
            Self::Pubcomp => "pubcomp",
            Self::Suback => "suback",
            Self::Unsuback => "unsuback",
            Self::Pingresp => "pingresp",
            Self::Disconnect => "disconnect",
            Self::Auth => "auth",
            Self::Unexpected(_) => "unexpected",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FrameStatus {
    /// More bytes are needed before the front packet is whole.
    Incomplete,
    /// The first `len` buffered bytes are one complete packet.
    Ready(usize),
    Malformed,
    /// The front packet needs `len` bytes and can never fit.
    TooLarge(usize),
}

/// Accumulates socket reads until whole packets are available.
///
/// Bytes only enter through [`FrameBuffer::advance`] after a read has
/// completed, so abandoning a pending read never loses part of a packet.
pub struct FrameBuffer<const N: usize> {
    bytes: [u8; N],
    filled: usize,
}

impl<const N: usize> Default for FrameBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> FrameBuffer<N> {
    pub const fn new() -> Self {
        Self {
            bytes: [0; N],
            filled: 0,
        }
    }

    pub fn clear(&mut self) {
        self.filled = 0;
    }

    pub fn buffered(&self) -> usize {
        self.filled
    }

    pub fn unfilled(&mut self) -> &mut [u8] {
        &mut self.bytes[self.filled..]
    }

    pub fn advance(&mut self, read: usize) {
        self.filled = (self.filled + read).min(N);
    }

    pub fn status(&self) -> FrameStatus {
        if self.filled == 0 {
            return FrameStatus::Incomplete;
        }
        match remaining_length(&self.bytes[1..self.filled]) {
            Length::Incomplete => FrameStatus::Incomplete,
            Length::Malformed => FrameStatus::Malformed,
            Length::Known { value, encoded } => {
                let total = 1 + encoded + value as usize;
                if total > N {
                    FrameStatus::TooLarge(total)
                } else if self.filled >= total {
                    FrameStatus::Ready(total)
                } else {
                    FrameStatus::Incomplete
                }
            }
        }
    }

    /// The front `len` bytes, as reported by [`FrameStatus::Ready`].
    pub fn frame(&self, len: usize) -> &[u8] {
        &self.bytes[..len.min(self.filled)]
    }

    /// Drops the front packet and shifts whatever followed it to the start.
    pub fn consume(&mut self, len: usize) {
        let len = len.min(self.filled);
        self.bytes.copy_within(len..self.filled, 0);
        self.filled -= len;
    }
}

enum Length {
    Incomplete,
    Malformed,
    Known { value: u32, encoded: usize },
}

// Variable byte integer: seven bits per byte, at most four bytes.
fn remaining_length(bytes: &[u8]) -> Length {
    let mut value: u32 = 0;
    for (index, byte) in bytes.iter().take(4).enumerate() {
        value |= u32::from(byte & 0x7F) << (7 * index);
        if byte & 0x80 == 0 {
            return Length::Known {
                value,
                encoded: index + 1,
            };
        }
    }
    if bytes.len() >= 4 {
        Length::Malformed
    } else {
        Length::Incomplete
    }
}

/// PUBACK, PUBREC, PUBREL or PUBCOMP.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Ack {
    pub kind: PacketKind,
    pub packet_id: u16,
    /// Zero when the broker used the short form without a reason code.
    pub reason: u8,
}

impl Ack {
    pub const fn is_failure(&self) -> bool {
        self.reason >= 0x80
    }
}

/// Reads an acknowledgement packet from one whole frame.
pub fn parse_ack(frame: &[u8]) -> Option<Ack> {
    let (&header, rest) = frame.split_first()?;
    let kind = PacketKind::from_header(header);
    if !matches!(
        kind,
        PacketKind::Puback | PacketKind::Pubrec | PacketKind::Pubrel | PacketKind::Pubcomp
    ) {
        return None;
    }
    let Length::Known { value, encoded } = remaining_length(rest) else {
        return None;
    };
    let body = rest.get(encoded..encoded + value as usize)?;
    let packet_id = match body {
        [high, low, ..] => u16::from_be_bytes([*high, *low]),
        _ => return None,
    };
    if packet_id == 0 {
        return None;
    }
    Some(Ack {
        kind,
        packet_id,
        reason: body.get(2).copied().unwrap_or(0),
    })
}
