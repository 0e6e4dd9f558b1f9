// Timing policy for the checkpoint. All periods are milliseconds of monotonic
// uptime unless the name says otherwise.

/// Half-period of the alarm indicator square wave.
pub const ALARM_TOGGLE_PERIOD_MS: u32 = 500;
/// Fixed cadence of session reconnect attempts while the link is up.
pub const SESSION_RETRY_PERIOD_MS: u32 = 2_000;
/// A connect request with no reported outcome is re-issued after this long.
pub const SESSION_CONNECT_DEADLINE_MS: u32 = 30_000;
/// Link may stay down this long after a loss before the device restarts.
pub const LINK_RECONNECT_TIMEOUT_MS: u32 = 120_000;
/// Reconfiguration portal stays open this long waiting for the operator.
pub const PORTAL_TIMEOUT_MS: u32 = 120_000;
/// Budget for joining the network once the form has been submitted.
pub const PORTAL_JOIN_TIMEOUT_MS: u32 = 20_000;
/// Restart message stays on screen this long before the reset.
pub const RESTART_SETTLE_MS: u32 = 3_000;

/// Added to every RTC reading before it is published as `scan-time`.
///
/// The deployed backend expects this offset; its origin is undocumented.
pub const SCAN_TIME_SKEW_SECS: u32 = 46;

pub const SESSION_KEEP_ALIVE_SECS: u16 = 60;
pub const BROKER_PORT: u16 = 1883;

// Operator form field limits, in bytes.
pub const BROKER_DOMAIN_MAX: usize = 30;
pub const BROKER_IP_MAX: usize = 15;
pub const BROKER_USERNAME_MAX: usize = 20;
pub const BROKER_PASSWORD_MAX: usize = 20;
pub const WIFI_SSID_MAX: usize = 32;
pub const WIFI_PASSWORD_MAX: usize = 64;

pub const CHECKPOINT_ID_MAX: usize = 16;
pub const CLIENT_ID_MAX: usize = 32;
/// Longest card UID the reader reports (triple-size ISO 14443 UID).
pub const CARD_UID_MAX: usize = 10;
/// `CARD_UID_MAX` bytes rendered as `"xx xx .."`.
pub const CARD_ID_TEXT_MAX: usize = CARD_UID_MAX * 3;
pub const TOPIC_MAX: usize = 64;
pub const PAYLOAD_MAX: usize = 128;

pub const DEFAULT_CHECKPOINT_ID: &str = "A";

/// Identity of this checkpoint inside the backend topic namespace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckpointIdentity {
    checkpoint_id: heapless::String<CHECKPOINT_ID_MAX>,
    client_id: heapless::String<CLIENT_ID_MAX>,
}

impl CheckpointIdentity {
    /// Builds the identity, deriving `checkpoint-{id}` when no client id is
    /// given. Over-long values are rejected.
    pub fn new(checkpoint_id: &str, client_id: Option<&str>) -> Result<Self, &'static str> {
        if checkpoint_id.is_empty() {
            return Err("checkpoint id empty");
        }
        let mut id = heapless::String::new();
        id.push_str(checkpoint_id)
            .map_err(|_| "checkpoint id too long")?;

        let mut client = heapless::String::new();
        match client_id {
            Some(value) if !value.is_empty() => client
                .push_str(value)
                .map_err(|_| "client id too long")?,
            _ => {
                use core::fmt::Write;
                write!(client, "checkpoint-{}", checkpoint_id).map_err(|_| "client id too long")?;
            }
        }

        Ok(Self {
            checkpoint_id: id,
            client_id: client,
        })
    }

    pub fn checkpoint_id(&self) -> &str {
        &self.checkpoint_id
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }
}

impl Default for CheckpointIdentity {
    fn default() -> Self {
        let mut checkpoint_id = heapless::String::new();
        let _ = checkpoint_id.push_str(DEFAULT_CHECKPOINT_ID);
        let mut client_id = heapless::String::new();
        let _ = client_id.push_str("checkpoint-A");
        Self {
            checkpoint_id,
            client_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_id_derived_from_checkpoint_id() {
        let identity = CheckpointIdentity::new("B", None).unwrap();
        assert_eq!(identity.checkpoint_id(), "B");
        assert_eq!(identity.client_id(), "checkpoint-B");
    }

    #[test]
    fn explicit_client_id_wins() {
        let identity = CheckpointIdentity::new("A", Some("gate-north")).unwrap();
        assert_eq!(identity.client_id(), "gate-north");
    }

    #[test]
    fn empty_checkpoint_id_rejected() {
        assert!(CheckpointIdentity::new("", None).is_err());
    }

    #[test]
    fn default_matches_checkpoint_a() {
        let identity = CheckpointIdentity::default();
        assert_eq!(identity, CheckpointIdentity::new("A", None).unwrap());
    }

    #[test]
    fn scan_skew_is_preserved() {
        // Unexplained offset carried over from the deployed firmware.
        assert_eq!(SCAN_TIME_SKEW_SECS, 46);
    }
}
