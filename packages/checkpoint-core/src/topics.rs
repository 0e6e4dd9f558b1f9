use core::fmt::Write as _;

use heapless::String;

use crate::config::TOPIC_MAX;

pub const SHIFT_STATUS: &str = "sentry-platform/backend-server/shift-status";
pub const OVERDUE_SCAN: &str = "sentry-platform/circuit-handler/overdue-scan";
pub const ALARM: &str = "sentry-platform/backend-server/alarm";
pub const SENTRY_SCAN_INFO: &str = "sentry-platform/checkpoints/sentry-scan-info";
pub const OUTSIDE_SHIFT_SCAN: &str = "sentry-platform/checkpoints/outside-shift-scan";
pub const CONNECTED: &str = "sentry-platform/checkpoints/connected";

const RESPONSE_PREFIX: &str = "sentry-platform/checkpoints/";
const RESPONSE_SUFFIX: &str = "/response";

pub type TopicBuf = String<TOPIC_MAX>;

/// Subscribed topics, as routed by [`classify`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum InboundTopic {
    ShiftStatus,
    OverdueScan,
    Response,
    Alarm,
}

pub fn response_topic(checkpoint_id: &str) -> Result<TopicBuf, &'static str> {
    let mut topic = TopicBuf::new();
    write!(topic, "{RESPONSE_PREFIX}{checkpoint_id}{RESPONSE_SUFFIX}")
        .map_err(|_| "response topic too long")?;
    Ok(topic)
}

/// Topics subscribed after every session connect, in subscription order.
pub fn subscriptions(response: &str) -> [&str; 4] {
    [SHIFT_STATUS, response, ALARM, OVERDUE_SCAN]
}

pub fn classify(topic: &str, checkpoint_id: &str) -> Option<InboundTopic> {
    match topic {
        SHIFT_STATUS => Some(InboundTopic::ShiftStatus),
        OVERDUE_SCAN => Some(InboundTopic::OverdueScan),
        ALARM => Some(InboundTopic::Alarm),
        _ => {
            let id = topic
                .strip_prefix(RESPONSE_PREFIX)?
                .strip_suffix(RESPONSE_SUFFIX)?;
            (id == checkpoint_id).then_some(InboundTopic::Response)
        }
    }
}
