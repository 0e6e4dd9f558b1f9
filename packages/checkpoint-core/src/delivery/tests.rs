use super::*;
use crate::types::Qos;

// PUBLISH, QoS 2, topic "alarm", id 7, no properties, payload "ON".
const ALARM_ON_QOS2: [u8; 14] = [
    0x34, 12, 0x00, 0x05, b'a', b'l', b'a', b'r', b'm', 0x00, 0x07, 0x00, b'O', b'N',
];
// PUBREC for id 3 in the short form.
const PUBREC_SHORT: [u8; 4] = [0x50, 0x02, 0x00, 0x03];

fn feed<const N: usize>(buffer: &mut FrameBuffer<N>, bytes: &[u8]) {
    let unfilled = buffer.unfilled();
    unfilled[..bytes.len()].copy_from_slice(bytes);
    buffer.advance(bytes.len());
}

#[test]
fn packet_split_across_reads_waits_for_the_rest() {
    let mut buffer = FrameBuffer::<64>::new();
    feed(&mut buffer, &ALARM_ON_QOS2[..5]);
    assert_eq!(buffer.status(), FrameStatus::Incomplete);
    feed(&mut buffer, &ALARM_ON_QOS2[5..]);
    assert_eq!(buffer.status(), FrameStatus::Ready(ALARM_ON_QOS2.len()));
    assert_eq!(buffer.frame(ALARM_ON_QOS2.len()), &ALARM_ON_QOS2);
}

#[test]
fn packets_sharing_one_read_come_out_in_order() {
    let mut buffer = FrameBuffer::<64>::new();
    let mut read = [0u8; 18];
    read[..14].copy_from_slice(&ALARM_ON_QOS2);
    read[14..].copy_from_slice(&PUBREC_SHORT);
    feed(&mut buffer, &read);

    let FrameStatus::Ready(first) = buffer.status() else {
        panic!("publish not framed");
    };
    assert_eq!(PacketKind::from_header(buffer.frame(first)[0]), PacketKind::Publish);
    buffer.consume(first);

    let FrameStatus::Ready(second) = buffer.status() else {
        panic!("pubrec not framed");
    };
    let ack = parse_ack(buffer.frame(second)).expect("ack");
    assert_eq!(ack.kind, PacketKind::Pubrec);
    assert_eq!(ack.packet_id, 3);
    assert_eq!(ack.reason, 0);
    buffer.consume(second);
    assert_eq!(buffer.buffered(), 0);
    assert_eq!(buffer.status(), FrameStatus::Incomplete);
}

#[test]
fn remaining_length_edge_cases() {
    let mut buffer = FrameBuffer::<64>::new();
    feed(&mut buffer, &[0x30, 0x80]);
    assert_eq!(buffer.status(), FrameStatus::Incomplete);
    feed(&mut buffer, &[0x01]);
    assert_eq!(buffer.status(), FrameStatus::TooLarge(131));

    let mut buffer = FrameBuffer::<64>::new();
    feed(&mut buffer, &[0x30, 0xFF, 0xFF, 0xFF, 0xFF]);
    assert_eq!(buffer.status(), FrameStatus::Malformed);

    let mut buffer = FrameBuffer::<64>::new();
    feed(&mut buffer, &[0xD0, 0x00]);
    assert_eq!(buffer.status(), FrameStatus::Ready(2));
    assert_eq!(PacketKind::from_header(0xD0), PacketKind::Pingresp);
}

#[test]
fn acks_accept_long_form_and_reject_other_packets() {
    let ack = parse_ack(&[0x70, 0x04, 0x00, 0x03, 0x00, 0x00]).expect("pubcomp");
    assert_eq!(ack.kind, PacketKind::Pubcomp);
    assert_eq!(ack.packet_id, 3);

    let refused = parse_ack(&[0x50, 0x03, 0x00, 0x09, 0x87]).expect("pubrec");
    assert!(refused.is_failure());

    assert_eq!(parse_ack(&ALARM_ON_QOS2), None);
    assert_eq!(parse_ack(&[0x40, 0x02, 0x00, 0x00]), None);
    assert_eq!(parse_ack(&[0x40, 0x02, 0x00]), None);
}

#[test]
fn publish_header_carries_qos() {
    assert_eq!(publish_qos(0x30), Some(Qos::AtMostOnce));
    assert_eq!(publish_qos(0x32), Some(Qos::AtLeastOnce));
    assert_eq!(publish_qos(0x35), Some(Qos::ExactlyOnce));
    assert_eq!(publish_qos(0x36), None);
}

#[test]
fn exactly_once_publish_completes_four_way_handshake() {
    let mut tracker = DeliveryTracker::<4>::new();
    let id = tracker
        .begin_publish(Qos::ExactlyOnce)
        .expect("slot")
        .expect("qos 2 needs an id");

    assert_eq!(tracker.on_puback(id), AckOutcome::Unknown);
    assert_eq!(tracker.on_pubcomp(id), AckOutcome::Unknown);
    assert_eq!(tracker.on_pubrec(id, 0), AckOutcome::Reply(Reply::Pubrel(id)));
    // Broker retransmitted PUBREC before seeing our PUBREL.
    assert_eq!(tracker.on_pubrec(id, 0), AckOutcome::Reply(Reply::Pubrel(id)));
    assert_eq!(tracker.in_flight(), 1);
    assert_eq!(tracker.on_pubcomp(id), AckOutcome::Completed);
    assert_eq!(tracker.in_flight(), 0);
}

#[test]
fn refused_exactly_once_publish_frees_its_slot() {
    let mut tracker = DeliveryTracker::<4>::new();
    let id = tracker.begin_publish(Qos::ExactlyOnce).unwrap().unwrap();
    assert_eq!(tracker.on_pubrec(id, 0x87), AckOutcome::Rejected(0x87));
    assert_eq!(tracker.in_flight(), 0);
}

#[test]
fn inbound_message_is_delivered_while_outgoing_ack_is_pending() {
    let mut tracker = DeliveryTracker::<4>::new();
    let outgoing = tracker.begin_publish(Qos::AtLeastOnce).unwrap().unwrap();

    assert_eq!(
        tracker.on_inbound_publish(Qos::AtLeastOnce, 42),
        InboundVerdict::Deliver(Some(Reply::Puback(42)))
    );
    assert_eq!(
        tracker.on_inbound_publish(Qos::AtMostOnce, 0),
        InboundVerdict::Deliver(None)
    );
    assert_eq!(tracker.in_flight(), 1);
    assert_eq!(tracker.on_puback(outgoing), AckOutcome::Completed);
}

#[test]
fn exactly_once_inbound_is_delivered_once_until_released() {
    let mut tracker = DeliveryTracker::<4>::new();
    assert_eq!(
        tracker.on_inbound_publish(Qos::ExactlyOnce, 9),
        InboundVerdict::Deliver(Some(Reply::Pubrec(9)))
    );
    assert_eq!(
        tracker.on_inbound_publish(Qos::ExactlyOnce, 9),
        InboundVerdict::Duplicate(Reply::Pubrec(9))
    );
    assert_eq!(tracker.on_pubrel(9), Reply::Pubcomp(9));
    assert_eq!(tracker.on_pubrel(9), Reply::Pubcomp(9));
    // Released ids may be reused by the broker for a new message.
    assert_eq!(
        tracker.on_inbound_publish(Qos::ExactlyOnce, 9),
        InboundVerdict::Deliver(Some(Reply::Pubrec(9)))
    );
}

#[test]
fn unreleased_inbound_beyond_capacity_overflows() {
    let mut tracker = DeliveryTracker::<2>::new();
    tracker.on_inbound_publish(Qos::ExactlyOnce, 1);
    tracker.on_inbound_publish(Qos::ExactlyOnce, 2);
    assert_eq!(
        tracker.on_inbound_publish(Qos::ExactlyOnce, 3),
        InboundVerdict::Overflow
    );
}

#[test]
fn full_tracker_refuses_acknowledged_work_only() {
    let mut tracker = DeliveryTracker::<2>::new();
    let first = tracker.begin_publish(Qos::AtLeastOnce).unwrap().unwrap();
    let second = tracker.begin_subscribe().unwrap();
    assert_ne!(first, second);
    assert!(tracker.is_full());
    assert_eq!(tracker.begin_publish(Qos::ExactlyOnce), Err(TrackerFull));
    assert_eq!(tracker.begin_publish(Qos::AtMostOnce), Ok(None));

    assert_eq!(tracker.on_puback(second), AckOutcome::Unknown);
    assert_eq!(tracker.on_suback(second), AckOutcome::Completed);
    let third = tracker.begin_publish(Qos::AtLeastOnce).unwrap().unwrap();
    assert_ne!(third, first);

    tracker.clear();
    assert_eq!(tracker.in_flight(), 0);
}

#[test]
fn ping_waits_for_send_silence_not_inbound_traffic() {
    let mut keep_alive = KeepAlive::new(30_000, 0);
    assert_eq!(keep_alive.poll(10_000), KeepAliveStep::Wait(20_000));
    assert_eq!(keep_alive.poll(30_000), KeepAliveStep::SendPing);

    keep_alive.on_sent(20_000);
    assert_eq!(keep_alive.poll(30_000), KeepAliveStep::Wait(20_000));

    keep_alive.on_ping_sent(50_000);
    assert!(keep_alive.awaiting_pingresp());
    assert_eq!(keep_alive.poll(65_000), KeepAliveStep::Wait(15_000));
    keep_alive.on_pingresp();
    assert_eq!(keep_alive.poll(65_000), KeepAliveStep::Wait(15_000));
    assert_eq!(keep_alive.poll(80_000), KeepAliveStep::SendPing);
}

#[test]
fn unanswered_ping_times_out() {
    let mut keep_alive = KeepAlive::new(30_000, 0);
    keep_alive.on_ping_sent(30_000);
    keep_alive.on_sent(40_000);
    assert_eq!(keep_alive.poll(59_999), KeepAliveStep::Wait(1));
    assert_eq!(keep_alive.poll(60_000), KeepAliveStep::TimedOut);
}

#[test]
fn keep_alive_survives_clock_wrap() {
    let keep_alive = KeepAlive::new(30_000, u32::MAX - 5_000);
    assert_eq!(keep_alive.poll(24_998), KeepAliveStep::Wait(1));
    assert_eq!(keep_alive.poll(24_999), KeepAliveStep::SendPing);
}
