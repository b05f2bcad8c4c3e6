//! Controller link integration tests.
//!
//! Runs `CommLink` with real pump threads against the simulated controller:
//! request/response round trips, fault recovery, drops on a full inbound
//! queue, and pump shutdown when the controller hangs up.

use std::thread;
use std::time::{Duration, Instant};
use vcu_comm::{CommError, CommLink};
use vcu_common::config::LinkConfig;
use vcu_common::consts::LINK_QUEUE_CAPACITY;
use vcu_common::frame::{RequestFrame, ResponseFrame};
use vcu_hal::drivers::simulation::SimulatedSerial;

const REPLY_TIMEOUT: Duration = Duration::from_secs(2);

/// Poll `cond` until it holds or two seconds pass.
fn wait_until(mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    cond()
}

#[test]
fn test_requests_arrive_in_order_and_responses_go_out() {
    let (serial, controller) = SimulatedSerial::pair();
    let (link, _pumps) = CommLink::start(serial, &LinkConfig::default()).expect("start link");

    for seq in 0..5u8 {
        controller.send_frame(&RequestFrame::new([seq, 0x10, 0x20])).unwrap();
    }
    for seq in 0..5u8 {
        assert_eq!(link.get_next_request(), RequestFrame::new([seq, 0x10, 0x20]));
    }

    link.send_response(ResponseFrame::new([0xAA, 0xBB, 0xCC])).unwrap();
    let reply: Option<ResponseFrame> = controller.recv_frame(REPLY_TIMEOUT);
    assert_eq!(reply, Some(ResponseFrame::new([0xAA, 0xBB, 0xCC])));

    assert!(wait_until(|| link.stats().frames_sent == 1));
    assert_eq!(link.stats().frames_received, 5);
}

#[test]
fn test_byte_stream_is_framed_at_request_width() {
    let (serial, controller) = SimulatedSerial::pair();
    let (link, _pumps) = CommLink::start(serial, &LinkConfig::default()).expect("start link");

    // Two frames delivered as one burst, then a split frame.
    controller.send(&[1, 2, 3, 4, 5, 6]).unwrap();
    controller.send(&[7]).unwrap();
    controller.send(&[8, 9]).unwrap();

    assert_eq!(link.get_next_request(), RequestFrame::new([1, 2, 3]));
    assert_eq!(link.get_next_request(), RequestFrame::new([4, 5, 6]));
    assert_eq!(link.get_next_request(), RequestFrame::new([7, 8, 9]));
}

#[test]
fn test_receive_fault_is_counted_and_pump_keeps_running() {
    let (serial, controller) = SimulatedSerial::pair();
    let (link, _pumps) = CommLink::start(serial, &LinkConfig::default()).expect("start link");

    controller.inject_receive_fault();
    controller.send_frame(&RequestFrame::new([9, 9, 9])).unwrap();

    assert_eq!(link.get_next_request(), RequestFrame::new([9, 9, 9]));
    assert_eq!(link.stats().rx_errors, 1);
}

#[test]
fn test_transmit_fault_loses_one_response() {
    let (serial, controller) = SimulatedSerial::pair();
    let (link, _pumps) = CommLink::start(serial, &LinkConfig::default()).expect("start link");

    controller.inject_transmit_fault();
    link.send_response(ResponseFrame::new([1, 1, 1])).unwrap();
    link.send_response(ResponseFrame::new([2, 2, 2])).unwrap();

    let reply: Option<ResponseFrame> = controller.recv_frame(REPLY_TIMEOUT);
    assert_eq!(reply, Some(ResponseFrame::new([2, 2, 2])));
    assert!(wait_until(|| link.stats().tx_errors == 1));
}

#[test]
fn test_full_inbound_queue_drops_excess_requests() {
    let (serial, controller) = SimulatedSerial::pair();
    let config = LinkConfig { send_timeout_ms: 10 };
    let (link, _pumps) = CommLink::start(serial, &config).expect("start link");

    let total = LINK_QUEUE_CAPACITY + 3;
    for seq in 0..total {
        controller.send_frame(&RequestFrame::new([seq as u8, 0, 0])).unwrap();
    }

    assert!(wait_until(|| controller.unread_by_vcu() == 0
        && link.stats().frames_received == total as u64));
    assert!(wait_until(|| link.stats().requests_dropped == 3));
    assert_eq!(link.pending_request_count(), LINK_QUEUE_CAPACITY);

    // The oldest frames were kept.
    for seq in 0..LINK_QUEUE_CAPACITY {
        assert_eq!(link.get_next_request(), RequestFrame::new([seq as u8, 0, 0]));
    }
    assert!(link.try_next_request().is_none());
}

#[test]
fn test_send_response_reports_full_outbound_queue() {
    // No pumps: nothing drains the outbound queue.
    let link = CommLink::new(&LinkConfig { send_timeout_ms: 1 });
    for _ in 0..LINK_QUEUE_CAPACITY {
        link.send_response(ResponseFrame::zeroed()).unwrap();
    }
    assert!(matches!(
        link.send_response(ResponseFrame::zeroed()),
        Err(CommError::ResponseQueueFull(_))
    ));
}

#[test]
fn test_hang_up_stops_receive_pump() {
    let (serial, controller) = SimulatedSerial::pair();
    let (link, pumps) = CommLink::start(serial, &LinkConfig::default()).expect("start link");

    controller.send_frame(&RequestFrame::new([5, 5, 5])).unwrap();
    drop(controller);

    // Buffered frame still delivered before the pump stops.
    assert_eq!(link.get_next_request(), RequestFrame::new([5, 5, 5]));
    assert!(wait_until(|| pumps.receive.is_finished()));

    // The transmit pump stops on its next write.
    link.send_response(ResponseFrame::zeroed()).unwrap();
    assert!(wait_until(|| pumps.is_finished()));
    assert_eq!(link.stats().frames_sent, 0);
}
