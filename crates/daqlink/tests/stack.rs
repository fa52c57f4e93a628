//! End-to-end exercises of the full stack: a simulated SPI wire between
//! the blocking master and a board session, with real framing on both
//! sides.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{json, Value};

use daqlink::{
    BoardSession, CmdRegistry, CodecConfig, IrqHandle, JsonDispatcher, MasterConfig, Setting,
    SlaveBus, SpiBus, SpiMaster, TransportError,
};

/// Board transmit queue, shared between the session and the wire.
#[derive(Clone, Default)]
struct TxQueue(Arc<Mutex<VecDeque<u8>>>);

impl SlaveBus for TxQueue {
    fn send_byte(&mut self, byte: u8) -> bool {
        self.0.lock().unwrap().push_back(byte);
        true
    }
}

/// In-memory SPI wire: every master clock feeds the board interrupt path
/// and shifts one queued board byte back.
struct SimBus {
    irq: IrqHandle,
    session: BoardSession<TxQueue>,
    tx: TxQueue,
}

impl SpiBus for SimBus {
    fn set_cs(&mut self, active: bool) {
        if active {
            self.irq.frame_start();
        }
    }

    fn transfer(&mut self, byte: u8) -> u8 {
        self.irq.on_byte(byte);
        self.tx.0.lock().unwrap().pop_front().unwrap_or(0)
    }

    fn wait_done(&mut self) {
        // The line turnaround is where the board main loop gets to run.
        self.session.update().expect("board update");
    }
}

fn harness() -> (SpiMaster<SimBus>, Arc<AtomicI32>) {
    let gain = Arc::new(AtomicI32::new(1));
    let gain_get = Arc::clone(&gain);
    let gain_set = Arc::clone(&gain);

    let mut registry = CmdRegistry::new();
    registry.add("ADC1", Arc::new(Setting::read_only(|| 1.5f32)));
    registry.add(
        "Gain",
        Arc::new(Setting::read_write(
            move || gain_get.load(Ordering::SeqCst),
            move |value| gain_set.store(value, Ordering::SeqCst),
        )),
    );
    registry.add("Record", Arc::new(Setting::write_only(|_value: bool| {})));
    registry.add("js", Arc::new(JsonDispatcher::new()));

    let tx = TxQueue::default();
    let (irq, session) = BoardSession::new(Arc::new(registry), tx.clone(), CodecConfig::default());
    let master = SpiMaster::with_config(
        SimBus { irq, session, tx },
        MasterConfig {
            cs_settle: Duration::ZERO,
            retry_delay: Duration::ZERO,
            ..MasterConfig::default()
        },
    );
    (master, gain)
}

#[test]
fn get_over_the_wire() {
    let (mut master, _) = harness();
    assert_eq!(master.request_get("ADC1").unwrap(), "1.5");
}

#[test]
fn set_round_trip_updates_the_board() {
    let (mut master, gain) = harness();
    assert_eq!(master.request_set("Gain", "3").unwrap(), "3");
    assert_eq!(gain.load(Ordering::SeqCst), 3);
    assert_eq!(master.request_get("Gain").unwrap(), "3");
}

#[test]
fn unknown_command_surfaces_the_wire_reason() {
    let (mut master, _) = harness();
    match master.request_get("Nope") {
        Err(TransportError::Command(reason)) => assert_eq!(reason, "obj_not_found!"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn direction_violation_over_the_wire() {
    let (mut master, _) = harness();
    match master.request_set("ADC1", "2.0") {
        Err(TransportError::Command(reason)) => assert_eq!(reason, "<_not_supported!"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn garbage_request_gets_a_protocol_error_line() {
    let (mut master, _) = harness();
    let response = master.exchange(b"garbage\n").unwrap();
    assert_eq!(response, b"!protocol_error!\n");

    // The parser resets; the link keeps working.
    assert_eq!(master.request_get("ADC1").unwrap(), "1.5");
}

#[test]
fn bulk_set_over_the_wire() {
    let (mut master, gain) = harness();
    let text = master.request_set("js", r#"{"Gain":5}"#).unwrap();
    let response: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(response, json!({"Gain": 5}));
    assert_eq!(gain.load(Ordering::SeqCst), 5);
}

#[test]
fn bulk_dump_over_the_wire() {
    let (mut master, _) = harness();
    let text = master.request_get("js").unwrap();
    let response: Value = serde_json::from_str(&text).unwrap();
    // Write-only points and the busy dispatcher are absent from the dump.
    assert_eq!(response, json!({"ADC1": 1.5, "Gain": 1}));
}

#[test]
fn many_sequential_exchanges_share_one_session() {
    let (mut master, _) = harness();
    for i in 0..50 {
        let value = (i % 7).to_string();
        assert_eq!(master.request_set("Gain", &value).unwrap(), value);
    }
}
