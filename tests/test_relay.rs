//! End-to-end relay tests over loopback TCP

use remote_gamer::{
    Capture, Converter, Link, Listener, MockControllerSink, RawEvent, ScriptedSource, Side,
    Station, VirtualAction, VirtualButton,
};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

fn init_logger() {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(log::LevelFilter::Debug)
        .try_init();
}

struct RunningStation {
    addr: String,
    sink: MockControllerSink,
    cancel: CancellationToken,
    task: JoinHandle<Station<MockControllerSink>>,
}

async fn start_station() -> RunningStation {
    let listener = Listener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    let sink = MockControllerSink::new();
    let cancel = CancellationToken::new();

    let mut station = Station::new(Converter::new(sink.clone()), cancel.clone());
    let task = tokio::spawn(async move {
        station.serve(&listener).await.unwrap();
        station
    });

    RunningStation { addr, sink, cancel, task }
}

impl RunningStation {
    async fn dial(&self) -> Link {
        Link::dial(&self.addr, Duration::from_secs(5)).await.unwrap()
    }

    async fn wait_for_actions(&self, count: usize) -> Vec<VirtualAction> {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let actions = self.sink.actions();
                if actions.len() >= count {
                    return actions;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("timed out waiting for virtual pad actions")
    }

    async fn shutdown(self) -> Station<MockControllerSink> {
        self.cancel.cancel();
        tokio::time::timeout(Duration::from_secs(1), self.task)
            .await
            .expect("station should stop promptly")
            .unwrap()
    }
}

#[tokio::test]
async fn captured_events_drive_the_virtual_pad() {
    init_logger();
    let station = start_station().await;

    let link = station.dial().await;
    let source = ScriptedSource::new(vec![
        vec![
            RawEvent::key("BTN_SOUTH", 1),
            RawEvent::sync(),
            RawEvent::key("BTN_SOUTH", 0),
        ],
        vec![RawEvent::absolute("ABS_Z", 128)],
    ]);
    let forwarded = Capture::new(source, CancellationToken::new())
        .run(link)
        .await
        .unwrap();
    assert_eq!(forwarded, 3);

    let actions = station.wait_for_actions(3).await;
    assert_eq!(
        actions,
        vec![
            VirtualAction::PressButton(VirtualButton::A),
            VirtualAction::ReleaseButton(VirtualButton::A),
            VirtualAction::SetTrigger { side: Side::Left, value: 128 },
        ]
    );

    let station = station.shutdown().await;
    assert_eq!(station.received(), 3);
}

#[tokio::test]
async fn axis_state_survives_a_reconnect() {
    init_logger();
    let station = start_station().await;

    let mut first = station.dial().await;
    first.send(&RawEvent::absolute("ABS_X", 100)).await.unwrap();
    station.wait_for_actions(1).await;
    drop(first);

    let mut second = station.dial().await;
    second.send(&RawEvent::absolute("ABS_Y", 50)).await.unwrap();

    assert_eq!(
        station.wait_for_actions(2).await,
        vec![
            VirtualAction::SetJoystick { stick: Side::Left, x: 100, y: 0 },
            VirtualAction::SetJoystick { stick: Side::Left, x: 100, y: 50 },
        ]
    );

    let station = station.shutdown().await;
    assert_eq!(station.converter().axis_state().get("ABS_X"), 100);
}

#[tokio::test]
async fn newer_controller_takes_over() {
    init_logger();
    let station = start_station().await;

    let mut first = station.dial().await;
    first.send(&RawEvent::key("BTN_EAST", 1)).await.unwrap();
    station.wait_for_actions(1).await;

    let mut second = station.dial().await;
    let closed = tokio::time::timeout(Duration::from_secs(5), first.recv())
        .await
        .expect("replaced controller should be disconnected");
    assert!(!matches!(closed, Ok(Some(_))));

    second.send(&RawEvent::key("BTN_EAST", 0)).await.unwrap();
    assert_eq!(
        station.wait_for_actions(2).await,
        vec![
            VirtualAction::PressButton(VirtualButton::B),
            VirtualAction::ReleaseButton(VirtualButton::B),
        ]
    );

    station.shutdown().await;
}

#[tokio::test]
async fn restarted_controller_is_not_locked_out_by_a_silent_link() {
    init_logger();
    let station = start_station().await;

    // connected but never sends or closes, like a host that lost power
    let _stale = station.dial().await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    let mut restarted = station.dial().await;
    restarted.send(&RawEvent::key("BTN_SOUTH", 1)).await.unwrap();
    assert_eq!(
        station.wait_for_actions(1).await,
        vec![VirtualAction::PressButton(VirtualButton::A)]
    );

    station.shutdown().await;
}

#[tokio::test]
async fn malformed_frame_ends_only_that_link() {
    init_logger();
    let station = start_station().await;

    let mut raw = tokio::net::TcpStream::connect(&station.addr).await.unwrap();
    let body = b"not json";
    raw.write_all(&(body.len() as u32).to_be_bytes()).await.unwrap();
    raw.write_all(body).await.unwrap();
    raw.flush().await.unwrap();

    // the station hangs up on the broken link
    let mut buf = [0u8; 16];
    let read = tokio::time::timeout(Duration::from_secs(5), raw.read(&mut buf))
        .await
        .expect("station should close the broken link");
    assert!(matches!(read, Ok(0) | Err(_)));

    let mut link = station.dial().await;
    link.send(&RawEvent::key("BTN_START", 1)).await.unwrap();

    assert_eq!(
        station.wait_for_actions(1).await,
        vec![VirtualAction::PressButton(VirtualButton::Start)]
    );
    station.shutdown().await;
}

#[tokio::test]
async fn guide_chord_never_reaches_the_pad() {
    init_logger();
    let station = start_station().await;

    let link = station.dial().await;
    let source = ScriptedSource::single_batch(vec![
        RawEvent::absolute("ABS_Y", -1),
        RawEvent::absolute("ABS_RX", 0),
        RawEvent::key("BTN_NORTH", 1),
    ]);
    Capture::new(source, CancellationToken::new())
        .run(link)
        .await
        .unwrap();

    assert_eq!(
        station.wait_for_actions(1).await,
        vec![VirtualAction::PressButton(VirtualButton::Y)]
    );

    let station = station.shutdown().await;
    assert_eq!(station.received(), 3);
    assert!(station.converter().axis_state().is_empty());
}
