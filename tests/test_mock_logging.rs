//! Test to verify the mock sink logs and records what it is asked to do

use remote_gamer::backend::{get_mock_controller_sink, SinkCall};
use remote_gamer::{ControllerSink, Converter, RawEvent, Side, VirtualAction, VirtualButton};

fn init_logger() {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(log::LevelFilter::Info)
        .try_init();
}

#[test]
fn test_mock_sink_logs_every_call() {
    init_logger();

    let mut sink = get_mock_controller_sink();

    // These should log at info level (visible with RUST_LOG=info)
    assert!(sink.press_button(VirtualButton::LeftShoulder).is_ok());
    assert!(sink.set_right_stick(-200, 3000).is_ok());
    assert!(sink.set_right_trigger(255).is_ok());
    assert!(sink.flush().is_ok());

    assert_eq!(
        sink.calls(),
        vec![
            SinkCall::Action(VirtualAction::PressButton(VirtualButton::LeftShoulder)),
            SinkCall::Action(VirtualAction::SetJoystick { stick: Side::Right, x: -200, y: 3000 }),
            SinkCall::Action(VirtualAction::SetTrigger { side: Side::Right, value: 255 }),
            SinkCall::Flush,
        ]
    );
}

#[test]
fn test_converter_flushes_after_each_event() {
    init_logger();

    let sink = get_mock_controller_sink();
    let mut converter = Converter::new(sink.clone());

    converter.convert(&RawEvent::absolute("ABS_HAT0Y", -1));
    converter.convert(&RawEvent::absolute("ABS_HAT0Y", 0));
    converter.convert(&RawEvent::key("BTN_TRIGGER_HAPPY1", 1));

    assert_eq!(
        sink.calls(),
        vec![
            SinkCall::Action(VirtualAction::PressButton(VirtualButton::DpadUp)),
            SinkCall::Flush,
            SinkCall::Action(VirtualAction::ReleaseButton(VirtualButton::DpadDown)),
            SinkCall::Action(VirtualAction::ReleaseButton(VirtualButton::DpadUp)),
            SinkCall::Flush,
            SinkCall::Flush,
        ]
    );
}
