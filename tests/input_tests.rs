//! Integration tests for input synthesis
//!
//! Event ordering for presses, holds, text and scrolling, pointer motion,
//! auto-release timing and sink error propagation, all driven through the
//! recording backend.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use humanized_input::device::{
    DeviceClass, DeviceHandle, DeviceInfo, EventSink, RecordingSink, RecordingSleeper, SinkError,
    SinkEvent, StaticEnumerator,
};
use humanized_input::input::{
    CurveParams, InputError, InputId, InputSynthesizer, MouseButton, NamedKey, Point, ScanCode,
    ScrollDirection, TimingConfig,
};

const KEYBOARD: DeviceHandle = DeviceHandle {
    id: 1,
    class: DeviceClass::Keyboard,
};

const MOUSE: DeviceHandle = DeviceHandle {
    id: 11,
    class: DeviceClass::Mouse,
};

struct Harness {
    synth: Arc<InputSynthesizer>,
    sink: RecordingSink,
    sleeper: RecordingSleeper,
}

fn harness(timing: TimingConfig) -> Harness {
    let sink = RecordingSink::new();
    let sleeper = RecordingSleeper::attached_to(&sink);
    let enumerator = StaticEnumerator::new(vec![
        DeviceInfo::new(KEYBOARD, "HID\\VID_046D&PID_C31C"),
        DeviceInfo::new(MOUSE, "HID\\VID_046D&PID_C077"),
    ]);

    let synth = InputSynthesizer::builder(Arc::new(sink.clone()), Arc::new(enumerator))
        .sleeper(Arc::new(sleeper.clone()))
        .timing(TimingConfig {
            auto_disable_mouse_accel: false,
            ..timing
        })
        .build();
    assert!(synth.capture_input_devices("", "").unwrap().is_success());

    Harness {
        synth: Arc::new(synth),
        sink,
        sleeper,
    }
}

fn exact() -> Harness {
    harness(TimingConfig::exact())
}

fn key(code: u16) -> InputId {
    InputId::Key(ScanCode(code))
}

fn down(device: DeviceHandle, input: InputId) -> SinkEvent {
    SinkEvent::Down { device, input }
}

fn up(device: DeviceHandle, input: InputId) -> SinkEvent {
    SinkEvent::Up { device, input }
}

/// Waits until the condition holds or the deadline passes
fn wait_for(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    condition()
}

// ============================================================================
// Press Tests
// ============================================================================

#[test]
fn test_press_three_times_alternates_down_up() {
    let h = exact();
    let left: InputId = MouseButton::Left.into();

    h.synth.press(left, 3, None, None).unwrap();

    assert_eq!(
        h.sink.events(),
        vec![
            down(MOUSE, left),
            up(MOUSE, left),
            down(MOUSE, left),
            up(MOUSE, left),
            down(MOUSE, left),
            up(MOUSE, left),
        ]
    );
    assert!(!h.synth.is_held(left));
}

#[test]
fn test_press_waits_between_cycles_only() {
    let h = exact();
    let enter: InputId = NamedKey::Enter.into();

    h.synth
        .press(
            enter,
            2,
            Some(Duration::from_millis(10)),
            Some(Duration::from_millis(40)),
        )
        .unwrap();

    let timeline: Vec<SinkEvent> = h.sink.timeline().into_iter().map(|r| r.event).collect();
    assert_eq!(
        timeline,
        vec![
            down(KEYBOARD, enter),
            SinkEvent::Wait {
                duration: Duration::from_millis(10)
            },
            up(KEYBOARD, enter),
            SinkEvent::Wait {
                duration: Duration::from_millis(40)
            },
            down(KEYBOARD, enter),
            SinkEvent::Wait {
                duration: Duration::from_millis(10)
            },
            up(KEYBOARD, enter),
        ]
    );
}

#[test]
fn test_press_waits_are_jittered_within_bounds() {
    let h = harness(TimingConfig {
        rand_factor_bounds: (0.8, 1.2),
        ..TimingConfig::default()
    });

    h.synth
        .press(
            MouseButton::Right.into(),
            20,
            Some(Duration::from_millis(50)),
            Some(Duration::from_millis(100)),
        )
        .unwrap();

    let waits = h.sleeper.waits();
    assert_eq!(waits.len(), 39);
    for (i, wait) in waits.iter().enumerate() {
        let nominal = if i % 2 == 0 { 50 } else { 100 };
        assert!(*wait >= Duration::from_millis(nominal * 8 / 10));
        assert!(*wait <= Duration::from_millis(nominal * 12 / 10));
    }
}

// ============================================================================
// Hold / Release Tests
// ============================================================================

#[test]
fn test_hold_then_release() {
    let h = exact();
    let shift: InputId = NamedKey::Shift.into();

    h.synth.hold(shift, None).unwrap();
    assert!(h.synth.is_held(shift));

    h.synth.release(shift).unwrap();
    assert!(!h.synth.is_held(shift));

    assert_eq!(h.sink.events(), vec![down(KEYBOARD, shift), up(KEYBOARD, shift)]);
}

#[test]
fn test_release_twice_emits_once() {
    let h = exact();
    let ctrl: InputId = NamedKey::Ctrl.into();

    h.synth.hold(ctrl, None).unwrap();
    h.synth.release(ctrl).unwrap();
    h.synth.release(ctrl).unwrap();

    assert_eq!(h.sink.events().len(), 2);
}

#[test]
fn test_release_without_hold_is_noop() {
    let h = exact();
    h.synth.release(NamedKey::Alt.into()).unwrap();
    assert!(h.sink.events().is_empty());
}

#[test]
fn test_hold_twice_emits_one_down() {
    let h = exact();
    let space: InputId = NamedKey::Space.into();

    h.synth.hold(space, None).unwrap();
    h.synth.hold(space, None).unwrap();

    assert_eq!(h.sink.events(), vec![down(KEYBOARD, space)]);
}

#[test]
fn test_release_all() {
    let h = exact();
    h.synth.hold(NamedKey::Shift.into(), None).unwrap();
    h.synth.hold(MouseButton::Left.into(), None).unwrap();

    h.synth.release_all().unwrap();

    assert!(h.synth.states().held_inputs().is_empty());
    let ups = h
        .sink
        .events()
        .into_iter()
        .filter(|e| matches!(e, SinkEvent::Up { .. }))
        .count();
    assert_eq!(ups, 2);
}

#[test]
fn test_auto_release_fires() {
    let h = exact();
    let left: InputId = MouseButton::Left.into();

    h.synth.hold(left, Some(Duration::from_millis(20))).unwrap();
    assert!(h.synth.is_held(left));

    assert!(wait_for(Duration::from_secs(2), || !h.synth.is_held(left)));
    assert_eq!(h.sink.events(), vec![down(MOUSE, left), up(MOUSE, left)]);

    // Late manual release loses the race
    h.synth.release(left).unwrap();
    assert_eq!(h.sink.events().len(), 2);
}

#[test]
fn test_manual_release_cancels_auto_release() {
    let h = exact();
    let left: InputId = MouseButton::Left.into();

    h.synth.hold(left, Some(Duration::from_millis(100))).unwrap();
    h.synth.release(left).unwrap();

    thread::sleep(Duration::from_millis(250));
    assert_eq!(h.sink.events(), vec![down(MOUSE, left), up(MOUSE, left)]);
}

#[test]
fn test_stale_auto_release_does_not_end_new_hold() {
    let h = exact();
    let shift: InputId = NamedKey::Shift.into();

    h.synth.hold(shift, Some(Duration::from_millis(50))).unwrap();
    h.synth.release(shift).unwrap();
    h.synth.hold(shift, None).unwrap();

    thread::sleep(Duration::from_millis(200));
    assert!(h.synth.is_held(shift));
    assert_eq!(h.sink.events().len(), 3);
}

#[test]
fn test_concurrent_hold_release_stays_balanced() {
    let h = exact();
    let key: InputId = NamedKey::Tab.into();

    let workers: Vec<_> = (0..4)
        .map(|_| {
            let synth = Arc::clone(&h.synth);
            thread::spawn(move || {
                for _ in 0..100 {
                    synth.hold(key, None).unwrap();
                    synth.release(key).unwrap();
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    let events = h.sink.events();
    let downs = events.iter().filter(|e| matches!(e, SinkEvent::Down { .. })).count();
    let ups = events.iter().filter(|e| matches!(e, SinkEvent::Up { .. })).count();
    assert_eq!(downs, ups);
    assert!(!h.synth.is_held(key));

    // Never two downs in a row for the same key
    for pair in events.windows(2) {
        assert_ne!(
            std::mem::discriminant(&pair[0]),
            std::mem::discriminant(&pair[1])
        );
    }
}

// ============================================================================
// Write Tests
// ============================================================================

#[test]
fn test_write_handles_case_per_character() {
    let h = exact();
    let shift = key(0x2A);
    let a = key(0x1E);
    let b = key(0x30);

    h.synth.write("Ab").unwrap();

    assert_eq!(
        h.sink.events(),
        vec![
            down(KEYBOARD, shift),
            down(KEYBOARD, a),
            up(KEYBOARD, a),
            up(KEYBOARD, shift),
            down(KEYBOARD, b),
            up(KEYBOARD, b),
        ]
    );
}

#[test]
fn test_write_shifted_symbols() {
    let h = exact();
    h.synth.write("1!").unwrap();

    let one = key(0x02);
    assert_eq!(
        h.sink.events(),
        vec![
            down(KEYBOARD, one),
            up(KEYBOARD, one),
            down(KEYBOARD, key(0x2A)),
            down(KEYBOARD, one),
            up(KEYBOARD, one),
            up(KEYBOARD, key(0x2A)),
        ]
    );
}

#[test]
fn test_write_under_held_shift_keeps_tracker_in_sync() {
    let h = exact();
    let shift = key(0x2A);
    let a = key(0x1E);
    let b = key(0x30);

    h.synth.hold(shift, None).unwrap();
    h.synth.write("Ab").unwrap();

    assert_eq!(
        h.sink.events(),
        vec![
            down(KEYBOARD, shift),
            down(KEYBOARD, a),
            up(KEYBOARD, a),
            up(KEYBOARD, shift),
            down(KEYBOARD, b),
            up(KEYBOARD, b),
            down(KEYBOARD, shift),
        ]
    );
    assert!(h.synth.is_held(shift));

    h.sink.clear();
    h.synth.release(shift).unwrap();
    assert_eq!(h.sink.events(), vec![up(KEYBOARD, shift)]);
    assert!(!h.synth.is_held(shift));
}

#[test]
fn test_write_shifted_character_under_held_shift() {
    let h = exact();
    let shift = key(0x2A);
    let a = key(0x1E);

    h.synth.hold(shift, None).unwrap();
    h.synth.write("A").unwrap();

    assert_eq!(
        h.sink.events(),
        vec![down(KEYBOARD, shift), down(KEYBOARD, a), up(KEYBOARD, a)]
    );
    assert!(h.synth.is_held(shift));
}

/// Sink that accepts a fixed number of calls, then fails every one after
struct LimitedSink {
    inner: RecordingSink,
    remaining: AtomicUsize,
}

impl LimitedSink {
    fn accept(&self) -> Result<(), SinkError> {
        self.remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .map(|_| ())
            .map_err(|_| SinkError::Unavailable("device gone".to_string()))
    }
}

impl EventSink for LimitedSink {
    fn send_down(&self, device: DeviceHandle, input: InputId) -> Result<(), SinkError> {
        self.accept()?;
        self.inner.send_down(device, input)
    }

    fn send_up(&self, device: DeviceHandle, input: InputId) -> Result<(), SinkError> {
        self.accept()?;
        self.inner.send_up(device, input)
    }

    fn send_relative_move(&self, device: DeviceHandle, dx: i32, dy: i32) -> Result<(), SinkError> {
        self.accept()?;
        self.inner.send_relative_move(device, dx, dy)
    }

    fn send_absolute_move(&self, device: DeviceHandle, x: i32, y: i32) -> Result<(), SinkError> {
        self.accept()?;
        self.inner.send_absolute_move(device, x, y)
    }

    fn send_scroll(&self, device: DeviceHandle, direction: ScrollDirection) -> Result<(), SinkError> {
        self.accept()?;
        self.inner.send_scroll(device, direction)
    }

    fn set_mouse_acceleration(&self, device: DeviceHandle, enabled: bool) -> Result<(), SinkError> {
        self.accept()?;
        self.inner.set_mouse_acceleration(device, enabled)
    }
}

#[test]
fn test_write_failure_after_lifting_shift_ends_hold() {
    let recorded = RecordingSink::new();
    // Shift down for the hold, shift up before the key, then nothing
    let sink = LimitedSink {
        inner: recorded.clone(),
        remaining: AtomicUsize::new(2),
    };
    let enumerator = StaticEnumerator::new(vec![
        DeviceInfo::new(KEYBOARD, "HID\\KBD"),
        DeviceInfo::new(MOUSE, "HID\\MOUSE"),
    ]);
    let synth = InputSynthesizer::builder(Arc::new(sink), Arc::new(enumerator))
        .sleeper(Arc::new(RecordingSleeper::new()))
        .timing(TimingConfig {
            auto_disable_mouse_accel: false,
            ..TimingConfig::exact()
        })
        .build();
    assert!(synth.capture_input_devices("", "").unwrap().is_success());

    let shift = key(0x2A);
    synth.hold(shift, None).unwrap();

    assert!(matches!(synth.write("b"), Err(InputError::Sink(_))));
    assert_eq!(
        recorded.events(),
        vec![down(KEYBOARD, shift), up(KEYBOARD, shift)]
    );
    // Shift is physically up, so the tracker must not claim otherwise
    assert!(!synth.is_held(shift));
}

#[test]
fn test_write_skips_untranslatable_characters() {
    let h = exact();
    h.synth.write("a€b").unwrap();
    assert_eq!(h.sink.events().len(), 4);
}

#[test]
fn test_write_empty_text() {
    let h = exact();
    h.synth.write("").unwrap();
    assert!(h.sink.timeline().is_empty());
}

// ============================================================================
// Scroll Tests
// ============================================================================

#[test]
fn test_scroll_four_notches_three_waits() {
    let h = exact();

    h.synth
        .scroll(ScrollDirection::Up, 4, Some(Duration::from_millis(5)))
        .unwrap();

    let timeline: Vec<SinkEvent> = h.sink.timeline().into_iter().map(|r| r.event).collect();
    let scroll = SinkEvent::Scroll {
        device: MOUSE,
        direction: ScrollDirection::Up,
    };
    let wait = SinkEvent::Wait {
        duration: Duration::from_millis(5),
    };
    assert_eq!(
        timeline,
        vec![
            scroll.clone(),
            wait.clone(),
            scroll.clone(),
            wait.clone(),
            scroll.clone(),
            wait,
            scroll,
        ]
    );
}

#[test]
fn test_scroll_non_positive_is_noop() {
    let h = exact();
    h.synth.scroll(ScrollDirection::Down, 0, None).unwrap();
    h.synth.scroll(ScrollDirection::Down, -1, None).unwrap();
    assert!(h.sink.timeline().is_empty());
}

// ============================================================================
// Pointer Motion Tests
// ============================================================================

fn relative_sum(events: &[SinkEvent]) -> (Point, usize) {
    events.iter().fold((Point::new(0, 0), 0), |(sum, n), e| match e {
        SinkEvent::RelativeMove { dx, dy, .. } => (sum + Point::new(*dx, *dy), n + 1),
        _ => (sum, n),
    })
}

#[test]
fn test_straight_move_sums_to_target() {
    let h = exact();

    h.synth.move_mouse_to(Point::new(250, -40), None).unwrap();

    let (sum, moves) = relative_sum(&h.sink.events());
    assert_eq!(sum, Point::new(250, -40));
    assert_eq!(moves, 3);
    assert_eq!(h.synth.position(), Point::new(250, -40));
}

#[test]
fn test_curved_move_sums_to_target() {
    let h = exact();
    h.synth.set_mouse_pos(Point::new(100, 100)).unwrap();
    h.sink.clear();

    let params = CurveParams::default();
    h.synth.move_mouse_to(Point::new(640, 420), Some(&params)).unwrap();

    let events = h.sink.events();
    let (sum, moves) = relative_sum(&events);
    assert_eq!(sum, Point::new(540, 320));
    assert!(moves > 1 && moves <= params.max_steps);
    assert_eq!(h.synth.position(), Point::new(640, 420));

    // One jittered pause between consecutive steps
    assert_eq!(h.sleeper.waits().len(), moves - 1);
}

#[test]
fn test_randomized_curve_still_lands_exactly() {
    let h = harness(TimingConfig::default());

    for target in [Point::new(900, 30), Point::new(-15, 700), Point::new(3, 4)] {
        let start = h.synth.position();
        h.sink.clear();

        h.synth
            .move_mouse_to(target, Some(&CurveParams::randomized()))
            .unwrap();

        let (sum, _) = relative_sum(&h.sink.events());
        assert_eq!(start + sum, target);
    }
}

#[test]
fn test_move_to_same_point_emits_nothing() {
    let h = exact();
    h.synth.set_mouse_pos(Point::new(42, 42)).unwrap();
    h.sink.clear();

    h.synth
        .move_mouse_to(Point::new(42, 42), Some(&CurveParams::default()))
        .unwrap();
    h.synth.move_mouse_to(Point::new(42, 42), None).unwrap();

    assert!(h.sink.timeline().is_empty());
}

#[test]
fn test_set_mouse_pos_single_absolute_event() {
    let h = exact();
    h.synth.set_mouse_pos(Point::new(1920, 1080)).unwrap();

    assert_eq!(
        h.sink.events(),
        vec![SinkEvent::AbsoluteMove {
            device: MOUSE,
            x: 1920,
            y: 1080,
        }]
    );
}

// ============================================================================
// Error Propagation Tests
// ============================================================================

#[test]
fn test_sink_failure_surfaces_unmodified() {
    let h = exact();
    h.sink.fail_with("driver not loaded");

    let err = h
        .synth
        .press(MouseButton::Left.into(), 1, None, None)
        .unwrap_err();
    match err {
        InputError::Sink(SinkError::Unavailable(msg)) => assert_eq!(msg, "driver not loaded"),
        other => panic!("unexpected error: {other:?}"),
    }

    assert!(matches!(
        h.synth.scroll(ScrollDirection::Up, 1, None),
        Err(InputError::Sink(_))
    ));
    assert!(matches!(
        h.synth.move_mouse_to(Point::new(10, 10), None),
        Err(InputError::Sink(_))
    ));
}

#[test]
fn test_operations_need_captured_devices() {
    let sink = RecordingSink::new();
    let synth = InputSynthesizer::builder(
        Arc::new(sink.clone()),
        Arc::new(StaticEnumerator::new(Vec::new())),
    )
    .sleeper(Arc::new(RecordingSleeper::new()))
    .build();

    assert!(!synth.capture_input_devices("", "").unwrap().is_success());
    assert!(matches!(
        synth.write("x"),
        Err(InputError::DeviceNotCaptured {
            class: DeviceClass::Keyboard
        })
    ));
    assert!(matches!(
        synth.set_mouse_pos(Point::new(1, 1)),
        Err(InputError::DeviceNotCaptured {
            class: DeviceClass::Mouse
        })
    ));
    assert!(sink.events().is_empty());
}
