//! Property-based invariant tests for the panel controller.
//!
//! These tests verify:
//!
//! 1. The offset never leaves `[left, right]` for any input sequence
//! 2. Reported offset deltas always add up to the actual offset change
//! 3. Returning to Idle from Settling always rests exactly on a limit
//! 4. A press released within the slop is a tap with no drag or settle events
//! 5. Release velocity sign picks the settle target
//! 6. No panics on arbitrary operation sequences

use std::time::Duration;

use proptest::prelude::*;
use toggleview_core::{
    HitRects, Mode, PanelConfig, PanelController, PanelEvent, PointerSample, Rect,
};

// ── Strategies ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Op {
    Down { x: f64, y: f64 },
    Move { x: f64, y: f64 },
    Up { x: f64, y: f64 },
    Cancel,
    Tick { ms: u64 },
    Wait { ms: u64 },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (-100.0..1200.0f64, -50.0..700.0f64).prop_map(|(x, y)| Op::Down { x, y }),
        (-400.0..1500.0f64, -50.0..700.0f64).prop_map(|(x, y)| Op::Move { x, y }),
        (-400.0..1500.0f64, -50.0..700.0f64).prop_map(|(x, y)| Op::Up { x, y }),
        Just(Op::Cancel),
        (0u64..100).prop_map(|ms| Op::Tick { ms }),
        (0u64..200).prop_map(|ms| Op::Wait { ms }),
    ]
}

fn limits_strategy() -> impl Strategy<Value = (f64, f64)> {
    (0.0..500.0f64, 0.0..1500.0f64).prop_map(|(left, span)| (left, left + span))
}

fn hits() -> HitRects {
    HitRects::new(
        Rect::new(0.0, 0.0, 300.0, 600.0),
        Rect::new(300.0, 0.0, 700.0, 600.0),
    )
}

fn controller(left: f64, right: f64, initial: f64) -> PanelController {
    let config = PanelConfig::for_viewport(1000.0, 300.0)
        .with_limits(left, right)
        .with_initial_offset(initial);
    PanelController::new(config).unwrap()
}

/// Apply one op; returns the response delta and events.
fn apply(c: &mut PanelController, op: &Op, now_ms: &mut u64) -> (f64, Vec<PanelEvent>) {
    let sample = |x: f64, y: f64, t: u64| PointerSample::new(x, y, t * 1_000_000);
    let r = match *op {
        Op::Down { x, y } => c.on_pointer_down(sample(x, y, *now_ms), &hits()),
        Op::Move { x, y } => c.on_pointer_move(sample(x, y, *now_ms)),
        Op::Up { x, y } => c.on_pointer_up(sample(x, y, *now_ms)),
        Op::Cancel => c.on_pointer_cancel(),
        Op::Tick { ms } => {
            *now_ms += ms;
            c.tick(Duration::from_millis(ms))
        }
        Op::Wait { ms } => {
            *now_ms += ms;
            return (0.0, Vec::new());
        }
    };
    *now_ms += 8;
    (r.offset_delta, r.events)
}

fn drain(c: &mut PanelController) -> Vec<PanelEvent> {
    let mut events = Vec::new();
    for _ in 0..10_000 {
        if c.mode() != Mode::Settling {
            break;
        }
        events.extend(c.tick(Duration::from_millis(16)).events);
    }
    events
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Clamping
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn offset_stays_within_limits(
        (left, right) in limits_strategy(),
        frac in 0.0..=1.0f64,
        ops in proptest::collection::vec(op_strategy(), 1..200),
    ) {
        let mut c = controller(left, right, (left + (right - left) * frac).min(right));
        let mut now = 0;
        for op in &ops {
            apply(&mut c, op, &mut now);
            let offset = c.offset();
            prop_assert!(
                offset >= left && offset <= right,
                "offset {} escaped [{}, {}] after {:?}", offset, left, right, op
            );
        }
    }

    #[test]
    fn deltas_account_for_every_offset_change(
        ops in proptest::collection::vec(op_strategy(), 1..200),
    ) {
        let mut c = controller(0.0, 1000.0, 500.0);
        let start = c.offset();
        let mut sum = 0.0;
        let mut now = 0;
        for op in &ops {
            sum += apply(&mut c, op, &mut now).0;
        }
        prop_assert!((sum - (c.offset() - start)).abs() < 1e-6);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Settling
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn idle_after_settle_is_exactly_a_limit(
        (left, right) in limits_strategy(),
        ops in proptest::collection::vec(op_strategy(), 1..100),
    ) {
        let mut c = controller(left, right, left);
        let mut now = 0;
        let mut was_settling = false;
        for op in &ops {
            apply(&mut c, op, &mut now);
            if was_settling && c.mode() == Mode::Idle {
                let offset = c.offset();
                prop_assert!(offset == left || offset == right, "rested at {}", offset);
            }
            was_settling = c.mode() == Mode::Settling;
        }
        // Finish any gesture and let the spring run out.
        c.on_pointer_cancel();
        let events = drain(&mut c);
        prop_assert_eq!(c.mode(), Mode::Idle);
        if let Some(PanelEvent::Settled { limit }) = events.last() {
            prop_assert!(*limit == left || *limit == right);
            prop_assert_eq!(c.offset(), *limit);
        }
    }

    #[test]
    fn release_velocity_sign_picks_target(
        start_x in 300.0..700.0f64,
        step in prop_oneof![-80.0..-1.0f64, 1.0..80.0f64],
        moves in 2usize..8,
    ) {
        let mut c = controller(0.0, 1000.0, 500.0);
        c.on_pointer_down(PointerSample::new(start_x, 300.0, 0), &hits());
        let mut x = start_x;
        let mut t = 0;
        for _ in 0..moves {
            x += step;
            t += 16;
            c.on_pointer_move(PointerSample::new(x, 300.0, t * 1_000_000));
        }
        let r = c.on_pointer_up(PointerSample::new(x + step, 300.0, (t + 16) * 1_000_000));
        let started = r.events.iter().find_map(|e| match *e {
            PanelEvent::SettleStarted { target, velocity } => Some((target, velocity)),
            _ => None,
        });
        let Some((target, velocity)) = started else {
            // Total travel stayed within the slop: a tap.
            let all_taps = r.events.iter().all(|e| matches!(e, PanelEvent::Tap { .. }));
            prop_assert!(all_taps);
            return Ok(());
        };
        prop_assert_eq!(velocity < 0.0, step < 0.0);
        prop_assert_eq!(target, if velocity < 0.0 { 0.0 } else { 1000.0 });
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Taps
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn small_press_is_a_tap(
        x in 50.0..950.0f64,
        y in 50.0..550.0f64,
        jitter in proptest::collection::vec((-13.0..13.0f64, -13.0..13.0f64), 0..6),
        (dx, dy) in (-13.0..13.0f64, -13.0..13.0f64),
    ) {
        let mut c = controller(0.0, 1000.0, 1000.0);
        let mut events = c.on_pointer_down(PointerSample::new(x, y, 0), &hits()).events;
        for (i, (jx, jy)) in jitter.iter().enumerate() {
            let t = (i as u64 + 1) * 8_000_000;
            events.extend(c.on_pointer_move(PointerSample::new(x + jx, y + jy, t)).events);
        }
        events.extend(c.on_pointer_up(PointerSample::new(x + dx, y + dy, 100_000_000)).events);

        prop_assert_eq!(events, vec![PanelEvent::Tap { x, y }]);
        prop_assert_eq!(c.offset(), 1000.0);
        prop_assert_eq!(c.mode(), Mode::Idle);
    }
}
