#![no_main]

use std::time::Duration;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use toggleview_core::{
    HitRects, Mode, PanelConfig, PanelController, PanelEvent, PanelLayout, PointerSample, Rect,
};

#[derive(Debug, Arbitrary)]
enum Op {
    Down { x: i16, y: i16 },
    Move { x: i16, y: i16 },
    Up { x: i16, y: i16 },
    Cancel,
    Tick { ms: u8 },
    Wait { ms: u8 },
    Layout { viewport: u16 },
}

#[derive(Debug, Arbitrary)]
struct Input {
    right_limit: u16,
    start: u16,
    ops: Vec<Op>,
}

fuzz_target!(|input: Input| {
    let right = f64::from(input.right_limit);
    let start = f64::from(input.start).min(right);
    let config = PanelConfig::for_viewport(right, 0.0).with_initial_offset(start);
    let Ok(mut c) = PanelController::new(config) else {
        return;
    };
    let hits = HitRects::new(
        Rect::new(-1000.0, -1000.0, 1000.0, 3000.0),
        Rect::new(0.0, -1000.0, 1000.0, 3000.0),
    );

    let mut now: u64 = 0;
    let mut offset = c.offset();
    for op in input.ops.iter().take(512) {
        let sample = |x: i16, y: i16| PointerSample::new(f64::from(x), f64::from(y), now);
        let r = match *op {
            Op::Down { x, y } => c.on_pointer_down(sample(x, y), &hits),
            Op::Move { x, y } => c.on_pointer_move(sample(x, y)),
            Op::Up { x, y } => c.on_pointer_up(sample(x, y)),
            Op::Cancel => c.on_pointer_cancel(),
            Op::Tick { ms } => c.tick(Duration::from_millis(u64::from(ms))),
            Op::Wait { ms } => {
                now += u64::from(ms) * 1_000_000;
                continue;
            }
            Op::Layout { viewport } => c.set_layout(PanelLayout::new(f64::from(viewport), 0.0)),
        };
        now += 4_000_000;

        // Post-conditions that must always hold:
        let limits = c.limits();
        assert!(c.offset() >= limits.left && c.offset() <= limits.right, "offset escaped");
        assert!(
            (offset + r.offset_delta - c.offset()).abs() < 1e-6,
            "delta does not match offset change"
        );
        if let Some(PanelEvent::Settled { limit }) = r.events.last() {
            assert_eq!(c.mode(), Mode::Idle);
            assert!(*limit == limits.left || *limit == limits.right);
        }
        offset = c.offset();
    }
});
