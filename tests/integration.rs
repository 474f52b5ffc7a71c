//! Integration tests for scrim.
//!
//! These tests exercise the public API from outside the crate: the grid,
//! differ, compositor, scheduler, and writer pipeline working together, plus
//! the property-based round trips for diff/apply and patch optimization.

use pretty_assertions::assert_eq;

use scrim::testing::{grid_to_string, patch_summary, ManualClock, MemorySink, RecordingEncoder};
use scrim::{
    apply_patches, diff, optimize_patches, Cell, CellContent, CellGrid, Compositor,
    CompositorOptions, DrawContext, Drawable, FramePresenter, FrameScheduler, Patch, Rect, Scene,
    Style, TermEncoder,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Label {
    bounds: Rect,
    text: String,
    style: Option<Style>,
}

impl Label {
    fn at(x: i32, y: i32, text: &str) -> Self {
        Self {
            bounds: Rect::new(x, y, text.chars().count() as i32, 1),
            text: text.to_string(),
            style: None,
        }
    }
}

impl Drawable for Label {
    fn bounds(&self) -> Rect {
        self.bounds
    }
    fn draw(&self, ctx: &mut DrawContext<'_>) {
        ctx.write_text(self.bounds.x, self.bounds.y, &self.text, self.style);
    }
}

fn cells(s: &str) -> Vec<Cell> {
    s.chars().map(|c| Cell::new(c, None)).collect()
}

fn compositor(w: u16, h: u16) -> Compositor {
    Compositor::new(
        CompositorOptions::new().with_size(w, h),
        Box::new(RecordingEncoder::new()),
    )
    .unwrap()
}

// ---------------------------------------------------------------------------
// Hello world
// ---------------------------------------------------------------------------

#[test]
fn hello_world_dirty_patches() {
    let mut grid = CellGrid::new(10, 1).unwrap();
    grid.write_text(0, 0, "Hello", None);

    let patches = grid.dirty_patches();
    assert_eq!(patch_summary(&patches), vec![r#"y0 x0 "Hello""#.to_string()]);

    grid.clear_dirty();
    assert!(grid.dirty_patches().is_empty());
}

// ---------------------------------------------------------------------------
// Wide characters
// ---------------------------------------------------------------------------

#[test]
fn wide_character_pair_and_edge_replacement() {
    let mut grid = CellGrid::new(4, 1).unwrap();
    grid.set(0, 0, '世', None);

    let head = grid.get(0, 0).unwrap();
    assert_eq!(head.width(), 2);
    assert_eq!(head.content, CellContent::Glyph('世'));

    let tail = grid.get(1, 0).unwrap();
    assert_eq!(tail.width(), 0);
    assert_eq!(tail.content.as_str(), "");

    assert_eq!(grid.get(2, 0).unwrap(), Cell::blank());
    assert_eq!(grid.get(3, 0).unwrap(), Cell::blank());

    // A wide glyph at the last column cannot fit its pair.
    grid.set(3, 0, '界', None);
    let clipped = grid.get(3, 0).unwrap();
    assert_eq!(clipped.width(), 1);
    assert_eq!(clipped.content, CellContent::Glyph('?'));
}

// ---------------------------------------------------------------------------
// Diff minimality
// ---------------------------------------------------------------------------

#[test]
fn diff_produces_exactly_one_minimal_patch() {
    let a = CellGrid::new(10, 1).unwrap();
    let mut b = a.clone();
    for x in 2..5 {
        b.set(x, 0, 'X', None);
    }

    let patches = diff(&a, &b);
    assert_eq!(patches, vec![Patch::new(2, 0, cells("XXX"))]);
}

#[test]
fn diff_of_identical_grids_is_empty() {
    let mut a = CellGrid::new(10, 3).unwrap();
    a.write_text(0, 0, "stable", Some(Style::bold()));
    assert!(diff(&a, &a).is_empty());
}

#[test]
fn diff_apply_transforms_a_into_b() {
    let mut a = CellGrid::new(20, 4).unwrap();
    a.write_text(0, 0, "the quick brown fox", None);
    a.write_text(0, 2, "jumps", Some(Style::bold()));

    let mut b = a.clone();
    b.write_line(1, "over the lazy dog", None);
    b.set(0, 3, '世', None);
    b.clear_rect(Rect::new(4, 0, 6, 1), None);

    let mut patched = a.clone();
    apply_patches(&mut patched, &diff(&a, &b));
    assert_eq!(patched.snapshot(), b.snapshot());
}

// ---------------------------------------------------------------------------
// Patch merge
// ---------------------------------------------------------------------------

#[test]
fn optimize_merges_adjacent_and_keeps_gaps() {
    let input = vec![
        Patch::new(0, 0, cells("A")),
        Patch::new(1, 0, cells("B")),
        Patch::new(5, 0, cells("C")),
    ];
    let out = optimize_patches(input);
    assert_eq!(
        out,
        vec![Patch::new(0, 0, cells("AB")), Patch::new(5, 0, cells("C"))]
    );
}

// ---------------------------------------------------------------------------
// Scroll
// ---------------------------------------------------------------------------

#[test]
fn scroll_up_rotates_rows_and_dirties_everything() {
    let mut grid = CellGrid::new(3, 3).unwrap();
    for (y, row) in ["AAA", "BBB", "CCC"].iter().enumerate() {
        grid.write_text(0, y as u16, row, None);
    }
    grid.clear_dirty();

    grid.scroll_up(1);
    assert_eq!(grid_to_string(&grid), "BBB\nCCC");

    // All three rows are dirty, as one full-width run each.
    let patches = grid.dirty_patches();
    assert_eq!(patches.len(), 3);
    assert!(patches.iter().all(|p| p.x == 0 && p.span() == 3));
}

// ---------------------------------------------------------------------------
// Compositor z-order
// ---------------------------------------------------------------------------

#[test]
fn z_order_decides_the_visible_cell() {
    let mut c = compositor(4, 1);
    let l1 = c.create_layer(0);
    let l2 = c.create_layer(1);
    c.layer_mut(l1).unwrap().add(Box::new(Label::at(0, 0, "A")));
    c.layer_mut(l2).unwrap().add(Box::new(Label::at(0, 0, "B")));

    let scene = Scene::new(Rect::sized(4, 1));
    let mut sink = MemorySink::new(4, 1);
    c.render(&scene, &mut sink).unwrap();
    assert_eq!(
        c.displayed().get(0, 0).unwrap().content,
        CellContent::Glyph('B')
    );

    c.set_layer_z(l1, 5);
    c.render(&scene, &mut sink).unwrap();
    assert_eq!(
        c.displayed().get(0, 0).unwrap().content,
        CellContent::Glyph('A')
    );
}

// ---------------------------------------------------------------------------
// Full pipeline with the ANSI encoder
// ---------------------------------------------------------------------------

#[test]
fn ansi_pipeline_emits_cursor_moves_and_text() {
    let mut presenter = FramePresenter::new(Box::new(TermEncoder::new()));
    let mut sink = MemorySink::new(10, 2);
    let patches = vec![
        Patch::new(0, 0, cells("hi")),
        Patch::new(3, 1, cells("there")),
    ];
    presenter.present(&patches, &mut sink).unwrap();

    let out = sink.text();
    assert!(out.starts_with("\x1b[1;1Hhi"));
    assert!(out.contains("\x1b[2;4Hthere"));
}

#[test]
fn ansi_pipeline_resets_styles_per_run() {
    let mut presenter = FramePresenter::new(Box::new(TermEncoder::new()));
    let mut sink = MemorySink::new(10, 1);
    let styled = Style::fg(scrim::Color::Red);
    let patches = vec![Patch::new(0, 0, vec![Cell::new('x', Some(styled))])];
    presenter.present(&patches, &mut sink).unwrap();

    let out = sink.text();
    // Reset precedes the style, and the run ends with a reset.
    let reset_count = out.matches("\x1b[0m").count();
    assert!(reset_count >= 2, "output was {out:?}");
    assert!(out.contains('x'));
}

// ---------------------------------------------------------------------------
// End-to-end: compose, fail, retry
// ---------------------------------------------------------------------------

#[test]
fn failed_flush_keeps_terminal_state_consistent() {
    let mut c = compositor(8, 1);
    let layer = c.create_layer(0);
    c.layer_mut(layer).unwrap().add(Box::new(Label::at(0, 0, "one")));

    let mut sink = MemorySink::new(8, 1);
    c.render(&Scene::new(Rect::sized(8, 1)), &mut sink).unwrap();
    assert_eq!(sink.text(), "one");

    // Change content, then fail the flush.
    c.layer_mut(layer).unwrap().clear();
    c.layer_mut(layer).unwrap().add(Box::new(Label::at(0, 0, "two")));
    let mut bad = MemorySink::new(8, 1).failing_flush();
    assert!(c.render(&Scene::new(Rect::sized(8, 1)), &mut bad).is_err());

    // The retry emits the same minimal delta the failed frame attempted.
    let mut retry = MemorySink::new(8, 1);
    c.render(&Scene::new(Rect::sized(8, 1)), &mut retry).unwrap();
    assert_eq!(grid_to_string(c.displayed()), "two");
    assert_eq!(retry.text(), "two");
}

// ---------------------------------------------------------------------------
// Frame pacing
// ---------------------------------------------------------------------------

#[test]
fn frame_pacing_stays_within_twenty_percent() {
    let clock = ManualClock::new();
    let mut sched = FrameScheduler::with_clock(60, Box::new(clock.clone()));

    let count = std::rc::Rc::new(std::cell::RefCell::new(0u32));
    let inner = std::rc::Rc::clone(&count);
    sched.request_frame(move |_| *inner.borrow_mut() += 1);
    sched.start();

    // Two simulated seconds of 16ms ticks, mimicking a lightly loaded loop.
    let mut t = 0u64;
    while t < 2000 {
        t += 16;
        clock.set(t);
        sched.tick();
    }

    let per_second = *count.borrow() as f64 / 2.0;
    assert!(
        (48.0..=72.0).contains(&per_second),
        "callbacks per second = {per_second}"
    );
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

#[test]
fn box_drawing_snapshot() {
    let mut grid = CellGrid::new(12, 5).unwrap();
    grid.draw_box(Rect::new(0, 0, 10, 4), scrim::BoxKind::Rounded, None, false);
    grid.write_text(2, 1, "scrim", None);
    grid.draw_line((1, 2), (8, 2), '·', None);

    insta::assert_snapshot!(grid_to_string(&grid), @r"
    ╭────────╮
    │ scrim  │
    │········│
    ╰────────╯
    ");
}

#[test]
fn wide_text_snapshot() {
    let mut grid = CellGrid::new(10, 2).unwrap();
    grid.write_text(0, 0, "日本語", None);
    grid.write_text(0, 1, "latin", None);

    insta::assert_snapshot!(grid_to_string(&grid), @r"
    日本語
    latin
    ");
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

mod properties {
    use super::*;
    use proptest::prelude::*;

    /// Writes applied to a grid: coordinate plus a character from a set
    /// that includes wide glyphs and a combining cluster.
    fn writes() -> impl Strategy<Value = Vec<(u16, u16, char)>> {
        prop::collection::vec(
            (0u16..12, 0u16..4, prop::sample::select(vec!['a', 'Z', ' ', '世', '界', '?'])),
            0..40,
        )
    }

    proptest! {
        #[test]
        fn diff_apply_round_trips(a_writes in writes(), b_writes in writes()) {
            let mut a = CellGrid::new(12, 4).unwrap();
            for (x, y, ch) in &a_writes {
                a.set(*x, *y, *ch, None);
            }
            let mut b = CellGrid::new(12, 4).unwrap();
            for (x, y, ch) in &b_writes {
                b.set(*x, *y, *ch, None);
            }

            let mut patched = a.clone();
            apply_patches(&mut patched, &diff(&a, &b));
            prop_assert_eq!(patched.snapshot(), b.snapshot());
        }

        #[test]
        fn diff_self_is_always_empty(ws in writes()) {
            let mut g = CellGrid::new(12, 4).unwrap();
            for (x, y, ch) in &ws {
                g.set(*x, *y, *ch, None);
            }
            prop_assert!(diff(&g, &g).is_empty());
        }

        #[test]
        fn optimize_is_idempotent(a_writes in writes(), b_writes in writes()) {
            let mut a = CellGrid::new(12, 4).unwrap();
            for (x, y, ch) in &a_writes {
                a.set(*x, *y, *ch, None);
            }
            let mut b = CellGrid::new(12, 4).unwrap();
            for (x, y, ch) in &b_writes {
                b.set(*x, *y, *ch, None);
            }

            let once = optimize_patches(diff(&a, &b));
            let twice = optimize_patches(once.clone());
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn dirty_patch_replay_matches(ws in writes()) {
            let mut base = CellGrid::new(12, 4).unwrap();
            base.write_text(0, 0, "start state", None);
            base.clear_dirty();

            let mut mutated = base.clone();
            for (x, y, ch) in &ws {
                mutated.set(*x, *y, *ch, None);
            }

            let mut replay = base.clone();
            apply_patches(&mut replay, &mutated.dirty_patches());
            prop_assert_eq!(replay.snapshot(), mutated.snapshot());
        }
    }
}
