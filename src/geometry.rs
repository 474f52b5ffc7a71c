//! Core geometry: rectangles in terminal-cell space.
//!
//! [`Rect`] is the coordinate type used for drawable bounds, viewports, clip
//! regions, and dirty tracking. Coordinates are signed so scene-space bounds
//! can sit partially (or entirely) off screen; the compositor clips to the
//! viewport before any grid access. Intersection and overlap use the
//! inclusive-low / exclusive-high convention throughout.

// ---------------------------------------------------------------------------
// Rect
// ---------------------------------------------------------------------------

/// A rectangle in terminal cells defined by position and size.
///
/// Empty when `width <= 0` or `height <= 0`. The `intersection`, `union`,
/// and `overlaps` methods are hot paths and marked `#[inline]`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    /// An empty rectangle at the origin.
    pub const EMPTY: Rect = Rect {
        x: 0,
        y: 0,
        width: 0,
        height: 0,
    };

    /// A rectangle covering effectively unbounded space, used as the
    /// "entire layer" wildcard in dirty tracking.
    pub const EVERYTHING: Rect = Rect {
        x: i32::MIN / 4,
        y: i32::MIN / 4,
        width: i32::MAX / 2,
        height: i32::MAX / 2,
    };

    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A rectangle at the origin with the given size.
    #[inline]
    pub const fn sized(width: i32, height: i32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }

    /// The right edge (exclusive): `x + width`.
    #[inline]
    pub const fn right(self) -> i32 {
        self.x + self.width
    }

    /// The bottom edge (exclusive): `y + height`.
    #[inline]
    pub const fn bottom(self) -> i32 {
        self.y + self.height
    }

    /// Whether this rectangle covers no cells.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Cell count; zero for empty rectangles.
    #[inline]
    pub const fn area(self) -> i64 {
        if self.is_empty() {
            0
        } else {
            self.width as i64 * self.height as i64
        }
    }

    /// Whether the point (x, y) lies inside this rectangle.
    #[inline]
    pub const fn contains(self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Whether `other` overlaps this rectangle (non-zero intersection area).
    ///
    /// Half-open on all four edges: rectangles that merely touch do not
    /// overlap. Empty rectangles overlap nothing.
    #[inline]
    pub const fn overlaps(self, other: Rect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Compute the intersection of two rectangles.
    ///
    /// Returns [`Rect::EMPTY`] if they do not overlap.
    #[inline]
    pub const fn intersection(self, other: Rect) -> Rect {
        let x1 = if self.x > other.x { self.x } else { other.x };
        let y1 = if self.y > other.y { self.y } else { other.y };

        let sr = self.right();
        let or = other.right();
        let x2 = if sr < or { sr } else { or };

        let sb = self.bottom();
        let ob = other.bottom();
        let y2 = if sb < ob { sb } else { ob };

        let w = x2 - x1;
        let h = y2 - y1;

        if w <= 0 || h <= 0 {
            Rect::EMPTY
        } else {
            Rect {
                x: x1,
                y: y1,
                width: w,
                height: h,
            }
        }
    }

    /// The smallest rectangle containing both `self` and `other`.
    ///
    /// An empty operand contributes nothing.
    #[inline]
    pub const fn union(self, other: Rect) -> Rect {
        if self.is_empty() {
            return other;
        }
        if other.is_empty() {
            return self;
        }

        let x1 = if self.x < other.x { self.x } else { other.x };
        let y1 = if self.y < other.y { self.y } else { other.y };

        let sr = self.right();
        let or = other.right();
        let x2 = if sr > or { sr } else { or };

        let sb = self.bottom();
        let ob = other.bottom();
        let y2 = if sb > ob { sb } else { ob };

        Rect {
            x: x1,
            y: y1,
            width: x2 - x1,
            height: y2 - y1,
        }
    }

    /// Translate the rectangle by (dx, dy).
    #[inline]
    pub const fn translate(self, dx: i32, dy: i32) -> Rect {
        Rect {
            x: self.x + dx,
            y: self.y + dy,
            width: self.width,
            height: self.height,
        }
    }
}

// ---------------------------------------------------------------------------
// Dirty-region merging
// ---------------------------------------------------------------------------

/// Merge overlapping rectangles into a set of disjoint bounding unions.
///
/// Repeatedly picks an unconsumed rectangle and folds every rectangle it
/// overlaps into its axis-aligned bounding union until the union stops
/// growing, then moves on. The resulting set depends on input order only in
/// its ordering, not its membership. Empty input rectangles are discarded.
pub fn merge_rects(rects: &[Rect]) -> Vec<Rect> {
    let mut pending: Vec<Rect> = rects.iter().copied().filter(|r| !r.is_empty()).collect();
    let mut merged = Vec::new();

    while let Some(mut current) = pending.pop() {
        loop {
            let before = pending.len();
            let mut rest = Vec::with_capacity(before);
            for r in pending.drain(..) {
                if current.overlaps(r) {
                    current = current.union(r);
                } else {
                    rest.push(r);
                }
            }
            pending = rest;
            if pending.len() == before {
                break;
            }
        }
        merged.push(current);
    }

    merged
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // Rect basics
    // -----------------------------------------------------------------------

    #[test]
    fn new_and_empty() {
        let r = Rect::new(1, 2, 3, 4);
        assert_eq!(r.x, 1);
        assert_eq!(r.y, 2);
        assert_eq!(r.width, 3);
        assert_eq!(r.height, 4);
        assert_eq!(Rect::EMPTY, Rect::new(0, 0, 0, 0));
        assert_eq!(Rect::default(), Rect::EMPTY);
        assert!(Rect::EMPTY.is_empty());
        assert!(!r.is_empty());
    }

    #[test]
    fn sized_at_origin() {
        assert_eq!(Rect::sized(80, 24), Rect::new(0, 0, 80, 24));
    }

    #[test]
    fn zero_or_negative_dims_are_empty() {
        assert!(Rect::new(5, 5, 0, 10).is_empty());
        assert!(Rect::new(5, 5, 10, 0).is_empty());
        assert!(Rect::new(5, 5, -1, 10).is_empty());
        assert_eq!(Rect::new(5, 5, -1, 10).area(), 0);
    }

    #[test]
    fn right_bottom_area() {
        let r = Rect::new(5, 10, 20, 30);
        assert_eq!(r.right(), 25);
        assert_eq!(r.bottom(), 40);
        assert_eq!(r.area(), 600);
    }

    #[test]
    fn contains_point() {
        let r = Rect::new(5, 5, 10, 10);
        assert!(r.contains(5, 5));
        assert!(r.contains(14, 14));
        assert!(!r.contains(15, 5));
        assert!(!r.contains(5, 15));
        assert!(!r.contains(4, 5));
    }

    // -----------------------------------------------------------------------
    // Overlap and intersection
    // -----------------------------------------------------------------------

    #[test]
    fn overlaps_basic() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(5, 5, 10, 10);
        assert!(a.overlaps(b));
        assert!(b.overlaps(a));
    }

    #[test]
    fn adjacent_rects_do_not_overlap() {
        let a = Rect::new(0, 0, 10, 10);
        let c = Rect::new(10, 0, 10, 10);
        assert!(!a.overlaps(c));
    }

    #[test]
    fn empty_overlaps_nothing() {
        let a = Rect::new(0, 0, 10, 10);
        assert!(!a.overlaps(Rect::EMPTY));
        assert!(!Rect::EMPTY.overlaps(a));
        // An empty rect positioned inside a non-empty one still overlaps nothing.
        assert!(!a.overlaps(Rect::new(3, 3, 0, 5)));
    }

    #[test]
    fn intersection_basic() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(5, 5, 10, 10);
        assert_eq!(a.intersection(b), Rect::new(5, 5, 5, 5));
    }

    #[test]
    fn intersection_disjoint_is_empty() {
        let a = Rect::new(0, 0, 5, 5);
        let b = Rect::new(10, 10, 5, 5);
        assert_eq!(a.intersection(b), Rect::EMPTY);
    }

    #[test]
    fn intersection_self() {
        let r = Rect::new(3, 4, 20, 15);
        assert_eq!(r.intersection(r), r);
    }

    #[test]
    fn intersection_contained() {
        let outer = Rect::new(0, 0, 100, 100);
        let inner = Rect::new(10, 10, 5, 5);
        assert_eq!(outer.intersection(inner), inner);
        assert_eq!(inner.intersection(outer), inner);
    }

    #[test]
    fn intersection_with_everything_is_identity() {
        let r = Rect::new(-3, 7, 42, 13);
        assert_eq!(r.intersection(Rect::EVERYTHING), r);
    }

    // -----------------------------------------------------------------------
    // Union
    // -----------------------------------------------------------------------

    #[test]
    fn union_basic() {
        let a = Rect::new(0, 0, 5, 5);
        let b = Rect::new(10, 10, 5, 5);
        assert_eq!(a.union(b), Rect::new(0, 0, 15, 15));
    }

    #[test]
    fn union_with_empty_is_identity() {
        let r = Rect::new(3, 4, 10, 10);
        assert_eq!(r.union(Rect::EMPTY), r);
        assert_eq!(Rect::EMPTY.union(r), r);
    }

    #[test]
    fn translate_moves_position_only() {
        let r = Rect::new(5, 10, 20, 30);
        assert_eq!(r.translate(-5, 3), Rect::new(0, 13, 20, 30));
    }

    // -----------------------------------------------------------------------
    // merge_rects
    // -----------------------------------------------------------------------

    fn assert_same_members(mut a: Vec<Rect>, mut b: Vec<Rect>) {
        let key = |r: &Rect| (r.x, r.y, r.width, r.height);
        a.sort_by_key(key);
        b.sort_by_key(key);
        assert_eq!(a, b);
    }

    #[test]
    fn merge_empty_input() {
        assert!(merge_rects(&[]).is_empty());
    }

    #[test]
    fn merge_discards_empty_rects() {
        let out = merge_rects(&[Rect::EMPTY, Rect::new(0, 0, 0, 5)]);
        assert!(out.is_empty());
    }

    #[test]
    fn merge_disjoint_keeps_all() {
        let a = Rect::new(0, 0, 5, 5);
        let b = Rect::new(20, 20, 5, 5);
        assert_same_members(merge_rects(&[a, b]), vec![a, b]);
    }

    #[test]
    fn merge_overlapping_pair() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(5, 5, 10, 10);
        assert_same_members(merge_rects(&[a, b]), vec![Rect::new(0, 0, 15, 15)]);
    }

    #[test]
    fn merge_is_transitive_through_a_bridge() {
        // a and c are disjoint, but b overlaps both; the bounding union of
        // a+b grows to swallow c on the second pass.
        let a = Rect::new(0, 0, 4, 4);
        let b = Rect::new(3, 0, 6, 4);
        let c = Rect::new(8, 0, 4, 4);
        assert_same_members(merge_rects(&[a, c, b]), vec![Rect::new(0, 0, 12, 4)]);
    }

    #[test]
    fn merge_membership_is_order_independent() {
        let rects = [
            Rect::new(0, 0, 10, 10),
            Rect::new(5, 5, 10, 10),
            Rect::new(30, 30, 5, 5),
            Rect::new(12, 0, 4, 4),
        ];
        let forward = merge_rects(&rects);
        let mut reversed = rects;
        reversed.reverse();
        let backward = merge_rects(&reversed);
        assert_same_members(forward, backward);
    }
}
