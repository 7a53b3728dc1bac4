//! Placement Module
//!
//! Initial placement for newly mapped windows: a free-space search ("smart"
//! placement, row- or column-major with configurable scan directions) and the
//! classic diagonal cascade fallback. Everything here is pure geometry; the
//! screen supplies the available area and member rectangles and issues the
//! final configure.

use std::cmp::Ordering;

use crate::wm::geometry::Rect;
use crate::wm::settings::{ColDirection, PlacementPolicy, RowDirection};

/// Cascade placement offset, relative to the available area's origin.
const CASCADE_ORIGIN: i32 = 32;

/// Cursor for cascade placement. Both axes always move together: the cursor
/// is advanced diagonally and reset as a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CascadeCursor {
    pub x: i32,
    pub y: i32,
}

impl CascadeCursor {
    pub fn new() -> Self {
        Self {
            x: CASCADE_ORIGIN,
            y: CASCADE_ORIGIN,
        }
    }

    /// Back to the sentinel offset; the next placement re-anchors to the
    /// available area's origin.
    pub fn reset(&mut self) {
        self.x = CASCADE_ORIGIN;
        self.y = CASCADE_ORIGIN;
    }

    /// Step diagonally to the next cascade position.
    pub fn advance(&mut self, step: i32) {
        self.x += step;
        self.y += step;
    }

    fn at_sentinel(&self) -> bool {
        self.x == CASCADE_ORIGIN
    }
}

impl Default for CascadeCursor {
    fn default() -> Self {
        Self::new()
    }
}

/// Subtract an obstruction from a set of free rectangles.
///
/// Free rectangles untouched by `win` pass through unchanged; each one `win`
/// intersects is replaced by up to four residuals (left of, above, right of,
/// below the obstruction), clipped to the original rectangle and emitted only
/// with positive extent. The result over-covers free space rather than
/// partitioning it minimally: residuals of one rectangle may overlap. The
/// sort-and-pick-first step downstream tolerates the overlap.
pub fn calc_space(win: &Rect, spaces: &[Rect]) -> Vec<Rect> {
    let mut result = Vec::with_capacity(spaces.len());
    for curr in spaces {
        if !win.intersects(curr) {
            result.push(*curr);
            continue;
        }
        // Space to the left of the window
        if win.x > curr.x {
            result.push(Rect::new(
                curr.x,
                curr.y,
                (win.x - curr.x) as u32,
                curr.height,
            ));
        }
        // Space above the window
        if win.y > curr.y {
            result.push(Rect::new(
                curr.x,
                curr.y,
                curr.width,
                (win.y - curr.y) as u32,
            ));
        }
        // Space to the right of the window
        if win.right() < curr.right() {
            result.push(Rect::new(
                win.right(),
                curr.y,
                (curr.right() - win.right()) as u32,
                curr.height,
            ));
        }
        // Space below the window
        if win.bottom() < curr.bottom() {
            result.push(Rect::new(
                curr.x,
                win.bottom(),
                curr.width,
                (curr.bottom() - win.bottom()) as u32,
            ));
        }
    }
    result
}

fn vertical_cmp(dir: ColDirection, a: &Rect, b: &Rect) -> Ordering {
    match dir {
        ColDirection::TopBottom => a.y.cmp(&b.y),
        ColDirection::BottomTop => b.bottom().cmp(&a.bottom()),
    }
}

fn horizontal_cmp(dir: RowDirection, a: &Rect, b: &Rect) -> Ordering {
    match dir {
        RowDirection::LeftRight => a.x.cmp(&b.x),
        RowDirection::RightLeft => b.right().cmp(&a.right()),
    }
}

/// Free-rectangle ordering for the smart-placement scan.
///
/// Row-major policies scan rows first (vertical key primary), column-major
/// policies scan columns first; each axis honors its direction setting, and
/// ties on the primary axis fall through to the secondary one. One comparator
/// covers all eight orderings.
fn free_space_ordering(
    policy: PlacementPolicy,
    row_dir: RowDirection,
    col_dir: ColDirection,
    a: &Rect,
    b: &Rect,
) -> Ordering {
    if policy == PlacementPolicy::ColSmart {
        horizontal_cmp(row_dir, a, b).then_with(|| vertical_cmp(col_dir, a, b))
    } else {
        vertical_cmp(col_dir, a, b).then_with(|| horizontal_cmp(row_dir, a, b))
    }
}

/// Find a free spot for `win` among the space left over by `occupied`.
///
/// Seeds the free set with the whole available area, subtracts every occupied
/// rectangle, sorts the fragments in the configured scan order and takes the
/// first one large enough. On success `win`'s position is updated (anchored
/// to the fragment's right/bottom edge when the matching direction is
/// reversed) and `true` is returned. `false` means nothing fits and the
/// caller should cascade instead.
pub fn smart_placement(
    win: &mut Rect,
    available: &Rect,
    occupied: &[Rect],
    policy: PlacementPolicy,
    row_dir: RowDirection,
    col_dir: ColDirection,
) -> bool {
    let mut spaces = vec![*available];
    for rect in occupied {
        spaces = calc_space(rect, &spaces);
    }

    spaces.sort_by(|a, b| free_space_ordering(policy, row_dir, col_dir, a, b));

    let Some(found) = spaces
        .iter()
        .find(|space| space.width >= win.width && space.height >= win.height)
    else {
        return false;
    };

    win.x = found.x;
    win.y = found.y;
    if row_dir == RowDirection::RightLeft {
        win.x = found.right() - win.width as i32;
    }
    if col_dir == ColDirection::BottomTop {
        win.y = found.bottom() - win.height as i32;
    }
    true
}

/// Position `win` at the cascade cursor.
///
/// The cursor resets to its sentinel once it passes half the available area,
/// and a sentinel cursor is re-anchored to the area's origin before use. The
/// cursor is *not* advanced here; `Screen::place_window` advances it after a
/// cascade, so calling this twice without an intervening advance yields the
/// same spot both times.
pub fn cascade_placement(win: &mut Rect, cursor: &mut CascadeCursor, available: &Rect) {
    if cursor.x > (available.width / 2) as i32 || cursor.y > (available.height / 2) as i32 {
        cursor.reset();
    }

    if cursor.at_sentinel() {
        cursor.x += available.x;
        cursor.y += available.y;
    }

    win.x = cursor.x;
    win.y = cursor.y;
}
