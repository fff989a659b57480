//! Per-frame pointer state machine.
//!
//! `Idle -> Pressed -> {Dragging, Idle}`. Every transition is driven
//! synchronously by one pointer event and yields an intent (a new geometry,
//! a cursor hint or a button action) for the lifecycle layer to apply.

use crate::geometry::{
    button_zone, clamp_i16, clamp_u16, cursor_for, hit_zone, ButtonAction, CursorShape, Metrics,
    Point, Rect, Size, Zone,
};

/// Which edges follow the pointer during a resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeEdge {
    Bottom,
    Left,
    Right,
    BottomLeft,
    BottomRight,
}

impl ResizeEdge {
    pub fn from_zone(zone: Zone) -> Option<Self> {
        match zone {
            Zone::Bottom => Some(Self::Bottom),
            Zone::Left => Some(Self::Left),
            Zone::Right => Some(Self::Right),
            Zone::BottomLeft => Some(Self::BottomLeft),
            Zone::BottomRight => Some(Self::BottomRight),
            Zone::TitleBar | Zone::Center | Zone::None => None,
        }
    }

    fn bottom(self) -> bool {
        matches!(self, Self::Bottom | Self::BottomLeft | Self::BottomRight)
    }

    fn left(self) -> bool {
        matches!(self, Self::Left | Self::BottomLeft)
    }

    fn right(self) -> bool {
        matches!(self, Self::Right | Self::BottomRight)
    }

    fn cursor(self) -> CursorShape {
        match self {
            Self::Bottom => CursorShape::ResizeBottom,
            Self::Left => CursorShape::ResizeLeft,
            Self::Right => CursorShape::ResizeRight,
            Self::BottomLeft => CursorShape::ResizeBottomLeft,
            Self::BottomRight => CursorShape::ResizeBottomRight,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMode {
    Move,
    Resize(ResizeEdge),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interaction {
    #[default]
    Idle,
    /// Button down, pointer has not moved yet. `last` is the drag anchor and
    /// `button` the title bar button under the press, if any.
    Pressed {
        last: Point,
        mode: DragMode,
        button: ButtonAction,
    },
    Dragging {
        last: Point,
        mode: DragMode,
        button: ButtonAction,
    },
}

impl Interaction {
    pub fn mode(&self) -> Option<DragMode> {
        match *self {
            Interaction::Idle => None,
            Interaction::Pressed { mode, .. } | Interaction::Dragging { mode, .. } => Some(mode),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Interaction::Idle)
    }

    /// Start an interaction. Title bar and center presses move the frame,
    /// edge and corner presses resize it.
    pub fn press(&mut self, pointer: Point, frame: Rect, metrics: &Metrics) -> DragMode {
        let rel_x = pointer.x as i32 - frame.x as i32;
        let rel_y = pointer.y as i32 - frame.y as i32;
        let zone = hit_zone(rel_x, rel_y, frame.width, frame.height, metrics);
        let mode = ResizeEdge::from_zone(zone).map_or(DragMode::Move, DragMode::Resize);
        *self = Interaction::Pressed {
            last: pointer,
            mode,
            button: button_zone(rel_x, rel_y, metrics),
        };
        mode
    }

    /// Cursor to show for the pointer position. Never changes state.
    pub fn cursor_hint(&self, pointer: Point, frame: Rect, metrics: &Metrics) -> CursorShape {
        if let Some(DragMode::Resize(edge)) = self.mode() {
            return edge.cursor();
        }
        let rel_x = pointer.x as i32 - frame.x as i32;
        let rel_y = pointer.y as i32 - frame.y as i32;
        let zone = hit_zone(rel_x, rel_y, frame.width, frame.height, metrics);
        cursor_for(zone, button_zone(rel_x, rel_y, metrics))
    }

    /// Apply the pointer delta since the previous event. Returns the new
    /// outer geometry, or `None` when nothing moved or no press is active.
    pub fn drag(&mut self, pointer: Point, frame: Rect, min_outer: Size) -> Option<Rect> {
        let (last, mode, button) = match *self {
            Interaction::Idle => return None,
            Interaction::Pressed { last, mode, button }
            | Interaction::Dragging { last, mode, button } => (last, mode, button),
        };

        let dx = pointer.x as i32 - last.x as i32;
        let dy = pointer.y as i32 - last.y as i32;
        if dx == 0 && dy == 0 {
            return None;
        }

        *self = Interaction::Dragging {
            last: pointer,
            mode,
            button,
        };
        Some(apply_drag(frame, mode, dx, dy, min_outer))
    }

    /// End the interaction. A release in the title bar resolves to the
    /// button under the pointer, whether or not the pointer moved, as long
    /// as it is the button the press started on.
    pub fn release(&mut self, pointer: Point, frame: Rect, metrics: &Metrics) -> ButtonAction {
        let pressed = match std::mem::take(self) {
            Interaction::Idle => return ButtonAction::None,
            Interaction::Pressed { button, .. } | Interaction::Dragging { button, .. } => button,
        };
        let released = button_zone(
            pointer.x as i32 - frame.x as i32,
            pointer.y as i32 - frame.y as i32,
            metrics,
        );
        if released == pressed {
            released
        } else {
            ButtonAction::None
        }
    }
}

/// Geometry after moving the pointer by `(dx, dy)` in `mode`.
///
/// Resizes never go below `min_outer` (or one pixel). A left resize keeps
/// the right edge where it is, so a clamped width also stops the x shift.
pub fn apply_drag(frame: Rect, mode: DragMode, dx: i32, dy: i32, min_outer: Size) -> Rect {
    let edge = match mode {
        DragMode::Move => {
            return Rect {
                x: clamp_i16(frame.x as i32 + dx),
                y: clamp_i16(frame.y as i32 + dy),
                ..frame
            };
        }
        DragMode::Resize(edge) => edge,
    };

    let min_width = min_outer.width.max(1) as i32;
    let min_height = min_outer.height.max(1) as i32;
    let width = frame.width as i32;
    let mut next = frame;

    if edge.bottom() {
        next.height = clamp_u16((frame.height as i32 + dy).max(min_height));
    }
    if edge.left() {
        let new_width = (width - dx).max(min_width);
        next.width = clamp_u16(new_width);
        next.x = clamp_i16(frame.x as i32 + width - next.width as i32);
    } else if edge.right() {
        next.width = clamp_u16((width + dx).max(min_width));
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    const METRICS: Metrics = Metrics {
        border_width: 4,
        title_height: 24,
        button_width: 32,
        padding: 4,
    };

    fn frame() -> Rect {
        Rect::new(100, 100, 400, 300)
    }

    #[test]
    fn test_press_selects_mode_from_zone() {
        let mut state = Interaction::default();
        assert_eq!(state.press(Point::new(300, 110), frame(), &METRICS), DragMode::Move);
        assert_eq!(
            state.press(Point::new(105, 395), frame(), &METRICS),
            DragMode::Resize(ResizeEdge::BottomLeft)
        );
        assert_eq!(
            state.press(Point::new(495, 395), frame(), &METRICS),
            DragMode::Resize(ResizeEdge::BottomRight)
        );
        assert_eq!(
            state.press(Point::new(300, 395), frame(), &METRICS),
            DragMode::Resize(ResizeEdge::Bottom)
        );
        assert_eq!(
            state.press(Point::new(105, 250), frame(), &METRICS),
            DragMode::Resize(ResizeEdge::Left)
        );
        assert_eq!(state.press(Point::new(300, 250), frame(), &METRICS), DragMode::Move);
    }

    #[test]
    fn test_bottom_left_drag_shifts_x_and_shrinks_width() {
        let min = Size::new(58, 68);
        for dx in [1i16, 7, 50, 200] {
            let mut state = Interaction::default();
            state.press(Point::new(105, 395), frame(), &METRICS);
            let next = state
                .drag(Point::new(105 + dx, 395 + 3), frame(), min)
                .unwrap();
            assert_eq!(next.width, 400 - dx as u16);
            assert_eq!(next.x, 100 + dx);
            assert_eq!(next.height, 303);
            assert_eq!(next.y, 100);
        }
    }

    #[test]
    fn test_left_resize_clamps_without_drifting() {
        let min = Size::new(58, 68);
        let mut state = Interaction::default();
        state.press(Point::new(105, 395), frame(), &METRICS);
        let next = state.drag(Point::new(705, 395), frame(), min).unwrap();
        assert_eq!(next.width, 58);
        // right edge stays at 500
        assert_eq!(next.x as i32 + next.width as i32, 500);
    }

    #[test]
    fn test_bottom_resize_never_below_minimum() {
        let min = Size::new(58, 68);
        let mut state = Interaction::default();
        state.press(Point::new(300, 395), frame(), &METRICS);
        let next = state.drag(Point::new(300, -1000), frame(), min).unwrap();
        assert_eq!(next.height, 68);
        assert_eq!(next.width, 400);
    }

    #[test]
    fn test_drag_deltas_are_incremental() {
        let mut state = Interaction::default();
        let mut geometry = frame();
        state.press(Point::new(300, 110), geometry, &METRICS);

        geometry = state.drag(Point::new(310, 115), geometry, Size::default()).unwrap();
        assert_eq!((geometry.x, geometry.y), (110, 105));
        geometry = state.drag(Point::new(312, 115), geometry, Size::default()).unwrap();
        assert_eq!((geometry.x, geometry.y), (112, 105));
        assert_eq!((geometry.width, geometry.height), (400, 300));
    }

    #[test]
    fn test_zero_delta_and_idle_drag_are_no_ops() {
        let mut state = Interaction::default();
        assert_eq!(state.drag(Point::new(1, 1), frame(), Size::default()), None);

        state.press(Point::new(300, 110), frame(), &METRICS);
        assert_eq!(state.drag(Point::new(300, 110), frame(), Size::default()), None);
        assert!(matches!(state, Interaction::Pressed { .. }));
    }

    #[test]
    fn test_release_after_click_resolves_button() {
        let mut state = Interaction::default();
        let close = Point::new(100 + 4 + 16, 100 + 12);
        state.press(close, frame(), &METRICS);
        assert_eq!(state.release(close, frame(), &METRICS), ButtonAction::Close);
        assert!(state.is_idle());

        let below_title = Point::new(100 + 4 + 16, 100 + 25);
        state.press(below_title, frame(), &METRICS);
        assert_eq!(state.release(below_title, frame(), &METRICS), ButtonAction::None);
    }

    #[test]
    fn test_release_after_small_drag_still_fires_button() {
        let mut state = Interaction::default();
        let close = Point::new(100 + 4 + 16, 100 + 12);
        state.press(close, frame(), &METRICS);
        let moved = state
            .drag(Point::new(close.x + 5, close.y), frame(), Size::default())
            .unwrap();
        let release = Point::new(moved.x + 20, moved.y + 12);
        assert_eq!(state.release(release, moved, &METRICS), ButtonAction::Close);
        assert!(state.is_idle());
    }

    #[test]
    fn test_release_over_another_button_fires_nothing() {
        let mut state = Interaction::default();
        let close = Point::new(100 + 4 + 16, 100 + 12);
        state.press(close, frame(), &METRICS);
        // second slot starts at 4 + 32 + 4
        let maximize = Point::new(100 + 40 + 16, 100 + 12);
        assert_eq!(state.release(maximize, frame(), &METRICS), ButtonAction::None);

        // a move started on the bare title bar ends over the close button
        let title = Point::new(300, 112);
        state.press(title, frame(), &METRICS);
        let moved = state
            .drag(Point::new(120, 112), frame(), Size::default())
            .unwrap();
        let over_close = Point::new(moved.x + 20, moved.y + 12);
        assert_eq!(state.release(over_close, moved, &METRICS), ButtonAction::None);
        assert!(state.is_idle());
    }

    #[test]
    fn test_cursor_hint_follows_zone_and_active_resize() {
        let mut state = Interaction::default();
        assert_eq!(
            state.cursor_hint(Point::new(495, 395), frame(), &METRICS),
            CursorShape::ResizeBottomRight
        );
        assert_eq!(
            state.cursor_hint(Point::new(100 + 4 + 16, 110), frame(), &METRICS),
            CursorShape::Close
        );
        assert_eq!(state, Interaction::Idle);

        state.press(Point::new(105, 250), frame(), &METRICS);
        assert_eq!(
            state.cursor_hint(Point::new(300, 250), frame(), &METRICS),
            CursorShape::ResizeLeft
        );
    }
}
