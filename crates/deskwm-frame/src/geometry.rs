//! Pure geometry for frames: content rectangles, minimum sizes and
//! classification of pointer positions into frame regions.
//!
//! Nothing in here talks to the display server.

use deskwm_config::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i16,
    pub y: i16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    pub const fn new(x: i16, y: i16, width: u16, height: u16) -> Self {
        Self { x, y, width, height }
    }

    pub fn same_size(&self, other: &Rect) -> bool {
        self.width == other.width && self.height == other.height
    }

    pub fn same_position(&self, other: &Rect) -> bool {
        self.x == other.x && self.y == other.y
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    pub width: u16,
    pub height: u16,
}

impl Size {
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// A pointer position in root coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i16,
    pub y: i16,
}

impl Point {
    pub const fn new(x: i16, y: i16) -> Self {
        Self { x, y }
    }
}

/// Decoration sizes in pixels, derived from a [`Theme`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metrics {
    pub border_width: u16,
    pub title_height: u16,
    pub button_width: u16,
    pub padding: u16,
}

impl Metrics {
    pub fn from_theme(theme: &Theme) -> Self {
        Self {
            border_width: scale_to_pixels(theme.border_width, theme.scale),
            title_height: scale_to_pixels(theme.title_height, theme.scale),
            button_width: scale_to_pixels(theme.button_width, theme.scale),
            padding: scale_to_pixels(theme.padding, theme.scale),
        }
    }

    /// Width of the trailing title bar region kept in its own surface.
    pub fn corner_width(&self) -> u16 {
        self.title_height.saturating_add(self.border_width)
    }

    /// Where the client sits inside its decoration window.
    pub fn client_offset(&self) -> (i16, i16) {
        (clamp_i16(self.border_width as i32), clamp_i16(self.title_height as i32))
    }
}

pub fn scale_to_pixels(value: u16, scale: f32) -> u16 {
    (value as f32 * scale).round().clamp(0.0, u16::MAX as f32) as u16
}

pub(crate) fn clamp_i16(value: i32) -> i16 {
    value.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

pub(crate) fn clamp_u16(value: i32) -> u16 {
    value.clamp(0, u16::MAX as i32) as u16
}

/// Smallest outer size a frame may have. Borderless frames are unconstrained.
pub fn min_outer_size(min: Size, metrics: &Metrics, framed: bool) -> Size {
    if !framed {
        return Size::default();
    }
    Size {
        width: min
            .width
            .saturating_add(metrics.border_width.saturating_mul(2)),
        height: min
            .height
            .saturating_add(metrics.border_width)
            .saturating_add(metrics.title_height),
    }
}

/// Grow `outer` up to the minimum-size invariant. Identity when not framed.
pub fn constrain_outer(outer: Rect, min: Size, metrics: &Metrics, framed: bool) -> Rect {
    let floor = min_outer_size(min, metrics, framed);
    Rect {
        width: outer.width.max(floor.width),
        height: outer.height.max(floor.height),
        ..outer
    }
}

/// Content rectangle, in root coordinates, for an outer frame rectangle.
///
/// The outer size is clamped first, so the result never undercuts the
/// client's minimum size.
pub fn inner_from_outer(outer: Rect, min: Size, metrics: &Metrics, framed: bool) -> Rect {
    if !framed {
        return outer;
    }
    let outer = constrain_outer(outer, min, metrics, framed);
    let (dx, dy) = metrics.client_offset();
    Rect {
        x: outer.x.saturating_add(dx),
        y: outer.y.saturating_add(dy),
        width: outer
            .width
            .saturating_sub(metrics.border_width.saturating_mul(2)),
        height: outer
            .height
            .saturating_sub(metrics.border_width)
            .saturating_sub(metrics.title_height),
    }
}

/// Outer frame rectangle enclosing a content rectangle.
pub fn outer_from_inner(inner: Rect, metrics: &Metrics, framed: bool) -> Rect {
    if !framed {
        return inner;
    }
    let (dx, dy) = metrics.client_offset();
    Rect {
        x: inner.x.saturating_sub(dx),
        y: inner.y.saturating_sub(dy),
        width: inner
            .width
            .saturating_add(metrics.border_width.saturating_mul(2)),
        height: inner
            .height
            .saturating_add(metrics.border_width)
            .saturating_add(metrics.title_height),
    }
}

/// Region of a frame under a point.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Zone {
    TitleBar,
    BottomLeft,
    BottomRight,
    Bottom,
    Left,
    Right,
    Center,
    None,
}

/// Classify a point relative to the frame's top-left corner.
///
/// The title bar wins over everything else, corners win over edges.
pub fn hit_zone(rel_x: i32, rel_y: i32, width: u16, height: u16, metrics: &Metrics) -> Zone {
    let w = width as i32;
    let h = height as i32;
    let button = metrics.button_width as i32;

    if rel_x < 0 || rel_y < 0 || rel_x >= w || rel_y >= h {
        return Zone::None;
    }

    if rel_y <= metrics.title_height as i32 {
        return Zone::TitleBar;
    }

    if rel_y >= h - button {
        return if rel_x < button {
            Zone::BottomLeft
        } else if rel_x >= w - button {
            Zone::BottomRight
        } else {
            Zone::Bottom
        };
    }

    if rel_x < button {
        Zone::Left
    } else if rel_x >= w - button {
        Zone::Right
    } else {
        Zone::Center
    }
}

/// Title bar buttons, left to right.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ButtonAction {
    Close,
    ToggleMaximize,
    Iconify,
    None,
}

impl ButtonAction {
    pub const SLOTS: [ButtonAction; 3] = [
        ButtonAction::Close,
        ButtonAction::ToggleMaximize,
        ButtonAction::Iconify,
    ];
}

/// Left edge of a button slot relative to the frame, or `None` for `ButtonAction::None`.
pub fn button_origin(action: ButtonAction, metrics: &Metrics) -> Option<i32> {
    let slot = ButtonAction::SLOTS.iter().position(|&a| a == action)? as i32;
    let stride = metrics.button_width as i32 + metrics.padding as i32;
    Some(metrics.border_width as i32 + slot * stride)
}

/// Resolve a point in the title bar to the button slot under it.
pub fn button_zone(rel_x: i32, rel_y: i32, metrics: &Metrics) -> ButtonAction {
    if rel_y < 0 || rel_y > metrics.title_height as i32 {
        return ButtonAction::None;
    }

    let offset = rel_x - metrics.border_width as i32;
    if offset < 0 {
        return ButtonAction::None;
    }

    let button = metrics.button_width as i32;
    let stride = button + metrics.padding as i32;
    if offset % stride >= button {
        return ButtonAction::None;
    }

    ButtonAction::SLOTS
        .get((offset / stride) as usize)
        .copied()
        .unwrap_or(ButtonAction::None)
}

/// Pointer shape shown over a frame region.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum CursorShape {
    Normal,
    Close,
    ResizeBottom,
    ResizeBottomLeft,
    ResizeBottomRight,
    ResizeLeft,
    ResizeRight,
}

pub fn cursor_for(zone: Zone, button: ButtonAction) -> CursorShape {
    match zone {
        Zone::TitleBar if button == ButtonAction::Close => CursorShape::Close,
        Zone::BottomLeft => CursorShape::ResizeBottomLeft,
        Zone::BottomRight => CursorShape::ResizeBottomRight,
        Zone::Bottom => CursorShape::ResizeBottom,
        Zone::Left => CursorShape::ResizeLeft,
        Zone::Right => CursorShape::ResizeRight,
        _ => CursorShape::Normal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(border: u16, title: u16, button: u16, padding: u16) -> Metrics {
        Metrics {
            border_width: border,
            title_height: title,
            button_width: button,
            padding,
        }
    }

    #[test]
    fn test_requested_size_clamps_to_minimum() {
        let m = metrics(2, 24, 32, 4);
        let min = Size::new(200, 100);
        let outer = constrain_outer(Rect::new(10, 20, 150, 80), min, &m, true);
        assert_eq!(outer, Rect::new(10, 20, 204, 126));

        let inner = inner_from_outer(Rect::new(10, 20, 150, 80), min, &m, true);
        assert_eq!(inner, Rect::new(12, 44, 200, 100));
    }

    #[test]
    fn test_borderless_is_identity() {
        let m = metrics(4, 24, 32, 4);
        let outer = Rect::new(5, 6, 10, 10);
        assert_eq!(inner_from_outer(outer, Size::new(300, 300), &m, false), outer);
        assert_eq!(outer_from_inner(outer, &m, false), outer);
    }

    #[test]
    fn test_inner_outer_round_trip() {
        let m = metrics(4, 24, 32, 4);
        let min = Size::new(50, 40);
        for outer in [
            Rect::new(0, 0, 58, 68),
            Rect::new(-30, 15, 800, 600),
            Rect::new(100, 100, 1920, 1080),
        ] {
            let inner = inner_from_outer(outer, min, &m, true);
            assert_eq!(outer_from_inner(inner, &m, true), outer);
        }
    }

    #[test]
    fn test_scale_metrics() {
        let theme = Theme {
            scale: 1.5,
            ..Theme::default()
        };
        let m = Metrics::from_theme(&theme);
        assert_eq!(m.border_width, 6);
        assert_eq!(m.title_height, 36);
        assert_eq!(m.button_width, 48);
        assert_eq!(m.padding, 6);
    }

    #[test]
    fn test_hit_zone_regions() {
        let m = metrics(4, 24, 32, 4);
        let (w, h) = (400, 300);

        assert_eq!(hit_zone(100, 10, w, h, &m), Zone::TitleBar);
        assert_eq!(hit_zone(100, 24, w, h, &m), Zone::TitleBar);
        assert_eq!(hit_zone(5, 290, w, h, &m), Zone::BottomLeft);
        assert_eq!(hit_zone(395, 290, w, h, &m), Zone::BottomRight);
        assert_eq!(hit_zone(200, 290, w, h, &m), Zone::Bottom);
        assert_eq!(hit_zone(5, 100, w, h, &m), Zone::Left);
        assert_eq!(hit_zone(395, 100, w, h, &m), Zone::Right);
        assert_eq!(hit_zone(200, 100, w, h, &m), Zone::Center);
        assert_eq!(hit_zone(-1, 100, w, h, &m), Zone::None);
        assert_eq!(hit_zone(200, 300, w, h, &m), Zone::None);
    }

    #[test]
    fn test_title_bar_wins_on_short_frames() {
        let m = metrics(4, 24, 32, 4);
        // bottom band starts at 40 - 32 = 8, inside the title bar
        assert_eq!(hit_zone(2, 10, 200, 40, &m), Zone::TitleBar);
        assert_eq!(hit_zone(2, 30, 200, 40, &m), Zone::BottomLeft);
    }

    #[test]
    fn test_button_slots() {
        let (b, t, bw, p) = (4, 24, 32, 4);
        let m = metrics(b, t, bw, p);
        let mid_y = (t / 2) as i32;
        let (b, bw, p) = (b as i32, bw as i32, p as i32);

        assert_eq!(button_zone(b + bw / 2, mid_y, &m), ButtonAction::Close);
        assert_eq!(button_zone(b + bw + p + bw / 2, mid_y, &m), ButtonAction::ToggleMaximize);
        assert_eq!(button_zone(b + 2 * (bw + p) + bw / 2, mid_y, &m), ButtonAction::Iconify);
        assert_eq!(button_zone(b + bw / 2, t as i32 + 1, &m), ButtonAction::None);
        // padding between close and maximize
        assert_eq!(button_zone(b + bw + 1, mid_y, &m), ButtonAction::None);
        assert_eq!(button_zone(b - 1, mid_y, &m), ButtonAction::None);
        assert_eq!(button_zone(b + 3 * (bw + p) + 1, mid_y, &m), ButtonAction::None);
    }

    #[test]
    fn test_button_origin_matches_zone() {
        let m = metrics(4, 24, 32, 4);
        for action in ButtonAction::SLOTS {
            let x = button_origin(action, &m).unwrap();
            assert_eq!(button_zone(x, 1, &m), action);
        }
        assert_eq!(button_origin(ButtonAction::None, &m), None);
    }

    #[test]
    fn test_cursor_mapping() {
        assert_eq!(cursor_for(Zone::TitleBar, ButtonAction::Close), CursorShape::Close);
        assert_eq!(cursor_for(Zone::TitleBar, ButtonAction::Iconify), CursorShape::Normal);
        assert_eq!(cursor_for(Zone::BottomLeft, ButtonAction::None), CursorShape::ResizeBottomLeft);
        assert_eq!(cursor_for(Zone::Center, ButtonAction::None), CursorShape::Normal);
    }
}
