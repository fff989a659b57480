use crate::gateway::{FrameExtents, Window};
use crate::geometry::{inner_from_outer, min_outer_size, CursorShape, Metrics, Rect, Size};
use crate::interaction::Interaction;
use crate::render::Decoration;

/// Decoration and geometry wrapper around one managed client window.
///
/// A frame never owns its client: the manager's registry does, and looks
/// frames up by either window id.
#[derive(Debug)]
pub struct Frame {
    client: Window,
    /// Decoration window, or the client itself when borderless.
    id: Window,
    geometry: Rect,
    framed: bool,
    min_size: Size,
    pub(crate) interaction: Interaction,
    pub(crate) decoration: Option<Decoration>,
    pub(crate) restore: Option<Rect>,
    pub(crate) iconified: bool,
    pub(crate) cursor: CursorShape,
    ignore_unmaps: u32,
}

impl Frame {
    pub fn new_framed(client: Window, id: Window, geometry: Rect, min_size: Size) -> Self {
        Self::new(client, id, geometry, min_size, true)
    }

    pub fn new_borderless(client: Window, geometry: Rect) -> Self {
        Self::new(client, client, geometry, Size::default(), false)
    }

    fn new(client: Window, id: Window, geometry: Rect, min_size: Size, framed: bool) -> Self {
        Self {
            client,
            id,
            geometry,
            framed,
            min_size,
            interaction: Interaction::Idle,
            decoration: None,
            restore: None,
            iconified: false,
            cursor: CursorShape::Normal,
            ignore_unmaps: 0,
        }
    }

    pub fn client(&self) -> Window {
        self.client
    }

    pub fn id(&self) -> Window {
        self.id
    }

    pub fn geometry(&self) -> Rect {
        self.geometry
    }

    pub(crate) fn set_geometry(&mut self, geometry: Rect) {
        self.geometry = geometry;
    }

    pub fn is_framed(&self) -> bool {
        self.framed
    }

    /// Owns a decoration window distinct from the client.
    pub fn has_decoration_window(&self) -> bool {
        self.id != self.client
    }

    /// Forget the decoration window. The client becomes its own borderless
    /// frame covering `content`.
    pub(crate) fn make_borderless(&mut self, content: Rect) {
        self.id = self.client;
        self.framed = false;
        self.geometry = content;
        self.restore = None;
        self.interaction = Interaction::Idle;
        self.cursor = CursorShape::Normal;
    }

    pub fn min_size(&self) -> Size {
        self.min_size
    }

    pub(crate) fn set_min_size(&mut self, min_size: Size) {
        self.min_size = min_size;
    }

    pub fn min_outer(&self, metrics: &Metrics) -> Size {
        min_outer_size(self.min_size, metrics, self.framed)
    }

    /// Client rectangle in root coordinates.
    pub fn content_geometry(&self, metrics: &Metrics, fullscreen: bool) -> Rect {
        if fullscreen {
            return self.geometry;
        }
        inner_from_outer(self.geometry, self.min_size, metrics, self.framed)
    }

    /// Client rectangle relative to the decoration window.
    pub fn content_offset_geometry(&self, metrics: &Metrics, fullscreen: bool) -> Rect {
        let inner = self.content_geometry(metrics, fullscreen);
        if !self.has_decoration_window() {
            return inner;
        }
        Rect {
            x: inner.x.saturating_sub(self.geometry.x),
            y: inner.y.saturating_sub(self.geometry.y),
            ..inner
        }
    }

    pub fn extents(&self, metrics: &Metrics) -> FrameExtents {
        if !self.framed {
            return FrameExtents::default();
        }
        let border = metrics.border_width as u32;
        FrameExtents {
            left: border,
            right: border,
            top: metrics.title_height as u32,
            bottom: border,
        }
    }

    pub fn is_maximized(&self) -> bool {
        self.restore.is_some()
    }

    pub fn is_iconified(&self) -> bool {
        self.iconified
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn decoration(&self) -> Option<&Decoration> {
        self.decoration.as_ref()
    }

    /// Note an unmap the manager is about to cause.
    pub(crate) fn expect_unmap(&mut self) {
        self.ignore_unmaps += 1;
    }

    /// Returns true if this unmap was caused by the manager.
    pub fn consume_unmap(&mut self) -> bool {
        if self.ignore_unmaps == 0 {
            return false;
        }
        self.ignore_unmaps -= 1;
        true
    }
}
