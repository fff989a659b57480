//! Recording gateway and trivial painter for unit tests.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use crate::gateway::{
    Drawable, FrameExtents, Gcontext, GatewayError, GatewayResult, PixelLayout, Pixmap,
    ProtocolGateway, Window, WmState,
};
use crate::geometry::{CursorShape, Rect};
use crate::render::{Image, TitleBarPainter, TitleBarSpec};

pub const ROOT: Window = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateWindow { id: Window, rect: Rect },
    DestroyWindow(Window),
    Reparent { window: Window, parent: Window, x: i16, y: i16 },
    Map(Window),
    Unmap(Window),
    Configure { window: Window, rect: Rect },
    Raise(Window),
    Focus(Window),
    SaveSet { window: Window, insert: bool },
    SetCursor { window: Window, cursor: CursorShape },
    SetWmState { window: Window, state: WmState },
    SetFrameExtents { window: Window, extents: FrameExtents },
    CreatePixelSurface { id: Pixmap, width: u16, height: u16 },
    FreePixelSurface(Pixmap),
    CreateDrawContext { id: Gcontext, drawable: Drawable },
    FreeDrawContext(Gcontext),
    CopyArea { src: Drawable, dst: Drawable, rect: Rect, dst_x: i16 },
    PutImage { surface: Pixmap, width: u16, height: u16, dst_y: i16, bytes: usize },
    DrawText { window: Window, text: String },
    CloseClient(Window),
}

#[derive(Debug, Clone, Copy)]
enum Failure {
    Always,
    Nth(usize),
}

pub struct RecordingGateway {
    calls: RefCell<Vec<Call>>,
    next_id: Cell<u32>,
    failures: RefCell<HashMap<&'static str, Failure>>,
    seen: RefCell<HashMap<&'static str, usize>>,
    screen: Rect,
    max_image_bytes: usize,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            next_id: Cell::new(0x100),
            failures: RefCell::new(HashMap::new()),
            seen: RefCell::new(HashMap::new()),
            screen: Rect::new(0, 0, 1920, 1080),
            max_image_bytes: 256 * 1024,
        }
    }

    pub fn with_max_image_bytes(mut self, bytes: usize) -> Self {
        self.max_image_bytes = bytes;
        self
    }

    pub fn fail_always(&self, operation: &'static str) {
        self.failures.borrow_mut().insert(operation, Failure::Always);
    }

    /// Fail the `n`th call (1-based) of `operation` from now on.
    pub fn fail_nth(&self, operation: &'static str, n: usize) {
        let already = self.seen.borrow().get(operation).copied().unwrap_or(0);
        self.failures
            .borrow_mut()
            .insert(operation, Failure::Nth(already + n));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.borrow().iter().filter(|c| pred(c)).count()
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }

    fn check(&self, operation: &'static str) -> GatewayResult<()> {
        let n = {
            let mut seen = self.seen.borrow_mut();
            let n = seen.entry(operation).or_insert(0);
            *n += 1;
            *n
        };
        let fail = match self.failures.borrow().get(operation) {
            Some(Failure::Always) => true,
            Some(Failure::Nth(target)) => *target == n,
            None => false,
        };
        if fail {
            return Err(GatewayError::Rejected {
                operation,
                reason: "rejected by test".to_string(),
            });
        }
        Ok(())
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    fn next_id(&self) -> u32 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }
}

impl ProtocolGateway for RecordingGateway {
    fn root(&self) -> Window {
        ROOT
    }

    fn depth(&self) -> u8 {
        24
    }

    fn screen_rect(&self) -> Rect {
        self.screen
    }

    fn pixel_layout(&self) -> PixelLayout {
        PixelLayout::Bgrx
    }

    fn max_image_bytes(&self) -> usize {
        self.max_image_bytes
    }

    fn create_window(&self, rect: Rect, _background: u32) -> GatewayResult<Window> {
        self.check("create_window")?;
        let id = self.next_id();
        self.record(Call::CreateWindow { id, rect });
        Ok(id)
    }

    fn destroy_window(&self, window: Window) -> GatewayResult<()> {
        self.check("destroy_window")?;
        self.record(Call::DestroyWindow(window));
        Ok(())
    }

    fn reparent_window(&self, window: Window, parent: Window, x: i16, y: i16) -> GatewayResult<()> {
        self.check("reparent_window")?;
        self.record(Call::Reparent { window, parent, x, y });
        Ok(())
    }

    fn map_window(&self, window: Window) -> GatewayResult<()> {
        self.check("map_window")?;
        self.record(Call::Map(window));
        Ok(())
    }

    fn unmap_window(&self, window: Window) -> GatewayResult<()> {
        self.check("unmap_window")?;
        self.record(Call::Unmap(window));
        Ok(())
    }

    fn configure_window(&self, window: Window, rect: Rect) -> GatewayResult<()> {
        self.check("configure_window")?;
        self.record(Call::Configure { window, rect });
        Ok(())
    }

    fn raise_window(&self, window: Window) -> GatewayResult<()> {
        self.check("raise_window")?;
        self.record(Call::Raise(window));
        Ok(())
    }

    fn focus_window(&self, window: Window) -> GatewayResult<()> {
        self.check("focus_window")?;
        self.record(Call::Focus(window));
        Ok(())
    }

    fn change_save_set(&self, window: Window, insert: bool) -> GatewayResult<()> {
        self.check("change_save_set")?;
        self.record(Call::SaveSet { window, insert });
        Ok(())
    }

    fn set_cursor(&self, window: Window, cursor: CursorShape) -> GatewayResult<()> {
        self.check("set_cursor")?;
        self.record(Call::SetCursor { window, cursor });
        Ok(())
    }

    fn set_wm_state(&self, window: Window, state: WmState) -> GatewayResult<()> {
        self.check("set_wm_state")?;
        self.record(Call::SetWmState { window, state });
        Ok(())
    }

    fn set_frame_extents(&self, window: Window, extents: FrameExtents) -> GatewayResult<()> {
        self.check("set_frame_extents")?;
        self.record(Call::SetFrameExtents { window, extents });
        Ok(())
    }

    fn create_pixel_surface(&self, width: u16, height: u16, _depth: u8) -> GatewayResult<Pixmap> {
        self.check("create_pixel_surface")?;
        let id = self.next_id();
        self.record(Call::CreatePixelSurface { id, width, height });
        Ok(id)
    }

    fn free_pixel_surface(&self, surface: Pixmap) -> GatewayResult<()> {
        self.check("free_pixel_surface")?;
        self.record(Call::FreePixelSurface(surface));
        Ok(())
    }

    fn create_draw_context(&self, drawable: Drawable, _color: u32) -> GatewayResult<Gcontext> {
        self.check("create_draw_context")?;
        let id = self.next_id();
        self.record(Call::CreateDrawContext { id, drawable });
        Ok(id)
    }

    fn free_draw_context(&self, gc: Gcontext) -> GatewayResult<()> {
        self.check("free_draw_context")?;
        self.record(Call::FreeDrawContext(gc));
        Ok(())
    }

    fn copy_area(
        &self,
        src: Drawable,
        dst: Drawable,
        _gc: Gcontext,
        src_rect: Rect,
        dst_x: i16,
        _dst_y: i16,
    ) -> GatewayResult<()> {
        self.check("copy_area")?;
        self.record(Call::CopyArea {
            src,
            dst,
            rect: src_rect,
            dst_x,
        });
        Ok(())
    }

    fn put_image(
        &self,
        surface: Pixmap,
        _gc: Gcontext,
        width: u16,
        height: u16,
        _dst_x: i16,
        dst_y: i16,
        _depth: u8,
        data: &[u8],
    ) -> GatewayResult<()> {
        self.check("put_image")?;
        assert_eq!(data.len(), width as usize * height as usize * 4);
        assert!(data.len() + 24 <= self.max_image_bytes);
        self.record(Call::PutImage {
            surface,
            width,
            height,
            dst_y,
            bytes: data.len(),
        });
        Ok(())
    }

    fn draw_text(
        &self,
        window: Window,
        _x: i16,
        _y: i16,
        text: &str,
        _color: u32,
        _background: u32,
    ) -> GatewayResult<()> {
        self.check("draw_text")?;
        self.record(Call::DrawText {
            window,
            text: text.to_string(),
        });
        Ok(())
    }

    fn close_client(&self, window: Window) -> GatewayResult<()> {
        self.check("close_client")?;
        self.record(Call::CloseClient(window));
        Ok(())
    }

    fn flush(&self) -> GatewayResult<()> {
        Ok(())
    }
}

/// Fills the title bar with the theme background.
pub struct FlatPainter;

impl TitleBarPainter for FlatPainter {
    fn paint(&self, spec: &TitleBarSpec<'_>) -> Image {
        let [_, r, g, b] = spec.theme.background.to_be_bytes();
        let pixels = spec.width as usize * spec.height as usize;
        let data = std::iter::repeat([r, g, b, 255])
            .take(pixels)
            .flatten()
            .collect();
        Image::from_rgba(spec.width, spec.height, data).expect("flat image size")
    }
}
