//! Contract with the display server.
//!
//! Every call is a synchronous round trip that either succeeds or reports
//! why the server refused it. The window manager binary implements this on
//! top of an x11rb connection; tests use a recording fake.

use thiserror::Error;
use x11rb::errors::{ConnectionError, ReplyError, ReplyOrIdError};

pub use x11rb::protocol::xproto::{Drawable, Gcontext, Pixmap, Window};

use crate::geometry::{CursorShape, Rect};

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("connection error: {0}")]
    Connection(#[from] ConnectionError),

    #[error("request failed: {0}")]
    Reply(#[from] ReplyError),

    #[error("id allocation failed: {0}")]
    Id(#[from] ReplyOrIdError),

    #[error("{operation} rejected: {reason}")]
    Rejected {
        operation: &'static str,
        reason: String,
    },
}

impl GatewayError {
    /// The connection itself is gone; nothing else will succeed.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            GatewayError::Connection(_)
                | GatewayError::Reply(ReplyError::ConnectionError(_))
                | GatewayError::Id(ReplyOrIdError::ConnectionError(_))
        )
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Byte layout the server expects for 32 bits-per-pixel Z images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelLayout {
    /// LSB-first servers: blue, green, red, pad.
    Bgrx,
    /// MSB-first servers: pad, red, green, blue.
    Xrgb,
}

/// ICCCM `WM_STATE` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WmState {
    Withdrawn,
    Normal,
    Iconic,
}

/// Decoration extents published to clients: left, right, top, bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameExtents {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
}

pub trait ProtocolGateway {
    fn root(&self) -> Window;
    fn depth(&self) -> u8;
    /// Full available screen rectangle, used for maximize and fullscreen.
    fn screen_rect(&self) -> Rect;
    fn pixel_layout(&self) -> PixelLayout;
    /// Largest pixel payload a single put-image request may carry.
    fn max_image_bytes(&self) -> usize;

    /// Create an input/output child of the root that receives frame events.
    fn create_window(&self, rect: Rect, background: u32) -> GatewayResult<Window>;
    fn destroy_window(&self, window: Window) -> GatewayResult<()>;
    fn reparent_window(&self, window: Window, parent: Window, x: i16, y: i16) -> GatewayResult<()>;
    fn map_window(&self, window: Window) -> GatewayResult<()>;
    fn unmap_window(&self, window: Window) -> GatewayResult<()>;
    fn configure_window(&self, window: Window, rect: Rect) -> GatewayResult<()>;
    fn raise_window(&self, window: Window) -> GatewayResult<()>;
    fn focus_window(&self, window: Window) -> GatewayResult<()>;
    fn change_save_set(&self, window: Window, insert: bool) -> GatewayResult<()>;
    fn set_cursor(&self, window: Window, cursor: CursorShape) -> GatewayResult<()>;
    fn set_wm_state(&self, window: Window, state: WmState) -> GatewayResult<()>;
    fn set_frame_extents(&self, window: Window, extents: FrameExtents) -> GatewayResult<()>;

    fn create_pixel_surface(&self, width: u16, height: u16, depth: u8) -> GatewayResult<Pixmap>;
    fn free_pixel_surface(&self, surface: Pixmap) -> GatewayResult<()>;
    fn create_draw_context(&self, drawable: Drawable, color: u32) -> GatewayResult<Gcontext>;
    fn free_draw_context(&self, gc: Gcontext) -> GatewayResult<()>;
    fn copy_area(
        &self,
        src: Drawable,
        dst: Drawable,
        gc: Gcontext,
        src_rect: Rect,
        dst_x: i16,
        dst_y: i16,
    ) -> GatewayResult<()>;
    #[allow(clippy::too_many_arguments)]
    fn put_image(
        &self,
        surface: Pixmap,
        gc: Gcontext,
        width: u16,
        height: u16,
        dst_x: i16,
        dst_y: i16,
        depth: u8,
        data: &[u8],
    ) -> GatewayResult<()>;
    /// Draw text with the server's core font at baseline `(x, y)`.
    fn draw_text(
        &self,
        window: Window,
        x: i16,
        y: i16,
        text: &str,
        color: u32,
        background: u32,
    ) -> GatewayResult<()>;

    /// Ask the client to close, or kill it if it cannot be asked.
    fn close_client(&self, window: Window) -> GatewayResult<()>;
    fn flush(&self) -> GatewayResult<()>;
}
