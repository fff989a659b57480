//! [`ProtocolGateway`] over the live X connection.
//!
//! Every request is checked so the frame layer sees refusals as they
//! happen instead of as stray error events later on.

use deskwm_frame::gateway::{Drawable, GatewayResult, Gcontext, Pixmap, Window};
use deskwm_frame::{CursorShape, FrameExtents, PixelLayout, ProtocolGateway, Rect, WmState};
use tracing::{debug, warn};
use x11rb::connection::{Connection, RequestConnection};
use x11rb::protocol::xproto::{
    AtomEnum, ChangeGCAux, ChangeWindowAttributesAux, ClientMessageData, ClientMessageEvent,
    ConfigureWindowAux, ConnectionExt, CreateGCAux, CreateWindowAux, EventMask, Font,
    ImageFormat, ImageOrder, InputFocus, PropMode, SetMode, StackMode, WindowClass,
    CLIENT_MESSAGE_EVENT,
};
use x11rb::wrapper::ConnectionExt as _;

use crate::core::context::Context;
use crate::window::cursors::Cursors;

/// Core text requests carry at most this many bytes per item.
const MAX_TEXT_BYTES: usize = 255;

/// Encode `text` for an 8-bit core font. Characters outside Latin-1
/// become `?`.
fn latin1(text: &str) -> Vec<u8> {
    text.chars()
        .take(MAX_TEXT_BYTES)
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

pub struct X11Gateway<'a> {
    ctx: &'a Context,
    cursors: Cursors,
    font: Option<Font>,
    text_gc: Gcontext,
    layout: PixelLayout,
    max_image_bytes: usize,
}

impl<'a> X11Gateway<'a> {
    pub fn new(ctx: &'a Context) -> anyhow::Result<Self> {
        let cursors = Cursors::new(&ctx.conn, ctx.screen_num)?;

        let font = ctx.conn.generate_id()?;
        let font = match ctx.conn.open_font(font, b"10x20")?.check() {
            Ok(()) => Some(font),
            Err(_) => match ctx.conn.open_font(font, b"fixed")?.check() {
                Ok(()) => Some(font),
                Err(e) => {
                    warn!("No core font available, titles will not be drawn: {}", e);
                    None
                }
            },
        };

        let text_gc = ctx.conn.generate_id()?;
        let mut values = CreateGCAux::new().graphics_exposures(0);
        if let Some(font) = font {
            values = values.font(font);
        }
        ctx.conn.create_gc(text_gc, ctx.root_window, &values)?.check()?;

        let layout = match ctx.conn.setup().image_byte_order {
            ImageOrder::MSB_FIRST => PixelLayout::Xrgb,
            _ => PixelLayout::Bgrx,
        };
        let max_image_bytes = ctx.conn.maximum_request_bytes();
        debug!(
            "Gateway ready: layout {:?}, max request {} bytes",
            layout, max_image_bytes
        );

        Ok(Self {
            ctx,
            cursors,
            font,
            text_gc,
            layout,
            max_image_bytes,
        })
    }

    fn supports_protocol(&self, window: Window, protocol: u32) -> GatewayResult<bool> {
        let reply = self
            .ctx
            .conn
            .get_property(
                false,
                window,
                self.ctx.atoms.WM_PROTOCOLS,
                AtomEnum::ATOM,
                0,
                64,
            )?
            .reply()?;
        Ok(reply
            .value32()
            .is_some_and(|mut atoms| atoms.any(|a| a == protocol)))
    }

    fn send_delete_window(&self, window: Window) -> GatewayResult<()> {
        let event = ClientMessageEvent {
            response_type: CLIENT_MESSAGE_EVENT,
            format: 32,
            window,
            type_: self.ctx.atoms.WM_PROTOCOLS,
            data: ClientMessageData::from([
                self.ctx.atoms.WM_DELETE_WINDOW,
                x11rb::CURRENT_TIME,
                0,
                0,
                0,
            ]),
            sequence: 0,
        };
        self.ctx
            .conn
            .send_event(false, window, EventMask::NO_EVENT, event)?
            .check()?;
        Ok(())
    }
}

impl Drop for X11Gateway<'_> {
    fn drop(&mut self) {
        let _ = self.ctx.conn.free_gc(self.text_gc);
        if let Some(font) = self.font {
            let _ = self.ctx.conn.close_font(font);
        }
    }
}

impl ProtocolGateway for X11Gateway<'_> {
    fn root(&self) -> Window {
        self.ctx.root_window
    }

    fn depth(&self) -> u8 {
        self.ctx.root_depth
    }

    fn screen_rect(&self) -> Rect {
        Rect::new(0, 0, self.ctx.screen_width, self.ctx.screen_height)
    }

    fn pixel_layout(&self) -> PixelLayout {
        self.layout
    }

    fn max_image_bytes(&self) -> usize {
        self.max_image_bytes
    }

    fn create_window(&self, rect: Rect, background: u32) -> GatewayResult<Window> {
        let window = self.ctx.conn.generate_id()?;
        let values = CreateWindowAux::new()
            .background_pixel(background)
            .cursor(self.cursors.normal)
            .event_mask(
                EventMask::SUBSTRUCTURE_REDIRECT
                    | EventMask::SUBSTRUCTURE_NOTIFY
                    | EventMask::EXPOSURE
                    | EventMask::BUTTON_PRESS
                    | EventMask::BUTTON_RELEASE
                    | EventMask::POINTER_MOTION,
            );
        self.ctx
            .conn
            .create_window(
                x11rb::COPY_DEPTH_FROM_PARENT,
                window,
                self.ctx.root_window,
                rect.x,
                rect.y,
                rect.width.max(1),
                rect.height.max(1),
                0,
                WindowClass::INPUT_OUTPUT,
                x11rb::COPY_FROM_PARENT,
                &values,
            )?
            .check()?;
        Ok(window)
    }

    fn destroy_window(&self, window: Window) -> GatewayResult<()> {
        self.ctx.conn.destroy_window(window)?.check()?;
        Ok(())
    }

    fn reparent_window(&self, window: Window, parent: Window, x: i16, y: i16) -> GatewayResult<()> {
        self.ctx.conn.reparent_window(window, parent, x, y)?.check()?;
        Ok(())
    }

    fn map_window(&self, window: Window) -> GatewayResult<()> {
        self.ctx.conn.map_window(window)?.check()?;
        Ok(())
    }

    fn unmap_window(&self, window: Window) -> GatewayResult<()> {
        self.ctx.conn.unmap_window(window)?.check()?;
        Ok(())
    }

    fn configure_window(&self, window: Window, rect: Rect) -> GatewayResult<()> {
        let values = ConfigureWindowAux::new()
            .x(rect.x as i32)
            .y(rect.y as i32)
            .width(rect.width.max(1) as u32)
            .height(rect.height.max(1) as u32);
        self.ctx.conn.configure_window(window, &values)?.check()?;
        Ok(())
    }

    fn raise_window(&self, window: Window) -> GatewayResult<()> {
        let values = ConfigureWindowAux::new().stack_mode(StackMode::ABOVE);
        self.ctx.conn.configure_window(window, &values)?.check()?;
        Ok(())
    }

    fn focus_window(&self, window: Window) -> GatewayResult<()> {
        self.ctx
            .conn
            .set_input_focus(InputFocus::POINTER_ROOT, window, x11rb::CURRENT_TIME)?
            .check()?;
        self.ctx
            .conn
            .change_property32(
                PropMode::REPLACE,
                self.ctx.root_window,
                self.ctx.atoms._NET_ACTIVE_WINDOW,
                AtomEnum::WINDOW,
                &[window],
            )?
            .check()?;
        Ok(())
    }

    fn change_save_set(&self, window: Window, insert: bool) -> GatewayResult<()> {
        let mode = if insert { SetMode::INSERT } else { SetMode::DELETE };
        self.ctx.conn.change_save_set(mode, window)?.check()?;
        Ok(())
    }

    fn set_cursor(&self, window: Window, cursor: CursorShape) -> GatewayResult<()> {
        let values = ChangeWindowAttributesAux::new().cursor(self.cursors.for_shape(cursor));
        self.ctx
            .conn
            .change_window_attributes(window, &values)?
            .check()?;
        Ok(())
    }

    fn set_wm_state(&self, window: Window, state: WmState) -> GatewayResult<()> {
        let value = match state {
            WmState::Withdrawn => 0,
            WmState::Normal => 1,
            WmState::Iconic => 3,
        };
        self.ctx
            .conn
            .change_property32(
                PropMode::REPLACE,
                window,
                self.ctx.atoms.WM_STATE,
                self.ctx.atoms.WM_STATE,
                &[value, x11rb::NONE],
            )?
            .check()?;
        Ok(())
    }

    fn set_frame_extents(&self, window: Window, extents: FrameExtents) -> GatewayResult<()> {
        self.ctx
            .conn
            .change_property32(
                PropMode::REPLACE,
                window,
                self.ctx.atoms._NET_FRAME_EXTENTS,
                AtomEnum::CARDINAL,
                &[extents.left, extents.right, extents.top, extents.bottom],
            )?
            .check()?;
        Ok(())
    }

    fn create_pixel_surface(&self, width: u16, height: u16, depth: u8) -> GatewayResult<Pixmap> {
        let pixmap = self.ctx.conn.generate_id()?;
        self.ctx
            .conn
            .create_pixmap(depth, pixmap, self.ctx.root_window, width.max(1), height.max(1))?
            .check()?;
        Ok(pixmap)
    }

    fn free_pixel_surface(&self, surface: Pixmap) -> GatewayResult<()> {
        self.ctx.conn.free_pixmap(surface)?.check()?;
        Ok(())
    }

    fn create_draw_context(&self, drawable: Drawable, color: u32) -> GatewayResult<Gcontext> {
        let gc = self.ctx.conn.generate_id()?;
        let values = CreateGCAux::new().foreground(color).graphics_exposures(0);
        self.ctx.conn.create_gc(gc, drawable, &values)?.check()?;
        Ok(gc)
    }

    fn free_draw_context(&self, gc: Gcontext) -> GatewayResult<()> {
        self.ctx.conn.free_gc(gc)?.check()?;
        Ok(())
    }

    fn copy_area(
        &self,
        src: Drawable,
        dst: Drawable,
        gc: Gcontext,
        src_rect: Rect,
        dst_x: i16,
        dst_y: i16,
    ) -> GatewayResult<()> {
        self.ctx
            .conn
            .copy_area(
                src,
                dst,
                gc,
                src_rect.x,
                src_rect.y,
                dst_x,
                dst_y,
                src_rect.width,
                src_rect.height,
            )?
            .check()?;
        Ok(())
    }

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
    ) -> GatewayResult<()> {
        self.ctx
            .conn
            .put_image(
                ImageFormat::Z_PIXMAP,
                surface,
                gc,
                width,
                height,
                dst_x,
                dst_y,
                0,
                depth,
                data,
            )?
            .check()?;
        Ok(())
    }

    fn draw_text(
        &self,
        window: Window,
        x: i16,
        y: i16,
        text: &str,
        color: u32,
        background: u32,
    ) -> GatewayResult<()> {
        if self.font.is_none() || text.is_empty() {
            return Ok(());
        }
        let bytes = latin1(text);
        let values = ChangeGCAux::new().foreground(color).background(background);
        self.ctx.conn.change_gc(self.text_gc, &values)?.check()?;
        self.ctx
            .conn
            .image_text8(window, self.text_gc, x, y, &bytes)?
            .check()?;
        Ok(())
    }

    fn close_client(&self, window: Window) -> GatewayResult<()> {
        if self.supports_protocol(window, self.ctx.atoms.WM_DELETE_WINDOW)? {
            debug!("Asking window {:#x} to close", window);
            return self.send_delete_window(window);
        }
        debug!("Window {:#x} has no WM_DELETE_WINDOW, killing it", window);
        self.ctx.conn.kill_client(window)?.check()?;
        Ok(())
    }

    fn flush(&self) -> GatewayResult<()> {
        self.ctx.conn.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latin1_replaces_wide_characters() {
        assert_eq!(latin1("xterm"), b"xterm");
        assert_eq!(latin1("café ✓ 日本"), b"caf\xe9 ? ??");
    }

    #[test]
    fn test_latin1_caps_at_one_text_item() {
        let title = "é".repeat(300);
        let bytes = latin1(&title);
        assert_eq!(bytes.len(), MAX_TEXT_BYTES);
        assert!(bytes.iter().all(|&b| b == 0xe9));
    }
}
