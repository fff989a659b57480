//! Title bar decorations.
//!
//! A title bar is painted once per redecoration event into two server-side
//! pixel surfaces: the main strip and the trailing corner. Every other
//! redraw is a plain area copy from those surfaces into the frame window.

use deskwm_config::Theme;
use tracing::debug;

use crate::error::log_and_ignore;
use crate::gateway::{Gcontext, GatewayResult, PixelLayout, Pixmap, ProtocolGateway, Window};
use crate::geometry::{button_origin, ButtonAction, Metrics, Rect};

/// Fixed part of a PutImage request, in bytes.
const PUT_IMAGE_HEADER: usize = 24;
const BYTES_PER_PIXEL: usize = 4;

/// Straight (non-premultiplied) RGBA pixels, row major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    width: u16,
    height: u16,
    data: Vec<u8>,
}

impl Image {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * BYTES_PER_PIXEL],
        }
    }

    pub fn from_rgba(width: u16, height: u16, data: Vec<u8>) -> Option<Self> {
        (data.len() == width as usize * height as usize * BYTES_PER_PIXEL).then_some(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// RGBA at `(x, y)`; transparent black outside the image.
    pub fn pixel(&self, x: u16, y: u16) -> [u8; 4] {
        if x >= self.width || y >= self.height {
            return [0; 4];
        }
        let i = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }
}

/// Everything the painter needs to know about one title bar.
#[derive(Debug, Clone, Copy)]
pub struct TitleBarSpec<'a> {
    pub title: &'a str,
    pub width: u16,
    pub height: u16,
    pub maximized: bool,
    pub metrics: &'a Metrics,
    pub theme: &'a Theme,
}

/// Produces title bar pixels. Assumed to always succeed.
pub trait TitleBarPainter {
    fn paint(&self, spec: &TitleBarSpec<'_>) -> Image;
}

/// Convert one rectangle of `image` into the server's pixel layout.
pub fn encode_region(
    image: &Image,
    x: u16,
    y: u16,
    width: u16,
    height: u16,
    layout: PixelLayout,
) -> Vec<u8> {
    let mut out = Vec::with_capacity(width as usize * height as usize * BYTES_PER_PIXEL);
    for row in 0..height {
        for col in 0..width {
            let [r, g, b, _] = image.pixel(x.saturating_add(col), y.saturating_add(row));
            match layout {
                PixelLayout::Bgrx => out.extend_from_slice(&[b, g, r, 0]),
                PixelLayout::Xrgb => out.extend_from_slice(&[0, r, g, b]),
            }
        }
    }
    out
}

/// Rows per put-image request so the payload stays under `max_bytes`.
pub fn rows_per_chunk(width: u16, max_bytes: usize) -> u16 {
    let row_bytes = (width as usize * BYTES_PER_PIXEL).max(1);
    let rows = max_bytes.saturating_sub(PUT_IMAGE_HEADER) / row_bytes;
    rows.clamp(1, u16::MAX as usize) as u16
}

/// Split a title bar of `width` into (strip width, corner width).
pub fn split_widths(width: u16, metrics: &Metrics) -> (u16, u16) {
    let corner = metrics.corner_width().min(width);
    (width - corner, corner)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Surface {
    pub pixmap: Pixmap,
    pub gc: Gcontext,
    pub width: u16,
    pub height: u16,
}

impl Surface {
    fn create<G: ProtocolGateway>(
        gateway: &G,
        width: u16,
        height: u16,
        background: u32,
    ) -> GatewayResult<Self> {
        let pixmap = gateway.create_pixel_surface(width, height, gateway.depth())?;
        match gateway.create_draw_context(pixmap, background) {
            Ok(gc) => Ok(Self {
                pixmap,
                gc,
                width,
                height,
            }),
            Err(e) => {
                log_and_ignore(gateway.free_pixel_surface(pixmap), "free_pixel_surface");
                Err(e)
            }
        }
    }

    fn release<G: ProtocolGateway>(self, gateway: &G) {
        log_and_ignore(gateway.free_draw_context(self.gc), "free_draw_context");
        log_and_ignore(gateway.free_pixel_surface(self.pixmap), "free_pixel_surface");
    }

    /// Upload the matching columns of `image`, chunked by rows.
    fn blit<G: ProtocolGateway>(&self, gateway: &G, image: &Image, x_offset: u16) -> GatewayResult<()> {
        let layout = gateway.pixel_layout();
        let step = rows_per_chunk(self.width, gateway.max_image_bytes());
        let mut y = 0;
        while y < self.height {
            let rows = step.min(self.height - y);
            let data = encode_region(image, x_offset, y, self.width, rows, layout);
            gateway.put_image(
                self.pixmap,
                self.gc,
                self.width,
                rows,
                0,
                y as i16,
                gateway.depth(),
                &data,
            )?;
            y += rows;
        }
        Ok(())
    }
}

/// Server-side surfaces holding one frame's rendered title bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoration {
    strip: Option<Surface>,
    corner: Surface,
    width: u16,
    title_height: u16,
    generation: Option<u64>,
    title: String,
    maximized: bool,
}

impl Decoration {
    fn create<G: ProtocolGateway>(
        gateway: &G,
        width: u16,
        metrics: &Metrics,
        background: u32,
    ) -> GatewayResult<Self> {
        let (strip_width, corner_width) = split_widths(width, metrics);
        let height = metrics.title_height;
        let strip = if strip_width > 0 {
            Some(Surface::create(gateway, strip_width, height, background)?)
        } else {
            None
        };
        let corner = match Surface::create(gateway, corner_width, height, background) {
            Ok(corner) => corner,
            Err(e) => {
                if let Some(strip) = strip {
                    strip.release(gateway);
                }
                return Err(e);
            }
        };
        debug!("Created decoration surfaces for width {}", width);
        Ok(Self {
            strip,
            corner,
            width,
            title_height: height,
            generation: None,
            title: String::new(),
            maximized: false,
        })
    }

    fn fits(&self, width: u16, metrics: &Metrics) -> bool {
        self.width == width && self.title_height == metrics.title_height
    }

    pub fn surfaces(&self) -> impl Iterator<Item = &Surface> {
        self.strip.iter().chain(std::iter::once(&self.corner))
    }

    pub fn release<G: ProtocolGateway>(self, gateway: &G) {
        if let Some(strip) = self.strip {
            strip.release(gateway);
        }
        self.corner.release(gateway);
    }
}

/// What a redecoration did, for callers that care.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Redecorated {
    pub created: bool,
    pub rendered: bool,
}

/// Renders and copies title bars through a gateway.
pub struct DecorationRenderer<'a, G, P> {
    pub gateway: &'a G,
    pub painter: &'a P,
    pub theme: &'a Theme,
    pub metrics: &'a Metrics,
    /// Bumped on every theme change; a mismatch forces a re-render.
    pub generation: u64,
}

impl<'a, G: ProtocolGateway, P: TitleBarPainter> DecorationRenderer<'a, G, P> {
    /// Bring `slot` up to date for a frame of `width` and copy it into `window`.
    ///
    /// Surfaces are recreated only when the width or title height changed;
    /// pixels are re-rendered only on recreation, theme change or a new
    /// title/maximize state.
    pub fn decorate(
        &self,
        window: Window,
        slot: &mut Option<Decoration>,
        width: u16,
        title: &str,
        maximized: bool,
    ) -> GatewayResult<Redecorated> {
        let mut outcome = Redecorated::default();
        if width == 0 || self.metrics.title_height == 0 {
            return Ok(outcome);
        }

        let decoration = match slot.take() {
            Some(existing) if existing.fits(width, self.metrics) => existing,
            stale => {
                if let Some(stale) = stale {
                    stale.release(self.gateway);
                }
                outcome.created = true;
                Decoration::create(self.gateway, width, self.metrics, self.theme.background)?
            }
        };
        let decoration = slot.insert(decoration);

        if decoration.generation != Some(self.generation)
            || decoration.title != title
            || decoration.maximized != maximized
        {
            self.render(decoration, title, maximized)?;
            outcome.rendered = true;
        }

        self.copy(window, decoration)?;
        Ok(outcome)
    }

    fn render(&self, decoration: &mut Decoration, title: &str, maximized: bool) -> GatewayResult<()> {
        let image = self.painter.paint(&TitleBarSpec {
            title,
            width: decoration.width,
            height: decoration.title_height,
            maximized,
            metrics: self.metrics,
            theme: self.theme,
        });

        if let Some(strip) = &decoration.strip {
            strip.blit(self.gateway, &image, 0)?;
        }
        let corner_x = decoration.strip.map_or(0, |s| s.width);
        decoration.corner.blit(self.gateway, &image, corner_x)?;

        decoration.generation = Some(self.generation);
        decoration.title = title.to_string();
        decoration.maximized = maximized;
        Ok(())
    }

    fn copy(&self, window: Window, decoration: &Decoration) -> GatewayResult<()> {
        let mut x = 0u16;
        for surface in decoration.surfaces() {
            self.gateway.copy_area(
                surface.pixmap,
                window,
                surface.gc,
                Rect::new(0, 0, surface.width, surface.height),
                x as i16,
                0,
            )?;
            x += surface.width;
        }

        let text_x = text_origin(self.metrics);
        let strip_width = decoration.strip.map_or(0, |s| s.width) as i32;
        if !decoration.title.is_empty() && text_x < strip_width {
            let baseline = 15 + (decoration.title_height as i16 / 10);
            self.gateway.draw_text(
                window,
                text_x as i16,
                baseline,
                &decoration.title,
                self.theme.title_color,
                self.theme.background,
            )?;
        }
        Ok(())
    }
}

/// Title text starts after the last button slot.
fn text_origin(metrics: &Metrics) -> i32 {
    button_origin(ButtonAction::Iconify, metrics).unwrap_or(0)
        + metrics.button_width as i32
        + metrics.padding as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, FlatPainter, RecordingGateway};

    fn metrics() -> Metrics {
        Metrics {
            border_width: 4,
            title_height: 24,
            button_width: 32,
            padding: 4,
        }
    }

    #[test]
    fn test_encode_reorders_channels() {
        let image = Image::from_rgba(2, 1, vec![10, 20, 30, 255, 40, 50, 60, 128]).unwrap();
        assert_eq!(
            encode_region(&image, 0, 0, 2, 1, PixelLayout::Bgrx),
            vec![30, 20, 10, 0, 60, 50, 40, 0]
        );
        assert_eq!(
            encode_region(&image, 1, 0, 1, 1, PixelLayout::Xrgb),
            vec![0, 40, 50, 60]
        );
    }

    #[test]
    fn test_image_rejects_wrong_length() {
        assert!(Image::from_rgba(2, 2, vec![0; 15]).is_none());
        assert_eq!(Image::new(3, 2).pixel(5, 5), [0; 4]);
    }

    #[test]
    fn test_rows_per_chunk_bounds_payload() {
        // 100 px rows are 400 bytes
        assert_eq!(rows_per_chunk(100, 24 + 4000), 10);
        assert_eq!(rows_per_chunk(100, 100), 1);
    }

    #[test]
    fn test_split_widths() {
        let m = metrics();
        assert_eq!(split_widths(400, &m), (372, 28));
        assert_eq!(split_widths(20, &m), (0, 20));
    }

    #[test]
    fn test_first_decoration_creates_renders_and_copies() {
        let gateway = RecordingGateway::new();
        let theme = Theme::default();
        let m = metrics();
        let renderer = DecorationRenderer {
            gateway: &gateway,
            painter: &FlatPainter,
            theme: &theme,
            metrics: &m,
            generation: 0,
        };
        let mut slot = None;

        let outcome = renderer.decorate(7, &mut slot, 400, "Terminal", false).unwrap();
        assert_eq!(outcome, Redecorated { created: true, rendered: true });
        assert_eq!(gateway.count(|c| matches!(c, Call::CreatePixelSurface { .. })), 2);
        assert!(gateway.count(|c| matches!(c, Call::PutImage { .. })) >= 2);
        assert_eq!(gateway.count(|c| matches!(c, Call::CopyArea { dst: 7, .. })), 2);
        assert_eq!(gateway.count(|c| matches!(c, Call::DrawText { .. })), 1);

        let decoration = slot.unwrap();
        let widths: Vec<u16> = decoration.surfaces().map(|s| s.width).collect();
        assert_eq!(widths, vec![372, 28]);
    }

    #[test]
    fn test_unchanged_frame_only_copies() {
        let gateway = RecordingGateway::new();
        let theme = Theme::default();
        let m = metrics();
        let renderer = DecorationRenderer {
            gateway: &gateway,
            painter: &FlatPainter,
            theme: &theme,
            metrics: &m,
            generation: 0,
        };
        let mut slot = None;
        renderer.decorate(7, &mut slot, 400, "Terminal", false).unwrap();
        gateway.clear();

        let outcome = renderer.decorate(7, &mut slot, 400, "Terminal", false).unwrap();
        assert_eq!(outcome, Redecorated::default());
        assert_eq!(gateway.count(|c| matches!(c, Call::PutImage { .. })), 0);
        assert_eq!(gateway.count(|c| matches!(c, Call::CreatePixelSurface { .. })), 0);
        assert_eq!(gateway.count(|c| matches!(c, Call::CopyArea { .. })), 2);
    }

    #[test]
    fn test_width_change_recreates_and_theme_change_rerenders() {
        let gateway = RecordingGateway::new();
        let theme = Theme::default();
        let m = metrics();
        let mut slot = None;
        let mut renderer = DecorationRenderer {
            gateway: &gateway,
            painter: &FlatPainter,
            theme: &theme,
            metrics: &m,
            generation: 0,
        };
        renderer.decorate(7, &mut slot, 400, "", false).unwrap();

        let outcome = renderer.decorate(7, &mut slot, 500, "", false).unwrap();
        assert_eq!(outcome, Redecorated { created: true, rendered: true });
        assert_eq!(gateway.count(|c| matches!(c, Call::FreePixelSurface(_))), 2);

        renderer.generation = 1;
        let outcome = renderer.decorate(7, &mut slot, 500, "", false).unwrap();
        assert_eq!(outcome, Redecorated { created: false, rendered: true });
    }

    #[test]
    fn test_large_strips_are_chunked() {
        let gateway = RecordingGateway::new().with_max_image_bytes(24 + 372 * 4 * 5);
        let theme = Theme::default();
        let m = metrics();
        let renderer = DecorationRenderer {
            gateway: &gateway,
            painter: &FlatPainter,
            theme: &theme,
            metrics: &m,
            generation: 0,
        };
        let mut slot = None;
        renderer.decorate(7, &mut slot, 400, "", false).unwrap();

        let strip = slot.as_ref().unwrap().surfaces().next().copied().unwrap();
        let strip_puts: Vec<(u16, i16)> = gateway
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::PutImage { surface, height, dst_y, .. } if surface == strip.pixmap => {
                    Some((height, dst_y))
                }
                _ => None,
            })
            .collect();
        assert_eq!(strip_puts, vec![(5, 0), (5, 5), (5, 10), (5, 15), (4, 20)]);
    }

    #[test]
    fn test_failed_corner_releases_strip() {
        let gateway = RecordingGateway::new();
        gateway.fail_nth("create_pixel_surface", 2);
        let theme = Theme::default();
        let m = metrics();
        let renderer = DecorationRenderer {
            gateway: &gateway,
            painter: &FlatPainter,
            theme: &theme,
            metrics: &m,
            generation: 0,
        };
        let mut slot = None;
        assert!(renderer.decorate(7, &mut slot, 400, "", false).is_err());
        assert!(slot.is_none());
        assert_eq!(gateway.count(|c| matches!(c, Call::FreePixelSurface(_))), 1);
        assert_eq!(gateway.count(|c| matches!(c, Call::FreeDrawContext(_))), 1);
    }
}
