//! Title bar painting with raqote.

use raqote::{
    DrawOptions, DrawTarget, LineCap, LineJoin, PathBuilder, SolidSource, Source, StrokeStyle,
};

use crate::geometry::{button_origin, ButtonAction};
use crate::render::{Image, TitleBarPainter, TitleBarSpec};

/// Paints a flat background with vector glyphs for each title bar button.
/// Title text is drawn later by the server with a core font.
#[derive(Debug, Default, Clone, Copy)]
pub struct RaqotePainter;

impl TitleBarPainter for RaqotePainter {
    fn paint(&self, spec: &TitleBarSpec<'_>) -> Image {
        if spec.width == 0 || spec.height == 0 {
            return Image::new(spec.width, spec.height);
        }

        let mut dt = DrawTarget::new(spec.width as i32, spec.height as i32);
        dt.clear(solid(spec.theme.background));

        for action in ButtonAction::SLOTS {
            let Some(x) = button_origin(action, spec.metrics) else {
                continue;
            };
            if x >= spec.width as i32 {
                break;
            }
            let glyph = GlyphBox::new(x as f32, spec.metrics.button_width as f32, spec.height as f32);
            match action {
                ButtonAction::Close => draw_close(&mut dt, &glyph, spec.theme.close_color),
                ButtonAction::ToggleMaximize => {
                    draw_maximize(&mut dt, &glyph, spec.theme.maximize_color, spec.maximized)
                }
                ButtonAction::Iconify => draw_iconify(&mut dt, &glyph, spec.theme.iconify_color),
                ButtonAction::None => {}
            }
        }

        to_image(&dt, spec.width, spec.height)
    }
}

/// Square area a glyph is drawn into, centered in its button slot.
struct GlyphBox {
    cx: f32,
    cy: f32,
    half: f32,
}

impl GlyphBox {
    fn new(slot_x: f32, slot_width: f32, height: f32) -> Self {
        let side = slot_width.min(height) / 2.0;
        Self {
            cx: slot_x + slot_width / 2.0,
            cy: height / 2.0,
            half: (side / 2.0).max(1.0),
        }
    }

    fn stroke_width(&self) -> f32 {
        (self.half / 3.0).max(1.0)
    }
}

fn solid(rgb: u32) -> SolidSource {
    let [_, r, g, b] = rgb.to_be_bytes();
    SolidSource::from_unpremultiplied_argb(0xff, r, g, b)
}

fn stroke_style(glyph: &GlyphBox) -> StrokeStyle {
    StrokeStyle {
        width: glyph.stroke_width(),
        cap: LineCap::Round,
        join: LineJoin::Round,
        ..StrokeStyle::default()
    }
}

fn draw_close(dt: &mut DrawTarget, glyph: &GlyphBox, color: u32) {
    let GlyphBox { cx, cy, half } = *glyph;
    let mut pb = PathBuilder::new();
    pb.move_to(cx - half, cy - half);
    pb.line_to(cx + half, cy + half);
    pb.move_to(cx + half, cy - half);
    pb.line_to(cx - half, cy + half);
    let path = pb.finish();
    dt.stroke(&path, &Source::Solid(solid(color)), &stroke_style(glyph), &DrawOptions::new());
}

fn draw_maximize(dt: &mut DrawTarget, glyph: &GlyphBox, color: u32, maximized: bool) {
    let GlyphBox { cx, cy, half } = *glyph;
    let mut pb = PathBuilder::new();
    if maximized {
        // restore: two offset squares
        let offset = half / 3.0;
        let side = 2.0 * half - offset;
        pb.rect(cx - half + offset, cy - half, side, side);
        pb.rect(cx - half, cy - half + offset, side, side);
    } else {
        pb.rect(cx - half, cy - half, 2.0 * half, 2.0 * half);
    }
    let path = pb.finish();
    dt.stroke(&path, &Source::Solid(solid(color)), &stroke_style(glyph), &DrawOptions::new());
}

fn draw_iconify(dt: &mut DrawTarget, glyph: &GlyphBox, color: u32) {
    let GlyphBox { cx, cy, half } = *glyph;
    let mut pb = PathBuilder::new();
    pb.move_to(cx - half, cy + half);
    pb.line_to(cx + half, cy + half);
    let path = pb.finish();
    dt.stroke(&path, &Source::Solid(solid(color)), &stroke_style(glyph), &DrawOptions::new());
}

/// raqote stores premultiplied ARGB words; the renderer wants straight RGBA.
fn to_image(dt: &DrawTarget, width: u16, height: u16) -> Image {
    let mut data = Vec::with_capacity(width as usize * height as usize * 4);
    for &pixel in dt.get_data() {
        let [a, r, g, b] = pixel.to_be_bytes();
        let unpremultiply = |c: u8| -> u8 {
            if a == 0 {
                0
            } else {
                ((c as u32 * 255 + a as u32 / 2) / a as u32).min(255) as u8
            }
        };
        data.extend_from_slice(&[unpremultiply(r), unpremultiply(g), unpremultiply(b), a]);
    }
    Image::from_rgba(width, height, data).unwrap_or_else(|| Image::new(width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Metrics;
    use deskwm_config::Theme;

    fn paint(width: u16, maximized: bool) -> (Image, Theme) {
        let theme = Theme::default();
        let metrics = Metrics::from_theme(&theme);
        let image = RaqotePainter.paint(&TitleBarSpec {
            title: "xterm",
            width,
            height: metrics.title_height,
            maximized,
            metrics: &metrics,
            theme: &theme,
        });
        (image, theme)
    }

    fn rgba(color: u32) -> [u8; 4] {
        let [_, r, g, b] = color.to_be_bytes();
        [r, g, b, 255]
    }

    #[test]
    fn test_image_matches_requested_size() {
        let (image, _) = paint(400, false);
        assert_eq!((image.width(), image.height()), (400, 24));
    }

    #[test]
    fn test_background_outside_buttons() {
        let (image, theme) = paint(400, false);
        assert_eq!(image.pixel(399, 12), rgba(theme.background));
        assert_eq!(image.pixel(1, 1), rgba(theme.background));
    }

    #[test]
    fn test_close_glyph_is_drawn_in_first_slot() {
        let (image, theme) = paint(400, false);
        // 4 px border + half of a 32 px slot
        assert_ne!(image.pixel(20, 12), rgba(theme.background));
    }

    #[test]
    fn test_maximized_glyph_differs() {
        let (normal, _) = paint(400, false);
        let (maximized, _) = paint(400, true);
        assert_ne!(normal, maximized);
    }

    #[test]
    fn test_zero_width_is_empty() {
        let (image, _) = paint(0, false);
        assert_eq!(image.width(), 0);
    }
}
