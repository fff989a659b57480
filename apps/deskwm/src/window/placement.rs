use deskwm_frame::{Point, Rect, Size};

const CASCADE_START: Point = Point::new(20, 40);
const CASCADE_STEP: i16 = 25;
/// Origins closer than this on both axes count as taken.
const CASCADE_SLOP: i16 = 15;

pub fn center_window(screen: Rect, size: Size) -> Point {
    let x = screen.x as i32 + (screen.width as i32 - size.width as i32) / 2;
    let y = screen.y as i32 + (screen.height as i32 - size.height as i32) / 2;
    Point::new(x.max(screen.x as i32) as i16, y.max(screen.y as i32) as i16)
}

/// First free origin on the diagonal cascade. Wraps back near the top left
/// once a window would run off the screen.
pub fn cascade_placement(screen: Rect, size: Size, existing: &[Point]) -> Point {
    let mut origin = CASCADE_START;

    loop {
        let taken = existing.iter().any(|e| {
            (origin.x - e.x).abs() < CASCADE_SLOP && (origin.y - e.y).abs() < CASCADE_SLOP
        });

        let right = origin.x as i32 + size.width as i32;
        let bottom = origin.y as i32 + size.height as i32;
        let screen_right = screen.x as i32 + screen.width as i32;
        let screen_bottom = screen.y as i32 + screen.height as i32;
        if right > screen_right || bottom > screen_bottom {
            return Point::new(CASCADE_START.x + 10, CASCADE_START.y + 10);
        }

        if !taken {
            return origin;
        }
        origin.x += CASCADE_STEP;
        origin.y += CASCADE_STEP;
    }
}
