use anyhow::Result;
use deskwm_frame::CursorShape;
use x11rb::connection::Connection;
use x11rb::cursor::Handle;
use x11rb::protocol::xproto::Cursor;
use x11rb::resource_manager::new_from_default;

pub struct Cursors {
    pub normal: Cursor,
    pub hand: Cursor, // For the close button
    pub resize_s: Cursor,
    pub resize_sw: Cursor,
    pub resize_se: Cursor,
    pub resize_w: Cursor,
    pub resize_e: Cursor,
}

impl Cursors {
    pub fn new<C: Connection>(conn: &C, screen_num: usize) -> Result<Self> {
        let db = new_from_default(conn)?;
        let handle = Handle::new(conn, screen_num, &db)?.reply()?;

        let load = |name: &str| -> Result<Cursor> { Ok(handle.load_cursor(conn, name)?) };

        Ok(Self {
            normal: load("left_ptr")?,
            hand: load("hand2")?,
            resize_s: load("bottom_side")?,
            resize_sw: load("bottom_left_corner")?,
            resize_se: load("bottom_right_corner")?,
            resize_w: load("left_side")?,
            resize_e: load("right_side")?,
        })
    }

    pub fn for_shape(&self, shape: CursorShape) -> Cursor {
        match shape {
            CursorShape::Normal => self.normal,
            CursorShape::Close => self.hand,
            CursorShape::ResizeBottom => self.resize_s,
            CursorShape::ResizeBottomLeft => self.resize_sw,
            CursorShape::ResizeBottomRight => self.resize_se,
            CursorShape::ResizeLeft => self.resize_w,
            CursorShape::ResizeRight => self.resize_e,
        }
    }
}
