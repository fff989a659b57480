use std::thread;
use std::time::Duration;

use anyhow::{Context as _, Result};
use tracing::debug;
use x11rb::connection::Connection;
use x11rb::protocol::xproto::{ChangeWindowAttributesAux, ConnectionExt, EventMask, Window};
use x11rb::rust_connection::RustConnection;

use crate::ewmh::atoms::AtomCollection;

pub struct Context {
    pub conn: RustConnection,
    pub screen_num: usize,
    pub root_window: Window,
    pub root_depth: u8,
    pub atoms: AtomCollection,
    pub screen_width: u16,
    pub screen_height: u16,
}

impl Context {
    pub fn new(display: Option<&str>) -> Result<Self> {
        let (conn, screen_num) = x11rb::connect(display).context("cannot open display")?;
        let screen = &conn.setup().roots[screen_num];
        let root_window = screen.root;
        let root_depth = screen.root_depth;
        let screen_width = screen.width_in_pixels;
        let screen_height = screen.height_in_pixels;

        let atoms = AtomCollection::new(&conn)?.reply()?;

        Ok(Self {
            conn,
            screen_num,
            root_window,
            root_depth,
            atoms,
            screen_width,
            screen_height,
        })
    }

    /// Take substructure redirection on the root window. A replaced window
    /// manager may need a moment to let go, so this retries a few times.
    pub fn redirect_root(&self, attempts: u32) -> Result<()> {
        let values = ChangeWindowAttributesAux::new().event_mask(
            EventMask::SUBSTRUCTURE_REDIRECT
                | EventMask::SUBSTRUCTURE_NOTIFY
                | EventMask::PROPERTY_CHANGE,
        );

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self
                .conn
                .change_window_attributes(self.root_window, &values)?
                .check()
            {
                Ok(()) => return Ok(()),
                Err(e) if attempt < attempts => {
                    debug!("Root redirect refused ({}), retrying", e);
                    thread::sleep(Duration::from_millis(50));
                }
                Err(e) => {
                    return Err(e).context("another window manager is already running")
                }
            }
        }
    }
}
