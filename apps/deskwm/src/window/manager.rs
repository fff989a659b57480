use anyhow::Result;
use deskwm_config::WmConfig;
use deskwm_frame::{
    FrameError, FrameManager, ManageRequest, Point, RaqotePainter, Rect, Size, UnmanageReason,
};
use tracing::{debug, error, info, warn};
use x11rb::connection::Connection;
use x11rb::errors::{ConnectionError, ReplyError};
use x11rb::protocol::xproto::{
    ButtonPressEvent, ButtonReleaseEvent, ChangeWindowAttributesAux, ClientMessageEvent,
    ConfigWindow, ConfigureRequestEvent, ConfigureWindowAux, ConnectionExt, EventMask, KeyButMask,
    MapState, MotionNotifyEvent, PropertyNotifyEvent, Window,
};
use x11rb::protocol::Event;

use crate::core::context::Context;
use crate::ewmh::setup::{set_net_wm_state, teardown_hints, update_client_list};
use crate::window::gateway::X11Gateway;
use crate::window::hints::{read_min_size, read_title, WindowHints};
use crate::window::placement::{cascade_placement, center_window};

const NET_WM_STATE_REMOVE: u32 = 0;
const NET_WM_STATE_ADD: u32 = 1;
const NET_WM_STATE_TOGGLE: u32 = 2;
const ICONIC_STATE: u32 = 3;

pub struct WindowManager<'a> {
    ctx: &'a Context,
    frames: FrameManager<X11Gateway<'a>, RaqotePainter>,
    check_window: Window,
    /// Managed clients in mapping order, for `_NET_CLIENT_LIST`.
    stacking: Vec<Window>,
}

impl<'a> WindowManager<'a> {
    pub fn new(ctx: &'a Context, config: &WmConfig, check_window: Window) -> Result<Self> {
        let gateway = X11Gateway::new(ctx)?;
        let frames = FrameManager::new(
            gateway,
            RaqotePainter,
            config.theme.clone(),
            config.behaviour.clone(),
        );
        Ok(Self {
            ctx,
            frames,
            check_window,
            stacking: Vec::new(),
        })
    }

    pub fn scan_windows(&mut self) -> Result<()> {
        let tree = self.ctx.conn.query_tree(self.ctx.root_window)?.reply()?;
        info!("Scanning {} windows...", tree.children.len());

        let mut to_manage = Vec::new();
        for &win in &tree.children {
            if win == self.check_window {
                continue;
            }
            if let Ok(attrs) = self.ctx.conn.get_window_attributes(win)?.reply() {
                if !attrs.override_redirect && attrs.map_state == MapState::VIEWABLE {
                    to_manage.push(win);
                }
            }
        }

        for win in to_manage {
            self.manage_window(win, true)?;
        }
        Ok(())
    }

    /// Read the client's hints, place it and hand it to the frame layer.
    pub fn manage_window(&mut self, win: Window, viewable: bool) -> Result<()> {
        debug!("Managing window {:#x}", win);

        // Either read can fail when the window went away before we got to it.
        let geometry = match self.ctx.conn.get_geometry(win)?.reply() {
            Ok(geometry) => geometry,
            Err(ReplyError::X11Error(e)) => {
                warn!("Cannot read geometry of {:#x}: {:?}", win, e.error_kind);
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        let hints = match WindowHints::read(self.ctx, win) {
            Ok(hints) => hints,
            Err(e) if is_connection_lost(&e) => return Err(e),
            Err(e) => {
                warn!("Cannot read hints of {:#x}: {}", win, e);
                return Ok(());
            }
        };

        self.ctx.conn.change_window_attributes(
            win,
            &ChangeWindowAttributesAux::new().event_mask(EventMask::PROPERTY_CHANGE),
        )?;

        let size = Size::new(geometry.width, geometry.height);
        let mut origin = Point::new(geometry.x, geometry.y);
        if !viewable && origin == Point::default() {
            let screen = Rect::new(0, 0, self.ctx.screen_width, self.ctx.screen_height);
            origin = if hints.is_dialog(self.ctx) {
                center_window(screen, size)
            } else {
                let existing: Vec<Point> = self
                    .frames
                    .clients()
                    .map(|c| {
                        let g = c.frame.geometry();
                        Point::new(g.x, g.y)
                    })
                    .collect();
                cascade_placement(screen, size, &existing)
            };
        }

        let request = ManageRequest {
            window: win,
            geometry: Rect::new(origin.x, origin.y, size.width, size.height),
            min_size: hints.min_size,
            title: hints.title.clone(),
            fullscreen: hints.fullscreen,
            decor: hints.decor(self.ctx),
            viewable,
        };

        match self.frames.manage(request) {
            Ok(frame) => {
                debug!("Window {:#x} framed by {:#x}", win, frame);
                if !self.stacking.contains(&win) {
                    self.stacking.push(win);
                }
                update_client_list(self.ctx, &self.stacking)?;
                self.sync_state(win)
            }
            Err(e) if e.is_fatal() => Err(e.into()),
            Err(e) => {
                self.frames.report(Err::<(), _>(e), "manage");
                // Better an undecorated window than a lost one.
                if !viewable {
                    self.ctx.conn.map_window(win)?;
                }
                Ok(())
            }
        }
    }

    fn unmanage_window(&mut self, win: Window, reason: UnmanageReason) -> Result<()> {
        let result = self.frames.unmanage(win, reason);
        self.settle(result, "unmanage")?;
        self.stacking.retain(|&w| w != win);
        update_client_list(self.ctx, &self.stacking)
    }

    /// Fatal errors end the event loop; everything else is logged and counted.
    fn settle<T>(&self, result: Result<T, FrameError>, operation: &str) -> Result<Option<T>> {
        match result {
            Err(e) if e.is_fatal() => Err(e.into()),
            result => Ok(self.frames.report(result, operation)),
        }
    }

    /// Mirror the frame's state into `_NET_WM_STATE`.
    fn sync_state(&self, win: Window) -> Result<()> {
        let Some(client) = self.frames.client(win) else {
            return Ok(());
        };
        let atoms = &self.ctx.atoms;
        let mut states = Vec::new();
        if client.fullscreen {
            states.push(atoms._NET_WM_STATE_FULLSCREEN);
        }
        if client.frame.is_maximized() {
            states.push(atoms._NET_WM_STATE_MAXIMIZED_VERT);
            states.push(atoms._NET_WM_STATE_MAXIMIZED_HORZ);
        }
        if client.frame.is_iconified() {
            states.push(atoms._NET_WM_STATE_HIDDEN);
        }
        set_net_wm_state(self.ctx, win, &states)
    }

    pub fn run(&mut self) -> Result<()> {
        loop {
            self.ctx.conn.flush()?;
            let event = self.ctx.conn.wait_for_event()?;
            self.handle_event(event)?;
        }
    }

    fn handle_event(&mut self, event: Event) -> Result<()> {
        match event {
            Event::MapRequest(event) => {
                if self.frames.is_managed(event.window) {
                    let result = self.frames.activate(event.window);
                    self.settle(result, "activate")?;
                    self.sync_state(event.window)?;
                } else {
                    self.manage_window(event.window, false)?;
                }
            }
            Event::ConfigureRequest(event) => self.on_configure_request(event)?,
            Event::UnmapNotify(event) => {
                if self.frames.is_managed(event.window) && !self.frames.consume_unmap(event.window)
                {
                    self.unmanage_window(event.window, UnmanageReason::Withdrawn)?;
                }
            }
            Event::DestroyNotify(event) => {
                if self.frames.is_managed(event.window) {
                    self.unmanage_window(event.window, UnmanageReason::Destroyed)?;
                }
            }
            Event::ButtonPress(event) => self.on_button_press(event)?,
            Event::ButtonRelease(event) => self.on_button_release(event)?,
            Event::MotionNotify(event) => self.on_motion(event)?,
            Event::Expose(event) => {
                if event.count == 0 && self.frames.client_for_frame(event.window).is_some() {
                    let result = self.frames.redraw(event.window);
                    self.settle(result, "redraw")?;
                }
            }
            Event::PropertyNotify(event) => self.on_property(event)?,
            Event::ClientMessage(event) => self.on_client_message(event)?,
            Event::Error(e) => warn!("X11 error: {:?}", e),
            _ => {}
        }
        Ok(())
    }

    fn on_configure_request(&mut self, event: ConfigureRequestEvent) -> Result<()> {
        let Some(current) = self.frames.content_geometry(event.window) else {
            let values = ConfigureWindowAux::from_configure_request(&event);
            self.ctx.conn.configure_window(event.window, &values)?;
            return Ok(());
        };

        let mut requested = current;
        if event.value_mask.contains(ConfigWindow::X) {
            requested.x = event.x;
        }
        if event.value_mask.contains(ConfigWindow::Y) {
            requested.y = event.y;
        }
        if event.value_mask.contains(ConfigWindow::WIDTH) {
            requested.width = event.width;
        }
        if event.value_mask.contains(ConfigWindow::HEIGHT) {
            requested.height = event.height;
        }
        let result = self.frames.configure_request(event.window, requested);
        self.settle(result, "configure_request")?;
        Ok(())
    }

    fn on_button_press(&mut self, event: ButtonPressEvent) -> Result<()> {
        let Some(win) = self.frames.client_for_frame(event.event) else {
            return Ok(());
        };

        // A click that fell through the client itself only activates it.
        if event.detail != 1 || event.child == win {
            let result = self.frames.activate(win);
            self.settle(result, "activate")?;
            return Ok(());
        }

        let pointer = Point::new(event.root_x, event.root_y);
        let result = self.frames.press(event.event, pointer, event.time);
        self.settle(result, "press")?;
        self.sync_state(win)
    }

    fn on_button_release(&mut self, event: ButtonReleaseEvent) -> Result<()> {
        if event.detail != 1 {
            return Ok(());
        }
        let Some(win) = self.frames.client_for_frame(event.event) else {
            return Ok(());
        };
        let pointer = Point::new(event.root_x, event.root_y);
        let result = self.frames.release(event.event, pointer);
        if let Some(action) = self.settle(result, "release")? {
            debug!("Release on {:#x}: {:?}", win, action);
        }
        self.sync_state(win)
    }

    fn on_motion(&mut self, event: MotionNotifyEvent) -> Result<()> {
        if self.frames.client_for_frame(event.event).is_none() {
            return Ok(());
        }
        let pointer = Point::new(event.root_x, event.root_y);
        let result = if event.state.contains(KeyButMask::BUTTON1) {
            self.frames.drag(event.event, pointer)
        } else {
            self.frames.pointer_motion(event.event, pointer)
        };
        self.settle(result, "motion")?;
        Ok(())
    }

    fn on_property(&mut self, event: PropertyNotifyEvent) -> Result<()> {
        if !self.frames.is_managed(event.window) {
            return Ok(());
        }
        let ctx = self.ctx;
        let atoms = &ctx.atoms;
        if event.atom == atoms._NET_WM_NAME || event.atom == atoms.WM_NAME {
            match read_title(self.ctx, event.window) {
                Ok(title) => {
                    let result = self.frames.set_title(event.window, &title);
                    self.settle(result, "set_title")?;
                }
                Err(e) => debug!("Cannot read title of {:#x}: {}", event.window, e),
            }
        } else if event.atom == atoms.WM_NORMAL_HINTS {
            match read_min_size(self.ctx, event.window) {
                Ok(min_size) => {
                    let result = self.frames.set_min_size(event.window, min_size);
                    self.settle(result, "set_min_size")?;
                }
                Err(e) => debug!("Cannot read size hints of {:#x}: {}", event.window, e),
            }
        }
        Ok(())
    }

    fn on_client_message(&mut self, event: ClientMessageEvent) -> Result<()> {
        let win = event.window;
        if !self.frames.is_managed(win) {
            return Ok(());
        }
        let ctx = self.ctx;
        let atoms = &ctx.atoms;
        let data = event.data.as_data32();

        if event.type_ == atoms._NET_WM_STATE {
            let action = data[0];
            let properties = [data[1], data[2]];
            let Some(client) = self.frames.client(win) else {
                return Ok(());
            };
            let (fullscreen, maximized) = (client.fullscreen, client.frame.is_maximized());

            if properties.contains(&atoms._NET_WM_STATE_FULLSCREEN) {
                if let Some(wanted) = wanted_state(action, fullscreen) {
                    let result = self.frames.set_fullscreen(win, wanted);
                    self.settle(result, "set_fullscreen")?;
                }
            }
            if properties.contains(&atoms._NET_WM_STATE_MAXIMIZED_VERT)
                || properties.contains(&atoms._NET_WM_STATE_MAXIMIZED_HORZ)
            {
                match wanted_state(action, maximized) {
                    Some(true) => {
                        let result = self.frames.maximize(win);
                        self.settle(result, "maximize")?;
                    }
                    Some(false) => {
                        let result = self.frames.unmaximize(win);
                        self.settle(result, "unmaximize")?;
                    }
                    None => {}
                }
            }
        } else if event.type_ == atoms.WM_CHANGE_STATE {
            if data[0] == ICONIC_STATE {
                let result = self.frames.iconify(win);
                self.settle(result, "iconify")?;
            }
        } else if event.type_ == atoms._NET_ACTIVE_WINDOW {
            let result = self.frames.activate(win);
            self.settle(result, "activate")?;
        } else if event.type_ == atoms._NET_CLOSE_WINDOW {
            let result = self.frames.close(win);
            self.settle(result, "close")?;
        } else {
            return Ok(());
        }
        self.sync_state(win)
    }

    /// Put every client back on the root and withdraw our hints.
    pub fn shutdown(&mut self) {
        info!("Shutting down, releasing {} clients", self.stacking.len());
        self.frames.unmanage_all();
        self.stacking.clear();
        if let Err(e) = teardown_hints(self.ctx, self.check_window) {
            warn!("Failed to remove EWMH hints: {}", e);
        }

        let health = self.frames.health();
        if health.is_healthy {
            info!("Frame health: {:?}", health);
        } else {
            error!("Frame health: {:?}", health);
        }
    }
}

/// Resolve a `_NET_WM_STATE` action against the current value. `None`
/// means nothing to do.
fn wanted_state(action: u32, current: bool) -> Option<bool> {
    let wanted = match action {
        NET_WM_STATE_REMOVE => false,
        NET_WM_STATE_ADD => true,
        NET_WM_STATE_TOGGLE => !current,
        _ => return None,
    };
    (wanted != current).then_some(wanted)
}

/// The server is gone; nothing else will get through.
pub fn is_connection_lost(error: &anyhow::Error) -> bool {
    error.chain().any(|cause| {
        cause.downcast_ref::<ConnectionError>().is_some()
            || cause
                .downcast_ref::<FrameError>()
                .is_some_and(FrameError::is_fatal)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wanted_state() {
        assert_eq!(wanted_state(NET_WM_STATE_ADD, false), Some(true));
        assert_eq!(wanted_state(NET_WM_STATE_ADD, true), None);
        assert_eq!(wanted_state(NET_WM_STATE_REMOVE, true), Some(false));
        assert_eq!(wanted_state(NET_WM_STATE_REMOVE, false), None);
        assert_eq!(wanted_state(NET_WM_STATE_TOGGLE, true), Some(false));
        assert_eq!(wanted_state(NET_WM_STATE_TOGGLE, false), Some(true));
        assert_eq!(wanted_state(7, false), None);
    }

    #[test]
    fn test_connection_loss_detection() {
        let lost = anyhow::Error::from(ConnectionError::UnknownError);
        assert!(is_connection_lost(&lost));
        let lost = anyhow::Error::from(FrameError::Protocol {
            operation: "map_window",
            source: ConnectionError::UnknownError.into(),
        });
        assert!(is_connection_lost(&lost.context("managing 0x200")));

        let other = anyhow::Error::from(FrameError::NotMaximized(0x200));
        assert!(!is_connection_lost(&other));
    }
}
