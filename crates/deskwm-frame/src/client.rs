use crate::frame::Frame;
use crate::gateway::Window;
use crate::geometry::{Rect, Size};

/// Whether a new client gets decorations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decor {
    Framed,
    Borderless,
}

/// Everything the manager needs to know to start managing a window.
#[derive(Debug, Clone)]
pub struct ManageRequest {
    pub window: Window,
    /// Requested client rectangle in root coordinates.
    pub geometry: Rect,
    pub min_size: Size,
    pub title: String,
    pub fullscreen: bool,
    pub decor: Decor,
    /// The window was already mapped (adopted at startup).
    pub viewable: bool,
}

impl ManageRequest {
    pub fn new(window: Window, geometry: Rect) -> Self {
        Self {
            window,
            geometry,
            min_size: Size::default(),
            title: String::new(),
            fullscreen: false,
            decor: Decor::Framed,
            viewable: false,
        }
    }
}

/// Registry entry for one managed window.
#[derive(Debug)]
pub struct Client {
    pub window: Window,
    pub title: String,
    pub fullscreen: bool,
    pub(crate) fullscreen_restore: Option<Rect>,
    pub frame: Frame,
}

impl Client {
    pub fn new(window: Window, title: String, frame: Frame) -> Self {
        Self {
            window,
            title,
            fullscreen: false,
            fullscreen_restore: None,
            frame,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnmanageReason {
    /// The client unmapped itself.
    Withdrawn,
    /// The client window no longer exists.
    Destroyed,
    /// The manager is exiting.
    Shutdown,
}
