//! Window frames for the deskwm window manager.
//!
//! Wraps client windows in decorations, turns pointer input into
//! move/resize/button actions and keeps server-side title bar pixels in
//! sync with the theme.

pub mod client;
pub mod error;
pub mod frame;
pub mod gateway;
pub mod geometry;
pub mod interaction;
pub mod lifecycle;
pub mod paint;
pub mod render;

#[cfg(test)]
mod testing;

pub use client::{Client, Decor, ManageRequest, UnmanageReason};
pub use error::{ErrorCategory, ErrorTracker, FrameError, HealthStatus};
pub use frame::Frame;
pub use gateway::{FrameExtents, GatewayError, PixelLayout, ProtocolGateway, WmState};
pub use geometry::{ButtonAction, CursorShape, Metrics, Point, Rect, Size};
pub use lifecycle::FrameManager;
pub use paint::RaqotePainter;
pub use render::{Image, TitleBarPainter, TitleBarSpec};
