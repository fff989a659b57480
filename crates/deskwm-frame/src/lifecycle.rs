//! Frame lifecycle: creation, geometry, maximize/iconify and teardown.
//!
//! Every mutation is mirrored to the display server through the
//! [`ProtocolGateway`]. When a request fails the frame keeps the last
//! geometry the server accepted and the error is handed back to the caller.

use std::collections::HashMap;

use deskwm_config::{Behaviour, DoubleClickAction, Theme};
use tracing::{debug, info};

use crate::client::{Client, Decor, ManageRequest, UnmanageReason};
use crate::error::{
    log_and_ignore, ErrorCategory, ErrorTracker, FrameError, HealthStatus, OperationExt,
};
use crate::frame::Frame;
use crate::gateway::{ProtocolGateway, Window, WmState};
use crate::geometry::{
    button_zone, constrain_outer, hit_zone, outer_from_inner, ButtonAction, Metrics, Point, Rect,
    Size, Zone,
};
use crate::interaction::Interaction;
use crate::render::{DecorationRenderer, TitleBarPainter};

#[derive(Debug, Clone, Copy)]
struct Click {
    frame: Window,
    time: u32,
}

pub struct FrameManager<G, P> {
    gateway: G,
    painter: P,
    theme: Theme,
    metrics: Metrics,
    behaviour: Behaviour,
    /// Bumped on every theme change.
    generation: u64,
    clients: HashMap<Window, Client>,
    /// Frame window -> client window.
    by_frame: HashMap<Window, Window>,
    last_click: Option<Click>,
    errors: ErrorTracker,
}

/// Shared, read-only half of the manager, borrowed next to the registry.
struct Env<'a, G, P> {
    gateway: &'a G,
    painter: &'a P,
    theme: &'a Theme,
    metrics: &'a Metrics,
    generation: u64,
    errors: &'a ErrorTracker,
}

fn lookup(clients: &mut HashMap<Window, Client>, window: Window) -> Result<&mut Client, FrameError> {
    clients
        .get_mut(&window)
        .ok_or(FrameError::UnknownClient(window))
}

impl<'a, G: ProtocolGateway, P: TitleBarPainter> Env<'a, G, P> {
    fn renderer(&self) -> DecorationRenderer<'a, G, P> {
        DecorationRenderer {
            gateway: self.gateway,
            painter: self.painter,
            theme: self.theme,
            metrics: self.metrics,
            generation: self.generation,
        }
    }

    /// Redecorate a visible title bar. Failures are counted, not returned:
    /// a frame without pixels is still a usable frame.
    fn decorate(&self, client: &mut Client) {
        let frame = &mut client.frame;
        if !frame.is_framed() || client.fullscreen || frame.iconified {
            return;
        }
        let (id, width, maximized) = (frame.id(), frame.geometry().width, frame.is_maximized());
        let result =
            self.renderer()
                .decorate(id, &mut frame.decoration, width, &client.title, maximized);
        self.errors
            .warn_if_failed(result, "decorate", ErrorCategory::Decoration);
    }

    /// Push `outer` to the server: decoration window first, then the client.
    fn relayout(&self, client: &mut Client, outer: Rect) -> Result<(), FrameError> {
        let frame = &mut client.frame;
        let outer = constrain_outer(outer, frame.min_size(), self.metrics, frame.is_framed());
        self.gateway
            .configure_window(frame.id(), outer)
            .during("configure_window")?;
        frame.set_geometry(outer);

        if frame.is_framed() {
            // an iconified client lives on the root
            let inner = if frame.iconified {
                frame.content_geometry(self.metrics, client.fullscreen)
            } else {
                frame.content_offset_geometry(self.metrics, client.fullscreen)
            };
            self.gateway
                .configure_window(frame.client(), inner)
                .during("configure_window")?;
        }

        self.decorate(client);
        Ok(())
    }

    /// Constrain and apply `requested`. Returns false if nothing changed.
    fn apply_geometry(&self, client: &mut Client, requested: Rect) -> Result<bool, FrameError> {
        let frame = &client.frame;
        let outer = constrain_outer(requested, frame.min_size(), self.metrics, frame.is_framed());
        if outer == frame.geometry() {
            return Ok(false);
        }
        self.relayout(client, outer)?;
        Ok(true)
    }

    fn publish_state(&self, frame: &Frame, state: WmState) -> Result<(), FrameError> {
        self.gateway
            .set_wm_state(frame.client(), state)
            .during("set_wm_state")?;
        self.gateway
            .set_frame_extents(frame.client(), frame.extents(self.metrics))
            .during("set_frame_extents")
    }

    fn update_cursor(&self, frame: &mut Frame, pointer: Point) {
        if !frame.is_framed() {
            return;
        }
        let shape = frame
            .interaction
            .cursor_hint(pointer, frame.geometry(), self.metrics);
        if shape == frame.cursor {
            return;
        }
        if self
            .errors
            .warn_if_failed(
                self.gateway.set_cursor(frame.id(), shape),
                "set_cursor",
                ErrorCategory::Protocol,
            )
            .is_some()
        {
            frame.cursor = shape;
        }
    }

    fn raise_and_focus(&self, frame: &Frame) {
        self.errors.warn_if_failed(
            self.gateway.raise_window(frame.id()),
            "raise_window",
            ErrorCategory::Protocol,
        );
        self.errors.warn_if_failed(
            self.gateway.focus_window(frame.client()),
            "focus_window",
            ErrorCategory::Protocol,
        );
    }

    /// Reverse the reparenting done at creation and destroy the decoration
    /// window. No-op for borderless frames.
    fn unframe(&self, client: &mut Client) -> Result<(), FrameError> {
        let frame = &mut client.frame;
        if !frame.is_framed() {
            return Ok(());
        }
        let inner = frame.content_geometry(self.metrics, client.fullscreen);
        self.gateway
            .reparent_window(frame.client(), self.gateway.root(), inner.x, inner.y)
            .during("reparent_window")?;
        if !frame.iconified {
            frame.expect_unmap();
        }
        self.gateway
            .change_save_set(frame.client(), false)
            .during("change_save_set")?;
        let decoration_window = frame.id();
        self.gateway
            .unmap_window(decoration_window)
            .during("unmap_window")?;

        if let Some(decoration) = frame.decoration.take() {
            decoration.release(self.gateway);
        }
        frame.make_borderless(inner);
        self.errors.warn_if_failed(
            self.gateway.destroy_window(decoration_window),
            "destroy_window",
            ErrorCategory::Protocol,
        );
        Ok(())
    }

    /// Best-effort teardown. The client may already be gone, so nothing here fails.
    fn release(&self, client: &mut Client, reason: UnmanageReason) {
        if reason != UnmanageReason::Destroyed {
            log_and_ignore(self.unframe(client), "unframe");
            match reason {
                UnmanageReason::Withdrawn => log_and_ignore(
                    self.gateway.set_wm_state(client.window, WmState::Withdrawn),
                    "set_wm_state",
                ),
                UnmanageReason::Shutdown if client.frame.iconified => {
                    log_and_ignore(self.gateway.map_window(client.window), "map_window")
                }
                _ => {}
            }
        }

        if let Some(decoration) = client.frame.decoration.take() {
            decoration.release(self.gateway);
        }
        if client.frame.has_decoration_window() {
            log_and_ignore(
                self.gateway.destroy_window(client.frame.id()),
                "destroy_window",
            );
        }
    }
}

impl<G: ProtocolGateway, P: TitleBarPainter> FrameManager<G, P> {
    pub fn new(gateway: G, painter: P, theme: Theme, behaviour: Behaviour) -> Self {
        let metrics = Metrics::from_theme(&theme);
        Self {
            gateway,
            painter,
            theme,
            metrics,
            behaviour,
            generation: 0,
            clients: HashMap::new(),
            by_frame: HashMap::new(),
            last_click: None,
            errors: ErrorTracker::new(),
        }
    }

    fn env(&self) -> Env<'_, G, P> {
        Env {
            gateway: &self.gateway,
            painter: &self.painter,
            theme: &self.theme,
            metrics: &self.metrics,
            generation: self.generation,
            errors: &self.errors,
        }
    }

    fn split(&mut self) -> (Env<'_, G, P>, &mut HashMap<Window, Client>) {
        (
            Env {
                gateway: &self.gateway,
                painter: &self.painter,
                theme: &self.theme,
                metrics: &self.metrics,
                generation: self.generation,
                errors: &self.errors,
            },
            &mut self.clients,
        )
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn is_managed(&self, window: Window) -> bool {
        self.clients.contains_key(&window)
    }

    pub fn client(&self, window: Window) -> Option<&Client> {
        self.clients.get(&window)
    }

    pub fn clients(&self) -> impl Iterator<Item = &Client> {
        self.clients.values()
    }

    /// Client window wrapped by a frame window.
    pub fn client_for_frame(&self, frame: Window) -> Option<Window> {
        self.by_frame.get(&frame).copied()
    }

    pub fn content_geometry(&self, window: Window) -> Option<Rect> {
        self.clients
            .get(&window)
            .map(|c| c.frame.content_geometry(&self.metrics, c.fullscreen))
    }

    pub fn health(&self) -> HealthStatus {
        self.errors.health_check()
    }

    /// Log and count a failed operation; the caller carries on.
    pub fn report<T>(&self, result: Result<T, FrameError>, operation: &str) -> Option<T> {
        let category = match &result {
            Err(FrameError::Protocol { .. }) => ErrorCategory::Protocol,
            _ => ErrorCategory::Window,
        };
        self.errors.warn_if_failed(result, operation, category)
    }

    /// Start managing a window, framed or borderless per `request.decor`.
    pub fn manage(&mut self, request: ManageRequest) -> Result<Window, FrameError> {
        if let Some(client) = self.clients.get(&request.window) {
            return Ok(client.frame.id());
        }

        let client = match request.decor {
            Decor::Framed => self.create_framed(&request)?,
            Decor::Borderless => self.create_borderless(&request)?,
        };
        let id = client.frame.id();
        self.by_frame.insert(id, request.window);
        self.clients.insert(request.window, client);
        info!(
            "Managing window {:#x} ({:?}) with frame {:#x}",
            request.window, request.decor, id
        );

        if request.fullscreen {
            self.set_fullscreen(request.window, true)?;
        }
        Ok(id)
    }

    /// Wrap `request.window` in a new decoration window. On failure nothing
    /// is left behind and the client must not be managed.
    pub fn create_framed(&self, request: &ManageRequest) -> Result<Client, FrameError> {
        let window = request.window;
        let outer = constrain_outer(
            outer_from_inner(request.geometry, &self.metrics, true),
            request.min_size,
            &self.metrics,
            true,
        );
        let id = self
            .gateway
            .create_window(outer, self.theme.background)
            .during("create_window")?;
        let mut client = Client::new(
            window,
            request.title.clone(),
            Frame::new_framed(window, id, outer, request.min_size),
        );

        if let Err(e) = self.attach(&mut client, request.viewable) {
            let inner = client.frame.content_geometry(&self.metrics, false);
            log_and_ignore(
                self.gateway
                    .reparent_window(window, self.gateway.root(), inner.x, inner.y),
                "reparent_window",
            );
            log_and_ignore(self.gateway.change_save_set(window, false), "change_save_set");
            log_and_ignore(self.gateway.destroy_window(id), "destroy_window");
            return Err(e);
        }
        debug!("Framed {:#x} at {:?}", window, outer);
        Ok(client)
    }

    fn attach(&self, client: &mut Client, viewable: bool) -> Result<(), FrameError> {
        let env = self.env();
        let frame = &mut client.frame;
        let (dx, dy) = self.metrics.client_offset();

        self.gateway
            .change_save_set(frame.client(), true)
            .during("change_save_set")?;
        self.gateway
            .reparent_window(frame.client(), frame.id(), dx, dy)
            .during("reparent_window")?;
        if viewable {
            frame.expect_unmap();
        }
        self.gateway
            .configure_window(frame.client(), frame.content_offset_geometry(&self.metrics, false))
            .during("configure_window")?;

        env.decorate(client);

        self.gateway
            .map_window(client.window)
            .during("map_window")?;
        self.gateway
            .map_window(client.frame.id())
            .during("map_window")?;
        env.publish_state(&client.frame, WmState::Normal)
    }

    /// Identity wrapper: the frame is the client window itself.
    pub fn create_borderless(&self, request: &ManageRequest) -> Result<Client, FrameError> {
        let window = request.window;
        let client = Client::new(
            window,
            request.title.clone(),
            Frame::new_borderless(window, request.geometry),
        );
        self.gateway
            .configure_window(window, request.geometry)
            .during("configure_window")?;
        self.gateway.map_window(window).during("map_window")?;
        self.env().publish_state(&client.frame, WmState::Normal)?;
        Ok(client)
    }

    /// Move/resize a frame. Returns false (and sends nothing) if the
    /// constrained geometry equals the current one.
    pub fn update_geometry(&mut self, window: Window, geometry: Rect) -> Result<bool, FrameError> {
        let (env, clients) = self.split();
        let client = lookup(clients, window)?;
        env.apply_geometry(client, geometry)
    }

    /// A client asked for a new content rectangle.
    pub fn configure_request(&mut self, window: Window, requested: Rect) -> Result<(), FrameError> {
        let (env, clients) = self.split();
        let client = lookup(clients, window)?;
        if client.fullscreen || client.frame.is_maximized() {
            // keep the managed geometry, but tell the client about it
            let current = client.frame.geometry();
            return env.relayout(client, current);
        }
        let outer = outer_from_inner(requested, env.metrics, client.frame.is_framed());
        env.apply_geometry(client, outer).map(|_| ())
    }

    pub fn maximize(&mut self, window: Window) -> Result<(), FrameError> {
        let screen = self.gateway.screen_rect();
        let (env, clients) = self.split();
        let client = lookup(clients, window)?;
        if client.frame.is_maximized() {
            return Ok(());
        }

        client.frame.restore = Some(client.frame.geometry());
        match env.apply_geometry(client, screen) {
            Ok(true) => Ok(()),
            Ok(false) => {
                env.decorate(client);
                Ok(())
            }
            Err(e) => {
                client.frame.restore = None;
                Err(e)
            }
        }
    }

    /// Return to the geometry saved by [`maximize`](Self::maximize).
    /// Without a prior maximize this changes nothing and reports
    /// [`FrameError::NotMaximized`].
    pub fn unmaximize(&mut self, window: Window) -> Result<(), FrameError> {
        let (env, clients) = self.split();
        let client = lookup(clients, window)?;
        let Some(restore) = client.frame.restore.take() else {
            return Err(FrameError::NotMaximized(window));
        };

        match env.apply_geometry(client, restore) {
            Ok(true) => Ok(()),
            Ok(false) => {
                env.decorate(client);
                Ok(())
            }
            Err(e) => {
                client.frame.restore = Some(restore);
                Err(e)
            }
        }
    }

    pub fn toggle_maximize(&mut self, window: Window) -> Result<(), FrameError> {
        let maximized = self
            .clients
            .get(&window)
            .ok_or(FrameError::UnknownClient(window))?
            .frame
            .is_maximized();
        if maximized {
            self.unmaximize(window)
        } else {
            self.maximize(window)
        }
    }

    /// Hide the client on the root. The frame and its surfaces are kept.
    pub fn iconify(&mut self, window: Window) -> Result<(), FrameError> {
        let (env, clients) = self.split();
        let client = lookup(clients, window)?;
        let fullscreen = client.fullscreen;
        let frame = &mut client.frame;
        if frame.iconified {
            return Ok(());
        }
        frame.interaction = Interaction::Idle;

        if frame.is_framed() {
            let inner = frame.content_geometry(env.metrics, fullscreen);
            env.gateway
                .reparent_window(window, env.gateway.root(), inner.x, inner.y)
                .during("reparent_window")?;
            frame.expect_unmap();
            env.gateway
                .unmap_window(frame.id())
                .during("unmap_window")?;
        }
        env.gateway.unmap_window(window).during("unmap_window")?;
        frame.expect_unmap();
        frame.iconified = true;

        env.gateway
            .set_wm_state(window, WmState::Iconic)
            .during("set_wm_state")?;
        debug!("Iconified {:#x}", window);
        Ok(())
    }

    pub fn uniconify(&mut self, window: Window) -> Result<(), FrameError> {
        let (env, clients) = self.split();
        let client = lookup(clients, window)?;
        let fullscreen = client.fullscreen;
        let frame = &mut client.frame;
        if !frame.iconified {
            return Ok(());
        }

        if frame.is_framed() {
            let inner = frame.content_offset_geometry(env.metrics, fullscreen);
            env.gateway
                .reparent_window(window, frame.id(), inner.x, inner.y)
                .during("reparent_window")?;
        }
        env.gateway.map_window(window).during("map_window")?;
        if frame.is_framed() {
            env.gateway
                .map_window(frame.id())
                .during("map_window")?;
        }
        frame.iconified = false;

        env.gateway
            .set_wm_state(window, WmState::Normal)
            .during("set_wm_state")?;
        env.decorate(client);
        Ok(())
    }

    /// Put the client back on the root at its content position and destroy
    /// the decoration window. The client stays managed as a borderless
    /// frame. No-op for borderless frames.
    pub fn unframe(&mut self, window: Window) -> Result<(), FrameError> {
        let (env, clients) = self.split();
        let client = lookup(clients, window)?;
        let old = client.frame.id();
        let result = env.unframe(client);
        let id = client.frame.id();

        if id != old {
            self.by_frame.remove(&old);
            self.by_frame.insert(id, window);
            if self.last_click.is_some_and(|c| c.frame == old) {
                self.last_click = None;
            }
        }
        result
    }

    /// Stop managing a window and release everything its frame owns.
    pub fn unmanage(&mut self, window: Window, reason: UnmanageReason) -> Result<(), FrameError> {
        let mut client = self
            .clients
            .remove(&window)
            .ok_or(FrameError::UnknownClient(window))?;
        let id = client.frame.id();
        self.by_frame.remove(&id);
        if self.last_click.is_some_and(|c| c.frame == id) {
            self.last_click = None;
        }

        self.env().release(&mut client, reason);
        info!("Unmanaged window {:#x} ({:?})", window, reason);
        Ok(())
    }

    /// Shutdown teardown: every client ends up mapped on the root.
    pub fn unmanage_all(&mut self) {
        let windows: Vec<Window> = self.clients.keys().copied().collect();
        for window in windows {
            log_and_ignore(self.unmanage(window, UnmanageReason::Shutdown), "unmanage");
        }
        log_and_ignore(self.gateway.flush(), "flush");
    }

    /// Button press on a frame window at root position `pointer`.
    pub fn press(&mut self, frame_window: Window, pointer: Point, time: u32) -> Result<(), FrameError> {
        let window = self
            .client_for_frame(frame_window)
            .ok_or(FrameError::UnknownClient(frame_window))?;

        let title_click = {
            let (env, clients) = self.split();
            let client = lookup(clients, window)?;
            let frame = &mut client.frame;
            env.raise_and_focus(frame);
            frame.interaction.press(pointer, frame.geometry(), env.metrics);
            env.update_cursor(frame, pointer);
            frame.is_framed() && is_title_click(frame.geometry(), pointer, env.metrics)
        };

        if !title_click {
            self.last_click = None;
            return Ok(());
        }

        let double = self.behaviour.double_click_action == DoubleClickAction::Maximize
            && self.last_click.is_some_and(|c| {
                c.frame == frame_window
                    && time.wrapping_sub(c.time) <= self.behaviour.double_click_ms
            });
        if !double {
            self.last_click = Some(Click {
                frame: frame_window,
                time,
            });
            return Ok(());
        }

        self.last_click = None;
        if let Some(client) = self.clients.get_mut(&window) {
            client.frame.interaction = Interaction::Idle;
        }
        self.toggle_maximize(window)
    }

    /// Pointer moved with no button held: update the cursor only.
    pub fn pointer_motion(&mut self, frame_window: Window, pointer: Point) -> Result<(), FrameError> {
        let window = self
            .client_for_frame(frame_window)
            .ok_or(FrameError::UnknownClient(frame_window))?;
        let (env, clients) = self.split();
        let client = lookup(clients, window)?;
        env.update_cursor(&mut client.frame, pointer);
        Ok(())
    }

    /// Pointer moved with a button held: move or resize by the delta.
    pub fn drag(&mut self, frame_window: Window, pointer: Point) -> Result<(), FrameError> {
        let window = self
            .client_for_frame(frame_window)
            .ok_or(FrameError::UnknownClient(frame_window))?;
        let (env, clients) = self.split();
        let client = lookup(clients, window)?;
        let frame = &mut client.frame;
        let min_outer = frame.min_outer(env.metrics);
        let geometry = frame.geometry();
        match frame.interaction.drag(pointer, geometry, min_outer) {
            Some(next) => env.apply_geometry(client, next).map(|_| ()),
            None => Ok(()),
        }
    }

    /// Button release. Performs at most one title bar action, then confirms
    /// the final geometry.
    pub fn release(&mut self, frame_window: Window, pointer: Point) -> Result<ButtonAction, FrameError> {
        let window = self
            .client_for_frame(frame_window)
            .ok_or(FrameError::UnknownClient(frame_window))?;

        let action = {
            let (env, clients) = self.split();
            let client = lookup(clients, window)?;
            let frame = &mut client.frame;
            let action = frame
                .interaction
                .release(pointer, frame.geometry(), env.metrics);
            env.update_cursor(frame, pointer);
            if frame.is_framed() {
                action
            } else {
                ButtonAction::None
            }
        };

        match action {
            ButtonAction::Close => self.close(window)?,
            ButtonAction::ToggleMaximize => self.toggle_maximize(window)?,
            ButtonAction::Iconify => self.iconify(window)?,
            ButtonAction::None => {}
        }

        if let Some(geometry) = self.clients.get(&window).map(|c| c.frame.geometry()) {
            self.update_geometry(window, geometry)?;
        }
        Ok(action)
    }

    pub fn close(&self, window: Window) -> Result<(), FrameError> {
        if !self.is_managed(window) {
            return Err(FrameError::UnknownClient(window));
        }
        self.gateway.close_client(window).during("close_client")
    }

    /// Raise, focus and if necessary restore a client.
    pub fn activate(&mut self, window: Window) -> Result<(), FrameError> {
        self.uniconify(window)?;
        let (env, clients) = self.split();
        let client = lookup(clients, window)?;
        env.raise_and_focus(&client.frame);
        Ok(())
    }

    /// Expose on a frame window: copy the cached title bar back in.
    pub fn redraw(&mut self, frame_window: Window) -> Result<(), FrameError> {
        let window = self
            .client_for_frame(frame_window)
            .ok_or(FrameError::UnknownClient(frame_window))?;
        let (env, clients) = self.split();
        let client = lookup(clients, window)?;
        env.decorate(client);
        Ok(())
    }

    pub fn set_title(&mut self, window: Window, title: &str) -> Result<(), FrameError> {
        let (env, clients) = self.split();
        let client = lookup(clients, window)?;
        if client.title == title {
            return Ok(());
        }
        client.title = title.to_string();
        env.decorate(client);
        Ok(())
    }

    /// A fullscreen client fills its whole outer rectangle, sized to the
    /// screen, and its title bar is not drawn.
    pub fn set_fullscreen(&mut self, window: Window, fullscreen: bool) -> Result<(), FrameError> {
        let screen = self.gateway.screen_rect();
        let (env, clients) = self.split();
        let client = lookup(clients, window)?;
        if client.fullscreen == fullscreen {
            return Ok(());
        }

        let target = if fullscreen {
            client.fullscreen_restore = Some(client.frame.geometry());
            screen
        } else {
            client
                .fullscreen_restore
                .take()
                .unwrap_or(client.frame.geometry())
        };
        client.fullscreen = fullscreen;
        if fullscreen {
            env.raise_and_focus(&client.frame);
        }
        env.relayout(client, target)
    }

    pub fn set_min_size(&mut self, window: Window, min_size: Size) -> Result<(), FrameError> {
        let (env, clients) = self.split();
        let client = lookup(clients, window)?;
        client.frame.set_min_size(min_size);
        let geometry = client.frame.geometry();
        env.apply_geometry(client, geometry).map(|_| ())
    }

    /// Switch theme: new metrics for every frame and a full re-render.
    pub fn set_theme(&mut self, theme: Theme) {
        self.metrics = Metrics::from_theme(&theme);
        self.theme = theme;
        self.generation += 1;
        info!("Theme changed (generation {})", self.generation);

        let (env, clients) = self.split();
        for client in clients.values_mut() {
            let geometry = client.frame.geometry();
            let result = env
                .relayout(client, geometry)
                .and_then(|_| env.publish_state(&client.frame, state_of(&client.frame)));
            env.errors
                .warn_if_failed(result, "set_theme", ErrorCategory::Protocol);
        }
    }

    /// True if an unmap of `window` was caused by the manager itself.
    pub fn consume_unmap(&mut self, window: Window) -> bool {
        self.clients
            .get_mut(&window)
            .is_some_and(|c| c.frame.consume_unmap())
    }
}

fn state_of(frame: &Frame) -> WmState {
    if frame.iconified {
        WmState::Iconic
    } else {
        WmState::Normal
    }
}

/// A press on the bare title bar, away from the buttons.
fn is_title_click(frame: Rect, pointer: Point, metrics: &Metrics) -> bool {
    let rel_x = pointer.x as i32 - frame.x as i32;
    let rel_y = pointer.y as i32 - frame.y as i32;
    hit_zone(rel_x, rel_y, frame.width, frame.height, metrics) == Zone::TitleBar
        && button_zone(rel_x, rel_y, metrics) == ButtonAction::None
}
