//! ICCCM, EWMH and Motif properties that decide how a client is framed.

use anyhow::Result;
use deskwm_frame::{Decor, Size};
use x11rb::protocol::xproto::{Atom, AtomEnum, ConnectionExt, Window};

use crate::core::context::Context;

const MWM_HINTS_DECORATIONS: u32 = 1 << 1;
const P_BASE_SIZE: u32 = 1 << 3;
const P_MIN_SIZE: u32 = 1 << 4;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowHints {
    pub title: String,
    pub min_size: Size,
    pub window_types: Vec<Atom>,
    pub transient_for: Option<Window>,
    /// `Some(false)` when Motif hints turn decorations off.
    pub motif_decorations: Option<bool>,
    pub fullscreen: bool,
}

impl WindowHints {
    pub fn read(ctx: &Context, window: Window) -> Result<Self> {
        let atoms = &ctx.atoms;
        let transient = read_u32s(ctx, window, atoms.WM_TRANSIENT_FOR, AtomEnum::WINDOW.into(), 1)?;
        let motif = read_u32s(ctx, window, atoms._MOTIF_WM_HINTS, AtomEnum::ANY.into(), 5)?;
        let window_types = read_u32s(
            ctx,
            window,
            atoms._NET_WM_WINDOW_TYPE,
            AtomEnum::ATOM.into(),
            32,
        )?;
        let states = read_u32s(ctx, window, atoms._NET_WM_STATE, AtomEnum::ATOM.into(), 32)?;

        Ok(Self {
            title: read_title(ctx, window)?,
            min_size: read_min_size(ctx, window)?,
            window_types,
            transient_for: transient.first().copied().filter(|&w| w != x11rb::NONE),
            motif_decorations: parse_motif_decorations(&motif),
            fullscreen: states.contains(&atoms._NET_WM_STATE_FULLSCREEN),
        })
    }

    pub fn decor(&self, ctx: &Context) -> Decor {
        decor_for(
            &self.window_types,
            &borderless_types(ctx),
            self.motif_decorations,
        )
    }

    /// Dialogs and transients are centered rather than cascaded.
    pub fn is_dialog(&self, ctx: &Context) -> bool {
        self.transient_for.is_some()
            || self
                .window_types
                .contains(&ctx.atoms._NET_WM_WINDOW_TYPE_DIALOG)
    }
}

fn borderless_types(ctx: &Context) -> [Atom; 4] {
    [
        ctx.atoms._NET_WM_WINDOW_TYPE_DOCK,
        ctx.atoms._NET_WM_WINDOW_TYPE_DESKTOP,
        ctx.atoms._NET_WM_WINDOW_TYPE_SPLASH,
        ctx.atoms._NET_WM_WINDOW_TYPE_NOTIFICATION,
    ]
}

fn read_u32s(
    ctx: &Context,
    window: Window,
    property: Atom,
    type_: Atom,
    len: u32,
) -> Result<Vec<u32>> {
    let reply = ctx
        .conn
        .get_property(false, window, property, type_, 0, len)?
        .reply()?;
    Ok(reply.value32().map(|v| v.collect()).unwrap_or_default())
}

/// `_NET_WM_NAME`, falling back to the legacy `WM_NAME`.
pub fn read_title(ctx: &Context, window: Window) -> Result<String> {
    let reply = ctx
        .conn
        .get_property(
            false,
            window,
            ctx.atoms._NET_WM_NAME,
            ctx.atoms.UTF8_STRING,
            0,
            1024,
        )?
        .reply()?;
    if !reply.value.is_empty() {
        return Ok(String::from_utf8_lossy(&reply.value).into_owned());
    }

    let reply = ctx
        .conn
        .get_property(false, window, AtomEnum::WM_NAME, AtomEnum::STRING, 0, 1024)?
        .reply()?;
    Ok(String::from_utf8_lossy(&reply.value).into_owned())
}

pub fn read_min_size(ctx: &Context, window: Window) -> Result<Size> {
    let hints = read_u32s(
        ctx,
        window,
        ctx.atoms.WM_NORMAL_HINTS,
        AtomEnum::WM_SIZE_HINTS.into(),
        18,
    )?;
    Ok(parse_min_size(&hints))
}

/// Decorations field of `_MOTIF_WM_HINTS`, if the flags say it is set.
pub fn parse_motif_decorations(values: &[u32]) -> Option<bool> {
    match values {
        [flags, _functions, decorations, ..] if flags & MWM_HINTS_DECORATIONS != 0 => {
            Some(*decorations != 0)
        }
        _ => None,
    }
}

/// Minimum client size from `WM_NORMAL_HINTS`. The base size stands in
/// when no minimum is given.
pub fn parse_min_size(values: &[u32]) -> Size {
    let Some(&flags) = values.first() else {
        return Size::default();
    };
    let pair = |w: usize, h: usize| match (values.get(w), values.get(h)) {
        (Some(&width), Some(&height)) => Size::new(clamp_u16(width), clamp_u16(height)),
        _ => Size::default(),
    };
    if flags & P_MIN_SIZE != 0 {
        pair(5, 6)
    } else if flags & P_BASE_SIZE != 0 {
        pair(15, 16)
    } else {
        Size::default()
    }
}

fn clamp_u16(value: u32) -> u16 {
    // Sizes are signed 32-bit on the wire.
    (value as i32).clamp(0, u16::MAX as i32) as u16
}

pub fn decor_for(window_types: &[Atom], borderless: &[Atom], motif: Option<bool>) -> Decor {
    if motif == Some(false) || window_types.iter().any(|t| borderless.contains(t)) {
        Decor::Borderless
    } else {
        Decor::Framed
    }
}
