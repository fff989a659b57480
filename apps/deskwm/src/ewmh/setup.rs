use anyhow::Result;
use x11rb::connection::Connection;
use x11rb::protocol::xproto::{
    Atom, AtomEnum, ConnectionExt, CreateWindowAux, PropMode, Window, WindowClass,
};
use x11rb::wrapper::ConnectionExt as _;

use crate::core::context::Context;

pub const WM_NAME: &str = "deskwm";

/// Publish `_NET_SUPPORTING_WM_CHECK` and `_NET_SUPPORTED`. Returns the check window.
pub fn setup_hints(ctx: &Context) -> Result<Window> {
    let check_win = ctx.conn.generate_id()?;
    ctx.conn.create_window(
        x11rb::COPY_DEPTH_FROM_PARENT,
        check_win,
        ctx.root_window,
        -1,
        -1,
        1,
        1,
        0,
        WindowClass::INPUT_OUTPUT,
        x11rb::COPY_FROM_PARENT,
        &CreateWindowAux::new(),
    )?;

    for window in [check_win, ctx.root_window] {
        ctx.conn.change_property32(
            PropMode::REPLACE,
            window,
            ctx.atoms._NET_SUPPORTING_WM_CHECK,
            AtomEnum::WINDOW,
            &[check_win],
        )?;
    }

    ctx.conn.change_property8(
        PropMode::REPLACE,
        check_win,
        ctx.atoms._NET_WM_NAME,
        ctx.atoms.UTF8_STRING,
        WM_NAME.as_bytes(),
    )?;

    let supported = [
        ctx.atoms._NET_SUPPORTED,
        ctx.atoms._NET_SUPPORTING_WM_CHECK,
        ctx.atoms._NET_CLIENT_LIST,
        ctx.atoms._NET_ACTIVE_WINDOW,
        ctx.atoms._NET_CLOSE_WINDOW,
        ctx.atoms._NET_FRAME_EXTENTS,
        ctx.atoms._NET_WM_NAME,
        ctx.atoms._NET_WM_STATE,
        ctx.atoms._NET_WM_STATE_FULLSCREEN,
        ctx.atoms._NET_WM_STATE_MAXIMIZED_VERT,
        ctx.atoms._NET_WM_STATE_MAXIMIZED_HORZ,
        ctx.atoms._NET_WM_STATE_HIDDEN,
        ctx.atoms._NET_WM_WINDOW_TYPE,
        ctx.atoms._NET_WM_WINDOW_TYPE_NORMAL,
        ctx.atoms._NET_WM_WINDOW_TYPE_DIALOG,
        ctx.atoms._NET_WM_WINDOW_TYPE_DOCK,
        ctx.atoms._NET_WM_WINDOW_TYPE_DESKTOP,
        ctx.atoms._NET_WM_WINDOW_TYPE_SPLASH,
        ctx.atoms._NET_WM_WINDOW_TYPE_NOTIFICATION,
    ];
    ctx.conn.change_property32(
        PropMode::REPLACE,
        ctx.root_window,
        ctx.atoms._NET_SUPPORTED,
        AtomEnum::ATOM,
        &supported,
    )?;

    Ok(check_win)
}

pub fn update_client_list(ctx: &Context, windows: &[Window]) -> Result<()> {
    ctx.conn.change_property32(
        PropMode::REPLACE,
        ctx.root_window,
        ctx.atoms._NET_CLIENT_LIST,
        AtomEnum::WINDOW,
        windows,
    )?;
    Ok(())
}

pub fn set_active_window(ctx: &Context, window: Window) -> Result<()> {
    ctx.conn.change_property32(
        PropMode::REPLACE,
        ctx.root_window,
        ctx.atoms._NET_ACTIVE_WINDOW,
        AtomEnum::WINDOW,
        &[window],
    )?;
    Ok(())
}

pub fn set_net_wm_state(ctx: &Context, window: Window, states: &[Atom]) -> Result<()> {
    ctx.conn.change_property32(
        PropMode::REPLACE,
        window,
        ctx.atoms._NET_WM_STATE,
        AtomEnum::ATOM,
        states,
    )?;
    Ok(())
}

/// Remove the EWMH hints on the way out.
pub fn teardown_hints(ctx: &Context, check_win: Window) -> Result<()> {
    ctx.conn
        .delete_property(ctx.root_window, ctx.atoms._NET_SUPPORTING_WM_CHECK)?;
    ctx.conn.delete_property(ctx.root_window, ctx.atoms._NET_SUPPORTED)?;
    ctx.conn.delete_property(ctx.root_window, ctx.atoms._NET_CLIENT_LIST)?;
    ctx.conn.destroy_window(check_win)?;
    ctx.conn.flush()?;
    Ok(())
}
