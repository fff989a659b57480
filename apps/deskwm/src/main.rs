mod core;
mod ewmh;
mod window;

use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;

use anyhow::{anyhow, Context as _};
use clap::Parser;
use deskwm_config::WmConfig;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use x11rb::connection::Connection;
use x11rb::protocol::xproto::{ConnectionExt, CreateWindowAux, EventMask, Window, WindowClass};

use crate::core::context::Context;
use crate::window::manager::{is_connection_lost, WindowManager};

/// How often to retry root redirection while a replaced manager exits.
const REDIRECT_ATTEMPTS: u32 = 20;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Replace the existing window manager
    #[arg(long)]
    replace: bool,

    /// Configuration file (default: $XDG_CONFIG_HOME/deskwm/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// X display to connect to (default: $DISPLAY)
    #[arg(long)]
    display: Option<String>,

    /// Log filter, e.g. "debug" or "deskwm_frame=trace" (default: $RUST_LOG or info)
    #[arg(long = "log-level", value_name = "FILTER")]
    log_level: Option<String>,

    /// Print the effective configuration as TOML and exit
    #[arg(long = "dump-config")]
    dump_config: bool,

    /// Write the effective configuration to the config path and exit
    #[arg(long = "write-config")]
    write_config: bool,
}

fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn acquire_wm_selection(ctx: &Context, replace: bool) -> anyhow::Result<Window> {
    // ICCCM 2.8: WM_S<screen> manager selection
    let atom_name = format!("WM_S{}", ctx.screen_num);
    let wm_sn_atom = ctx
        .conn
        .intern_atom(false, atom_name.as_bytes())?
        .reply()?
        .atom;

    let owner = ctx.conn.get_selection_owner(wm_sn_atom)?.reply()?.owner;
    if owner != x11rb::NONE {
        if !replace {
            return Err(anyhow!(
                "Another window manager is already running on screen {}. Use --replace to replace it.",
                ctx.screen_num
            ));
        }
        info!("Another WM is running (window {:#x}), replacing...", owner);
    }

    let selection_win = ctx.conn.generate_id()?;
    ctx.conn.create_window(
        x11rb::COPY_DEPTH_FROM_PARENT,
        selection_win,
        ctx.root_window,
        -1,
        -1,
        1,
        1,
        0,
        WindowClass::INPUT_ONLY,
        x11rb::COPY_FROM_PARENT,
        &CreateWindowAux::new().event_mask(EventMask::STRUCTURE_NOTIFY),
    )?;
    ctx.conn
        .set_selection_owner(selection_win, wm_sn_atom, x11rb::CURRENT_TIME)?;

    let new_owner = ctx.conn.get_selection_owner(wm_sn_atom)?.reply()?.owner;
    if new_owner != selection_win {
        return Err(anyhow!("Failed to acquire WM selection {}", atom_name));
    }

    info!("Acquired WM selection: {}", atom_name);
    Ok(selection_win)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.log_level.as_deref());

    let config = WmConfig::load(args.config.as_deref()).context("cannot load configuration")?;
    if args.dump_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }
    if args.write_config {
        let path = args.config.clone().unwrap_or_else(WmConfig::default_path);
        config.save(&path)?;
        info!("Configuration written to {}", path.display());
        return Ok(());
    }

    info!("Starting deskwm...");
    let ctx = Context::new(args.display.as_deref())?;
    info!(
        "Connected to X11 server. Screen: {}, Root Window: {:#x} ({}x{})",
        ctx.screen_num, ctx.root_window, ctx.screen_width, ctx.screen_height
    );

    let selection_win = acquire_wm_selection(&ctx, args.replace)?;
    ctx.redirect_root(if args.replace { REDIRECT_ATTEMPTS } else { 1 })?;
    let check_win = crate::ewmh::setup::setup_hints(&ctx)?;

    let mut wm = WindowManager::new(&ctx, &config, check_win)?;
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| -> anyhow::Result<()> {
        wm.scan_windows()?;
        wm.run()
    }));

    // Whatever happened, hand every client back to the root.
    wm.shutdown();
    drop(wm);
    let _ = ctx.conn.destroy_window(selection_win);
    let _ = ctx.conn.flush();

    match outcome {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => {
            if is_connection_lost(&e) {
                error!("Fatal X11 error - server disconnected: {:#}", e);
            } else {
                error!("Window manager stopped: {:#}", e);
            }
            Err(e)
        }
        Err(_) => Err(anyhow!("window manager panicked, clients were released")),
    }
}
