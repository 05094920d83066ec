mod live;
mod modifiers;
mod planner;
mod task_ops;

use std::io::{self, Write};
use std::time::Duration;

use anyhow::anyhow;
use chrono::{Local, NaiveDateTime};
use tracing::{debug, info, instrument};

pub use live::{LiveOptions, run_live, spawn_stdin_lines};
pub use modifiers::parse_add_args;
pub use planner::cmd_schedule;
pub use task_ops::{
    DELETE_PROMPT, cmd_add, cmd_delete, cmd_done, cmd_list, cmd_move, cmd_progress,
};

use crate::app::AppState;
use crate::cli::Invocation;
use crate::config::{Config, Settings};
use crate::filter::FilterMode;
use crate::notify::Notifier;
use crate::render::Renderer;
use crate::timer::Timer;

const HELP_TEXT: &str = "\
usage: study [options] <command> [args]

commands:
  add <title…> [date:D] [time:HH:MM] [category:C] [desc:TEXT]
  list [all|pending|completed]
  done <n|id>                  toggle completion
  delete <n|id> [--yes]
  move <from> <to>
  progress
  schedule <start> <end> <subject, subject, …>
  timer [minutes]              focus countdown
  watch [all|pending|completed] live task list with due alarms
  clock
  show                         effective configuration
  help
  version

Commands may be abbreviated to any unique prefix.";

pub fn known_command_names() -> Vec<&'static str> {
    vec![
        "add", "list", "done", "delete", "move", "progress", "schedule", "timer", "watch",
        "clock", "show", "help", "version",
    ]
}

pub fn expand_command_abbrev<'a>(token: &'a str, known: &[&'a str]) -> Option<&'a str> {
    if known.contains(&token) {
        return Some(token);
    }

    let mut matches = known.iter().copied().filter(|name| name.starts_with(token));
    let first = matches.next()?;
    if matches.next().is_some() {
        None
    } else {
        Some(first)
    }
}

#[instrument(skip(app, cfg, settings, renderer, inv))]
pub fn dispatch<N: Notifier>(
    app: &mut AppState<N>,
    cfg: &Config,
    settings: &Settings,
    renderer: &Renderer,
    inv: Invocation,
) -> anyhow::Result<()> {
    let now = local_now();
    let command = inv.command.as_str();
    let args = &inv.command_args;

    debug!(command, args = ?args, "dispatching command");

    let mut out = io::stdout().lock();
    match command {
        "add" => cmd_add(app, args, now, &mut out),
        "list" => cmd_list(app, renderer, args, now, &mut out),
        "done" => cmd_done(app, args, &mut out),
        "delete" => cmd_delete(app, args, &mut io::stdin().lock(), &mut out),
        "move" => cmd_move(app, args, &mut out),
        "progress" => cmd_progress(app, renderer, &mut out),
        "schedule" => cmd_schedule(renderer, args, &mut out),
        "timer" => cmd_timer(app, settings, renderer, args, &mut out),
        "watch" => cmd_watch(app, settings, renderer, args, &mut out),
        "clock" => renderer.write_clock(&mut out, now),
        "show" => cmd_show(cfg, &mut out),
        "help" => {
            writeln!(out, "{HELP_TEXT}")?;
            Ok(())
        }
        "version" => {
            writeln!(out, "{}", env!("CARGO_PKG_VERSION"))?;
            Ok(())
        }
        other => Err(anyhow!("unknown command: {other}")),
    }
}

/// Runs a focus countdown in the foreground until it completes or the user
/// quits. An explicit minute count overrides `timer.minutes`.
#[instrument(skip(app, settings, renderer, args, out))]
fn cmd_timer<N: Notifier, W: Write>(
    app: &mut AppState<N>,
    settings: &Settings,
    renderer: &Renderer,
    args: &[String],
    out: &mut W,
) -> anyhow::Result<()> {
    info!("command timer");

    if let Some(raw) = args.first() {
        let minutes: u32 = raw
            .parse()
            .ok()
            .filter(|m| *m > 0)
            .ok_or_else(|| anyhow!("invalid timer length '{raw}', expected minutes"))?;
        app.timer = Timer::new(minutes.saturating_mul(60));
    }
    app.timer.start();

    let opts = LiveOptions {
        tick: Duration::from_secs(1),
        due_every: settings.due_interval,
        show_tasks: false,
        exit_on_timer: true,
    };
    run_live(app, renderer, out, spawn_stdin_lines(), opts, local_now)
}

#[instrument(skip(app, settings, renderer, args, out))]
fn cmd_watch<N: Notifier, W: Write>(
    app: &mut AppState<N>,
    settings: &Settings,
    renderer: &Renderer,
    args: &[String],
    out: &mut W,
) -> anyhow::Result<()> {
    info!("command watch");

    if let Some(raw) = args.first() {
        app.filter = raw.parse::<FilterMode>()?;
    }

    let opts = LiveOptions {
        tick: Duration::from_secs(1),
        due_every: settings.due_interval,
        show_tasks: true,
        exit_on_timer: false,
    };
    run_live(app, renderer, out, spawn_stdin_lines(), opts, local_now)
}

fn cmd_show<W: Write>(cfg: &Config, out: &mut W) -> anyhow::Result<()> {
    for (k, v) in cfg.iter() {
        writeln!(out, "{k}={v}")?;
    }
    Ok(())
}

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}
