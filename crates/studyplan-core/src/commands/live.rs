//! Foreground event loop for the `timer`
//! and `watch` commands. One thread runs
//! every handler to completion: typed
//! lines arrive over a channel, and the
//! clock tick, due check and countdown
//! tick are polled intervals.

use std::io::{
  self,
  BufRead,
  Write
};
use std::sync::mpsc::{
  self,
  Receiver,
  RecvTimeoutError
};
use std::thread;
use std::time::{
  Duration,
  Instant
};

use chrono::NaiveDateTime;
use tracing::{
  debug,
  info,
  warn
};

use crate::app::AppState;
use crate::datetime::format_clock;
use crate::filter::FilterMode;
use crate::notify::Notifier;
use crate::render::Renderer;
use crate::schedule::{
  Interval,
  next_wakeup
};
use crate::timer::TimerEvent;

pub const LIVE_HELP: &str =
  "keys: <enter>/p start-pause  r \
   reset  all|pending|completed  \
   done <n>  x [n] dismiss  q quit";

#[derive(Debug, Clone, Copy)]
pub struct LiveOptions {
  pub tick:           Duration,
  pub due_every:      Duration,
  pub show_tasks:     bool,
  /// Leave the loop once the countdown
  /// completes.
  pub exit_on_timer:  bool
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
enum Flow {
  Continue,
  Quit
}

/// Forwards stdin lines until EOF.
pub fn spawn_stdin_lines()
-> Receiver<String> {
  let (tx, rx) = mpsc::channel();
  thread::spawn(move || {
    for line in io::stdin().lock().lines()
    {
      let Ok(line) = line else {
        break;
      };
      if tx.send(line).is_err() {
        break;
      }
    }
    debug!("stdin closed");
  });
  rx
}

#[tracing::instrument(skip_all, fields(show_tasks = opts.show_tasks))]
pub fn run_live<N, W, F>(
  app: &mut AppState<N>,
  renderer: &Renderer,
  out: &mut W,
  input: Receiver<String>,
  opts: LiveOptions,
  now: F
) -> anyhow::Result<()>
where
  N: Notifier,
  W: Write,
  F: Fn() -> NaiveDateTime
{
  info!("entering live loop");
  let start = Instant::now();
  let mut clock =
    Interval::new(opts.tick, start);
  let mut due =
    Interval::new(opts.due_every, start);
  let mut input = Some(input);

  writeln!(out, "{LIVE_HELP}")?;
  if opts.show_tasks {
    app.render(renderer, &mut *out, now())?;
  }
  write_status(app, renderer, out, now())?;

  loop {
    let wait = next_wakeup(
      &[&clock, &due],
      Instant::now()
    );
    let received = match &input {
      | Some(rx) => {
        Some(rx.recv_timeout(wait))
      }
      | None => {
        thread::sleep(wait);
        None
      }
    };

    match received {
      | Some(Ok(line)) => {
        if handle_line(
          app,
          renderer,
          out,
          &line,
          now()
        )? == Flow::Quit
        {
          break;
        }
      }
      | Some(Err(
        RecvTimeoutError::Disconnected
      )) => {
        debug!("input closed; continuing without it");
        input = None;
      }
      | Some(Err(
        RecvTimeoutError::Timeout
      ))
      | None => {}
    }

    let instant = Instant::now();
    if clock.fire(instant) {
      app.toasts_mut().prune(instant);
      let event = app.tick_timer();
      write_status(
        app, renderer, out, now()
      )?;
      if event == TimerEvent::Completed
        && opts.exit_on_timer
      {
        writeln!(out)?;
        break;
      }
    }

    if due.fire(instant)
      && app.check_due(now())? > 0
      && opts.show_tasks
    {
      writeln!(out)?;
      app.render(
        renderer,
        &mut *out,
        now()
      )?;
    }

    if input.is_none()
      && opts.exit_on_timer
      && !app.timer.is_running()
    {
      writeln!(out)?;
      break;
    }
  }

  info!("left live loop");
  Ok(())
}

fn handle_line<N, W>(
  app: &mut AppState<N>,
  renderer: &Renderer,
  out: &mut W,
  line: &str,
  now: NaiveDateTime
) -> anyhow::Result<Flow>
where
  N: Notifier,
  W: Write
{
  let mut words = line.split_whitespace();
  let head = words
    .next()
    .unwrap_or("")
    .to_ascii_lowercase();
  let arg = words.next();

  match head.as_str() {
    | "" | "p" | "t" => app.timer.toggle(),
    | "r" => app.timer.reset(),
    | "q" | "quit" => {
      return Ok(Flow::Quit);
    }
    | "all" | "pending"
    | "completed" => {
      app.filter =
        head.parse::<FilterMode>()?;
      writeln!(out)?;
      app.render(renderer, &mut *out, now)?;
    }
    | "done" => {
      match arg.and_then(|sel| app.resolve(sel)) {
        | Some(id) => {
          app.toggle_complete(id)?;
          writeln!(out)?;
          app.render(
            renderer,
            &mut *out,
            now
          )?;
        }
        | None => {
          writeln!(out, "\nNo such task.")?
        }
      }
    }
    | "x" => {
      // Bare `x` targets the toast on the
      // status line, which is the newest.
      let newest = app
        .toasts()
        .visible()
        .len()
        .saturating_sub(1);
      let index = match arg {
        | Some(n) => {
          n.parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
        }
        | None => Some(newest)
      };
      if let Some(index) = index {
        app.toasts_mut().dismiss(index);
      }
    }
    | other => {
      warn!(input = other, "unrecognised live input");
      writeln!(out, "\n{LIVE_HELP}")?;
    }
  }

  write_status(app, renderer, out, now)?;
  Ok(Flow::Continue)
}

fn write_status<N, W>(
  app: &AppState<N>,
  renderer: &Renderer,
  out: &mut W,
  now: NaiveDateTime
) -> anyhow::Result<()>
where
  N: Notifier,
  W: Write
{
  let toast = app
    .toasts()
    .visible()
    .last()
    .map(|toast| {
      format!("  🔔 {}", toast.message)
    })
    .unwrap_or_default();
  write!(
    out,
    "\r\x1b[2K{}  ",
    format_clock(now.time())
  )?;
  renderer.write_timer(
    &mut *out,
    &app.timer
  )?;
  write!(out, "{toast}")?;
  out.flush()?;
  Ok(())
}
