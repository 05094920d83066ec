use std::io::{
  BufRead,
  Write
};

use anyhow::{
  Context,
  anyhow
};
use chrono::NaiveDateTime;
use tracing::{
  info,
  instrument
};

use super::modifiers::parse_add_args;
use crate::app::AppState;
use crate::filter::FilterMode;
use crate::notify::Notifier;
use crate::render::Renderer;

pub const DELETE_PROMPT: &str =
  "Are you sure you want to delete \
   this task? [y/N] ";

#[instrument(skip(
  app, args, now, out
))]
pub fn cmd_add<N: Notifier, W: Write>(
  app: &mut AppState<N>,
  args: &[String],
  now: NaiveDateTime,
  out: &mut W
) -> anyhow::Result<()> {
  info!("command add");

  let draft =
    parse_add_args(args, now.date())?;
  let task = app.add(draft)?;
  let position = app
    .repo()
    .position_of(task.id)
    .map(|pos| pos + 1)
    .unwrap_or_default();

  writeln!(
    out,
    "Created task {position}."
  )?;
  Ok(())
}

#[instrument(skip(
  app, renderer, args, now, out
))]
pub fn cmd_list<N: Notifier, W: Write>(
  app: &mut AppState<N>,
  renderer: &Renderer,
  args: &[String],
  now: NaiveDateTime,
  out: &mut W
) -> anyhow::Result<()> {
  info!("command list");

  app.filter = match args.first() {
    | Some(raw) => {
      raw.parse::<FilterMode>()?
    }
    | None => FilterMode::All
  };
  app.render(renderer, out, now)
}

#[instrument(skip(app, args, out))]
pub fn cmd_done<N: Notifier, W: Write>(
  app: &mut AppState<N>,
  args: &[String],
  out: &mut W
) -> anyhow::Result<()> {
  info!("command done");

  let selector =
    single_selector(args, "done")?;
  let Some(id) = app.resolve(selector)
  else {
    writeln!(
      out,
      "No task matches '{selector}'."
    )?;
    return Ok(());
  };

  match app.toggle_complete(id)? {
    | Some(true) => {
      writeln!(
        out,
        "Marked task {selector} as \
         completed."
      )?
    }
    | Some(false) => {
      writeln!(
        out,
        "Marked task {selector} as \
         pending."
      )?
    }
    | None => {
      writeln!(
        out,
        "No task matches \
         '{selector}'."
      )?
    }
  }

  let progress = app.repo().progress();
  writeln!(
    out,
    "{progress}  {}%",
    progress.percent()
  )?;
  Ok(())
}

/// Deletes after a y/N confirmation read
/// from `input`; `--yes` skips the
/// question.
#[instrument(skip(
  app, args, input, out
))]
pub fn cmd_delete<
  N: Notifier,
  R: BufRead,
  W: Write
>(
  app: &mut AppState<N>,
  args: &[String],
  input: &mut R,
  out: &mut W
) -> anyhow::Result<()> {
  info!("command delete");

  let assume_yes = args
    .iter()
    .any(|a| a == "--yes" || a == "-y");
  let rest: Vec<String> = args
    .iter()
    .filter(|a| {
      *a != "--yes" && *a != "-y"
    })
    .cloned()
    .collect();
  let selector =
    single_selector(&rest, "delete")?;

  let Some(id) = app.resolve(selector)
  else {
    writeln!(
      out,
      "No task matches '{selector}'."
    )?;
    return Ok(());
  };

  if !assume_yes {
    let title = app
      .repo()
      .get(id)
      .map(|task| task.title.clone())
      .unwrap_or_default();
    write!(
      out,
      "\"{title}\": {DELETE_PROMPT}"
    )?;
    out.flush()?;

    let mut answer = String::new();
    input
      .read_line(&mut answer)
      .context(
        "failed to read confirmation"
      )?;
    if !matches!(
      answer
        .trim()
        .to_ascii_lowercase()
        .as_str(),
      "y" | "yes"
    ) {
      writeln!(out, "Kept task.")?;
      return Ok(());
    }
  }

  match app.delete(id)? {
    | Some(task) => {
      writeln!(
        out,
        "Deleted \"{}\".",
        task.title
      )?
    }
    | None => {
      writeln!(
        out,
        "No task matches \
         '{selector}'."
      )?
    }
  }
  Ok(())
}

#[instrument(skip(app, args, out))]
pub fn cmd_move<N: Notifier, W: Write>(
  app: &mut AppState<N>,
  args: &[String],
  out: &mut W
) -> anyhow::Result<()> {
  info!("command move");

  let [from, to] = args else {
    return Err(anyhow!(
      "move requires <from> <to> \
       positions"
    ));
  };
  let from = parse_position(from)?;
  let to = parse_position(to)?;

  if app.reorder(from, to)? {
    writeln!(
      out,
      "Moved task {} to position {}.",
      from + 1,
      to + 1
    )?;
  } else {
    writeln!(
      out,
      "Nothing moved: positions must \
       be between 1 and {}.",
      app.repo().len()
    )?;
  }
  Ok(())
}

pub fn cmd_progress<
  N: Notifier,
  W: Write
>(
  app: &AppState<N>,
  renderer: &Renderer,
  out: &mut W
) -> anyhow::Result<()> {
  renderer
    .write_progress(out, app.repo().progress())
}

fn single_selector<'a>(
  args: &'a [String],
  command: &str
) -> anyhow::Result<&'a str> {
  match args {
    | [one] => Ok(one.as_str()),
    | _ => {
      Err(anyhow!(
        "{command} requires exactly \
         one task number or id"
      ))
    }
  }
}

fn parse_position(
  raw: &str
) -> anyhow::Result<usize> {
  raw
    .parse::<usize>()
    .ok()
    .and_then(|n| n.checked_sub(1))
    .ok_or_else(|| {
      anyhow!(
        "invalid position '{raw}', \
         expected a list number"
      )
    })
}
