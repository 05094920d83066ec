use std::io::Write;

use anyhow::anyhow;
use tracing::{
  info,
  instrument,
  warn
};

use crate::datetime::parse_time;
use crate::render::Renderer;
use crate::timetable::{
  generate,
  parse_subjects
};

/// `schedule <start> <end> <subjects…>`
/// where subjects are comma separated.
/// Validation failures are printed in
/// place of the table and are not
/// command errors.
#[instrument(skip(renderer, args, out))]
pub fn cmd_schedule<W: Write>(
  renderer: &Renderer,
  args: &[String],
  out: &mut W
) -> anyhow::Result<()> {
  info!("command schedule");

  let [start, end, subjects @ ..] = args
  else {
    return Err(anyhow!(
      "schedule requires <start> <end> \
       <subject, subject, ...>"
    ));
  };

  let start = parse_time(start)?;
  let end = parse_time(end)?;
  let subjects =
    parse_subjects(&subjects.join(" "));

  match generate(start, end, &subjects) {
    | Ok(table) => {
      renderer.write_timetable(out, &table)
    }
    | Err(err) => {
      warn!(error = %err, "timetable rejected");
      renderer
        .write_timetable_error(out, err)
    }
  }
}
