use anyhow::anyhow;
use chrono::{
  NaiveDate,
  NaiveTime
};
use tracing::{
  instrument,
  warn
};

use crate::datetime::{
  parse_date,
  parse_time
};
use crate::task::{
  Category,
  TaskDraft
};

#[derive(Debug, Clone, PartialEq)]
enum Mod {
  Date(NaiveDate),
  Time(NaiveTime),
  Category(Category),
  Description(String)
}

/// Splits `add` arguments into title
/// words and `key:value` modifiers.
/// The date defaults to `today`; a bare
/// `--` makes every later token part of
/// the title.
#[instrument(skip(args, today))]
pub fn parse_add_args(
  args: &[String],
  today: NaiveDate
) -> anyhow::Result<TaskDraft> {
  let mut title_parts = Vec::new();
  let mut mods = Vec::new();

  let mut literal = false;
  for arg in args {
    if arg == "--" {
      literal = true;
      continue;
    }

    if !literal
      && let Some(one_mod) =
        parse_one_mod(arg, today)?
    {
      mods.push(one_mod);
      continue;
    }

    title_parts.push(arg.clone());
  }

  let mut draft = TaskDraft {
    title: title_parts.join(" "),
    date: Some(today),
    ..TaskDraft::default()
  };
  apply_mods(&mut draft, mods);
  Ok(draft)
}

fn parse_one_mod(
  tok: &str,
  today: NaiveDate
) -> anyhow::Result<Option<Mod>> {
  let Some((key, value)) =
    tok.split_once(':')
  else {
    return Ok(None);
  };

  let key = key.to_ascii_lowercase();

  match key.as_str() {
    | "date" | "due" => {
      Ok(Some(Mod::Date(parse_date(
        value, today
      )?)))
    }
    | "time" | "at" => {
      // `time:14:30` splits at the
      // first colon only.
      Ok(Some(Mod::Time(parse_time(
        value
      )?)))
    }
    | "category" | "cat" | "type" => {
      if value.trim().is_empty() {
        return Err(anyhow!(
          "category cannot be empty"
        ));
      }
      let category =
        Category::parse_lenient(value);
      if !value
        .eq_ignore_ascii_case(
          category.name()
        )
      {
        warn!(
          value,
          "unrecognised category; \
           using General"
        );
      }
      Ok(Some(Mod::Category(category)))
    }
    | "desc" | "description" => {
      Ok(Some(Mod::Description(
        value.to_string()
      )))
    }
    | _ => Ok(None)
  }
}

fn apply_mods(
  draft: &mut TaskDraft,
  mods: Vec<Mod>
) {
  for one_mod in mods {
    match one_mod {
      | Mod::Date(date) => {
        draft.date = Some(date);
      }
      | Mod::Time(time) => {
        draft.time = Some(time);
      }
      | Mod::Category(category) => {
        draft.category = Some(category);
      }
      | Mod::Description(text) => {
        draft.description =
          Some(match draft
            .description
            .take()
          {
            | Some(prev) => {
              format!("{prev} {text}")
            }
            | None => text
          });
      }
    }
  }
}
