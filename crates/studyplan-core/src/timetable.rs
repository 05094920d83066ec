//! Daily study timetable: equal subject
//! blocks separated by fixed breaks.

use chrono::NaiveTime;
use thiserror::Error;
use tracing::debug;

use crate::datetime::{
  format_minutes,
  minutes_since_midnight
};

pub const BREAK_MINUTES: u32 = 15;
pub const MIN_BLOCK_MINUTES: i64 = 15;

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Error,
)]
pub enum TimetableError {
  #[error(
    "End time must be after start \
     time!"
  )]
  InvalidRange,
  #[error(
    "Not enough time for all \
     subjects! Try fewer subjects or \
     extend your study time."
  )]
  InsufficientTime,
  #[error(
    "At least one subject is \
     required."
  )]
  NoSubjects
}

#[derive(
  Debug, Clone, PartialEq, Eq,
)]
pub enum TimetableBlock {
  Subject {
    label:        String,
    start_minute: u32,
    end_minute:   u32
  },
  Break {
    start_minute: u32,
    end_minute:   u32
  }
}

impl TimetableBlock {
  pub fn start_minute(&self) -> u32 {
    match self {
      | TimetableBlock::Subject {
        start_minute,
        ..
      }
      | TimetableBlock::Break {
        start_minute,
        ..
      } => *start_minute
    }
  }

  pub fn end_minute(&self) -> u32 {
    match self {
      | TimetableBlock::Subject {
        end_minute,
        ..
      }
      | TimetableBlock::Break {
        end_minute,
        ..
      } => *end_minute
    }
  }

  pub fn label(&self) -> &str {
    match self {
      | TimetableBlock::Subject {
        label,
        ..
      } => label,
      | TimetableBlock::Break {
        ..
      } => "Break"
    }
  }

  /// `HH:MM - HH:MM`
  pub fn span(&self) -> String {
    format!(
      "{} - {}",
      format_minutes(
        self.start_minute()
      ),
      format_minutes(self.end_minute())
    )
  }
}

#[derive(
  Debug, Clone, PartialEq, Eq,
)]
pub struct Timetable {
  pub blocks:           Vec<TimetableBlock>,
  /// Minutes between the last block and
  /// the requested end time.
  pub leftover_minutes: u32
}

impl Timetable {
  pub fn end_minute(
    &self
  ) -> Option<u32> {
    self
      .blocks
      .last()
      .map(TimetableBlock::end_minute)
  }
}

/// Splits a comma separated subject list,
/// trimming names and dropping blanks.
pub fn parse_subjects(
  raw: &str
) -> Vec<String> {
  raw
    .split(',')
    .map(str::trim)
    .filter(|name| !name.is_empty())
    .map(str::to_string)
    .collect()
}

#[tracing::instrument(skip(subjects), fields(subject_count = subjects.len()))]
pub fn generate(
  start: NaiveTime,
  end: NaiveTime,
  subjects: &[String]
) -> Result<Timetable, TimetableError> {
  let start_m =
    minutes_since_midnight(start);
  let end_m =
    minutes_since_midnight(end);
  let total =
    i64::from(end_m) - i64::from(start_m);

  if total <= 0 {
    return Err(
      TimetableError::InvalidRange
    );
  }
  if subjects.is_empty() {
    return Err(
      TimetableError::NoSubjects
    );
  }

  let count = subjects.len() as i64;
  let breaks = count - 1;
  let block = (total
    - i64::from(BREAK_MINUTES) * breaks)
    .div_euclid(count);

  // A lone subject has no break to
  // outlast, so any positive range fits.
  let minimum = if breaks == 0 {
    1
  } else {
    MIN_BLOCK_MINUTES
  };
  if block < minimum {
    return Err(
      TimetableError::InsufficientTime
    );
  }
  let block = block as u32;

  let mut blocks = Vec::with_capacity(
    subjects.len() * 2 - 1
  );
  let mut cursor = start_m;
  for (idx, subject) in
    subjects.iter().enumerate()
  {
    blocks.push(
      TimetableBlock::Subject {
        label:        subject.clone(),
        start_minute: cursor,
        end_minute:   cursor + block
      }
    );
    cursor += block;

    if idx + 1 < subjects.len() {
      blocks.push(
        TimetableBlock::Break {
          start_minute: cursor,
          end_minute:   cursor
            + BREAK_MINUTES
        }
      );
      cursor += BREAK_MINUTES;
    }
  }

  let leftover_minutes = end_m - cursor;
  debug!(
    block_minutes = block,
    leftover_minutes,
    "generated timetable"
  );

  Ok(Timetable {
    blocks,
    leftover_minutes
  })
}

#[cfg(test)]
mod tests {
  use chrono::NaiveTime;

  use super::*;

  fn at(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0)
      .expect("valid time")
  }

  fn subjects(
    names: &[&str]
  ) -> Vec<String> {
    names
      .iter()
      .map(|name| name.to_string())
      .collect()
  }

  #[test]
  fn full_day_four_subjects() {
    let table = generate(
      at(9, 0),
      at(17, 0),
      &subjects(&[
        "Math",
        "Physics",
        "Chemistry",
        "Biology"
      ])
    )
    .expect("timetable");

    assert_eq!(table.blocks.len(), 7);
    assert_eq!(
      table.blocks[0].span(),
      "09:00 - 10:48"
    );
    assert_eq!(
      table.blocks[0].label(),
      "Math"
    );
    assert_eq!(
      table.blocks[1],
      TimetableBlock::Break {
        start_minute: 648,
        end_minute:   663
      }
    );
    assert_eq!(
      table.blocks[6].label(),
      "Biology"
    );
    let end =
      table.end_minute().expect("end");
    assert!(end <= 17 * 60);
    assert_eq!(
      table.leftover_minutes,
      17 * 60 - end
    );
    assert_eq!(table.leftover_minutes, 3);
  }

  #[test]
  fn blocks_tile_without_gaps() {
    let table = generate(
      at(8, 30),
      at(12, 10),
      &subjects(&["A", "B", "C"])
    )
    .expect("timetable");

    for pair in table.blocks.windows(2) {
      assert_eq!(
        pair[0].end_minute(),
        pair[1].start_minute()
      );
    }
    assert_eq!(
      table.blocks[0].start_minute(),
      8 * 60 + 30
    );
  }

  #[test]
  fn single_subject_has_no_break() {
    let table = generate(
      at(9, 0),
      at(9, 10),
      &subjects(&["Math"])
    )
    .expect("timetable");
    assert_eq!(
      table.blocks,
      vec![TimetableBlock::Subject {
        label:        "Math".to_string(),
        start_minute: 540,
        end_minute:   550
      }]
    );
    assert_eq!(table.leftover_minutes, 0);
  }

  #[test]
  fn short_range_is_insufficient() {
    assert_eq!(
      generate(
        at(9, 0),
        at(9, 5),
        &subjects(&["Math", "Physics"])
      ),
      Err(TimetableError::InsufficientTime)
    );
    assert_eq!(
      generate(
        at(9, 0),
        at(9, 44),
        &subjects(&["Math", "Physics"])
      ),
      Err(TimetableError::InsufficientTime)
    );
  }

  #[test]
  fn reversed_or_empty_range_is_invalid() {
    assert_eq!(
      generate(
        at(17, 0),
        at(9, 0),
        &subjects(&["Math"])
      ),
      Err(TimetableError::InvalidRange)
    );
    assert_eq!(
      generate(
        at(9, 0),
        at(9, 0),
        &subjects(&["Math"])
      ),
      Err(TimetableError::InvalidRange)
    );
  }

  #[test]
  fn requires_subjects() {
    assert_eq!(
      generate(at(9, 0), at(10, 0), &[]),
      Err(TimetableError::NoSubjects)
    );
  }

  #[test]
  fn parses_subject_list() {
    assert_eq!(
      parse_subjects(
        " Math, Physics ,,Chemistry, "
      ),
      subjects(&[
        "Math",
        "Physics",
        "Chemistry"
      ])
    );
  }
}
