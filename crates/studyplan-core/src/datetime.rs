use anyhow::anyhow;
use chrono::{
  Days,
  NaiveDate,
  NaiveDateTime,
  NaiveTime,
  Timelike
};

const TIME_FORMATS: [&str; 2] =
  ["%H:%M", "%H:%M:%S"];

#[tracing::instrument]
pub fn parse_time(
  raw: &str
) -> anyhow::Result<NaiveTime> {
  let trimmed = raw.trim();
  for format in TIME_FORMATS {
    if let Ok(time) =
      NaiveTime::parse_from_str(
        trimmed, format
      )
    {
      return Ok(time);
    }
  }

  Err(anyhow!(
    "invalid time '{trimmed}', \
     expected HH:MM"
  ))
}

#[tracing::instrument(skip(today))]
pub fn parse_date(
  raw: &str,
  today: NaiveDate
) -> anyhow::Result<NaiveDate> {
  let trimmed = raw.trim();
  match trimmed
    .to_ascii_lowercase()
    .as_str()
  {
    | "today" => return Ok(today),
    | "tomorrow" => {
      return today
        .checked_add_days(Days::new(1))
        .ok_or_else(|| {
          anyhow!("date out of range")
        });
    }
    | _ => {}
  }

  NaiveDate::parse_from_str(
    trimmed, "%Y-%m-%d"
  )
  .map_err(|_| {
    anyhow!(
      "invalid date '{trimmed}', \
       expected YYYY-MM-DD"
    )
  })
}

#[must_use]
pub fn minutes_since_midnight(
  time: NaiveTime
) -> u32 {
  time.hour() * 60 + time.minute()
}

/// `HH:MM` for a minute-of-day value.
#[must_use]
pub fn format_minutes(
  minutes: u32
) -> String {
  format!(
    "{:02}:{:02}",
    minutes / 60,
    minutes % 60
  )
}

/// "Friday, October 16, 2026"
#[must_use]
pub fn format_long_date(
  date: NaiveDate
) -> String {
  date
    .format("%A, %B %-d, %Y")
    .to_string()
}

/// "3:07:09 PM"
#[must_use]
pub fn format_clock(
  time: NaiveTime
) -> String {
  time
    .format("%-I:%M:%S %p")
    .to_string()
}

/// "Fri, Oct 16"
#[must_use]
pub fn format_task_date(
  date: NaiveDate
) -> String {
  date.format("%a, %b %-d").to_string()
}

#[must_use]
pub fn format_due(
  instant: NaiveDateTime
) -> String {
  format!(
    "{} at {}",
    format_task_date(instant.date()),
    instant.format("%H:%M")
  )
}

pub mod hm_time_serde {
  use chrono::{
    NaiveTime,
    Timelike
  };
  use serde::{
    Deserialize,
    Deserializer,
    Serializer
  };

  /// `HH:MM`, or `HH:MM:SS` when the
  /// seconds are not zero.
  pub fn serialize<S>(
    time: &NaiveTime,
    serializer: S
  ) -> Result<S::Ok, S::Error>
  where
    S: Serializer
  {
    let format = if time.second() == 0 {
      "%H:%M"
    } else {
      "%H:%M:%S"
    };
    serializer.serialize_str(
      &time.format(format).to_string()
    )
  }

  pub fn deserialize<'de, D>(
    deserializer: D
  ) -> Result<NaiveTime, D::Error>
  where
    D: Deserializer<'de>
  {
    let raw =
      String::deserialize(deserializer)?;
    super::parse_time(&raw)
      .map_err(serde::de::Error::custom)
  }
}
