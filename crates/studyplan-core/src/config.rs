//! Settings are layered: built-in
//! defaults, then the studyrc file, then
//! `--rc` overrides. The raw strings are
//! checked once by [`Config::settings`],
//! before any command runs.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::path::{
  Path,
  PathBuf
};
use std::time::Duration;

use anyhow::{
  Context,
  anyhow,
  bail
};
use tracing::{
  debug,
  info,
  trace,
  warn
};

use crate::render::Theme;

const STUDYRC_ENV: &str = "STUDYRC";
const MAX_INCLUDE_DEPTH: usize = 8;

const DEFAULTS: [(&str, &str); 8] = [
  ("data.location", "~/.studyplan"),
  ("default.command", "list"),
  ("color", "on"),
  ("theme", "mint"),
  ("dark", "off"),
  ("timer.minutes", "25"),
  ("due.interval", "60"),
  ("notify.bell", "on")
];

/// Validated view of the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
  pub data_location:   PathBuf,
  pub default_command: String,
  pub color:           bool,
  pub theme:           Theme,
  pub dark:            bool,
  pub timer_minutes:   u32,
  pub due_interval:    Duration,
  pub bell:            bool
}

impl Settings {
  pub fn timer_secs(&self) -> u32 {
    self.timer_minutes.saturating_mul(60)
  }

  /// `--data` wins over `data.location`.
  pub fn data_dir(
    &self,
    explicit: Option<&Path>
  ) -> PathBuf {
    explicit
      .map(expand_tilde)
      .unwrap_or_else(|| {
        self.data_location.clone()
      })
  }
}

#[derive(Debug, Clone)]
pub struct Config {
  map:              BTreeMap<String, String>,
  pub loaded_files: Vec<PathBuf>
}

impl Default for Config {
  fn default() -> Self {
    Self {
      map:          DEFAULTS
        .iter()
        .map(|(k, v)| {
          (k.to_string(), v.to_string())
        })
        .collect(),
      loaded_files: vec![]
    }
  }
}

enum RcLine<'a> {
  Blank,
  Include(&'a str),
  Entry(&'a str, &'a str)
}

impl Config {
  #[tracing::instrument]
  pub fn load(
    studyrc: Option<&Path>
  ) -> anyhow::Result<Self> {
    let mut cfg = Config::default();
    match locate_studyrc(studyrc) {
      | Some(path) => {
        info!(studyrc = %path.display(), "loading studyrc");
        cfg.read_file(&path, 0)?;
      }
      | None => {
        debug!("no studyrc; using built-in defaults");
      }
    }
    Ok(cfg)
  }

  pub fn apply_overrides<I>(
    &mut self,
    overrides: I
  ) where
    I: IntoIterator<
      Item = (String, String)
    >
  {
    for (key, value) in overrides {
      debug!(key = %key, value = %value, "applying override");
      self.map.insert(key, value);
    }
  }

  pub fn get(
    &self,
    key: &str
  ) -> Option<&str> {
    self.map.get(key).map(String::as_str)
  }

  /// Sorted by key.
  pub fn iter(
    &self
  ) -> impl Iterator<Item = (&String, &String)>
  {
    self.map.iter()
  }

  pub fn settings(
    &self
  ) -> anyhow::Result<Settings> {
    Ok(Settings {
      data_location:   expand_tilde(
        Path::new(
          self.require("data.location")?
        )
      ),
      default_command: self
        .require("default.command")?
        .to_string(),
      color:           self.switch("color")?,
      theme:           self
        .require("theme")?
        .parse()?,
      dark:            self.switch("dark")?,
      timer_minutes:   self
        .positive("timer.minutes")?,
      due_interval:    Duration::from_secs(
        u64::from(
          self.positive("due.interval")?
        )
      ),
      bell:            self
        .switch("notify.bell")?
    })
  }

  fn require(
    &self,
    key: &str
  ) -> anyhow::Result<&str> {
    self.get(key).ok_or_else(|| {
      anyhow!("missing setting {key}")
    })
  }

  fn switch(
    &self,
    key: &str
  ) -> anyhow::Result<bool> {
    let raw = self.require(key)?;
    match raw.to_ascii_lowercase().as_str()
    {
      | "on" | "yes" | "true" | "1" => {
        Ok(true)
      }
      | "off" | "no" | "false" | "0" => {
        Ok(false)
      }
      | _ => {
        bail!(
          "invalid value for {key}: \
           '{raw}', expected on or off"
        )
      }
    }
  }

  fn positive(
    &self,
    key: &str
  ) -> anyhow::Result<u32> {
    let raw = self.require(key)?;
    raw
      .parse::<u32>()
      .ok()
      .filter(|n| *n > 0)
      .ok_or_else(|| {
        anyhow!(
          "invalid value for {key}: \
           '{raw}', expected a positive \
           whole number"
        )
      })
  }

  fn read_file(
    &mut self,
    path: &Path,
    depth: usize
  ) -> anyhow::Result<()> {
    if depth > MAX_INCLUDE_DEPTH {
      bail!(
        "includes nested deeper than \
         {MAX_INCLUDE_DEPTH} levels at {}",
        path.display()
      );
    }

    let text = fs::read_to_string(path)
      .with_context(|| {
        format!(
          "failed to read {}",
          path.display()
        )
      })?;
    self
      .loaded_files
      .push(path.to_path_buf());
    let dir = path
      .parent()
      .unwrap_or_else(|| Path::new("."));

    for (idx, line) in
      text.lines().enumerate()
    {
      match classify(line) {
        | Some(RcLine::Blank) => {}
        | Some(RcLine::Include(target)) => {
          let target = dir.join(
            expand_tilde(Path::new(target))
          );
          if target.exists() {
            self.read_file(
              &target,
              depth + 1
            )?;
          } else {
            warn!(include = %target.display(), "include file does not exist; skipping");
          }
        }
        | Some(RcLine::Entry(key, value)) => {
          trace!(key, value, "studyrc entry");
          self.map.insert(
            key.to_string(),
            value.to_string()
          );
        }
        | None => {
          bail!(
            "{}:{}: expected `key = \
             value`, got `{}`",
            path.display(),
            idx + 1,
            line.trim()
          )
        }
      }
    }

    Ok(())
  }
}

/// `None` for a malformed line.
fn classify(
  line: &str
) -> Option<RcLine<'_>> {
  let content = line
    .split('#')
    .next()
    .unwrap_or_default()
    .trim();
  if content.is_empty() {
    return Some(RcLine::Blank);
  }
  if let Some(target) =
    content.strip_prefix("include ")
  {
    return Some(RcLine::Include(
      target.trim()
    ));
  }

  let (key, value) =
    content.split_once('=')?;
  let key = key.trim();
  (!key.is_empty())
    .then(|| RcLine::Entry(key, value.trim()))
}

/// Explicit path, then `$STUDYRC`
/// (`/dev/null` disables the file), then
/// `~/.studyrc` if it exists.
fn locate_studyrc(
  explicit: Option<&Path>
) -> Option<PathBuf> {
  if let Some(path) = explicit {
    return Some(expand_tilde(path));
  }
  match std::env::var_os(STUDYRC_ENV) {
    | Some(value)
      if value == OsString::from("/dev/null") =>
    {
      None
    }
    | Some(value) => {
      Some(PathBuf::from(value))
    }
    | None => {
      dirs::home_dir()
        .map(|home| home.join(".studyrc"))
        .filter(|path| path.exists())
    }
  }
}

fn expand_tilde(path: &Path) -> PathBuf {
  match (
    path.strip_prefix("~"),
    dirs::home_dir()
  ) {
    | (Ok(rest), Some(home)) => {
      home.join(rest)
    }
    | _ => path.to_path_buf()
  }
}

#[cfg(test)]
mod tests {
  use std::fs;
  use std::time::Duration;

  use tempfile::tempdir;

  use super::Config;
  use crate::render::Theme;

  fn set(
    cfg: &mut Config,
    key: &str,
    value: &str
  ) {
    cfg.apply_overrides([(
      key.to_string(),
      value.to_string()
    )]);
  }

  #[test]
  fn defaults_validate() {
    let settings = Config::default()
      .settings()
      .expect("default settings");
    assert_eq!(
      settings.default_command,
      "list"
    );
    assert!(settings.color);
    assert!(!settings.dark);
    assert!(settings.bell);
    assert_eq!(settings.theme, Theme::Mint);
    assert_eq!(settings.timer_secs(), 1500);
    assert_eq!(
      settings.due_interval,
      Duration::from_secs(60)
    );
    assert!(
      settings
        .data_location
        .ends_with(".studyplan")
    );
  }

  #[test]
  fn file_includes_and_overrides() {
    let temp =
      tempdir().expect("tempdir");
    fs::write(
      temp.path().join("extra.rc"),
      "theme = lavender\n"
    )
    .expect("write include");
    let rc = temp.path().join("studyrc");
    fs::write(
      &rc,
      "# study settings\n\
       timer.minutes = 50 # focus\n\
       \n\
       include extra.rc\n"
    )
    .expect("write rc");

    let mut cfg = Config::load(Some(&rc))
      .expect("load config");
    assert_eq!(cfg.loaded_files.len(), 2);
    set(&mut cfg, "dark", "yes");

    let settings =
      cfg.settings().expect("settings");
    assert_eq!(settings.timer_minutes, 50);
    assert_eq!(
      settings.theme,
      Theme::Lavender
    );
    assert!(settings.dark);
  }

  #[test]
  fn rejects_malformed_lines() {
    let temp =
      tempdir().expect("tempdir");
    let rc = temp.path().join("studyrc");
    fs::write(&rc, "just words\n")
      .expect("write rc");
    let err = Config::load(Some(&rc))
      .expect_err("malformed");
    assert!(err.to_string().contains(":1:"));
  }

  #[test]
  fn self_include_is_bounded() {
    let temp =
      tempdir().expect("tempdir");
    let rc = temp.path().join("studyrc");
    fs::write(&rc, "include studyrc\n")
      .expect("write rc");
    assert!(Config::load(Some(&rc)).is_err());
  }

  #[test]
  fn invalid_values_fail_validation() {
    for (key, value) in [
      ("due.interval", "soon"),
      ("timer.minutes", "0"),
      ("color", "sometimes"),
      ("theme", "neon"),
      ("notify.bell", "")
    ] {
      let mut cfg = Config::default();
      set(&mut cfg, key, value);
      assert!(
        cfg.settings().is_err(),
        "{key}={value} accepted"
      );
    }
  }

  #[test]
  fn explicit_data_dir_wins() {
    let settings = Config::default()
      .settings()
      .expect("settings");
    let temp =
      tempdir().expect("tempdir");
    assert_eq!(
      settings.data_dir(Some(temp.path())),
      temp.path()
    );
    assert_eq!(
      settings.data_dir(None),
      settings.data_location
    );
  }
}
