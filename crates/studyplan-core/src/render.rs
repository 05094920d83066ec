use std::io::{self, IsTerminal, Write};
use std::str::FromStr;

use anyhow::anyhow;
use chrono::NaiveDateTime;
use unicode_width::UnicodeWidthStr;

use crate::config::Settings;
use crate::datetime::{format_clock, format_due, format_long_date, format_minutes};
use crate::filter::FilterMode;
use crate::repository::Progress;
use crate::task::Task;
use crate::timer::Timer;
use crate::timetable::{Timetable, TimetableBlock, TimetableError};

pub const EMPTY_PLACEHOLDER: &str = "No tasks found. Add some tasks to get started!";

const PROGRESS_BAR_WIDTH: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Mint,
    Blue,
    Lavender,
    Beige,
}

impl FromStr for Theme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mint" => Ok(Theme::Mint),
            "blue" => Ok(Theme::Blue),
            "lavender" => Ok(Theme::Lavender),
            "beige" => Ok(Theme::Beige),
            other => Err(anyhow!("invalid theme: {other}")),
        }
    }
}

/// ANSI SGR codes for one theme in light or dark mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Palette {
    accent: &'static str,
    muted: &'static str,
    alert: &'static str,
    subjects: [&'static str; 4],
}

impl Palette {
    fn for_theme(theme: Theme, dark: bool) -> Self {
        let accent = match (theme, dark) {
            (Theme::Mint, false) => "32",
            (Theme::Mint, true) => "92",
            (Theme::Blue, false) => "34",
            (Theme::Blue, true) => "94",
            (Theme::Lavender, false) => "35",
            (Theme::Lavender, true) => "95",
            (Theme::Beige, false) => "33",
            (Theme::Beige, true) => "93",
        };
        let muted = if dark { "37" } else { "90" };
        let subjects = if dark {
            ["92", "94", "95", "93"]
        } else {
            ["32", "34", "35", "33"]
        };
        Self {
            accent,
            muted,
            alert: "31",
            subjects,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
    palette: Palette,
}

impl Renderer {
    /// Colour needs both `color=on` and a terminal on stdout.
    pub fn new(settings: &Settings) -> Self {
        Self {
            color: settings.color && io::stdout().is_terminal(),
            palette: Palette::for_theme(settings.theme, settings.dark),
        }
    }

    /// Uncoloured output regardless of terminal or config.
    pub fn plain() -> Self {
        Self {
            color: false,
            palette: Palette::for_theme(Theme::Mint, false),
        }
    }

    /// Rows carry their 1-based position in the full list, so the numbers a
    /// user types back are valid for the list as it is right now.
    #[tracing::instrument(skip(self, out, tasks, now))]
    pub fn write_task_list<W: Write>(
        &self,
        mut out: W,
        tasks: &[Task],
        mode: FilterMode,
        now: NaiveDateTime,
    ) -> anyhow::Result<()> {
        let selected = mode.select(tasks);
        if selected.is_empty() {
            writeln!(out, "{EMPTY_PLACEHOLDER}")?;
            return Ok(());
        }

        let headers = vec![
            "#".to_string(),
            "Task".to_string(),
            "Due".to_string(),
            "Category".to_string(),
            "Status".to_string(),
        ];

        let mut rows = Vec::with_capacity(selected.len());
        for (position, task) in selected {
            let number = self.paint(&(position + 1).to_string(), self.palette.accent);

            let mut title = format!("{} {}", task.category.icon(), task.title);
            if let Some(desc) = task.description() {
                title = format!("{title} ({desc})");
            }

            let due = format_due(task.due_instant());
            let due = if !task.completed && task.is_due(now) {
                self.paint(&due, self.palette.alert)
            } else {
                due
            };

            let status = if task.completed {
                self.paint("✓ done", self.palette.muted)
            } else {
                "pending".to_string()
            };

            rows.push(vec![number, title, due, task.category.to_string(), status]);
        }

        write_table(&mut out, headers, rows)?;
        Ok(())
    }

    pub fn write_progress<W: Write>(&self, mut out: W, progress: Progress) -> anyhow::Result<()> {
        let filled = (progress.ratio() * PROGRESS_BAR_WIDTH as f64).round() as usize;
        let bar = format!(
            "{}{}",
            "█".repeat(filled),
            "░".repeat(PROGRESS_BAR_WIDTH.saturating_sub(filled))
        );
        writeln!(
            out,
            "{}  {}  {}%",
            self.paint(&bar, self.palette.accent),
            progress,
            progress.percent()
        )?;
        Ok(())
    }

    #[tracing::instrument(skip(self, out, table))]
    pub fn write_timetable<W: Write>(&self, mut out: W, table: &Timetable) -> anyhow::Result<()> {
        writeln!(out, "Your Study Schedule")?;
        writeln!(out)?;

        let headers = vec!["Time".to_string(), "Activity".to_string()];
        let mut rows = Vec::with_capacity(table.blocks.len() + 1);
        let mut subject_idx = 0;
        for block in &table.blocks {
            match block {
                TimetableBlock::Subject { label, .. } => {
                    let code = self.palette.subjects[subject_idx % self.palette.subjects.len()];
                    subject_idx += 1;
                    rows.push(vec![block.span(), self.paint(label, code)]);
                }
                TimetableBlock::Break { .. } => {
                    rows.push(vec![block.span(), self.paint("☕ Break", self.palette.muted)]);
                }
            }
        }

        if table.leftover_minutes > 0
            && let Some(end) = table.end_minute()
        {
            let span = format!(
                "{} - {}",
                format_minutes(end),
                format_minutes(end + table.leftover_minutes)
            );
            rows.push(vec![span, self.paint("Unscheduled", self.palette.muted)]);
        }

        write_table(&mut out, headers, rows)?;
        Ok(())
    }

    pub fn write_timetable_error<W: Write>(
        &self,
        mut out: W,
        err: TimetableError,
    ) -> anyhow::Result<()> {
        writeln!(out, "{}", self.paint(&err.to_string(), self.palette.alert))?;
        Ok(())
    }

    pub fn write_clock<W: Write>(&self, mut out: W, now: NaiveDateTime) -> anyhow::Result<()> {
        writeln!(
            out,
            "{}  {}",
            format_long_date(now.date()),
            self.paint(&format_clock(now.time()), self.palette.accent)
        )?;
        Ok(())
    }

    /// Countdown and its button label, without a line break so the live
    /// status line can redraw it in place.
    pub fn write_timer<W: Write>(&self, mut out: W, timer: &Timer) -> anyhow::Result<()> {
        write!(
            out,
            "⏱  {}  [{}]",
            self.paint(&timer.display(), self.palette.accent),
            timer.button_label()
        )?;
        Ok(())
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn write_table<W: Write>(
    mut writer: W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths = vec![0usize; column_count];

    for (idx, header) in headers.iter().enumerate() {
        widths[idx] = widths[idx].max(UnicodeWidthStr::width(header.as_str()));
    }

    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    for idx in 0..column_count {
        write!(writer, "{:width$} ", headers[idx], width = widths[idx])?;
    }
    writeln!(writer)?;

    for idx in 0..column_count {
        write!(writer, "{:-<width$} ", "", width = widths[idx])?;
    }
    writeln!(writer)?;

    for row in rows {
        for idx in 0..column_count {
            let cell = &row[idx];
            let visible_width = UnicodeWidthStr::width(strip_ansi(cell).as_str());
            let padding = widths[idx].saturating_sub(visible_width);
            write!(writer, "{}{} ", cell, " ".repeat(padding))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}
