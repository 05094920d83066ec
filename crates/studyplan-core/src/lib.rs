pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod datastore;
pub mod datetime;
pub mod due;
pub mod filter;
pub mod notify;
pub mod render;
pub mod repository;
pub mod schedule;
pub mod task;
pub mod timer;
pub mod timetable;

use std::ffi::OsString;

use anyhow::Context;
use clap::Parser;
use tracing::{
  debug,
  info
};

#[tracing::instrument(skip_all)]
pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let cli =
    cli::GlobalCli::parse_from(raw_args);

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting study CLI"
  );
  debug!(overrides = ?cli.rc_overrides, "command-line overrides");

  let mut cfg = config::Config::load(
    cli.studyrc.as_deref()
  )?;
  cfg.apply_overrides(cli.rc_overrides);
  let settings = cfg
    .settings()
    .context("invalid configuration")?;

  let data_dir =
    settings.data_dir(cli.data.as_deref());
  let store =
    datastore::DataStore::open(
      &data_dir
    )
    .with_context(|| {
      format!(
        "failed to open datastore at \
         {}",
        data_dir.display()
      )
    })?;
  let repo =
    repository::TaskRepository::load(
      store
    );

  let mut app = app::AppState::new(
    repo,
    notify::TerminalNotifier::new(
      settings.bell
    ),
    timer::Timer::new(
      settings.timer_secs()
    )
  );

  let renderer =
    render::Renderer::new(&settings);
  let inv = cli::Invocation::parse(
    &settings.default_command,
    cli.rest
  )?;

  commands::dispatch(
    &mut app,
    &cfg,
    &settings,
    &renderer,
    inv
  )?;

  info!("done");
  Ok(())
}
