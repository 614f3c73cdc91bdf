//! Implementation of the `luapack build` command.
//!
//! Builds the requested artifacts in order. Failures are isolated: a
//! broken artifact is reported and skipped while its siblings still
//! build, and the command exits nonzero at the end if anything failed.

use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow, bail};
use luapack_lib::pipeline::{self, BuildOptions, BuildReport, Target};

use crate::output::{self, OutputFormat};

/// Execute the build command.
pub fn cmd_build(
  names: &[String],
  root: &Path,
  out_dir: Option<PathBuf>,
  verify: bool,
  format: OutputFormat,
  quiet: bool,
) -> Result<()> {
  let targets = select_targets(names)?;

  let mut options = BuildOptions::new(root);
  if let Some(dir) = out_dir {
    options.out_dir = dir;
  }
  options.verify = verify;

  let mut reports: Vec<BuildReport> = Vec::new();
  let mut failed = 0usize;

  for target in &targets {
    if !quiet && !format.is_json() {
      output::print_info(&format!("building {}", target.name));
    }
    match pipeline::build_target(target, &options) {
      Ok(report) => {
        if !quiet && !format.is_json() {
          output::print_success(&format!(
            "{} -> {} ({})",
            report.target,
            report.path.display(),
            output::format_bytes(report.artifact_bytes as u64)
          ));
        }
        reports.push(report);
      }
      Err(e) => {
        failed += 1;
        output::print_error(&format!("{}: {}", target.name, e));
      }
    }
  }

  if format.is_json() {
    output::print_json(&reports)?;
  }

  if failed > 0 {
    bail!("{} of {} artifact(s) failed", failed, targets.len());
  }
  Ok(())
}

/// Map selector names to targets; an empty selection builds everything.
fn select_targets(names: &[String]) -> Result<Vec<Target>> {
  if names.is_empty() {
    return Ok(pipeline::default_targets());
  }
  names
    .iter()
    .map(|name| {
      pipeline::find_target(name).ok_or_else(|| {
        anyhow!("unknown target '{name}': expected one of compiler, runtime, standalone")
      })
    })
    .collect()
}
