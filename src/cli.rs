// crates.io
use clap::{
	Parser, Subcommand,
	builder::{
		Styles,
		styling::{AnsiColor, Effects},
	},
};

// std
use std::{path::PathBuf, process::ExitCode};

// self
use crate::{
	fixer::{self, RunSummary},
	prelude::*,
};

/// Command-line interface for the PHP style fixer.
#[derive(Debug, Parser)]
#[command(
	version = concat!(
		env!("CARGO_PKG_VERSION"),
		"-",
		env!("VERGEN_GIT_SHA"),
		"-",
		env!("VERGEN_CARGO_TARGET_TRIPLE"),
	),
	rename_all = "kebab",
	styles = styles(),
)]
pub(crate) struct Cli {
	/// Optional JSON configuration file.
	#[arg(long, global = true, value_name = "PATH")]
	config: Option<PathBuf>,
	/// Run fixers marked as risky as well.
	#[arg(long, global = true)]
	allow_risky: bool,
	#[command(subcommand)]
	command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
	/// Report files that the fixers would change.
	Check {
		/// Optional PHP files. Defaults to git-tracked `*.php`.
		files: Vec<PathBuf>,
	},
	/// Rewrite files in place, then re-check them.
	Fix {
		/// Optional PHP files. Defaults to git-tracked `*.php`.
		files: Vec<PathBuf>,
	},
	/// Print implemented fixer names.
	Coverage,
}

impl Cli {
	pub(crate) fn run(&self) -> Result<ExitCode> {
		let config = fixer::load_config(self.config.as_deref(), self.allow_risky)?;

		match &self.command {
			Command::Check { files } => {
				let summary = fixer::run_check(files, &config)?;
				print_summary(&summary, false);
				if summary.changed_count > 0 {
					eprintln!("\n{} file(s) need fixing.", summary.changed_count);
					return Ok(ExitCode::FAILURE);
				}
			},
			Command::Fix { files } => {
				let summary = fixer::run_fix(files, &config)?;
				print_summary(&summary, true);
			},
			Command::Coverage => fixer::print_coverage(),
		}

		Ok(ExitCode::SUCCESS)
	}
}

fn print_summary(summary: &RunSummary, fix_mode: bool) {
	for line in &summary.output_lines {
		println!("{line}");
	}

	if fix_mode {
		println!(
			"\nChecked {} file(s). Fixed {} file(s).",
			summary.file_count, summary.changed_count
		);
	} else {
		println!("\nChecked {} file(s).", summary.file_count);
	}
}

fn styles() -> Styles {
	Styles::styled()
		.header(AnsiColor::Red.on_default() | Effects::BOLD)
		.usage(AnsiColor::Red.on_default() | Effects::BOLD)
		.literal(AnsiColor::Blue.on_default() | Effects::BOLD)
		.placeholder(AnsiColor::Green.on_default())
}
