use std::{
	path::{Path, PathBuf},
	process::Command,
};

use once_cell::sync::Lazy;
use regex::Regex;

use super::type_info::TypeInfoProvider;
use crate::prelude::*;

/// Splits whitespace content into per-line parts; the final match is the
/// indentation the next token sits on.
pub(crate) static LINE_PARTS_RE: Lazy<Regex> =
	Lazy::new(|| Regex::new(r"[^\n\r]+[\r\n]*").expect("Expected operation to succeed."));

#[derive(Debug, Clone)]
pub(crate) struct RunSummary {
	pub(crate) file_count: usize,
	pub(crate) changed_count: usize,
	pub(crate) output_lines: Vec<String>,
}

/// Whitespace the fixers are allowed to synthesize.
#[derive(Debug, Clone)]
pub(crate) struct WhitespacesConfig {
	pub(crate) indent: String,
	pub(crate) line_ending: String,
}
impl Default for WhitespacesConfig {
	fn default() -> Self {
		Self { indent: "    ".to_owned(), line_ending: "\n".to_owned() }
	}
}

/// Read-only collaborators handed to every fixer invocation.
pub(crate) struct FixContext<'a> {
	pub(crate) whitespaces: &'a WhitespacesConfig,
	pub(crate) type_info: &'a dyn TypeInfoProvider,
}

/// The whitespace content carrying exactly `count` blank lines followed by
/// the original trailing indentation, or `None` when `existing` already
/// matches.
pub(crate) fn blank_lines_content(existing: &str, count: usize, eol: &str) -> Option<String> {
	if existing.matches('\n').count() == count + 1 {
		return None;
	}

	let last_line =
		LINE_PARTS_RE.find_iter(existing).last().map(|m| m.as_str()).unwrap_or_default();

	Some(format!("{}{last_line}", eol.repeat(count + 1)))
}

/// Explicitly requested files filtered to `.php`, or every git-tracked
/// `*.php` file when none are requested.
pub(crate) fn resolve_files(requested_files: &[PathBuf]) -> Result<Vec<PathBuf>> {
	if !requested_files.is_empty() {
		let mut files = Vec::new();

		for file in requested_files {
			if file.extension().is_some_and(|ext| ext == "php") {
				files.push(file.clone());
			}
		}

		return Ok(files);
	}

	git_ls_files_php()
}

pub(crate) fn read_source(path: &Path) -> Option<String> {
	match std::fs::read_to_string(path) {
		Ok(text) if !text.is_empty() => Some(text),
		_ => None,
	}
}

fn git_ls_files_php() -> Result<Vec<PathBuf>> {
	let output = Command::new("git")
		.args(["ls-files", "*.php"])
		.output()
		.map_err(|err| eyre::eyre!("Failed to run git ls-files: {err}."))?;

	if !output.status.success() {
		return Err(eyre::eyre!("git ls-files failed with status {}.", output.status));
	}

	let stdout = String::from_utf8(output.stdout)?;
	let mut files = Vec::new();

	for line in stdout.lines() {
		if !line.is_empty() {
			files.push(PathBuf::from(line));
		}
	}

	Ok(files)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn blank_lines_content_is_none_when_count_matches() {
		assert_eq!(blank_lines_content("\n\n    ", 1, "\n"), None);
	}

	#[test]
	fn blank_lines_content_keeps_trailing_indentation() {
		assert_eq!(blank_lines_content("\n    ", 1, "\n"), Some("\n\n    ".to_owned()));
		assert_eq!(blank_lines_content("\n\n\n\t", 0, "\n"), Some("\n\t".to_owned()));
	}

	#[test]
	fn blank_lines_content_without_indentation_is_only_line_endings() {
		assert_eq!(blank_lines_content("\n\n\n", 1, "\n"), Some("\n\n".to_owned()));
	}

	#[test]
	fn resolve_files_filters_non_php_paths() {
		let files = resolve_files(&[PathBuf::from("a.php"), PathBuf::from("b.rs")])
			.expect("resolve files");

		assert_eq!(files, [PathBuf::from("a.php")]);
	}
}
