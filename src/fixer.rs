mod align_multiline_parameters;
mod blank_line_around_class_body;
mod blank_line_before_return;
mod class_elements;
mod class_name;
mod functions;
mod lexer;
mod line_break_after_statements;
mod multiline_if_statement_braces;
mod namespaces;
mod ordered_overrides;
mod remove_class_name_method_usages;
mod shared;
mod statements;
mod tokens;
mod type_info;

pub(crate) use shared::RunSummary;

use std::{
	fs,
	path::{Path, PathBuf},
};

use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use serde_json::Value;

use shared::{FixContext, WhitespacesConfig};
use tokens::Tokens;
use type_info::SourceTypeInfo;

use crate::prelude::*;

const FILE_BATCH_SIZE: usize = 64;

/// Human-readable identity of a fixer: what it enforces and a snippet it
/// would change.
pub(crate) struct FixerDefinition {
	pub(crate) summary: &'static str,
	pub(crate) sample: &'static str,
}

/// One style rule over a file's token sequence. Fixers mutate the sequence in
/// place; the sequence's change counter tells the driver whether anything
/// happened.
pub(crate) trait Fixer: Send + Sync {
	fn name(&self) -> &'static str;

	fn definition(&self) -> FixerDefinition;

	/// Fixers run in descending priority order within a single pass.
	fn priority(&self) -> i32 {
		0
	}

	/// Risky fixers may change runtime behavior and only run when explicitly
	/// allowed.
	fn is_risky(&self) -> bool {
		false
	}

	/// Cheap pre-filter; `apply` is only called when this returns `true`.
	fn is_candidate(&self, tokens: &Tokens) -> bool;

	fn configure(&mut self, _options: &Value) -> Result<()> {
		Err(eyre::eyre!("Fixer `{}` is not configurable.", self.name()))
	}

	fn apply(&self, path: &Path, tokens: &mut Tokens, ctx: &FixContext) -> Result<()>;
}

fn registry() -> Vec<Box<dyn Fixer>> {
	vec![
		Box::new(ordered_overrides::OrderedOverridesFixer),
		Box::new(align_multiline_parameters::AlignMultilineParametersFixer::new()),
		Box::new(multiline_if_statement_braces::MultilineIfStatementBracesFixer::new()),
		Box::new(blank_line_around_class_body::BlankLineAroundClassBodyFixer::new()),
		Box::new(blank_line_before_return::BlankLineBeforeReturnFixer),
		Box::new(line_break_after_statements::LineBreakAfterStatementsFixer),
		Box::new(remove_class_name_method_usages::RemoveClassNameMethodUsagesFixer),
	]
}

/// A fully resolved run: whitespace conventions plus the enabled fixers in
/// execution order.
pub(crate) struct RunConfig {
	whitespaces: WhitespacesConfig,
	fixers: Vec<Box<dyn Fixer>>,
}

/// Reads the optional JSON configuration and prepares the fixer set.
///
/// Recognized keys: `risky` (bool), `indent` (string), `line_ending`
/// (string) and `fixers` (map of fixer name to `false` for disabling or an
/// options object). Unknown keys and unknown fixer names are errors.
pub(crate) fn load_config(path: Option<&Path>, allow_risky: bool) -> Result<RunConfig> {
	let mut whitespaces = WhitespacesConfig::default();
	let mut risky = allow_risky;
	let mut fixer_settings = serde_json::Map::new();

	if let Some(path) = path {
		let raw = fs::read_to_string(path)?;
		let value = serde_json::from_str::<Value>(&raw)?;
		let object = value
			.as_object()
			.ok_or_else(|| eyre::eyre!("Configuration root must be an object."))?;

		for (key, value) in object {
			match key.as_str() {
				"risky" => {
					risky |= value
						.as_bool()
						.ok_or_else(|| eyre::eyre!("`risky` must be a boolean."))?;
				},
				"indent" => {
					whitespaces.indent = value
						.as_str()
						.ok_or_else(|| eyre::eyre!("`indent` must be a string."))?
						.to_owned();
				},
				"line_ending" => {
					whitespaces.line_ending = value
						.as_str()
						.ok_or_else(|| eyre::eyre!("`line_ending` must be a string."))?
						.to_owned();
				},
				"fixers" => {
					fixer_settings = value
						.as_object()
						.ok_or_else(|| eyre::eyre!("`fixers` must be an object."))?
						.clone();
				},
				_ => return Err(eyre::eyre!("Unknown configuration key `{key}`.")),
			}
		}
	}

	let mut fixers = Vec::new();

	for mut fixer in registry() {
		if let Some(settings) = fixer_settings.remove(fixer.name()) {
			match &settings {
				Value::Bool(false) => continue,
				Value::Bool(true) => {},
				Value::Object(_) => fixer.configure(&settings)?,
				_ => {
					return Err(eyre::eyre!(
						"Fixer `{}` must map to a boolean or an options object.",
						fixer.name()
					));
				},
			}
		}
		if fixer.is_risky() && !risky {
			continue;
		}

		fixers.push(fixer);
	}

	if let Some(unknown) = fixer_settings.keys().next() {
		return Err(eyre::eyre!("Unknown fixer `{unknown}` in configuration."));
	}

	fixers.sort_by_key(|fixer| std::cmp::Reverse(fixer.priority()));

	Ok(RunConfig { whitespaces, fixers })
}

pub(crate) fn run_check(requested_files: &[PathBuf], config: &RunConfig) -> Result<RunSummary> {
	let files = shared::resolve_files(requested_files)?;
	let type_info = scan_type_info(&files);
	let ctx = FixContext { whitespaces: &config.whitespaces, type_info: &type_info };
	let mut changed_count = 0_usize;
	let mut output_lines = Vec::new();

	for batch in files.chunks(FILE_BATCH_SIZE) {
		let batch_results = batch
			.par_iter()
			.map(|file| -> Result<Option<String>> {
				let Some(source) = shared::read_source(file) else {
					return Ok(None);
				};

				Ok(fix_source(file, &source, &config.fixers, &ctx)?
					.map(|(_, applied)| format!("{}: {}", file.display(), applied.join(", "))))
			})
			.collect::<Vec<_>>();

		for result in batch_results {
			if let Some(line) = result? {
				changed_count += 1;

				output_lines.push(line);
			}
		}
	}

	Ok(RunSummary { file_count: files.len(), changed_count, output_lines })
}

pub(crate) fn run_fix(requested_files: &[PathBuf], config: &RunConfig) -> Result<RunSummary> {
	let files = shared::resolve_files(requested_files)?;
	let type_info = scan_type_info(&files);
	let ctx = FixContext { whitespaces: &config.whitespaces, type_info: &type_info };
	let mut changed_count = 0_usize;
	let mut output_lines = Vec::new();

	for batch in files.chunks(FILE_BATCH_SIZE) {
		let outcomes = batch
			.par_iter()
			.map(|file| -> Result<Option<(String, Vec<&'static str>)>> {
				let Some(source) = shared::read_source(file) else {
					return Ok(None);
				};

				fix_source(file, &source, &config.fixers, &ctx)
			})
			.collect::<Vec<_>>();

		for (file, outcome) in batch.iter().zip(outcomes) {
			if let Some((fixed, applied)) = outcome? {
				fs::write(file, fixed)?;

				changed_count += 1;

				output_lines.push(format!("{}: {}", file.display(), applied.join(", ")));
			}
		}
	}

	// The fixers are idempotent, so a re-check of the rewritten files should
	// come back clean; anything left over is worth surfacing.
	let checked = run_check(requested_files, config)?;

	output_lines.extend(
		checked.output_lines.into_iter().map(|line| format!("still dirty after fix: {line}")),
	);

	Ok(RunSummary { file_count: files.len(), changed_count, output_lines })
}

pub(crate) fn print_coverage() {
	for fixer in registry() {
		let risky = if fixer.is_risky() { " (risky)" } else { "" };

		println!("{}{risky}\t{}", fixer.name(), fixer.definition().summary);
	}
}

/// Runs the enabled fixers over one file's source. `Some` carries the fixed
/// text with the names of the fixers that touched it; `None` means the file
/// is already clean.
fn fix_source(
	path: &Path,
	source: &str,
	fixers: &[Box<dyn Fixer>],
	ctx: &FixContext,
) -> Result<Option<(String, Vec<&'static str>)>> {
	let mut tokens = lexer::tokenize(source);
	let mut applied = Vec::new();

	for fixer in fixers {
		if !fixer.is_candidate(&tokens) {
			continue;
		}

		let changes_before = tokens.changes();

		fixer.apply(path, &mut tokens, ctx)?;

		if tokens.changes() > changes_before {
			applied.push(fixer.name());
		}
	}

	if applied.is_empty() { Ok(None) } else { Ok(Some((tokens.to_source(), applied))) }
}

/// The symbol table of a run covers every input file, so cross-file
/// hierarchies resolve no matter which file is fixed first.
fn scan_type_info(files: &[PathBuf]) -> SourceTypeInfo {
	let mut type_info = SourceTypeInfo::new();

	for file in files {
		if let Some(source) = shared::read_source(file) {
			type_info.scan(&lexer::tokenize(&source));
		}
	}

	type_info
}
