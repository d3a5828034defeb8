use std::collections::HashSet;
use std::path::Path;

use crate::DirectiveKind;
use crate::EnvSyntax;
use crate::SourceBuffer;

/// Prefix the path of every relative plain directive in `source` with `dir`.
///
/// Directives that already hold an absolute path and directives that
/// reference environment variables are left untouched, as is everything
/// that is not a well-formed directive.
pub fn absolutize_includes(dir: &Path, source: &str, syntax: EnvSyntax) -> String {
	let buffer = SourceBuffer::new(source);
	let mut absolutized = source.to_string();
	let mut seen = HashSet::new();

	for m in DirectiveKind::Plain.pattern(syntax).find_iter(buffer.as_str()) {
		let directive = m.as_str();
		if !seen.insert(directive) {
			continue;
		}

		if DirectiveKind::Environment
			.pattern(syntax)
			.is_match(&format!("\n{directive}\n"))
		{
			continue;
		}

		let Some(payload) = DirectiveKind::Plain.extract(directive) else {
			continue;
		};

		if Path::new(payload).is_absolute() {
			continue;
		}

		let prefixed = dir.join(payload);
		let quote = directive.find('"').unwrap_or(0);
		let (keyword, quoted) = directive.split_at(quote);
		let rewritten = format!(
			"{keyword}{}",
			quoted.replacen(payload, &prefixed.to_string_lossy(), 1)
		);
		absolutized = absolutized.replace(directive, &rewritten);
	}

	absolutized
}
