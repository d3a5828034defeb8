//! The fixed set of textual shapes an `include` directive can take.
//!
//! Every pattern is compiled in multi-line mode and anchored with `^` / `$`,
//! so a directive is only recognized when it occupies a line of its own.
//! Patterns never match across a line break.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use serde::Serialize;

use crate::BppError;

/// The keyword that starts every directive.
pub const DIRECTIVE_KEYWORD: &str = ":#include";

/// How environment variables are referenced inside a directive payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvSyntax {
	/// `%NAME%`, as expanded by `cmd.exe`.
	Percent,
	/// `$NAME` or `${NAME}`, as expanded by POSIX shells.
	Dollar,
}

impl EnvSyntax {
	/// The sigil whose presence marks a payload as referencing the
	/// environment.
	pub fn marker(self) -> char {
		match self {
			Self::Percent => '%',
			Self::Dollar => '$',
		}
	}
}

impl Default for EnvSyntax {
	fn default() -> Self {
		if cfg!(windows) { Self::Percent } else { Self::Dollar }
	}
}

impl fmt::Display for EnvSyntax {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Percent => f.write_str("percent"),
			Self::Dollar => f.write_str("dollar"),
		}
	}
}

impl FromStr for EnvSyntax {
	type Err = BppError;

	fn from_str(value: &str) -> Result<Self, Self::Err> {
		match value.trim().to_ascii_lowercase().as_str() {
			"percent" | "%" | "windows" => Ok(Self::Percent),
			"dollar" | "$" | "posix" => Ok(Self::Dollar),
			_ => Err(BppError::EnvSyntax(value.to_string())),
		}
	}
}

/// A well-formed directive shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveKind {
	/// `:#include "lib\tools.bat"`
	Plain,
	/// `:#include "%LIB_DIR%\tools.bat"` or `:#include "$LIB_DIR/tools.sh"`
	Environment,
}

impl DirectiveKind {
	/// The whole-line pattern for this shape.
	pub fn pattern(self, syntax: EnvSyntax) -> &'static Regex {
		let set = match syntax {
			EnvSyntax::Percent => &*PERCENT_PATTERNS,
			EnvSyntax::Dollar => &*DOLLAR_PATTERNS,
		};

		match self {
			Self::Plain => &set.plain,
			Self::Environment => &set.environment,
		}
	}

	/// The companion pattern that pulls the quoted payload out of a directive
	/// already matched by [`DirectiveKind::pattern`].
	pub fn payload_pattern(self) -> &'static Regex {
		match self {
			Self::Plain => &PLAIN_PAYLOAD,
			Self::Environment => &ENVIRONMENT_PAYLOAD,
		}
	}

	/// Extract the trimmed text between the outermost quotes of `directive`.
	pub fn extract(self, directive: &str) -> Option<&str> {
		self.payload_pattern()
			.captures(directive)
			.and_then(|caps| caps.get(1))
			.map(|payload| payload.as_str().trim())
	}
}

/// A malformed directive shape. The declaration order is the priority order
/// used by the validator: the first shape that matches wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MalformedKind {
	/// `:#include`
	MissingValue,
	/// `:#include ""`
	EmptyQuotes,
	/// `:#include "`
	LoneQuote,
	/// `:#include "lib.bat`
	UnclosedQuote,
	/// `:#include lib.bat"`
	MissingOpeningQuote,
	/// `:#include lib.bat`
	Unquoted,
}

impl MalformedKind {
	/// All malformed shapes in priority order.
	pub const ALL: [Self; 6] = [
		Self::MissingValue,
		Self::EmptyQuotes,
		Self::LoneQuote,
		Self::UnclosedQuote,
		Self::MissingOpeningQuote,
		Self::Unquoted,
	];

	/// The diagnostic hint shown to the user.
	pub fn hint(self) -> &'static str {
		match self {
			Self::MissingValue => "The 'include' must be followed by a value",
			Self::EmptyQuotes => "In quotes there must be a text",
			Self::LoneQuote => "You cannot specify only one quotation mark",
			Self::UnclosedQuote | Self::MissingOpeningQuote => {
				"You have to close quotes on the sides"
			}
			Self::Unquoted => "The path must be quoted in quotes",
		}
	}

	pub fn pattern(self) -> &'static Regex {
		&MALFORMED_PATTERNS[self as usize]
	}

	/// Whether `text` is a genuine occurrence of this shape once it is
	/// trimmed and checked in isolation.
	///
	/// Trailing whitespace after an otherwise well-formed directive satisfies
	/// [`MalformedKind::UnclosedQuote`] as part of a larger buffer but not on
	/// its own.
	pub fn matches_in_isolation(self, text: &str) -> bool {
		self.pattern().is_match(&format!("\n{}", text.trim()))
	}
}

impl fmt::Display for MalformedKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.hint())
	}
}

/// Any shape a single line can be classified as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
	WellFormed(DirectiveKind),
	Malformed(MalformedKind),
}

impl Shape {
	/// Classify a single line. Returns `None` for lines that are not
	/// directives at all.
	///
	/// Malformed shapes are checked first so that trailing garbage after a
	/// closing quote is reported rather than silently accepted.
	pub fn classify(line: &str, syntax: EnvSyntax) -> Option<Self> {
		let line = line.trim_end_matches(['\r', '\n']);
		let isolated = format!("\n{line}\n");

		if let Some(kind) = MalformedKind::ALL
			.into_iter()
			.find(|kind| kind.pattern().is_match(&isolated) && kind.matches_in_isolation(line))
		{
			return Some(Self::Malformed(kind));
		}

		[DirectiveKind::Environment, DirectiveKind::Plain]
			.into_iter()
			.find(|kind| kind.pattern(syntax).is_match(&isolated))
			.map(Self::WellFormed)
	}
}

struct DirectivePatterns {
	plain: Regex,
	environment: Regex,
}

impl DirectivePatterns {
	fn new(syntax: EnvSyntax) -> Self {
		let marker = regex::escape(&syntax.marker().to_string());
		Self {
			plain: compile(r#"(?m)^[ \t]*:#include[ \t]*".+"[ \t]*$"#),
			environment: compile(&format!(
				r#"(?m)^[ \t]*:#include[ \t]*".*{marker}.*"[ \t]*$"#
			)),
		}
	}
}

fn compile(pattern: &str) -> Regex {
	Regex::new(pattern).unwrap_or_else(|e| panic!("invalid directive pattern `{pattern}`: {e}"))
}

static PERCENT_PATTERNS: LazyLock<DirectivePatterns> =
	LazyLock::new(|| DirectivePatterns::new(EnvSyntax::Percent));

static DOLLAR_PATTERNS: LazyLock<DirectivePatterns> =
	LazyLock::new(|| DirectivePatterns::new(EnvSyntax::Dollar));

static PLAIN_PAYLOAD: LazyLock<Regex> = LazyLock::new(|| compile(r#""(.+)""#));

static ENVIRONMENT_PAYLOAD: LazyLock<Regex> = LazyLock::new(|| compile(r#""(.+)""#));

static MALFORMED_PATTERNS: LazyLock<[Regex; 6]> = LazyLock::new(|| {
	[
		compile(r"(?m)^[ \t]*:#include[ \t]*$"),
		compile(r#"(?m)^[ \t]*:#include[ \t]*"""#),
		compile(r#"(?m)^[ \t]*:#include[ \t]*"$"#),
		compile(r#"(?m)^[ \t]*:#include[ \t]*".+[^"\n]$"#),
		compile(r#"(?m)^[ \t]*:#include[ \t]+[^"\s].*""#),
		compile(r#"(?m)^[ \t]*:#include[ \t]+[^"\s][^"\n]*$"#),
	]
});
