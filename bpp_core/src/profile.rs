use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::BppError;

/// Width of the dash rule in the inclusion banners of every built-in profile.
pub const DEFAULT_RULE_WIDTH: usize = 30;

/// The target language of the file being preprocessed. It decides the
/// comment marker used for banners and which file extensions may be
/// included.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum Lang {
	#[default]
	Batch,
	Python,
	C,
	CPlusPlus,
	Java,
	CSharp,
	Go,
	Bash,
	JavaScript,
}

impl Lang {
	pub const ALL: [Self; 9] = [
		Self::Batch,
		Self::Python,
		Self::C,
		Self::CPlusPlus,
		Self::Java,
		Self::CSharp,
		Self::Go,
		Self::Bash,
		Self::JavaScript,
	];

	/// The canonical lowercase name accepted by [`Lang::from_str`].
	pub fn name(self) -> &'static str {
		match self {
			Self::Batch => "batch",
			Self::Python => "python",
			Self::C => "c",
			Self::CPlusPlus => "cplusplus",
			Self::Java => "java",
			Self::CSharp => "c#",
			Self::Go => "go",
			Self::Bash => "bash",
			Self::JavaScript => "javascript",
		}
	}

	pub fn profile(self) -> Profile {
		let (comment, extensions): (&str, &[&str]) = match self {
			Self::Batch => ("::", &[".bat", ".cmd", ".hbat", ".hb"]),
			Self::Python => ("#", &[".py"]),
			Self::C => ("//", &[".c", ".h"]),
			Self::CPlusPlus => ("//", &[".cpp", ".cxx", ".cc", ".h", ".hpp"]),
			Self::Java => ("//", &[".java"]),
			Self::CSharp => ("//", &[".cs"]),
			Self::Go => ("//", &[".go"]),
			Self::Bash => ("#", &[".sh"]),
			Self::JavaScript => ("//", &[".js"]),
		};

		Profile {
			comment: comment.to_string(),
			extensions: extensions.iter().map(ToString::to_string).collect(),
			rule_width: DEFAULT_RULE_WIDTH,
		}
	}
}

impl fmt::Display for Lang {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

impl FromStr for Lang {
	type Err = BppError;

	fn from_str(value: &str) -> Result<Self, Self::Err> {
		let lang = match value.trim().to_lowercase().as_str() {
			"batch" | "bat" | "cmd" => Self::Batch,
			"python" | "py" => Self::Python,
			"c" => Self::C,
			"cplusplus" | "c++" | "cpp" => Self::CPlusPlus,
			"java" => Self::Java,
			"c#" | "csharp" | "cs" => Self::CSharp,
			"go" => Self::Go,
			"bash" | "sh" => Self::Bash,
			"javascript" | "js" => Self::JavaScript,
			_ => return Err(BppError::UnsupportedLang(value.to_string())),
		};

		Ok(lang)
	}
}

impl TryFrom<String> for Lang {
	type Error = BppError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		value.parse()
	}
}

/// Comment marker, extension allow-list and banner rule width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
	pub comment: String,
	/// Allowed extensions of included files, each with its leading dot.
	pub extensions: Vec<String>,
	pub rule_width: usize,
}

impl Profile {
	/// Whether `extension` (with its leading dot) is in the allow-list.
	/// Comparison ignores ASCII case.
	pub fn allows(&self, extension: &str) -> bool {
		self.extensions
			.iter()
			.any(|allowed| allowed.eq_ignore_ascii_case(extension))
	}

	/// The allow-list formatted for error messages.
	pub fn allowed_list(&self) -> String {
		self.extensions.join(", ")
	}
}

impl Default for Profile {
	fn default() -> Self {
		Lang::default().profile()
	}
}
