use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::MalformedKind;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum BppError {
	#[error(transparent)]
	#[diagnostic(code(bpp::io_error))]
	Io(#[from] std::io::Error),

	#[error("syntax error in `include` directive at line {}: {}: `{directive}`", display_line(.line), .kind.hint())]
	#[diagnostic(
		code(bpp::malformed_directive),
		help("write the directive on its own line as `:#include \"path\"`")
	)]
	MalformedDirective {
		kind: MalformedKind,
		line: Option<usize>,
		directive: String,
	},

	#[error("no quoted path could be extracted from directive: `{directive}`")]
	#[diagnostic(code(bpp::missing_payload))]
	MissingPayload { directive: String },

	#[error("the file is trying to include itself at line {}: `{directive}`", display_line(.line))]
	#[diagnostic(
		code(bpp::self_inclusion),
		help("remove the directive or point it at a different file")
	)]
	SelfInclusion {
		line: Option<usize>,
		directive: String,
	},

	#[error("include file not found: `{}`", .path.display())]
	#[diagnostic(code(bpp::include_not_found))]
	IncludeNotFound { path: PathBuf },

	#[error("file extension of `{}` must be one of: {allowed}", .path.display())]
	#[diagnostic(
		code(bpp::unsupported_extension),
		help("change the language profile or set the `extensions` property")
	)]
	UnsupportedExtension { path: PathBuf, allowed: String },

	#[error("environment variable `{name}` is not set (referenced by `{directive}`)")]
	#[diagnostic(code(bpp::unset_variable))]
	UnsetVariable { name: String, directive: String },

	#[error("failed to read `{}`: {source}", .path.display())]
	#[diagnostic(code(bpp::read_file))]
	ReadFile {
		path: PathBuf,
		source: std::io::Error,
	},

	#[error("failed to write `{}`: {source}", .path.display())]
	#[diagnostic(code(bpp::write_file))]
	WriteFile {
		path: PathBuf,
		source: std::io::Error,
	},

	#[error("source file not found: `{}`", .path.display())]
	#[diagnostic(code(bpp::source_not_found))]
	SourceNotFound { path: PathBuf },

	#[error("this lang `{0}` is unsupported")]
	#[diagnostic(
		code(bpp::unsupported_lang),
		help("supported langs: batch, python, c, cplusplus, java, c#, go, bash, javascript")
	)]
	UnsupportedLang(String),

	#[error("this property `{0}` is not supported")]
	#[diagnostic(code(bpp::unknown_property), help("supported properties: comment, extensions"))]
	UnknownProperty(String),

	#[error("invalid value for property `{name}`: {reason}")]
	#[diagnostic(code(bpp::invalid_property))]
	InvalidProperty { name: String, reason: String },

	#[error("unsupported environment variable syntax: `{0}`")]
	#[diagnostic(code(bpp::env_syntax), help("use `percent` or `dollar`"))]
	EnvSyntax(String),

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(bpp::config_parse),
		help("check that bpp.toml is valid TOML with top level keys only")
	)]
	ConfigParse(String),

	#[error("the run option is only supported on Windows")]
	#[diagnostic(code(bpp::run_unsupported), help("use `--output` and run the script yourself"))]
	RunUnsupported,

	#[error("expansion did not settle after {passes} passes")]
	#[diagnostic(
		code(bpp::pass_limit),
		help("two or more files probably include each other; raise `max_passes` if the nesting is real")
	)]
	PassLimit { passes: usize },
}

/// Render a best-effort line number, using `-1` when the directive could not be
/// located as a standalone line.
#[allow(clippy::ref_option)]
pub fn display_line(line: &Option<usize>) -> String {
	line.map_or_else(|| "-1".to_string(), |line| line.to_string())
}

pub type BppResult<T> = Result<T, BppError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
