use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Deserialize;

use crate::BppError;
use crate::BppResult;
use crate::DirectiveKind;
use crate::EnvSyntax;
use crate::Lang;
use crate::Profile;
use crate::absolutize_includes;
use crate::env::EnvLookupFn;
use crate::env::expand_payload;
use crate::env::process_env;
use crate::fs::FileAccess;
use crate::fs::OsFileAccess;
use crate::validator::line_of;
use crate::validator::validate;

/// Which directory relative paths in nested inclusions are resolved from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelativeTo {
	/// Every relative path resolves from the directory of the file being
	/// preprocessed, no matter how deeply it is nested.
	#[default]
	Source,
	/// Relative paths inside an included file resolve from that file's own
	/// directory.
	Including,
}

impl FromStr for RelativeTo {
	type Err = BppError;

	fn from_str(value: &str) -> Result<Self, Self::Err> {
		match value.trim().to_ascii_lowercase().as_str() {
			"source" => Ok(Self::Source),
			"including" => Ok(Self::Including),
			_ => {
				Err(BppError::InvalidProperty {
					name: "relative_to".to_string(),
					reason: format!("expected `source` or `including`, got `{value}`"),
				})
			}
		}
	}
}

/// A reconfigurable includer property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Property {
	/// The comment marker used to build inclusion banners, e.g. `::` or `#`.
	Comment(String),
	/// The extensions included files may have, e.g. `.bat`.
	Extensions(Vec<String>),
}

impl Property {
	/// Build a property from its name and textual value. Extensions are
	/// comma separated; a missing leading dot is added.
	pub fn parse(name: &str, value: &str) -> BppResult<Self> {
		let invalid = |reason: &str| BppError::InvalidProperty {
			name: name.to_string(),
			reason: reason.to_string(),
		};

		match name.trim() {
			"comment" => {
				let comment = value.trim();
				if comment.is_empty() {
					return Err(invalid("the comment marker cannot be empty"));
				}
				if comment.contains('\n') {
					return Err(invalid("the comment marker must fit on one line"));
				}
				Ok(Self::Comment(comment.to_string()))
			}
			"extensions" => {
				let extensions: Vec<String> = value
					.split(',')
					.map(str::trim)
					.filter(|extension| !extension.is_empty())
					.map(|extension| {
						if extension.starts_with('.') {
							extension.to_string()
						} else {
							format!(".{extension}")
						}
					})
					.collect();

				if extensions.is_empty() {
					return Err(invalid("at least one extension is required"));
				}
				Ok(Self::Extensions(extensions))
			}
			other => Err(BppError::UnknownProperty(other.to_string())),
		}
	}

	pub fn name(&self) -> &'static str {
		match self {
			Self::Comment(_) => "comment",
			Self::Extensions(_) => "extensions",
		}
	}
}

impl fmt::Display for Property {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Comment(comment) => write!(f, "comment={comment}"),
			Self::Extensions(extensions) => write!(f, "extensions={}", extensions.join(",")),
		}
	}
}

/// Parses `name=value`.
impl FromStr for Property {
	type Err = BppError;

	fn from_str(value: &str) -> Result<Self, Self::Err> {
		let Some((name, value)) = value.split_once('=') else {
			return Err(BppError::InvalidProperty {
				name: value.to_string(),
				reason: "expected `name=value`".to_string(),
			});
		};

		Self::parse(name, value)
	}
}

/// Performs one round of inclusion over a sentinel-bounded buffer.
///
/// An `Includer` is built once per preprocessing run. It remembers the file
/// being processed so that it can refuse to include it into itself, and it
/// carries the profile that decides banner comments and allowed extensions.
pub struct Includer {
	source_path: PathBuf,
	base_dir: PathBuf,
	profile: Profile,
	env_syntax: EnvSyntax,
	relative_to: RelativeTo,
	files: Box<dyn FileAccess>,
	env: Box<EnvLookupFn>,
}

impl fmt::Debug for Includer {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Includer")
			.field("source_path", &self.source_path)
			.field("base_dir", &self.base_dir)
			.field("profile", &self.profile)
			.field("env_syntax", &self.env_syntax)
			.field("relative_to", &self.relative_to)
			.finish_non_exhaustive()
	}
}

impl Includer {
	/// Create an includer for the file at `source_path` using the batch
	/// profile. Relative include paths resolve from the file's directory.
	pub fn new(source_path: impl Into<PathBuf>) -> Self {
		let source_path = source_path.into();
		let base_dir = source_path
			.parent()
			.map(Path::to_path_buf)
			.unwrap_or_default();

		Self {
			source_path,
			base_dir,
			profile: Profile::default(),
			env_syntax: EnvSyntax::default(),
			relative_to: RelativeTo::default(),
			files: Box::new(OsFileAccess),
			env: Box::new(process_env),
		}
	}

	/// Create an includer preconfigured for `lang`.
	pub fn for_lang(source_path: impl Into<PathBuf>, lang: Lang) -> Self {
		Self::new(source_path).with_profile(lang.profile())
	}

	#[must_use]
	pub fn with_profile(mut self, profile: Profile) -> Self {
		self.profile = profile;
		self
	}

	#[must_use]
	pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
		self.base_dir = base_dir.into();
		self
	}

	#[must_use]
	pub fn with_env_syntax(mut self, env_syntax: EnvSyntax) -> Self {
		self.env_syntax = env_syntax;
		self
	}

	#[must_use]
	pub fn with_relative_to(mut self, relative_to: RelativeTo) -> Self {
		self.relative_to = relative_to;
		self
	}

	#[must_use]
	pub fn with_file_access(mut self, files: impl FileAccess + 'static) -> Self {
		self.files = Box::new(files);
		self
	}

	/// Replace the environment lookup, which defaults to the process
	/// environment.
	#[must_use]
	pub fn with_env_lookup<F>(mut self, lookup: F) -> Self
	where
		F: Fn(&str) -> Option<String> + 'static,
	{
		self.env = Box::new(lookup);
		self
	}

	pub fn source_path(&self) -> &Path {
		&self.source_path
	}

	pub fn base_dir(&self) -> &Path {
		&self.base_dir
	}

	pub fn profile(&self) -> &Profile {
		&self.profile
	}

	pub fn env_syntax(&self) -> EnvSyntax {
		self.env_syntax
	}

	pub fn files(&self) -> &dyn FileAccess {
		self.files.as_ref()
	}

	/// Change the comment marker or the extension allow-list.
	pub fn set_property(&mut self, property: Property) {
		match property {
			Property::Comment(comment) => self.profile.comment = comment,
			Property::Extensions(extensions) => self.profile.extensions = extensions,
		}
	}

	/// Read back a property by name.
	pub fn get_property(&self, name: &str) -> BppResult<Property> {
		match name.trim() {
			"comment" => Ok(Property::Comment(self.profile.comment.clone())),
			"extensions" => Ok(Property::Extensions(self.profile.extensions.clone())),
			other => Err(BppError::UnknownProperty(other.to_string())),
		}
	}

	/// Run one round of inclusion over `buffer`.
	///
	/// The buffer is validated first. Environment directives are then
	/// resolved, followed by plain directives in the already substituted text.
	/// Every occurrence of an identical directive line receives the same
	/// replacement. Directives that arrive with freshly included content are
	/// left for the next round, except plain directives brought in by an
	/// environment inclusion.
	pub fn include(&self, buffer: &str) -> BppResult<String> {
		validate(buffer)?;

		let mut included = buffer.to_string();
		let mut seen = HashSet::new();

		for m in DirectiveKind::Environment
			.pattern(self.env_syntax)
			.find_iter(buffer)
		{
			let directive = m.as_str();
			if !seen.insert(directive) {
				continue;
			}

			let payload = extract(DirectiveKind::Environment, directive)?;
			let path = expand_payload(payload, directive, self.env_syntax, self.env.as_ref())?;
			let target = self.resolve_target(&path);
			let replacement = self.inclusion(buffer, directive, &target)?;
			included = included.replace(directive, &replacement);
		}

		let after_environment = included.clone();
		let mut seen = HashSet::new();

		for m in DirectiveKind::Plain
			.pattern(self.env_syntax)
			.find_iter(&after_environment)
		{
			let directive = m.as_str();
			if !seen.insert(directive) || self.references_environment(directive) {
				continue;
			}

			let payload = extract(DirectiveKind::Plain, directive)?;
			let target = self.resolve_target(payload);
			let replacement = self.inclusion(buffer, directive, &target)?;
			included = included.replace(directive, &replacement);
		}

		Ok(included)
	}

	/// Refuse to include the file that is being processed.
	///
	/// `buffer` is only used to report where `directive` sits.
	pub fn guard(&self, buffer: &str, directive: &str, target: &Path) -> BppResult<()> {
		if self.files.identity(target) == self.files.identity(&self.source_path) {
			return Err(BppError::SelfInclusion {
				line: line_of(buffer, directive),
				directive: directive.to_string(),
			});
		}

		Ok(())
	}

	/// Read an included file after checking that it exists and that its
	/// extension is allowed.
	pub fn read_included(&self, path: &Path) -> BppResult<String> {
		if !self.files.is_file(path) {
			return Err(BppError::IncludeNotFound {
				path: path.to_path_buf(),
			});
		}

		let extension = path
			.extension()
			.map(|extension| format!(".{}", extension.to_string_lossy()))
			.unwrap_or_default();
		if !self.profile.allows(&extension) {
			return Err(BppError::UnsupportedExtension {
				path: path.to_path_buf(),
				allowed: self.profile.allowed_list(),
			});
		}

		self.files.read(path).map_err(|source| {
			BppError::ReadFile {
				path: path.to_path_buf(),
				source,
			}
		})
	}

	/// Surround `content` with the opening and closing banners.
	pub fn wrap(&self, display_name: &str, content: &str) -> String {
		let comment = &self.profile.comment;
		let rule = "-".repeat(self.profile.rule_width);

		format!(
			"{comment} File - \"{display_name}\"\n{comment}{rule}(\n\n{content}\n\n{comment}{rule})\n"
		)
	}

	fn resolve_target(&self, path: &str) -> PathBuf {
		let path = Path::new(path);
		if path.is_absolute() {
			path.to_path_buf()
		} else {
			self.base_dir.join(path)
		}
	}

	fn references_environment(&self, directive: &str) -> bool {
		DirectiveKind::Environment
			.pattern(self.env_syntax)
			.is_match(&format!("\n{directive}\n"))
	}

	fn inclusion(&self, buffer: &str, directive: &str, target: &Path) -> BppResult<String> {
		self.guard(buffer, directive, target)?;
		let mut content = self.read_included(target)?;

		if self.relative_to == RelativeTo::Including {
			if let Some(dir) = target.parent() {
				content = absolutize_includes(dir, &content, self.env_syntax);
			}
		}

		tracing::debug!(
			directive = directive.trim(),
			path = %target.display(),
			bytes = content.len(),
			"resolved inclusion"
		);

		let display_name = target
			.file_name()
			.map_or_else(|| target.to_string_lossy(), |name| name.to_string_lossy());
		Ok(self.wrap(&display_name, &content))
	}
}

fn extract(kind: DirectiveKind, directive: &str) -> BppResult<&str> {
	kind.extract(directive).ok_or_else(|| {
		BppError::MissingPayload {
			directive: directive.trim().to_string(),
		}
	})
}
