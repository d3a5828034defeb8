use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::BppError;
use crate::BppResult;
use crate::EnvSyntax;
use crate::Includer;
use crate::Lang;
use crate::Property;
use crate::RelativeTo;

/// Default upper bound on the number of expansion passes that may still
/// change the buffer.
pub const DEFAULT_MAX_PASSES: usize = 64;

/// Supported config file locations in discovery order (highest precedence
/// first). They are looked up in the directory of the source file.
pub const CONFIG_FILE_CANDIDATES: [&str; 3] = ["bpp.toml", ".bpp.toml", ".config/bpp.toml"];

/// Configuration loaded from a `bpp.toml` file.
///
/// ```toml
/// lang = "batch"
/// comment = "::"
/// extensions = [".bat", ".cmd"]
/// env_syntax = "percent"
/// relative_to = "including"
/// max_passes = 32
/// ```
///
/// Every key is optional. `comment` and `extensions` override the values
/// from the `lang` profile.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BppConfig {
	/// Target language profile.
	#[serde(default)]
	pub lang: Option<Lang>,
	/// Comment marker used for inclusion banners.
	#[serde(default)]
	pub comment: Option<String>,
	/// Allowed extensions of included files.
	#[serde(default)]
	pub extensions: Option<Vec<String>>,
	/// How environment variables are written inside directives.
	#[serde(default)]
	pub env_syntax: Option<EnvSyntax>,
	/// Where relative paths inside included files resolve from.
	#[serde(default)]
	pub relative_to: Option<RelativeTo>,
	/// Maximum number of expansion passes. `0` removes the limit.
	#[serde(default)]
	pub max_passes: Option<usize>,
}

impl BppConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if there is no config file.
	pub fn load(root: &Path) -> BppResult<Option<BppConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		let content = std::fs::read_to_string(&config_path).map_err(|source| {
			BppError::ReadFile {
				path: config_path.clone(),
				source,
			}
		})?;
		let config: BppConfig =
			toml::from_str(&content).map_err(|e| BppError::ConfigParse(e.to_string()))?;

		tracing::debug!(path = %config_path.display(), "loaded config");
		Ok(Some(config))
	}
}

/// Everything needed to set up a preprocessing run.
///
/// Use [`PreprocessOptions::default()`] for the batch profile or
/// [`PreprocessOptions::from_config`] to start from a [`BppConfig`]. Command
/// line overrides are applied on top by mutating the public fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreprocessOptions {
	pub lang: Lang,
	/// Applied in order after the `lang` profile.
	pub properties: Vec<Property>,
	pub env_syntax: EnvSyntax,
	pub relative_to: RelativeTo,
	/// `0` disables the limit.
	pub max_passes: usize,
}

impl Default for PreprocessOptions {
	fn default() -> Self {
		Self {
			lang: Lang::default(),
			properties: Vec::new(),
			env_syntax: EnvSyntax::default(),
			relative_to: RelativeTo::default(),
			max_passes: DEFAULT_MAX_PASSES,
		}
	}
}

impl PreprocessOptions {
	/// Construct [`PreprocessOptions`] from an optional [`BppConfig`].
	pub fn from_config(config: Option<&BppConfig>) -> BppResult<Self> {
		let mut options = Self::default();
		let Some(config) = config else {
			return Ok(options);
		};

		if let Some(lang) = config.lang {
			options.lang = lang;
		}
		if let Some(comment) = &config.comment {
			options.properties.push(Property::parse("comment", comment)?);
		}
		if let Some(extensions) = &config.extensions {
			options
				.properties
				.push(Property::parse("extensions", &extensions.join(","))?);
		}
		if let Some(env_syntax) = config.env_syntax {
			options.env_syntax = env_syntax;
		}
		if let Some(relative_to) = config.relative_to {
			options.relative_to = relative_to;
		}
		if let Some(max_passes) = config.max_passes {
			options.max_passes = max_passes;
		}

		Ok(options)
	}

	/// Build the includer for the file at `source_path`.
	pub fn includer(&self, source_path: impl Into<PathBuf>) -> Includer {
		let mut includer = Includer::for_lang(source_path, self.lang)
			.with_env_syntax(self.env_syntax)
			.with_relative_to(self.relative_to);

		for property in &self.properties {
			includer.set_property(property.clone());
		}

		includer
	}
}
