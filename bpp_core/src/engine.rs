use std::path::Path;
use std::path::PathBuf;

use crate::BppConfig;
use crate::BppError;
use crate::BppResult;
use crate::Includer;
use crate::Lang;
use crate::PreprocessOptions;
use crate::SourceBuffer;
use crate::fs::normalize_line_endings;

/// Result of running the expansion driver to its fixed point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
	/// The fully expanded buffer, sentinels included.
	pub buffer: SourceBuffer,
	/// Number of passes that changed the buffer.
	pub passes: usize,
}

/// Repeatedly run `includer` over `buffer` until a pass leaves it unchanged.
///
/// Nested inclusion falls out of rescanning the whole buffer: a pass
/// substitutes file content that may itself contain directives, and the next
/// pass picks those up. When `max_passes` is non-zero, a buffer that is still
/// changing after that many passes fails with [`BppError::PassLimit`], which
/// is how inclusion cycles between distinct files surface.
pub fn expand_buffer(
	includer: &Includer,
	buffer: SourceBuffer,
	max_passes: usize,
) -> BppResult<Expansion> {
	let mut buffer = buffer;
	let mut passes = 0;

	loop {
		let next = includer.include(buffer.as_str())?;
		if next == buffer.as_str() {
			tracing::debug!(passes, "expansion settled");
			return Ok(Expansion { buffer, passes });
		}

		passes += 1;
		tracing::debug!(pass = passes, bytes = next.len(), "expansion pass changed buffer");

		if max_passes != 0 && passes > max_passes {
			return Err(BppError::PassLimit { passes: max_passes });
		}

		buffer = SourceBuffer::from_bounded(next);
	}
}

/// Expand every directive in `source` and return the result without the
/// sentinel line breaks.
#[tracing::instrument(level = "debug", skip_all, fields(source = %includer.source_path().display()))]
pub fn expand(includer: &Includer, source: &str, max_passes: usize) -> BppResult<String> {
	let buffer = SourceBuffer::new(&normalize_line_endings(source));
	let expansion = expand_buffer(includer, buffer, max_passes)?;
	Ok(expansion.buffer.into_content())
}

/// A source file together with its preprocessing state.
#[derive(Debug)]
pub struct Preprocessor {
	path: PathBuf,
	source: String,
	buffer: SourceBuffer,
	includer: Includer,
	max_passes: usize,
	passes: usize,
}

impl Preprocessor {
	/// Read the file at `path` and prepare it for preprocessing with
	/// `options`.
	pub fn open(path: impl AsRef<Path>, options: &PreprocessOptions) -> BppResult<Self> {
		let path = crate::fs::normalize(path.as_ref());
		let includer = options.includer(&path);

		Self::with_includer(path, includer, options.max_passes)
	}

	/// Like [`Preprocessor::open`], but reads options from the `bpp.toml`
	/// found next to the source file, if any.
	pub fn open_with_config(path: impl AsRef<Path>) -> BppResult<Self> {
		let path = crate::fs::normalize(path.as_ref());
		let dir = path.parent().unwrap_or(Path::new("."));
		let config = BppConfig::load(dir)?;
		let options = PreprocessOptions::from_config(config.as_ref())?;

		Self::open(path, &options)
	}

	/// Prepare the file at `path` using an already configured includer.
	pub fn with_includer(
		path: impl Into<PathBuf>,
		includer: Includer,
		max_passes: usize,
	) -> BppResult<Self> {
		let path = path.into();
		if !includer.files().is_file(&path) {
			return Err(BppError::SourceNotFound { path });
		}

		let source = includer
			.files()
			.read(&path)
			.map_err(|source| BppError::ReadFile {
				path: path.clone(),
				source,
			})?;
		let buffer = SourceBuffer::new(&source);

		Ok(Self {
			path,
			source,
			buffer,
			includer,
			max_passes,
			passes: 0,
		})
	}

	/// Expand all directives. Calling this again on an already expanded file
	/// is a no-op.
	#[tracing::instrument(level = "debug", skip(self), fields(source = %self.path.display()))]
	pub fn preprocess(&mut self) -> BppResult<&str> {
		let expansion = expand_buffer(&self.includer, self.buffer.clone(), self.max_passes)?;
		self.passes += expansion.passes;
		self.buffer = expansion.buffer;

		Ok(self.buffer.content())
	}

	/// The preprocessed text so far, without sentinels.
	pub fn preprocessed(&self) -> &str {
		self.buffer.content()
	}

	/// The file content before preprocessing.
	pub fn source(&self) -> &str {
		&self.source
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Total number of passes that changed the buffer.
	pub fn passes(&self) -> usize {
		self.passes
	}

	pub fn includer_mut(&mut self) -> &mut Includer {
		&mut self.includer
	}

	/// Write the preprocessed text to `path`.
	pub fn save(&self, path: impl AsRef<Path>) -> BppResult<()> {
		let path = path.as_ref();
		self.includer
			.files()
			.write(path, self.preprocessed())
			.map_err(|source| BppError::WriteFile {
				path: path.to_path_buf(),
				source,
			})
	}
}

/// Expand every directive in the file at `source_path` using the `lang`
/// profile, returning the result.
///
/// ```rust,no_run
/// use bpp_core::Lang;
/// use bpp_core::include_all;
///
/// let expanded = include_all("build.bat", Lang::Batch).unwrap();
/// println!("{expanded}");
/// ```
pub fn include_all(source_path: impl AsRef<Path>, lang: Lang) -> BppResult<String> {
	let options = PreprocessOptions {
		lang,
		..PreprocessOptions::default()
	};
	let mut preprocessor = Preprocessor::open(source_path, &options)?;
	preprocessor.preprocess()?;

	Ok(preprocessor.preprocessed().to_string())
}
