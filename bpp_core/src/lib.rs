//! `bpp_core` is the engine behind the `bpp` batch preprocessor. It expands
//! `:#include "path"` directives in script files, wrapping every inclusion in
//! comment banners so the origin of each block stays visible in the output.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Source file
//!   → SourceBuffer (content bounded by a leading and trailing line break)
//!   → Validator (rejects malformed directives with a categorized hint)
//!   → Includer, environment pass (`:#include "%LIB%\x.bat"` / `"$LIB/x.sh"`)
//!   → Includer, plain pass (`:#include "lib\x.bat"`)
//!   → Driver (repeats until a pass changes nothing)
//! ```
//!
//! ## Modules
//!
//! - [`config`]: `bpp.toml` discovery and [`PreprocessOptions`].
//! - [`fs`]: the [`FileAccess`] capability used for every read and write.
//! - [`env`]: environment variable expansion for directive payloads.
//!
//! ## Key Types
//!
//! - [`Shape`], [`DirectiveKind`], [`MalformedKind`]: the recognized
//!   directive shapes and their patterns.
//! - [`Includer`]: one round of inclusion plus the self-inclusion guard.
//! - [`Preprocessor`]: a source file driven to its fixed point.
//! - [`Lang`] / [`Profile`]: comment marker and allowed extensions per
//!   target language.
//! - [`BppError`]: every failure, each with a `bpp::*` diagnostic code.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bpp_core::Lang;
//! use bpp_core::PreprocessOptions;
//! use bpp_core::Preprocessor;
//!
//! let options = PreprocessOptions {
//! 	lang: Lang::Batch,
//! 	..PreprocessOptions::default()
//! };
//! let mut preprocessor = Preprocessor::open("build.bat", &options).unwrap();
//! preprocessor.preprocess().unwrap();
//! preprocessor.save("build.out.bat").unwrap();
//! ```

pub use absolutize::*;
pub use config::*;
pub use engine::*;
pub use error::*;
pub use fs::FileAccess;
pub use fs::OsFileAccess;
pub use includer::*;
pub use patterns::*;
pub use profile::*;
pub use validator::*;

mod absolutize;
pub mod config;
mod engine;
pub mod env;
#[allow(unused_assignments)]
mod error;
pub mod fs;
mod includer;
mod patterns;
mod profile;
mod validator;

#[cfg(test)]
mod __fixtures;
