use std::path::PathBuf;

use bpp_core::Lang;
use bpp_core::PreprocessOptions;
use bpp_core::Property;
use clap::Parser;

#[derive(Parser)]
#[command(
	name = "bpp",
	author,
	version,
	arg_required_else_help = true,
	about = "Expand `:#include \"path\"` directives in batch files and other scripts.",
	long_about = "bpp (batch preprocessor) replaces every `:#include \"path\"` line of a script \
	              with the content of the named file, wrapped in comment banners that show \
	              where it came from. Included files may include further files; expansion \
	              repeats until nothing is left to include.\n\nPaths may reference environment \
	              variables (`%LIB%\\tools.bat` on Windows, `$LIB/tools.sh` elsewhere).\n\nA \
	              `bpp.toml` next to the source file can set `lang`, `comment`, `extensions`, \
	              `env_syntax`, `relative_to` and `max_passes`."
)]
pub struct BppCli {
	/// The script to preprocess.
	#[arg(long, short)]
	pub source: PathBuf,

	/// Where to write the preprocessed script. Printed to stdout when
	/// omitted.
	#[arg(long, short)]
	pub output: Option<PathBuf>,

	/// Run the preprocessed script with `cmd /C call` (Windows only). Without
	/// `--output` the script is written to a temporary file that is removed
	/// afterwards.
	#[arg(long, short, default_value_t = false)]
	pub run: bool,

	/// Target language. Decides the banner comment marker and which file
	/// extensions may be included.
	#[arg(long, short, value_parser = parse_lang)]
	pub lang: Option<Lang>,

	/// Override an includer property, e.g. `comment=REM` or
	/// `extensions=.bat,.cmd`. May be repeated.
	#[arg(long = "property", short = 'P', value_name = "NAME=VALUE", value_parser = parse_property)]
	pub properties: Vec<Property>,

	/// Maximum number of expansion passes before giving up. `0` removes the
	/// limit.
	#[arg(long)]
	pub max_passes: Option<usize>,

	/// Enable verbose output.
	#[arg(long, short, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, default_value_t = false)]
	pub no_color: bool,
}

impl BppCli {
	/// Apply the command line overrides on top of `options`.
	pub fn apply(&self, options: &mut PreprocessOptions) {
		if let Some(lang) = self.lang {
			if lang != options.lang {
				// Config properties belong to the config's language.
				options.properties.clear();
			}
			options.lang = lang;
		}
		options.properties.extend(self.properties.iter().cloned());
		if let Some(max_passes) = self.max_passes {
			options.max_passes = max_passes;
		}
	}
}

fn parse_lang(value: &str) -> Result<Lang, String> {
	value.parse().map_err(|e: bpp_core::BppError| e.to_string())
}

fn parse_property(value: &str) -> Result<Property, String> {
	value.parse().map_err(|e: bpp_core::BppError| e.to_string())
}
