use std::path::Path;
use std::process;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use bpp_cli::BppCli;
use bpp_core::BppConfig;
use bpp_core::BppError;
use bpp_core::BppResult;
use bpp_core::PreprocessOptions;
use bpp_core::Preprocessor;
use clap::Parser;
use clap::error::ErrorKind;
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

static USE_COLOR: AtomicBool = AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = match BppCli::try_parse() {
		Ok(args) => args,
		Err(e) => {
			let code = match e.kind() {
				ErrorKind::DisplayHelp
				| ErrorKind::DisplayVersion
				| ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => 0,
				_ => 1,
			};
			e.print().ok();
			process::exit(code);
		}
	};

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, Ordering::Relaxed);
	}

	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	init_tracing(args.verbose);

	if let Err(e) = run(&args) {
		if args.verbose {
			let report: miette::Report = e.into();
			eprintln!("{report:?}");
		} else {
			eprintln!("{} {e}", colored!("error:", red));
		}
		process::exit(1);
	}
}

/// Logs go to stderr; stdout carries the preprocessed script.
fn init_tracing(verbose: bool) {
	let filter = if verbose {
		EnvFilter::new("debug")
	} else {
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
	};

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(color_enabled())
		.init();
}

fn run(args: &BppCli) -> BppResult<()> {
	if args.run && !cfg!(windows) {
		return Err(BppError::RunUnsupported);
	}

	let source = bpp_core::fs::normalize(&args.source);
	let dir = source.parent().unwrap_or(Path::new("."));
	let config = BppConfig::load(dir)?;
	let mut options = PreprocessOptions::from_config(config.as_ref())?;
	args.apply(&mut options);

	let mut preprocessor = Preprocessor::open(&source, &options)?;
	preprocessor.preprocess()?;
	tracing::debug!(
		source = %source.display(),
		passes = preprocessor.passes(),
		lang = %options.lang,
		"preprocessed"
	);

	match &args.output {
		Some(output) => {
			preprocessor.save(output)?;
			if args.run {
				execute(output)?;
			}
		}
		None if args.run => run_temporary(&preprocessor)?,
		None => println!("{}", preprocessor.preprocessed()),
	}

	Ok(())
}

/// Save the result next to the source as `__output_*__.bat`, run it and
/// remove it again.
fn run_temporary(preprocessor: &Preprocessor) -> BppResult<()> {
	let dir = preprocessor.path().parent().unwrap_or(Path::new("."));
	let script = tempfile::Builder::new()
		.prefix("__output_")
		.suffix("__.bat")
		.tempfile_in(dir)?
		.into_temp_path();

	preprocessor.save(&script)?;
	execute(&script)?;
	script.close()?;

	Ok(())
}

#[cfg(windows)]
fn execute(script: &Path) -> BppResult<()> {
	let status = process::Command::new("cmd")
		.arg("/C")
		.arg("call")
		.arg(script)
		.status()?;

	if !status.success() {
		tracing::warn!(code = ?status.code(), script = %script.display(), "script failed");
	}

	Ok(())
}

#[cfg(not(windows))]
fn execute(_script: &Path) -> BppResult<()> {
	Err(BppError::RunUnsupported)
}
