mod common;

use bpp_core::AnyEmptyResult;
use predicates::prelude::PredicateBooleanExt;
use rstest::rstest;

#[test]
fn writes_output_file() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("main.bat"), "@echo off\n:#include \"lib.bat\"\necho done")?;
	std::fs::write(tmp.path().join("lib.bat"), "echo lib")?;
	let output = tmp.path().join("out.bat");

	common::bpp_cmd()
		.arg("--source")
		.arg(tmp.path().join("main.bat"))
		.arg("--output")
		.arg(&output)
		.assert()
		.success()
		.stdout(predicates::str::is_empty());

	let rule = "-".repeat(30);
	assert_eq!(
		std::fs::read_to_string(&output)?,
		format!("@echo off\n:: File - \"lib.bat\"\n::{rule}(\n\necho lib\n\n::{rule})\n\necho done")
	);

	Ok(())
}

#[test]
fn prints_to_stdout_without_output() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("main.bat"), ":#include \"lib.bat\"")?;
	std::fs::write(tmp.path().join("lib.bat"), "echo lib")?;

	common::bpp_cmd()
		.arg("-s")
		.arg(tmp.path().join("main.bat"))
		.assert()
		.success()
		.stdout(predicates::str::contains(":: File - \"lib.bat\""))
		.stdout(predicates::str::contains("echo lib"))
		.stdout(predicates::str::contains(":#include").not());

	Ok(())
}

#[test]
fn nested_includes_resolve_from_source_dir() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::create_dir_all(tmp.path().join("lib"))?;
	std::fs::write(tmp.path().join("main.bat"), ":#include \"lib/a.bat\"")?;
	std::fs::write(tmp.path().join("lib/a.bat"), "echo a\n:#include \"lib/b.bat\"")?;
	std::fs::write(tmp.path().join("lib/b.bat"), "echo b")?;

	common::bpp_cmd()
		.arg("-s")
		.arg(tmp.path().join("main.bat"))
		.assert()
		.success()
		.stdout(predicates::str::contains(":: File - \"a.bat\""))
		.stdout(predicates::str::contains(":: File - \"b.bat\""));

	Ok(())
}

#[rstest]
#[case::python("py", "main.py", "util.py", "# File - \"util.py\"")]
#[case::javascript("js", "main.js", "util.js", "// File - \"util.js\"")]
#[case::cpp("c++", "main.cpp", "util.hpp", "// File - \"util.hpp\"")]
fn lang_profiles(
	#[case] lang: &str,
	#[case] source: &str,
	#[case] included: &str,
	#[case] banner: &str,
) -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join(source), format!(":#include \"{included}\""))?;
	std::fs::write(tmp.path().join(included), "content")?;

	common::bpp_cmd()
		.arg("-s")
		.arg(tmp.path().join(source))
		.arg("--lang")
		.arg(lang)
		.assert()
		.success()
		.stdout(predicates::str::contains(banner));

	Ok(())
}

#[test]
fn property_overrides() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("main.bat"), ":#include \"notes.txt\"")?;
	std::fs::write(tmp.path().join("notes.txt"), "hello")?;

	common::bpp_cmd()
		.arg("-s")
		.arg(tmp.path().join("main.bat"))
		.arg("-P")
		.arg("comment=REM")
		.arg("--property")
		.arg("extensions=.txt")
		.assert()
		.success()
		.stdout(predicates::str::contains("REM File - \"notes.txt\""));

	Ok(())
}

#[test]
fn config_next_to_source() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("bpp.toml"), "comment = \"rem\"\n")?;
	std::fs::write(tmp.path().join("main.bat"), ":#include \"lib.cmd\"")?;
	std::fs::write(tmp.path().join("lib.cmd"), "echo lib")?;

	common::bpp_cmd()
		.arg("-s")
		.arg(tmp.path().join("main.bat"))
		.assert()
		.success()
		.stdout(predicates::str::contains("rem File - \"lib.cmd\""));

	Ok(())
}

#[test]
fn environment_variable_in_path() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let lib = tmp.path().join("lib");
	std::fs::create_dir_all(&lib)?;
	std::fs::write(lib.join("tools.bat"), "echo tools")?;

	let directive = if cfg!(windows) {
		":#include \"%BPP_TEST_LIB%\\tools.bat\""
	} else {
		":#include \"$BPP_TEST_LIB/tools.bat\""
	};
	std::fs::write(tmp.path().join("main.bat"), directive)?;

	common::bpp_cmd()
		.env("BPP_TEST_LIB", &lib)
		.arg("-s")
		.arg(tmp.path().join("main.bat"))
		.assert()
		.success()
		.stdout(predicates::str::contains("echo tools"));

	Ok(())
}

#[test]
fn verbose_logs_to_stderr() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("main.bat"), ":#include \"lib.bat\"")?;
	std::fs::write(tmp.path().join("lib.bat"), "echo lib")?;

	common::bpp_cmd()
		.arg("-s")
		.arg(tmp.path().join("main.bat"))
		.arg("--verbose")
		.assert()
		.success()
		.stdout(predicates::str::contains("echo lib"))
		.stdout(predicates::str::contains("expansion settled").not())
		.stderr(predicates::str::contains("expansion settled"));

	Ok(())
}
