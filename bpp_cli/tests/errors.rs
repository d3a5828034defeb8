mod common;

use bpp_core::AnyEmptyResult;
use rstest::rstest;

#[rstest]
#[case::missing_value(":#include", "The 'include' must be followed by a value")]
#[case::empty_quotes(":#include \"\"", "In quotes there must be a text")]
#[case::lone_quote(":#include \"", "You cannot specify only one quotation mark")]
#[case::unclosed_quote(":#include \"lib.bat", "You have to close quotes on the sides")]
#[case::unquoted(":#include lib.bat", "The path must be quoted in quotes")]
fn malformed_directive(#[case] directive: &str, #[case] hint: &str) -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("main.bat"), format!("@echo off\n{directive}"))?;
	let output = tmp.path().join("out.bat");

	common::bpp_cmd()
		.arg("-s")
		.arg(tmp.path().join("main.bat"))
		.arg("-o")
		.arg(&output)
		.assert()
		.code(1)
		.stderr(predicates::str::contains("error:"))
		.stderr(predicates::str::contains("line 2"))
		.stderr(predicates::str::contains(hint));

	assert!(!output.exists());

	Ok(())
}

#[test]
fn missing_source() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::bpp_cmd()
		.arg("-s")
		.arg(tmp.path().join("nope.bat"))
		.assert()
		.code(1)
		.stderr(predicates::str::contains("source file not found"));

	Ok(())
}

#[test]
fn missing_include() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("main.bat"), ":#include \"nope.bat\"")?;

	common::bpp_cmd()
		.arg("-s")
		.arg(tmp.path().join("main.bat"))
		.assert()
		.code(1)
		.stderr(predicates::str::contains("include file not found"))
		.stderr(predicates::str::contains("nope.bat"));

	Ok(())
}

#[test]
fn verbose_errors_show_diagnostic_code() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("main.bat"), ":#include \"nope.bat\"")?;

	common::bpp_cmd()
		.arg("-s")
		.arg(tmp.path().join("main.bat"))
		.arg("-v")
		.assert()
		.code(1)
		.stderr(predicates::str::contains("bpp::include_not_found"));

	Ok(())
}

#[test]
fn self_inclusion() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("main.bat"), "echo\n:#include \"main.bat\"")?;

	common::bpp_cmd()
		.arg("-s")
		.arg(tmp.path().join("main.bat"))
		.assert()
		.code(1)
		.stderr(predicates::str::contains("trying to include itself at line 2"));

	Ok(())
}

#[test]
fn mutual_inclusion_stops_at_pass_limit() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("main.bat"), ":#include \"a.bat\"")?;
	std::fs::write(tmp.path().join("a.bat"), ":#include \"b.bat\"")?;
	std::fs::write(tmp.path().join("b.bat"), ":#include \"a.bat\"")?;

	common::bpp_cmd()
		.arg("-s")
		.arg(tmp.path().join("main.bat"))
		.arg("--max-passes")
		.arg("3")
		.assert()
		.code(1)
		.stderr(predicates::str::contains("did not settle after 3 passes"));

	Ok(())
}

#[test]
fn unsupported_extension() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("main.bat"), ":#include \"notes.txt\"")?;
	std::fs::write(tmp.path().join("notes.txt"), "hello")?;

	common::bpp_cmd()
		.arg("-s")
		.arg(tmp.path().join("main.bat"))
		.assert()
		.code(1)
		.stderr(predicates::str::contains(".bat, .cmd, .hbat, .hb"));

	Ok(())
}

#[cfg(not(windows))]
#[test]
fn run_requires_windows() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("main.bat"), "echo hi")?;

	common::bpp_cmd()
		.arg("-s")
		.arg(tmp.path().join("main.bat"))
		.arg("--run")
		.assert()
		.code(1)
		.stderr(predicates::str::contains("only supported on Windows"));

	Ok(())
}

#[test]
fn unsupported_lang() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("main.bat"), "echo hi")?;

	common::bpp_cmd()
		.arg("-s")
		.arg(tmp.path().join("main.bat"))
		.arg("-l")
		.arg("cobol")
		.assert()
		.code(1)
		.stderr(predicates::str::contains("this lang `cobol` is unsupported"));

	Ok(())
}

#[test]
fn unknown_property() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("main.bat"), "echo hi")?;

	common::bpp_cmd()
		.arg("-s")
		.arg(tmp.path().join("main.bat"))
		.arg("-P")
		.arg("width=10")
		.assert()
		.code(1)
		.stderr(predicates::str::contains("this property `width` is not supported"));

	Ok(())
}

#[test]
fn source_is_required() {
	common::bpp_cmd()
		.arg("-o")
		.arg("out.bat")
		.assert()
		.code(1)
		.stderr(predicates::str::contains("--source"));
}

#[test]
fn no_arguments_prints_help() {
	common::bpp_cmd()
		.assert()
		.code(0)
		.stderr(predicates::str::contains("Usage:"));
}

#[test]
fn version_flag() {
	common::bpp_cmd()
		.arg("--version")
		.assert()
		.success()
		.stdout(predicates::str::contains(env!("CARGO_PKG_VERSION")));
}
