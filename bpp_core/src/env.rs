//! Environment variable expansion for directive payloads.
//!
//! Only plain variable substitution is performed. A variable's value is
//! inserted verbatim; it is never re-expanded or handed to a shell.

use std::sync::LazyLock;

use regex::Regex;

use crate::BppError;
use crate::BppResult;
use crate::EnvSyntax;

/// Looks up the value of an environment variable by name.
pub type EnvLookupFn = dyn Fn(&str) -> Option<String>;

/// Reads from the process environment.
pub fn process_env(name: &str) -> Option<String> {
	std::env::var(name).ok()
}

static PERCENT_VARIABLE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"%([^%\s]+)%").expect("valid percent variable pattern"));

/// Expand every variable reference in `payload`.
///
/// `directive` is only used to give context when a variable is unset.
pub fn expand_payload(
	payload: &str,
	directive: &str,
	syntax: EnvSyntax,
	lookup: &EnvLookupFn,
) -> BppResult<String> {
	let unset = |name: &str| BppError::UnsetVariable {
		name: name.to_string(),
		directive: directive.trim().to_string(),
	};

	match syntax {
		EnvSyntax::Dollar => {
			shellexpand::env_with_context(payload, |name| lookup(name).map(Some).ok_or(()))
				.map(std::borrow::Cow::into_owned)
				.map_err(|e| unset(&e.var_name))
		}
		EnvSyntax::Percent => {
			let mut expanded = String::with_capacity(payload.len());
			let mut last = 0;

			for caps in PERCENT_VARIABLE.captures_iter(payload) {
				let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
					continue;
				};
				let value = lookup(name.as_str()).ok_or_else(|| unset(name.as_str()))?;
				expanded.push_str(&payload[last..whole.start()]);
				expanded.push_str(&value);
				last = whole.end();
			}

			expanded.push_str(&payload[last..]);
			Ok(expanded)
		}
	}
}
