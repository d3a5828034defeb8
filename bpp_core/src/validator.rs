use crate::BppError;
use crate::BppResult;
use crate::MalformedKind;

/// Text under transformation, bounded by a leading and a trailing line break
/// so that directives on the first and last line of the content still occupy
/// a line of their own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceBuffer {
	text: String,
}

impl SourceBuffer {
	/// Wrap raw file content in the sentinel line breaks.
	pub fn new(content: &str) -> Self {
		Self {
			text: format!("\n{content}\n"),
		}
	}

	/// Adopt text that already carries its sentinels, as returned by
	/// [`crate::Includer::include`].
	pub(crate) fn from_bounded(text: String) -> Self {
		debug_assert!(text.starts_with('\n') && text.ends_with('\n'));
		Self { text }
	}

	/// The bounded text, sentinels included.
	pub fn as_str(&self) -> &str {
		&self.text
	}

	/// The content with both sentinels stripped.
	pub fn content(&self) -> &str {
		let text = self.text.strip_prefix('\n').unwrap_or(&self.text);
		text.strip_suffix('\n').unwrap_or(text)
	}

	pub fn into_content(self) -> String {
		self.content().to_string()
	}
}

/// Check `buffer` for malformed directives.
///
/// Malformed shapes are tried in [`MalformedKind::ALL`] order and the first
/// genuine match wins. A match is genuine when it still matches once it is
/// trimmed and checked on its own.
pub fn validate(buffer: &str) -> BppResult<()> {
	match find_malformed(buffer) {
		Some((kind, directive)) => {
			Err(BppError::MalformedDirective {
				kind,
				line: line_of(buffer, directive),
				directive: directive.trim().to_string(),
			})
		}
		None => Ok(()),
	}
}

/// Find the first malformed directive in `buffer`, returning its shape and
/// the matched text.
pub fn find_malformed(buffer: &str) -> Option<(MalformedKind, &str)> {
	for kind in MalformedKind::ALL {
		let genuine = kind
			.pattern()
			.find_iter(buffer)
			.map(|m| m.as_str())
			.find(|text| kind.matches_in_isolation(text));

		if let Some(text) = genuine {
			tracing::trace!(?kind, directive = text.trim(), "malformed directive");
			return Some((kind, text));
		}
	}

	None
}

/// Best-effort line number of `text` within `buffer`.
///
/// Lines are counted in the sentinel-bounded buffer, so the first line of the
/// file content is line 1. Returns `None` when `text` is not found as a
/// complete line.
pub fn line_of(buffer: &str, text: &str) -> Option<usize> {
	buffer.lines().position(|line| line == text)
}
