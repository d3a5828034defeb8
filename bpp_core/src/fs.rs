use std::io;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

/// File system access used by the includer and the preprocessor.
///
/// The default implementation is [`OsFileAccess`]. Tests and embedders can
/// provide their own to serve files from memory.
pub trait FileAccess {
	/// Read the full text of `path`.
	fn read(&self, path: &Path) -> io::Result<String>;

	/// Persist `contents` to `path`, replacing any existing file.
	fn write(&self, path: &Path, contents: &str) -> io::Result<()>;

	/// Whether `path` names an existing regular file.
	fn is_file(&self, path: &Path) -> bool;

	/// A stable absolute path used to decide whether two paths name the same
	/// file.
	fn identity(&self, path: &Path) -> PathBuf {
		normalize(path)
	}
}

/// [`FileAccess`] backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileAccess;

impl FileAccess for OsFileAccess {
	fn read(&self, path: &Path) -> io::Result<String> {
		std::fs::read_to_string(path).map(|content| normalize_line_endings(&content))
	}

	fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
		std::fs::write(path, contents)
	}

	fn is_file(&self, path: &Path) -> bool {
		path.is_file()
	}

	fn identity(&self, path: &Path) -> PathBuf {
		std::fs::canonicalize(path).unwrap_or_else(|_| normalize(path))
	}
}

/// Convert `\r\n` line endings to `\n`.
pub fn normalize_line_endings(content: &str) -> String {
	if content.contains('\r') {
		content.replace("\r\n", "\n")
	} else {
		content.to_string()
	}
}

/// Make `path` absolute against the current directory and resolve `.` and
/// `..` components lexically.
pub fn normalize(path: &Path) -> PathBuf {
	let absolute = if path.is_absolute() {
		path.to_path_buf()
	} else {
		std::env::current_dir()
			.unwrap_or_else(|_| PathBuf::from("."))
			.join(path)
	};

	let mut normalized = PathBuf::new();
	for component in absolute.components() {
		match component {
			Component::CurDir => {}
			Component::ParentDir => {
				normalized.pop();
			}
			other => normalized.push(other.as_os_str()),
		}
	}
	normalized
}
