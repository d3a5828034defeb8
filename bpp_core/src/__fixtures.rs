use std::cell::RefCell;
use std::collections::HashMap;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::rc::Rc;

use tempfile::TempDir;

use crate::FileAccess;
use crate::Includer;
use crate::fs::normalize;

/// A temporary directory holding the files of one test.
pub struct Scripts {
	dir: TempDir,
}

impl Scripts {
	pub fn new() -> Self {
		Self {
			dir: tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}")),
		}
	}

	pub fn path(&self) -> &Path {
		self.dir.path()
	}

	/// Write `content` to `name` (relative to the temp dir), creating parent
	/// directories as needed, and return the full path.
	pub fn write(&self, name: &str, content: &str) -> PathBuf {
		let path = self.dir.path().join(name);
		if let Some(parent) = path.parent() {
			std::fs::create_dir_all(parent).unwrap_or_else(|e| panic!("create dir: {e}"));
		}
		std::fs::write(&path, content).unwrap_or_else(|e| panic!("write: {e}"));
		path
	}

	/// An includer for the script called `name`, with an empty environment.
	pub fn includer(&self, name: &str) -> Includer {
		Includer::new(self.dir.path().join(name)).with_env_lookup(|_| None)
	}
}

/// Wrap `content` in the sentinel line breaks.
pub fn bounded(content: &str) -> String {
	format!("\n{content}\n")
}

/// The batch banner block the includer produces for `name`.
pub fn batch_banner(name: &str, content: &str) -> String {
	let rule = "-".repeat(30);
	format!(":: File - \"{name}\"\n::{rule}(\n\n{content}\n\n::{rule})\n")
}

/// Files served from memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryFiles {
	files: Rc<RefCell<HashMap<PathBuf, String>>>,
}

impl MemoryFiles {
	pub fn with(self, path: &str, content: &str) -> Self {
		self.files
			.borrow_mut()
			.insert(normalize(Path::new(path)), content.to_string());
		self
	}

	pub fn get(&self, path: &str) -> Option<String> {
		self.files.borrow().get(&normalize(Path::new(path))).cloned()
	}
}

impl FileAccess for MemoryFiles {
	fn read(&self, path: &Path) -> io::Result<String> {
		self.files
			.borrow()
			.get(&normalize(path))
			.cloned()
			.ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "not in memory"))
	}

	fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
		self.files
			.borrow_mut()
			.insert(normalize(path), contents.to_string());
		Ok(())
	}

	fn is_file(&self, path: &Path) -> bool {
		self.files.borrow().contains_key(&normalize(path))
	}
}
