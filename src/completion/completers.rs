use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::{Candidate, Completer, CompletionError};
use crate::descriptor::Parameter;

/// Suggests nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmptyCompleter;

impl Completer for EmptyCompleter {
    fn complete(&self, _: Parameter<'_>, _: &str) -> Result<Vec<Candidate>, CompletionError> {
        Ok(Vec::new())
    }
}

/// Suggests the values known from the declared type: boolean literals,
/// enumeration variants, and the candidates of custom types.
#[derive(Clone, Copy, Debug, Default)]
pub struct ValueTypeCompleter;

impl Completer for ValueTypeCompleter {
    fn complete(
        &self,
        parameter: Parameter<'_>,
        prefix: &str,
    ) -> Result<Vec<Candidate>, CompletionError> {
        Ok(parameter
            .value_type()
            .candidates(prefix)
            .iter()
            .map(|value| Candidate::new(value, true))
            .collect())
    }
}

/// Suggests files and directories. Directories end with `/` and are not
/// terminal so that their contents can be completed next.
#[derive(Clone, Debug, Default)]
pub struct PathCompleter {
    /// Relative paths are resolved from here instead of the current
    /// directory.
    base: Option<PathBuf>,
}

impl PathCompleter {
    pub fn new() -> PathCompleter {
        PathCompleter::default()
    }

    pub fn with_base<P: Into<PathBuf>>(base: P) -> PathCompleter {
        PathCompleter {
            base: Some(base.into()),
        }
    }

    fn resolve(&self, dir: &str) -> PathBuf {
        let dir = if dir.is_empty() { "." } else { dir };
        match &self.base {
            Some(base) if !Path::new(dir).is_absolute() => base.join(dir),
            _ => PathBuf::from(dir),
        }
    }
}

impl Completer for PathCompleter {
    fn complete(
        &self,
        _: Parameter<'_>,
        prefix: &str,
    ) -> Result<Vec<Candidate>, CompletionError> {
        // `/Users/chandler/Docum' -> (`/Users/chandler/', `Docum')
        let (dir, name) = match prefix.rfind('/') {
            Some(index) => prefix.split_at(index + 1),
            None => ("", prefix),
        };

        let path = self.resolve(dir);
        trace!("path completion: dir='{}', name='{}'", path.display(), name);
        let entries = match fs::read_dir(&path) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(CompletionError::Io {
                    path: path.display().to_string(),
                    source: err,
                })
            }
        };

        let mut candidates = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|err| CompletionError::Io {
                path: path.display().to_string(),
                source: err,
            })?;

            let file_name = entry.file_name();
            let file_name = match file_name.to_str() {
                Some(file_name) => file_name,
                None => continue,
            };

            let hidden = file_name.starts_with('.') && !name.starts_with('.');
            if hidden || !file_name.starts_with(name) {
                continue;
            }

            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            if is_dir {
                candidates.push(Candidate::new(&format!("{}{}/", dir, file_name), false));
            } else {
                candidates.push(Candidate::new(&format!("{}{}", dir, file_name), true));
            }
        }

        candidates.sort_by(|a, b| a.value.cmp(&b.value));
        Ok(candidates)
    }
}
