use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

/// Role of a TeX source file, derived from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileRole {
    Class,
    Style,
    Other,
}

impl FileRole {
    pub fn from_name(name: &str) -> Self {
        match Path::new(name).extension().and_then(|e| e.to_str()) {
            Some("cls") => FileRole::Class,
            Some("sty") => FileRole::Style,
            _ => FileRole::Other,
        }
    }

    /// Classes and styles are the only files that form components.
    pub fn is_component(self) -> bool {
        matches!(self, FileRole::Class | FileRole::Style)
    }
}

/// Engine binary used to compile a probe document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Latex,
    Lualatex,
    Xelatex,
}

impl Format {
    /// Files living under a LuaTeX or XeTeX tree only load on that engine.
    ///
    /// The tree is the segment after the last `tex` directory, so the
    /// location of the distribution itself plays no part.
    pub fn from_path(path: &Path) -> Self {
        let segments: Vec<_> = path.iter().filter_map(|s| s.to_str()).collect();
        let tree = segments
            .windows(2)
            .rev()
            .find(|pair| pair[0] == "tex")
            .map(|pair| pair[1]);
        match tree {
            Some("luatex" | "lualatex") => Format::Lualatex,
            Some("xetex" | "xelatex") => Format::Xelatex,
            _ => Format::Latex,
        }
    }

    pub fn program(self) -> &'static str {
        match self {
            Format::Latex => "latex",
            Format::Lualatex => "lualatex",
            Format::Xelatex => "xelatex",
        }
    }
}

/// A file known to the name index (or referenced by a transcript).
///
/// Identity is the file name: two `File`s with the same name are the same
/// file regardless of the path they were resolved through.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct File {
    pub name: String,
    pub path: Option<PathBuf>,
    pub role: FileRole,
}

impl File {
    pub fn new(path: PathBuf) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let role = FileRole::from_name(&name);
        Self {
            name,
            path: Some(path),
            role,
        }
    }

    /// A name that appeared in a transcript but is unknown to the index.
    pub fn unindexed(name: impl Into<String>) -> Self {
        let name = name.into();
        let role = FileRole::from_name(&name);
        Self {
            name,
            path: None,
            role,
        }
    }

    /// File name without its extension, as used by `\usepackage` and `\documentclass`.
    pub fn stem(&self) -> &str {
        match self.name.rfind('.') {
            Some(idx) if idx > 0 => &self.name[..idx],
            _ => &self.name,
        }
    }

    pub fn format(&self) -> Format {
        self.path
            .as_deref()
            .map(Format::from_path)
            .unwrap_or_default()
    }

    pub fn read_source(&self) -> std::io::Result<String> {
        let Some(path) = &self.path else {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} has no known path", self.name),
            ));
        };
        let bytes = std::fs::read(path)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl PartialEq for File {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for File {}

impl Hash for File {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{}", path.display()),
            None => f.write_str(&self.name),
        }
    }
}
