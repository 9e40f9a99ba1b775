//! Probe documents and the transcript scraping that goes with them.
//!
//! Both probes load the target the same way: a class is loaded with
//! `\documentclass`, anything else as a package on top of `article`.

use crate::model::{File, FileRole};

pub mod classify;
pub mod dependency;

pub use classify::{Classification, ClassifyError, SymbolClassifier};
pub use dependency::{DependencyProbe, FILE_LIST_MARKER, ProbeError};

/// Class used to host packages during probing.
pub const BASELINE_CLASS: &str = "article";

/// File name of [`BASELINE_CLASS`], as it shows up in transcripts.
pub fn baseline_class_file() -> String {
    format!("{BASELINE_CLASS}.cls")
}

pub fn document_header(file: &File) -> String {
    match file.role {
        FileRole::Class => format!("\\documentclass{{{}}}\n", file.stem()),
        _ => format!(
            "\\documentclass{{{BASELINE_CLASS}}}\n\\usepackage{{{}}}\n",
            file.stem()
        ),
    }
}
