//! Language identification and starter content.
//!
//! ### mod.rs
//! The closed language set, extension inference, and the mappings the
//! execution service needs (provider identifiers, canonical file names).
//!
//! ### templates.rs
//! Default boilerplate per language plus the starter-template lookup chain
//! for problem-backed files (remote, then title-derived, then boilerplate).

pub mod templates;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// The languages the workspace understands. Everything else is rejected on
/// the validated file-creation path.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Language {
    C,
    Cpp,
    Java,
    Javascript,
    Python,
}

impl Language {
    /// Maps a file extension to a language. `None` for anything outside
    /// the supported set; `WorkspaceStore::create_file` turns that into a
    /// validation error.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "c" | "h" => Some(Self::C),
            "cpp" | "cc" | "cxx" | "hpp" => Some(Self::Cpp),
            "java" => Some(Self::Java),
            "js" => Some(Self::Javascript),
            "py" => Some(Self::Python),
            _ => None,
        }
    }

    pub fn from_file_name(name: &str) -> Option<Self> {
        Self::from_extension(extension_of(name))
    }

    /// Inference with the fallback policy. Sites outside the validated
    /// creation path (renames, workspace seeding) map unknown extensions to
    /// [`Language::fallback`] instead of failing, so a file can always
    /// carry a language.
    pub fn infer(name: &str) -> Self {
        Self::from_file_name(name).unwrap_or_else(Self::fallback)
    }

    pub fn fallback() -> Self {
        Self::Cpp
    }

    /// File name the execution service expects the source to arrive under.
    pub fn canonical_file_name(&self) -> &'static str {
        match self {
            Self::C => "main.c",
            Self::Cpp => "main.cpp",
            Self::Java => "Main.java",
            Self::Javascript => "main.js",
            Self::Python => "main.py",
        }
    }

    /// Identifier in the execution provider's own naming scheme.
    pub fn provider_id(&self) -> &'static str {
        match self {
            Self::C => "c",
            Self::Cpp => "c++",
            Self::Java => "java",
            Self::Javascript => "javascript",
            Self::Python => "python",
        }
    }
}

/// Extension of a file name: the part after the last dot, or empty when
/// there is none (or the name ends in a dot).
pub fn extension_of(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext,
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_extensions_map() {
        assert_eq!(Language::from_file_name("main.py"), Some(Language::Python));
        assert_eq!(Language::from_file_name("main.c"), Some(Language::C));
        assert_eq!(Language::from_file_name("util.hpp"), Some(Language::Cpp));
        assert_eq!(Language::from_file_name("Main.java"), Some(Language::Java));
        assert_eq!(
            Language::from_file_name("app.js"),
            Some(Language::Javascript)
        );
    }

    #[test]
    fn unknown_extension_is_rejected_on_the_validated_path() {
        assert_eq!(Language::from_file_name("x.unknown"), None);
        assert_eq!(Language::from_file_name("noext"), None);
        assert_eq!(Language::from_file_name(".gitignore"), None);
    }

    #[test]
    fn inference_falls_back_to_cpp() {
        assert_eq!(Language::infer("notes.txt"), Language::Cpp);
        assert_eq!(Language::infer("README.md"), Language::Cpp);
        assert_eq!(Language::infer("script.py"), Language::Python);
    }

    #[test]
    fn serde_uses_lowercase_tags() {
        let json = serde_json::to_string(&Language::Cpp).unwrap();
        assert_eq!(json, "\"cpp\"");
        let back: Language = serde_json::from_str("\"javascript\"").unwrap();
        assert_eq!(back, Language::Javascript);
    }

    #[test]
    fn provider_identifiers() {
        assert_eq!(Language::Cpp.provider_id(), "c++");
        assert_eq!(Language::Python.provider_id(), "python");
        assert_eq!(Language::Java.canonical_file_name(), "Main.java");
    }
}
