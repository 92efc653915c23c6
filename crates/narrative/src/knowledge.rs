//! Per-project markdown knowledge fed into prompts.
//!
//! A knowledge root holds one directory per project; each project is a set of
//! `*.md` files.

use std::path::{Path, PathBuf};

use crate::KnowledgeError;

#[derive(Clone, Debug)]
pub struct KnowledgeBase {
    root: PathBuf,
}

impl KnowledgeBase {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Project directory names, sorted. A missing root lists nothing.
    pub fn list_projects(&self) -> Result<Vec<String>, KnowledgeError> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }

        let mut projects = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_type()?.is_dir()
                && let Some(name) = entry.file_name().to_str()
                && !name.starts_with('.')
            {
                projects.push(name.to_string());
            }
        }
        projects.sort();
        Ok(projects)
    }

    /// Concatenates the project's markdown files in name order, each under a
    /// `## Title` heading derived from the file stem.
    pub fn load_project(&self, name: &str) -> Result<String, KnowledgeError> {
        let dir = self.project_dir(name)?;
        if !dir.is_dir() {
            return Err(KnowledgeError::NotFound(name.to_string()));
        }

        let mut files: Vec<PathBuf> = std::fs::read_dir(&dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "md"))
            .collect();
        files.sort();

        let mut out = String::new();
        for path in files {
            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default();
            let body = std::fs::read_to_string(&path)?;
            out.push_str(&format!("## {}\n{}\n\n", heading(stem), body.trim_end()));
        }
        Ok(out)
    }

    fn project_dir(&self, name: &str) -> Result<PathBuf, KnowledgeError> {
        let trimmed = name.trim();
        let valid = !trimmed.is_empty()
            && trimmed != "."
            && trimmed != ".."
            && !trimmed.contains(['/', '\\']);
        if !valid {
            return Err(KnowledgeError::InvalidName(name.to_string()));
        }
        Ok(self.root.join(trimmed))
    }
}

/// `daily_briefing` -> `Daily Briefing`
fn heading(stem: &str) -> String {
    stem.split(['_', '-'])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
