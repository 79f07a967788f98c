use std::path::{Path, PathBuf};

use crate::{
    document::tree::Document,
    foundation::error::{EditError, EditResult},
};

/// File name of a saved project inside its project directory.
pub const PROJECT_FILE_NAME: &str = "project.mlt";

#[derive(Clone, Debug, PartialEq, Eq)]
/// Options for [`ProjectStore`].
pub struct ProjectStoreOpts {
    /// Directory holding one sub-directory per project.
    pub root: PathBuf,
    /// Text written in front of every saved document body.
    pub preamble: String,
}

impl Default for ProjectStoreOpts {
    fn default() -> Self {
        Self {
            root: PathBuf::from("projects"),
            preamble: "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n".to_string(),
        }
    }
}

/// Saves and loads project documents under `<root>/<project_id>/project.mlt`.
///
/// Saving does not lock the in-memory document and is never retried here; a failed write is
/// reported as [`EditError::Persistence`] and may leave a partially written file behind.
#[derive(Clone, Debug, Default)]
pub struct ProjectStore {
    opts: ProjectStoreOpts,
}

impl ProjectStore {
    /// Create a store with the given options.
    pub fn new(opts: ProjectStoreOpts) -> Self {
        Self { opts }
    }

    /// Options in use.
    pub fn opts(&self) -> &ProjectStoreOpts {
        &self.opts
    }

    /// Path of the project file for `project_id`.
    pub fn project_path(&self, project_id: &str) -> EditResult<PathBuf> {
        validate_project_id(project_id)?;
        Ok(self.opts.root.join(project_id).join(PROJECT_FILE_NAME))
    }

    /// Write `body` prefixed with the preamble. Returns the written path.
    #[tracing::instrument(skip(self, body), fields(bytes = body.len()))]
    pub fn save(&self, project_id: &str, body: &str) -> EditResult<PathBuf> {
        let path = self.project_path(project_id)?;
        self.write_body(&path, body)?;
        tracing::info!(path = %path.display(), "saved project");
        Ok(path)
    }

    /// Serialize the whole document and [`ProjectStore::save`] it.
    pub fn save_document(&self, project_id: &str, doc: &Document) -> EditResult<PathBuf> {
        let body = doc.to_xml_string()?;
        self.save(project_id, &body)
    }

    /// Serialize `doc` to an explicit `path` outside the project layout, with the same
    /// preamble as saved projects.
    #[tracing::instrument(skip(self, doc))]
    pub fn write_document(&self, path: &Path, doc: &Document) -> EditResult<()> {
        let body = doc.to_xml_string()?;
        self.write_body(path, &body)?;
        tracing::info!(path = %path.display(), "wrote document");
        Ok(())
    }

    fn write_body(&self, path: &Path, body: &str) -> EditResult<()> {
        ensure_parent_dir(path)?;
        let mut contents = String::with_capacity(self.opts.preamble.len() + body.len() + 1);
        contents.push_str(&self.opts.preamble);
        contents.push_str(body);
        if !body.ends_with('\n') {
            contents.push('\n');
        }
        std::fs::write(path, contents).map_err(|e| EditError::persistence(path, e))
    }

    /// Load a previously saved project.
    #[tracing::instrument(skip(self))]
    pub fn load(&self, project_id: &str) -> EditResult<Document> {
        let path = self.project_path(project_id)?;
        Document::from_path(&path)
    }
}

/// Create the parent directory of `path` if needed.
pub fn ensure_parent_dir(path: &Path) -> EditResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| EditError::persistence(parent, e))?;
    }
    Ok(())
}

fn validate_project_id(project_id: &str) -> EditResult<()> {
    if project_id.trim().is_empty() {
        return Err(EditError::validation("project id must be non-empty"));
    }
    if project_id.contains(['/', '\\']) || project_id == "." || project_id == ".." {
        return Err(EditError::validation(format!(
            "project id '{project_id}' must be a single path component"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/persist/store.rs"]
mod tests;
