//! Project discovery and structure

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::rows::{
    COL_FUNCTION, COL_LOCATION, COL_LOCATION_NOTES, COL_LOT, COL_VALVE, COL_ZONE,
};
use crate::core::source::{VALVE_SHEET, ZONE_SHEET};

/// Represents a valve lookup project
#[derive(Debug)]
pub struct Project {
    /// Root directory of the project (parent of .valves/)
    root: PathBuf,
}

impl Project {
    /// Marker directory identifying a project root
    pub const MARKER_DIR: &'static str = ".valves";

    /// Default directory for the sheet exports
    pub const DATA_DIR: &'static str = "data";

    /// Find project root by walking up from the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let current =
            std::env::current_dir().map_err(|e| ProjectError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find project root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        loop {
            if current.join(Self::MARKER_DIR).is_dir() {
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(ProjectError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Create a new project structure at the given path
    pub fn init(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        if root.join(Self::MARKER_DIR).exists() {
            return Err(ProjectError::AlreadyExists(root));
        }

        Self::init_force(&root)
    }

    /// Force initialization even if .valves/ exists
    ///
    /// Existing sheet files are left untouched.
    pub fn init_force(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        let project = Self { root };

        std::fs::create_dir_all(project.marker_dir())
            .map_err(|e| ProjectError::IoError(e.to_string()))?;
        std::fs::write(project.config_path(), Self::default_config())
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        project.create_sheet_templates()?;

        Ok(project)
    }

    fn default_config() -> &'static str {
        r#"# Valve lookup project configuration

# Directory holding "Valve Sheet.csv" and "Zone Sheet.csv" (default: data)
# data_dir: data

# Seconds before sheet data is re-read (default: 600)
# cache_ttl_secs: 600

# Default output format (auto, json, yaml, csv, md, id)
# default_format: auto
"#
    }

    fn create_sheet_templates(&self) -> Result<(), ProjectError> {
        let data_dir = self.root.join(Self::DATA_DIR);
        std::fs::create_dir_all(&data_dir).map_err(|e| ProjectError::IoError(e.to_string()))?;

        let templates = [
            (
                VALVE_SHEET,
                [COL_VALVE, COL_LOCATION, COL_LOCATION_NOTES, COL_FUNCTION].join(","),
            ),
            (ZONE_SHEET, [COL_VALVE, COL_ZONE, COL_LOT].join(",")),
        ];

        for (sheet, header) in templates {
            let path = data_dir.join(format!("{}.csv", sheet));
            if !path.exists() {
                std::fs::write(&path, format!("{}\n", header))
                    .map_err(|e| ProjectError::IoError(e.to_string()))?;
            }
        }

        Ok(())
    }

    /// Get the project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .valves configuration directory
    pub fn marker_dir(&self) -> PathBuf {
        self.root.join(Self::MARKER_DIR)
    }

    pub fn config_path(&self) -> PathBuf {
        self.marker_dir().join("config.yaml")
    }
}

/// Errors that can occur during project operations
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("not a valve lookup project (searched from {searched_from:?}). Run 'valves init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("valve lookup project already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_project_init_creates_structure() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();

        assert!(project.marker_dir().is_dir());
        assert!(project.config_path().exists());
        let valve_sheet =
            std::fs::read_to_string(project.root().join("data/Valve Sheet.csv")).unwrap();
        assert_eq!(valve_sheet, "Valve,Location,Location Notes,Function\n");
        let zone_sheet =
            std::fs::read_to_string(project.root().join("data/Zone Sheet.csv")).unwrap();
        assert_eq!(zone_sheet, "Valve,Zone,Lot #\n");
    }

    #[test]
    fn test_project_init_fails_if_exists() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path()).unwrap();

        let err = Project::init(tmp.path()).unwrap_err();
        assert!(matches!(err, ProjectError::AlreadyExists(_)));
    }

    #[test]
    fn test_project_init_force_keeps_existing_sheets() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();
        let sheet = project.root().join("data/Valve Sheet.csv");
        std::fs::write(&sheet, "Valve\nV1\n").unwrap();

        Project::init_force(tmp.path()).unwrap();
        assert_eq!(std::fs::read_to_string(&sheet).unwrap(), "Valve\nV1\n");
    }

    #[test]
    fn test_project_discover_finds_marker_dir() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path()).unwrap();

        let subdir = tmp.path().join("some/nested/dir");
        std::fs::create_dir_all(&subdir).unwrap();

        let project = Project::discover_from(&subdir).unwrap();
        assert_eq!(
            project.root().canonicalize().unwrap(),
            tmp.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn test_project_discover_fails_without_marker_dir() {
        let tmp = tempdir().unwrap();
        let err = Project::discover_from(tmp.path()).unwrap_err();
        assert!(matches!(err, ProjectError::NotFound { .. }));
    }
}
