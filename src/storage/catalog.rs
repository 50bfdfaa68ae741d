use super::{ClassFileStore, DocumentClass};
use crate::core::{DbError, Result};
use std::collections::BTreeMap;
use std::path::Path;

/// Live set of classes, keyed case-insensitively, backed by class files.
pub struct Catalog {
    classes: BTreeMap<String, DocumentClass>,
    files: ClassFileStore,
}

impl Catalog {
    /// Load every class stored in `dir`.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let files = ClassFileStore::new(dir);
        let classes = files
            .load_all()?
            .into_iter()
            .map(|class| (class.name().to_lowercase(), class))
            .collect();

        Ok(Self { classes, files })
    }

    pub fn class_names(&self) -> Vec<String> {
        self.classes.values().map(|c| c.name().to_string()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(&name.to_lowercase())
    }

    pub fn get(&self, name: &str) -> Result<&DocumentClass> {
        self.classes
            .get(&name.to_lowercase())
            .ok_or_else(|| DbError::ClassNotFound(name.to_string()))
    }

    pub fn get_mut(&mut self, name: &str) -> Result<&mut DocumentClass> {
        self.classes
            .get_mut(&name.to_lowercase())
            .ok_or_else(|| DbError::ClassNotFound(name.to_string()))
    }

    /// Returns false when the class already existed and `if_not_exists` was set.
    pub fn create_class(
        &mut self,
        name: &str,
        declared_fields: Vec<String>,
        if_not_exists: bool,
    ) -> Result<bool> {
        validate_class_name(name)?;
        if self.contains(name) {
            return if if_not_exists {
                Ok(false)
            } else {
                Err(DbError::ClassExists(name.to_string()))
            };
        }

        let cluster_id = self
            .classes
            .values()
            .map(|c| c.cluster_id())
            .max()
            .map_or(1, |max| max + 1);

        let class = DocumentClass::new(name, cluster_id, declared_fields);
        self.files.save(&class)?;
        self.classes.insert(name.to_lowercase(), class);
        Ok(true)
    }

    /// Returns false when the class was absent and `if_exists` was set.
    pub fn drop_class(&mut self, name: &str, if_exists: bool) -> Result<bool> {
        match self.classes.remove(&name.to_lowercase()) {
            Some(class) => {
                self.files.delete(class.name())?;
                Ok(true)
            }
            None if if_exists => Ok(false),
            None => Err(DbError::ClassNotFound(name.to_string())),
        }
    }

    /// Write one class back to its file.
    pub fn persist(&self, name: &str) -> Result<()> {
        let class = self.get(name)?;
        self.files.save(class)
    }
}

/// Class names become file names inside the store directory, so they must
/// stay a single plain path component.
fn validate_class_name(name: &str) -> Result<()> {
    let invalid = name.is_empty()
        || name == "."
        || name.contains("..")
        || name.chars().any(|c| c == '/' || c == '\\' || c == '\0' || c.is_control());
    if invalid {
        return Err(DbError::ExecutionError(format!("Invalid class name '{}'", name)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_assigns_increasing_clusters() {
        let temp_dir = TempDir::new().unwrap();
        let mut catalog = Catalog::open(temp_dir.path()).unwrap();

        assert!(catalog.create_class("A", Vec::new(), false).unwrap());
        assert!(catalog.create_class("B", Vec::new(), false).unwrap());
        assert_eq!(catalog.get("a").unwrap().cluster_id(), 1);
        assert_eq!(catalog.get("B").unwrap().cluster_id(), 2);
    }

    #[test]
    fn test_duplicate_and_missing_classes() {
        let temp_dir = TempDir::new().unwrap();
        let mut catalog = Catalog::open(temp_dir.path()).unwrap();

        catalog.create_class("Person", Vec::new(), false).unwrap();
        assert!(matches!(
            catalog.create_class("person", Vec::new(), false),
            Err(DbError::ClassExists(_))
        ));
        assert!(!catalog.create_class("PERSON", Vec::new(), true).unwrap());

        assert!(catalog.drop_class("Person", false).unwrap());
        assert!(!catalog.drop_class("Person", true).unwrap());
        assert!(matches!(
            catalog.drop_class("Person", false),
            Err(DbError::ClassNotFound(_))
        ));
    }

    #[test]
    fn test_reopen_sees_created_classes() {
        let temp_dir = TempDir::new().unwrap();
        {
            let mut catalog = Catalog::open(temp_dir.path()).unwrap();
            catalog.create_class("Person", Vec::new(), false).unwrap();
        }
        let catalog = Catalog::open(temp_dir.path()).unwrap();
        assert_eq!(catalog.class_names(), vec!["Person".to_string()]);
    }

    #[test]
    fn test_class_names_cannot_leave_the_store() {
        let temp_dir = TempDir::new().unwrap();
        let store = temp_dir.path().join("store");
        std::fs::create_dir(&store).unwrap();
        let mut catalog = Catalog::open(&store).unwrap();

        for name in ["../escaped", "a/b", "a\\b", "..", ""] {
            assert!(
                matches!(
                    catalog.create_class(name, Vec::new(), false),
                    Err(DbError::ExecutionError(_))
                ),
                "accepted {:?}",
                name
            );
        }
        assert!(!temp_dir.path().join("escaped.class.json").exists());
        assert!(catalog.class_names().is_empty());
    }
}
