use std::path::Path;

/// Decides whether a path may be handed to scoring plugins as structure data.
pub trait StructureValidator: Send + Sync {
    fn is_valid_structure(&self, path: &Path) -> bool;
}

/// Accepts existing regular files carrying the `.pdb` extension.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdbExtensionValidator;

impl StructureValidator for PdbExtensionValidator {
    fn is_valid_structure(&self, path: &Path) -> bool {
        path.is_file()
            && path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("pdb"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn accepts_existing_pdb_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.pdb");
        fs::write(&path, "END\n").unwrap();
        assert!(PdbExtensionValidator.is_valid_structure(&path));
    }

    #[test]
    fn rejects_missing_file() {
        let dir = tempdir().unwrap();
        assert!(!PdbExtensionValidator.is_valid_structure(&dir.path().join("missing.pdb")));
    }

    #[test]
    fn rejects_other_extensions_and_directories() {
        let dir = tempdir().unwrap();
        let cif = dir.path().join("model.cif");
        fs::write(&cif, "data_\n").unwrap();
        let folder = dir.path().join("nested.pdb");
        fs::create_dir(&folder).unwrap();

        assert!(!PdbExtensionValidator.is_valid_structure(&cif));
        assert!(!PdbExtensionValidator.is_valid_structure(&folder));
    }
}
