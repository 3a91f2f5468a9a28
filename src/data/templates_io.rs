// Native-only code i.e. gated in mod.rs by #[cfg(not(target_arch = "wasm32"))] so no need to gate internally here

use {
    crate::{config::DF, models::TemplateLibrary},
    anyhow::{Context, Result},
    std::{
        fs::File,
        io::{BufReader, BufWriter},
        path::Path,
    },
};

pub fn save_templates(path: &Path, library: &TemplateLibrary) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create template file {}", path.display()))?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, library)
        .with_context(|| format!("Failed to write templates to {}", path.display()))?;
    if DF.log_templates {
        log::info!(
            "Saved {} templates to {}",
            library.templates.len(),
            path.display()
        );
    }
    Ok(())
}

/// Missing file means no templates yet.
pub fn load_templates(path: &Path) -> Result<TemplateLibrary> {
    if !path.exists() {
        return Ok(TemplateLibrary::default());
    }
    let file = File::open(path)
        .with_context(|| format!("Failed to open template file {}", path.display()))?;
    let reader = BufReader::new(file);
    let library: TemplateLibrary = serde_json::from_reader(reader)
        .with_context(|| format!("Template file {} is not valid", path.display()))?;
    if DF.log_templates {
        log::info!(
            "Loaded {} templates from {}",
            library.templates.len(),
            path.display()
        );
    }
    Ok(library)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FormulaState, FormulaTemplate};
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("bias_scope_{}_{}", std::process::id(), name))
    }

    #[test]
    fn missing_file_loads_empty_library() {
        let lib = load_templates(&temp_path("absent_templates.json")).unwrap();
        assert!(lib.is_empty());
    }

    #[test]
    fn saved_library_loads_back() {
        let path = temp_path("templates.json");
        let mut lib = TemplateLibrary::default();
        lib.upsert(FormulaTemplate::capture("Trend", &FormulaState::new(), true, 7));
        save_templates(&path, &lib).unwrap();

        let loaded = load_templates(&path).unwrap();
        assert_eq!(loaded, lib);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let path = temp_path("corrupt_templates.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = load_templates(&path).unwrap_err();
        assert!(format!("{err:#}").contains("is not valid"));
        let _ = std::fs::remove_file(&path);
    }
}
