//! File persistence configuration

/// Configuration for template persistence ("save as template")
pub struct TemplatePersistenceConfig {
    /// Default path of the JSON template library
    pub path: &'static str,
    /// Format version written into the file
    pub version: u32,
}

/// The Master Persistence Configuration
pub struct PersistenceConfig {
    pub templates: TemplatePersistenceConfig,
}

pub const PERSISTENCE: PersistenceConfig = PersistenceConfig {
    templates: TemplatePersistenceConfig {
        path: "bias_templates.json",
        version: 1,
    },
};
