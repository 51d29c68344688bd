use crate::archive::ArchiveLimits;
use crate::resolve::Strategy;
use miette::{IntoDiagnostic, Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Configuration for a jarlens run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Archive files or directories to analyze
    pub sources: Vec<PathBuf>,

    /// Patterns for archive files to skip when scanning directories
    pub exclude: Vec<String>,

    /// Resource ceilings applied to every archive
    pub limits: ArchiveLimits,

    /// Loader configuration
    pub loader: LoaderConfig,

    /// Bootstrap/runtime provider configuration
    pub runtime: RuntimeConfig,

    /// Known artifact coordinates
    pub artifacts: ArtifactsConfig,

    /// Analyzer selection
    pub analysis: AnalysisConfig,

    /// Report configuration
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Highest Java release considered in multi-release JAR files
    pub max_release: u32,

    /// Extract class, field and method references from class files
    pub scan_references: bool,

    /// Worker threads for loading sources (0 = one per CPU)
    pub threads: usize,

    /// Class lookup order between the classpath and the runtime
    pub strategy: Strategy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Package prefixes assumed to be provided by the runtime
    pub packages: Vec<String>,

    /// Individual class names provided by the runtime
    pub classes: Vec<String>,

    /// JMOD or JAR files loaded as the runtime class library
    pub archives: Vec<PathBuf>,

    /// Use `$JAVA_HOME/jmods` when no archives are given
    pub discover: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactsConfig {
    /// Coordinates (`group:artifact:version`) by archive SHA-1 checksum
    pub coordinates: BTreeMap<String, String>,

    /// Local Maven repository used to download artifacts by coordinates
    pub repository: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Report artifacts on the classpath
    pub artifacts: bool,

    /// Report classes found in more than one artifact
    pub duplicate_classes: bool,

    /// Report resources found in more than one artifact
    pub duplicate_resources: bool,

    /// Report packages split across artifacts
    pub split_packages: bool,

    /// Report dependencies between artifacts
    pub jar_dependencies: bool,

    /// Report referenced classes that cannot be found
    pub unresolved_classes: bool,

    /// Report class file versions per artifact
    pub class_versions: bool,

    /// Report references to classes that are not accessible
    pub illegal_access: bool,

    /// Report field and method references that are missing or not accessible
    pub member_references: bool,

    /// Report classpath classes that shadow runtime classes
    pub shadowed_classes: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Output format: terminal, json
    pub format: String,

    /// Show empty report sections
    pub show_empty: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sources: vec![],
            exclude: vec![
                "*-sources.jar".to_string(),
                "*-javadoc.jar".to_string(),
                "**/.git/**".to_string(),
            ],
            limits: ArchiveLimits::default(),
            loader: LoaderConfig::default(),
            runtime: RuntimeConfig::default(),
            artifacts: ArtifactsConfig::default(),
            analysis: AnalysisConfig::default(),
            report: ReportConfig::default(),
        }
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            max_release: 21,
            scan_references: true,
            threads: 0,
            strategy: Strategy::ParentLast,
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            packages: vec![
                "java.".to_string(),
                "javax.".to_string(),
                "jdk.".to_string(),
                "sun.".to_string(),
                "com.sun.".to_string(),
            ],
            classes: vec![],
            archives: vec![],
            discover: true,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            artifacts: true,
            duplicate_classes: true,
            duplicate_resources: true,
            split_packages: true,
            jar_dependencies: true,
            unresolved_classes: true,
            class_versions: true,
            illegal_access: true,
            member_references: true,
            shadowed_classes: true,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: "terminal".to_string(),
            show_empty: false,
        }
    }
}

impl Config {
    /// Load configuration from a file (YAML or TOML)
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        match extension {
            "yml" | "yaml" => serde_yaml::from_str(&contents)
                .into_diagnostic()
                .wrap_err("Failed to parse YAML config"),
            "toml" => toml::from_str(&contents)
                .into_diagnostic()
                .wrap_err("Failed to parse TOML config"),
            _ => {
                // Try YAML first, then TOML
                if let Ok(config) = serde_yaml::from_str(&contents) {
                    Ok(config)
                } else {
                    toml::from_str(&contents)
                        .into_diagnostic()
                        .wrap_err("Failed to parse config file")
                }
            }
        }
    }

    /// Try to load configuration from default locations
    pub fn from_default_locations(project_root: &Path) -> Result<Self> {
        let default_names = [
            ".jarlens.yml",
            ".jarlens.yaml",
            ".jarlens.toml",
            "jarlens.yml",
            "jarlens.yaml",
            "jarlens.toml",
        ];

        for name in &default_names {
            let path = project_root.join(name);
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        // No config file found, use defaults
        Ok(Self::default())
    }

    /// Check if an archive path matches one of the exclude patterns
    pub fn should_exclude(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();
        self.exclude.iter().any(|pattern| glob_match(pattern, &path_str))
    }
}

/// Simple glob matching for patterns like "*-sources.jar" or "**/target/**"
fn glob_match(pattern: &str, text: &str) -> bool {
    // "*-sources.jar" matches "/repo/lib/foo-1.0-sources.jar"
    if let Some(suffix) = pattern.strip_prefix('*') {
        if !pattern.contains('/') {
            return text.ends_with(suffix);
        }
    }

    if let Some(prefix) = pattern.strip_suffix('*') {
        if !pattern.contains('/') {
            let file_name = text.rsplit(['/', '\\']).next().unwrap_or(text);
            return file_name.starts_with(prefix);
        }
    }

    if pattern.contains("**") {
        // "**/target/**" must match a complete directory name
        if pattern.starts_with("**/") && pattern.ends_with("/**") {
            let dir_name = pattern
                .trim_start_matches("**/")
                .trim_end_matches("/**")
                .trim_matches('/');
            let dir_pattern = format!("/{}/", dir_name);
            return text.contains(&dir_pattern);
        }

        let parts: Vec<&str> = pattern.split("**").collect();
        if parts.len() == 2 {
            let prefix = parts[0].trim_end_matches('/');
            let suffix = parts[1].trim_start_matches('/');

            if prefix.is_empty() && suffix.is_empty() {
                return true;
            }

            if prefix.is_empty() {
                return text.ends_with(suffix) || text.contains(&format!("/{}", suffix));
            }

            if suffix.is_empty() {
                return text.starts_with(prefix) || text.contains(&format!("{}/", prefix));
            }

            return (text.starts_with(prefix) || text.contains(&format!("/{}/", prefix)))
                && (text.ends_with(suffix) || text.contains(&format!("/{}", suffix)));
        }
    }

    text == pattern
}
