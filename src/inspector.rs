//! Project inspection
//!
//! Derives [`ProjectInfo`] from the project manifest and a [`TechStack`]
//! from the directory tree. Inspection never fails: a missing or broken
//! manifest yields default metadata and walk errors yield an empty stack.

use crate::types::{ProjectInfo, TechStack};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::{debug, warn};

/// File extension -> language label
static LANGUAGES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("rs", "Rust"),
        ("ts", "TypeScript"),
        ("tsx", "TypeScript"),
        ("js", "JavaScript"),
        ("jsx", "JavaScript"),
        ("mjs", "JavaScript"),
        ("cjs", "JavaScript"),
        ("py", "Python"),
        ("go", "Go"),
        ("java", "Java"),
        ("kt", "Kotlin"),
        ("rb", "Ruby"),
        ("php", "PHP"),
        ("cs", "C#"),
        ("c", "C"),
        ("h", "C"),
        ("cpp", "C++"),
        ("cc", "C++"),
        ("hpp", "C++"),
        ("swift", "Swift"),
        ("scala", "Scala"),
        ("dart", "Dart"),
        ("sh", "Shell"),
        ("html", "HTML"),
        ("css", "CSS"),
        ("scss", "SCSS"),
        ("vue", "Vue"),
        ("svelte", "Svelte"),
        ("sql", "SQL"),
    ])
});

/// Configuration filenames worth listing in the project context
const CONFIG_FILES: &[&str] = &[
    "package.json",
    "tsconfig.json",
    "Cargo.toml",
    "pyproject.toml",
    "requirements.txt",
    "go.mod",
    "pom.xml",
    "build.gradle",
    "Gemfile",
    "composer.json",
    "Dockerfile",
    "docker-compose.yml",
    "docker-compose.yaml",
    "Makefile",
    ".eslintrc.json",
    ".eslintrc.js",
    ".prettierrc",
    "webpack.config.js",
    "vite.config.ts",
    "vite.config.js",
    "jest.config.js",
    "babel.config.js",
    ".babelrc",
    ".editorconfig",
];

/// Dependency name -> framework label, in reporting order
const FRAMEWORKS: &[(&str, &str)] = &[
    ("react", "React"),
    ("next", "Next.js"),
    ("vue", "Vue.js"),
    ("nuxt", "Nuxt"),
    ("@angular/core", "Angular"),
    ("svelte", "Svelte"),
    ("express", "Express"),
    ("fastify", "Fastify"),
    ("koa", "Koa"),
    ("@nestjs/core", "NestJS"),
    ("electron", "Electron"),
    ("tailwindcss", "Tailwind CSS"),
    ("jest", "Jest"),
    ("mocha", "Mocha"),
    ("vitest", "Vitest"),
    ("tokio", "Tokio"),
    ("axum", "Axum"),
    ("actix-web", "Actix Web"),
    ("rocket", "Rocket"),
    ("tauri", "Tauri"),
    ("django", "Django"),
    ("flask", "Flask"),
    ("fastapi", "FastAPI"),
];

/// Directories never descended into
const SKIP_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    "target",
    "dist",
    "build",
    "memory-bank",
    "__pycache__",
    ".venv",
    "venv",
];

/// Inspect a project directory
pub fn inspect(project: &Path) -> (ProjectInfo, TechStack) {
    let info = read_manifest(project);
    let stack = detect_stack(project, &info);
    debug!(
        "Inspected {}: {} languages, {} frameworks, {} config files",
        project.display(),
        stack.languages.len(),
        stack.frameworks.len(),
        stack.config_files.len()
    );
    (info, stack)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageJson {
    name: Option<String>,
    version: Option<String>,
    description: Option<String>,
    license: Option<serde_json::Value>,
    #[serde(default)]
    dependencies: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    dev_dependencies: BTreeMap<String, serde_json::Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
struct CargoManifest {
    package: Option<CargoPackage>,
    #[serde(default)]
    dependencies: BTreeMap<String, toml::Value>,
    #[serde(default)]
    dev_dependencies: BTreeMap<String, toml::Value>,
}

#[derive(Deserialize)]
struct CargoPackage {
    name: Option<String>,
    version: Option<toml::Value>,
    description: Option<String>,
    license: Option<toml::Value>,
}

/// Read `package.json`, falling back to `Cargo.toml`, then to defaults
pub fn read_manifest(project: &Path) -> ProjectInfo {
    let package_json = project.join("package.json");
    if package_json.is_file() {
        return match std::fs::read_to_string(&package_json)
            .map_err(|e| e.to_string())
            .and_then(|text| parse_package_json(&text).map_err(|e| e.to_string()))
        {
            Ok(info) => info,
            Err(e) => {
                warn!("Ignoring unreadable package.json: {}", e);
                ProjectInfo::default()
            }
        };
    }

    let cargo_toml = project.join("Cargo.toml");
    if cargo_toml.is_file() {
        return match std::fs::read_to_string(&cargo_toml)
            .map_err(|e| e.to_string())
            .and_then(|text| parse_cargo_toml(&text).map_err(|e| e.to_string()))
        {
            Ok(info) => info,
            Err(e) => {
                warn!("Ignoring unreadable Cargo.toml: {}", e);
                ProjectInfo::default()
            }
        };
    }

    debug!("No manifest found in {}", project.display());
    ProjectInfo::default()
}

fn parse_package_json(text: &str) -> Result<ProjectInfo, serde_json::Error> {
    let manifest: PackageJson = serde_json::from_str(text)?;
    let defaults = ProjectInfo::default();

    let license = manifest.license.and_then(|value| match value {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Object(obj) => obj
            .get("type")
            .and_then(|t| t.as_str())
            .map(str::to_string),
        _ => None,
    });

    Ok(ProjectInfo {
        name: manifest.name.unwrap_or(defaults.name),
        version: manifest.version.unwrap_or(defaults.version),
        description: manifest.description.filter(|d| !d.trim().is_empty()),
        license,
        dependencies: manifest.dependencies.into_keys().collect(),
        dev_dependencies: manifest.dev_dependencies.into_keys().collect(),
        manifest: Some("package.json".to_string()),
    })
}

fn parse_cargo_toml(text: &str) -> Result<ProjectInfo, toml::de::Error> {
    let manifest: CargoManifest = toml::from_str(text)?;
    let defaults = ProjectInfo::default();
    let package = manifest.package;

    // `version.workspace = true` and similar tables carry no literal value
    let as_string = |value: Option<toml::Value>| value.and_then(|v| v.as_str().map(str::to_string));

    let (name, version, description, license) = match package {
        Some(p) => (p.name, as_string(p.version), p.description, as_string(p.license)),
        None => (None, None, None, None),
    };

    Ok(ProjectInfo {
        name: name.unwrap_or(defaults.name),
        version: version.unwrap_or(defaults.version),
        description,
        license,
        dependencies: manifest.dependencies.into_keys().collect(),
        dev_dependencies: manifest.dev_dependencies.into_keys().collect(),
        manifest: Some("Cargo.toml".to_string()),
    })
}

/// Detect languages and config files from the tree and frameworks from the
/// manifest dependencies
pub fn detect_stack(project: &Path, info: &ProjectInfo) -> TechStack {
    let mut stack = TechStack {
        frameworks: detect_frameworks(info),
        ..TechStack::default()
    };

    if let Err(e) = walk(project, &mut stack) {
        warn!(
            "Failed to scan {}, reporting no technologies: {}",
            project.display(),
            e
        );
        return TechStack::default();
    }

    stack
}

fn detect_frameworks(info: &ProjectInfo) -> Vec<String> {
    let deps: Vec<&str> = info.all_dependencies().collect();
    FRAMEWORKS
        .iter()
        .filter(|(package, _)| deps.contains(package))
        .map(|(_, label)| label.to_string())
        .collect()
}

fn walk(dir: &Path, stack: &mut TechStack) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        // file_type() does not follow symlinks, so link cycles are skipped
        let file_type = entry.file_type()?;
        let file_name = entry.file_name();
        let name = file_name.to_string_lossy();

        if file_type.is_dir() {
            if !SKIP_DIRS.contains(&&*name) {
                walk(&entry.path(), stack)?;
            }
        } else if file_type.is_file() {
            classify_file(&name, stack);
        }
    }
    Ok(())
}

fn classify_file(name: &str, stack: &mut TechStack) {
    if let Some(language) = Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| LANGUAGES.get(ext.to_lowercase().as_str()))
    {
        stack.languages.insert(language.to_string());
    }

    if CONFIG_FILES.contains(&name) {
        stack.config_files.insert(name.to_string());
    }
}
