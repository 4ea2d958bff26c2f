//! Composer autoload editing.
//!
//! Reads `composer.json`, inserts or updates PSR-4 entries under
//! `autoload.psr-4`, writes the manifest back in Composer's own format and
//! asks Composer to regenerate its autoload index.

use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use crate::defaults::AutoloadCommandConfig;
use crate::error::{CommandFailedDetails, Error, Result};
use crate::utils::{command, io};

pub const MANIFEST_FILE: &str = "composer.json";

/// A PSR-4 rule: namespace prefix → base directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AutoloadEntry {
    pub namespace: String,
    pub directory: String,
}

impl AutoloadEntry {
    /// Build an entry, normalizing the trailing `\` and `/` PSR-4 expects.
    pub fn new(namespace: &str, directory: &str) -> Self {
        let mut namespace = namespace.trim_end_matches('\\').to_string();
        namespace.push('\\');
        let mut directory = directory.trim_end_matches('/').to_string();
        directory.push('/');
        Self {
            namespace,
            directory,
        }
    }
}

/// What happened to a single autoload entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum MappingChange {
    Added,
    Updated { previous: Value },
    Unchanged,
}

#[derive(Debug, Clone, Serialize)]
pub struct MappingResult {
    #[serde(flatten)]
    pub entry: AutoloadEntry,
    #[serde(flatten)]
    pub change: MappingChange,
}

/// Reads and writes the project manifest.
pub trait ManifestStore {
    /// Where the manifest lives, for error reporting.
    fn location(&self) -> &Path;
    fn load(&self) -> Result<Value>;
    fn save(&self, manifest: &Value) -> Result<()>;
}

/// Regenerates the derived autoload index after the manifest changed.
pub trait AutoloadRunner {
    fn regenerate(&self, project_root: &Path) -> Result<()>;
}

/// `composer.json` on disk.
#[derive(Debug, Clone)]
pub struct ComposerJsonFile {
    path: PathBuf,
}

impl ComposerJsonFile {
    pub fn in_project(project_root: &Path) -> Self {
        Self {
            path: project_root.join(MANIFEST_FILE),
        }
    }
}

impl ManifestStore for ComposerJsonFile {
    fn location(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Value> {
        if !self.path.is_file() {
            return Err(Error::manifest_not_found(&self.path));
        }

        let raw = io::read_file(&self.path, "read composer.json")?;
        let manifest: Value = serde_json::from_str(&raw)
            .map_err(|e| Error::manifest_parse(&self.path, e.to_string()))?;

        if !manifest.is_object() {
            return Err(Error::manifest_parse(
                &self.path,
                "top-level value must be an object",
            ));
        }

        Ok(manifest)
    }

    fn save(&self, manifest: &Value) -> Result<()> {
        let content = to_composer_json(manifest)?;
        io::write_file_atomic(&self.path, &content, "write composer.json")
    }
}

/// Serialize the way Composer does: 4-space indent, trailing newline.
pub fn to_composer_json(manifest: &Value) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    let context = || Some("serialize composer.json".to_string());
    manifest
        .serialize(&mut serializer)
        .map_err(|e| Error::internal_json(e.to_string(), context()))?;

    let mut content =
        String::from_utf8(buf).map_err(|e| Error::internal_json(e.to_string(), context()))?;
    content.push('\n');
    Ok(content)
}

/// Runs an external command, `composer dump-autoload` by default.
#[derive(Debug, Clone)]
pub struct ComposerCli {
    program: String,
    args: Vec<String>,
}

impl ComposerCli {
    pub fn new(config: &AutoloadCommandConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
        }
    }
}

impl AutoloadRunner for ComposerCli {
    fn regenerate(&self, project_root: &Path) -> Result<()> {
        let output = command::capture_in(
            project_root,
            &self.program,
            &self.args,
            "regenerate autoload",
        )?;

        if !output.status.success() {
            return Err(Error::autoload_command_failed(CommandFailedDetails {
                command: command::display_line(&self.program, &self.args),
                exit_code: output.status.code(),
                output: command::error_text(&output),
            }));
        }

        Ok(())
    }
}

/// Insert or update one PSR-4 entry in an already loaded manifest.
pub fn insert_mapping(
    manifest: &mut Value,
    entry: &AutoloadEntry,
    location: &Path,
) -> Result<MappingChange> {
    let root = manifest
        .as_object_mut()
        .ok_or_else(|| Error::manifest_parse(location, "top-level value must be an object"))?;

    let autoload = object_entry(root, "autoload", location)?;
    let psr4 = object_entry(autoload, "psr-4", location)?;

    let directory = Value::String(entry.directory.clone());
    match psr4.insert(entry.namespace.clone(), directory.clone()) {
        None => Ok(MappingChange::Added),
        Some(previous) if previous == directory => Ok(MappingChange::Unchanged),
        Some(previous) => Ok(MappingChange::Updated { previous }),
    }
}

fn object_entry<'a>(
    parent: &'a mut Map<String, Value>,
    key: &str,
    location: &Path,
) -> Result<&'a mut Map<String, Value>> {
    parent
        .entry(key.to_string())
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(|| Error::manifest_parse(location, format!("'{}' must be an object", key)))
}

/// Apply every entry, save the manifest once, then regenerate the index.
pub fn update_autoload(
    store: &dyn ManifestStore,
    runner: &dyn AutoloadRunner,
    project_root: &Path,
    entries: &[AutoloadEntry],
) -> Result<Vec<MappingResult>> {
    let mut manifest = store.load()?;

    let mut results = Vec::with_capacity(entries.len());
    for entry in entries {
        let change = insert_mapping(&mut manifest, entry, store.location())?;
        results.push(MappingResult {
            entry: entry.clone(),
            change,
        });
    }

    if results.iter().any(|r| r.change != MappingChange::Unchanged) {
        store.save(&manifest)?;
    }

    runner.regenerate(project_root)?;
    Ok(results)
}

/// Map `namespace` to `directory` and regenerate the autoload index.
pub fn add_namespace_mapping(
    store: &dyn ManifestStore,
    runner: &dyn AutoloadRunner,
    project_root: &Path,
    namespace: &str,
    directory: &str,
) -> Result<MappingResult> {
    let mut results = update_autoload(
        store,
        runner,
        project_root,
        &[AutoloadEntry::new(namespace, directory)],
    )?;
    results
        .pop()
        .ok_or_else(|| Error::internal_json("no mapping applied", None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::fs;
    use tempfile::TempDir;

    const LARAVEL_COMPOSER: &str = r#"{
    "name": "laravel/laravel",
    "type": "project",
    "require": {
        "php": "^8.0.2",
        "laravel/framework": "^9.19"
    },
    "autoload": {
        "psr-4": {
            "App\\": "app/",
            "Database\\Factories\\": "database/factories/",
            "Database\\Seeders\\": "database/seeders/"
        }
    },
    "minimum-stability": "stable"
}
"#;

    #[derive(Default)]
    struct CountingRunner {
        calls: Cell<usize>,
    }

    impl AutoloadRunner for CountingRunner {
        fn regenerate(&self, _project_root: &Path) -> Result<()> {
            self.calls.set(self.calls.get() + 1);
            Ok(())
        }
    }

    fn project_with(manifest: &str) -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(MANIFEST_FILE), manifest).unwrap();
        dir
    }

    #[test]
    fn entry_normalizes_separators() {
        let entry = AutoloadEntry::new("Domain", "src/Domain");
        assert_eq!(entry.namespace, "Domain\\");
        assert_eq!(entry.directory, "src/Domain/");

        let entry = AutoloadEntry::new("Domain\\", "src/Domain/");
        assert_eq!(entry.namespace, "Domain\\");
        assert_eq!(entry.directory, "src/Domain/");
    }

    #[test]
    fn update_replaces_app_and_adds_new_roots() {
        let dir = project_with(LARAVEL_COMPOSER);
        let store = ComposerJsonFile::in_project(dir.path());
        let runner = CountingRunner::default();

        let results = update_autoload(
            &store,
            &runner,
            dir.path(),
            &[
                AutoloadEntry::new("App", "src/App"),
                AutoloadEntry::new("Domain", "src/Domain"),
            ],
        )
        .unwrap();

        assert_eq!(
            results[0].change,
            MappingChange::Updated {
                previous: Value::String("app/".to_string())
            }
        );
        assert_eq!(results[1].change, MappingChange::Added);
        assert_eq!(runner.calls.get(), 1);

        let saved: Value =
            serde_json::from_str(&fs::read_to_string(store.location()).unwrap()).unwrap();
        let psr4 = &saved["autoload"]["psr-4"];
        assert_eq!(psr4["App\\"], "src/App/");
        assert_eq!(psr4["Domain\\"], "src/Domain/");
        assert_eq!(psr4["Database\\Seeders\\"], "database/seeders/");
    }

    #[test]
    fn saved_manifest_keeps_composer_format_and_key_order() {
        let dir = project_with(LARAVEL_COMPOSER);
        let store = ComposerJsonFile::in_project(dir.path());

        add_namespace_mapping(&store, &CountingRunner::default(), dir.path(), "App", "src/App")
            .unwrap();

        let saved = fs::read_to_string(store.location()).unwrap();
        let expected = LARAVEL_COMPOSER.replace(r#""App\\": "app/""#, r#""App\\": "src/App/""#);
        assert_eq!(saved, expected);
        assert!(!dir.path().join("composer.json.tmp").exists());
    }

    #[test]
    fn already_present_mapping_is_tolerated() {
        let dir = project_with(LARAVEL_COMPOSER);
        let store = ComposerJsonFile::in_project(dir.path());
        let runner = CountingRunner::default();

        let result =
            add_namespace_mapping(&store, &runner, dir.path(), "App\\", "app/").unwrap();

        assert_eq!(result.change, MappingChange::Unchanged);
        assert_eq!(fs::read_to_string(store.location()).unwrap(), LARAVEL_COMPOSER);
        assert_eq!(runner.calls.get(), 1);
    }

    #[test]
    fn missing_autoload_section_is_created() {
        let dir = project_with("{\"name\": \"acme/site\"}");
        let store = ComposerJsonFile::in_project(dir.path());

        add_namespace_mapping(&store, &CountingRunner::default(), dir.path(), "Support", "src/Support")
            .unwrap();

        let saved: Value =
            serde_json::from_str(&fs::read_to_string(store.location()).unwrap()).unwrap();
        assert_eq!(saved["autoload"]["psr-4"]["Support\\"], "src/Support/");
    }

    #[test]
    fn missing_manifest_fails() {
        let dir = TempDir::new().unwrap();
        let store = ComposerJsonFile::in_project(dir.path());
        let runner = CountingRunner::default();

        let err = add_namespace_mapping(&store, &runner, dir.path(), "App", "src/App").unwrap_err();

        assert_eq!(err.code.as_str(), "manifest.not_found");
        assert_eq!(runner.calls.get(), 0);
    }

    #[test]
    fn malformed_manifest_fails() {
        let dir = project_with("{ \"autoload\": ");
        let store = ComposerJsonFile::in_project(dir.path());

        let err = add_namespace_mapping(&store, &CountingRunner::default(), dir.path(), "App", "src/App")
            .unwrap_err();
        assert_eq!(err.code.as_str(), "manifest.parse_error");
    }

    #[test]
    fn non_object_root_fails() {
        let dir = project_with("[1, 2, 3]");
        let store = ComposerJsonFile::in_project(dir.path());

        let err = store.load().unwrap_err();
        assert_eq!(err.code.as_str(), "manifest.parse_error");
    }

    #[test]
    fn non_object_psr4_fails() {
        let dir = project_with("{\"autoload\": {\"psr-4\": [\"app/\"]}}");
        let store = ComposerJsonFile::in_project(dir.path());

        let err = add_namespace_mapping(&store, &CountingRunner::default(), dir.path(), "App", "src/App")
            .unwrap_err();
        assert_eq!(err.code.as_str(), "manifest.parse_error");
        assert!(err.details["error"].as_str().unwrap().contains("psr-4"));
    }

    #[test]
    fn failing_command_reports_output() {
        let dir = TempDir::new().unwrap();
        let runner = ComposerCli::new(&AutoloadCommandConfig {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), "echo broken >&2; exit 2".to_string()],
        });

        let err = runner.regenerate(dir.path()).unwrap_err();

        assert_eq!(err.code.as_str(), "autoload.command_failed");
        assert_eq!(err.details["exitCode"], 2);
        assert_eq!(err.details["output"], "broken");
    }
}
