//! Domain-driven layout setup.
//!
//! The whole migration is a static, ordered list of [`Step`]s built by
//! [`plan`] and consumed one at a time by [`execute_step`]. The run aborts on
//! the first failing step and performs no rollback: whatever earlier steps
//! wrote stays on disk. Copy steps overwrite their destination, so re-running
//! after a partial failure is safe until the source directory is deleted.

use serde::Serialize;
use std::path::{Component, Path};

use crate::composer::{self, AutoloadEntry, AutoloadRunner, ManifestStore, MappingResult};
use crate::error::{Error, Result};
use crate::files;
use crate::replace::ReplacementMap;
use crate::stub::{self, StubContext, StubRenderer};
use crate::utils::io;

const MIDDLEWARES: &[&str] = &[
    "Authenticate",
    "EncryptCookies",
    "PreventRequestsDuringMaintenance",
    "RedirectIfAuthenticated",
    "TrimStrings",
    "TrustHosts",
    "TrustProxies",
    "VerifyCsrfToken",
];

const PROVIDERS: &[&str] = &[
    "AppServiceProvider",
    "AuthServiceProvider",
    "BroadcastServiceProvider",
    "EventServiceProvider",
    "RouteServiceProvider",
];

/// Source and target roots, relative to the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    source_dir: String,
    target_dir: String,
}

impl Layout {
    pub fn new(source_dir: &str, target_dir: &str) -> Result<Self> {
        let source_dir = normalize_relative("source_dir", source_dir)?;
        let target_dir = normalize_relative("directory", target_dir)?;

        // The source tree is deleted at the end of a run, so the two trees
        // must not contain one another.
        let (source, target) = (Path::new(&source_dir), Path::new(&target_dir));
        if target.starts_with(source) || source.starts_with(target) {
            return Err(Error::validation_invalid_argument(
                "directory",
                "Target directory must not overlap the source directory",
                Some(target_dir),
            ));
        }

        Ok(Self {
            source_dir,
            target_dir,
        })
    }

    pub fn source_dir(&self) -> &str {
        &self.source_dir
    }

    pub fn target_dir(&self) -> &str {
        &self.target_dir
    }

    fn source(&self, rel: &str) -> String {
        format!("{}/{}", self.source_dir, rel)
    }

    fn app(&self, rel: &str) -> String {
        format!("{}/App/{}", self.target_dir, rel)
    }

    fn domain(&self, rel: &str) -> String {
        format!("{}/Domain/{}", self.target_dir, rel)
    }

    fn support(&self, rel: &str) -> String {
        format!("{}/Support/{}", self.target_dir, rel)
    }

    /// PSR-4 roots of the new layout.
    pub fn autoload_entries(&self) -> Vec<AutoloadEntry> {
        ["App", "Domain", "Support"]
            .iter()
            .map(|root| AutoloadEntry::new(root, &format!("{}/{}", self.target_dir, root)))
            .collect()
    }
}

fn normalize_relative(field: &str, raw: &str) -> Result<String> {
    let invalid = |problem: &str| {
        Error::validation_invalid_argument(field, problem, Some(raw.to_string()))
    };

    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(invalid("Directory must not be empty"));
    }

    let mut parts = Vec::new();
    for component in Path::new(trimmed).components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().to_string()),
            Component::CurDir => {}
            Component::ParentDir => {
                return Err(invalid("Directory must stay inside the project"));
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(invalid("Directory must be relative to the project root"));
            }
        }
    }

    if parts.is_empty() {
        return Err(invalid("Directory must not be the project root"));
    }

    Ok(parts.join("/"))
}

/// One declarative migration step. Paths are relative to the project root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    Copy {
        from: String,
        to: String,
        #[serde(skip_serializing_if = "ReplacementMap::is_empty")]
        replacements: ReplacementMap,
    },
    Stub {
        stub: String,
        to: String,
    },
    Refactor {
        path: String,
        replacements: ReplacementMap,
    },
    Autoload {
        entries: Vec<AutoloadEntry>,
    },
    Delete {
        path: String,
    },
}

impl Step {
    fn copy(from: String, to: String) -> Self {
        Step::Copy {
            from,
            to,
            replacements: ReplacementMap::new(),
        }
    }

    fn copy_with(from: String, to: String, replacements: ReplacementMap) -> Self {
        Step::Copy {
            from,
            to,
            replacements,
        }
    }
}

/// Flags for a setup run.
#[derive(Debug, Clone, Copy, Default)]
pub struct SetupOptions {
    /// Keep the source directory after migrating.
    pub no_delete: bool,
    /// Report the plan without touching the filesystem.
    pub dry_run: bool,
}

/// Framework collaborators the migration talks to.
pub struct Collaborators<'a> {
    pub manifest: &'a dyn ManifestStore,
    pub autoload: &'a dyn AutoloadRunner,
    pub stubs: &'a dyn StubRenderer,
}

pub fn middleware_replacements() -> ReplacementMap {
    ReplacementMap::new().with(
        r"namespace App\Http\Middleware;",
        r"namespace Support\Middlewares;",
    )
}

pub fn http_kernel_replacements() -> ReplacementMap {
    ReplacementMap::new()
        .with(r"namespace App\Http;", r"namespace App;")
        .with(
            r"use Illuminate\Foundation\Http\Kernel as HttpKernel;",
            r"use Illuminate\Foundation\Http\Kernel;",
        )
        .with(
            "class Kernel extends HttpKernel",
            "class HttpKernel extends Kernel",
        )
        .with(r"\App\Http\Middleware\", r"\Support\Middlewares\")
}

pub fn user_model_replacements() -> ReplacementMap {
    ReplacementMap::new().with(r"namespace App\Models;", r"namespace Domain\Users\Models;")
}

pub fn bootstrap_replacements() -> ReplacementMap {
    ReplacementMap::new()
        .with(
            r"new Illuminate\Foundation\Application",
            r"new App\Application",
        )
        .with(r"App\Http\Kernel::class", r"App\HttpKernel::class")
}

pub fn auth_config_replacements() -> ReplacementMap {
    ReplacementMap::new().with(
        r"App\Models\User::class",
        r"Domain\Users\Models\User::class",
    )
}

/// Build the ordered list of steps for `layout`.
pub fn plan(layout: &Layout, options: SetupOptions) -> Vec<Step> {
    let mut steps = vec![
        Step::copy(
            layout.source("Console/Kernel.php"),
            layout.app("Console/Kernel.php"),
        ),
        Step::copy(
            layout.source("Exceptions/Handler.php"),
            layout.app("Exceptions/Handler.php"),
        ),
    ];

    steps.extend(MIDDLEWARES.iter().map(|name| {
        Step::copy_with(
            layout.source(&format!("Http/Middleware/{}.php", name)),
            layout.support(&format!("Middlewares/{}.php", name)),
            middleware_replacements(),
        )
    }));

    steps.push(Step::copy_with(
        layout.source("Http/Kernel.php"),
        layout.app("HttpKernel.php"),
        http_kernel_replacements(),
    ));

    steps.push(Step::Stub {
        stub: stub::APPLICATION_STUB.to_string(),
        to: layout.app("Application.php"),
    });

    steps.push(Step::copy_with(
        layout.source("Models/User.php"),
        layout.domain("Users/Models/User.php"),
        user_model_replacements(),
    ));

    steps.extend(PROVIDERS.iter().map(|name| {
        Step::copy(
            layout.source(&format!("Providers/{}.php", name)),
            layout.app(&format!("Providers/{}.php", name)),
        )
    }));

    steps.push(Step::Refactor {
        path: "bootstrap/app.php".to_string(),
        replacements: bootstrap_replacements(),
    });

    steps.push(Step::Refactor {
        path: "config/auth.php".to_string(),
        replacements: auth_config_replacements(),
    });

    steps.push(Step::Autoload {
        entries: layout.autoload_entries(),
    });

    if !options.no_delete {
        steps.push(Step::Delete {
            path: layout.source_dir().to_string(),
        });
    }

    steps
}

/// What executing a step did.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepOutcome {
    Planned,
    Copied { substitutions: usize },
    Rendered,
    Refactored { substitutions: usize },
    AutoloadUpdated { mappings: Vec<MappingResult> },
    Deleted { existed: bool },
}

#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    #[serde(flatten)]
    pub step: Step,
    #[serde(flatten)]
    pub outcome: StepOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct SetupReport {
    pub project: String,
    pub source_dir: String,
    pub target_dir: String,
    pub dry_run: bool,
    pub deleted_source: bool,
    pub steps: Vec<StepReport>,
}

/// Execute a single step against `project_root`.
pub fn execute_step(
    project_root: &Path,
    layout: &Layout,
    step: &Step,
    collaborators: &Collaborators<'_>,
) -> Result<StepOutcome> {
    match step {
        Step::Copy {
            from,
            to,
            replacements,
        } => {
            let substitutions = files::copy_and_refactor(
                &project_root.join(from),
                &project_root.join(to),
                replacements,
            )?;
            log_status!("setup", "Copied {} -> {}", from, to);
            Ok(StepOutcome::Copied { substitutions })
        }
        Step::Stub { stub, to } => {
            let context = StubContext {
                app_path: format!("{}/App", layout.target_dir()),
            };
            let content = collaborators.stubs.render(stub, &context)?;
            let target = project_root.join(to);
            io::ensure_parent_dir(&target, "create destination directory")?;
            io::write_file(&target, &content, "write stub")?;
            log_status!("setup", "Rendered {} -> {}", stub, to);
            Ok(StepOutcome::Rendered)
        }
        Step::Refactor { path, replacements } => {
            let substitutions = files::refactor_in_place(&project_root.join(path), replacements)?;
            log_status!("setup", "Refactored {} ({} replacements)", path, substitutions);
            Ok(StepOutcome::Refactored { substitutions })
        }
        Step::Autoload { entries } => {
            let mappings = composer::update_autoload(
                collaborators.manifest,
                collaborators.autoload,
                project_root,
                entries,
            )?;
            log_status!("setup", "Updated autoload mappings in composer.json");
            Ok(StepOutcome::AutoloadUpdated { mappings })
        }
        Step::Delete { path } => {
            let existed = files::delete_tree(&project_root.join(path))?;
            log_status!("setup", "Deleted {}", path);
            Ok(StepOutcome::Deleted { existed })
        }
    }
}

/// Run the full migration. Stops at the first failing step.
pub fn run(
    project_root: &Path,
    layout: &Layout,
    options: SetupOptions,
    collaborators: &Collaborators<'_>,
) -> Result<SetupReport> {
    if !project_root.is_dir() {
        return Err(Error::validation_invalid_argument(
            "project",
            "Project directory does not exist",
            Some(project_root.display().to_string()),
        ));
    }

    let steps = plan(layout, options);
    let mut reports = Vec::with_capacity(steps.len());

    for step in steps {
        let outcome = if options.dry_run {
            StepOutcome::Planned
        } else {
            execute_step(project_root, layout, &step, collaborators)?
        };
        reports.push(StepReport { step, outcome });
    }

    let deleted_source = reports
        .iter()
        .any(|r| matches!(r.outcome, StepOutcome::Deleted { existed: true }));

    Ok(SetupReport {
        project: project_root.display().to_string(),
        source_dir: layout.source_dir().to_string(),
        target_dir: layout.target_dir().to_string(),
        dry_run: options.dry_run,
        deleted_source,
        steps: reports,
    })
}
