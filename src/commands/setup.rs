use clap::Args;
use std::path::PathBuf;

use beyond::composer::{ComposerCli, ComposerJsonFile};
use beyond::defaults;
use beyond::setup::{self, Collaborators, Layout, SetupOptions, SetupReport};
use beyond::stub::EmbeddedStubs;

use crate::commands::CmdResult;

#[derive(Args)]
pub struct SetupArgs {
    /// Directory the new layout is created in, relative to the project root
    #[arg(default_value = "src")]
    pub directory: String,

    /// Keep the original app directory after migrating
    #[arg(long)]
    pub no_delete: bool,

    /// Project root containing composer.json (default: current directory)
    #[arg(long, default_value = ".")]
    pub project: String,

    /// Show the planned steps without changing anything
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(args: SetupArgs) -> CmdResult<SetupReport> {
    let project_root = PathBuf::from(shellexpand::tilde(&args.project).into_owned());
    let config = defaults::load_config(&project_root)?;
    let layout = Layout::new(&config.defaults.source_dir, &args.directory)?;

    let manifest = ComposerJsonFile::in_project(&project_root);
    let autoload = ComposerCli::new(&config.defaults.autoload);
    let collaborators = Collaborators {
        manifest: &manifest,
        autoload: &autoload,
        stubs: &EmbeddedStubs,
    };

    let options = SetupOptions {
        no_delete: args.no_delete,
        dry_run: args.dry_run,
    };

    let report = setup::run(&project_root, &layout, options, &collaborators)?;
    Ok((report, 0))
}
