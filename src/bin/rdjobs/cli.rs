use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use rdjobs::commands::{InfoOptions, JobsCommand, ListOptions, LoadOptions, PurgeOptions};
use rdjobs::core::job::{DuplicatePolicy, TransferFormat};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "rdjobs",
    author,
    version = rdjobs::core::version(),
    about = "List, inspect, load and purge jobs on a remote job service."
)]
#[command(styles = rdjobs::utils::STYLES)]
pub struct RdJobs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, help = "Path to the config file")]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        short = 'D',
        global = true,
        action = clap::ArgAction::Count,
        help = "Increase log verbosity (-D debug, -DD trace)"
    )]
    pub debug: u8,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List jobs, or download their definitions with -f
    #[command(visible_alias = "ls")]
    List(ListArgs),
    /// Show details of a single job
    Info(InfoArgs),
    /// Upload job definitions from a file
    Load(LoadArgs),
    /// Delete jobs, optionally saving their definitions first
    Purge(PurgeArgs),
    /// Generate shell completion scripts
    Completion {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(long, short = 'p', help = "Project name (default: from config)")]
    pub project: Option<String>,

    #[arg(
        long,
        short = 'i',
        help = "Comma-separated list of job ids",
        conflicts_with_all = ["job", "group"],
        value_hint = clap::ValueHint::Other
    )]
    pub idlist: Option<String>,

    #[arg(
        long,
        short = 'j',
        help = "Job name filter, optionally prefixed by a group path (group/name)"
    )]
    pub job: Option<String>,

    #[arg(long, short = 'g', help = "Group path filter")]
    pub group: Option<String>,

    #[arg(
        long,
        short = 'f',
        help = "Save job definitions to this file instead of listing ('-' for stdout)",
        value_hint = clap::ValueHint::FilePath
    )]
    pub file: Option<PathBuf>,

    #[arg(long, short = 'F', value_enum, help = "Definition format for -f")]
    pub format: Option<TransferFormat>,

    #[arg(
        long = "outformat",
        short = '%',
        help = "Output template with %field% placeholders, e.g. '%id% %name%'"
    )]
    pub outformat: Option<String>,

    #[arg(long, short = 'v', help = "Show every field of each job")]
    pub verbose: bool,
}

#[derive(Debug, Args)]
pub struct InfoArgs {
    #[arg(long, short = 'i', help = "Job id")]
    pub id: String,

    #[arg(
        long = "outformat",
        short = '%',
        help = "Output template with %field% placeholders"
    )]
    pub outformat: Option<String>,

    #[arg(long, short = 'v', help = "Show every field of the job")]
    pub verbose: bool,
}

#[derive(Debug, Args)]
pub struct LoadArgs {
    #[arg(long, short = 'p', help = "Project name (default: from config)")]
    pub project: Option<String>,

    #[arg(
        long,
        short = 'f',
        help = "File containing job definitions",
        value_hint = clap::ValueHint::FilePath
    )]
    pub file: Option<PathBuf>,

    #[arg(
        long,
        short = 'F',
        value_enum,
        help = "Definition format (default: from the file extension)"
    )]
    pub format: Option<TransferFormat>,

    #[arg(
        long,
        short = 'd',
        value_enum,
        default_value_t = DuplicatePolicy::Update,
        help = "What to do when a loaded job already exists"
    )]
    pub duplicate: DuplicatePolicy,

    #[arg(
        long,
        short = 'r',
        help = "Strip UUIDs so the service assigns new ones"
    )]
    pub remove_uuids: bool,

    #[arg(long, short = 'v', help = "Show every field of each loaded job")]
    pub verbose: bool,
}

#[derive(Debug, Args)]
pub struct PurgeArgs {
    #[command(flatten)]
    pub list: ListArgs,

    #[arg(long, short = 'y', help = "Delete without asking for confirmation")]
    pub confirm: bool,
}

impl ListArgs {
    pub fn into_options(self, default_project: Option<&str>) -> ListOptions {
        ListOptions {
            project: self.project.or_else(|| default_project.map(str::to_string)),
            idlist: self.idlist,
            job: self.job,
            group: self.group,
            file: self.file,
            format: self.format,
            outformat: self.outformat,
            verbose: self.verbose,
        }
    }
}

impl Commands {
    /// Converts parsed arguments into a workflow command.
    ///
    /// Returns `None` for commands handled by the binary itself.
    pub fn into_jobs_command(self, default_project: Option<&str>) -> Option<JobsCommand> {
        let command = match self {
            Commands::List(args) => JobsCommand::List(args.into_options(default_project)),
            Commands::Info(args) => JobsCommand::Info(InfoOptions {
                id: args.id,
                outformat: args.outformat,
                verbose: args.verbose,
            }),
            Commands::Load(args) => JobsCommand::Load(LoadOptions {
                project: args
                    .project
                    .or_else(|| default_project.map(str::to_string)),
                file: args.file,
                format: args.format,
                duplicate: args.duplicate,
                remove_uuids: args.remove_uuids,
                verbose: args.verbose,
            }),
            Commands::Purge(args) => JobsCommand::Purge(PurgeOptions {
                list: args.list.into_options(default_project),
                confirm: args.confirm,
            }),
            Commands::Completion { .. } => return None,
        };
        Some(command)
    }
}
