mod board;
mod cli;
mod config;
mod github;
mod org;

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use github::hooks::ContentType;
use github::repos::{MilestoneSpec, MilestoneState};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ghorgs", version, about = "GitHub organization project and repository tooling")]
struct Cli {
    /// GitHub organization (defaults to config `org`)
    #[arg(short = 'o', long = "organization", global = true)]
    organization: Option<String>,
    /// Show debug logs
    #[arg(long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every issue on the named project boards as JSON
    Issues {
        /// Project name(s)
        #[arg(short, long, num_args = 1.., required = true)]
        projects: Vec<String>,
        /// Resolve `depends-on:` references
        #[arg(long)]
        deps: bool,
        /// Concurrent issue fetches (defaults to config `workers`)
        #[arg(long)]
        workers: Option<usize>,
    },
    /// List organization projects
    Projects,
    /// List organization repositories
    Repos {
        /// Repository name(s); all repositories when omitted
        #[arg(short, long = "repositories", num_args = 1..)]
        repositories: Vec<String>,
    },
    /// Repository label management
    Labels {
        #[command(subcommand)]
        action: LabelsAction,
    },
    /// Repository milestone management
    Milestones {
        #[command(subcommand)]
        action: MilestonesAction,
    },
    /// Organization webhook management
    Webhook {
        #[command(subcommand)]
        action: WebhookAction,
    },
    /// Read config values
    Config {
        /// Config key (dot-separated path)
        key: String,
    },
    /// Generate shell completions
    Completions {
        /// Shell type
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum LabelsAction {
    /// Create the labels of a definitions file in each repository
    Sync {
        /// Repository name(s); all repositories when omitted
        #[arg(short, long = "repositories", num_args = 1..)]
        repositories: Vec<String>,
        /// JSON file of `{"name", "description", "color"}` entries
        #[arg(short = 'l', long = "labels-filepath")]
        labels_filepath: PathBuf,
        /// Delete existing labels that are not defined in the file
        #[arg(long)]
        delete: bool,
    },
    /// Create labels by name
    Add {
        /// Repository name
        #[arg(short, long)]
        repository: String,
        /// Label name(s)
        #[arg(short, long = "labels", num_args = 1.., required = true)]
        labels: Vec<String>,
        /// Hex colour, without `#`
        #[arg(short, long)]
        color: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
    },
}

#[derive(Args)]
struct MilestoneArgs {
    #[arg(long)]
    title: String,
    #[arg(long, default_value = "")]
    description: String,
    /// Due date: RFC 3339 or YYYY-MM-DD (midnight UTC)
    #[arg(long)]
    due_on: Option<String>,
    #[arg(long, value_enum, default_value_t = MilestoneState::Open)]
    state: MilestoneState,
}

impl From<MilestoneArgs> for MilestoneSpec {
    fn from(args: MilestoneArgs) -> Self {
        MilestoneSpec {
            title: args.title,
            description: args.description,
            due_on: args.due_on,
            state: args.state,
        }
    }
}

#[derive(Subcommand)]
enum MilestonesAction {
    /// List milestones
    List {
        #[arg(short, long)]
        repository: String,
        /// Print the raw milestone records as JSON
        #[arg(short, long)]
        dump: bool,
    },
    /// Create a milestone
    Create {
        #[arg(short, long)]
        repository: String,
        #[command(flatten)]
        milestone: MilestoneArgs,
    },
    /// Update a milestone by number
    Update {
        #[arg(short, long)]
        repository: String,
        number: u64,
        #[command(flatten)]
        milestone: MilestoneArgs,
    },
    /// Delete a milestone by number
    Delete {
        #[arg(short, long)]
        repository: String,
        number: u64,
    },
}

#[derive(Subcommand)]
enum WebhookAction {
    /// Create an organization webhook
    Create {
        /// Payload delivery URL
        #[arg(long)]
        url: String,
        /// Event name(s) to subscribe to
        #[arg(long, num_args = 1.., required = true)]
        events: Vec<String>,
        #[arg(long, value_enum, default_value_t = ContentType::Json)]
        content_type: ContentType,
        /// Create the hook disabled
        #[arg(long)]
        inactive: bool,
    },
    /// Send a ping event to a webhook
    Ping {
        /// Hook ID
        id: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let directive = if cli.verbose { "ghorgs=debug" } else { "ghorgs=info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(directive.parse()?),
        )
        .init();

    match cli.command {
        Commands::Config { key } => {
            let val = config::get(&key)?;
            println!("{val}");
            return Ok(());
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "ghorgs", &mut std::io::stdout());
            return Ok(());
        }
        _ => {}
    }

    let mut settings = config::Settings::load();
    if let Commands::Issues {
        workers: Some(workers),
        ..
    } = &cli.command
    {
        settings = settings.with_workers(*workers);
    }
    let app = cli::App::connect(&settings, cli.organization)?;

    match cli.command {
        Commands::Issues { projects, deps, .. } => {
            cli::board::issues(&app, &projects, deps).await?;
        }
        Commands::Projects => {
            cli::board::projects(&app).await?;
        }
        Commands::Repos { repositories } => {
            cli::board::repos(&app, &repositories).await?;
        }
        Commands::Labels { action } => match action {
            LabelsAction::Sync {
                repositories,
                labels_filepath,
                delete,
            } => {
                cli::labels::sync(&app, &repositories, &labels_filepath, delete).await?;
            }
            LabelsAction::Add {
                repository,
                labels,
                color,
                description,
            } => {
                cli::labels::add(
                    &app,
                    &repository,
                    &labels,
                    color.as_deref(),
                    description.as_deref(),
                )
                .await?;
            }
        },
        Commands::Milestones { action } => match action {
            MilestonesAction::List { repository, dump } => {
                cli::milestones::list(&app, &repository, dump).await?;
            }
            MilestonesAction::Create {
                repository,
                milestone,
            } => {
                cli::milestones::create(&app, &repository, &milestone.into()).await?;
            }
            MilestonesAction::Update {
                repository,
                number,
                milestone,
            } => {
                cli::milestones::update(&app, &repository, number, &milestone.into()).await?;
            }
            MilestonesAction::Delete { repository, number } => {
                cli::milestones::delete(&app, &repository, number).await?;
            }
        },
        Commands::Webhook { action } => match action {
            WebhookAction::Create {
                url,
                events,
                content_type,
                inactive,
            } => {
                cli::webhook::create(&app, &url, &events, content_type, !inactive).await?;
            }
            WebhookAction::Ping { id } => {
                cli::webhook::ping(&app, id).await?;
            }
        },
        Commands::Config { .. } | Commands::Completions { .. } => {}
    }

    Ok(())
}
