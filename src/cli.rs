//! Command line front end.
//!
//! Every endpoint operation is reachable as `<family> <endpoint> <action>`.
//! Results are printed as pretty JSON so they can be piped into `jq`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args as ClapArgs, Parser, Subcommand};
use secrecy::SecretString;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::info;

use crate::build::{DefinitionQueryOrder, DefinitionsParameters};
use crate::client::Client;
use crate::config::{ClientConfig, Config};
use crate::distributed_task::VariableGroupsParameters;
use crate::error::ConfigError;
use crate::git::RepositoriesParameters;
use crate::parsed_property::ParsedProperty;
use crate::wit::{ItemType, Relationship, RelationshipType, WorkItemParams, WorkItemState};

#[derive(Parser, Debug)]
#[command(
    name = "ado-rest",
    author,
    version,
    about = "Typed access to the Azure DevOps REST API",
    long_about = "Typed access to the Azure DevOps REST API.\n\n\
        Configuration can be provided via CLI arguments, environment variables (AZURE_DEVOPS_*),\n\
        or the config file (~/.config/ado-rest/config.toml).",
    after_help = "EXAMPLES:\n    \
        # List build definitions built since the start of the year\n    \
        ado-rest -o myorg -p myproject build definitions list --built-after 2024-01-01\n\n    \
        # Let pipelines 12 and 13 use variable group 4\n    \
        ado-rest pipelines variable-group-permissions grant 4 --pipeline 12 --pipeline 13\n\n    \
        # Create a user story under feature 100\n    \
        ado-rest wit work-items create user-story --title \"Login page\" --relation parent:100\n\n    \
        # Create a sample config file\n    \
        ado-rest config init"
)]
pub struct Args {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(flatten)]
    pub logging: LoggingArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Connection settings, highest precedence.
#[derive(ClapArgs, Clone, Default, Debug)]
pub struct ConnectionArgs {
    /// Azure DevOps organization name
    #[arg(short, long, global = true, help_heading = "Azure DevOps Connection")]
    pub organization: Option<String>,

    /// Azure DevOps project name
    #[arg(short, long, global = true, help_heading = "Azure DevOps Connection")]
    pub project: Option<String>,

    /// Personal Access Token for Azure DevOps API authentication
    #[arg(short = 't', long, global = true, help_heading = "Azure DevOps Connection")]
    pub pat: Option<String>,

    /// Service URL [default: https://dev.azure.com]
    #[arg(long, global = true, help_heading = "Azure DevOps Connection")]
    pub base_url: Option<String>,
}

impl ConnectionArgs {
    /// The flags as a config layer.
    pub fn to_config(&self) -> Config {
        Config {
            organization: self.organization.clone().map(ParsedProperty::Cli),
            project: self.project.clone().map(ParsedProperty::Cli),
            pat: self
                .pat
                .clone()
                .map(|pat| ParsedProperty::Cli(SecretString::from(pat))),
            base_url: self.base_url.clone().map(ParsedProperty::Cli),
        }
    }

    /// Layers file, environment and flags, then validates.
    pub fn resolve(&self) -> Result<ClientConfig, ConfigError> {
        Config::load()?.merge(self.to_config()).resolve()
    }
}

/// Logging flags. These are read before clap runs (see
/// [`crate::logging::parse_early_log_config`]); they are declared here so that
/// clap accepts them and lists them in `--help`.
#[derive(ClapArgs, Clone, Default, Debug)]
pub struct LoggingArgs {
    /// Log level (trace, debug, info, warn, error) [env: ADO_REST_LOG_LEVEL]
    #[arg(long, global = true, help_heading = "Logging")]
    pub log_level: Option<String>,

    /// Write logs to this file instead of stderr [env: ADO_REST_LOG_FILE]
    #[arg(long, global = true, help_heading = "Logging")]
    pub log_file: Option<PathBuf>,

    /// Log format (text, json) [env: ADO_REST_LOG_FORMAT]
    #[arg(long, global = true, help_heading = "Logging")]
    pub log_format: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(flatten)]
    Api(ApiCommand),

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Create a sample configuration file at ~/.config/ado-rest/config.toml
    Init,
    /// Show the resolved settings and where each one came from
    Show,
}

/// Commands that talk to the service.
#[derive(Subcommand, Debug)]
pub enum ApiCommand {
    /// Build API
    Build {
        #[command(subcommand)]
        command: BuildCommand,
    },
    /// Git API
    Git {
        #[command(subcommand)]
        command: GitCommand,
    },
    /// Distributed task API
    DistributedTask {
        #[command(subcommand)]
        command: DistributedTaskCommand,
    },
    /// Pipelines API
    Pipelines {
        #[command(subcommand)]
        command: PipelinesCommand,
    },
    /// Work item tracking API
    Wit {
        #[command(subcommand)]
        command: WitCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum BuildCommand {
    /// Build definitions
    Definitions {
        #[command(subcommand)]
        action: DefinitionsAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum DefinitionsAction {
    /// List build definitions
    List(DefinitionsListArgs),
    /// Get one build definition
    Get { id: i64 },
}

#[derive(ClapArgs, Clone, Default, Debug)]
pub struct DefinitionsListArgs {
    /// Name filter, wildcards allowed
    #[arg(long)]
    pub name: Option<String>,

    /// Folder path filter
    #[arg(long)]
    pub path: Option<String>,

    /// Only definitions with a build after this time (RFC 3339 or YYYY-MM-DD)
    #[arg(long, value_parser = parse_timestamp)]
    pub built_after: Option<DateTime<Utc>>,

    /// Only definitions without a build after this time (RFC 3339 or YYYY-MM-DD)
    #[arg(long, value_parser = parse_timestamp)]
    pub not_built_after: Option<DateTime<Utc>>,

    /// Restrict to these definition ids (repeatable)
    #[arg(long = "definition-id")]
    pub definition_ids: Vec<i64>,

    #[arg(long, value_enum)]
    pub query_order: Option<DefinitionQueryOrder>,

    #[arg(long)]
    pub repository_id: Option<String>,

    /// Repository type, e.g. TfsGit or GitHub
    #[arg(long)]
    pub repository_type: Option<String>,

    #[arg(long)]
    pub yaml_filename: Option<String>,

    #[arg(long)]
    pub include_latest_builds: bool,

    #[arg(long)]
    pub include_all_properties: bool,

    /// Continuation token from a previous page
    #[arg(long)]
    pub continuation_token: Option<String>,
}

impl DefinitionsListArgs {
    /// Flags that were not given stay unset, so they are not sent.
    pub fn to_parameters(&self) -> DefinitionsParameters {
        DefinitionsParameters {
            name: self.name.clone(),
            path: self.path.clone(),
            built_after: self.built_after,
            not_built_after: self.not_built_after,
            definition_ids: (!self.definition_ids.is_empty()).then(|| self.definition_ids.clone()),
            query_order: self.query_order,
            repository_id: self.repository_id.clone(),
            repository_type: self.repository_type.clone(),
            yaml_filename: self.yaml_filename.clone(),
            include_latest_builds: self.include_latest_builds.then_some(true),
            include_all_properties: self.include_all_properties.then_some(true),
            continuation_token: self.continuation_token.clone(),
            ..DefinitionsParameters::default()
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum GitCommand {
    /// Git repositories
    Repositories {
        #[command(subcommand)]
        action: RepositoriesAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum RepositoriesAction {
    /// List repositories
    List {
        #[arg(long)]
        include_hidden: bool,
        #[arg(long)]
        include_links: bool,
        #[arg(long)]
        include_all_urls: bool,
    },
    /// Get a repository by id or name
    Get { repository: String },
}

#[derive(Subcommand, Debug)]
pub enum DistributedTaskCommand {
    /// Variable groups
    VariableGroups {
        #[command(subcommand)]
        action: VariableGroupsAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum VariableGroupsAction {
    /// List variable groups
    List {
        /// Name filter, wildcards allowed
        #[arg(long)]
        group_name: Option<String>,
        /// Maximum number of groups to return
        #[arg(long)]
        top: Option<i32>,
    },
    /// Get one variable group
    Get { id: i64 },
}

#[derive(Subcommand, Debug)]
pub enum PipelinesCommand {
    /// Pipeline permissions on variable groups
    VariableGroupPermissions {
        #[command(subcommand)]
        action: VariableGroupPermissionsAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum VariableGroupPermissionsAction {
    /// List pipeline permissions on a variable group
    Get { group_id: i64 },
    /// Authorize pipelines on a variable group, keeping existing entries
    Grant {
        group_id: i64,
        /// Pipeline id to authorize (repeatable)
        #[arg(long = "pipeline", required = true)]
        pipelines: Vec<i64>,
    },
}

#[derive(Subcommand, Debug)]
pub enum WitCommand {
    /// Work items
    WorkItems {
        #[command(subcommand)]
        action: WorkItemsAction,
    },
    /// Run a WIQL query
    Wiql { query: String },
}

#[derive(Subcommand, Debug)]
pub enum WorkItemsAction {
    /// Create a work item
    Create {
        #[arg(value_enum)]
        item_type: ItemType,
        #[command(flatten)]
        fields: WorkItemFields,
    },
    /// Update a work item
    Update {
        id: i64,
        #[command(flatten)]
        fields: WorkItemFields,
    },
    /// Get a work item
    Get { id: i64 },
}

#[derive(ClapArgs, Clone, Default, Debug)]
pub struct WorkItemFields {
    #[arg(long, help_heading = "Fields")]
    pub title: Option<String>,

    #[arg(long, help_heading = "Fields")]
    pub description: Option<String>,

    #[arg(long, value_enum, help_heading = "Fields")]
    pub state: Option<WorkItemState>,

    /// Tag (repeatable); replaces all existing tags
    #[arg(long = "tag", help_heading = "Fields")]
    pub tags: Vec<String>,

    /// Remove every tag
    #[arg(long, conflicts_with = "tags", help_heading = "Fields")]
    pub clear_tags: bool,

    /// Area path
    #[arg(long, help_heading = "Fields")]
    pub area: Option<String>,

    /// Iteration path
    #[arg(long, help_heading = "Fields")]
    pub iteration: Option<String>,

    #[arg(long, help_heading = "Fields")]
    pub assigned_to: Option<String>,

    /// Link as <type>:<work item id>, e.g. parent:100 (repeatable)
    #[arg(long = "relation", value_parser = parse_relation, help_heading = "Links")]
    pub relations: Vec<Relationship>,

    /// Acceptance criterion (repeatable), rendered as a bullet list
    #[arg(long = "acceptance-criterion", help_heading = "Fields")]
    pub acceptance_criteria: Vec<String>,

    /// Validate without saving
    #[arg(long, help_heading = "Behavior")]
    pub validate_only: bool,

    /// Skip work item type rules
    #[arg(long, help_heading = "Behavior")]
    pub bypass_rules: bool,

    /// Do not notify subscribers
    #[arg(long, help_heading = "Behavior")]
    pub suppress_notifications: bool,
}

impl WorkItemFields {
    pub fn to_params(&self) -> WorkItemParams {
        let tags = if self.clear_tags {
            Some(Vec::new())
        } else if self.tags.is_empty() {
            None
        } else {
            Some(self.tags.clone())
        };

        WorkItemParams {
            title: self.title.clone(),
            description: self.description.clone(),
            state: self.state,
            tags,
            area: self.area.clone(),
            iteration: self.iteration.clone(),
            assigned_to: self.assigned_to.clone(),
            relations: self.relations.clone(),
            acceptance_criteria: self.acceptance_criteria.clone(),
            validate_only: self.validate_only,
            bypass_rules: self.bypass_rules,
            suppress_notifications: self.suppress_notifications,
        }
    }
}

/// Parses `2024-01-15T10:30:00Z`, `2024-01-15T12:30:00+02:00` or `2024-01-15`.
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| format!("invalid timestamp '{s}': expected RFC 3339 or YYYY-MM-DD"))
}

/// Parses `<type>:<id>`, e.g. `parent:100` or `Duplicate Of:7`.
pub fn parse_relation(s: &str) -> Result<Relationship, String> {
    let (kind, id) = s
        .rsplit_once(':')
        .ok_or_else(|| format!("invalid relation '{s}': expected <type>:<work item id>"))?;
    let relationship_type: RelationshipType = kind.trim().parse()?;
    let work_item_id = id
        .trim()
        .parse()
        .map_err(|_| format!("invalid work item id '{id}'"))?;
    Ok(Relationship {
        work_item_id,
        relationship_type,
    })
}

fn to_json<T: Serialize>(value: T) -> Result<Value> {
    serde_json::to_value(value).context("Failed to serialize response")
}

/// Runs one service command and returns its result as JSON.
pub async fn execute(client: &Client, command: ApiCommand) -> Result<Value> {
    match command {
        ApiCommand::Build {
            command: BuildCommand::Definitions { action },
        } => {
            let definitions = client.build().definitions();
            match action {
                DefinitionsAction::List(args) => {
                    to_json(definitions.list_all(&args.to_parameters()).await?)
                }
                DefinitionsAction::Get { id } => to_json(definitions.get(id).await?),
            }
        }
        ApiCommand::Git {
            command: GitCommand::Repositories { action },
        } => {
            let repositories = client.git().repositories();
            match action {
                RepositoriesAction::List {
                    include_hidden,
                    include_links,
                    include_all_urls,
                } => {
                    let params = RepositoriesParameters {
                        include_hidden: include_hidden.then_some(true),
                        include_links: include_links.then_some(true),
                        include_all_urls: include_all_urls.then_some(true),
                    };
                    to_json(repositories.list_all(&params).await?)
                }
                RepositoriesAction::Get { repository } => {
                    to_json(repositories.get(&repository).await?)
                }
            }
        }
        ApiCommand::DistributedTask {
            command: DistributedTaskCommand::VariableGroups { action },
        } => {
            let groups = client.distributed_task().variable_groups();
            match action {
                VariableGroupsAction::List { group_name, top } => {
                    let params = VariableGroupsParameters {
                        group_name,
                        top,
                        ..VariableGroupsParameters::default()
                    };
                    to_json(groups.list_all_with(&params).await?)
                }
                VariableGroupsAction::Get { id } => to_json(groups.get(id).await?),
            }
        }
        ApiCommand::Pipelines {
            command: PipelinesCommand::VariableGroupPermissions { action },
        } => {
            let permissions = client.pipelines().pipeline_permissions().variable_groups();
            match action {
                VariableGroupPermissionsAction::Get { group_id } => {
                    to_json(permissions.get(group_id).await?)
                }
                VariableGroupPermissionsAction::Grant {
                    group_id,
                    pipelines,
                } => to_json(permissions.grant(group_id, &pipelines).await?),
            }
        }
        ApiCommand::Wit {
            command: WitCommand::WorkItems { action },
        } => {
            let work_items = client.wit().work_items();
            match action {
                WorkItemsAction::Create { item_type, fields } => {
                    to_json(work_items.create(item_type, &fields.to_params()).await?)
                }
                WorkItemsAction::Update { id, fields } => {
                    to_json(work_items.update(id, &fields.to_params()).await?)
                }
                WorkItemsAction::Get { id } => to_json(work_items.get(id).await?),
            }
        }
        ApiCommand::Wit {
            command: WitCommand::Wiql { query },
        } => to_json(client.wit().wiql().execute(&query).await?),
    }
}

fn show_config(connection: &ConnectionArgs) -> Result<Value> {
    let config = Config::load()?.merge(connection.to_config());
    let describe = |property: Option<&ParsedProperty<String>>| match property {
        Some(p) => json!({ "value": p.value(), "source": p.source() }),
        None => Value::Null,
    };

    Ok(json!({
        "path": Config::config_path()?.display().to_string(),
        "organization": describe(config.organization.as_ref()),
        "project": describe(config.project.as_ref()),
        "base_url": describe(config.base_url.as_ref()),
        "pat": config
            .pat
            .as_ref()
            .map(|p| json!({ "value": "********", "source": p.source() })),
    }))
}

/// Runs the parsed command line.
pub async fn run(args: Args) -> Result<()> {
    let output = match args.command {
        Command::Config {
            command: ConfigCommand::Init,
        } => {
            let path = Config::create_sample_config()?;
            json!({ "path": path.display().to_string() })
        }
        Command::Config {
            command: ConfigCommand::Show,
        } => show_config(&args.connection)?,
        Command::Api(command) => {
            let config = args
                .connection
                .resolve()
                .context("Failed to resolve configuration")?;
            info!(
                organization = config.organization(),
                project = config.project(),
                base_url = %config.base_url(),
                "resolved configuration"
            );
            let client = Client::new(config).context("Failed to create client")?;
            execute(&client, command).await?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
