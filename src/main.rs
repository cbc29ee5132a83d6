use clap::{Args, Parser as ClapParser, Subcommand};
use ftrack_query::cli::{self, CliError, RenderOptions, StatementKind};
use std::io::{self, Read};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(ClapParser)]
#[command(name = "ftq")]
#[command(about = "ftq - Build and render ftrack queries without a server")]
#[command(version)]
struct Cli {
    /// Rows fetched per request when the statement runs
    #[arg(long, global = true, env = "FTRACK_API_PAGE_SIZE")]
    page_size: Option<u32>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ClauseArgs {
    /// Filter as key<op>value, op one of = != > >= < <= ~ (repeatable)
    #[arg(short = 'w', long = "where", value_name = "FILTER")]
    filters: Vec<String>,

    /// Sort key such as "name descending" (repeatable)
    #[arg(short, long)]
    sort: Vec<String>,

    /// Number of results to skip
    #[arg(long)]
    offset: Option<u64>,

    /// Maximum number of results
    #[arg(short, long)]
    limit: Option<u64>,
}

#[derive(Args)]
struct ValueArgs {
    /// Field assignment as key=value (repeatable)
    #[arg(long = "set", value_name = "ASSIGNMENT")]
    set: Vec<String>,

    /// JSON object of field values (reads from stdin if piped)
    #[arg(long)]
    values: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a select statement
    Select {
        /// Entity type, or Entity.field to project a field
        entity: String,

        /// Attributes to populate (repeatable)
        #[arg(short, long)]
        populate: Vec<String>,

        /// Attributes to group by (repeatable)
        #[arg(long)]
        group_by: Vec<String>,

        #[command(flatten)]
        clauses: ClauseArgs,
    },

    /// Render a create statement
    Create {
        /// Entity type
        entity: String,

        #[command(flatten)]
        values: ValueArgs,
    },

    /// Render an update statement
    Update {
        /// Entity type
        entity: String,

        #[command(flatten)]
        clauses: ClauseArgs,

        #[command(flatten)]
        values: ValueArgs,
    },

    /// Render a delete statement
    Delete {
        /// Entity type
        entity: String,

        /// Remove components from their locations first
        #[arg(long)]
        remove_components: bool,

        #[command(flatten)]
        clauses: ClauseArgs,
    },
}

fn install_tracing_subscriber() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt().with_env_filter(filter).with_writer(io::stderr).try_init();
}

fn main() {
    install_tracing_subscriber();
    let cli = Cli::parse();

    let result = build_options(cli).and_then(|options| cli::execute_render(&options));
    match result {
        Ok(statement) => println!("{}", statement),
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}

fn build_options(cli: Cli) -> Result<RenderOptions, CliError> {
    let mut options = RenderOptions {
        page_size: cli.page_size,
        ..RenderOptions::default()
    };

    match cli.command {
        Commands::Select {
            entity,
            populate,
            group_by,
            clauses,
        } => {
            options.kind = StatementKind::Select;
            options.entity = entity;
            options.populate = populate;
            options.group_by = group_by;
            apply_clauses(&mut options, clauses);
        }
        Commands::Create { entity, values } => {
            options.kind = StatementKind::Create;
            options.entity = entity;
            apply_values(&mut options, values)?;
        }
        Commands::Update {
            entity,
            clauses,
            values,
        } => {
            options.kind = StatementKind::Update;
            options.entity = entity;
            apply_clauses(&mut options, clauses);
            apply_values(&mut options, values)?;
        }
        Commands::Delete {
            entity,
            remove_components,
            clauses,
        } => {
            options.kind = StatementKind::Delete;
            options.entity = entity;
            options.remove_components = remove_components;
            apply_clauses(&mut options, clauses);
        }
    }
    Ok(options)
}

fn apply_clauses(options: &mut RenderOptions, clauses: ClauseArgs) {
    options.filters = clauses.filters;
    options.sort = clauses.sort;
    options.offset = clauses.offset;
    options.limit = clauses.limit;
}

fn apply_values(options: &mut RenderOptions, values: ValueArgs) -> Result<(), CliError> {
    options.set = values.set;
    options.values = match values.values {
        Some(s) => Some(s),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer).map_err(CliError::Io)?;
            Some(buffer).filter(|b| !b.trim().is_empty())
        }
        None => None,
    };
    Ok(())
}
