//! CLI entry point for archive-admin.
//!
//! Runs one repository operation against the configured Neo4j instance and
//! prints the result as JSON. Failures print the error envelope instead;
//! internal failures are logged with a reference that the envelope carries.

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

use archive_core::{ArchiveConfig, ArchiveError, Link, Location, LocationKind, Person, PersonName, User};
use archive_graph::{ConnectionProvider, GraphConfig, Locations, Neo4jBackend, Persons, Users};

#[derive(Parser)]
#[command(name = "archive-admin")]
#[command(about = "Operator tooling for the Archive graph")]
struct Cli {
    /// Config file prefix (default: archive).
    #[arg(short, long, default_value = "archive")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Historical persons.
    #[command(subcommand)]
    Person(PersonCommand),

    /// Countries, states, and cities.
    #[command(subcommand)]
    Location(LocationCommand),

    /// Registered accounts.
    #[command(subcommand)]
    User(UserCommand),
}

#[derive(Subcommand)]
enum PersonCommand {
    Create {
        #[arg(long)]
        last_name: String,
        #[arg(long, default_value = "")]
        first_name: String,
        #[arg(long, default_value = "")]
        second_name: String,
    },
    Get {
        id: String,
    },
    List,
    Delete {
        id: String,
    },
    /// Record that a person lived in a location.
    Place {
        person_id: String,
        location_id: String,
    },
}

#[derive(Subcommand)]
enum LocationCommand {
    Country {
        name: String,
    },
    State {
        country_id: String,
        name: String,
    },
    City {
        state_id: String,
        name: String,
    },
    Rename {
        #[arg(value_enum)]
        level: Level,
        id: String,
        name: String,
    },
    /// Links from the country down to a city.
    Path {
        city_id: String,
    },
    Delete {
        #[arg(value_enum)]
        level: Level,
        id: String,
    },
}

#[derive(Subcommand)]
enum UserCommand {
    List,
    Get { id: String },
    Delete { id: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum Level {
    Country,
    State,
    City,
}

impl From<Level> for LocationKind {
    fn from(level: Level) -> Self {
        match level {
            Level::Country => Self::Country,
            Level::State => Self::State,
            Level::City => Self::City,
        }
    }
}

/// Everything a command can print.
#[derive(Serialize)]
#[serde(untagged)]
enum Output {
    Person(Person),
    Persons(Vec<Person>),
    Location(Location),
    Links(Vec<Link>),
    Link(Link),
    User(User),
    Users(Vec<User>),
    Deleted { deleted: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).json().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let config = ArchiveConfig::load(&cli.config)?;

    let backend = Neo4jBackend::new(GraphConfig::from(&config.neo4j));
    let provider = ConnectionProvider::new(backend, config.databases);

    match run(&provider, cli.command).await {
        Ok(output) => println!("{}", serde_json::to_string_pretty(&output)?),
        Err(err) => {
            let reference = err.is_internal().then(|| err.report());
            let body = err.body(reference.as_ref());
            println!("{}", serde_json::to_string_pretty(&body)?);
            std::process::exit(1);
        }
    }

    Ok(())
}

async fn run(
    provider: &ConnectionProvider<Neo4jBackend>,
    command: Command,
) -> Result<Output, ArchiveError> {
    match command {
        Command::Person(cmd) => run_person(&Persons::new(provider), cmd).await,
        Command::Location(cmd) => run_location(&Locations::new(provider), cmd).await,
        Command::User(cmd) => run_user(&Users::new(provider), cmd).await,
    }
}

async fn run_person(
    persons: &Persons<Neo4jBackend>,
    cmd: PersonCommand,
) -> Result<Output, ArchiveError> {
    Ok(match cmd {
        PersonCommand::Create {
            last_name,
            first_name,
            second_name,
        } => {
            let name = PersonName::new(last_name, first_name, second_name);
            Output::Person(persons.create_person(&name).await?)
        }
        PersonCommand::Get { id } => Output::Person(persons.get_person(&id).await?),
        PersonCommand::List => Output::Persons(persons.get_persons().await?),
        PersonCommand::Delete { id } => {
            persons.delete_person(&id).await?;
            Output::Deleted { deleted: id }
        }
        PersonCommand::Place {
            person_id,
            location_id,
        } => Output::Link(persons.place_person(&person_id, &location_id).await?),
    })
}

async fn run_location(
    locations: &Locations<Neo4jBackend>,
    cmd: LocationCommand,
) -> Result<Output, ArchiveError> {
    Ok(match cmd {
        LocationCommand::Country { name } => Output::Location(locations.create_country(&name).await?),
        LocationCommand::State { country_id, name } => {
            Output::Location(locations.add_state(&country_id, &name).await?)
        }
        LocationCommand::City { state_id, name } => {
            Output::Location(locations.add_city(&state_id, &name).await?)
        }
        LocationCommand::Rename { level, id, name } => {
            Output::Location(locations.rename(level.into(), &id, &name).await?)
        }
        LocationCommand::Path { city_id } => Output::Links(locations.location_path(&city_id).await?),
        LocationCommand::Delete { level, id } => {
            locations.delete_location(level.into(), &id).await?;
            Output::Deleted { deleted: id }
        }
    })
}

async fn run_user(users: &Users<Neo4jBackend>, cmd: UserCommand) -> Result<Output, ArchiveError> {
    Ok(match cmd {
        UserCommand::List => Output::Users(users.get_users().await?),
        UserCommand::Get { id } => Output::User(users.get_user(&id).await?),
        UserCommand::Delete { id } => {
            users.delete_user(&id).await?;
            Output::Deleted { deleted: id }
        }
    })
}
