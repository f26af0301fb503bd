//! Command line front end for `kinship_core`.
//!
//! # Responsibility
//! - Map flags and `KINSHIP_*` environment variables onto `CoreConfig`.
//! - Run one use-case per invocation and print its result as JSON.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use kinship_core::{
    CollectionService, CoreConfig, DbLocation, EntityService, SqliteCollectionRepository,
    SqliteEntityRepository, SqliteParentRepository,
};
use rusqlite::Connection;
use serde::Serialize;
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "kinship", version, about = "Entity graph with cascade and restrict deletes")]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct ConfigArgs {
    /// SQLite database file; an in-memory database is used when omitted.
    #[arg(long, env = "KINSHIP_DB", global = true)]
    db: Option<PathBuf>,
    #[arg(long, env = "KINSHIP_LOG_LEVEL", global = true)]
    log_level: Option<String>,
    /// Directory for rolling log files; relative paths resolve against cwd.
    #[arg(long, env = "KINSHIP_LOG_DIR", global = true)]
    log_dir: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Prints `pong`.
    Ping,
    /// Prints the core crate version.
    Version,
    #[command(subcommand)]
    Parent(ParentCommand),
    #[command(subcommand)]
    Entity(EntityCommand),
    #[command(subcommand)]
    Child(ChildCommand),
    #[command(subcommand)]
    Grandchild(GrandchildCommand),
    #[command(subcommand)]
    Reference(ReferenceCommand),
}

#[derive(Debug, Subcommand)]
enum ParentCommand {
    Add { name: String },
    List,
    Delete { id: Uuid },
}

#[derive(Debug, Subcommand)]
enum EntityCommand {
    Add { parent: Uuid, name: String },
    Rename { id: Uuid, name: String },
    Delete { id: Uuid },
    List {
        #[arg(long)]
        parent: Option<Uuid>,
    },
    /// Lists grandchildren reachable through the entity's children.
    Grandchildren { id: Uuid },
}

#[derive(Debug, Subcommand)]
enum ChildCommand {
    Add { entity: Uuid, label: String },
    List { entity: Uuid },
    Remove { id: Uuid },
}

#[derive(Debug, Subcommand)]
enum GrandchildCommand {
    Add { child: Uuid, label: String },
    List { child: Uuid },
    Remove { id: Uuid },
}

#[derive(Debug, Subcommand)]
enum ReferenceCommand {
    Add { entity: Uuid, label: String },
    List { entity: Uuid },
    Remove { id: Uuid },
}

impl ConfigArgs {
    fn into_config(self) -> Result<CoreConfig> {
        let mut config = CoreConfig::default();
        if let Some(path) = self.db {
            config.db = DbLocation::File(path);
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }
        if let Some(dir) = self.log_dir {
            let dir = if dir.is_absolute() {
                dir
            } else {
                std::env::current_dir()
                    .context("resolving relative log directory")?
                    .join(dir)
            };
            config.log_dir = Some(dir);
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Ping => {
            println!("{}", kinship_core::ping());
            Ok(())
        }
        Command::Version => {
            println!("{}", kinship_core::core_version());
            Ok(())
        }
        command => {
            let config = cli.config.into_config()?;
            let conn = config.bootstrap().context("bootstrapping kinship core")?;
            run(&conn, command)
        }
    }
}

fn run(conn: &Connection, command: Command) -> Result<()> {
    let entities = EntityService::new(
        SqliteEntityRepository::try_new(conn)?,
        SqliteParentRepository::try_new(conn)?,
    );
    let collections = CollectionService::new(SqliteCollectionRepository::try_new(conn)?);

    match command {
        Command::Ping | Command::Version => Ok(()),
        Command::Parent(command) => match command {
            ParentCommand::Add { name } => print_json(&entities.create_parent(&name)?),
            ParentCommand::List => print_json(&entities.list_parents()?),
            ParentCommand::Delete { id } => print_json(&entities.delete_parent(id)?),
        },
        Command::Entity(command) => match command {
            EntityCommand::Add { parent, name } => {
                print_json(&entities.create_entity(parent, &name)?)
            }
            EntityCommand::Rename { id, name } => print_json(&entities.rename_entity(id, &name)?),
            EntityCommand::Delete { id } => print_json(&entities.delete_entity(id)?),
            EntityCommand::List { parent } => print_json(&entities.list_entities(parent)?),
            EntityCommand::Grandchildren { id } => {
                print_json(&entities.list_grandchildren(id)?)
            }
        },
        Command::Child(command) => match command {
            ChildCommand::Add { entity, label } => {
                print_json(&collections.add_child(entity, &label)?)
            }
            ChildCommand::List { entity } => print_json(&collections.list_children(entity)?),
            ChildCommand::Remove { id } => print_json(&collections.remove_child(id)?),
        },
        Command::Grandchild(command) => match command {
            GrandchildCommand::Add { child, label } => {
                print_json(&collections.add_grandchild(child, &label)?)
            }
            GrandchildCommand::List { child } => {
                print_json(&collections.list_grandchildren_of(child)?)
            }
            GrandchildCommand::Remove { id } => print_json(&collections.remove_grandchild(id)?),
        },
        Command::Reference(command) => match command {
            ReferenceCommand::Add { entity, label } => {
                print_json(&collections.add_reference(entity, &label)?)
            }
            ReferenceCommand::List { entity } => {
                print_json(&collections.list_references(entity)?)
            }
            ReferenceCommand::Remove { id } => print_json(&collections.remove_reference(id)?),
        },
    }
}

fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::Cli;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
