use clap::{Parser, Subcommand};
use sea_orm::Database;
use sea_orm_migration::{MigrationStatus, prelude::*};

#[derive(Parser, Debug)]
#[command(name = "migration")]
#[command(about = "Manage the LIF3 ledger schema")]
struct Cli {
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:./lif3.db?mode=rwc")]
    database_url: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Apply pending migrations (all of them by default).
    Up {
        #[arg(short = 'n', long)]
        steps: Option<u32>,
    },
    /// Roll back applied migrations.
    Down {
        #[arg(short = 'n', long, default_value_t = 1)]
        steps: u32,
    },
    /// Drop every table and apply all migrations again.
    Fresh,
    /// List migrations and whether they have been applied.
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    let db = Database::connect(&cli.database_url).await?;

    match cli.command.unwrap_or(Command::Up { steps: None }) {
        Command::Up { steps } => migration::Migrator::up(&db, steps).await?,
        Command::Down { steps } => migration::Migrator::down(&db, Some(steps)).await?,
        Command::Fresh => migration::Migrator::fresh(&db).await?,
        Command::Status => {
            for migration in migration::Migrator::get_migration_with_status(&db).await? {
                let status = match migration.status() {
                    MigrationStatus::Applied => "applied",
                    MigrationStatus::Pending => "pending",
                };
                println!("{:<8} {}", status, migration.name());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn arguments_are_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn rollback_defaults_to_one_step() {
        let cli = Cli::try_parse_from(["migration", "down"]).unwrap();
        assert_eq!(cli.command, Some(Command::Down { steps: 1 }));

        let cli = Cli::try_parse_from(["migration", "up", "-n", "2"]).unwrap();
        assert_eq!(cli.command, Some(Command::Up { steps: Some(2) }));

        let cli = Cli::try_parse_from(["migration"]).unwrap();
        assert_eq!(cli.command, None);
        assert!(Cli::try_parse_from(["migration", "sideways"]).is_err());
    }
}
