use std::{error::Error, path::PathBuf, sync::Arc};

use chrono::Utc;
use clap::Parser;
use ledger::{Ledger, LifeCategory, Money, RevenueEntry};
use migration::MigratorTrait;
use narrative::{AnthropicClient, BriefingContext, BriefingKind, Narrator, NarratorConfig};
use sea_orm::{Database, DatabaseConnection};

#[derive(Parser, Debug)]
#[command(name = "lif3-cli")]
#[command(about = "Ask questions and get briefings grounded in your LIF3 ledger")]
struct Cli {
    /// Free-form question answered with ledger and knowledge context.
    query: Option<String>,

    /// Daily command center briefing.
    #[arg(short, long)]
    briefing: bool,

    /// Goal progress analysis.
    #[arg(long)]
    progress: bool,

    /// 43V3R business strategy report.
    #[arg(long)]
    business: bool,

    /// Record revenue for today, in rand (e.g. `1000` or `1250.50`).
    #[arg(long, value_name = "AMOUNT", allow_hyphen_values = true)]
    log_revenue: Option<Money>,

    /// Description for `--log-revenue`.
    #[arg(long, requires = "log_revenue")]
    description: Option<String>,

    /// Business line for `--log-revenue`.
    #[arg(long, default_value = "tech_business")]
    business_line: LifeCategory,

    /// List knowledge projects.
    #[arg(short, long)]
    list_projects: bool,

    /// Knowledge project included in the prompt.
    #[arg(short, long, default_value = "lif3")]
    project: String,

    /// Leave the financial figures out of the prompt.
    #[arg(long)]
    no_financial: bool,

    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:./lif3.db?mode=rwc")]
    database_url: String,

    #[arg(long, env = "LIF3_KNOWLEDGE_DIR", default_value = "knowledge")]
    knowledge_dir: PathBuf,

    /// Local timezone deciding which day revenue lands on.
    #[arg(long, env = "LIF3_TIMEZONE", default_value = "Africa/Johannesburg")]
    timezone: chrono_tz::Tz,

    /// Seconds to wait for the generation service before falling back.
    #[arg(long, default_value_t = 20)]
    timeout: u64,
}

impl Cli {
    /// The narrative requested on the command line, if any.
    fn briefing_kind(&self) -> Option<BriefingKind> {
        if self.briefing {
            Some(BriefingKind::Daily)
        } else if self.progress {
            Some(BriefingKind::Progress)
        } else if self.business {
            Some(BriefingKind::Business)
        } else {
            self.query
                .as_deref()
                .map(str::trim)
                .filter(|q| !q.is_empty())
                .map(|q| BriefingKind::Query(q.to_string()))
        }
    }
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

fn narrator(cli: &Cli) -> Result<Narrator, Box<dyn Error + Send + Sync>> {
    let config = NarratorConfig {
        timeout_secs: cli.timeout,
        knowledge_dir: cli.knowledge_dir.clone(),
        ..NarratorConfig::default()
    };
    let api_key = std::env::var("ANTHROPIC_API_KEY")
        .ok()
        .filter(|key| !key.trim().is_empty());
    let client = AnthropicClient::new(&config, api_key)?;
    Ok(Narrator::new(Arc::new(client), &config))
}

async fn run(cli: Cli) -> Result<(), Box<dyn Error + Send + Sync>> {
    if cli.list_projects {
        let projects = narrator(&cli)?.knowledge().list_projects()?;
        if projects.is_empty() {
            println!("No knowledge projects found");
        } else {
            println!("Available knowledge projects:");
            for project in projects {
                println!("  - {project}");
            }
        }
        return Ok(());
    }

    let today = Utc::now().with_timezone(&cli.timezone).date_naive();

    if let Some(amount) = cli.log_revenue {
        let ledger = Ledger::builder()
            .database(connect_db(&cli.database_url).await?)
            .build()
            .await?;
        let description = cli
            .description
            .clone()
            .unwrap_or_else(|| "43V3R revenue".to_string());
        let entry = RevenueEntry::new(cli.business_line, amount, description.clone()).date(today);
        ledger.log_revenue(entry).await?;

        let currency = ledger.report(today).await?.currency;
        println!("Logged {} revenue: {description}", amount.format(currency));
        return Ok(());
    }

    let Some(kind) = cli.briefing_kind() else {
        println!("LIF3 CLI - use --help for options");
        println!("Quick commands:");
        println!("  --briefing     Daily briefing");
        println!("  --progress     Goal analysis");
        println!("  --business     Strategy insights");
        println!("  --log-revenue 1000 --description 'Client payment'");
        return Ok(());
    };

    let ledger = Ledger::builder()
        .database(connect_db(&cli.database_url).await?)
        .build()
        .await?;
    let report = ledger.report(today).await?;
    let narrator = narrator(&cli)?;
    let context = BriefingContext {
        project: Some(cli.project.as_str()),
        include_metrics: !cli.no_financial,
    };

    let briefing = narrator.compose(kind, &report, context).await;
    if let Some(reason) = briefing.fallback_reason() {
        tracing::warn!("using offline briefing: {reason}");
    }
    println!("{}", briefing.text);
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "lif3_cli=warn,narrative=warn,ledger=warn".to_string()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(Cli::parse()).await {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
