use chrono::Utc;
use clap::{Arg, ArgAction, Command};
use diesel::{Connection, PgConnection};
use skillzbloom_backend::db::repositories::roadmaps::RoadmapRepo;
use skillzbloom_backend::roadmap::migrate::upgrade_and_parse;
use tracing::{error, info, warn};

#[derive(Debug, Default)]
struct Summary {
    scanned: usize,
    upgraded: usize,
    current: usize,
    failed: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let matches = Command::new("roadmap_migrate")
        .about("Upgrades stored roadmap documents to the canonical shape")
        .arg(
            Arg::new("database-url")
                .long("database-url")
                .value_name("URL")
                .env("DATABASE_URL")
                .required(true)
                .help("Postgres connection string"),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .help("Report what would change without writing")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let database_url = matches
        .get_one::<String>("database-url")
        .ok_or("DATABASE_URL is required")?;
    let dry_run = matches.get_flag("dry-run");

    let mut conn = PgConnection::establish(database_url)?;
    let rows = RoadmapRepo::list_all(&mut conn)?;
    let now = Utc::now();
    let mut summary = Summary::default();

    for row in rows {
        summary.scanned += 1;
        match upgrade_and_parse(row.document, now) {
            Ok((_, false)) => summary.current += 1,
            Ok((roadmap, true)) => {
                if dry_run {
                    info!(user_id = %row.user_id, "Would upgrade roadmap");
                } else {
                    let document = serde_json::to_value(&roadmap)?;
                    RoadmapRepo::update_document(&mut conn, &row.user_id, &document, now)?;
                    info!(user_id = %row.user_id, "Roadmap upgraded");
                }
                summary.upgraded += 1;
            }
            Err(err) => {
                warn!(user_id = %row.user_id, error = %err, "Roadmap could not be upgraded");
                summary.failed += 1;
            }
        }
    }

    info!(
        scanned = summary.scanned,
        upgraded = summary.upgraded,
        current = summary.current,
        failed = summary.failed,
        dry_run,
        "Migration finished"
    );

    if summary.failed > 0 {
        error!("{} roadmap(s) left in legacy shape", summary.failed);
        std::process::exit(2);
    }
    Ok(())
}
