//! Pitwall - Formula 1 session schedules from the command line
//!
//! Looks up sessions on the OpenF1 API, caches responses on disk, and falls back to
//! the cache when the API is unreachable.

use std::error::Error;

use chrono::Utc;
use clap::Parser;
use tracing::debug;

use pitwall::cache::CacheManager;
use pitwall::cli::{CacheAction, Cli, Command, ExitCode};
use pitwall::config::AppConfig;
use pitwall::data::{OpenF1Client, Session};
use pitwall::fetch::{FetchResult, ResilientFetch};
use pitwall::format;
use pitwall::logging;
use pitwall::remind::should_remind;
use pitwall::services::SessionService;

type CommandResult = Result<ExitCode, Box<dyn Error>>;

#[tokio::main(flavor = "current_thread")]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init_tracing(cli.verbose, cli.is_quiet()) {
        eprintln!("pitwall: {e}");
    }

    let config = cli.app_config();
    debug!(?config, "starting");

    match run(cli.command, &config).await {
        Ok(code) => code.into(),
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::Error.into()
        }
    }
}

async fn run(command: Command, config: &AppConfig) -> CommandResult {
    let cache = CacheManager::new(config.cache_dir.clone());

    match command {
        Command::Cache { action } => run_cache(action, &cache),
        Command::Next => {
            let result = session_service(config, cache)?.next().await?;
            print_single(result, "No session found.", |session| {
                let now = Utc::now();
                println!("{}", format::session_headline(session));
                for line in format::session_status(session, now) {
                    println!("{line}");
                }
            })
        }
        Command::Get {
            country,
            session_type,
            year,
        } => {
            let result = session_service(config, cache)?
                .get_session(&country, &session_type, year)
                .await?;
            print_single(result, "No sessions found.", |session| {
                println!("{}", format::session_headline(session));
                println!(
                    "Starts: {} (UTC)",
                    session.date_start.format("%a, %d %b %Y %H:%M:%S UTC")
                );
            })
        }
        Command::Weekend { country, year } => {
            let result = session_service(config, cache)?.weekend(&country, year).await?;
            print_warning(&result);
            match result.value {
                Some(sessions) if !sessions.is_empty() => {
                    print!("{}", format::weekend_schedule(&sessions));
                    Ok(ExitCode::Success)
                }
                _ => {
                    println!("No sessions found.");
                    Ok(ExitCode::NoResult)
                }
            }
        }
        Command::Remind { minutes, quiet } => {
            let result = session_service(config, cache)?.next().await?;
            // Quiet mode prints nothing, not even the stale warning, unless the reminder fires
            let Some(session) = &result.value else {
                if !quiet {
                    print_warning(&result);
                    println!("No upcoming sessions found.");
                }
                return Ok(ExitCode::NoResult);
            };

            let (trigger, diff) = should_remind(Utc::now(), session.date_start, minutes);
            let rounded = format::format_duration(format::round_to_minute(diff));
            if trigger {
                print_warning(&result);
                println!("REMIND: {} starts in {}!", session.session_name, rounded);
                return Ok(ExitCode::Success);
            }
            if !quiet {
                print_warning(&result);
                if diff > chrono::Duration::zero() {
                    println!(
                        "No reminder needed. Next session ({}) is in {}.",
                        session.session_name, rounded
                    );
                } else {
                    println!(
                        "No reminder needed. {} started {} ago.",
                        session.session_name, rounded
                    );
                }
            }
            Ok(ExitCode::NoResult)
        }
    }
}

fn session_service(config: &AppConfig, cache: CacheManager) -> Result<SessionService<OpenF1Client>, Box<dyn Error>> {
    let client = OpenF1Client::new(config.base_url.clone(), config.request_timeout)?;
    Ok(SessionService::new(client, ResilientFetch::new(cache, config.cache_ttl)))
}

fn run_cache(action: CacheAction, cache: &CacheManager) -> CommandResult {
    match action {
        CacheAction::Info => {
            let (entries, location) = cache.info()?;
            print!("{}", format::cache_info_table(&entries, &location.display().to_string()));
        }
        CacheAction::Clear => match cache.clear()? {
            0 => println!("Nothing to clear."),
            count => println!("Successfully removed {count} cache entries."),
        },
    }
    Ok(ExitCode::Success)
}

fn print_warning<T>(result: &FetchResult<T>) {
    if let Some(warning) = &result.warning {
        println!("{warning}");
    }
}

fn print_single(result: FetchResult<Session>, empty_message: &str, render: impl FnOnce(&Session)) -> CommandResult {
    print_warning(&result);
    match &result.value {
        Some(session) => {
            render(session);
            Ok(ExitCode::Success)
        }
        None => {
            println!("{empty_message}");
            Ok(ExitCode::NoResult)
        }
    }
}
