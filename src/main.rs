use std::io::{self, BufRead, Write};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::error;

use reprocess::config::{self, Config, Environment};
use reprocess::{build_query, HttpApi, RunSettings, DEFAULT_BATCH_SIZE};

/// Reprocess a list of crashes from a Super Search query.
///
/// Accepts querystring-like arguments, for example:
/// reprocess product=Firefox version=4.0 'date=>2010-10-10'
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// An Auth Token that has the "Reprocess Crashes" permission on the target
    /// environment (prompted if omitted)
    #[arg(short = 't', long, env = "REPROCESS_AUTH_TOKEN", hide_env_values = true)]
    auth_token: Option<String>,

    /// Number of documents to query or send at once
    #[arg(short = 's', long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: NonZeroUsize,

    /// Target crash-stats environment
    #[arg(short, long, value_enum, default_value = "prod")]
    env: Environment,

    /// Dry run mode - only list the matching crash ids without reprocessing them
    #[arg(long)]
    dry_run: bool,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,

    /// Also write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Search criteria as key=value pairs; repeat a key to match several values
    params: Vec<String>,
}

/// Asks for a token until a non-blank line is entered. Running out of input
/// is an error.
fn read_auth_token<R, W>(input: &mut R, prompt: &mut W) -> io::Result<String>
where
    R: BufRead,
    W: Write,
{
    loop {
        write!(prompt, "Auth token: ")?;
        prompt.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "no auth token entered",
            ));
        }

        let token = line.trim();
        if !token.is_empty() {
            return Ok(token.to_string());
        }
    }
}

async fn execute(args: Args) -> reprocess::Result<()> {
    let query = build_query(&args.params)?;
    let config = Config::new(args.env)?;

    let auth_token = match args.auth_token {
        Some(token) if !token.trim().is_empty() => token,
        _ if args.dry_run => String::new(),
        _ => read_auth_token(&mut io::stdin().lock(), &mut io::stderr())?,
    };

    let api = HttpApi::new(&config)?;
    let settings = RunSettings {
        query,
        batch_size: args.batch_size,
        auth_token,
        dry_run: args.dry_run,
    };

    let summary = reprocess::run(&api, &settings).await?;

    if settings.dry_run {
        for crash_id in &summary.crash_ids {
            println!("{}", crash_id);
        }
    } else {
        println!(
            "Successfully sent {} crash reports for reprocessing",
            summary.reprocessed
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = config::setup_logging(args.verbose, args.log_file.as_deref()) {
        eprintln!("Error setting up logging: {}", e);
        return ExitCode::FAILURE;
    }

    match execute(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
