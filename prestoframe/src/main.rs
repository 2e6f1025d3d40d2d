mod cli;

use clap::Parser;
use cli::{output, ux};
use prestoframe::{PrestoframeError, PrestoframeErrorKind};


async fn run_command(args: &cli::Cli) -> Result<(), PrestoframeError> {
    let sql = args.read_sql()?;
    let options = args.run_options()?;

    let table = prestoframe::run_with_options(&sql, &options).await?;

    output::write_batch(&table, args.format, std::io::stdout().lock())
}

fn run(args: &cli::Cli) -> Result<(), PrestoframeError> {
    ux::setup_logging(args.verbose, args.quiet)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(PrestoframeErrorKind::Runtime)?;

    runtime.block_on(run_command(args))
}


/// Entry point for the prestoframe CLI tool.
///
/// Runs one query with the connection settings given as flags (or their
/// `PRESTO_*` environment variables), prints the result table to stdout in
/// the chosen `--format`, and exits with status 1 if anything fails.
fn main() {
    let args: cli::Cli = cli::Cli::parse();

    // GSSAPI only reads its configuration from the environment.
    if let Some(path) = args.krb5_config_export() {
        // SAFETY: no other thread exists yet; the runtime is started afterwards.
        unsafe { std::env::set_var("KRB5_CONFIG", path) };
    }

    if let Err(e) = run(&args) {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
