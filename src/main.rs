//! CLI entry point for `mboxfreq`.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};

use mboxfreq::config::{self, Config, LoggingConfig};
use mboxfreq::errlog::FileErrorLog;
use mboxfreq::error::MboxError;
use mboxfreq::parser::mbox::{MboxScanner, ScanOptions};
use mboxfreq::progress;
use mboxfreq::report::format::format_line;
use mboxfreq::report::key::GroupBy;
use mboxfreq::report::measure::Measure;
use mboxfreq::report::Reporter;
use mboxfreq::store::reader::MboxStore;

/// Report the senders that take up the most room in an MBOX archive.
#[derive(Parser)]
#[command(name = "mboxfreq", version)]
struct Cli {
    /// The path of the mbox file
    #[arg(value_name = "MBOX_PATH")]
    mbox_path: PathBuf,

    /// Number of mails/bytes to use as the threshold [default: 50]
    #[arg(short, long)]
    threshold: Option<u64>,

    /// Use the entire FROM field for grouping
    #[arg(short = 'f', long = "from")]
    full_from: bool,

    /// Only count the number of emails rather than the size
    #[arg(short, long)]
    count: bool,

    /// Increase output verbosity
    #[arg(short, long)]
    verbose: bool,

    /// Stop indexing after this many messages
    #[arg(short, long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    max_messages: Option<u64>,

    /// Append per-message failures to this file [default: error_log.txt]
    #[arg(long, value_name = "PATH", env = "MBOXFREQ_ERROR_LOG")]
    error_log: Option<PathBuf>,

    /// Do not draw progress bars
    #[arg(long)]
    no_progress: bool,
}

impl Cli {
    /// Fold command-line overrides into the loaded configuration.
    fn apply(&self, config: &mut Config) {
        if let Some(threshold) = self.threshold {
            config.report.threshold = threshold;
        }
        if let Some(max) = self.max_messages {
            config.scan.max_messages = Some(max as usize);
        }
        if let Some(ref path) = self.error_log {
            config.report.error_log = path.clone();
        }
        if self.no_progress {
            config.scan.show_progress = false;
        }
        if self.verbose {
            config.general.log_level = "debug".to_string();
        }
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = config::load_config();
    cli.apply(&mut config);
    setup_logging(&config.general);

    info!("Starting mbox analysis");

    let path = &cli.mbox_path;
    if !path.is_file() {
        error!(path = %path.display(), "path is not a file");
        return Err(MboxError::NotAFile(path.clone()).into());
    }

    let scanner = MboxScanner::new(
        path,
        ScanOptions {
            max_messages: config.scan.max_messages,
            print_progress: config.scan.show_progress,
            read_buffer_size: config.scan.read_buffer_size,
        },
    )?;
    let toc = scanner.scan(None)?;
    info!(messages = toc.len(), "Processing messages");

    let group_by = if cli.full_from {
        GroupBy::FullFrom
    } else {
        GroupBy::Address
    };
    let measure = if cli.count { Measure::Count } else { Measure::Size };

    let mut store = MboxStore::open(path)?;
    let mut error_log = FileErrorLog::new(&config.report.error_log);
    let pb = progress::count_bar(
        toc.len() as u64,
        "Processing messages",
        config.scan.show_progress,
    );
    let on_message = |n: u64| pb.set_position(n);

    let result = Reporter::new(&mut error_log)
        .verbose(cli.verbose)
        .with_progress(&on_message)
        .report(
            store.messages(&toc),
            |m| Ok(group_by.key(m)),
            |m| measure.measure(m),
            config.report.threshold,
        );
    pb.finish_and_clear();

    match result {
        Ok(rows) => {
            for (key, value) in &rows {
                println!("{}", format_line(key, *value, measure));
            }
            info!("Analysis complete");
            Ok(ExitCode::SUCCESS)
        }
        Err(MboxError::NoQualifyingSenders { threshold }) => {
            warn!("no matches! no single sender sent you over {threshold}");
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e.into()),
    }
}

/// Set up tracing with stderr output and optional file logging.
fn setup_logging(logging: &LoggingConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&logging.log_level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    if let Some(log_file) = &logging.log_file {
        let dir = log_file
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        if let (Some(name), Ok(())) = (log_file.file_name(), std::fs::create_dir_all(&dir)) {
            let file_appender = tracing_appender::rolling::never(&dir, name);
            let file_layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(file_appender);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(stderr_layer)
                .with(file_layer)
                .init();
            return;
        }
    }

    // Stderr only
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .init();
}
