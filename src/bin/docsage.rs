//! CLI binary for docsage.
//!
//! A thin shim over the library crate: `serve` runs the proxy, `validate`
//! checks files against the upload rules, and `summarize` walks one document
//! through the whole select → submit → render → download flow.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use docsage::input::format_size;
use docsage::proxy::serve;
use docsage::render::{render_blocks, render_markdown, stagger_schedule, SECTION_STAGGER};
use docsage::validate::{validate_parts, ALLOWED_EXTENSIONS, MAX_UPLOAD_MB};
use docsage::{
    CandidateFile, ClientConfig, EntryId, NotificationCenter, PdfStyle, ProgressCallback,
    ProxyConfig, SummaryClient, Toast, UploadProgressCallback, UploadSession, Workspace,
};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// One bar per accepted file, all stacked in a [`MultiProgress`].
struct CliProgressCallback {
    multi: MultiProgress,
    bars: Mutex<HashMap<EntryId, ProgressBar>>,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            multi: MultiProgress::new(),
            bars: Mutex::new(HashMap::new()),
        })
    }

    fn bar(&self, entry: EntryId) -> Option<ProgressBar> {
        self.bars
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&entry)
            .cloned()
    }
}

impl UploadProgressCallback for CliProgressCallback {
    fn on_start(&self, entry: EntryId, name: &str, size_bytes: u64) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:32.green/238}] {pos:>3}%  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        let bar = self.multi.add(ProgressBar::new(100));
        bar.set_style(style);
        bar.set_prefix(name.to_string());
        bar.set_message(dim(&format_size(size_bytes)));
        bar.enable_steady_tick(Duration::from_millis(80));

        self.bars
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(entry, bar);
    }

    fn on_progress(&self, entry: EntryId, _name: &str, percent: u8) {
        if let Some(bar) = self.bar(entry) {
            bar.set_position(u64::from(percent));
        }
    }

    fn on_complete(&self, entry: EntryId, name: &str) {
        if let Some(bar) = self.bar(entry) {
            bar.finish_and_clear();
        }
        self.multi
            .suspend(|| eprintln!("  {} {}  {}", green("✓"), name, dim("ready")));
    }

    fn on_rejected(&self, name: &str, message: &str) {
        self.multi
            .suspend(|| eprintln!("  {} {}  {}", red("✗"), name, red(message)));
    }

    fn on_removed(&self, entry: EntryId, _name: &str) {
        if let Some(bar) = self
            .bars
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&entry)
        {
            bar.finish_and_clear();
        }
    }
}

/// Rejections still get reported when the progress bars are off.
struct PlainProgressCallback;

impl UploadProgressCallback for PlainProgressCallback {
    fn on_rejected(&self, name: &str, message: &str) {
        eprintln!("  {} {}  {}", red("✗"), name, red(message));
    }
}

fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS),
    );
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

// ── CLI definition ───────────────────────────────────────────────────────────

const AFTER_HELP: &str = r#"EXAMPLES:
  # Run the proxy in front of a local summarisation service
  docsage serve --upstream http://localhost:8000

  # Check which files would be accepted
  docsage validate report.pdf slides.pptx archive.zip

  # Summarise a document through the proxy
  docsage summarize report.pdf

  # Academic style, then save the PDF as ./out/summary_Academic.pdf
  docsage summarize --style academic --download academic --out-dir out report.pdf

  # Machine-readable output
  docsage summarize --json report.pdf > summary.json

ACCEPTED FILES:
  .docx .pdf .ppt .pptx .txt .md .markdown, under 200 MB.

ENVIRONMENT VARIABLES:
  DOCSAGE_BIND            Proxy listen address (serve)
  DOCSAGE_UPSTREAM        Upstream summarisation service base URL (serve)
  DOCSAGE_PROXY           Proxy base URL used by summarize
  DOCSAGE_STYLE           PDF style sent with each upload
  RUST_LOG                Overrides the log filter, e.g. RUST_LOG=docsage=debug
"#;

/// Summarise documents through a local proxy to a summarisation service.
#[derive(Parser, Debug)]
#[command(
    name = "docsage",
    version,
    about = "Summarise documents through a local proxy to a summarisation service",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "DOCSAGE_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "DOCSAGE_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the proxy server until Ctrl-C.
    Serve {
        /// Address to listen on.
        #[arg(long, env = "DOCSAGE_BIND", default_value = docsage::config::DEFAULT_BIND_ADDR)]
        bind: String,

        /// Base URL of the upstream summarisation service.
        #[arg(
            long,
            env = "DOCSAGE_UPSTREAM",
            default_value = docsage::config::DEFAULT_UPSTREAM_URL
        )]
        upstream: String,

        /// Largest request body the proxy accepts, in bytes.
        #[arg(long, env = "DOCSAGE_MAX_BODY_BYTES")]
        max_body_bytes: Option<usize>,
    },

    /// Check files against the type and size rules without uploading.
    Validate {
        /// Files to check.
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Upload a document, print its summary and optionally save the PDF.
    Summarize {
        /// Document to summarise. Extra files are validated but not submitted.
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Base URL of the docsage proxy.
        #[arg(long, env = "DOCSAGE_PROXY", default_value = docsage::config::DEFAULT_PROXY_URL)]
        proxy: String,

        /// PDF style: minimal, aesthetic, elegant, academic.
        #[arg(long, env = "DOCSAGE_STYLE", default_value = "elegant")]
        style: PdfStyle,

        /// Also download the summary PDF, saved as summary_<Style>.pdf.
        #[arg(long, value_name = "STYLE")]
        download: Option<PdfStyle>,

        /// Directory the downloaded PDF is written to.
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        /// Print the summary as JSON instead of text.
        #[arg(long)]
        json: bool,

        /// Print the summary as Markdown instead of text.
        #[arg(long, conflicts_with = "json")]
        markdown: bool,

        /// Disable progress bars.
        #[arg(long, env = "DOCSAGE_NO_PROGRESS")]
        no_progress: bool,

        /// Print all sections at once instead of one after another.
        #[arg(long)]
        no_animation: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Library INFO logs would interleave with the progress bars, so only the
    // server and verbose runs show them by default.
    let is_server = matches!(cli.command, Command::Serve { .. });
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || !is_server {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Serve {
            bind,
            upstream,
            max_body_bytes,
        } => {
            let mut builder = ProxyConfig::builder().bind_addr(bind).upstream_url(upstream);
            if let Some(n) = max_body_bytes {
                builder = builder.max_body_bytes(n);
            }
            let config = builder.build().context("Invalid proxy configuration")?;
            if !cli.quiet {
                eprintln!(
                    "{} {} {} {}",
                    cyan("◆"),
                    bold(&format!("Proxy on http://{}", config.bind_addr)),
                    dim("→"),
                    config.upstream_url
                );
            }
            serve(config).await.context("Proxy server failed")?;
            Ok(())
        }
        Command::Validate { files } => run_validate(&files, cli.quiet),
        Command::Summarize {
            files,
            proxy,
            style,
            download,
            out_dir,
            json,
            markdown,
            no_progress,
            no_animation,
        } => {
            let opts = SummarizeOpts {
                proxy,
                style,
                download,
                out_dir,
                json,
                markdown,
                show_progress: !cli.quiet && !no_progress && !json,
                animate: !no_animation && !json && !markdown,
                quiet: cli.quiet,
            };
            run_summarize(&files, opts).await
        }
    }
}

// ── validate ─────────────────────────────────────────────────────────────────

fn run_validate(files: &[PathBuf], quiet: bool) -> Result<()> {
    let mut rejected = 0usize;

    for path in files {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let size = std::fs::metadata(path)
            .with_context(|| format!("Failed to stat {}", path.display()))?
            .len();

        match validate_parts(&name, size) {
            Ok(()) => {
                if !quiet {
                    println!("  {} {}  {}", green("✓"), name, dim(&format_size(size)));
                }
            }
            Err(e) => {
                rejected += 1;
                println!("  {} {}  {}", red("✗"), name, red(&e.to_string()));
            }
        }
    }

    if rejected > 0 {
        bail!(
            "{rejected} of {} file(s) rejected (accepted: .{}, max {MAX_UPLOAD_MB} MB)",
            files.len(),
            ALLOWED_EXTENSIONS.join(" .")
        );
    }
    Ok(())
}

// ── summarize ────────────────────────────────────────────────────────────────

struct SummarizeOpts {
    proxy: String,
    style: PdfStyle,
    download: Option<PdfStyle>,
    out_dir: PathBuf,
    json: bool,
    markdown: bool,
    show_progress: bool,
    animate: bool,
    quiet: bool,
}

async fn run_summarize(files: &[PathBuf], opts: SummarizeOpts) -> Result<()> {
    let config = ClientConfig::builder()
        .proxy_url(&opts.proxy)
        .style(opts.style)
        .build()
        .context("Invalid client configuration")?;

    let notifications = NotificationCenter::default();
    let mut toasts = notifications.subscribe();
    let client = SummaryClient::new(config.clone()).context("Failed to create HTTP client")?;
    let workspace = Workspace::new(client, notifications);

    let callback: ProgressCallback = if opts.show_progress {
        CliProgressCallback::new() as ProgressCallback
    } else {
        Arc::new(PlainProgressCallback) as ProgressCallback
    };
    let mut session =
        UploadSession::new(&config, Some(callback), Some(workspace.selection_observer()));

    // ── Select ───────────────────────────────────────────────────────────
    let candidates = files
        .iter()
        .map(|p| {
            CandidateFile::from_path(p).with_context(|| format!("Cannot open {}", p.display()))
        })
        .collect::<Result<Vec<_>>>()?;
    session.add(candidates);

    if session.is_empty() {
        bail!("No acceptable file to summarise");
    }
    while !session.all_complete() {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    let current = workspace.current_file().context("No file selected")?;
    if session.len() > 1 && !opts.quiet {
        eprintln!(
            "{} only '{}' is submitted; {} other file(s) ignored",
            cyan("⚠"),
            current.name(),
            session.len() - 1
        );
    }

    // ── Submit ───────────────────────────────────────────────────────────
    let started = Instant::now();
    let bar = (!opts.quiet && !opts.json)
        .then(|| spinner(&format!("Summarising {}…", current.name())));
    let outcome = workspace.submit().await;
    if let Some(bar) = bar {
        bar.finish_and_clear();
    }
    print_toasts(&mut toasts, opts.quiet);
    let result = outcome.context("Summarisation failed")?;

    if !opts.quiet && !opts.json {
        eprintln!(
            "{} {} sections in {:.1}s",
            green("✔"),
            bold(&result.summary.len().to_string()),
            started.elapsed().as_secs_f64()
        );
    }

    // ── Render ───────────────────────────────────────────────────────────
    if opts.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&result).context("Failed to serialise summary")?
        );
    } else if opts.markdown {
        print!("{}", render_markdown(&result.summary));
    } else {
        let blocks = render_blocks(&result.summary);
        let schedule = stagger_schedule(blocks.len(), SECTION_STAGGER);
        let t0 = tokio::time::Instant::now();
        for (block, delay) in blocks.iter().zip(schedule) {
            if opts.animate {
                tokio::time::sleep_until(t0 + delay).await;
            }
            println!("{}", bold(&block.title));
            for point in &block.points {
                println!("  {} {point}", cyan("•"));
            }
            println!();
        }
    }

    // ── Download ─────────────────────────────────────────────────────────
    if let Some(style) = opts.download {
        tokio::fs::create_dir_all(&opts.out_dir)
            .await
            .with_context(|| format!("Failed to create {}", opts.out_dir.display()))?;
        let outcome = workspace.download(style.label(), &opts.out_dir).await;
        print_toasts(&mut toasts, opts.quiet);
        let path = outcome.context("Download failed")?;
        if !opts.quiet {
            eprintln!("{}  →  {}", green("✔"), bold(&path.display().to_string()));
        }
    }

    Ok(())
}

/// Drain and print every toast published since the last call.
fn print_toasts(rx: &mut broadcast::Receiver<Toast>, quiet: bool) {
    loop {
        match rx.try_recv() {
            Ok(toast) => {
                if quiet && !toast.is_destructive() {
                    continue;
                }
                let marker = if toast.is_destructive() {
                    red("✘")
                } else {
                    cyan("◆")
                };
                eprintln!("{marker} {}  {}", bold(&toast.title), dim(&toast.description));
            }
            Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
            Err(_) => break,
        }
    }
}
