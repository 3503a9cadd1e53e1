//! # CLI Module
//!
//! Command-line interface for the TikTok origin detector.
//!
//! ## Usage
//! ```bash
//! # Analyze one file (exit code 0 = TikTok, 1 = not TikTok, 2 = error)
//! tiktok-origin analyze clip.mp4
//!
//! # Full metadata record as JSON
//! tiktok-origin analyze clip.mp4 --output json
//!
//! # Use a specific ffprobe, or none at all
//! tiktok-origin analyze clip.mp4 --ffprobe /opt/ffmpeg/bin/ffprobe
//! tiktok-origin analyze clip.mp4 --no-ffprobe
//!
//! # Scan a folder (preview only), then move detected files
//! tiktok-origin scan ~/Downloads
//! tiktok-origin scan ~/Downloads --move
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tiktok_origin::core::cache::{self, CacheBackend, CacheEntry, SqliteCache, CACHE_FILE_NAME};
use tiktok_origin::core::config::{AnalyzerConfig, BackendConfig, FfprobeConfig, MAX_FFPROBE_TIMEOUT};
use tiktok_origin::core::evidence::{indicator_display_name, Verdict};
use tiktok_origin::core::metadata::BackendStatus;
use tiktok_origin::core::organize::{
    OrganizeCandidate, OrganizeExecutor, OrganizePlan, OrganizePlanner, OrganizeResult, ORGANIZE_DIR_NAME,
};
use tiktok_origin::core::pipeline::{Detection, Detector, EXIT_FATAL};
use tiktok_origin::core::scanner::{MediaFile, ScanConfig, WalkDirScanner};
use tiktok_origin::error::{DetectorError, Result};
use tracing::warn;

/// TikTok Origin - Was this file downloaded from TikTok?
#[derive(Parser, Debug)]
#[command(name = "tiktok-origin")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze a single image or video
    Analyze {
        /// File to analyze
        file: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,

        #[command(flatten)]
        analyzer: AnalyzerArgs,
    },

    /// Analyze every media file in a folder
    Scan {
        /// Directory to scan
        directory: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,

        #[command(flatten)]
        scan: ScanArgs,

        #[command(flatten)]
        analyzer: AnalyzerArgs,
    },
}

/// Options for the `scan` command
#[derive(Args, Debug)]
struct ScanArgs {
    /// Include hidden files and directories
    #[arg(long)]
    include_hidden: bool,

    /// Maximum directory depth
    #[arg(long)]
    max_depth: Option<usize>,

    /// Follow symbolic links while walking
    #[arg(long)]
    follow_symlinks: bool,

    /// Only scan these extensions (comma separated)
    #[arg(long, value_name = "EXT", value_delimiter = ',')]
    extensions: Option<Vec<String>>,

    /// Move detected files into tiktok_detection/<verdict>/ instead of previewing
    #[arg(long = "move")]
    move_files: bool,

    /// Cache database [default: <DIRECTORY>/tiktok_detection/scan_cache.db]
    #[arg(long, value_name = "PATH", conflicts_with = "no_cache")]
    cache: Option<PathBuf>,

    /// Re-analyze files even if they were cached as UNLIKELY
    #[arg(long)]
    no_cache: bool,
}

impl ScanArgs {
    fn scan_config(&self, directory: &Path) -> ScanConfig {
        ScanConfig {
            follow_symlinks: self.follow_symlinks,
            include_hidden: self.include_hidden,
            max_depth: self.max_depth,
            extensions: self.extensions.clone(),
            exclude: vec![directory.join(ORGANIZE_DIR_NAME)],
        }
    }

    fn cache_path(&self, directory: &Path) -> Option<PathBuf> {
        if self.no_cache {
            return None;
        }
        Some(
            self.cache
                .clone()
                .unwrap_or_else(|| directory.join(ORGANIZE_DIR_NAME).join(CACHE_FILE_NAME)),
        )
    }
}

/// Options shared by every command that runs the detector
#[derive(Args, Debug)]
struct AnalyzerArgs {
    /// ffprobe executable to use
    #[arg(long, value_name = "PATH", conflicts_with = "no_ffprobe")]
    ffprobe: Option<PathBuf>,

    /// Do not run ffprobe
    #[arg(long)]
    no_ffprobe: bool,

    /// Seconds before a hung ffprobe is abandoned
    #[arg(long, value_name = "SECS", default_value = "30")]
    ffprobe_timeout: f64,

    /// Do not read EXIF data
    #[arg(long)]
    no_exif: bool,

    /// Do not read MP4/MOV atoms natively
    #[arg(long)]
    no_container_tags: bool,

    /// Header bytes to capture
    #[arg(long, default_value = "512")]
    header_bytes: usize,

    /// Bytes scanned for printable strings
    #[arg(long, default_value = "1048576")]
    max_search_bytes: usize,

    /// Shortest printable run counted as a string
    #[arg(long, default_value = "4")]
    min_string_length: usize,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl AnalyzerArgs {
    fn to_config(&self) -> Result<AnalyzerConfig> {
        if !self.ffprobe_timeout.is_finite() || self.ffprobe_timeout <= 0.0 {
            return Err(DetectorError::Config(format!(
                "--ffprobe-timeout must be a positive number of seconds, got {}",
                self.ffprobe_timeout
            )));
        }
        if self.ffprobe_timeout > MAX_FFPROBE_TIMEOUT.as_secs_f64() {
            return Err(DetectorError::Config(format!(
                "--ffprobe-timeout must be at most {} seconds, got {}",
                MAX_FFPROBE_TIMEOUT.as_secs(),
                self.ffprobe_timeout
            )));
        }
        if self.min_string_length == 0 {
            return Err(DetectorError::Config(
                "--min-string-length must be at least 1".to_string(),
            ));
        }

        let ffprobe = (!self.no_ffprobe).then(|| {
            let config = FfprobeConfig::default().timeout(Duration::from_secs_f64(self.ffprobe_timeout));
            match &self.ffprobe {
                Some(program) => config.program(program),
                None => config,
            }
        });

        Ok(AnalyzerConfig::new()
            .header_bytes(self.header_bytes)
            .max_search_bytes(self.max_search_bytes)
            .min_string_length(self.min_string_length)
            .backends(
                BackendConfig::default()
                    .exif(!self.no_exif)
                    .container_tags(!self.no_container_tags)
                    .ffprobe(ffprobe),
            ))
    }

    fn detector(&self) -> Result<Detector> {
        Detector::builder().config(self.to_config()?).build()
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
}

/// Run the CLI
pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let (verbose, result) = match cli.command {
        Commands::Analyze {
            file,
            output,
            analyzer,
        } => (analyzer.verbose, run_analyze(&file, output, &analyzer)),
        Commands::Scan {
            directory,
            output,
            scan,
            analyzer,
        } => (analyzer.verbose, run_scan(&directory, output, &scan, &analyzer)),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            let term = Term::stderr();
            term.write_line(&format!("{} {}", style("Error:").red().bold(), e)).ok();
            if verbose {
                let mut source = std::error::Error::source(&e);
                while let Some(cause) = source {
                    term.write_line(&format!("  {} {}", style("caused by:").dim(), cause)).ok();
                    source = cause.source();
                }
            }
            ExitCode::from(EXIT_FATAL)
        }
    }
}

fn run_analyze(file: &Path, output: OutputFormat, args: &AnalyzerArgs) -> Result<u8> {
    tiktok_origin::init_tracing(args.verbose);
    let detector = args.detector()?;
    let detection = detector.detect(file)?;

    match output {
        OutputFormat::Pretty => print_detection(&Term::stdout(), &detection, args.verbose),
        OutputFormat::Json => print_json(&detection)?,
    }

    Ok(detection.exit_code())
}

fn print_detection(term: &Term, detection: &Detection, verbose: bool) {
    let analysis = &detection.tiktok_analysis;
    let record = &detection.record;

    term.write_line(&format!(
        "{} {}",
        style("Analyzing:").bold(),
        record.file_info.filename
    ))
    .ok();
    term.write_line(&"-".repeat(50)).ok();

    term.write_line(&format!(
        "{} {}",
        style("Result:").bold(),
        verdict_style(analysis.verdict, &analysis.verdict_label)
    ))
    .ok();
    term.write_line(&format!(
        "{} {}/100",
        style("Confidence:").bold(),
        style(analysis.confidence_score).cyan()
    ))
    .ok();

    if !analysis.evidence_found.is_empty() {
        term.write_line("").ok();
        term.write_line(&format!(
            "{} ({} items)",
            style("Evidence").bold().underlined(),
            analysis.evidence_found.len()
        ))
        .ok();
        for (i, evidence) in analysis.evidence_found.iter().enumerate() {
            term.write_line(&format!("  {}. {}", i + 1, evidence)).ok();
        }
    }

    let identifiers: Vec<_> = analysis
        .indicators
        .iter()
        .filter_map(|(key, value)| indicator_display_name(key).map(|name| (name, value)))
        .collect();
    if !identifiers.is_empty() {
        term.write_line("").ok();
        term.write_line(&format!("{}", style("Key Identifiers").bold().underlined()))
            .ok();
        for (name, value) in identifiers {
            term.write_line(&format!("  • {}: {}", name, value)).ok();
        }
    }

    if verbose {
        term.write_line("").ok();
        term.write_line(&format!("{}", style("Backends").bold().underlined()))
            .ok();
        for (kind, status) in &record.backend_status {
            let status = match status {
                BackendStatus::Ok => style("ok".to_string()).green(),
                BackendStatus::NoData => style("no data".to_string()).dim(),
                BackendStatus::Unavailable { reason } => style(format!("unavailable ({})", reason)).yellow(),
                BackendStatus::Failed { error } => style(format!("failed ({})", error)).red(),
            };
            term.write_line(&format!("  {:<15} {}", kind, status)).ok();
        }
        term.write_line(&format!(
            "  {:<15} {}",
            "size",
            record.file_info.size_human
        ))
        .ok();
        term.write_line(&format!("  {:<15} {}", "md5", record.file_info.md5_hash))
            .ok();
        term.write_line(&format!("  {:<15} {}", "magic", record.hex_header.magic_number))
            .ok();
    }
}

fn verdict_style(verdict: Verdict, label: &str) -> console::StyledObject<String> {
    let styled = style(label.to_string()).bold();
    match verdict {
        Verdict::Confirmed | Verdict::Likely => styled.green(),
        Verdict::Possible => styled.yellow(),
        Verdict::Unlikely => styled.dim(),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(|e| DetectorError::Output(e.to_string()))?;
    println!("{}", json);
    Ok(())
}

/// Per-verdict tallies for a folder scan
#[derive(Debug, Default, Serialize, PartialEq, Eq)]
struct ScanSummary {
    total: usize,
    confirmed: usize,
    likely: usize,
    possible: usize,
    unlikely: usize,
    /// Unchanged files skipped because they scored UNLIKELY before
    skipped_cached: usize,
    errors: usize,
}

impl ScanSummary {
    fn tally<'a>(outcomes: impl IntoIterator<Item = &'a ScanOutcome>) -> Self {
        let mut summary = Self::default();
        for outcome in outcomes {
            summary.total += 1;
            if outcome.cached {
                summary.skipped_cached += 1;
                continue;
            }
            match outcome.verdict {
                Some(Verdict::Confirmed) => summary.confirmed += 1,
                Some(Verdict::Likely) => summary.likely += 1,
                Some(Verdict::Possible) => summary.possible += 1,
                Some(Verdict::Unlikely) => summary.unlikely += 1,
                None => summary.errors += 1,
            }
        }
        summary
    }
}

/// One file's outcome in a folder scan
#[derive(Debug, Serialize)]
struct ScanOutcome {
    path: PathBuf,
    size: u64,
    verdict: Option<Verdict>,
    confidence_score: Option<u32>,
    evidence_found: Vec<String>,
    error: Option<String>,
    /// Taken from the scan cache instead of analyzed
    cached: bool,
}

impl ScanOutcome {
    fn new(file: &MediaFile, result: Result<Detection>) -> Self {
        match result {
            Ok(detection) => Self {
                path: file.path.clone(),
                size: file.size,
                verdict: Some(detection.tiktok_analysis.verdict),
                confidence_score: Some(detection.tiktok_analysis.confidence_score),
                evidence_found: detection.tiktok_analysis.evidence_found,
                error: None,
                cached: false,
            },
            Err(e) => Self {
                path: file.path.clone(),
                size: file.size,
                verdict: None,
                confidence_score: None,
                evidence_found: Vec::new(),
                error: Some(e.to_string()),
                cached: false,
            },
        }
    }

    fn from_cache(file: &MediaFile, entry: &CacheEntry) -> Self {
        Self {
            path: file.path.clone(),
            size: file.size,
            verdict: Some(entry.verdict),
            confidence_score: Some(entry.confidence_score),
            evidence_found: Vec::new(),
            error: None,
            cached: true,
        }
    }

    fn candidate(&self) -> Option<OrganizeCandidate> {
        Some(OrganizeCandidate {
            path: self.path.clone(),
            size_bytes: self.size,
            verdict: self.verdict?,
            confidence_score: self.confidence_score.unwrap_or_default(),
        })
    }
}

/// What happened to detected files
#[derive(Debug, Serialize)]
struct OrganizeReport {
    /// `false` when the plan is only a preview
    moved: bool,
    plan: OrganizePlan,
    result: Option<OrganizeResult>,
}

#[derive(Debug, Serialize)]
struct ScanReport {
    directory: PathBuf,
    summary: ScanSummary,
    files: Vec<ScanOutcome>,
    organize: OrganizeReport,
}

fn progress_bar(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░"),
    );
    pb
}

fn open_cache(path: Option<PathBuf>) -> Option<SqliteCache> {
    let path = path?;
    match SqliteCache::open(&path) {
        Ok(cache) => Some(cache),
        Err(e) => {
            warn!(error = %e, "Continuing without the scan cache");
            None
        }
    }
}

/// An unchanged file that scored UNLIKELY last time
fn cached_entry(cache: &dyn CacheBackend, file: &MediaFile) -> Option<CacheEntry> {
    cache::lookup(cache, file).unwrap_or_else(|e| {
        warn!(path = %file.path.display(), error = %e, "Cache lookup failed");
        None
    })
}

fn remember(cache: &dyn CacheBackend, file: &MediaFile, detection: &Detection) {
    if let Err(e) = cache::record(cache, file, &detection.tiktok_analysis) {
        warn!(path = %file.path.display(), error = %e, "Cache update failed");
    }
}

fn run_scan(directory: &Path, output: OutputFormat, scan: &ScanArgs, args: &AnalyzerArgs) -> Result<u8> {
    tiktok_origin::init_tracing(args.verbose);
    let detector = args.detector()?;
    let term = Term::stderr();

    if matches!(output, OutputFormat::Pretty) {
        term.write_line(&format!(
            "{} {}",
            style("TikTok Origin").bold().cyan(),
            style(format!("v{}", env!("CARGO_PKG_VERSION"))).dim()
        ))
        .ok();
        term.write_line("").ok();
    }

    let found = WalkDirScanner::new(scan.scan_config(directory)).scan(directory)?;
    for error in &found.errors {
        warn!(error = %error, "Scan error");
    }

    let verdict_cache = open_cache(scan.cache_path(directory));
    let pretty = matches!(output, OutputFormat::Pretty);
    let progress = pretty.then(|| progress_bar(found.files.len()));

    // Each detection is independent; results keep walk order
    let files: Vec<ScanOutcome> = found
        .files
        .par_iter()
        .map(|file| {
            let outcome = match verdict_cache.as_ref().and_then(|c| cached_entry(c, file)) {
                Some(entry) => ScanOutcome::from_cache(file, &entry),
                None => {
                    let result = detector.detect(&file.path);
                    if let (Some(c), Ok(detection)) = (&verdict_cache, &result) {
                        remember(c, file, detection);
                    }
                    ScanOutcome::new(file, result)
                }
            };
            if let Some(ref pb) = progress {
                pb.inc(1);
                if args.verbose {
                    pb.set_message(file.path.file_name().unwrap_or_default().to_string_lossy().into_owned());
                }
            }
            outcome
        })
        .collect();

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let plan = OrganizePlanner::for_scan_root(directory).plan(files.iter().filter_map(ScanOutcome::candidate));
    let result = scan.move_files.then(|| {
        let pb = pretty.then(|| progress_bar(plan.files.len()));
        let result = OrganizeExecutor::execute(&plan, |done, _, _| {
            if let Some(ref pb) = pb {
                pb.set_position(done as u64);
            }
        });
        if let Some(pb) = pb {
            pb.finish_and_clear();
        }
        result
    });

    let report = ScanReport {
        directory: directory.to_path_buf(),
        summary: ScanSummary::tally(&files),
        files,
        organize: OrganizeReport {
            moved: scan.move_files,
            plan,
            result,
        },
    };

    match output {
        OutputFormat::Pretty => print_scan_report(&Term::stdout(), &report, args.verbose),
        OutputFormat::Json => print_json(&report)?,
    }

    Ok(0)
}

fn print_scan_report(term: &Term, report: &ScanReport, verbose: bool) {
    let summary = &report.summary;

    term.write_line(&format!("{} Scan Complete", style("✓").green().bold()))
        .ok();
    term.write_line("").ok();
    term.write_line(&format!("  {} files analyzed", style(summary.total).cyan()))
        .ok();
    term.write_line(&format!("  {} confirmed", style(summary.confirmed).green()))
        .ok();
    term.write_line(&format!("  {} likely", style(summary.likely).green()))
        .ok();
    term.write_line(&format!("  {} possible", style(summary.possible).yellow()))
        .ok();
    term.write_line(&format!("  {} unlikely", style(summary.unlikely).dim()))
        .ok();
    if summary.skipped_cached > 0 {
        term.write_line(&format!(
            "  {} skipped (unchanged since they scored UNLIKELY)",
            style(summary.skipped_cached).dim()
        ))
        .ok();
    }
    if summary.errors > 0 {
        term.write_line(&format!("  {} errors", style(summary.errors).red()))
            .ok();
    }
    term.write_line("").ok();

    for outcome in &report.files {
        let show = match outcome.verdict {
            Some(Verdict::Unlikely) => verbose,
            _ => true,
        };
        if !show {
            continue;
        }

        let display_path = outcome
            .path
            .strip_prefix(&report.directory)
            .unwrap_or(&outcome.path)
            .display();

        match (&outcome.verdict, &outcome.error) {
            (Some(verdict), _) => {
                term.write_line(&format!(
                    "  {} {} ({}){}",
                    verdict_style(*verdict, verdict.name()),
                    display_path,
                    outcome.confidence_score.unwrap_or_default(),
                    if outcome.cached { " cached" } else { "" }
                ))
                .ok();
                if verbose {
                    for evidence in &outcome.evidence_found {
                        term.write_line(&format!("      {}", style(evidence).dim())).ok();
                    }
                }
            }
            (None, Some(error)) => {
                term.write_line(&format!("  {} {} {}", style("ERROR").red(), display_path, style(error).dim()))
                    .ok();
            }
            (None, None) => {}
        }
    }

    term.write_line("").ok();
    print_organize_report(term, &report.organize, &report.directory);
}

fn print_organize_report(term: &Term, organize: &OrganizeReport, directory: &Path) {
    let plan = &organize.plan;
    let relative = |path: &Path| path.strip_prefix(directory).unwrap_or(path).display().to_string();

    match &organize.result {
        Some(result) => {
            term.write_line(&format!(
                "{} Moved {} files into {}",
                style("✓").green().bold(),
                style(result.files_moved).cyan(),
                plan.target_root.display()
            ))
            .ok();
            if result.folders_created > 0 {
                term.write_line(&format!("  {} folders created", result.folders_created))
                    .ok();
            }
            for error in &result.errors {
                term.write_line(&format!("  {} {}", style("ERROR").red(), error)).ok();
            }
        }
        None if plan.files.is_empty() => {
            term.write_line(&format!("{}", style("No files were modified.").dim()))
                .ok();
        }
        None => {
            term.write_line(&format!(
                "{} {} files would be moved into {}",
                style("Preview:").bold(),
                style(plan.files.len()).cyan(),
                plan.target_root.display()
            ))
            .ok();
            for planned in &plan.files {
                term.write_line(&format!(
                    "  {} {} -> {}",
                    verdict_style(planned.verdict, planned.verdict.name()),
                    relative(&planned.source),
                    relative(&planned.destination)
                ))
                .ok();
            }
            term.write_line("").ok();
            term.write_line(&format!(
                "{}",
                style("No files were modified. Run again with --move to organize them.").dim()
            ))
            .ok();
        }
    }
}
