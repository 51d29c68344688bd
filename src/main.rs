use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use miette::{miette, IntoDiagnostic, Result, WrapErr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use jarlens::artifacts::{ArtifactResolver, Coordinates, StaticResolver};
use jarlens::discovery::ArchiveFinder;
use jarlens::loader::{ClasspathBuilder, Source};
use jarlens::report::{ReportFormat, Reporter};
use jarlens::{ClasspathAnalyzer, Config, ResolutionChain, Strategy};

/// jarlens - Audit JVM classpaths: duplicate classes, split packages,
/// unresolved classes and dependencies between archives
#[derive(Parser, Debug)]
#[command(name = "jarlens")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JAR, WAR or JMOD files, or directories containing them
    inputs: Vec<PathBuf>,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Patterns to exclude when scanning directories (can be specified multiple times)
    #[arg(short, long)]
    exclude: Vec<String>,

    /// Artifacts to download from the configured repository (group:artifact:version)
    #[arg(short, long, value_name = "COORDINATES")]
    artifact: Vec<String>,

    /// Runtime image archives or directories, e.g. $JAVA_HOME/jmods
    #[arg(long, value_name = "PATH")]
    runtime: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<ReportFormat>,

    /// Output file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Class lookup order between the classpath and the runtime
    #[arg(long, value_enum)]
    strategy: Option<Strategy>,

    /// Highest Java release considered in multi-release JAR files
    #[arg(long, value_name = "RELEASE")]
    max_release: Option<u32>,

    /// Worker threads for loading archives (0 = one per CPU)
    #[arg(short = 'j', long)]
    threads: Option<usize>,

    /// Do not extract class references (disables dependency analysis)
    #[arg(long)]
    no_references: bool,

    /// Show report sections without findings
    #[arg(long)]
    show_empty: bool,

    /// Exit with status 1 if any classpath issue is found
    #[arg(long)]
    fail_on_issues: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode - only output results
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose, cli.quiet);

    info!("jarlens v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = load_config(&cli)?;

    let issues = run_analysis(&config, &cli)?;

    if cli.fail_on_issues && issues > 0 {
        std::process::exit(1);
    }

    Ok(())
}

fn init_logging(verbose: bool, quiet: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)?
    } else {
        let cwd = std::env::current_dir().into_diagnostic()?;
        Config::from_default_locations(&cwd)?
    };

    // Override with CLI arguments
    if !cli.inputs.is_empty() {
        config.sources = cli.inputs.clone();
    }
    if !cli.exclude.is_empty() {
        config.exclude.extend(cli.exclude.clone());
    }
    if !cli.runtime.is_empty() {
        config.runtime.archives = cli.runtime.clone();
    }
    if let Some(strategy) = cli.strategy {
        config.loader.strategy = strategy;
    }
    if let Some(max_release) = cli.max_release {
        config.loader.max_release = max_release;
    }
    if let Some(threads) = cli.threads {
        config.loader.threads = threads;
    }
    if cli.no_references {
        config.loader.scan_references = false;
        config.analysis.jar_dependencies = false;
        config.analysis.unresolved_classes = false;
        config.analysis.illegal_access = false;
        config.analysis.member_references = false;
    }
    if let Some(format) = cli.format {
        config.report.format = match format {
            ReportFormat::Terminal => "terminal".to_string(),
            ReportFormat::Json => "json".to_string(),
        };
    }
    if cli.show_empty {
        config.report.show_empty = true;
    }

    Ok(config)
}

/// Returns the number of issues found
fn run_analysis(config: &Config, cli: &Cli) -> Result<usize> {
    let start_time = Instant::now();

    let resolver = StaticResolver::from_config(&config.artifacts)
        .map_err(|e| miette!(e))
        .wrap_err("Invalid artifact coordinates in config")?;

    // Step 1: Find archives
    let finder = ArchiveFinder::new(config);
    let inputs = if config.sources.is_empty() {
        vec![PathBuf::from(".")]
    } else {
        config.sources.clone()
    };
    let mut sources = finder.find_sources(&inputs);
    for coordinates in &cli.artifact {
        sources.push(download(&resolver, coordinates)?);
    }

    if sources.is_empty() {
        println!("{}", "No JAR, WAR or JMOD files found.".yellow());
        return Ok(0);
    }

    info!("Found {} archives to analyze", sources.len());

    // Step 2: Load archives
    let progress = if cli.quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(sources.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
                .into_diagnostic()?
                .progress_chars("#>-"),
        );
        pb
    };

    let builder = ClasspathBuilder::from_config(config, Arc::new(resolver)).with_progress(progress);
    let classpath = Arc::new(builder.build(&sources));

    // Step 3: Runtime
    let runtime_sources = finder.find_runtime_sources(&finder.runtime_inputs());
    let runtime = Arc::new(builder.build_runtime(&config.runtime, &runtime_sources));
    let chain = ResolutionChain::for_classpath(classpath.clone(), runtime);

    // Step 4: Analyze
    let analyzer = ClasspathAnalyzer::new(&classpath, &chain);
    let report = analyzer.run(&config.analysis);

    // Step 5: Report
    let format: ReportFormat = config.report.format.parse().map_err(|e: String| miette!(e))?;
    Reporter::new(format, cli.output.clone())
        .with_show_empty(config.report.show_empty)
        .report(&report)?;

    info!("Finished in {:?}", start_time.elapsed());

    Ok(report.issue_count())
}

fn download(resolver: &StaticResolver, coordinates: &str) -> Result<Source> {
    let coordinates: Coordinates = coordinates.parse().map_err(|e: String| miette!(e))?;
    let data = resolver
        .download(&coordinates)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to download {}", coordinates))?;

    let file_name = format!("{}-{}.jar", coordinates.artifact, coordinates.version);
    Ok(Source::bytes(file_name, data).with_coordinates(coordinates))
}
