//! CLI entry point for modguard.
//!
//! This module is intentionally thin: it handles argument parsing, I/O, and exit codes.
//! All business logic lives in the `modguard-app` crate.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{ArgAction, Parser, Subcommand};
use modguard_app::{
    CheckInput, ExplainOutput, parse_report_json, render_annotations, render_markdown, run_check,
    run_explain, runtime_error_report, serialize_report, to_renderable, verdict_exit_code,
};
use modguard_settings::Overrides;
use modguard_types::ModguardReport;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    name = "modguard",
    version,
    about = "Policy verifier for untrusted mod assemblies"
)]
struct Cli {
    /// Path to modguard config TOML (a missing file means defaults).
    #[arg(long, default_value = "modguard.toml", global = true)]
    config: Utf8PathBuf,

    /// Override profile (modtool|empty).
    #[arg(long, global = true)]
    profile: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Verify candidate assemblies and write artifacts.
    Check {
        /// Candidate assembly snapshots (files or directories of `*.json`).
        #[arg(required = true)]
        assemblies: Vec<Utf8PathBuf>,

        /// Directory searched for reference assembly snapshots (repeatable).
        #[arg(long = "refs")]
        refs: Vec<Utf8PathBuf>,

        /// Trust an assembly name or glob; its internals are not walked (repeatable).
        #[arg(long = "trust")]
        trust: Vec<String>,

        /// Override the maximum call-graph depth.
        #[arg(long)]
        max_depth: Option<u32>,

        /// Override the maximum number of methods visited per check.
        #[arg(long)]
        max_methods: Option<u32>,

        /// Where to write the JSON report.
        #[arg(long, default_value = "artifacts/modguard/report.json")]
        report_out: Utf8PathBuf,

        /// Write a Markdown report alongside the JSON.
        #[arg(long)]
        write_markdown: bool,

        /// Where to write the Markdown report (if enabled).
        #[arg(long, default_value = "artifacts/modguard/comment.md")]
        markdown_out: Utf8PathBuf,
    },

    /// Render markdown from an existing JSON report.
    Md {
        /// Path to the JSON report file.
        #[arg(long, default_value = "artifacts/modguard/report.json")]
        report: Utf8PathBuf,

        /// Where to write the Markdown output (if not specified, prints to stdout).
        #[arg(long, short)]
        output: Option<Utf8PathBuf>,
    },

    /// Render GitHub Actions annotations from an existing JSON report.
    Annotations {
        /// Path to the JSON report file.
        #[arg(long, default_value = "artifacts/modguard/report.json")]
        report: Utf8PathBuf,

        /// Maximum number of annotations to emit.
        #[arg(long, default_value = "10")]
        max: usize,
    },

    /// Explain a check_id or code with remediation guidance.
    Explain {
        /// The check_id (e.g., "restriction.member") or code (e.g., "prohibited_present").
        identifier: String,
    },
}

struct CheckArgs {
    assemblies: Vec<Utf8PathBuf>,
    refs: Vec<Utf8PathBuf>,
    trust: Vec<String>,
    max_depth: Option<u32>,
    max_methods: Option<u32>,
    report_out: Utf8PathBuf,
    write_markdown: bool,
    markdown_out: Utf8PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.cmd {
        Commands::Check {
            ref assemblies,
            ref refs,
            ref trust,
            max_depth,
            max_methods,
            ref report_out,
            write_markdown,
            ref markdown_out,
        } => cmd_check(
            &cli,
            CheckArgs {
                assemblies: assemblies.clone(),
                refs: refs.clone(),
                trust: trust.clone(),
                max_depth,
                max_methods,
                report_out: report_out.clone(),
                write_markdown,
                markdown_out: markdown_out.clone(),
            },
        ),
        Commands::Md { report, output } => cmd_md(report, output),
        Commands::Annotations { report, max } => cmd_annotations(report, max),
        Commands::Explain { identifier } => cmd_explain(&identifier),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::filter::LevelFilter::from_level(level))
        .init();
}

fn cmd_check(cli: &Cli, args: CheckArgs) -> anyhow::Result<()> {
    let result = (|| -> anyhow::Result<i32> {
        // Load config if present; missing file is allowed (defaults apply).
        let cfg_text = match std::fs::read_to_string(&cli.config) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(config = %cli.config, "no config file; using defaults");
                String::new()
            }
            Err(err) => {
                return Err(err).with_context(|| format!("read config: {}", cli.config));
            }
        };

        let overrides = Overrides {
            profile: cli.profile.clone(),
            trusted_assemblies: args.trust.clone(),
            max_depth: args.max_depth,
            max_methods: args.max_methods,
        };

        let output = run_check(CheckInput {
            assemblies: &args.assemblies,
            reference_dirs: &args.refs,
            config_text: &cfg_text,
            overrides,
        })?;

        write_report_file(&args.report_out, &output.report).context("write report json")?;

        if args.write_markdown {
            let renderable = to_renderable(&output.report);
            let md = render_markdown(&renderable);
            write_text_file(&args.markdown_out, &md).context("write markdown")?;
        }

        for assembly in output.report.data.assemblies.iter().filter(|a| !a.accepted) {
            eprintln!(
                "modguard: rejected {} ({} finding(s))",
                assembly.path.as_str(),
                assembly.violations
            );
        }

        Ok(verdict_exit_code(output.report.verdict))
    })();

    match result {
        Ok(code) => {
            if code != 0 {
                std::process::exit(code);
            }
            Ok(())
        }
        Err(err) => {
            let report = runtime_error_report(&format!("{err:#}"));
            let _ = write_report_file(&args.report_out, &report);
            eprintln!("modguard error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn write_report_file(path: &Utf8Path, report: &ModguardReport) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| format!("create directory: {}", parent))?;
    }
    let data = serialize_report(report).context("serialize report")?;
    std::fs::write(path, data).with_context(|| format!("write report: {}", path))?;
    Ok(())
}

fn write_text_file(path: &Utf8Path, text: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| format!("create directory: {}", parent))?;
    }
    std::fs::write(path, text).with_context(|| format!("write text: {}", path))?;
    Ok(())
}

fn cmd_md(report_path: Utf8PathBuf, output: Option<Utf8PathBuf>) -> anyhow::Result<()> {
    let report_text = std::fs::read_to_string(&report_path)
        .with_context(|| format!("read report: {}", report_path))?;
    let report = parse_report_json(&report_text)?;
    let renderable = to_renderable(&report);
    let md = render_markdown(&renderable);

    if let Some(out_path) = output {
        write_text_file(&out_path, &md).context("write markdown output")?;
    } else {
        print!("{}", md);
    }

    Ok(())
}

fn cmd_annotations(report_path: Utf8PathBuf, max: usize) -> anyhow::Result<()> {
    let report_text = std::fs::read_to_string(&report_path)
        .with_context(|| format!("read report: {}", report_path))?;
    let report = parse_report_json(&report_text)?;
    let renderable = to_renderable(&report);

    for annotation in render_annotations(&renderable, max) {
        println!("{}", annotation);
    }

    Ok(())
}

fn cmd_explain(identifier: &str) -> anyhow::Result<()> {
    match run_explain(identifier) {
        ExplainOutput::Found(exp) => {
            print!("{}", modguard_app::format_explanation(&exp));
            Ok(())
        }
        ExplainOutput::NotFound {
            identifier,
            available_check_ids,
            available_codes,
        } => {
            eprint!(
                "{}",
                modguard_app::format_not_found(&identifier, available_check_ids, available_codes)
            );
            std::process::exit(1);
        }
    }
}
