use std::collections::HashMap;
use std::time::Duration;

use clap::{error::ErrorKind, CommandFactory, Parser};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::{io::AsyncBufReadExt, io::BufReader};
use tracing::debug;

use crate::cli::args::CliArgs;
use crate::cli::validation;
use crate::config::{self, CardOptions, ConfigFile};
use crate::dataset::{self, DatasetSource, DEFAULT_DATASET};
use crate::model::{Dimension, FacetConfig, Intent, SortMode};
use crate::output::{self, OutputFormat};
use crate::session::command::HELP;
use crate::session::{parse_command, parse_filter_spec, Command, Session};
use crate::view::{RenderedView, LOADING_STATUS};

fn print_banner(no_color: bool) {
    const BANNER: &str = r#"
                                       _     __
    ____  ____ _____ ____  ____ ______(_)___/ /
   / __ \/ __ `/ __ `/ _ \/ __ `/ ___/ / __  /
  / /_/ / /_/ / /_/ /  __/ /_/ / /  / / /_/ /
 / .___/\__,_/\__, /\___/\__, /_/  /_/\__,_/
/_/          /____/     /____/
       v0.1.0 - faceted catalog browser
    "#;
    if no_color {
        print!("{}", BANNER);
    } else {
        print!("{}", BANNER.cyan());
    }
    println!();
}

fn format_kv_line(label: &str, value: &str) {
    println!(":: {:<10}: {}", label, value);
}

fn render_custom_help() -> String {
    let cmd = CliArgs::command();
    let mut out = String::new();

    out.push_str(cmd.get_name());
    if let Some(version) = cmd.get_version() {
        out.push(' ');
        out.push_str(version);
    }
    out.push('\n');

    if let Some(about) = cmd.get_about() {
        out.push_str(&about.to_string());
        out.push('\n');
    }

    if let Some(long_about) = cmd.get_long_about() {
        out.push('\n');
        out.push_str(&long_about.to_string());
        out.push('\n');
    }

    out.push('\n');
    out.push_str("Usage: ");
    out.push_str(cmd.get_name());
    out.push_str(" [OPTIONS]\n\n");

    let mut sections: Vec<(String, Vec<&clap::Arg>)> = Vec::new();
    let mut section_idx: HashMap<String, usize> = HashMap::new();

    for arg in cmd.get_arguments() {
        if arg.is_hide_set() {
            continue;
        }
        let heading = arg.get_help_heading().unwrap_or("Options").to_string();
        let idx = match section_idx.get(&heading).copied() {
            Some(i) => i,
            None => {
                sections.push((heading.clone(), Vec::new()));
                let i = sections.len() - 1;
                section_idx.insert(heading, i);
                i
            }
        };
        sections[idx].1.push(arg);
    }

    for (heading, args) in sections {
        out.push_str(&heading);
        out.push_str(":\n");

        for arg in args {
            let mut parts: Vec<String> = Vec::new();
            if let Some(short) = arg.get_short() {
                parts.push(format!("-{short}"));
            }
            if let Some(long) = arg.get_long() {
                parts.push(format!("--{long}"));
            }
            if let Some(aliases) = arg.get_visible_aliases() {
                for alias in aliases {
                    let rendered = format!("--{alias}");
                    if !parts.iter().any(|p| p == &rendered) {
                        parts.push(rendered);
                    }
                }
            }

            let mut flags = parts.join(", ");
            if arg.get_action().takes_values() {
                let value_name = arg
                    .get_value_names()
                    .and_then(|names| names.first())
                    .map(|name| name.as_str())
                    .unwrap_or("VALUE");
                flags.push_str(&format!(" <{value_name}>"));
            }

            out.push_str("  ");
            out.push_str(&flags);
            out.push('\n');

            if let Some(help) = arg.get_help() {
                let help = help.to_string();
                if !help.trim().is_empty() {
                    out.push_str("          ");
                    out.push_str(help.trim());
                    out.push('\n');
                }
            }
            out.push('\n');
        }
    }

    out
}

fn summarize_filters(filters: &[(Dimension, String)]) -> String {
    if filters.is_empty() {
        return "none".to_string();
    }
    filters
        .iter()
        .map(|(d, v)| format!("{}={}", d.key(), v))
        .collect::<Vec<_>>()
        .join(", ")
}

fn verbosity_directive(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Diagnostics go to stderr so rendered output on stdout stays clean.
fn init_tracing(verbose: u8) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(verbosity_directive(verbose)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Debug)]
struct RunConfig {
    dataset: DatasetSource,
    timeout: u64,
    sort: SortMode,
    filters: Vec<(Dimension, String)>,
    output: Option<String>,
    output_format: OutputFormat,
    interactive: bool,
    no_color: bool,
    verbose: u8,
    facets: FacetConfig,
    cards: CardOptions,
}

impl RunConfig {
    /// Banner and summary lines only when stdout is not carrying a
    /// machine-readable document.
    fn show_chrome(&self) -> bool {
        self.interactive || self.output.is_some() || self.output_format == OutputFormat::Text
    }
}

fn build_run_config(args: CliArgs, cfg: ConfigFile) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let no_color = if args.color {
        false
    } else {
        args.no_color || cfg.no_color.unwrap_or(false)
    };

    let dataset_raw = args
        .dataset
        .or_else(|| cfg.dataset.clone())
        .unwrap_or_else(|| DEFAULT_DATASET.to_string());
    if dataset_raw.trim().is_empty() {
        return Err("dataset path must not be empty".to_string());
    }
    let dataset = DatasetSource::parse(&dataset_raw);

    let timeout = args.timeout.or(cfg.timeout).unwrap_or(10);
    if timeout == 0 {
        return Err("invalid timeout, expected positive integer".to_string());
    }

    let sort = match args.sort.or_else(|| cfg.sort.clone()) {
        Some(raw) => SortMode::parse(&raw)
            .ok_or_else(|| format!("invalid sort '{raw}', expected relevant or newest"))?,
        None => SortMode::default(),
    };

    let filter_specs = if args.filter.is_empty() {
        cfg.filters.clone().unwrap_or_default()
    } else {
        args.filter
    };
    let filters = filter_specs
        .iter()
        .map(|raw| parse_filter_spec(raw).map_err(|e| format!("invalid filter '{raw}': {e}")))
        .collect::<Result<Vec<_>, String>>()?;

    let interactive = args.interactive;
    let output = if interactive {
        None
    } else {
        args.output
            .or_else(|| cfg.output.clone())
            .filter(|p| !p.trim().is_empty())
            .map(|p| config::expand_tilde_string(&p))
    };

    let output_format = match args.output_format.or_else(|| cfg.output_format.clone()) {
        Some(raw) => OutputFormat::parse(&raw)
            .ok_or_else(|| format!("invalid output format '{raw}', expected text, json, xml or html"))?,
        None => output
            .as_deref()
            .and_then(output::infer_format_from_path)
            .unwrap_or(OutputFormat::Text),
    };
    let output_format = if interactive {
        OutputFormat::Text
    } else {
        output_format
    };

    let facets = cfg
        .facet_config()
        .map_err(|e| format!("invalid config: {e}"))?;
    let cards = cfg.card_options();

    Ok(RunConfig {
        dataset,
        timeout,
        sort,
        filters,
        output,
        output_format,
        interactive,
        no_color,
        verbose: args.verbose,
        facets,
        cards,
    })
}

async fn emit(view: &RenderedView, format: OutputFormat, path: Option<&str>) -> Result<(), String> {
    let rendered = output::render(view, format);
    match path {
        Some(outfile_path) => {
            let mut outfile = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(outfile_path)
                .await
                .map_err(|e| format!("failed to open output file: {e}"))?;
            outfile
                .write_all(&rendered)
                .await
                .map_err(|_| "failed to write output file".to_string())?;
            format_kv_line("Saved", outfile_path);
        }
        None => {
            print!("{}", String::from_utf8_lossy(&rendered));
            if format != OutputFormat::Text {
                println!();
            }
        }
    }
    Ok(())
}

fn prompt() {
    print!("{} ", "pagegrid>".bold());
    let _ = std::io::Write::flush(&mut std::io::stdout());
}

async fn interactive_loop(session: &mut Session) -> Result<(), String> {
    println!(":: type 'help' for commands, 'quit' to leave");
    print!("{}", output::render_text(&session.view()));

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();
    loop {
        prompt();
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => return Err(format!("failed to read command: {e}")),
        };
        if line.trim().is_empty() {
            continue;
        }
        match parse_command(&line) {
            Ok(Command::Quit) => break,
            Ok(Command::Help) => println!("{HELP}"),
            Ok(Command::Show) => print!("{}", output::render_text(&session.view())),
            Ok(Command::Facets) => print!("{}", output::render_facets_text(&session.view())),
            Ok(Command::Intent(intent)) => {
                debug!("intent {:?}", intent);
                session.dispatch(&intent);
                print!("{}", output::render_text(&session.view()));
            }
            Err(e) => println!(":: {}", e.to_string().yellow()),
        }
    }
    Ok(())
}

/// Session with the configured filters checked and sort applied, ready for
/// the dataset to arrive.
fn startup_session(run: &RunConfig) -> Session {
    let mut session = Session::new(run.facets.clone(), run.cards.clone());
    for (dimension, value) in run.filters.iter() {
        session.dispatch(&Intent::Select {
            dimension: *dimension,
            value: value.clone(),
        });
    }
    session.dispatch(&Intent::SetSort(run.sort));
    session
}

async fn run_async(run: RunConfig) -> Result<(), String> {
    if run.no_color {
        colored::control::set_override(false);
    }
    let chrome = run.show_chrome();
    if chrome {
        print_banner(run.no_color);
        format_kv_line("Dataset", &run.dataset.display());
        format_kv_line("Sort", run.sort.label());
        format_kv_line("Filters", &summarize_filters(&run.filters));
        if let Some(path) = run.output.as_deref() {
            format_kv_line("Output", &format!("{path} ({})", run.output_format.label()));
        }
        if run.interactive {
            format_kv_line("Mode", "interactive");
        }
        println!();
    }

    let mut session = startup_session(&run);

    let pb = ProgressBar::new_spinner();
    if chrome {
        pb.set_draw_target(ProgressDrawTarget::stderr());
        pb.set_style(
            ProgressStyle::with_template(":: {spinner} {msg} [{elapsed_precise}]")
                .map_err(|e| format!("failed to build progress bar style: {e}"))?,
        );
        pb.set_message(LOADING_STATUS);
        pb.enable_steady_tick(Duration::from_millis(120));
    } else {
        pb.set_draw_target(ProgressDrawTarget::hidden());
    }

    let result = dataset::load(&run.dataset, Duration::from_secs(run.timeout)).await;
    pb.finish_and_clear();
    let failure = result.as_ref().err().map(|e| e.to_string());
    session.loaded(result);

    if let Some(detail) = failure {
        emit(&session.view(), run.output_format, run.output.as_deref()).await?;
        return Err(detail);
    }
    if chrome {
        format_kv_line("Loaded", &format!("{} entities", session.catalog().len()));
        println!();
    }

    if run.interactive {
        return interactive_loop(&mut session).await;
    }
    emit(&session.view(), run.output_format, run.output.as_deref()).await
}

pub fn run_cli() -> Result<(), String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp => {
                print!("{}", render_custom_help());
                return Ok(());
            }
            ErrorKind::DisplayVersion => {
                let cmd = CliArgs::command();
                print!("{}", cmd.render_version());
                return Ok(());
            }
            _ => return Err(e.to_string()),
        },
    };

    if args.init_config {
        let path = match args.config.as_deref() {
            Some(p) => config::expand_tilde(p),
            None => config::default_config_path()
                .ok_or_else(|| "could not determine home directory".to_string())?,
        };
        if config::ensure_default_config_file(&path)? {
            format_kv_line("Config", &format!("wrote {}", path.display()));
        } else {
            format_kv_line("Config", &format!("{} already exists", path.display()));
        }
        return Ok(());
    }

    let cfg = match args.config.as_deref() {
        Some(path) => config::load_config(&config::expand_tilde(path), false)?,
        None => match config::default_config_path() {
            Some(path) => config::load_config(&path, true)?,
            None => ConfigFile::default(),
        },
    };

    let run = build_run_config(args, cfg)?;
    init_tracing(run.verbose);
    debug!("run config {:?}", run);

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to build runtime: {e}"))?;

    rt.block_on(run_async(run))
}
