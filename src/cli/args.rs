use clap::{ArgAction, Parser};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "pagegrid",
    version,
    about = "faceted catalog browser for page datasets",
    long_about = "Pagegrid loads a CSV of pages and lets you narrow it down by page type, category and activity, sorted by relevance or date.\n\nExamples:\n  pagegrid -d ./pages.csv\n  pagegrid -d ./pages.csv -f page_type=news -s newest\n  pagegrid -d https://cdn.example/pages.csv -o catalog.html\n  pagegrid -i\n\nTip: Use --config to persist facet and card settings and keep CLI invocations short."
)]
pub struct CliArgs {
    #[arg(
        short = 'v',
        long = "vb",
        visible_alias = "verbose",
        action = ArgAction::Count,
        help_heading = "Output",
        help = "Increase verbosity (-v, -vv)."
    )]
    pub verbose: u8,

    #[arg(
        short = 'c',
        long = "clr",
        visible_alias = "color",
        help_heading = "Output",
        help = "Enable colored output (overrides --no-color)."
    )]
    pub color: bool,

    #[arg(
        short = 'n',
        long = "nc",
        visible_alias = "no-color",
        help_heading = "Output",
        help = "Disable colored output."
    )]
    pub no_color: bool,

    #[arg(
        short = 'o',
        long = "out",
        visible_alias = "output",
        value_name = "FILE",
        help_heading = "Output",
        help = "Write the rendered view to a file instead of stdout."
    )]
    pub output: Option<String>,

    #[arg(
        short = 'A',
        long = "of",
        visible_alias = "output-format",
        value_name = "FORMAT",
        help_heading = "Output",
        help = "Output format: text, json, xml or html (inferred from --output when omitted)."
    )]
    pub output_format: Option<String>,

    #[arg(
        short = 'd',
        long = "ds",
        visible_alias = "dataset",
        value_name = "PATH|URL",
        help_heading = "Input",
        help = "Dataset to load (defaults to ./pages.csv)."
    )]
    pub dataset: Option<String>,

    #[arg(
        short = 'C',
        long = "cfg",
        visible_alias = "config",
        value_name = "FILE",
        help_heading = "Input",
        help = "Path to config file (defaults to ~/.pagegrid/config.yml)."
    )]
    pub config: Option<String>,

    #[arg(
        long = "ic",
        visible_alias = "init-config",
        help_heading = "Input",
        help = "Write a commented default config file and exit."
    )]
    pub init_config: bool,

    #[arg(
        short = 'T',
        long = "to",
        visible_alias = "timeout",
        value_name = "SECONDS",
        help_heading = "Input",
        help = "Timeout for fetching a remote dataset."
    )]
    pub timeout: Option<u64>,

    #[arg(
        short = 'f',
        long = "flt",
        visible_alias = "filter",
        value_name = "DIM=VALUE",
        action = ArgAction::Append,
        help_heading = "View",
        help = "Check a facet value before the first render (repeatable)."
    )]
    pub filter: Vec<String>,

    #[arg(
        short = 's',
        long = "srt",
        visible_alias = "sort",
        value_name = "MODE",
        help_heading = "View",
        help = "Result ordering: relevant or newest."
    )]
    pub sort: Option<String>,

    #[arg(
        short = 'i',
        long = "int",
        visible_alias = "interactive",
        help_heading = "View",
        help = "Read commands from stdin and re-render after each one."
    )]
    pub interactive: bool,
}
