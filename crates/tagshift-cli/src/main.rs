mod config;
mod logger;

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fmt::Display;
use std::io::Read;
use std::path::{Path, PathBuf};
use tagshift_codegen::{extract, markup, shorthand, stats, Direction, Settings};
use tagshift_parser::{Forest, Limits, MarkupParser, ShorthandParser};
use tagshift_rules::Rule;

use crate::config::{Loader, TagshiftConfig};

#[derive(Parser)]
#[command(name = "tagshift")]
#[command(about = "Convert between shorthand and verbose markup, and rewrite tag trees")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    global: GlobalArgs,
}

#[derive(Args)]
struct GlobalArgs {
    /// Configuration file layered over the built-in defaults
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Silence all log output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Indent unit for verbose markup output
    #[arg(long, global = true)]
    indent: Option<String>,

    /// Render empty elements as `<tag></tag>`
    #[arg(long, global = true)]
    no_self_closing: bool,

    /// Omit text content
    #[arg(long, global = true)]
    hide_values: bool,

    /// Omit id, classes and attributes
    #[arg(long, global = true)]
    hide_attributes: bool,

    /// Keep attribute names but drop their values
    #[arg(long, global = true)]
    hide_attr_values: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Expand shorthand into verbose markup
    Expand {
        /// Input file (stdin when omitted or `-`)
        path: Option<String>,
    },

    /// Collapse verbose markup into shorthand
    Collapse {
        /// Input file (stdin when omitted or `-`)
        path: Option<String>,
    },

    /// Convert in whichever direction the input calls for
    Convert {
        /// Input file (stdin when omitted or `-`)
        path: Option<String>,
    },

    /// Apply one search/replace rule
    Rule {
        /// Input file (stdin when omitted or `-`)
        path: Option<String>,

        /// Search pattern, e.g. `A:h2+B:p`
        #[arg(long)]
        pattern: String,

        /// Replacement template, e.g. `section>A+B`
        #[arg(long)]
        replacement: String,

        /// Output notation
        #[arg(long, value_enum, default_value_t = Notation::Shorthand)]
        to: Notation,
    },

    /// Apply every enabled rule from the configuration, in order
    Rules {
        /// Input file (stdin when omitted or `-`)
        path: Option<String>,

        /// Output notation
        #[arg(long, value_enum, default_value_t = Notation::Shorthand)]
        to: Notation,
    },

    /// Print document statistics as JSON
    Stats {
        /// Input file (stdin when omitted or `-`)
        path: Option<String>,
    },

    /// Print the tables and lists found in the document as JSON
    Extract {
        /// Input file (stdin when omitted or `-`)
        path: Option<String>,
    },

    /// Print the parsed node tree as JSON
    Ast {
        /// Input file (stdin when omitted or `-`)
        path: Option<String>,

        /// Input notation (detected when omitted)
        #[arg(long, value_enum)]
        from: Option<Notation>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Notation {
    Shorthand,
    Markup,
}

impl Notation {
    fn detect(source: &str) -> Self {
        match Direction::detect(source) {
            Direction::Expand => Notation::Shorthand,
            Direction::Collapse => Notation::Markup,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    logger::init(logger::level(cli.global.verbose, cli.global.quiet));

    let config = load_config(&cli.global);

    match cli.command {
        Command::Expand { path } => cmd_transform(path.as_deref(), Some(Direction::Expand), &config),
        Command::Collapse { path } => cmd_transform(path.as_deref(), Some(Direction::Collapse), &config),
        Command::Convert { path } => cmd_transform(path.as_deref(), None, &config),
        Command::Rule {
            path,
            pattern,
            replacement,
            to,
        } => cmd_rule(path.as_deref(), &pattern, &replacement, to, &config),
        Command::Rules { path, to } => cmd_rules(path.as_deref(), to, &config),
        Command::Stats { path } => cmd_stats(path.as_deref(), &config),
        Command::Extract { path } => cmd_extract(path.as_deref(), &config),
        Command::Ast { path, from } => cmd_ast(path.as_deref(), from, &config),
    }
}

fn fail(message: impl Display) -> ! {
    eprintln!("Error: {message}");
    std::process::exit(1);
}

fn load_config(args: &GlobalArgs) -> TagshiftConfig {
    let mut loader = Loader::new();
    if let Some(path) = &args.config {
        log::debug!(target: "tagshift.cli", "loading configuration from {}", path.display());
        loader = loader.with_file(path);
    }

    let overrides = apply_overrides(loader, args);
    match overrides.and_then(Loader::build) {
        Ok(config) => config,
        Err(e) => fail(format!("invalid configuration: {e}")),
    }
}

fn apply_overrides(mut loader: Loader, args: &GlobalArgs) -> Result<Loader, ::config::ConfigError> {
    if let Some(indent) = &args.indent {
        loader = loader.set_override("output.indent", indent.as_str())?;
    }
    let switches = [
        ("output.self_closing", args.no_self_closing),
        ("output.show_values", args.hide_values),
        ("output.show_attributes", args.hide_attributes),
        ("output.show_attr_values", args.hide_attr_values),
    ];
    for (key, off) in switches {
        if off {
            loader = loader.set_override(key, false)?;
        }
    }
    Ok(loader)
}

fn read_source(path: Option<&str>) -> String {
    match path {
        None | Some("-") => {
            let mut source = String::new();
            if let Err(e) = std::io::stdin().read_to_string(&mut source) {
                fail(format!("reading stdin: {e}"));
            }
            source
        }
        Some(path) => {
            let p = Path::new(path);
            if !p.exists() {
                fail(format!("file not found: {path}"));
            }
            match std::fs::read_to_string(p) {
                Ok(source) => source,
                Err(e) => fail(format!("reading {path}: {e}")),
            }
        }
    }
}

fn parse(source: &str, notation: Notation, limits: Limits) -> Forest {
    let result = match notation {
        Notation::Shorthand => ShorthandParser::parse_with_limits(source, limits),
        Notation::Markup => MarkupParser::parse_with_limits(source, limits),
    };
    result.unwrap_or_else(|e| fail(e))
}

fn render(forest: &Forest, notation: Notation, settings: &Settings) -> String {
    match notation {
        Notation::Shorthand => shorthand::generate(forest, settings),
        Notation::Markup => markup::generate(forest, settings),
    }
}

fn cmd_transform(path: Option<&str>, direction: Option<Direction>, config: &TagshiftConfig) {
    let source = read_source(path);
    let direction = direction.unwrap_or_else(|| {
        let detected = Direction::detect(&source);
        log::info!(target: "tagshift.cli", "detected direction: {detected:?}");
        detected
    });

    match tagshift_codegen::transform_with_limits(&source, direction, &config.output, config.limits) {
        Ok(output) => println!("{output}"),
        Err(e) => fail(e),
    }
}

fn cmd_rule(path: Option<&str>, pattern: &str, replacement: &str, to: Notation, config: &TagshiftConfig) {
    let rule = Rule::compile(pattern, replacement).unwrap_or_else(|e| fail(e));

    let source = read_source(path);
    let forest = parse(&source, Notation::detect(&source), config.limits);
    let rewrite = rule.rewrite(&forest);
    log::info!(target: "tagshift.cli", "{} match(es)", rewrite.matches);

    println!("{}", render(&rewrite.forest, to, &config.output));
}

fn cmd_rules(path: Option<&str>, to: Notation, config: &TagshiftConfig) {
    let rules = config.rule_set();
    if rules.is_empty() {
        log::warn!(target: "tagshift.cli", "no rules in configuration");
    } else if rules.enabled().next().is_none() {
        log::warn!(target: "tagshift.cli", "every configured rule is disabled");
    }

    let source = read_source(path);
    let forest = parse(&source, Notation::detect(&source), config.limits);
    let outcome = rules.apply(&forest).unwrap_or_else(|e| fail(e));
    log::info!(
        target: "tagshift.cli",
        "{} rule(s) matched, {} replacement(s): {}",
        outcome.applied.len(),
        outcome.matches,
        outcome.applied.join(", ")
    );

    println!("{}", render(&outcome.forest, to, &config.output));
}

fn cmd_stats(path: Option<&str>, config: &TagshiftConfig) {
    let source = read_source(path);
    let forest = parse(&source, Notation::detect(&source), config.limits);
    print_json(&stats::analyze(&forest));
}

fn cmd_extract(path: Option<&str>, config: &TagshiftConfig) {
    let source = read_source(path);
    let forest = parse(&source, Notation::detect(&source), config.limits);
    print_json(&extract::extract(&forest));
}

fn cmd_ast(path: Option<&str>, from: Option<Notation>, config: &TagshiftConfig) {
    let source = read_source(path);
    let notation = from.unwrap_or_else(|| Notation::detect(&source));
    print_json(&parse(&source, notation, config.limits));
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => fail(format!("serializing output: {e}")),
    }
}
