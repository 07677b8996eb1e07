mod debug_report;

use minimerge::{
    Lexicon, NeighborPolicyKind, Options, TreeExporter, TreeStyle, default_lexicon, lexicon::parse_sentences,
    parse_verbose_with,
};
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn main() {
    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };
    init_logging(config.verbosity);

    let lexicon = match load_lexicon(config.lexicon.as_ref()) {
        Ok(lexicon) => lexicon,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    let mut exporter = config.export.then(TreeExporter::default);
    let mut failed = false;
    for sentence in &config.sentences {
        match parse_verbose_with(sentence, &lexicon, &config.options) {
            Ok(res) => {
                debug_report::print_run(&res, config.color);
                if let Some(exporter) = exporter.as_mut() {
                    let trees: Vec<String> = res.parses.iter().map(|p| p.tree.clone()).collect();
                    exporter.send(&trees);
                }
            }
            Err(err) => {
                eprintln!("error: {sentence}: {err}");
                failed = true;
            }
        }
    }
    if failed {
        std::process::exit(1);
    }
}

struct CliConfig {
    sentences: Vec<String>,
    lexicon: Option<PathBuf>,
    options: Options,
    export: bool,
    color: bool,
    verbosity: u8,
}

fn parse_args() -> Result<CliConfig, String> {
    let mut input: Option<String> = None;
    let mut sentences_file: Option<PathBuf> = None;
    let mut lexicon: Option<PathBuf> = None;
    let mut options = Options::default();
    let mut export = false;
    let mut color = io::stdout().is_terminal();
    let mut verbosity = 0u8;
    let mut args = std::env::args().skip(1).peekable();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("minimerge {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--color" => color = true,
            "--no-color" => color = false,
            "--export" => export = true,
            "--signal-tree" => options.tree_style = TreeStyle::Signal,
            "--no-agreement" => options.check_adjunct_agreement = false,
            "-v" => verbosity = verbosity.max(1),
            "-vv" => verbosity = 2,
            "--lexicon" | "-l" => {
                let value = args.next().ok_or_else(|| "error: --lexicon expects a path".to_string())?;
                lexicon = Some(PathBuf::from(value));
            }
            "--sentences" | "-s" => {
                let value = args.next().ok_or_else(|| "error: --sentences expects a path".to_string())?;
                sentences_file = Some(PathBuf::from(value));
            }
            "--policy" => {
                let value = args.next().ok_or_else(|| "error: --policy expects a value".to_string())?;
                options.neighbor_policy = parse_policy(&value)?;
            }
            "--profile-cap" => {
                let value = args.next().ok_or_else(|| "error: --profile-cap expects a number".to_string())?;
                options.profile_cap = parse_count("--profile-cap", &value)?;
            }
            "--max-routes" => {
                let value = args.next().ok_or_else(|| "error: --max-routes expects a number".to_string())?;
                options.max_routes = parse_count("--max-routes", &value)?;
            }
            "--" => {
                let rest = args.collect::<Vec<_>>().join(" ");
                if !rest.trim().is_empty() {
                    if input.is_some() {
                        return Err("error: input provided multiple times".to_string());
                    }
                    input = Some(rest);
                }
                break;
            }
            _ if arg.starts_with("--lexicon=") => {
                lexicon = Some(PathBuf::from(arg.trim_start_matches("--lexicon=")));
            }
            _ if arg.starts_with("--sentences=") => {
                sentences_file = Some(PathBuf::from(arg.trim_start_matches("--sentences=")));
            }
            _ if arg.starts_with("--policy=") => {
                options.neighbor_policy = parse_policy(arg.trim_start_matches("--policy="))?;
            }
            _ if arg.starts_with("--profile-cap=") => {
                options.profile_cap = parse_count("--profile-cap", arg.trim_start_matches("--profile-cap="))?;
            }
            _ if arg.starts_with("--max-routes=") => {
                options.max_routes = parse_count("--max-routes", arg.trim_start_matches("--max-routes="))?;
            }
            _ if arg.starts_with('-') => {
                return Err(format!("error: unknown option '{arg}'"));
            }
            _ => {
                let rest = std::iter::once(arg).chain(args).collect::<Vec<_>>().join(" ");
                if input.is_some() {
                    return Err("error: input provided multiple times".to_string());
                }
                input = Some(rest);
                break;
            }
        }
    }

    let sentences = match (input, sentences_file) {
        (Some(_), Some(_)) => return Err("error: give either a sentence or --sentences, not both".to_string()),
        (Some(sentence), None) => vec![sentence],
        (None, Some(path)) => {
            let text = std::fs::read_to_string(&path)
                .map_err(|err| format!("error: failed to read {}: {err}", path.display()))?;
            parse_sentences(&text)
        }
        (None, None) => parse_sentences(&read_stdin_input()?),
    };

    if sentences.is_empty() {
        return Err(format!("error: no input provided\n\n{}", help_text()));
    }

    Ok(CliConfig { sentences, lexicon, options, export, color, verbosity })
}

fn parse_policy(value: &str) -> Result<NeighborPolicyKind, String> {
    value.parse::<NeighborPolicyKind>().map_err(|err| format!("error: {err}"))
}

fn parse_count(flag: &str, value: &str) -> Result<usize, String> {
    value.parse::<usize>().map_err(|_| format!("error: invalid {flag} '{value}' (expected a non-negative integer)"))
}

fn read_stdin_input() -> Result<String, String> {
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).map_err(|err| format!("error: failed to read stdin: {err}"))?;
    Ok(buffer)
}

fn load_lexicon(path: Option<&PathBuf>) -> Result<Lexicon, String> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|err| format!("error: failed to read {}: {err}", path.display()))?;
            Lexicon::parse(&text).map_err(|err| format!("error: {}: {err}", path.display()))
        }
        None => default_lexicon().cloned().map_err(|err| format!("error: built-in lexicon: {err}")),
    }
}

/// `MINIMERGE_LOG` wins over the verbosity flags.
fn init_logging(verbosity: u8) {
    let filter = EnvFilter::try_from_env("MINIMERGE_LOG").unwrap_or_else(|_| {
        EnvFilter::new(match verbosity {
            0 => "warn",
            1 => "minimerge=debug",
            _ => "minimerge=trace",
        })
    });
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).with_target(false).init();
}

fn print_help() {
    println!("{}", help_text());
}

fn help_text() -> String {
    format!(
        "minimerge {version}

Incremental feature-driven merge parser.

Usage:
  minimerge [OPTIONS] [--] <sentence...>
  minimerge [OPTIONS] --sentences <file>

Options:
  -l, --lexicon <file>       Lexicon to parse with (`word :: features, ...`).
                             Default: the built-in toy lexicon.
  -s, --sentences <file>     Parse every sentence in <file>, one per line.
                             Without a sentence or file, reads stdin.
  --policy <name>            Neighbor policy: mover-aware (default), strict,
                             movement-licensed.
  --profile-cap <n>          Routes kept per scope profile. Default: {profile_cap}
  --max-routes <n>           Routes kept per sentence. Default: {max_routes}
  --no-agreement             Do not check agreement between stacked adjuncts.
  --signal-tree              Label trees with signal numbers.
  --export                   Send winning trees to the viewer on 127.0.0.1:62236.
  -v, -vv                    Log the search to stderr (debug / trace).
                             MINIMERGE_LOG overrides, e.g. MINIMERGE_LOG=minimerge=trace.
  --color                    Force ANSI color output.
  --no-color                 Disable ANSI color output.
  -h, --help                 Show this help message.
  -V, --version              Print version information.

Exit codes:
  0  Success.
  1  A sentence could not be parsed (unknown word, empty sentence).
  2  Invalid arguments, missing input or a malformed lexicon.
",
        version = env!("CARGO_PKG_VERSION"),
        profile_cap = Options::default().profile_cap,
        max_routes = Options::default().max_routes,
    )
}
