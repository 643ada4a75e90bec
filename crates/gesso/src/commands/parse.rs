//! Parse command - Parse templates and print their AST

use clap::{Args, ValueEnum};
use serde::Serialize;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;

use gesso::config::{load_config, load_config_file, GessoConfig, Preset};
use gesso::error::CliError;
use gesso::render::{format_error, format_warning, render_tree, TemplateStats};
use gesso_armature::Parser;
use gesso_carton::Allocator;
use gesso_relief::{CompilerError, CompilerWarning, RootNode, WhitespaceStrategy};

/// Pattern that stands for standard input.
const STDIN: &str = "-";

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    /// Indented tree with source offsets
    #[default]
    Tree,
    /// JSON AST with diagnostics
    Json,
    /// Only show node counts
    Stats,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Whitespace {
    /// Collapse and drop insignificant whitespace
    Condense,
    /// Keep whitespace as written
    Preserve,
}

impl From<Whitespace> for WhitespaceStrategy {
    fn from(value: Whitespace) -> Self {
        match value {
            Whitespace::Condense => WhitespaceStrategy::Condense,
            Whitespace::Preserve => WhitespaceStrategy::Preserve,
        }
    }
}

#[derive(Args, Default)]
pub struct ParseArgs {
    /// Template files or glob patterns; `-` reads standard input
    #[arg(default_value = STDIN)]
    pub patterns: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "tree")]
    pub format: OutputFormat,

    /// Parsing rules (default: dom)
    #[arg(long, value_enum)]
    pub preset: Option<Preset>,

    /// Whitespace handling
    #[arg(long, value_enum)]
    pub whitespace: Option<Whitespace>,

    /// Drop comments from the output tree
    #[arg(long)]
    pub no_comments: bool,

    /// Interpolation delimiters
    #[arg(long, num_args = 2, value_names = ["OPEN", "CLOSE"])]
    pub delimiters: Option<Vec<String>>,

    /// Config file (default: ./gesso.config.json if present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Exit with a failure status when any template has parse errors
    #[arg(long)]
    pub deny_errors: bool,
}

/// JSON output for one template.
#[derive(Serialize)]
struct ParseOutput<'r, 'a> {
    filename: &'r str,
    ast: &'r RootNode<'a>,
    errors: &'r [CompilerError],
    warnings: &'r [CompilerWarning],
}

/// Returns `true` when every input was read and the error policy passed.
pub fn run(args: ParseArgs) -> Result<bool, CliError> {
    let start = Instant::now();

    let mut config = match &args.config {
        Some(path) => load_config_file(path)?,
        None => load_config(None),
    };
    apply_overrides(&mut config, &args);
    let options = config.parser.to_options();

    let patterns = if args.patterns.is_empty() {
        vec![STDIN.to_string()]
    } else {
        args.patterns.clone()
    };
    let inputs = collect_inputs(&patterns);
    if inputs.is_empty() {
        tracing::warn!("no templates matched the given patterns");
        return Ok(true);
    }

    let mut ok = true;
    let mut total_errors = 0usize;
    let mut json_outputs = Vec::new();

    for input in &inputs {
        let (filename, source) = match read_input(input) {
            Ok(read) => read,
            Err(e) => {
                eprintln!("error: {e}");
                ok = false;
                continue;
            }
        };

        let allocator = Allocator::with_capacity(source.len() * 4);
        let result = Parser::with_options(&allocator, &source, options.clone()).parse();
        tracing::debug!(
            file = %filename,
            errors = result.errors.len(),
            warnings = result.warnings.len(),
            arena_bytes = allocator.allocated_bytes(),
            "parsed"
        );

        for error in result.errors.iter() {
            eprintln!("{}", format_error(&filename, error));
        }
        for warning in result.warnings.iter() {
            eprintln!("{}", format_warning(&filename, warning));
        }
        total_errors += result.errors.len();

        match args.format {
            OutputFormat::Tree => {
                if inputs.len() > 1 {
                    println!("// {filename}");
                }
                print!("{}", render_tree(&result.root));
            }
            OutputFormat::Json => {
                let output = ParseOutput {
                    filename: &filename,
                    ast: &result.root,
                    errors: &result.errors,
                    warnings: &result.warnings,
                };
                json_outputs.push(serde_json::to_value(&output)?);
            }
            OutputFormat::Stats => {
                println!("{filename}: {}", TemplateStats::collect(&result.root));
            }
        }
    }

    if matches!(args.format, OutputFormat::Json) {
        let json = if json_outputs.len() == 1 {
            serde_json::to_string_pretty(&json_outputs[0])?
        } else {
            serde_json::to_string_pretty(&json_outputs)?
        };
        println!("{json}");
    }

    tracing::info!(
        files = inputs.len(),
        errors = total_errors,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "done"
    );

    if args.deny_errors && total_errors > 0 {
        ok = false;
    }
    Ok(ok)
}

/// Command-line flags win over the config file.
fn apply_overrides(config: &mut GessoConfig, args: &ParseArgs) {
    let parser = &mut config.parser;
    if let Some(preset) = args.preset {
        parser.preset = preset;
    }
    if let Some(whitespace) = args.whitespace {
        parser.whitespace = Some(whitespace.into());
    }
    if args.no_comments {
        parser.comments = Some(false);
    }
    if let Some([open, close]) = args.delimiters.as_deref() {
        parser.delimiters = Some((open.as_str().into(), close.as_str().into()));
    }
}

/// One template source to parse.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    Stdin,
    File(PathBuf),
}

/// Expand patterns into inputs, keeping command-line order.
fn collect_inputs(patterns: &[String]) -> Vec<Input> {
    let mut inputs = Vec::new();

    for pattern in patterns {
        if pattern == STDIN {
            if !inputs.contains(&Input::Stdin) {
                inputs.push(Input::Stdin);
            }
            continue;
        }

        if !pattern.contains(['*', '?', '[']) {
            inputs.push(Input::File(PathBuf::from(pattern)));
            continue;
        }

        let paths = match glob::glob(pattern) {
            Ok(paths) => paths,
            Err(e) => {
                tracing::warn!(pattern = %pattern, "invalid glob pattern: {e}");
                continue;
            }
        };
        let mut matched: Vec<PathBuf> = paths
            .filter_map(Result::ok)
            .filter(|path| path.is_file())
            .collect();
        if matched.is_empty() {
            tracing::warn!(pattern = %pattern, "pattern matched no files");
        }
        matched.sort();
        inputs.extend(matched.into_iter().map(Input::File));
    }

    // Remove duplicates, keeping the first occurrence
    let mut seen = Vec::with_capacity(inputs.len());
    inputs.retain(|input| {
        if seen.contains(input) {
            false
        } else {
            seen.push(input.clone());
            true
        }
    });
    inputs
}

fn read_input(input: &Input) -> Result<(String, String), CliError> {
    match input {
        Input::Stdin => {
            let mut source = String::new();
            std::io::stdin()
                .read_to_string(&mut source)
                .map_err(|source| CliError::Io {
                    path: PathBuf::from("<stdin>"),
                    source,
                })?;
            Ok(("<stdin>".to_string(), source))
        }
        Input::File(path) => {
            let source = read_file(path)?;
            Ok((path.display().to_string(), source))
        }
    }
}

fn read_file(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}
