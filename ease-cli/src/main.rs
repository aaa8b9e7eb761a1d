// Command-line interface for the Ease MD conversion core
//
// This binary exposes what the editor does to a document, without the editor: loading
// Markdown into the structured document, writing it back with the configured style
// rules, rendering, outlines, folder trees, image uploads and stored drafts.
//
// The core capabilities live in ease-babel (conversion) and ease-session (drafts, tree,
// uploader). Preferences come from ease-config: built-in defaults, then ./ease.toml if
// present, then --config, then EASE_* environment variables, then --extra-* overrides.
//
// Usage:
//  ease <input> --to <format> [--from <format>] [--output <file>]  - Convert between formats (default)
//  ease convert <input> --to <format> [--from <format>] [--output <file>]  - Same as above (explicit)
//  ease render <input>                   - Markdown to the HTML the rich view loads
//  ease format <input> [--write]         - Normalize Markdown with the configured style rules
//  ease outline <input> [--json] [--source]
//  ease tree <dir> [--list] [--json]
//  ease upload <image> [--command <cmd>] | ease upload --validate
//  ease draft [<document>] [--store <path>] [--clear]
//  ease --list-formats
//
// Extra Parameters:
//
// Any preference can be overridden with --extra-<name> <value>, hyphens standing for
// underscores. Example:
//  ease format notes.md --extra-heading-style setext --extra-bullet-marker asterisk

mod views;

use clap::{Arg, ArgAction, Command, ValueHint};
use ease_babel::formats::markdown::style::apply_newline_style;
use ease_babel::formats::MarkdownFormat;
use ease_babel::{load_document, markdown_to_html, outline, FormatRegistry, LoadContext};
use ease_config::{ConfigError, Loader, Preferences};
use ease_session::drafts::{self, draft_key};
use ease_session::{scan_markdown_files, scan_tree, ImageUploader, JsonFileStore};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

const PROJECT_CONFIG: &str = "ease.toml";

/// Parse extra-* arguments from command line args
/// Returns (cleaned_args_without_extras, extra_params_map)
///
/// Supports both:
/// - `--extra-<key> <value>` (explicit value)
/// - `--extra-<key>` (boolean flag, defaults to "true")
fn parse_extra_args(args: &[String]) -> (Vec<String>, HashMap<String, String>) {
    let mut cleaned_args = Vec::new();
    let mut extra_params = HashMap::new();
    let mut i = 0;

    while i < args.len() {
        let arg = &args[i];

        if let Some(key) = arg.strip_prefix("--extra-") {
            let has_value = i + 1 < args.len() && !args[i + 1].starts_with('-');
            let key = key.replace('-', "_");
            if has_value {
                extra_params.insert(key, args[i + 1].clone());
                i += 2;
            } else {
                extra_params.insert(key, "true".to_string());
                i += 1;
            }
            continue;
        }

        cleaned_args.push(arg.clone());
        i += 1;
    }

    (cleaned_args, extra_params)
}

fn input_arg(help: &'static str) -> Arg {
    Arg::new("input")
        .help(help)
        .required(true)
        .index(1)
        .value_hint(ValueHint::FilePath)
}

fn build_cli() -> Command {
    Command::new("ease")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert, normalize and inspect Markdown the way the Ease MD editor does")
        .long_about(
            "ease runs the Ease MD conversion core from the command line.\n\n\
            Commands:\n  \
            - convert: Markdown <-> HTML through the structured document\n  \
            - render:  Markdown to the HTML shown by the rich view\n  \
            - format:  Re-serialize Markdown with the configured style rules\n  \
            - outline: List headings\n  \
            - tree:    List Markdown files under a folder\n  \
            - upload:  Upload an image with the configured uploader\n  \
            - draft:   Show or clear a stored draft\n\n\
            Extra Parameters:\n  \
            Use --extra-<preference> [value] to override a preference.\n  \
            Boolean flags can omit the value (defaults to 'true').\n\n\
            Examples:\n  \
            ease notes.md --to html                          # Convert to HTML (stdout)\n  \
            ease format notes.md --extra-heading-style atx   # Normalize headings\n  \
            ease outline notes.md --json                     # Outline as JSON",
        )
        .arg_required_else_help(true)
        .subcommand_required(false)
        .arg(
            Arg::new("list-formats")
                .long("list-formats")
                .help("List available conversion formats")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to an ease.toml configuration file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert between document formats (default command)")
                .long_about(
                    "Convert documents between formats through the structured document.\n\n\
                    Supported formats:\n  \
                    - markdown: Markdown (.md, .markdown, .mdx)\n  \
                    - html:     HTML fragment (.html, .htm)\n\n\
                    The source format is auto-detected from the file extension.\n\
                    Output goes to stdout by default, or use -o to specify a file.",
                )
                .arg(input_arg("Input file path"))
                .arg(
                    Arg::new("from")
                        .long("from")
                        .help("Source format (auto-detected from file extension if not specified)")
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("to")
                        .long("to")
                        .help("Target format (required)")
                        .required(true)
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Output file path (defaults to stdout)")
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("render")
                .about("Render Markdown to the HTML loaded by the rich view")
                .arg(input_arg("Markdown file")),
        )
        .subcommand(
            Command::new("format")
                .about("Normalize a Markdown file")
                .long_about(
                    "Load a Markdown file into the structured document and write it back,\n\
                    applying the configured heading, list and punctuation style rules.\n\n\
                    Output is written to stdout unless --write is given.",
                )
                .arg(input_arg("Markdown file"))
                .arg(
                    Arg::new("write")
                        .long("write")
                        .short('w')
                        .help("Rewrite the file in place")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("outline")
                .about("List the headings of a Markdown file")
                .arg(input_arg("Markdown file"))
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print entries as JSON")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("source")
                        .long("source")
                        .help("Read headings from the raw text (line locators)")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("tree")
                .about("List Markdown files under a folder")
                .arg(
                    Arg::new("dir")
                        .help("Folder to scan")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::DirPath),
                )
                .arg(
                    Arg::new("list")
                        .long("list")
                        .help("Flat list of files sorted by name")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print the tree as JSON")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("upload")
                .about("Upload an image with the configured uploader")
                .arg(
                    Arg::new("image")
                        .help("Image file to upload")
                        .required_unless_present("validate")
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("command")
                        .long("command")
                        .help("Uploader command (defaults to the upload_command preference)")
                        .value_hint(ValueHint::CommandName),
                )
                .arg(
                    Arg::new("validate")
                        .long("validate")
                        .help("Only check that the uploader runs")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("draft")
                .about("Show or clear the stored draft of a document")
                .arg(
                    Arg::new("document")
                        .help("Document path (the untitled draft if omitted)")
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("store")
                        .long("store")
                        .help("Store file (defaults to the platform data directory)")
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("clear")
                        .long("clear")
                        .help("Delete the draft")
                        .action(ArgAction::SetTrue),
                ),
        )
}

const SUBCOMMANDS: &[&str] = &[
    "convert", "render", "format", "outline", "tree", "upload", "draft", "help",
];

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();

    // Parse extra-* arguments before clap processing
    let (cleaned_args, extra_params) = parse_extra_args(&args);

    let cli = build_cli();
    let matches = match cli.clone().try_get_matches_from(&cleaned_args) {
        Ok(m) => m,
        Err(e) => {
            // A bare file as first argument means "convert"
            if cleaned_args.len() > 1
                && !cleaned_args[1].starts_with('-')
                && !SUBCOMMANDS.contains(&cleaned_args[1].as_str())
            {
                let mut new_args = vec![cleaned_args[0].clone(), "convert".to_string()];
                new_args.extend_from_slice(&cleaned_args[1..]);
                match cli.try_get_matches_from(&new_args) {
                    Ok(m) => m,
                    Err(e2) => e2.exit(),
                }
            } else {
                e.exit();
            }
        }
    };

    if matches.get_flag("list-formats") {
        handle_list_formats_command();
        return;
    }

    let prefs = load_cli_config(
        matches.get_one::<String>("config").map(|s| s.as_str()),
        &extra_params,
    );

    match matches.subcommand() {
        Some(("convert", sub_matches)) => {
            let input = required(sub_matches, "input");
            let to = required(sub_matches, "to");
            let from = match sub_matches.get_one::<String>("from") {
                Some(f) => f.to_string(),
                None => {
                    let registry = FormatRegistry::default();
                    match registry.detect(Path::new(input)) {
                        Some(detected) => detected.to_string(),
                        None => {
                            eprintln!("Error: Could not detect format from filename '{input}'");
                            eprintln!("Please specify --from explicitly");
                            std::process::exit(1);
                        }
                    }
                }
            };
            let output = sub_matches.get_one::<String>("output").map(|s| s.as_str());
            handle_convert_command(input, &from, to, output, &prefs);
        }
        Some(("render", sub_matches)) => {
            handle_render_command(required(sub_matches, "input"), &prefs);
        }
        Some(("format", sub_matches)) => {
            let input = required(sub_matches, "input");
            handle_format_command(input, sub_matches.get_flag("write"), &prefs);
        }
        Some(("outline", sub_matches)) => {
            handle_outline_command(
                required(sub_matches, "input"),
                sub_matches.get_flag("source"),
                sub_matches.get_flag("json"),
                &prefs,
            );
        }
        Some(("tree", sub_matches)) => {
            handle_tree_command(
                Path::new(required(sub_matches, "dir")),
                sub_matches.get_flag("list"),
                sub_matches.get_flag("json"),
            );
        }
        Some(("upload", sub_matches)) => {
            let command = sub_matches
                .get_one::<String>("command")
                .cloned()
                .unwrap_or_else(|| prefs.upload_command.clone());
            let uploader = ImageUploader::new(command);
            if sub_matches.get_flag("validate") {
                handle_validate_command(&uploader);
            } else {
                handle_upload_command(&uploader, Path::new(required(sub_matches, "image")));
            }
        }
        Some(("draft", sub_matches)) => {
            let store = sub_matches
                .get_one::<String>("store")
                .map(PathBuf::from)
                .or_else(JsonFileStore::default_path)
                .unwrap_or_else(|| {
                    eprintln!("Error: no data directory on this platform, pass --store");
                    std::process::exit(1);
                });
            let document = sub_matches.get_one::<String>("document").map(Path::new);
            handle_draft_command(&store, document, sub_matches.get_flag("clear"));
        }
        _ => {
            eprintln!("Unknown subcommand. Use --help for usage information.");
            std::process::exit(1);
        }
    }
}

fn required<'a>(matches: &'a clap::ArgMatches, name: &str) -> &'a str {
    matches
        .get_one::<String>(name)
        .map(|s| s.as_str())
        .unwrap_or_else(|| {
            eprintln!("Error: missing <{name}>");
            std::process::exit(1);
        })
}

fn read_input(path: &str) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{path}': {e}");
        std::process::exit(1);
    })
}

fn write_output(path: &str, text: &str) {
    fs::write(path, text).unwrap_or_else(|e| {
        eprintln!("Error writing file '{path}': {e}");
        std::process::exit(1);
    });
}

/// Load context for a document on disk, so relative images resolve.
fn context_for(input: &str, prefs: &Preferences) -> LoadContext {
    LoadContext {
        document_path: Some(PathBuf::from(input)),
        ..LoadContext::from(prefs)
    }
}

fn markdown_format(input: &str, prefs: &Preferences) -> MarkdownFormat {
    MarkdownFormat::new(context_for(input, prefs), prefs.into())
}

/// Handle the convert command
fn handle_convert_command(
    input: &str,
    from: &str,
    to: &str,
    output: Option<&str>,
    prefs: &Preferences,
) {
    let mut registry = FormatRegistry::default();
    registry.register(markdown_format(input, prefs));

    let source = read_input(input);
    let mut result = registry.convert(&source, from, to).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });
    if to == "markdown" {
        result = apply_newline_style(&result, prefs.newline_style);
    }

    match output {
        Some(path) => write_output(path, &result),
        None => print!("{result}"),
    }
}

/// Handle the render command
fn handle_render_command(input: &str, prefs: &Preferences) {
    let source = read_input(input);
    print!("{}", markdown_to_html(&source, &context_for(input, prefs)));
}

/// Handle the format command
fn handle_format_command(input: &str, write: bool, prefs: &Preferences) {
    let source = read_input(input);
    let format = markdown_format(input, prefs);
    let doc = load_document(&source, &format.context);
    let text = apply_newline_style(&format.to_markdown(&doc), prefs.newline_style);
    if write {
        write_output(input, &text);
    } else {
        print!("{text}");
    }
}

/// Handle the outline command
fn handle_outline_command(input: &str, from_source: bool, json: bool, prefs: &Preferences) {
    let source = read_input(input);
    let entries = if from_source {
        outline::from_source(&source)
    } else {
        outline::from_document(&load_document(&source, &context_for(input, prefs)))
    };
    if json {
        print_json(&entries);
    } else {
        print!("{}", views::outline_text(&entries));
    }
}

/// Handle the tree command
fn handle_tree_command(dir: &Path, list: bool, json: bool) {
    if !dir.is_dir() {
        eprintln!("Error: '{}' is not a directory", dir.display());
        std::process::exit(1);
    }
    if list {
        let files = scan_markdown_files(dir);
        if json {
            print_json(&files);
        } else {
            for file in files {
                println!("{}", file.display());
            }
        }
        return;
    }
    let tree = scan_tree(dir, &Default::default());
    if json {
        print_json(&tree);
    } else {
        print!("{}", views::tree_text(&tree));
    }
}

/// Handle the upload command
fn handle_upload_command(uploader: &ImageUploader, image: &Path) {
    let result = uploader.upload(image).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });
    print_json(&result);
    if !result.success || result.url.is_none() {
        eprintln!("Image upload failed: {}", result.merged_output());
        std::process::exit(1);
    }
}

fn handle_validate_command(uploader: &ImageUploader) {
    match uploader.validate() {
        Ok(version) => println!("{version}"),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

/// Handle the draft command
fn handle_draft_command(store_path: &Path, document: Option<&Path>, clear: bool) {
    let mut store = JsonFileStore::open(store_path).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });
    let key = draft_key(document);
    if clear {
        if let Err(e) = drafts::clear(&mut store, &key) {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
        return;
    }
    match drafts::load(&store, &key) {
        Some(draft) => print!("{}", draft.text),
        None => {
            eprintln!("No draft stored for {key}");
            std::process::exit(1);
        }
    }
}

/// Handle the list-formats command
fn handle_list_formats_command() {
    let registry = FormatRegistry::default();
    println!("Conversion formats:");
    for format_name in registry.names() {
        let description = registry
            .get(&format_name)
            .map(|format| format.description().to_string())
            .unwrap_or_default();
        println!("  {format_name:<10}{description}");
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

fn load_cli_config(explicit_path: Option<&str>, extra_params: &HashMap<String, String>) -> Preferences {
    build_cli_config(explicit_path, extra_params).unwrap_or_else(|err| {
        eprintln!("Failed to load configuration: {err}");
        std::process::exit(1);
    })
}

fn build_cli_config(
    explicit_path: Option<&str>,
    extra_params: &HashMap<String, String>,
) -> Result<Preferences, ConfigError> {
    let loader = Loader::new().with_optional_file(PROJECT_CONFIG);
    let loader = if let Some(path) = explicit_path {
        loader.with_file(path)
    } else {
        loader
    };
    let mut loader = loader.with_env();
    for (key, raw) in extra_params {
        loader = apply_override(loader, key, raw)?;
    }
    loader.build()
}

/// Overrides arrive as text; pass booleans and integers typed so they
/// deserialize into the matching preference fields.
fn apply_override(loader: Loader, key: &str, raw: &str) -> Result<Loader, ConfigError> {
    if let Ok(flag) = raw.parse::<bool>() {
        loader.set_override(key, flag)
    } else if let Ok(number) = raw.parse::<i64>() {
        loader.set_override(key, number)
    } else {
        loader.set_override(key, raw)
    }
}
