use clap::{Arg, ArgAction, Command, ValueHint};
use clap_complete::{generate_to, shells::*};
use std::env;
use std::io::Error;

// Mirror of the command tree in src/main.rs
// We need to duplicate this here since build scripts can't access src/ modules
const FORMATS: &[&str] = &["markdown", "html"];

fn file_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .help(help)
        .required(true)
        .index(1)
        .value_hint(ValueHint::FilePath)
}

fn main() -> Result<(), Error> {
    let outdir = match env::var_os("OUT_DIR") {
        None => return Ok(()),
        Some(outdir) => outdir,
    };

    let mut cmd = Command::new("ease")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert, normalize and inspect Markdown the way the Ease MD editor does")
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .arg(
            Arg::new("list-formats")
                .long("list-formats")
                .action(ArgAction::SetTrue),
        )
        .subcommand(
            Command::new("convert")
                .arg(file_arg("input", "Input file path"))
                .arg(
                    Arg::new("from")
                        .long("from")
                        .value_parser(clap::builder::PossibleValuesParser::new(FORMATS)),
                )
                .arg(
                    Arg::new("to")
                        .long("to")
                        .required(true)
                        .value_parser(clap::builder::PossibleValuesParser::new(FORMATS)),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(Command::new("render").arg(file_arg("input", "Markdown file")))
        .subcommand(
            Command::new("format")
                .arg(file_arg("input", "Markdown file"))
                .arg(Arg::new("write").long("write").short('w').action(ArgAction::SetTrue)),
        )
        .subcommand(
            Command::new("outline")
                .arg(file_arg("input", "Markdown file"))
                .arg(Arg::new("json").long("json").action(ArgAction::SetTrue))
                .arg(Arg::new("source").long("source").action(ArgAction::SetTrue)),
        )
        .subcommand(
            Command::new("tree")
                .arg(
                    Arg::new("dir")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::DirPath),
                )
                .arg(Arg::new("list").long("list").action(ArgAction::SetTrue))
                .arg(Arg::new("json").long("json").action(ArgAction::SetTrue)),
        )
        .subcommand(
            Command::new("upload")
                .arg(
                    Arg::new("image")
                        .required_unless_present("validate")
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(Arg::new("command").long("command").value_hint(ValueHint::CommandName))
                .arg(Arg::new("validate").long("validate").action(ArgAction::SetTrue)),
        )
        .subcommand(
            Command::new("draft")
                .arg(
                    Arg::new("document")
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(Arg::new("store").long("store").value_hint(ValueHint::FilePath))
                .arg(Arg::new("clear").long("clear").action(ArgAction::SetTrue)),
        );

    // Generate completions for bash
    generate_to(Bash, &mut cmd, "ease", &outdir)?;

    // Generate completions for zsh
    generate_to(Zsh, &mut cmd, "ease", &outdir)?;

    // Generate completions for fish
    generate_to(Fish, &mut cmd, "ease", &outdir)?;

    println!("cargo:warning=Shell completions generated in {outdir:?}");

    Ok(())
}
