mod args;
mod content;
mod export;
mod pages;
mod postprocess;
mod render;
mod slot;
mod svg;
mod theme;
mod tool;
mod tools;

use std::io::{self, Write};

use clap::{Arg, ArgAction, ArgMatches, FromArgMatches};

use crate::tool::{Output, Tool};
use anyhow::{Context, anyhow};

// This way of building main is not ideal.
macro_rules! toolbox {
    ($cmd:ident, $(($tool:path, $name:literal, $($alias:literal),*)),+) => {
        {
            // Register the tools.
            $(
                $cmd = $cmd.subcommand(
                    <$tool>::cli()
                    .name($name)
                    $(.alias($alias))*
                );
            )*

            // Parse args.
            let matches = $cmd.get_matches();
            init_tracing(&matches);
            let (subcommand_name, subcommand_matches) = matches
                .subcommand()
                .context("Could not determine subcommand")?;

            // Run the specific tool.
            match subcommand_name {
                $(
                    $name => {
                        let output = <$tool>::from_arg_matches(subcommand_matches)
                            .context("Could not initialize the tool")?
                            .execute()
                            .context("Could not execute tool")?;

                        Ok(output)
                    }
                )*
                _ => {
                    Err(anyhow!("Unknown subcommand"))
                }
            }
        }
    };
}

// Logs go to stderr so they never mix with the SVG or JSON on stdout.
fn init_tracing(matches: &ArgMatches) {
    let level = match matches.get_count("verbose") {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(level)
        .init();
}

fn main() -> anyhow::Result<()> {
    let mut cli = clap::builder::Command::new("qrbloom")
        .about("stylized QR code generator")
        .subcommand_required(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Increase log verbosity")
                .action(ArgAction::Count)
                .global(true),
        );

    let output = toolbox!(
        cli,
        (tools::data::DataTool, "data", "d"),
        (tools::presets::PresetsTool, "presets",),
        (tools::style::StyleTool, "style", "s")
    )
    .context("Could not run tool")?;

    match output {
        Some(Output::Text(text)) => {
            let mut stdout = io::stdout();
            stdout
                .write_all(text.as_bytes())
                .context("Could not write to stdout")?;
            writeln!(stdout).context("Could not write to stdout")?;
        }
        Some(Output::JsonValue(value)) => {
            println!(
                "{}",
                serde_json::to_string_pretty(&value).context("Could not serialize result")?
            );
        }
        None => {}
    }

    Ok(())
}
