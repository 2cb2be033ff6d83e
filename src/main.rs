// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Ganttline-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Ganttline and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Ganttline CLI entrypoint.
//!
//! Reads a chart document (JSON) from a file or stdin, lays it out and prints either a Unicode
//! rendering or the layout as JSON.

use std::error::Error;
use std::io::Read;

use ganttline::chart::Chart;
use ganttline::config::ChartDocument;
use ganttline::render::render_timeline_unicode;

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [<chart.json>] [--json]\n  {program} --schema\n\nReads the chart document from stdin when no path is given.\n--json prints the computed layout instead of the text rendering.\n--schema prints the JSON schema of the chart document.\n\nSet RUST_LOG=debug to trace the layout stages."
    );
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    input: Option<String>,
    json: bool,
    schema: bool,
}

fn parse_options(args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    for arg in args {
        match arg.as_str() {
            "--json" => {
                if options.json {
                    return Err(());
                }
                options.json = true;
            }
            "--schema" => {
                if options.schema {
                    return Err(());
                }
                options.schema = true;
            }
            "-" if options.input.is_none() => options.input = Some(arg),
            _ if arg.starts_with('-') => return Err(()),
            _ => {
                if options.input.is_some() {
                    return Err(());
                }
                options.input = Some(arg);
            }
        }
    }

    if options.schema && (options.json || options.input.is_some()) {
        return Err(());
    }

    Ok(options)
}

fn read_document(input: Option<&str>) -> Result<String, Box<dyn Error>> {
    let mut text = String::new();
    match input {
        None | Some("-") => {
            std::io::stdin().read_to_string(&mut text)?;
        }
        Some(path) => text = std::fs::read_to_string(path)?,
    }
    Ok(text)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "ganttline".to_owned());

        let options = match parse_options(args) {
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };

        if options.schema {
            println!("{}", serde_json::to_string_pretty(&ChartDocument::schema())?);
            return Ok(());
        }

        let text = read_document(options.input.as_deref())?;
        let document = ChartDocument::from_json(&text)?;
        let chart = Chart::from_document(&document)?;
        for err in chart.route_errors() {
            log::warn!("{err}");
        }

        if options.json {
            println!("{}", serde_json::to_string_pretty(&chart.snapshot())?);
        } else {
            println!("{}", render_timeline_unicode(&chart)?);
        }
        Ok(())
    })();

    if let Err(err) = result {
        eprintln!("ganttline: {err}");
        std::process::exit(1);
    }
}
