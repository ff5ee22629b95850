//
// Copyright (c) 2024 Hemi Labs, Inc.
//
// This file is part of the tabcmd project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use gettextrs::{bind_textdomain_codeset, gettext, setlocale, textdomain, LocaleCategory};
use tabcmd::{Executor, LocalHost, Source, Target};
use tracing_subscriber::EnvFilter;

const PROJECT_NAME: &str = "tabcmd";

#[derive(Parser, Debug)]
#[command(
    version,
    about = gettext("tabcmd - run browser command lines against an in-memory tab list")
)]
struct Args {
    #[arg(
        short = 'c',
        long = "command",
        help = gettext("Run a command line; may be repeated. Standard input is not read.")
    )]
    commands: Vec<String>,

    #[arg(short = 'u', long = "config", help = gettext("Startup config file; may be repeated"))]
    config: Vec<PathBuf>,

    #[arg(short = 'N', long = "no-config", help = gettext("Do not read any startup config file"))]
    no_config: bool,

    #[arg(long, help = gettext("Directory for the command history and settings snapshot"))]
    data_dir: Option<PathBuf>,

    #[arg(long = "tab", help = gettext("Open a tab with this url; may be repeated"))]
    tabs: Vec<String>,
}

fn default_config() -> Vec<PathBuf> {
    dirs::config_dir()
        .map(|dir| vec![dir.join("tabcmd").join("tabcmdrc")])
        .unwrap_or_default()
}

fn build_host(args: &Args) -> LocalHost {
    let mut host = LocalHost::new();
    host.echo = true;
    host.tabs = args.tabs.iter().map(|url| Target::new(url)).collect();
    if !host.tabs.is_empty() {
        host.layout.push(0);
    }
    host.config_files = if args.no_config {
        Vec::new()
    } else if args.config.is_empty() {
        default_config()
    } else {
        args.config.clone()
    };
    host.data_dir = args
        .data_dir
        .clone()
        .or_else(|| dirs::data_dir().map(|dir| dir.join("tabcmd")));
    host
}

fn run_line(ex: &mut Executor<LocalHost>, line: &str) {
    ex.execute(line, Source::User);
    ex.run_pending();
    ex.tick(Instant::now());
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    setlocale(LocaleCategory::LcAll, "");
    textdomain(PROJECT_NAME)?;
    bind_textdomain_codeset(PROJECT_NAME, "UTF-8")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("TABCMD_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let mut ex = Executor::new(build_host(&args));
    ex.startup();
    ex.run_pending();

    if args.commands.is_empty() {
        for line in io::stdin().lock().lines() {
            run_line(&mut ex, &line?);
            if ex.host.quit {
                break;
            }
        }
    } else {
        for line in &args.commands {
            run_line(&mut ex, line);
            if ex.host.quit {
                break;
            }
        }
    }

    ex.flush();
    Ok(())
}
