mod opt_analyze;
mod opt_common;
mod opt_convert;

use std::io::{stdout, Write};

use anyhow::Result;
use clap::{CommandFactory, Parser, ValueEnum};
use clap_complete::{generate, shells::*, Generator};
use strum::{Display, EnumString};

#[derive(
    Copy,
    Clone,
    Debug,
    Display,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    EnumString,
    ValueEnum,
)]
#[strum(ascii_case_insensitive)]
#[strum(serialize_all = "lowercase")]
enum Shell {
    Bash,
    Elvish,
    Fish,
    #[allow(clippy::enum_variant_names)]
    PowerShell,
    Zsh,
}

/// Print shell completions for the evkin commands
#[derive(Debug, Parser)]
#[clap(author, version)]
struct ShellSelect {
    /// Shell for which to generate completions
    #[clap(value_enum)]
    shell: Shell,
}

fn gen_completion<S: Copy + Generator, W: Write>(shell: S, mut to: W) {
    generate(
        shell,
        &mut crate::opt_convert::Opt::command(),
        "evkin-convert",
        &mut to,
    );
    generate(
        shell,
        &mut crate::opt_analyze::Opt::command(),
        "evkin-analyze",
        &mut to,
    );
}

fn main() -> Result<()> {
    let shell = ShellSelect::parse().shell;
    eprintln!("Generating {shell} completions");
    let out = stdout().lock();
    match shell {
        Shell::Bash => gen_completion(Bash, out),
        Shell::Elvish => gen_completion(Elvish, out),
        Shell::Fish => gen_completion(Fish, out),
        Shell::PowerShell => gen_completion(PowerShell, out),
        Shell::Zsh => gen_completion(Zsh, out),
    }
    Ok(())
}
