mod opt_common;
mod opt_convert;

use std::fs::create_dir_all;

use crate::opt_convert::Opt;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use evkin::{prelude::*, FEATURES, GIT_BRANCH, GIT_REV, VERSION};
use log::{debug, info};

fn main() -> Result<()> {
    let args = argfile::expand_args_from(
        std::env::args_os(),
        argfile::parse_fromfile,
        argfile::PREFIX,
    )
    .with_context(|| "Failed to read argument file")?;
    let opt = Opt::parse_from(args);

    let env = Env::default().filter_or("EVKIN_LOG", opt.log.level());
    env_logger::init_from_env(env);

    if let (Some(rev), Some(branch)) = (GIT_REV, GIT_BRANCH) {
        info!("evkin {VERSION} rev {rev} ({branch}) {FEATURES:?}");
    } else {
        info!("evkin {VERSION} {FEATURES:?}");
    }

    debug!("settings: {:#?}", opt);

    let (infile, outfile) = opt.io_files()?;

    let reader = EventFileReader::builder()
        .format(opt.format.file_format())
        .max_events(opt.max_events)
        .build();
    let parsed = reader
        .read(&infile)
        .with_context(|| format!("Failed to read events from {infile:?}"))?;
    let events = parsed.events;
    info!(
        "Read {} events with {} particles",
        events.len(),
        events.n_particles_total()
    );

    if let Some(dir) = outfile.parent() {
        create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {dir:?}"))?;
    }
    info!("Writing table '{}' to {outfile:?}", opt.tree_name);
    write_table(&outfile, &opt.tree_name, events.to_table(), opt.compression)
        .with_context(|| format!("Failed to write events to {outfile:?}"))?;

    info!("done");
    Ok(())
}
