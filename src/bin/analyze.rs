mod opt_analyze;
mod opt_common;

use std::fs::create_dir_all;

use crate::opt_analyze::Opt;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use evkin::{prelude::*, FEATURES, GIT_BRANCH, GIT_REV, VERSION};
use log::{debug, info};

const DERIVED_TABLE: &str = "derived";

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

    rayon::ThreadPoolBuilder::new()
        .num_threads(opt.threads)
        .build_global()?;

    if let (Some(rev), Some(branch)) = (GIT_REV, GIT_BRANCH) {
        info!("evkin {VERSION} rev {rev} ({branch}) {FEATURES:?}");
    } else {
        info!("evkin {VERSION} {FEATURES:?}");
    }

    debug!("settings: {:#?}", opt);

    let (infile, outfile) = opt.io_files()?;

    info!("Reading table '{}' from {infile:?}", opt.tree_name);
    let table = read_table(&infile, &opt.tree_name)?;
    let events = EventStore::try_from(table).with_context(|| {
        format!("Invalid table '{}' in {infile:?}", opt.tree_name)
    })?;
    info!("Read {} events", events.len());

    let cuts = SelectionCutsBuilder::default()
        .min_lepton_pt(opt.min_lepton_pt)
        .build()?;
    let analysis = Analysis::builder()
        .selector(ObjectSelector::new(cuts))
        .mt2(Mt2Calculator::new(opt.invisible_mass))
        .min_met(opt.min_met)
        .build();
    debug!("analysis: {:#?}", analysis);

    let output = analysis.run(&events);

    if let Some(dir) = outfile.parent() {
        create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {dir:?}"))?;
    }
    info!(
        "Writing {} selected events to {outfile:?}",
        output.derived.len()
    );
    write_table(
        &outfile,
        DERIVED_TABLE,
        output.derived.to_table(),
        opt.compression,
    )
    .with_context(|| format!("Failed to write derived table to {outfile:?}"))?;

    info!("done");
    Ok(())
}
