use std::{f64::consts::PI, fs::File, io::Write, path::Path};

use evkin::{
    analysis::DERIVED_COLUMNS,
    prelude::*,
    table::Column,
};
use flate2::write::GzEncoder;

fn log_init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// 1. back-to-back leptons with 50 GeV missing momentum along y
// 2. a single lepton
// 3. balanced leptons without missing momentum
const HEPMC: &str = "HepMC::Version 2.06.09
HepMC::IO_GenEvent-START_EVENT_LISTING
E 0 -1 -1.0 -1.0 -1.0 0 -1 5 0 0 1 1.0
P 1 24 20 0 0 100 80 2 0 0 -1 0
P 2 11 60 0 0 60 0 1 0 0 0 0
P 3 -13 -40 0 0 40 0 1 0 0 0 0
P 4 22 -20 -50 0 53.85164807134504 0 1 0 0 0 0
P 5 14 0 50 0 50 0 1 0 0 0 0
E 1 -1 -1.0 -1.0 -1.0 0 -1 2 0 0 1 1.0
P 6 11 60 0 10 60.8276253029822 0 1 0 0 0 0
P 7 22 0 35 0 35 0 1 0 0 0 0
E 2 -1 -1.0 -1.0 -1.0 0 -1 2 0 0 1 1.0
P 8 11 30 0 0 30 0 1 0 0 0 0
P 9 -11 -30 0 0 30 0 1 0 0 0 0
HepMC::IO_GenEvent-END_EVENT_LISTING
";

const LHEF: &str = r#"<LesHouchesEvents version="3.0">
<init>
2212 2212 6.5e3 6.5e3 0 0 0 0 3 1
1.0 0.0 1.0 1
</init>
<event>
 4 1 1.0 91.1876 0.0078 0.118
 11 1 0 0 0 0 60 0 0 60 0 0 9
 -13 1 0 0 0 0 -40 0 0 40 0 0 9
 22 1 0 0 0 0 -20 -50 0 53.85164807134504 0 0 9
 14 1 0 0 0 0 0 50 0 50 0 0 9
</event>
</LesHouchesEvents>
"#;

fn write_gz(path: &Path, content: &str) {
    let file = File::create(path).unwrap();
    let mut encoder = GzEncoder::new(file, flate2::Compression::default());
    encoder.write_all(content.as_bytes()).unwrap();
    encoder.finish().unwrap();
}

fn derived_column<'a>(table: &'a Table, name: &str) -> &'a [f64] {
    match table.column(name) {
        Some(Column::Float(values)) => values,
        other => panic!("unexpected column {name}: {other:?}"),
    }
}

fn check_reference(table: &Table) {
    assert_eq!(table.n_rows(), 1);
    let value = |name| derived_column(table, name)[0];
    assert!((value("l1_pt") - 60.).abs() < 1e-12);
    assert!((value("l2_pt") - 40.).abs() < 1e-12);
    assert!((value("dphi_lep") - PI).abs() < 1e-12);
    assert!((value("mll") - 9600f64.sqrt()).abs() < 1e-9);
    assert!((value("MET") - 50.).abs() < 1e-12);
    assert!((value("MET_phi") - PI / 2.).abs() < 1e-12);
    assert!((value("MT_WW") - 140.).abs() < 1e-9);
    assert!((value("MT2_WW") - 0.1).abs() < 1e-9);
}

#[test]
fn hepmc_to_derived() {
    log_init();

    let dir = tempfile::tempdir().unwrap();
    let infile = dir.path().join("ww.hepmc.gz");
    write_gz(&infile, HEPMC);

    let parsed = EventFileReader::default().read(&infile).unwrap();
    assert_eq!(parsed.stats.malformed, 0);
    let events = parsed.events;
    assert_eq!(events.len(), 3);
    assert_eq!(events.n_particles(0).unwrap(), 5);
    assert_eq!(events.n_particles(1).unwrap(), 2);
    assert_eq!(events.n_particles(2).unwrap(), 2);

    let tables = dir.path().join("ww.yaml.zst");
    write_table(&tables, "events", events.to_table(), Some(Compression::Zstd(3)))
        .unwrap();
    let restored = read_table(&tables, "events").unwrap();
    let restored = EventStore::try_from(restored).unwrap();
    assert_eq!(restored, events);

    let output = Analysis::default().run(&restored);
    assert_eq!(output.cutflow.total, 3);
    assert_eq!(output.cutflow.enough_leptons, 2);
    assert_eq!(output.cutflow.selected, 1);

    let derived = dir.path().join("derived.yaml");
    write_table(&derived, "derived", output.derived.to_table(), None).unwrap();
    let derived = read_table(&derived, "derived").unwrap();
    for name in DERIVED_COLUMNS {
        assert!(derived.column(name).is_some(), "missing column {name}");
    }
    check_reference(&derived);
}

#[cfg(feature = "lhef")]
#[test]
fn lhef_to_derived() {
    log_init();

    let dir = tempfile::tempdir().unwrap();
    let infile = dir.path().join("ww.lhe");
    std::fs::write(&infile, LHEF).unwrap();

    let parsed = EventFileReader::default().read(&infile).unwrap();
    assert_eq!(parsed.events.len(), 1);
    let output = Analysis::default().run(&parsed.events);
    check_reference(&output.derived.to_table());
}

#[test]
fn missing_table() {
    log_init();

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("events.yaml");
    write_table(&file, "events", EventStore::new().to_table(), None).unwrap();

    let err = read_table(&file, "derived").unwrap_err();
    assert!(err.to_string().contains("derived"));

    let empty = read_table(&file, "events").unwrap();
    let empty = EventStore::try_from(empty).unwrap();
    assert!(empty.is_empty());
    let output = Analysis::default().run(&empty);
    assert!(output.derived.is_empty());
}
