// End-to-end properties of catalog build, search and frame decoding
use can_catalog::{
    Catalog, CatalogBuildError, CatalogError, CatalogStore, DecodeWarning, Endianness,
    FrameDecoder, RawSignalRecord, SearchConfig, SearchIndex, SignalValue,
};
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn vehicle_records() -> Vec<RawSignalRecord> {
    vec![
        RawSignalRecord::new("pdu.sensors.batCurrent", 0x607, 0, 16)
            .with_name("Battery Current")
            .with_description("Battery pack current")
            .with_units("A")
            .with_type("int16_t")
            .with_signed(true)
            .with_scaling(0.1, 0.0)
            .with_device("Power Distribution Unit", 6)
            .with_frequency("100Hz"),
        RawSignalRecord::new("pdu.sensors.batVoltage", 0x607, 2, 16)
            .with_name("Battery Voltage")
            .with_description("Battery pack voltage")
            .with_units("V")
            .with_type("uint16_t")
            .with_scaling(0.01, 0.0)
            .with_device("Power Distribution Unit", 6),
        RawSignalRecord::new("pdu.sensors.lvVoltage", 0x607, 6, 16)
            .with_name("Low Voltage Bus")
            .with_description("12V bus voltage")
            .with_units("V")
            .with_type("uint16_t")
            .with_scaling(0.001, 0.0)
            .with_device("Power Distribution Unit", 6),
        RawSignalRecord::new("ams.pack.soc", 0x300, 0, 8)
            .with_name("State of Charge")
            .with_description("Pack state of charge")
            .with_units("%")
            .with_type("uint8_t")
            .with_scaling(0.5, 0.0),
        RawSignalRecord::new("ams.pack.maxCellTemp", 0x300, 1, 8)
            .with_name("Max Cell Temperature")
            .with_description("Hottest cell temperature")
            .with_units("C")
            .with_type("int8_t")
            .with_signed(true),
        RawSignalRecord::new("moc.motor.rpm", 0x210, 0, 16)
            .with_name("Motor Speed")
            .with_description("Rotor speed")
            .with_units("rpm")
            .with_type("uint16_t")
            .with_endianness(Endianness::Big),
        RawSignalRecord::new("pcm.state.faulted", 0x101, 0, 1)
            .with_name("Faulted")
            .with_description("Powertrain fault latched")
            .with_type("bool"),
    ]
}

fn vehicle_index() -> SearchIndex {
    SearchIndex::build(Arc::new(Catalog::build(vehicle_records()).unwrap()))
}

fn paths_and_scores(index: &SearchIndex, query: &str, config: &SearchConfig) -> Vec<(String, f64)> {
    index
        .query(query, config)
        .iter()
        .map(|m| (m.signal.path.clone(), m.score))
        .collect()
}

#[test]
fn query_output_is_deterministic() {
    init_logging();
    let index = vehicle_index();
    let config = SearchConfig::new().with_min_score(0.0);

    for query in ["battery current", "voltage", "temp", "motor rpm", "x"] {
        let first = paths_and_scores(&index, query, &config);
        let second = paths_and_scores(&index, query, &config);
        assert_eq!(first, second, "query {:?}", query);

        // Rebuilding the index from the same records gives the same output
        let rebuilt = paths_and_scores(&vehicle_index(), query, &config);
        assert_eq!(first, rebuilt, "query {:?}", query);
    }
}

#[test]
fn raising_min_score_never_adds_results() {
    let index = vehicle_index();
    let limit = NonZeroUsize::new(100).unwrap();

    for query in ["battery current", "voltage", "cell temp", "speed"] {
        let mut previous = usize::MAX;
        for min_score in [0.0, 20.0, 40.0, 60.0, 80.0, 95.0, 100.0] {
            let config = SearchConfig::new()
                .with_min_score(min_score)
                .with_max_results(limit);
            let count = index.query(query, &config).len();
            assert!(count <= previous, "{:?} at {}", query, min_score);
            previous = count;
        }
    }
}

#[test]
fn results_are_sorted_by_score_then_path() {
    let index = vehicle_index();
    let config = SearchConfig::new()
        .with_min_score(0.0)
        .with_max_results(NonZeroUsize::new(100).unwrap());
    let results = index.query("voltage", &config);

    for pair in results.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        assert!(
            a.score > b.score || (a.score == b.score && a.signal.path < b.signal.path),
            "{} ({}) before {} ({})",
            a.signal.path,
            a.score,
            b.signal.path,
            b.score
        );
    }
}

#[test]
fn battery_current_matches_above_default_threshold() {
    let index = vehicle_index();
    let results = index.query("battery current", &SearchConfig::default());

    assert!(!results.is_empty());
    assert_eq!(results[0].signal.path, "pdu.sensors.batCurrent");
    assert!(results[0].score > 60.0);
    assert!(results.iter().all(|m| m.score >= 60.0));
}

#[test]
fn build_fails_only_on_duplicate_paths() {
    assert!(Catalog::build(vehicle_records()).is_ok());

    let mut records = vehicle_records();
    records.push(RawSignalRecord::new("ams.pack.soc", 0x301, 0, 8));
    assert_eq!(
        Catalog::build(records).unwrap_err(),
        CatalogBuildError::DuplicatePath {
            path: "ams.pack.soc".to_string()
        }
    );

    // Same CAN ID and same layout under distinct paths is fine
    let mut records = vehicle_records();
    records.push(RawSignalRecord::new("ams.pack.socCopy", 0x300, 0, 8));
    assert!(Catalog::build(records).is_ok());
}

#[test]
fn invalid_layout_fails_build() {
    let records = vec![RawSignalRecord::new("pdu.bad", 0x10, 7, 16)];
    assert!(matches!(
        Catalog::build(records),
        Err(CatalogBuildError::SignalOutOfFrame { .. })
    ));
}

#[test]
fn exact_path_lookup() {
    let catalog = Catalog::build(vehicle_records()).unwrap();

    let signal = catalog.get_by_path("pdu.sensors.batCurrent").unwrap();
    assert_eq!(signal.name, "Battery Current");
    assert_eq!(signal.can_id, 0x607);

    assert_eq!(
        catalog.get_by_path("pdu.sensors.batcurrent").unwrap_err(),
        CatalogError::SignalNotFound("pdu.sensors.batcurrent".to_string())
    );
}

#[test]
fn decode_unsigned_little_endian_word() {
    let records = vec![RawSignalRecord::new("test.word", 0x42, 0, 16)];
    let catalog = Catalog::build(records).unwrap();

    let decoded = FrameDecoder::decode(&catalog, 0x42, &[0x34, 0x12, 0, 0, 0, 0, 0, 0]);
    let value = decoded.get("test.word").unwrap();

    assert_eq!(value.raw, 0x1234);
    assert_eq!(value.raw, 4660);
    assert_eq!(value.physical, SignalValue::Float(4660.0));
    assert!(decoded.warnings.is_empty());
}

#[test]
fn decode_sign_extends_byte() {
    let records = vec![RawSignalRecord::new("test.byte", 0x42, 0, 8).with_signed(true)];
    let catalog = Catalog::build(records).unwrap();

    let decoded = FrameDecoder::decode(&catalog, 0x42, &[0xFF]);
    let value = decoded.get("test.byte").unwrap();

    assert_eq!(value.raw, -1);
    assert_eq!(value.physical, SignalValue::Float(-1.0));
}

#[test]
fn unknown_frame_decodes_to_nothing() {
    let catalog = Catalog::build(vehicle_records()).unwrap();
    let decoded = FrameDecoder::decode(&catalog, 0xDEAD, &[1, 2, 3, 4, 5, 6, 7, 8]);

    assert!(decoded.values.is_empty());
    assert!(decoded.warnings.is_empty());
}

#[test]
fn truncated_frame_still_decodes_other_signals() {
    init_logging();
    let catalog = Catalog::build(vehicle_records()).unwrap();

    // Six bytes: batCurrent and batVoltage fit, lvVoltage (bytes 6-7) does not
    let data = [0x18, 0xFC, 0x10, 0x27, 0x00, 0x00];
    let decoded = FrameDecoder::decode(&catalog, 0x607, &data);

    let current = decoded.get("pdu.sensors.batCurrent").unwrap();
    assert_eq!(current.raw, -1000);
    assert!((current.physical.as_f64() + 100.0).abs() < 1e-9);

    let voltage = decoded.get("pdu.sensors.batVoltage").unwrap();
    assert_eq!(voltage.raw, 10000);
    assert!((voltage.physical.as_f64() - 100.0).abs() < 1e-9);

    assert!(decoded.get("pdu.sensors.lvVoltage").is_none());
    assert_eq!(
        decoded.warnings,
        vec![DecodeWarning::TruncatedFrame {
            path: "pdu.sensors.lvVoltage".to_string(),
            required_bytes: 8,
            available_bytes: 6,
        }]
    );
}

#[test]
fn big_endian_and_boolean_signals() {
    let catalog = Catalog::build(vehicle_records()).unwrap();

    let rpm = FrameDecoder::decode(&catalog, 0x210, &[0x0B, 0xB8]);
    assert_eq!(rpm.get("moc.motor.rpm").unwrap().raw, 3000);

    let fault = FrameDecoder::decode(&catalog, 0x101, &[0x01]);
    assert_eq!(
        fault.get("pcm.state.faulted").unwrap().physical,
        SignalValue::Boolean(true)
    );
}

#[test]
fn concurrent_readers_survive_republish() {
    let store = Arc::new(CatalogStore::new());
    store.rebuild(vehicle_records()).unwrap();

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for _ in 0..50 {
                    let snapshot = store.snapshot().unwrap();
                    let decoded = snapshot.decode(0x300, &[200, 0xF6]);
                    if let Some(soc) = decoded.get("ams.pack.soc") {
                        assert_eq!(soc.physical, SignalValue::Float(100.0));
                    }
                    let hits = snapshot.search("state of charge", &SearchConfig::default());
                    assert!(hits.iter().all(|m| m.score >= 60.0));
                }
            })
        })
        .collect();

    for _ in 0..10 {
        store.rebuild(vehicle_records()).unwrap();
    }

    for reader in readers {
        reader.join().unwrap();
    }
    assert!(store.is_loaded());
}

fn large_catalog(count: usize) -> Vec<RawSignalRecord> {
    let devices = ["ams", "pdu", "pcm", "moc"];
    (0..count)
        .map(|i| {
            let device = devices[i % devices.len()];
            let path = format!("{}.group{}.signal{}", device, i / 50, i);
            RawSignalRecord::new(path, 0x100 + (i / 8) as u32, (i % 8) as u16, 8)
                .with_name(format!("Signal {} reading", i))
                .with_description(format!(
                    "Measured channel {} of the {} harness, sampled on the vehicle bus and filtered before logging",
                    i, device
                ))
                .with_units("V")
                .with_type("uint8_t")
        })
        .collect()
}

#[test]
fn long_queries_stay_fast() {
    let index = SearchIndex::build(Arc::new(Catalog::build(large_catalog(1000)).unwrap()));
    let composite = index.entries()[0].text().chars().count();
    assert!(composite > 150, "composite text only {} chars", composite);

    let sentence = "what was the measured voltage on the harness channel right before the vehicle bus went quiet";
    let queries = [
        "channel voltage".to_string(),
        format!("{} earlier today", sentence),
        sentence.repeat(4),
    ];
    assert!(queries[1].len() >= 100);
    assert!(queries[2].len() >= 350);

    for query in &queries {
        let started = Instant::now();
        let results = index.query(query, &SearchConfig::default());
        let elapsed = started.elapsed();

        assert!(results.len() <= SearchConfig::default().max_results.get());
        assert!(
            elapsed < Duration::from_secs(5),
            "{}-char query took {:?}",
            query.len(),
            elapsed
        );
    }
}
