use eprop_designer::catalog::{CatalogError, ComponentCatalog, ComponentKind, InMemoryCatalog};
use eprop_designer::config::{CatalogConfig, MotorRecord, RecordUnits, load_catalog};

const CATALOG_DIR: &str = "configs/catalog";

fn sample_catalog() -> InMemoryCatalog {
    InMemoryCatalog::load(CATALOG_DIR).expect("sample catalog")
}

#[test]
fn sample_catalog_counts() {
    let catalog = sample_catalog();
    assert_eq!(catalog.count(ComponentKind::Propeller), 4);
    assert_eq!(catalog.count(ComponentKind::Motor), 5);
    assert_eq!(catalog.count(ComponentKind::Battery), 4);
    assert_eq!(catalog.count(ComponentKind::Esc), 4);
    assert_eq!(catalog.ids(ComponentKind::Esc, None), vec![1, 2, 3, 4]);
}

#[test]
fn manufacturer_filter_ignores_case_and_whitespace() {
    let catalog = sample_catalog();
    assert_eq!(catalog.ids(ComponentKind::Motor, Some("turnigy")), vec![1, 4]);
    assert_eq!(catalog.ids(ComponentKind::Propeller, Some(" APC ")), vec![1, 2]);
    assert_eq!(catalog.ids(ComponentKind::Battery, Some("BENCH")), vec![4]);
    assert!(catalog.ids(ComponentKind::Esc, Some("Nobody")).is_empty());
}

#[test]
fn metric_records_are_converted_to_imperial() {
    let catalog = sample_catalog();

    let prop = catalog.propeller(3).expect("metric propeller");
    assert!((prop.diameter_in - 8.0).abs() < 1e-9);
    assert!((prop.pitch_in - 6.0).abs() < 1e-9);

    let motor = catalog.motor(1).expect("metric motor");
    assert!((motor.weight_oz - 1.763_70).abs() < 1e-4);

    let cell = catalog.battery(3, 1).expect("metric battery");
    assert!((cell.cell_weight_oz - 3.104).abs() < 1e-3);
}

#[test]
fn batteries_are_assembled_per_lookup() {
    let catalog = sample_catalog();
    let pack = catalog.battery(1, 3).expect("3S pack");
    assert_eq!(pack.cells, 3);
    assert!((pack.voltage_v() - 11.1).abs() < 1e-12);
    assert!((pack.resistance_ohm() - 0.015).abs() < 1e-12);

    let bigger = catalog.battery(1, 5).expect("5S pack");
    assert!((bigger.voltage_v() - 18.5).abs() < 1e-12);
    assert_eq!(bigger.capacity_mah(), pack.capacity_mah());

    assert!(matches!(
        catalog.battery(1, 0),
        Err(CatalogError::InvalidRecord {
            kind: ComponentKind::Battery,
            ..
        })
    ));
}

#[test]
fn ids_are_one_based_and_bounded() {
    let catalog = sample_catalog();
    assert_eq!(catalog.motor(1).expect("first motor").name, "Turnigy D2830-11 1000kv");
    match catalog.motor(0) {
        Err(CatalogError::UnknownId { kind, id, count }) => {
            assert_eq!(kind, ComponentKind::Motor);
            assert_eq!(id, 0);
            assert_eq!(count, 5);
        }
        other => panic!("expected unknown id, got {other:?}"),
    }
    assert!(matches!(
        catalog.esc(5),
        Err(CatalogError::UnknownId { id: 5, count: 4, .. })
    ));
    assert!(catalog.propeller(4).is_ok());
    assert!(catalog.propeller(5).is_err());
}

#[test]
fn name_lookup_ignores_case() {
    let catalog = sample_catalog();
    let prop = catalog.propeller_by_name("apc 9x6.5e").expect("propeller by name");
    assert_eq!(prop.name, "APC 9x6.5E");
    let esc = catalog
        .esc_by_name("HOBBYWING SKYWALKER 30A")
        .expect("esc by name");
    assert_eq!(esc.max_current_a, 30.0);
    let pack = catalog
        .battery_by_name("zippy 2100 lipo", 4)
        .expect("battery by name");
    assert_eq!(pack.cells, 4);

    let err = catalog.motor_by_name("Warp Drive").unwrap_err();
    assert!(matches!(err, CatalogError::UnknownName { .. }));
    assert_eq!(err.to_string(), "no motor named 'Warp Drive'");
}

#[test]
fn shared_components_are_not_copied() {
    let catalog = sample_catalog();
    let a = catalog.propeller(1).expect("propeller");
    let b = catalog.propeller(1).expect("propeller");
    assert!(std::sync::Arc::ptr_eq(&a, &b));
}

#[test]
fn invalid_record_aborts_the_load() {
    let mut config = load_catalog(CATALOG_DIR).expect("catalog records");
    config.motors.push(MotorRecord {
        name: "Broken".to_string(),
        manufacturer: "Nobody".to_string(),
        kv_rpm_per_v: 0.0,
        gear_ratio: 1.0,
        resistance_ohm: 0.1,
        no_load_current_a: 0.5,
        weight: 1.0,
        units: RecordUnits::Imperial,
    });
    match InMemoryCatalog::from_config(&config) {
        Err(CatalogError::InvalidRecord { kind, source }) => {
            assert_eq!(kind, ComponentKind::Motor);
            assert!(source.to_string().contains("kv_rpm_per_v"));
        }
        other => panic!("expected invalid record, got {other:?}"),
    }
}

#[test]
fn empty_catalog_has_no_ids() {
    let catalog = InMemoryCatalog::from_config(&CatalogConfig::default()).expect("empty");
    for kind in ComponentKind::ALL {
        assert_eq!(catalog.count(kind), 0);
        assert!(catalog.ids(kind, None).is_empty());
    }
}
