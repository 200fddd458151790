use double_hash_table::{product_key, Registry, TableConfig, TableError, TombstonePolicy};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// Test: the host-facing lifecycle.
// Verifies: initialize -> add -> search -> release -> initialize -> miss.
#[test]
fn host_lifecycle_round_trip() {
    init_logging();
    let mut reg = Registry::new();
    let h = reg.initialize().unwrap();
    reg.add_product(h, "ABC123", "Apple", 1.5).unwrap();
    reg.add_product(h, "ABC123", "Banana", 2.0).unwrap();

    let names: Vec<String> = reg
        .search(h, "ABC123")
        .unwrap()
        .expect("present")
        .iter()
        .map(|r| r.name().to_string())
        .collect();
    assert_eq!(names, ["Banana", "Apple"]);

    let stats = reg.release(h).unwrap();
    assert_eq!((stats.keys, stats.records), (1, 2));
    assert!(reg.is_empty());

    let h2 = reg.initialize().unwrap();
    assert!(reg.search(h2, "ABC123").unwrap().is_none());
    assert!(matches!(reg.release(h), Err(TableError::DoubleRelease)));
}

// Test: keys derived the way the host application derives them.
// Verifies: different spellings of one product share a chain.
#[test]
fn products_group_by_derived_key() {
    let mut reg = Registry::new();
    let h = reg.initialize().unwrap();
    for (name, price) in [
        ("Uva Thompson (kg)", 14.9),
        ("Uva Niagara (kg)", 11.5),
        ("Maca Gala (kg)", 9.0),
    ] {
        reg.add_product(h, &product_key(name), name, price).unwrap();
    }
    let uvas = reg.search(h, &product_key("UVA")).unwrap().unwrap();
    assert_eq!(uvas.len(), 2);
    assert_eq!(uvas.head().unwrap().name(), "Uva Niagara (kg)");
    assert!(reg.search(h, "kiwi").unwrap().is_none());
}

// Test: a full table behind the registry.
// Verifies: the failure is returned to the caller and the table stays usable.
#[test]
fn table_full_surfaces_through_registry() {
    init_logging();
    let cfg = TableConfig::new()
        .with_capacity(3)
        .with_tombstone_policy(TombstonePolicy::ReuseFirstRemoved);
    let mut reg = Registry::with_config(cfg).unwrap();
    let h = reg.initialize().unwrap();
    for k in ["a", "b", "c"] {
        reg.add_product(h, k, k, 1.0).unwrap();
    }
    assert!(matches!(
        reg.add_product(h, "d", "d", 1.0),
        Err(TableError::TableFull { capacity: 3 })
    ));
    assert!(matches!(
        reg.add_product(h, "", "empty", 1.0),
        Err(TableError::EmptyKey)
    ));
    reg.add_product(h, "a", "a2", 2.0).unwrap();
    assert_eq!(reg.search(h, "a").unwrap().unwrap().len(), 2);
}
