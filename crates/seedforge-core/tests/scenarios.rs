//! End-to-end scenarios for the generation engine: determinism, constraint
//! satisfaction, cycle resolution, self-reference hierarchies, edge-case
//! injection, and output round-trips.

use std::collections::HashSet;

use seedforge_core::config::GenerationOptions;
use seedforge_core::output::{read_json, write_json};
use seedforge_core::schema::{Column, Constraint, LogicalType, Schema, Table};
use seedforge_core::validate::validate;
use seedforge_core::{generate, generate_with, CancellationToken, SeedForgeError};
use seedforge_testutil::{
    ecommerce_schema, linear_chain_schema, mutual_cycle_schema, self_reference_schema,
    with_int_pk,
};

fn options(count: usize, seed: u64) -> GenerationOptions {
    GenerationOptions::new(count).with_seed(seed)
}

#[test]
fn linear_chain_generates_valid_references() {
    let schema = linear_chain_schema();
    let dataset = generate(&schema, &options(3, 1)).unwrap();

    let ids: Vec<i64> = dataset.table("countries").unwrap().rows
        .iter()
        .map(|r| r["id"].as_int().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 2, 3]);

    for row in &dataset.table("regions").unwrap().rows {
        let country_id = row["country_id"].as_int().unwrap();
        assert!((1..=3).contains(&country_id));
    }
    for row in &dataset.table("cities").unwrap().rows {
        let region_id = row["region_id"].as_int().unwrap();
        assert!((1..=3).contains(&region_id));
    }

    let report = validate(&schema, &dataset);
    assert!(report.is_valid(), "{}", report.summary());
}

#[test]
fn same_seed_same_output_different_seed_differs() {
    let schema = ecommerce_schema();
    let a = generate(&schema, &options(25, 99)).unwrap();
    let b = generate(&schema, &options(25, 99)).unwrap();
    let c = generate(&schema, &options(25, 100)).unwrap();

    let render = |d: &seedforge_core::Dataset| {
        let mut out = Vec::new();
        write_json(&mut out, d).unwrap();
        String::from_utf8(out).unwrap()
    };
    assert_eq!(render(&a), render(&b), "same seed must be byte-identical");
    assert_ne!(render(&a), render(&c), "different seeds must differ");
}

#[test]
fn unique_exhaustion_fails_with_context() {
    // A CHAR(1) unique column can hold at most a few dozen distinct tokens;
    // forcing far more rows than the value space must exhaust.
    let mut flags = Table::new("flags");
    with_int_pk(&mut flags);
    let mut letter = Column::new("letter", LogicalType::Char);
    letter.nullable = false;
    letter.length = Some(1);
    flags.columns.push(letter);
    flags.constraints.push(Constraint::Unique {
        columns: vec!["letter".to_string()],
    });
    let schema = Schema::from_tables(vec![flags]).unwrap();

    let err = generate(&schema, &options(200, 1)).unwrap_err();
    match err {
        SeedForgeError::UniqueExhausted { table, columns, attempts, .. } => {
            assert_eq!(table, "flags");
            assert_eq!(columns, "letter");
            assert_eq!(attempts, 1000);
        }
        other => panic!("expected UniqueExhausted, got {:?}", other),
    }
}

#[test]
fn mutual_cycle_resolves_through_deferred_pass() {
    let schema = mutual_cycle_schema(true, false);
    let dataset = generate(&schema, &options(5, 42)).unwrap();

    let a_ids: HashSet<i64> = dataset.table("a").unwrap().rows
        .iter()
        .map(|r| r["id"].as_int().unwrap())
        .collect();
    let b_ids: HashSet<i64> = dataset.table("b").unwrap().rows
        .iter()
        .map(|r| r["id"].as_int().unwrap())
        .collect();

    for row in &dataset.table("b").unwrap().rows {
        let a_id = row["a_id"].as_int().expect("b.a_id is NOT NULL");
        assert!(a_ids.contains(&a_id));
    }
    // Pass two populated the deferred column with valid b ids.
    for row in &dataset.table("a").unwrap().rows {
        let b_id = row["b_id"].as_int().expect("deferred FK was populated");
        assert!(b_ids.contains(&b_id));
    }

    let report = validate(&schema, &dataset);
    assert!(report.is_valid(), "{}", report.summary());
}

#[test]
fn unbreakable_cycle_fails_preflight() {
    let schema = mutual_cycle_schema(false, false);
    let err = generate(&schema, &options(5, 42)).unwrap_err();
    assert!(matches!(err, SeedForgeError::UnbreakableCycle { .. }));
}

#[test]
fn self_reference_builds_a_hierarchy() {
    let schema = self_reference_schema();
    let dataset = generate(&schema, &options(20, 7)).unwrap();
    let rows = &dataset.table("employees").unwrap().rows;
    assert_eq!(rows.len(), 20);

    let roots = rows.iter().filter(|r| r["manager_id"].is_null()).count();
    assert!(roots >= 1, "at least one tier-0 row must exist");

    // Every non-null manager_id resolves to an earlier row's id.
    for (i, row) in rows.iter().enumerate() {
        if let Some(manager_id) = row["manager_id"].as_int() {
            let parent_index = rows
                .iter()
                .position(|r| r["id"].as_int() == Some(manager_id))
                .expect("manager resolves to a row");
            assert!(parent_index < i, "row {} references later row", i);
        }
    }

    let report = validate(&schema, &dataset);
    assert!(report.is_valid(), "{}", report.summary());
}

#[test]
fn edge_case_injection_hits_nullable_columns() {
    let mut users = Table::new("users");
    with_int_pk(&mut users);
    let mut email = Column::new("email", LogicalType::VarChar);
    email.nullable = true;
    email.length = Some(255);
    users.columns.push(email);
    let schema = Schema::from_tables(vec![users]).unwrap();

    let mut opts = options(1000, 1);
    opts.edge_cases = 100.0;
    let dataset = generate(&schema, &opts).unwrap();

    // email is the only injectable column, so at 100% every row was touched;
    // well over half the values should match the catalog exactly (the rest
    // are synthesized-then-replaced nulls or date-like entries do not apply
    // to this column type).
    let rows = &dataset.table("users").unwrap().rows;
    let catalog_hits = rows
        .iter()
        .filter(|r| {
            r["email"]
                .as_str()
                .is_some_and(seedforge_core::generate::edge::is_string_edge_case)
        })
        .count();
    assert!(
        catalog_hits >= 500,
        "expected >= 500 of 1000 rows to carry catalog strings, got {}",
        catalog_hits
    );

    let report = validate(&schema, &dataset);
    assert!(report.is_valid(), "{}", report.summary());
}

#[test]
fn count_zero_produces_empty_tables() {
    let schema = linear_chain_schema();
    let dataset = generate(&schema, &options(0, 1)).unwrap();
    assert_eq!(dataset.tables.len(), 3);
    for table in dataset.tables.values() {
        assert!(table.rows.is_empty());
    }
    let report = validate(&schema, &dataset);
    assert!(report.is_valid());
}

#[test]
fn single_int_pk_counts_from_one() {
    let mut t = Table::new("items");
    with_int_pk(&mut t);
    let schema = Schema::from_tables(vec![t]).unwrap();

    let dataset = generate(&schema, &options(10, 5)).unwrap();
    let ids: Vec<i64> = dataset.table("items").unwrap().rows
        .iter()
        .map(|r| r["id"].as_int().unwrap())
        .collect();
    assert_eq!(ids, (1..=10).collect::<Vec<i64>>());
}

#[test]
fn ecommerce_run_validates_clean() {
    let schema = ecommerce_schema();
    let mut opts = options(30, 2024);
    opts.validate = true;
    let dataset = generate(&schema, &opts).unwrap();

    let report = dataset.validation.as_ref().expect("validation was requested");
    assert!(report.is_valid(), "{}", report.summary());

    // Whitelisted checks were honored by construction.
    for row in &dataset.table("orders").unwrap().rows {
        let status = row["status"].as_str().unwrap();
        assert!(["pending", "paid", "shipped"].contains(&status));
    }
    for row in &dataset.table("order_items").unwrap().rows {
        let qty = row["qty"].as_int().unwrap();
        assert!((1..=10).contains(&qty));
    }
}

#[test]
fn opaque_check_does_not_crash_and_is_reported() {
    let mut events = Table::new("events");
    with_int_pk(&mut events);
    let mut starts = Column::new("starts", LogicalType::Date);
    starts.nullable = false;
    events.columns.push(starts);
    let mut ends = Column::new("ends", LogicalType::Date);
    ends.nullable = false;
    events.columns.push(ends);
    events.constraints.push(Constraint::Check {
        expression: "starts < ends".to_string(),
        columns: vec!["starts".to_string(), "ends".to_string()],
    });
    let schema = Schema::from_tables(vec![events]).unwrap();

    let dataset = generate(&schema, &options(5, 3)).unwrap();
    let report = validate(&schema, &dataset);
    assert_eq!(report.not_enforced_checks.len(), 1);
    assert!(report.not_enforced_checks[0].contains("starts < ends"));
}

#[test]
fn json_export_import_round_trips() {
    let schema = ecommerce_schema();
    let dataset = generate(&schema, &options(15, 11)).unwrap();

    let mut first = Vec::new();
    write_json(&mut first, &dataset).unwrap();
    let text = String::from_utf8(first).unwrap();

    let imported = read_json(&text).unwrap();
    let mut second = Vec::new();
    write_json(&mut second, &imported).unwrap();
    assert_eq!(text, String::from_utf8(second).unwrap());
}

#[test]
fn zipf_skew_concentrates_fk_choices() {
    let mut parents = Table::new("parents");
    with_int_pk(&mut parents);
    let mut children = Table::new("children");
    with_int_pk(&mut children);
    seedforge_testutil::with_fk(&mut children, "parent_id", "parents", false);
    let schema = Schema::from_tables(vec![parents, children]).unwrap();

    let mut skewed = options(500, 8);
    skewed.table_overrides.insert(
        "parents".to_string(),
        seedforge_core::config::TableOverride {
            count: Some(100),
            edge_cases: None,
        },
    );
    skewed.distributions.push(seedforge_core::config::DistributionSpec {
        column: "children.parent_id".to_string(),
        sampler: seedforge_core::dist::Sampler::zipf(1.5),
    });

    let dataset = generate(&schema, &skewed).unwrap();
    let head = dataset.table("children").unwrap().rows
        .iter()
        .filter(|r| r["parent_id"].as_int().is_some_and(|v| v <= 10))
        .count();
    assert!(
        head > 200,
        "zipf skew should concentrate on early parents, got {}/500",
        head
    );

    let report = validate(&schema, &dataset);
    assert!(report.is_valid(), "{}", report.summary());
}

#[test]
fn cancellation_returns_no_partial_dataset() {
    let schema = linear_chain_schema();
    let cancel = CancellationToken::new();
    cancel.cancel();
    let err = generate_with(&schema, &options(100, 1), &cancel, None).unwrap_err();
    assert!(matches!(err, SeedForgeError::CancelRequested));
}

#[test]
fn missing_parent_on_nullable_fk_becomes_null() {
    // Parent table generates zero rows; the nullable FK degrades to null
    // rather than failing the run.
    let mut parents = Table::new("parents");
    with_int_pk(&mut parents);
    let mut children = Table::new("children");
    with_int_pk(&mut children);
    seedforge_testutil::with_fk(&mut children, "parent_id", "parents", true);
    let schema = Schema::from_tables(vec![parents, children]).unwrap();

    let mut opts = options(5, 1);
    opts.table_overrides.insert(
        "parents".to_string(),
        seedforge_core::config::TableOverride {
            count: Some(0),
            edge_cases: None,
        },
    );
    let dataset = generate(&schema, &opts).unwrap();
    for row in &dataset.table("children").unwrap().rows {
        assert!(row["parent_id"].is_null());
    }
}

#[test]
fn missing_parent_on_not_null_fk_fails() {
    let mut parents = Table::new("parents");
    with_int_pk(&mut parents);
    let mut children = Table::new("children");
    with_int_pk(&mut children);
    seedforge_testutil::with_fk(&mut children, "parent_id", "parents", false);
    let schema = Schema::from_tables(vec![parents, children]).unwrap();

    let mut opts = options(5, 1);
    opts.table_overrides.insert(
        "parents".to_string(),
        seedforge_core::config::TableOverride {
            count: Some(0),
            edge_cases: None,
        },
    );
    let err = generate(&schema, &opts).unwrap_err();
    assert!(matches!(err, SeedForgeError::MissingParent { .. }));
}

#[test]
fn batches_cover_all_rows_in_order() {
    let schema = linear_chain_schema();
    let dataset = generate(&schema, &options(10, 6)).unwrap();

    let batches: Vec<_> = dataset.batches(4).collect();
    let total: usize = batches.iter().map(|b| b.rows.len()).sum();
    assert_eq!(total, 30);

    // Tables appear in generation order; batches within a table in order.
    let tables_seen: Vec<&str> = batches.iter().map(|b| b.table).collect();
    let mut deduped = tables_seen.clone();
    deduped.dedup();
    assert_eq!(deduped, vec!["countries", "regions", "cities"]);
    assert!(batches.iter().all(|b| b.rows.len() <= 4));
}

#[test]
fn locale_flows_into_persona_columns() {
    let mut people = Table::new("people");
    with_int_pk(&mut people);
    let mut city = Column::new("city", LogicalType::VarChar);
    city.nullable = false;
    city.length = Some(100);
    people.columns.push(city);
    let schema = Schema::from_tables(vec![people]).unwrap();

    let mut opts = options(50, 4);
    opts.locale = seedforge_core::Locale::DeDe;
    let dataset = generate(&schema, &opts).unwrap();

    let de_cities: HashSet<&str> = seedforge_core::Locale::DeDe
        .personas()
        .cities
        .iter()
        .copied()
        .collect();
    for row in &dataset.table("people").unwrap().rows {
        let city = row["city"].as_str().unwrap();
        assert!(de_cities.contains(city), "unexpected city {:?}", city);
    }
}

#[test]
fn non_nullable_columns_are_never_null() {
    let schema = ecommerce_schema();
    let dataset = generate(&schema, &options(40, 13)).unwrap();
    for (name, table) in &schema.tables {
        for column in table.columns.iter().filter(|c| !c.nullable) {
            for (i, row) in dataset.table(name).unwrap().rows.iter().enumerate() {
                assert!(
                    !row[&column.name].is_null(),
                    "{}.{} row {} is null",
                    name,
                    column.name,
                    i
                );
            }
        }
    }
}

#[test]
fn schema_invalid_fails_before_generation() {
    let mut orders = Table::new("orders");
    with_int_pk(&mut orders);
    orders.constraints.push(Constraint::Unique {
        columns: vec!["ghost".to_string()],
    });
    let schema = Schema::from_tables(vec![orders]).unwrap();

    let err = generate(&schema, &options(5, 1)).unwrap_err();
    assert!(matches!(err, SeedForgeError::SchemaInvalid { .. }));
}

#[test]
fn uuid_primary_keys_are_unique_and_deterministic() {
    let mut sessions = Table::new("sessions");
    let mut id = Column::new("id", LogicalType::Uuid);
    id.nullable = false;
    sessions.columns.push(id);
    sessions.constraints.push(Constraint::PrimaryKey {
        columns: vec!["id".to_string()],
    });
    let schema = Schema::from_tables(vec![sessions]).unwrap();

    let a = generate(&schema, &options(50, 77)).unwrap();
    let b = generate(&schema, &options(50, 77)).unwrap();

    let ids_a: Vec<String> = a.table("sessions").unwrap().rows
        .iter()
        .map(|r| r["id"].to_string())
        .collect();
    let ids_b: Vec<String> = b.table("sessions").unwrap().rows
        .iter()
        .map(|r| r["id"].to_string())
        .collect();
    assert_eq!(ids_a, ids_b);
    assert_eq!(ids_a.iter().collect::<HashSet<_>>().len(), 50);
}
