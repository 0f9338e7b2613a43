use rust_pivot_table::aggregator::AggregatorKind;
use rust_pivot_table::builder::{PivotOptions, PivotTableBuilder};
use rust_pivot_table::node::{NodeId, PivotTree, SortMode};
use rust_pivot_table::table::PivotTable;
use rust_pivot_table::types::{DataSet, DataType, Field, Schema, Value};

fn sales_schema() -> Schema {
    Schema::new(vec![
        Field::new("id", DataType::Int64),
        Field::new("region", DataType::Utf8),
        Field::new("month", DataType::Utf8),
        Field::new("amount", DataType::Float64),
    ])
}

fn row(id: i64, region: &str, month: &str, amount: f64) -> Vec<Value> {
    vec![
        Value::Int64(id),
        Value::from(region),
        Value::from(month),
        Value::Float64(amount),
    ]
}

fn scenario_dataset() -> DataSet {
    DataSet::new(
        sales_schema(),
        vec![
            row(1, "west", "Jan", 10.0),
            row(2, "west", "Jan", 5.0),
            row(3, "east", "Feb", 7.0),
        ],
    )
}

fn build(ds: &DataSet, kind: AggregatorKind, unique: bool) -> PivotTable {
    let mut builder = PivotTableBuilder::new(ds)
        .column_field_names(["region"])
        .unwrap()
        .row_field_names(["month"])
        .unwrap()
        .data_field_name("amount")
        .unwrap()
        .aggregator(kind);
    if unique {
        builder = builder.unique_field_name("id").unwrap();
    }
    builder.build().unwrap()
}

fn child(tree: &PivotTree, parent: NodeId, key: &str) -> NodeId {
    tree.find(parent, &Value::from(key)).unwrap()
}

#[test]
fn scenario_a_sum() {
    let table = build(&scenario_dataset(), AggregatorKind::Sum, false);
    let cols = table.columns();
    let rows = table.rows();

    assert_eq!(cols.children(table.column()).len(), 2);
    assert_eq!(rows.children(table.row()).len(), 2);

    let west = child(cols, table.column(), "west");
    let east = child(cols, table.column(), "east");
    let jan = child(rows, table.row(), "Jan");
    let feb = child(rows, table.row(), "Feb");

    assert_eq!(cols.result(west), 15.0);
    assert_eq!(cols.result(east), 7.0);
    assert_eq!(rows.result(jan), 15.0);
    assert_eq!(rows.result(feb), 7.0);

    assert_eq!(table.cells().len(), 2);
    assert_eq!(table.cell_result(west, jan), 15.0);
    assert_eq!(table.cell_result(east, feb), 7.0);
    assert!(table.find_cell_by_node(west, feb).is_none());
    assert_eq!(table.result(), 22.0);
}

#[test]
fn scenario_b_count() {
    let table = build(&scenario_dataset(), AggregatorKind::Count, false);
    let cols = table.columns();
    assert_eq!(cols.result(child(cols, table.column(), "west")), 2.0);
    assert_eq!(cols.result(child(cols, table.column(), "east")), 1.0);
    assert_eq!(cols.result(table.column()), 3.0);
    assert_eq!(table.result(), 3.0);
}

#[test]
fn scenario_c_dedup_keeps_first_occurrence() {
    let with_dupes = DataSet::new(
        sales_schema(),
        vec![
            row(1, "west", "Jan", 10.0),
            row(1, "east", "Mar", 99.0),
            row(2, "west", "Jan", 5.0),
            row(3, "east", "Feb", 7.0),
        ],
    );
    let deduped = build(&with_dupes, AggregatorKind::Sum, true);
    let reference = build(&scenario_dataset(), AggregatorKind::Sum, true);

    assert_eq!(deduped.result(), 22.0);
    assert_eq!(deduped.snapshot(), reference.snapshot());
    assert!(
        deduped
            .rows()
            .find(deduped.row(), &Value::from("Mar"))
            .is_none()
    );
}

#[test]
fn scenario_d_empty_dataset_builds_nothing() {
    let ds = DataSet::new(sales_schema(), vec![]);
    let built = PivotTableBuilder::new(&ds)
        .column_field_names(["region"])
        .unwrap()
        .row_field_names(["month"])
        .unwrap()
        .data_field_name("amount")
        .unwrap()
        .build();
    assert!(built.is_none());
}

#[test]
fn scenario_e_descending_sort() {
    let ds = DataSet::new(
        sales_schema(),
        vec![
            row(1, "b", "Jan", 1.0),
            row(2, "a", "Jan", 1.0),
            row(3, "c", "Jan", 1.0),
        ],
    );
    let table = PivotTableBuilder::new(&ds)
        .column_field_names(["region"])
        .unwrap()
        .row_field_names(["month"])
        .unwrap()
        .data_field_name("amount")
        .unwrap()
        .options(PivotOptions {
            sort_mode: SortMode::Descending,
            ..Default::default()
        })
        .build()
        .unwrap();

    let cols = table.columns();
    let keys: Vec<String> = cols
        .children(table.column())
        .iter()
        .map(|&c| cols.key(c).to_string())
        .collect();
    assert_eq!(keys, vec!["c", "b", "a"]);
}

fn sibling_keys(tree: &PivotTree) -> Vec<Vec<Value>> {
    tree.descendants(tree.root())
        .into_iter()
        .filter(|&n| !tree.is_leaf(n))
        .map(|n| tree.children(n).iter().map(|&c| tree.key(c).clone()).collect())
        .collect()
}

fn wide_dataset() -> DataSet {
    let regions = ["west", "east", "north", "south"];
    let months = ["Mar", "Jan", "Feb"];
    let mut rows = Vec::new();
    for i in 0..48i64 {
        let region = regions[(i as usize * 7) % regions.len()];
        let month = months[(i as usize * 5) % months.len()];
        rows.push(row(i, region, month, (i % 9) as f64 + 0.5));
    }
    DataSet::new(sales_schema(), rows)
}

#[test]
fn sort_modes_hold_at_every_level() {
    let ds = wide_dataset();
    for mode in [SortMode::Ascending, SortMode::Descending, SortMode::None] {
        let table = PivotTableBuilder::new(&ds)
            .column_field_names(["region", "month"])
            .unwrap()
            .row_field_names(["month"])
            .unwrap()
            .data_field_name("amount")
            .unwrap()
            .options(PivotOptions {
                sort_mode: mode,
                ..Default::default()
            })
            .build()
            .unwrap();

        for keys in sibling_keys(table.columns()) {
            match mode {
                SortMode::Ascending => assert!(keys.windows(2).all(|w| w[0] <= w[1])),
                SortMode::Descending => assert!(keys.windows(2).all(|w| w[0] >= w[1])),
                SortMode::None => {}
            }
        }
    }

    // Insertion order: first-seen region order in the dataset.
    let table = PivotTableBuilder::new(&ds)
        .column_field_names(["region"])
        .unwrap()
        .row_field_names(["month"])
        .unwrap()
        .data_field_name("amount")
        .unwrap()
        .options(PivotOptions {
            sort_mode: SortMode::None,
            ..Default::default()
        })
        .build()
        .unwrap();
    let mut first_seen: Vec<Value> = Vec::new();
    for record in ds.records() {
        if !first_seen.contains(&record[1]) {
            first_seen.push(record[1].clone());
        }
    }
    assert_eq!(sibling_keys(table.columns())[0], first_seen);
}

#[test]
fn rollup_total_and_cell_invariants_hold() {
    let ds = wide_dataset();
    let table = PivotTableBuilder::new(&ds)
        .column_field_names(["region", "month"])
        .unwrap()
        .row_field_names(["month", "region"])
        .unwrap()
        .data_field_name("amount")
        .unwrap()
        .build()
        .unwrap();

    let expected_total: f64 = ds.records().map(|r| r[3].as_f64().unwrap()).sum();
    assert!((table.result() - expected_total).abs() < 1e-9);
    assert!((table.columns().result(table.column()) - expected_total).abs() < 1e-9);
    assert!((table.rows().result(table.row()) - expected_total).abs() < 1e-9);

    // Every non-leaf equals the sum of its children.
    for tree in [table.columns(), table.rows()] {
        for node in tree.descendants(tree.root()) {
            if tree.is_leaf(node) {
                continue;
            }
            let sum: f64 = tree.children(node).iter().map(|&c| tree.result(c)).sum();
            assert!((tree.result(node) - sum).abs() < 1e-9);
        }
    }

    // One cell per leaf pair, holding exactly the records that resolved to it.
    let mut pairs = std::collections::HashSet::new();
    for cell in table.cells() {
        assert!(pairs.insert((cell.column(), cell.row())));
        let expected: f64 = ds
            .records()
            .filter(|r| {
                cell.column_path() == [r[1].clone(), r[2].clone()]
                    && cell.row_path() == [r[2].clone(), r[1].clone()]
            })
            .map(|r| r[3].as_f64().unwrap())
            .sum();
        assert!((cell.result() - expected).abs() < 1e-9);
        assert!(table.columns().is_leaf(cell.column()));
        assert!(table.rows().is_leaf(cell.row()));
    }
    let cell_sum: f64 = table.cells().iter().map(|c| c.result()).sum();
    assert!((cell_sum - expected_total).abs() < 1e-9);
}

#[test]
fn dedup_is_idempotent_on_duplicated_input() {
    let ds = wide_dataset();
    let mut doubled = ds.rows.clone();
    doubled.extend(ds.rows.iter().cloned().map(|mut r| {
        r[3] = Value::Float64(1000.0);
        r
    }));
    let doubled = DataSet::new(sales_schema(), doubled);

    let a = build(&ds, AggregatorKind::Average, true);
    let b = build(&doubled, AggregatorKind::Average, true);
    assert_eq!(a.snapshot(), b.snapshot());
}

#[test]
fn average_nodes_average_their_children() {
    let table = build(&scenario_dataset(), AggregatorKind::Average, false);
    let cols = table.columns();
    let west = child(cols, table.column(), "west");
    assert_eq!(cols.result(west), 7.5);
    // Root averages the child averages: (7.5 + 7) / 2.
    assert_eq!(cols.result(table.column()), 7.25);
    // The grand total averages every fed value: 22 / 3.
    assert_eq!(table.formatted_result(), 7.33);
}
