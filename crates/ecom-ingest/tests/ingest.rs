use std::fs;
use std::path::Path;

use ecom_ingest::{IngestError, Ingestor};
use ecom_model::{IngestionSummary, TableLoadStatus};
use ecom_store::Store;

const CUSTOMERS: &str = "\u{feff}customer_id,first_name,last_name,email,phone,registration_date,city,state,country,age_group
C1, asha ,Rao,ASHA@Example.com,+91 98765-43210,2024-01-15,Pune,MH,India,25-34
C2,Ravi,,,,2023-11-02,Delhi,DL,India,35-44
";

const PRODUCTS: &str = "product_id,product_name,category,sub_category,price,cost,brand,stock_quantity,supplier_id
P1,Desk Lamp,Home,Lighting,40.00,25.00,Lumo,12,S1
P2,Headphones,Electronics,Audio,150.00,90.00,Sonic,,S2
";

const TRANSACTIONS: &str = "transaction_id,customer_id,transaction_date,transaction_time,payment_method,shipping_address,total_amount
T1,C1,2024-03-01,10:15:00,UPI,\"12 Hill Rd, Pune\",67.00
";

const ITEMS: &str = "item_id,transaction_id,product_id,quantity,unit_price,discount_percentage,line_total
I1,T1,P1,2,40.00,10,72.00
";

fn write_raw(dir: &Path, items: &str) {
    fs::write(dir.join("customers.csv"), CUSTOMERS).unwrap();
    fs::write(dir.join("products.csv"), PRODUCTS).unwrap();
    fs::write(dir.join("transactions.csv"), TRANSACTIONS).unwrap();
    fs::write(dir.join("transaction_items.csv"), items).unwrap();
}

fn read_summary(path: &Path) -> IngestionSummary {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn loads_every_staging_table_and_writes_summary() {
    let raw = tempfile::tempdir().unwrap();
    write_raw(raw.path(), ITEMS);
    let out = tempfile::tempdir().unwrap();
    let summary_path = out.path().join("staging").join("ingestion_summary.json");
    let mut store = Store::open_in_memory().unwrap();

    let summary = Ingestor::new(raw.path())
        .run(&mut store, &summary_path)
        .unwrap();

    assert!(summary.succeeded());
    assert_eq!(summary.total_rows(), 6);
    assert_eq!(summary.tables_loaded["staging.customers"].rows_loaded, 2);
    assert_eq!(
        summary.tables_loaded["staging.transaction_items"]
            .source_sha256
            .as_deref()
            .map(str::len),
        Some(64)
    );
    assert_eq!(store.row_count("staging_customers").unwrap(), 2);
    assert_eq!(store.row_count("staging_transaction_items").unwrap(), 1);
    let written = read_summary(&summary_path);
    assert_eq!(written.tables_loaded, summary.tables_loaded);
    assert_eq!(written.ingestion_timestamp, summary.ingestion_timestamp);

    // Raw text is staged verbatim; empty cells become NULL.
    let (first_name, email): (Option<String>, Option<String>) = store
        .connection()
        .query_row(
            "SELECT first_name, email FROM staging_customers WHERE customer_id = 'C2'",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(first_name.as_deref(), Some("Ravi"));
    assert_eq!(email, None);
}

#[test]
fn reingesting_replaces_staging_contents() {
    let raw = tempfile::tempdir().unwrap();
    write_raw(raw.path(), ITEMS);
    let out = tempfile::tempdir().unwrap();
    let summary_path = out.path().join("summary.json");
    let mut store = Store::open_in_memory().unwrap();
    let ingestor = Ingestor::new(raw.path());

    ingestor.run(&mut store, &summary_path).unwrap();
    ingestor.run(&mut store, &summary_path).unwrap();

    assert_eq!(store.row_count("staging_customers").unwrap(), 2);
    assert_eq!(store.row_count("staging_products").unwrap(), 2);
}

#[test]
fn bad_cell_rolls_back_every_table_and_still_writes_summary() {
    let raw = tempfile::tempdir().unwrap();
    write_raw(raw.path(), ITEMS);
    let out = tempfile::tempdir().unwrap();
    let summary_path = out.path().join("summary.json");
    let mut store = Store::open_in_memory().unwrap();
    Ingestor::new(raw.path())
        .run(&mut store, &summary_path)
        .unwrap();

    let broken = "item_id,transaction_id,product_id,quantity,unit_price,discount_percentage,line_total
I9,T1,P1,two,40.00,0,80.00
";
    fs::write(raw.path().join("transaction_items.csv"), broken).unwrap();
    fs::write(
        raw.path().join("customers.csv"),
        "customer_id,first_name,last_name,email,phone,registration_date,city,state,country,age_group\n",
    )
    .unwrap();

    let err = Ingestor::new(raw.path())
        .run(&mut store, &summary_path)
        .unwrap_err();
    match &err {
        IngestError::InvalidValue {
            file,
            line,
            column,
            value,
        } => {
            assert_eq!(file, "transaction_items.csv");
            assert_eq!(*line, 2);
            assert_eq!(column, "quantity");
            assert_eq!(value, "two");
        }
        other => panic!("unexpected error: {other}"),
    }

    // The earlier, emptier customers file was not committed.
    assert_eq!(store.row_count("staging_customers").unwrap(), 2);
    assert_eq!(store.row_count("staging_transaction_items").unwrap(), 1);

    let summary = read_summary(&summary_path);
    assert_eq!(summary.tables_loaded.len(), 4);
    for table in summary.tables_loaded.values() {
        assert_eq!(table.status, TableLoadStatus::Failed);
        assert_eq!(table.rows_loaded, 0);
        assert!(table.error_message.as_deref().unwrap().contains("quantity"));
    }
}

fn assert_invalid(err: &IngestError, expected_file: &str, expected_column: &str, raw: &str) {
    match err {
        IngestError::InvalidValue {
            file,
            column,
            value,
            ..
        } => {
            assert_eq!(file, expected_file);
            assert_eq!(column, expected_column);
            assert_eq!(value, raw);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn infinite_total_amount_is_not_staged() {
    let raw = tempfile::tempdir().unwrap();
    write_raw(raw.path(), ITEMS);
    fs::write(
        raw.path().join("transactions.csv"),
        TRANSACTIONS.replace("67.00", "inf"),
    )
    .unwrap();
    let out = tempfile::tempdir().unwrap();
    let mut store = Store::open_in_memory().unwrap();

    let err = Ingestor::new(raw.path())
        .run(&mut store, &out.path().join("summary.json"))
        .unwrap_err();
    assert_invalid(&err, "transactions.csv", "total_amount", "inf");
    assert_eq!(store.row_count("staging_transactions").unwrap(), 0);
}

#[test]
fn nan_price_is_not_staged() {
    let raw = tempfile::tempdir().unwrap();
    write_raw(raw.path(), ITEMS);
    fs::write(
        raw.path().join("products.csv"),
        PRODUCTS.replace("150.00", "NaN"),
    )
    .unwrap();
    let out = tempfile::tempdir().unwrap();
    let mut store = Store::open_in_memory().unwrap();

    let err = Ingestor::new(raw.path())
        .run(&mut store, &out.path().join("summary.json"))
        .unwrap_err();
    assert_invalid(&err, "products.csv", "price", "NaN");
    assert_eq!(store.row_count("staging_products").unwrap(), 0);
}

#[test]
fn missing_file_is_a_read_error() {
    let raw = tempfile::tempdir().unwrap();
    fs::write(raw.path().join("customers.csv"), CUSTOMERS).unwrap();
    let out = tempfile::tempdir().unwrap();
    let mut store = Store::open_in_memory().unwrap();

    let err = Ingestor::new(raw.path())
        .run(&mut store, &out.path().join("summary.json"))
        .unwrap_err();
    assert!(matches!(err, IngestError::Read { .. }));
    assert_eq!(store.row_count("staging_customers").unwrap(), 0);
}
