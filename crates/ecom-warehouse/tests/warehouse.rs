use chrono::{NaiveDate, TimeZone, Utc};
use ecom_etl::EtlDriver;
use ecom_model::{
    CustomerRecord, Layer, ProductRecord, TransactionItemRecord, TransactionRecord,
};
use ecom_store::{InsertMode, Record, Store, insert_record};
use ecom_warehouse::WarehouseLoader;

fn stage<R: Record>(store: &Store, row: R) {
    insert_record(store.connection(), Layer::Staging, &row, InsertMode::Insert).unwrap();
}

fn product(id: &str, price: f64, cost: f64) -> ProductRecord {
    ProductRecord {
        product_id: id.to_string(),
        product_name: Some(format!("Product {id}")),
        price: Some(price),
        cost: Some(cost),
        ..ProductRecord::default()
    }
}

fn transaction(id: &str, customer: &str, day: u32, method: &str) -> TransactionRecord {
    TransactionRecord {
        transaction_id: id.to_string(),
        customer_id: Some(customer.to_string()),
        transaction_date: NaiveDate::from_ymd_opt(2024, 3, day),
        payment_method: Some(method.to_string()),
        total_amount: Some(27.0),
        ..TransactionRecord::default()
    }
}

fn item(id: &str, txn: &str, product: &str) -> TransactionItemRecord {
    TransactionItemRecord {
        item_id: id.to_string(),
        transaction_id: Some(txn.to_string()),
        product_id: Some(product.to_string()),
        quantity: Some(3),
        unit_price: Some(10.0),
        discount_percentage: Some(10.0),
        line_total: None,
    }
}

/// Production data loaded through the real ETL path.
fn loaded_store() -> Store {
    let mut store = Store::open_in_memory().unwrap();
    stage(
        &store,
        CustomerRecord {
            customer_id: "C1".to_string(),
            first_name: Some("asha".to_string()),
            last_name: Some("rao".to_string()),
            registration_date: NaiveDate::from_ymd_opt(2023, 1, 1),
            ..CustomerRecord::default()
        },
    );
    stage(&store, product("P1", 10.0, 6.0));
    stage(&store, product("P2", 50.0, 20.0));
    stage(&store, product("P3", 200.0, 120.0));
    stage(&store, transaction("T1", "C1", 1, "UPI"));
    stage(&store, transaction("T2", "C1", 4, "Cash on Delivery"));
    stage(&store, transaction("T3", "C9", 4, "Gift Card"));
    stage(&store, item("I1", "T1", "P1"));
    stage(&store, item("I2", "T2", "P2"));
    stage(&store, item("I3", "T3", "P404"));
    EtlDriver::standard().run(&mut store).unwrap();
    store
}

fn now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 5, 2, 0, 0).unwrap()
}

#[test]
fn dimensions_cover_production() {
    let mut store = loaded_store();
    let summary = WarehouseLoader.run_at(&mut store, now()).unwrap();

    assert_eq!(summary.rows["dim_date"], 4);
    assert_eq!(summary.rows["dim_payment_method"], 5);
    assert_eq!(summary.rows["dim_customers"], 1);
    assert_eq!(summary.rows["dim_products"], 3);
    assert_eq!(summary.rows["fact_sales"], 3);

    let conn = store.connection();
    let (key, day_name, weekend): (i64, String, bool) = conn
        .query_row(
            "SELECT date_key, day_name, is_weekend FROM dim_date WHERE full_date = '2024-03-02'",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .unwrap();
    assert_eq!((key, day_name.as_str(), weekend), (20240302, "Saturday", true));

    let cod: String = conn
        .query_row(
            "SELECT payment_type FROM dim_payment_method \
             WHERE payment_method_name = 'Cash on Delivery'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(cod, "Offline");

    let (full_name, segment, current): (String, String, bool) = conn
        .query_row(
            "SELECT full_name, customer_segment, is_current FROM dim_customers",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .unwrap();
    assert_eq!((full_name.as_str(), segment.as_str(), current), ("Asha Rao", "New", true));
}

#[test]
fn price_ranges_use_the_shared_tiers() {
    let mut store = loaded_store();
    WarehouseLoader.run_at(&mut store, now()).unwrap();
    let mut stmt = store
        .connection()
        .prepare("SELECT price_range FROM dim_products ORDER BY product_id")
        .unwrap();
    let ranges: Vec<String> = stmt
        .query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(ranges, ["Budget", "Mid-range", "Premium"]);
}

#[test]
fn fact_measures_and_missing_dimension_keys() {
    let mut store = loaded_store();
    let summary = WarehouseLoader.run_at(&mut store, now()).unwrap();

    let conn = store.connection();
    let (discount, line_total, profit, created_at): (f64, f64, f64, String) = conn
        .query_row(
            "SELECT discount_amount, line_total, profit, created_at \
             FROM fact_sales WHERE transaction_id = 'T1'",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )
        .unwrap();
    assert!((discount - 3.0).abs() < 1e-9);
    assert_eq!(line_total, 27.0);
    assert!((profit - 9.0).abs() < 1e-9);
    assert_eq!(created_at, summary.load_timestamp);

    let (customer_key, product_key, payment_key): (Option<i64>, Option<i64>, Option<i64>) = conn
        .query_row(
            "SELECT customer_key, product_key, payment_method_key \
             FROM fact_sales WHERE transaction_id = 'T3'",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .unwrap();
    assert_eq!((customer_key, product_key, payment_key), (None, None, None));
}

#[test]
fn aggregates_summarize_the_fact_table() {
    let mut store = loaded_store();
    let summary = WarehouseLoader.run_at(&mut store, now()).unwrap();
    assert_eq!(summary.rows["agg_daily_sales"], 2);
    assert_eq!(summary.rows["agg_product_performance"], 2);
    assert_eq!(summary.rows["agg_customer_metrics"], 1);

    let (transactions, spent, last): (i64, f64, String) = store
        .connection()
        .query_row(
            "SELECT total_transactions, total_spent, last_purchase_date FROM agg_customer_metrics",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .unwrap();
    assert_eq!(transactions, 2);
    assert_eq!(spent, 54.0);
    assert_eq!(last, "2024-03-04");
}

#[test]
fn reloading_rebuilds_rather_than_duplicates() {
    let mut store = loaded_store();
    let first = WarehouseLoader.run_at(&mut store, now()).unwrap();
    let second = WarehouseLoader.run_at(&mut store, now()).unwrap();
    assert_eq!(first.rows, second.rows);
}

#[test]
fn empty_production_yields_only_payment_methods() {
    let mut store = Store::open_in_memory().unwrap();
    let summary = WarehouseLoader.run_at(&mut store, now()).unwrap();
    for (table, rows) in &summary.rows {
        let expected = if table == "dim_payment_method" { 5 } else { 0 };
        assert_eq!(*rows, expected, "{table}");
    }
}
