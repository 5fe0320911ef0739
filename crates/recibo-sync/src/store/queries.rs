//! Receipt CRUD operations.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Row};
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::StoreError;
use crate::models::{LineItem, NewReceipt, ReceiptRecord, ReceiptStatus};

use super::database::Database;

const RECEIPT_COLUMNS: &str = "r.id, r.receipt_number, r.vendor_name, r.store_location, \
     r.transaction_date, r.subtotal, r.tax, r.total, r.status, r.notes, \
     r.last_sent_subtotal, r.raw_document, r.created_at, r.updated_at";

/// Insert a new record and its line items in one transaction.
pub async fn insert(db: &Database, new: NewReceipt) -> Result<ReceiptRecord, StoreError> {
    let now = Utc::now();
    let row = new.clone();
    let id = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO receipts (receipt_number, vendor_name, store_location,
                                       transaction_date, subtotal, tax, total, status,
                                       notes, last_sent_subtotal, raw_document,
                                       created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                params![
                    row.receipt_number,
                    row.vendor_name,
                    row.store_location,
                    row.transaction_date.map(|d| d.to_string()),
                    row.subtotal.to_string(),
                    row.tax.to_string(),
                    row.total.to_string(),
                    row.status.as_str(),
                    row.notes,
                    row.last_sent_subtotal.map(|d| d.to_string()),
                    row.raw_document,
                    now.to_rfc3339(),
                    now.to_rfc3339(),
                ],
            )?;
            let id = tx.last_insert_rowid();
            insert_items(&tx, id, &row.line_items)?;
            tx.commit()?;
            Ok(id)
        })
        .await?;

    Ok(ReceiptRecord {
        id,
        receipt_number: new.receipt_number,
        vendor_name: new.vendor_name,
        store_location: new.store_location,
        transaction_date: new.transaction_date,
        subtotal: new.subtotal,
        tax: new.tax,
        total: new.total,
        status: new.status,
        notes: new.notes,
        last_sent_subtotal: new.last_sent_subtotal,
        raw_document: new.raw_document,
        created_at: now,
        updated_at: now,
        line_items: new.line_items,
    })
}

/// Look up a record by business key, line items included.
pub async fn find_by_number(
    db: &Database,
    number: &str,
) -> Result<Option<ReceiptRecord>, StoreError> {
    let number = number.to_string();
    let sql = format!("SELECT {RECEIPT_COLUMNS} FROM receipts r WHERE r.receipt_number = ?1");
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&sql)?;
            match stmt.query_row(params![number], row_to_record) {
                Ok(mut record) => {
                    record.line_items = load_items(conn, record.id)?;
                    Ok(Some(record))
                }
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(Into::into)
}

/// List records, newest transaction date first; undated records sort last.
pub async fn list(
    db: &Database,
    filter: Option<&str>,
) -> Result<Vec<ReceiptRecord>, StoreError> {
    let pattern = filter.map(|f| format!("%{}%", f.to_lowercase()));
    db.connection()
        .call(move |conn| {
            let order = "ORDER BY r.transaction_date IS NULL, r.transaction_date DESC, r.id DESC";
            let mut records = Vec::new();
            match &pattern {
                Some(p) => {
                    let sql = format!(
                        "SELECT {RECEIPT_COLUMNS} FROM receipts r
                         WHERE lower(r.vendor_name) LIKE ?1
                            OR lower(coalesce(r.receipt_number, '')) LIKE ?1
                            OR lower(r.notes) LIKE ?1
                            OR lower(r.store_location) LIKE ?1
                            OR EXISTS (SELECT 1 FROM receipt_items i
                                       WHERE i.receipt_id = r.id AND lower(i.name) LIKE ?1)
                         {order}"
                    );
                    let mut stmt = conn.prepare(&sql)?;
                    let rows = stmt.query_map(params![p], row_to_record)?;
                    for row in rows {
                        records.push(row?);
                    }
                }
                None => {
                    let sql = format!("SELECT {RECEIPT_COLUMNS} FROM receipts r {order}");
                    let mut stmt = conn.prepare(&sql)?;
                    let rows = stmt.query_map([], row_to_record)?;
                    for row in rows {
                        records.push(row?);
                    }
                }
            }
            for record in &mut records {
                record.line_items = load_items(conn, record.id)?;
            }
            Ok(records)
        })
        .await
        .map_err(Into::into)
}

/// Rewrite a record's fields and replace its line items atomically.
pub async fn update(db: &Database, record: &ReceiptRecord) -> Result<(), StoreError> {
    let row = record.clone();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "UPDATE receipts
                 SET receipt_number = ?1, vendor_name = ?2, store_location = ?3,
                     transaction_date = ?4, subtotal = ?5, tax = ?6, total = ?7,
                     status = ?8, notes = ?9, last_sent_subtotal = ?10, updated_at = ?11
                 WHERE id = ?12",
                params![
                    row.receipt_number,
                    row.vendor_name,
                    row.store_location,
                    row.transaction_date.map(|d| d.to_string()),
                    row.subtotal.to_string(),
                    row.tax.to_string(),
                    row.total.to_string(),
                    row.status.as_str(),
                    row.notes,
                    row.last_sent_subtotal.map(|d| d.to_string()),
                    row.updated_at.to_rfc3339(),
                    row.id,
                ],
            )?;
            tx.execute(
                "DELETE FROM receipt_items WHERE receipt_id = ?1",
                params![row.id],
            )?;
            insert_items(&tx, row.id, &row.line_items)?;
            tx.commit()?;
            Ok(())
        })
        .await
        .map_err(Into::into)
}

/// Bump `updated_at` only.
pub async fn touch(db: &Database, id: i64) -> Result<(), StoreError> {
    let now = Utc::now().to_rfc3339();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE receipts SET updated_at = ?1 WHERE id = ?2",
                params![now, id],
            )?;
            Ok(())
        })
        .await
        .map_err(Into::into)
}

/// Delete one record; items cascade.
pub async fn delete(db: &Database, id: i64) -> Result<(), StoreError> {
    db.connection()
        .call(move |conn| {
            conn.execute("DELETE FROM receipts WHERE id = ?1", params![id])?;
            Ok(())
        })
        .await
        .map_err(Into::into)
}

/// Delete every record.
pub async fn delete_all(db: &Database) -> Result<(), StoreError> {
    db.connection()
        .call(|conn| {
            conn.execute("DELETE FROM receipts", [])?;
            Ok(())
        })
        .await
        .map_err(Into::into)
}

fn insert_items(
    tx: &rusqlite::Transaction<'_>,
    receipt_id: i64,
    items: &[LineItem],
) -> rusqlite::Result<()> {
    let mut stmt = tx.prepare(
        "INSERT INTO receipt_items (receipt_id, name, unit_price, quantity, item_code, category)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;
    for item in items {
        stmt.execute(params![
            receipt_id,
            item.name,
            item.unit_price.to_string(),
            item.quantity,
            item.item_code,
            item.category,
        ])?;
    }
    Ok(())
}

fn load_items(conn: &rusqlite::Connection, receipt_id: i64) -> rusqlite::Result<Vec<LineItem>> {
    let mut stmt = conn.prepare(
        "SELECT name, unit_price, quantity, item_code, category
         FROM receipt_items WHERE receipt_id = ?1 ORDER BY id",
    )?;
    let rows = stmt.query_map(params![receipt_id], |row| {
        Ok(LineItem {
            name: row.get(0)?,
            unit_price: decimal_column(row, 1)?,
            quantity: row.get(2)?,
            item_code: row.get(3)?,
            category: row.get(4)?,
        })
    })?;
    rows.collect()
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<ReceiptRecord> {
    Ok(ReceiptRecord {
        id: row.get(0)?,
        receipt_number: row.get(1)?,
        vendor_name: row.get(2)?,
        store_location: row.get(3)?,
        transaction_date: row
            .get::<_, Option<String>>(4)?
            .map(|s| parse_column(4, NaiveDate::from_str(&s)))
            .transpose()?,
        subtotal: decimal_column(row, 5)?,
        tax: decimal_column(row, 6)?,
        total: decimal_column(row, 7)?,
        status: status_column(row, 8)?,
        notes: row.get(9)?,
        last_sent_subtotal: row
            .get::<_, Option<String>>(10)?
            .map(|s| parse_column(10, Decimal::from_str(&s)))
            .transpose()?,
        raw_document: row.get(11)?,
        created_at: datetime_column(row, 12)?,
        updated_at: datetime_column(row, 13)?,
        line_items: Vec::new(),
    })
}

fn decimal_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let raw: String = row.get(idx)?;
    parse_column(idx, Decimal::from_str(&raw))
}

fn datetime_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    parse_column(idx, DateTime::parse_from_rfc3339(&raw)).map(|dt| dt.with_timezone(&Utc))
}

fn status_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<ReceiptStatus> {
    let raw: String = row.get(idx)?;
    ReceiptStatus::parse(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("unknown receipt status: {raw}").into(),
        )
    })
}

fn parse_column<T, E>(idx: usize, parsed: Result<T, E>) -> rusqlite::Result<T>
where
    E: std::error::Error + Send + Sync + 'static,
{
    parsed.map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ReceiptStore;
    use pretty_assertions::assert_eq;
    use recibo_core::models::receipt::LineItem;
    use tempfile::tempdir;

    async fn setup_store() -> (ReceiptStore, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let store = ReceiptStore::open(db_path.to_str().unwrap()).await.unwrap();
        (store, dir)
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn make_new(number: Option<&str>) -> NewReceipt {
        NewReceipt {
            receipt_number: number.map(|s| s.to_string()),
            vendor_name: "Costco Wholesale".to_string(),
            store_location: "Aisle City".to_string(),
            transaction_date: NaiveDate::from_ymd_opt(2025, 7, 10),
            subtotal: dec("19.99"),
            tax: dec("1.65"),
            total: dec("21.64"),
            status: ReceiptStatus::Pending,
            notes: String::new(),
            last_sent_subtotal: None,
            raw_document: Some(b"%PDF-".to_vec()),
            line_items: vec![LineItem::new("Kirkland Paper Towels", dec("19.99"))],
        }
    }

    #[tokio::test]
    async fn insert_and_find_round_trips() {
        let (store, _dir) = setup_store().await;
        let inserted = store.insert(make_new(Some("123456"))).await.unwrap();
        assert!(inserted.id > 0);

        let found = store.find_by_number("123456").await.unwrap().unwrap();
        assert_eq!(found.vendor_name, "Costco Wholesale");
        assert_eq!(found.subtotal, dec("19.99"));
        assert_eq!(found.status, ReceiptStatus::Pending);
        assert_eq!(found.line_items.len(), 1);
        assert_eq!(found.line_items[0].name, "Kirkland Paper Towels");
        assert_eq!(found.raw_document.as_deref(), Some(b"%PDF-".as_slice()));
    }

    #[tokio::test]
    async fn find_unknown_number_returns_none() {
        let (store, _dir) = setup_store().await;
        assert!(store.find_by_number("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_business_key_is_rejected() {
        let (store, _dir) = setup_store().await;
        store.insert(make_new(Some("123456"))).await.unwrap();
        let err = store.insert(make_new(Some("123456"))).await;
        assert!(err.is_err());

        // Keyless records are exempt from the unique index.
        store.insert(make_new(None)).await.unwrap();
        store.insert(make_new(None)).await.unwrap();
    }

    #[tokio::test]
    async fn list_orders_newest_transaction_first() {
        let (store, _dir) = setup_store().await;

        let mut older = make_new(Some("A"));
        older.transaction_date = NaiveDate::from_ymd_opt(2025, 6, 1);
        let mut newer = make_new(Some("B"));
        newer.transaction_date = NaiveDate::from_ymd_opt(2025, 7, 1);
        let mut undated = make_new(Some("C"));
        undated.transaction_date = None;

        store.insert(older).await.unwrap();
        store.insert(undated).await.unwrap();
        store.insert(newer).await.unwrap();

        let listed = store.list(None).await.unwrap();
        let keys: Vec<_> = listed
            .iter()
            .map(|r| r.receipt_number.clone().unwrap())
            .collect();
        assert_eq!(keys, vec!["B", "A", "C"]);
    }

    #[tokio::test]
    async fn list_filter_matches_across_fields() {
        let (store, _dir) = setup_store().await;

        let mut by_vendor = make_new(Some("V1"));
        by_vendor.vendor_name = "Trader Joe's".to_string();
        let mut by_notes = make_new(Some("V2"));
        by_notes.notes = "reimbursable lunch".to_string();
        let mut by_item = make_new(Some("V3"));
        by_item.line_items = vec![LineItem::new("Espresso Beans", dec("12.49"))];
        let unrelated = make_new(Some("V4"));

        store.insert(by_vendor).await.unwrap();
        store.insert(by_notes).await.unwrap();
        store.insert(by_item).await.unwrap();
        store.insert(unrelated).await.unwrap();

        let hits = store.list(Some("TRADER")).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].receipt_number.as_deref(), Some("V1"));

        let hits = store.list(Some("lunch")).await.unwrap();
        assert_eq!(hits[0].receipt_number.as_deref(), Some("V2"));

        let hits = store.list(Some("espresso")).await.unwrap();
        assert_eq!(hits[0].receipt_number.as_deref(), Some("V3"));

        let hits = store.list(Some("V4")).await.unwrap();
        assert_eq!(hits.len(), 1);

        assert!(store.list(Some("zebra")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_replaces_line_items_atomically() {
        let (store, _dir) = setup_store().await;
        let mut record = store.insert(make_new(Some("123"))).await.unwrap();

        record.vendor_name = "Target".to_string();
        record.line_items = vec![
            LineItem::new("Socks", dec("7.99")),
            LineItem::new("Mug", dec("4.50")),
        ];
        store.update(&mut record).await.unwrap();

        let found = store.find_by_number("123").await.unwrap().unwrap();
        assert_eq!(found.vendor_name, "Target");
        let names: Vec<_> = found.line_items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Socks", "Mug"]);
    }

    #[tokio::test]
    async fn delete_cascades_to_items() {
        let (store, _dir) = setup_store().await;
        let record = store.insert(make_new(Some("123"))).await.unwrap();
        store.delete(record.id).await.unwrap();

        assert!(store.find_by_number("123").await.unwrap().is_none());

        let orphans: i64 = store
            .db
            .connection()
            .call(|conn| {
                Ok::<i64, rusqlite::Error>(conn.query_row(
                    "SELECT count(*) FROM receipt_items",
                    [],
                    |r| r.get(0),
                )?)
            })
            .await
            .unwrap();
        assert_eq!(orphans, 0);
    }

    #[tokio::test]
    async fn delete_all_empties_the_store() {
        let (store, _dir) = setup_store().await;
        store.insert(make_new(Some("1"))).await.unwrap();
        store.insert(make_new(Some("2"))).await.unwrap();
        store.delete_all().await.unwrap();
        assert!(store.list(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn touch_bumps_updated_at_only() {
        let (store, _dir) = setup_store().await;
        let record = store.insert(make_new(Some("123"))).await.unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        store.touch(record.id).await.unwrap();

        let found = store.find_by_number("123").await.unwrap().unwrap();
        assert!(found.updated_at > record.updated_at);
        assert_eq!(found.vendor_name, record.vendor_name);
    }
}
