//! Deterministic CRM sample database used by the exercises.
//!
//! Four tables: `customers`, `transactions`, `events` (funnel log) and
//! `campaigns`. The same seed always produces the same rows, so reference
//! answers stay stable across machines.

use anyhow::Context;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection};
use serde::Serialize;
use std::path::Path;

pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_CUSTOMERS: usize = 400;
const CAMPAIGNS: usize = 24;

pub const DDL: &str = r#"
DROP TABLE IF EXISTS customers;
DROP TABLE IF EXISTS transactions;
DROP TABLE IF EXISTS events;
DROP TABLE IF EXISTS campaigns;

CREATE TABLE customers (
  customer_id TEXT PRIMARY KEY,
  signup_date TEXT NOT NULL,
  acquisition_channel TEXT NOT NULL,
  region TEXT NOT NULL,
  age_group TEXT NOT NULL
);

CREATE TABLE transactions (
  transaction_id TEXT PRIMARY KEY,
  customer_id TEXT NOT NULL,
  transaction_date TEXT NOT NULL,
  amount REAL NOT NULL,
  product_category TEXT NOT NULL
);

CREATE TABLE events (
  event_id TEXT PRIMARY KEY,
  user_id TEXT NOT NULL,
  session_id TEXT NOT NULL,
  event_type TEXT NOT NULL,
  event_date TEXT NOT NULL,
  event_timestamp TEXT NOT NULL,
  page_url TEXT NOT NULL,
  device TEXT NOT NULL,
  channel TEXT NOT NULL
);

CREATE TABLE campaigns (
  campaign_id TEXT PRIMARY KEY,
  campaign_name TEXT NOT NULL,
  channel TEXT NOT NULL,
  start_date TEXT NOT NULL,
  end_date TEXT NOT NULL,
  budget REAL NOT NULL,
  impressions INTEGER NOT NULL,
  clicks INTEGER NOT NULL,
  conversions INTEGER NOT NULL,
  revenue REAL NOT NULL
);
"#;

const INDEXES: &str = r#"
CREATE INDEX IF NOT EXISTS idx_customers_id ON customers(customer_id);
CREATE INDEX IF NOT EXISTS idx_transactions_customer ON transactions(customer_id);
CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(transaction_date);
CREATE INDEX IF NOT EXISTS idx_events_user ON events(user_id);
CREATE INDEX IF NOT EXISTS idx_events_date ON events(event_date);
"#;

const CHANNELS: [&str; 5] = ["organic", "paid_search", "social", "referral", "email"];
const REGIONS: [&str; 5] = ["north", "south", "east", "west", "central"];
const AGE_GROUPS: [&str; 4] = ["20s", "30s", "40s", "50s"];
const CATEGORIES: [&str; 5] = ["fashion", "beauty", "electronics", "home", "food"];
const DEVICES: [&str; 3] = ["mobile", "desktop", "tablet"];
const FUNNEL: [(&str, f64); 5] = [
    ("page_view", 1.0),
    ("product_view", 0.6),
    ("add_to_cart", 0.25),
    ("checkout_start", 0.15),
    ("purchase", 0.08),
];

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct SampleStats {
    pub customers: usize,
    pub transactions: usize,
    pub events: usize,
    pub campaigns: usize,
}

/// Small xorshift generator; deterministic for a given seed.
struct SeededRng(u64);

impl SeededRng {
    fn new(seed: u64) -> Self {
        Self(seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) | 1)
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n.max(1)
    }

    fn unit(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.below(items.len() as u64) as usize]
    }
}

/// Creates (or replaces) the sample tables at `path`.
pub fn create_sample_database(path: &Path) -> anyhow::Result<SampleStats> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut conn = Connection::open(path)
        .with_context(|| format!("failed to create database {}", path.display()))?;
    let stats = populate(&mut conn, DEFAULT_SEED, DEFAULT_CUSTOMERS)?;
    tracing::info!(
        event = "sqlgrade.sample_db_created",
        path = %path.display(),
        customers = stats.customers,
        transactions = stats.transactions,
        events = stats.events,
        campaigns = stats.campaigns
    );
    Ok(stats)
}

pub fn populate(conn: &mut Connection, seed: u64, customers: usize) -> anyhow::Result<SampleStats> {
    conn.execute_batch(DDL)?;

    let mut rng = SeededRng::new(seed);
    let mut stats = SampleStats::default();
    let epoch = NaiveDate::from_ymd_opt(2023, 1, 1).context("invalid epoch")?;
    let last_day = NaiveDate::from_ymd_opt(2024, 12, 31).context("invalid end date")?;

    let tx = conn.transaction()?;
    {
        let mut ins_customer = tx.prepare(
            "INSERT INTO customers(customer_id, signup_date, acquisition_channel, region, age_group)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        let mut ins_tx = tx.prepare(
            "INSERT INTO transactions(transaction_id, customer_id, transaction_date, amount, product_category)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        let mut ins_event = tx.prepare(
            "INSERT INTO events(event_id, user_id, session_id, event_type, event_date, event_timestamp, page_url, device, channel)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )?;

        for i in 1..=customers {
            let customer_id = format!("C{:05}", i);
            let signup = epoch + Duration::days(rng.below(540) as i64);
            let channel = *rng.pick(&CHANNELS);
            ins_customer.execute(params![
                customer_id,
                signup.format("%Y-%m-%d").to_string(),
                channel,
                *rng.pick(&REGIONS),
                *rng.pick(&AGE_GROUPS),
            ])?;
            stats.customers += 1;

            let active_days = (last_day - signup).num_days().max(1) as u64;
            for _ in 0..rng.below(12) {
                stats.transactions += 1;
                let day = signup + Duration::days(rng.below(active_days) as i64);
                let amount = ((rng.below(190) + 10) * 500) as f64;
                ins_tx.execute(params![
                    format!("T{:07}", stats.transactions),
                    customer_id,
                    day.format("%Y-%m-%d").to_string(),
                    amount,
                    *rng.pick(&CATEGORIES),
                ])?;
            }

            for _ in 0..(rng.below(6) + 1) {
                let day = epoch + Duration::days(rng.below(730) as i64);
                let mut at: NaiveDateTime = day
                    .and_hms_opt(rng.below(24) as u32, rng.below(60) as u32, 0)
                    .context("invalid session time")?;
                let session_id = format!("S{:06}", 100_000 + rng.below(900_000));
                let device = *rng.pick(&DEVICES);
                let mut reached = 1.0;
                for (step, (event_type, rate)) in FUNNEL.iter().enumerate() {
                    // `rate` is the share of sessions reaching this stage.
                    if rng.unit() > *rate / reached {
                        break;
                    }
                    reached = *rate;
                    stats.events += 1;
                    let page = if step == 0 {
                        "/home".to_string()
                    } else {
                        format!("/{}", event_type)
                    };
                    ins_event.execute(params![
                        format!("E{}", stats.events),
                        customer_id,
                        session_id,
                        *event_type,
                        at.format("%Y-%m-%d").to_string(),
                        at.format("%Y-%m-%d %H:%M:%S").to_string(),
                        page,
                        device,
                        channel,
                    ])?;
                    at += Duration::minutes(rng.below(29) as i64 + 1);
                }
            }
        }

        let mut ins_campaign = tx.prepare(
            "INSERT INTO campaigns(campaign_id, campaign_name, channel, start_date, end_date, budget, impressions, clicks, conversions, revenue)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )?;
        for i in 1..=CAMPAIGNS {
            let channel = *rng.pick(&CHANNELS);
            let start = epoch + Duration::days(rng.below(700) as i64);
            let end = start + Duration::days(rng.below(30) as i64 + 7);
            let budget = ((rng.below(90) + 10) * 100_000) as f64;
            let impressions = (rng.below(450_000) + 50_000) as i64;
            let clicks = impressions * (rng.below(40) as i64 + 5) / 1000;
            let conversions = clicks * (rng.below(80) as i64 + 10) / 1000;
            let revenue = (conversions * (rng.below(60) as i64 + 20) * 1000) as f64;
            ins_campaign.execute(params![
                format!("CMP{:03}", i),
                format!("{} campaign {}", channel, i),
                channel,
                start.format("%Y-%m-%d").to_string(),
                end.format("%Y-%m-%d").to_string(),
                budget,
                impressions,
                clicks,
                conversions,
                revenue,
            ])?;
            stats.campaigns += 1;
        }
    }
    tx.commit()?;

    conn.execute_batch(INDEXES)?;
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_populate_is_deterministic() {
        let mut a = Connection::open_in_memory().unwrap();
        let mut b = Connection::open_in_memory().unwrap();
        let sa = populate(&mut a, 7, 50).unwrap();
        let sb = populate(&mut b, 7, 50).unwrap();
        assert_eq!(sa, sb);
        assert_eq!(sa.customers, 50);
        assert_eq!(sa.campaigns, CAMPAIGNS);

        let total = |c: &Connection| -> f64 {
            c.query_row("SELECT COALESCE(SUM(amount), 0) FROM transactions", [], |r| r.get(0))
                .unwrap()
        };
        assert_eq!(total(&a), total(&b));
    }

    // Reference answers depend on this exact stream.
    #[test]
    fn test_seeded_rng_stream_is_pinned() {
        let mut rng = SeededRng::new(DEFAULT_SEED);
        assert_eq!(rng.next_u64(), 15223144655518340869);
        assert_eq!(rng.next_u64(), 15225508067802409835);
        assert_eq!(rng.next_u64(), 10833081828263147645);
    }

    #[test]
    fn test_funnel_is_monotonic() {
        let mut conn = Connection::open_in_memory().unwrap();
        populate(&mut conn, DEFAULT_SEED, 200).unwrap();
        let count = |t: &str| -> i64 {
            conn.query_row(
                "SELECT COUNT(*) FROM events WHERE event_type = ?1",
                [t],
                |r| r.get(0),
            )
            .unwrap()
        };
        assert!(count("page_view") >= count("product_view"));
        assert!(count("product_view") >= count("add_to_cart"));
        assert!(count("page_view") > 0);
    }

    #[test]
    fn test_create_replaces_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("crm.db");
        let first = create_sample_database(&path).unwrap();
        let second = create_sample_database(&path).unwrap();
        assert_eq!(first, second);
    }
}
