use super::{PersistenceResult, PlanStore};
use crate::plan::BidPlan;
use crate::rates::RateCard;
use crate::validation::validate_plan;
use rusqlite::{Connection, OptionalExtension, params};
use std::sync::Mutex;

/// Single-plan store: one row for the plan, one for the rate card, both
/// serialized as JSON. Saving replaces the previous snapshot atomically.
pub struct SqlitePlanStore {
    connection: Mutex<Connection>,
}

impl SqlitePlanStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            CREATE TABLE IF NOT EXISTS bid_plan (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                plan_json TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS rate_card (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                card_json TEXT NOT NULL
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }
}

impl PlanStore for SqlitePlanStore {
    fn save_plan(&self, plan: &BidPlan, card: &RateCard) -> PersistenceResult<()> {
        validate_plan(plan)?;
        let plan_json = serde_json::to_string(plan)?;
        let card_json = serde_json::to_string(card)?;

        let mut conn = self.connection.lock().expect("sqlite mutex poisoned");
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM bid_plan", [])?;
        tx.execute(
            "INSERT INTO bid_plan (id, plan_json) VALUES (1, ?1)",
            params![plan_json],
        )?;
        tx.execute("DELETE FROM rate_card", [])?;
        tx.execute(
            "INSERT INTO rate_card (id, card_json) VALUES (1, ?1)",
            params![card_json],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn load_plan(&self) -> PersistenceResult<Option<(BidPlan, RateCard)>> {
        let conn = self.connection.lock().expect("sqlite mutex poisoned");

        let mut stmt = conn.prepare("SELECT plan_json FROM bid_plan WHERE id = 1")?;
        let plan_json_opt: Option<String> = stmt.query_row([], |row| row.get(0)).optional()?;

        let Some(plan_json) = plan_json_opt else {
            return Ok(None);
        };
        let plan: BidPlan = serde_json::from_str(&plan_json)?;

        let mut stmt = conn.prepare("SELECT card_json FROM rate_card WHERE id = 1")?;
        let card_json_opt: Option<String> = stmt.query_row([], |row| row.get(0)).optional()?;
        let card = match card_json_opt {
            Some(json) => serde_json::from_str(&json)?,
            None => RateCard::new(),
        };

        validate_plan(&plan)?;
        Ok(Some((plan, card)))
    }
}
