use sea_orm::DatabaseConnection;

use crate::ResultEngine;

mod budgets;
mod settings;
mod transactions;

pub const DEFAULT_CURRENCY: &str = "EUR";

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    default_currency: String,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    default_currency: Option<String>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    pub fn default_currency(mut self, currency: &str) -> EngineBuilder {
        let currency = currency.trim();
        if !currency.is_empty() {
            self.default_currency = Some(currency.to_string());
        }
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            default_currency: self
                .default_currency
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        })
    }
}
