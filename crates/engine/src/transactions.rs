//! Transaction primitives.
//!
//! A `Transaction` records one income or expense of a chat. Transactions are
//! immutable once created.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Expense,
    Income,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Expense => "expense",
            Self::Income => "income",
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "expense" => Ok(Self::Expense),
            "income" => Ok(Self::Income),
            other => Err(EngineError::InvalidText(format!(
                "invalid transaction kind: {other}"
            ))),
        }
    }
}

/// A transaction about to be stored. The store assigns the id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub chat_id: i64,
    pub kind: TransactionKind,
    pub amount: Money,
    pub category: String,
    pub description: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub chat_id: i64,
    pub kind: TransactionKind,
    pub amount: Money,
    pub category: String,
    pub description: String,
    pub occurred_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new(new: NewTransaction) -> Result<Self, EngineError> {
        if !new.amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "amount must be > 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            chat_id: new.chat_id,
            kind: new.kind,
            amount: new.amount,
            category: new.category,
            description: new.description,
            occurred_at: new.occurred_at,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub chat_id: i64,
    pub kind: String,
    pub amount_minor: i64,
    pub category: String,
    pub description: String,
    pub occurred_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            chat_id: ActiveValue::Set(tx.chat_id),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            amount_minor: ActiveValue::Set(tx.amount.minor()),
            category: ActiveValue::Set(tx.category.clone()),
            description: ActiveValue::Set(tx.description.clone()),
            occurred_at: ActiveValue::Set(tx.occurred_at),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("transaction not exists".to_string()))?,
            chat_id: model.chat_id,
            kind: TransactionKind::try_from(model.kind.as_str())?,
            amount: Money::new(model.amount_minor),
            category: model.category,
            description: model.description,
            occurred_at: model.occurred_at,
        })
    }
}
