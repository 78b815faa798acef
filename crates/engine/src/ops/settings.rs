use sea_orm::{ActiveValue, QuerySelect, prelude::*, sea_query::OnConflict};

use crate::{ResultEngine, UserSettings, user_settings};

use super::Engine;

impl Engine {
    pub async fn user_settings(&self, chat_id: i64) -> ResultEngine<UserSettings> {
        let stored = user_settings::Entity::find_by_id(chat_id)
            .one(&self.database)
            .await?;
        Ok(stored.map(UserSettings::from).unwrap_or_else(|| UserSettings {
            chat_id,
            currency: self.default_currency.clone(),
        }))
    }

    /// Stores default settings for a chat seen for the first time. Existing
    /// settings are left untouched.
    pub async fn register_chat(&self, chat_id: i64) -> ResultEngine<()> {
        let model = user_settings::ActiveModel {
            chat_id: ActiveValue::Set(chat_id),
            currency: ActiveValue::Set(self.default_currency.clone()),
        };
        let inserted = user_settings::Entity::insert(model)
            .on_conflict(
                OnConflict::column(user_settings::Column::ChatId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.database)
            .await?;
        if inserted > 0 {
            tracing::info!(chat_id, "registered new chat");
        }
        Ok(())
    }

    pub async fn known_chats(&self) -> ResultEngine<Vec<i64>> {
        let chats = user_settings::Entity::find()
            .select_only()
            .column(user_settings::Column::ChatId)
            .into_tuple::<i64>()
            .all(&self.database)
            .await?;
        Ok(chats)
    }
}
