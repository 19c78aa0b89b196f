use crate::{
    error::{AppError, AppResult},
    models::{category, status_definition, Category, CategoryModel, StatusDefinition,
        StatusDefinitionModel},
    services::lifecycle::MANUAL_SELECTION_EXCLUDED,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

/// Admin-configurable status and category catalogs. The three reserved
/// status names the lifecycle engine depends on (New, Resolved,
/// Case Closed) cannot be renamed or deleted.
pub struct CatalogService {
    db: DatabaseConnection,
}

impl CatalogService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list_statuses(&self) -> AppResult<Vec<StatusDefinitionModel>> {
        let statuses = StatusDefinition::find()
            .order_by_asc(status_definition::Column::SortOrder)
            .order_by_asc(status_definition::Column::Id)
            .all(&self.db)
            .await?;
        Ok(statuses)
    }

    pub async fn create_status(
        &self,
        name: &str,
        color: &str,
        sort_order: i32,
    ) -> AppResult<StatusDefinitionModel> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Status name is required".to_string()));
        }

        let exists = StatusDefinition::find()
            .filter(status_definition::Column::Name.eq(name))
            .one(&self.db)
            .await?
            .is_some();
        if exists {
            return Err(AppError::Conflict(format!(
                "Status \"{}\" already exists",
                name
            )));
        }

        let now = chrono::Utc::now().naive_utc();
        let row = status_definition::ActiveModel {
            name: sea_orm::ActiveValue::Set(name.to_string()),
            color: sea_orm::ActiveValue::Set(color.to_string()),
            sort_order: sea_orm::ActiveValue::Set(sort_order),
            created_at: sea_orm::ActiveValue::Set(now),
            ..Default::default()
        };
        let saved = row
            .insert(&self.db)
            .await
            .map_err(|e| AppError::from_store_write("create_status", e))?;
        Ok(saved)
    }

    pub async fn update_status(
        &self,
        id: i32,
        name: Option<&str>,
        color: Option<&str>,
        sort_order: Option<i32>,
    ) -> AppResult<StatusDefinitionModel> {
        let existing = StatusDefinition::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let renaming = name.map(str::trim).filter(|n| *n != existing.name);
        if renaming.is_some() && MANUAL_SELECTION_EXCLUDED.contains(&existing.name.as_str()) {
            return Err(AppError::Validation(format!(
                "Status \"{}\" is reserved and cannot be renamed",
                existing.name
            )));
        }

        let mut active: status_definition::ActiveModel = existing.into();
        if let Some(name) = renaming {
            active.name = sea_orm::ActiveValue::Set(name.to_string());
        }
        if let Some(color) = color {
            active.color = sea_orm::ActiveValue::Set(color.to_string());
        }
        if let Some(sort_order) = sort_order {
            active.sort_order = sea_orm::ActiveValue::Set(sort_order);
        }

        let updated = active
            .update(&self.db)
            .await
            .map_err(|e| AppError::from_store_write("update_status", e))?;
        Ok(updated)
    }

    pub async fn delete_status(&self, id: i32) -> AppResult<()> {
        let existing = StatusDefinition::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        if MANUAL_SELECTION_EXCLUDED.contains(&existing.name.as_str()) {
            return Err(AppError::Validation(format!(
                "Status \"{}\" is reserved and cannot be deleted",
                existing.name
            )));
        }

        StatusDefinition::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| AppError::from_store_write("delete_status", e))?;
        Ok(())
    }

    pub async fn list_categories(&self) -> AppResult<Vec<CategoryModel>> {
        let categories = Category::find()
            .order_by_asc(category::Column::Name)
            .all(&self.db)
            .await?;
        Ok(categories)
    }

    pub async fn create_category(&self, name: &str) -> AppResult<CategoryModel> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation(
                "Category name is required".to_string(),
            ));
        }

        let exists = Category::find()
            .filter(category::Column::Name.eq(name))
            .one(&self.db)
            .await?
            .is_some();
        if exists {
            return Err(AppError::Conflict(format!(
                "Category \"{}\" already exists",
                name
            )));
        }

        let now = chrono::Utc::now().naive_utc();
        let row = category::ActiveModel {
            name: sea_orm::ActiveValue::Set(name.to_string()),
            created_at: sea_orm::ActiveValue::Set(now),
            ..Default::default()
        };
        let saved = row
            .insert(&self.db)
            .await
            .map_err(|e| AppError::from_store_write("create_category", e))?;
        Ok(saved)
    }

    pub async fn delete_category(&self, id: i32) -> AppResult<()> {
        Category::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        Category::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| AppError::from_store_write("delete_category", e))?;
        Ok(())
    }
}
