//! Category catalog

use chrono::Utc;
use tracing::{info, instrument};

use crate::error::{Error, Result};
use crate::models::{Category, CategoryUpdate, NewCategory};
use crate::storage::{CategoryRepository, Database};
use crate::validation::Validate;

pub struct CategoryCatalog<'a> {
    db: &'a Database,
}

fn category_not_found(id: i64) -> Error {
    Error::not_found(format!("category {id}"))
}

fn name_taken(name: &str) -> Error {
    Error::Conflict(format!("category '{name}' already exists"))
}

impl<'a> CategoryCatalog<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub fn add(&self, request: &NewCategory) -> Result<Category> {
        request.validate()?;

        if self.check_available(&request.name)? {
            return Err(name_taken(&request.name));
        }

        let category = self.db.create_category(&request.name)?;
        info!(category_id = category.id, "Category added");
        Ok(category)
    }

    /// Rename a category. Keeping the current name is not a conflict.
    #[instrument(skip(self, request), fields(category_id = request.id))]
    pub fn update(&self, request: &CategoryUpdate) -> Result<Category> {
        request.validate()?;

        let mut category = self
            .db
            .find_category(request.id)?
            .ok_or_else(|| category_not_found(request.id))?;

        if request.name != category.name {
            if let Some(other) = self.db.find_category_by_name(&request.name)? {
                if other.id != category.id {
                    return Err(name_taken(&request.name));
                }
            }
        }

        if !self.db.rename_category(category.id, &request.name)? {
            return Err(category_not_found(request.id));
        }

        category.name = request.name.clone();
        category.updated_at = Utc::now();
        info!(name = %category.name, "Category updated");
        Ok(category)
    }

    /// Remove a category. Items filed under it are left in place.
    #[instrument(skip(self))]
    pub fn delete(&self, id: i64) -> Result<()> {
        if !self.db.delete_category(id)? {
            return Err(category_not_found(id));
        }
        info!("Category deleted");
        Ok(())
    }

    pub fn get_all(&self) -> Result<Vec<Category>> {
        self.db.list_categories()
    }

    pub fn get_by_id(&self, id: i64) -> Result<Category> {
        self.db
            .find_category(id)?
            .ok_or_else(|| category_not_found(id))
    }

    /// Whether a category with this name already exists
    pub fn check_available(&self, name: &str) -> Result<bool> {
        Ok(self.db.find_category_by_name(name)?.is_some())
    }
}
