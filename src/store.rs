// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory drink store.
//!
//! Ids are assigned sequentially from 1 and never reused. Titles are unique.

use std::collections::BTreeMap;

use crate::error::ApiError;
use crate::models::{Drink, DrinkChanges, NewDrink};

#[derive(Default)]
pub struct DrinkStore {
    drinks: BTreeMap<u64, Drink>,
    last_id: u64,
}

impl DrinkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All drinks ordered by id.
    pub fn query_all(&self) -> Vec<Drink> {
        self.drinks.values().cloned().collect()
    }

    pub fn get(&self, drink_id: u64) -> Result<Drink, ApiError> {
        self.drinks
            .get(&drink_id)
            .cloned()
            .ok_or_else(|| ApiError::not_found("resource not found"))
    }

    pub fn insert(&mut self, new_drink: NewDrink) -> Result<Drink, ApiError> {
        self.ensure_title_free(&new_drink.title, None)?;

        self.last_id += 1;
        let drink = Drink {
            id: self.last_id,
            title: new_drink.title,
            recipe: new_drink.recipe,
        };
        self.drinks.insert(drink.id, drink.clone());
        Ok(drink)
    }

    pub fn update(&mut self, drink_id: u64, changes: DrinkChanges) -> Result<Drink, ApiError> {
        if !self.drinks.contains_key(&drink_id) {
            return Err(ApiError::not_found("resource not found"));
        }
        if let Some(title) = &changes.title {
            self.ensure_title_free(title, Some(drink_id))?;
        }

        let Some(drink) = self.drinks.get_mut(&drink_id) else {
            return Err(ApiError::not_found("resource not found"));
        };
        if let Some(title) = changes.title {
            drink.title = title;
        }
        if let Some(recipe) = changes.recipe {
            drink.recipe = recipe;
        }
        Ok(drink.clone())
    }

    pub fn delete(&mut self, drink_id: u64) -> Result<(), ApiError> {
        if self.drinks.remove(&drink_id).is_some() {
            Ok(())
        } else {
            Err(ApiError::not_found("resource not found"))
        }
    }

    fn ensure_title_free(&self, title: &str, except: Option<u64>) -> Result<(), ApiError> {
        let taken = self
            .drinks
            .values()
            .any(|drink| drink.title == title && Some(drink.id) != except);

        if taken {
            Err(ApiError::unprocessable(format!(
                "A drink titled '{title}' already exists."
            )))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Ingredient;
    use axum::http::StatusCode;

    fn new_drink(title: &str) -> NewDrink {
        NewDrink {
            title: title.into(),
            recipe: vec![Ingredient {
                name: "espresso".into(),
                color: "brown".into(),
                parts: 1,
            }],
        }
    }

    #[test]
    fn insert_assigns_sequential_ids() {
        let mut store = DrinkStore::new();
        let first = store.insert(new_drink("espresso")).unwrap();
        let second = store.insert(new_drink("doppio")).unwrap();
        assert_eq!((first.id, second.id), (1, 2));
        assert_eq!(store.query_all(), vec![first, second]);
    }

    #[test]
    fn duplicate_title_is_unprocessable() {
        let mut store = DrinkStore::new();
        store.insert(new_drink("espresso")).unwrap();
        let err = store.insert(new_drink("espresso")).unwrap_err();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let mut store = DrinkStore::new();
        let first = store.insert(new_drink("espresso")).unwrap();
        store.delete(first.id).unwrap();
        let second = store.insert(new_drink("espresso")).unwrap();
        assert_eq!(second.id, 2);
    }

    #[test]
    fn update_changes_only_given_fields() {
        let mut store = DrinkStore::new();
        let drink = store.insert(new_drink("espresso")).unwrap();

        let updated = store
            .update(
                drink.id,
                DrinkChanges {
                    title: Some("ristretto".into()),
                    recipe: None,
                },
            )
            .unwrap();

        assert_eq!(updated.title, "ristretto");
        assert_eq!(updated.recipe, drink.recipe);
        assert_eq!(store.get(drink.id).unwrap(), updated);
    }

    #[test]
    fn update_may_keep_own_title() {
        let mut store = DrinkStore::new();
        let drink = store.insert(new_drink("espresso")).unwrap();
        let result = store.update(
            drink.id,
            DrinkChanges {
                title: Some("espresso".into()),
                recipe: None,
            },
        );
        assert!(result.is_ok());
    }

    #[test]
    fn update_to_taken_title_is_unprocessable() {
        let mut store = DrinkStore::new();
        store.insert(new_drink("espresso")).unwrap();
        let other = store.insert(new_drink("latte")).unwrap();

        let err = store
            .update(
                other.id,
                DrinkChanges {
                    title: Some("espresso".into()),
                    recipe: None,
                },
            )
            .unwrap_err();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn missing_ids_are_not_found() {
        let mut store = DrinkStore::new();
        assert_eq!(store.get(9).unwrap_err().status, StatusCode::NOT_FOUND);
        assert_eq!(
            store.update(9, DrinkChanges::default()).unwrap_err().status,
            StatusCode::NOT_FOUND
        );
        assert_eq!(store.delete(9).unwrap_err().status, StatusCode::NOT_FOUND);
    }
}
