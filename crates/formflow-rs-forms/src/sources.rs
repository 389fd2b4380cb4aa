//! Collaborator interfaces the engine consumes.
//!
//! The engine never talks to the network itself: geographic data, the
//! email-existence check, and record persistence are reached through the
//! traits here, implemented by surrounding code and handed in as trait
//! objects.

use std::sync::Arc;

use async_trait::async_trait;

use formflow_rs_core::FormResult;

use crate::cascade::OptionLoader;
use crate::state::FormValues;

/// One selectable option: a stable code plus display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    /// Stable option code (e.g. a state abbreviation).
    pub code: String,
    /// Display name.
    pub name: String,
}

impl Choice {
    /// Creates a new `Choice`.
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

/// Source of geographic option data.
///
/// Both listings must be callable repeatedly and independently; the
/// engine may issue overlapping calls and discard superseded results.
#[async_trait]
pub trait GeoDataSource: Send + Sync {
    /// Lists the selectable states.
    async fn list_states(&self) -> FormResult<Vec<Choice>>;

    /// Lists the cities of one state.
    async fn list_cities(&self, state_code: &str) -> FormResult<Vec<Choice>>;
}

/// Remote check for whether an email address is already registered.
#[async_trait]
pub trait UniquenessChecker: Send + Sync {
    /// Returns `true` when the address already exists.
    async fn exists(&self, email: &str) -> FormResult<bool>;
}

/// Destination for collected registration values.
///
/// Receives whatever subset of field values the caller chooses to
/// persist (see [`FormState::values_subset`](crate::state::FormState::values_subset)).
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Persists the given field values.
    async fn save(&self, record: &FormValues) -> FormResult<()>;
}

/// Adapts a [`GeoDataSource`] into the city-options loader of a
/// state→city cascade.
pub struct CityLoader {
    geo: Arc<dyn GeoDataSource>,
}

impl CityLoader {
    /// Creates a loader backed by the given data source.
    pub fn new(geo: Arc<dyn GeoDataSource>) -> Self {
        Self { geo }
    }
}

#[async_trait]
impl OptionLoader for CityLoader {
    async fn load(&self, parent_value: &str) -> FormResult<Vec<Choice>> {
        self.geo.list_cities(parent_value).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct TableGeo {
        cities: HashMap<String, Vec<Choice>>,
    }

    #[async_trait]
    impl GeoDataSource for TableGeo {
        async fn list_states(&self) -> FormResult<Vec<Choice>> {
            Ok(vec![Choice::new("SP", "São Paulo"), Choice::new("RJ", "Rio de Janeiro")])
        }

        async fn list_cities(&self, state_code: &str) -> FormResult<Vec<Choice>> {
            Ok(self.cities.get(state_code).cloned().unwrap_or_default())
        }
    }

    #[tokio::test]
    async fn test_city_loader_delegates_to_source() {
        let mut cities = HashMap::new();
        cities.insert(
            "SP".to_string(),
            vec![Choice::new("3509502", "Campinas"), Choice::new("3548500", "Santos")],
        );
        let loader = CityLoader::new(Arc::new(TableGeo { cities }));

        let options = loader.load("SP").await.unwrap();
        assert_eq!(options.len(), 2);
        assert_eq!(options[0].name, "Campinas");

        // Unknown state yields an empty list, not an error.
        assert!(loader.load("XX").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_listings_are_independent() {
        let geo = TableGeo {
            cities: HashMap::new(),
        };
        let first = geo.list_states().await.unwrap();
        let second = geo.list_states().await.unwrap();
        assert_eq!(first, second);
    }
}
