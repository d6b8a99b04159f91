//! CategoryStore - Lookup table for category profiles
//!
//! Strict lookups only: an unknown category id is an error. The store
//! never invents a default profile for a typo.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tonggwan_core::RiskLevel;

use crate::profile::CategoryProfile;

/// Catalog-related errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// No profile for the requested category id
    #[error("Unknown category: {id}")]
    UnknownCategory { id: String },

    /// A loaded profile's id does not match its map key
    #[error("Category id mismatch: key {key}, profile {id}")]
    IdMismatch { key: String, id: String },
}

/// Result alias for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Profile store keyed by category id.
///
/// # Examples
/// ```
/// use tonggwan_catalog::CategoryStore;
///
/// let store = CategoryStore::with_defaults();
/// let books = store.get("books").unwrap();
/// assert!(books.duty_free_eligible);
/// assert!(store.get("no_such_category").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryStore {
    categories: BTreeMap<String, CategoryProfile>,
}

impl CategoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self {
            categories: BTreeMap::new(),
        }
    }

    /// Creates a store seeded with the shipped category set
    pub fn with_defaults() -> Self {
        let mut store = Self::new();

        store.insert(
            CategoryProfile::new("general_goods", "일반 잡화", Decimal::from(8))
                .with_notes("특이 요건 없는 일반 소비재"),
        );
        store.insert(CategoryProfile::new("clothing", "의류", Decimal::from(13)));
        store.insert(
            CategoryProfile::new("electronics", "전자제품", Decimal::from(8))
                .with_notes("전파법 인증 대상 기기 포함 가능"),
        );
        store.insert(CategoryProfile::new(
            "cosmetics",
            "화장품",
            Decimal::new(65, 1),
        ));
        store.insert(CategoryProfile::new("books", "도서", Decimal::ZERO));
        store.insert(
            CategoryProfile::new("health_food", "건강기능식품", Decimal::from(8))
                .with_base_risk(RiskLevel::Medium)
                .with_duty_free_eligible(false)
                .with_notes("목록통관 배제 품목. 수량 제한 및 수입신고 확인 필요")
                .with_reference_url(
                    "https://www.customs.go.kr/kcs/cm/cntnts/cntntsView.do?mi=2793&cntntsId=821",
                ),
        );
        store.insert(
            CategoryProfile::new("medicine", "의약품", Decimal::from(8))
                .with_base_risk(RiskLevel::High)
                .with_duty_free_eligible(false)
                .with_notes("수입요건 확인 대상. 처방전 또는 요건 서류 필요")
                .with_reference_url("https://unipass.customs.go.kr/clip/index.do"),
        );
        store.insert(
            CategoryProfile::new("jewelry", "귀금속·보석", Decimal::from(8))
                .with_base_risk(RiskLevel::Medium)
                .with_special_tax(Decimal::from(20))
                .with_notes("개별소비세 부과 대상"),
        );
        store.insert(
            CategoryProfile::new("food", "일반 식품", Decimal::from(20))
                .with_base_risk(RiskLevel::Medium)
                .with_notes("검역 대상 품목 포함 가능"),
        );

        store
    }

    /// Adds or replaces a profile, keyed by its id
    pub fn insert(&mut self, profile: CategoryProfile) {
        self.categories.insert(profile.id.clone(), profile);
    }

    /// Returns the profile for a category id
    pub fn get(&self, id: &str) -> CatalogResult<&CategoryProfile> {
        self.categories
            .get(id)
            .ok_or_else(|| CatalogError::UnknownCategory { id: id.to_string() })
    }

    /// All profiles sorted by Korean title
    pub fn list(&self) -> Vec<&CategoryProfile> {
        let mut profiles: Vec<&CategoryProfile> = self.categories.values().collect();
        profiles.sort_by(|a, b| a.title.cmp(&b.title));
        profiles
    }

    /// Checks map keys against embedded profile ids after a config load
    pub fn validate(&self) -> CatalogResult<()> {
        for (key, profile) in &self.categories {
            if key != &profile.id {
                return Err(CatalogError::IdMismatch {
                    key: key.clone(),
                    id: profile.id.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

impl Default for CategoryStore {
    fn default() -> Self {
        Self::with_defaults()
    }
}
