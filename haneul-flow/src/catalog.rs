use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::collections::HashSet;
use tracing::info;

use crate::error::{FlowError, Result};

/// A fixed travel/exchange offering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelPackage {
    pub id: u32,
    pub title: String,
    pub destination: String,
    pub duration: String,
    /// Already formatted for display, e.g. `R$ 12.900`.
    pub price: String,
    pub remaining_slots: u32,
    pub language: String,
    pub inclusions: Vec<String>,
    pub image: String,
}

impl TravelPackage {
    pub fn is_sold_out(&self) -> bool {
        self.remaining_slots == 0
    }

    /// Case-insensitive substring match on title or destination.
    /// An empty query matches every package.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        query.is_empty()
            || self.title.to_lowercase().contains(&query)
            || self.destination.to_lowercase().contains(&query)
    }
}

/// Source of the package list. The built-in catalog can be swapped for a
/// remote or file-backed one without touching the flow.
#[async_trait]
pub trait PackageRepository: Send + Sync {
    async fn list_packages(&self) -> Result<Vec<TravelPackage>>;
}

/// The packages shipped with the app
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog;

impl StaticCatalog {
    pub fn new() -> Self {
        Self
    }

    pub fn packages() -> Vec<TravelPackage> {
        vec![
            TravelPackage {
                id: 1,
                title: "Coreia do Sul - Seul".to_string(),
                destination: "Seul, Coreia do Sul".to_string(),
                duration: "15 dias".to_string(),
                price: "R$ 12.900".to_string(),
                remaining_slots: 3,
                language: "Coreano".to_string(),
                inclusions: vec![
                    "Passagem aérea ida e volta".to_string(),
                    "Hospedagem em residência estudantil".to_string(),
                    "Curso de coreano (20h semanais)".to_string(),
                    "Seguro viagem".to_string(),
                    "Traslado aeroporto".to_string(),
                ],
                image: "/images/pacotes/seul.jpg".to_string(),
            },
            TravelPackage {
                id: 2,
                title: "Coreia do Sul - Busan".to_string(),
                destination: "Busan, Coreia do Sul".to_string(),
                duration: "10 dias".to_string(),
                price: "R$ 9.800".to_string(),
                remaining_slots: 1,
                language: "Coreano".to_string(),
                inclusions: vec![
                    "Passagem aérea ida e volta".to_string(),
                    "Hospedagem em hotel 3 estrelas".to_string(),
                    "City tour guiado".to_string(),
                    "Seguro viagem".to_string(),
                ],
                image: "/images/pacotes/busan.jpg".to_string(),
            },
            TravelPackage {
                id: 3,
                title: "Coreia do Sul - Jeju".to_string(),
                destination: "Ilha de Jeju, Coreia do Sul".to_string(),
                duration: "7 dias".to_string(),
                price: "R$ 7.500".to_string(),
                remaining_slots: 0,
                language: "Coreano".to_string(),
                inclusions: vec![
                    "Passagem aérea ida e volta".to_string(),
                    "Hospedagem em resort".to_string(),
                    "Passeios pela ilha".to_string(),
                ],
                image: "/images/pacotes/jeju.jpg".to_string(),
            },
        ]
    }
}

#[async_trait]
impl PackageRepository for StaticCatalog {
    async fn list_packages(&self) -> Result<Vec<TravelPackage>> {
        Ok(Self::packages())
    }
}

/// Catalog read from a JSON array of packages
pub struct JsonCatalog {
    path: PathBuf,
}

impl JsonCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl PackageRepository for JsonCatalog {
    async fn list_packages(&self) -> Result<Vec<TravelPackage>> {
        let bytes = tokio::fs::read(&self.path).await?;
        let packages: Vec<TravelPackage> = serde_json::from_slice(&bytes)?;
        ensure_unique_ids(&packages)?;
        info!(path = %self.path.display(), count = packages.len(), "Catalog loaded from file");
        Ok(packages)
    }
}

/// Fails on the first id that appears twice.
pub fn ensure_unique_ids(packages: &[TravelPackage]) -> Result<()> {
    let mut seen = HashSet::with_capacity(packages.len());
    match packages.iter().find(|p| !seen.insert(p.id)) {
        Some(duplicate) => Err(FlowError::DuplicatePackage(duplicate.id)),
        None => Ok(()),
    }
}

/// Packages whose title or destination contains `query`, in catalog order.
pub fn filter_packages<'a>(packages: &'a [TravelPackage], query: &str) -> Vec<&'a TravelPackage> {
    packages.iter().filter(|p| p.matches(query)).collect()
}

/// Availability badge text: "Esgotado", "1 vaga" or "N vagas".
pub fn slot_badge(remaining_slots: u32) -> String {
    match remaining_slots {
        0 => "Esgotado".to_string(),
        1 => "1 vaga".to_string(),
        n => format!("{n} vagas"),
    }
}

/// What a catalog card shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageCard {
    pub id: u32,
    pub title: String,
    pub destination: String,
    pub duration: String,
    pub price: String,
    pub badge: String,
    /// Whether the "Ver Pacote" action is enabled.
    pub view_enabled: bool,
}

impl From<&TravelPackage> for PackageCard {
    fn from(package: &TravelPackage) -> Self {
        Self {
            id: package.id,
            title: package.title.clone(),
            destination: package.destination.clone(),
            duration: package.duration.clone(),
            price: package.price.clone(),
            badge: slot_badge(package.remaining_slots),
            view_enabled: !package.is_sold_out(),
        }
    }
}
