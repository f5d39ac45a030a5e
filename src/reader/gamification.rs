//! Collectible artifacts unlocked by reaching trigger pages.
//!
//! The unlocked set only grows. Revisiting a trigger page after its
//! artifact was collected does nothing.

use std::collections::HashMap;

use thiserror::Error;

use crate::content::PageIndex;
use crate::db::{KeyValueStore, Storage};
use crate::models::{Archetype, ArtifactCard, Rarity};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogIssue {
    #[error("artifact {shadowed} shares trigger page {page_id} with {winner} and can never unlock")]
    DuplicateTrigger {
        page_id: i64,
        winner: String,
        shadowed: String,
    },
    #[error("artifact {artifact} triggers on page {page_id}, which is not in the book")]
    MissingPage { artifact: String, page_id: i64 },
}

#[derive(Debug, Clone)]
pub struct Catalog {
    artifacts: Vec<ArtifactCard>,
}

impl Catalog {
    pub fn new(artifacts: Vec<ArtifactCard>) -> Self {
        Self { artifacts }
    }

    /// Artifacts for the bundled edition, one per major chapter.
    pub fn builtin() -> Self {
        Self::new(vec![
            card(
                "choice",
                "A Espada da Escolha",
                "O poder invencível de escolher. Você recuperou sua agência e não é mais um refém das circunstâncias.",
                Archetype::Weapon,
                6,
                Rarity::Legendary,
                "M14.5 2H6a2 2 0 0 0-2 2v16a2 2 0 0 0 2 2h12a2 2 0 0 0 2-2V7.5L14.5 2z",
            ),
            card(
                "discernment",
                "A Lente da Verdade",
                "A capacidade de distinguir o ruído trivial das poucas coisas vitais. Sua visão agora é clara.",
                Archetype::Tool,
                8,
                Rarity::Epic,
                "M15 12a3 3 0 11-6 0 3 3 0 016 0z",
            ),
            card(
                "tradeoff",
                "A Balança do Destino",
                "A sabedoria para aceitar que não se pode ter tudo. Você aprendeu a arte sagrada da troca.",
                Archetype::Relic,
                10,
                Rarity::Rare,
                "M3 6l3 1m0 0l-3 9a5.002 5.002 0 006.001 0M6 7l3 9",
            ),
            card(
                "escape",
                "O Manto do Silêncio",
                "A habilidade de criar espaço para pensar e escapar do ruído. Um santuário portátil.",
                Archetype::Amulet,
                12,
                Rarity::Rare,
                "M20.354 15.354A9 9 0 018.646 3.646 9.003 9.003 0 0012 21a9.003 9.003 0 008.354-5.646z",
            ),
            card(
                "play",
                "A Chama da Criança",
                "A redescoberta do brincar como combustível para a inovação e exploração.",
                Archetype::Relic,
                15,
                Rarity::Epic,
                "M17.657 18.657A8 8 0 016.343 7.343S7 9 9 10c0-2 .5-5 2.986-7",
            ),
            card(
                "sleep",
                "O Elixir da Vitalidade",
                "A proteção do seu ativo mais valioso: você mesmo. O sono agora é sua arma secreta.",
                Archetype::Amulet,
                17,
                Rarity::Common,
                "M8 4h8l-1 1v5.172a2 2 0 00.586 1.414l5 5",
            ),
            card(
                "select",
                "O Crivo de Ouro",
                "O critério extremo. Se não é um \"SIM\" óbvio, então é um não óbvio.",
                Archetype::Tool,
                19,
                Rarity::Legendary,
                "M9 12l2 2 4-4m6 2a9 9 0 11-18 0 9 9 0 0118 0z",
            ),
            card(
                "courage",
                "O Escudo da Coragem",
                "A bravura para dizer um não elegante e proteger seu tempo.",
                Archetype::Weapon,
                22,
                Rarity::Legendary,
                "M12 15v2m-6 4h12a2 2 0 002-2v-6a2 2 0 00-2-2H6",
            ),
        ])
    }

    pub fn artifacts(&self) -> &[ArtifactCard] {
        &self.artifacts
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    /// First artifact triggered by `page_id`.
    pub fn find_by_trigger(&self, page_id: i64) -> Option<&ArtifactCard> {
        self.artifacts
            .iter()
            .find(|artifact| artifact.chapter_trigger_id == page_id)
    }

    /// Reports artifacts that can never unlock against the given book.
    pub fn validate(&self, pages: &PageIndex) -> Vec<CatalogIssue> {
        let mut issues = Vec::new();
        let mut owners: HashMap<i64, &str> = HashMap::new();

        for artifact in &self.artifacts {
            let page_id = artifact.chapter_trigger_id;
            if let Some(winner) = owners.get(&page_id) {
                issues.push(CatalogIssue::DuplicateTrigger {
                    page_id,
                    winner: winner.to_string(),
                    shadowed: artifact.id.clone(),
                });
                continue;
            }
            owners.insert(page_id, &artifact.id);

            if !pages.contains(page_id) {
                issues.push(CatalogIssue::MissingPage {
                    artifact: artifact.id.clone(),
                    page_id,
                });
            }
        }

        issues
    }
}

fn card(
    id: &str,
    title: &str,
    description: &str,
    archetype: Archetype,
    chapter_trigger_id: i64,
    rarity: Rarity,
    icon_path: &str,
) -> ArtifactCard {
    ArtifactCard {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        archetype,
        chapter_trigger_id,
        icon_path: icon_path.to_string(),
        rarity,
    }
}

pub struct Gamification {
    catalog: Catalog,
    unlocked: Vec<String>,
}

impl Gamification {
    pub fn new(catalog: Catalog, unlocked: Vec<String>) -> Self {
        Self { catalog, unlocked }
    }

    pub async fn load<S: KeyValueStore>(catalog: Catalog, storage: &Storage<S>) -> Self {
        Self::new(catalog, storage.load_unlocked().await)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[cfg(test)]
    pub fn unlocked_ids(&self) -> &[String] {
        &self.unlocked
    }

    pub fn is_unlocked(&self, artifact_id: &str) -> bool {
        self.unlocked.iter().any(|id| id == artifact_id)
    }

    /// Number of catalog artifacts collected so far.
    pub fn unlocked_count(&self) -> usize {
        self.catalog
            .artifacts()
            .iter()
            .filter(|artifact| self.is_unlocked(&artifact.id))
            .count()
    }

    /// Marks the artifact triggered by `page_id` as unlocked. Returns it only
    /// when this call is the one that unlocked it.
    pub fn unlock(&mut self, page_id: i64) -> Option<ArtifactCard> {
        let artifact = self.catalog.find_by_trigger(page_id)?;
        if self.is_unlocked(&artifact.id) {
            return None;
        }
        let artifact = artifact.clone();
        self.unlocked.push(artifact.id.clone());
        Some(artifact)
    }

    /// [`Gamification::unlock`], persisting the full set when it changes.
    pub async fn check_and_unlock<S: KeyValueStore>(
        &mut self,
        page_id: i64,
        storage: &Storage<S>,
    ) -> Option<ArtifactCard> {
        let artifact = self.unlock(page_id)?;
        tracing::info!("Unlocked artifact {} on page {}", artifact.id, page_id);
        if let Err(e) = storage.save_unlocked(&self.unlocked).await {
            tracing::warn!("Failed to save unlocked artifacts: {}", e);
        }
        Some(artifact)
    }
}
