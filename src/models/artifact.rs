use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Archetype {
    Weapon,
    Amulet,
    Tool,
    Relic,
}

impl Archetype {
    pub fn label(&self) -> &'static str {
        match self {
            Archetype::Weapon => "Weapon",
            Archetype::Amulet => "Amulet",
            Archetype::Tool => "Tool",
            Archetype::Relic => "Relic",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    pub fn label(&self) -> &'static str {
        match self {
            Rarity::Common => "Common",
            Rarity::Rare => "Rare",
            Rarity::Epic => "Epic",
            Rarity::Legendary => "Legendary",
        }
    }
}

/// A collectible unlocked by visiting its trigger page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactCard {
    pub id: String,
    pub title: String,
    pub description: String,
    pub archetype: Archetype,
    /// `Page::id` whose visit unlocks this card.
    pub chapter_trigger_id: i64,
    pub icon_path: String,
    pub rarity: Rarity,
}
