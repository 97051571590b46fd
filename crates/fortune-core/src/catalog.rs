//! The fortune-set catalog: which collectible sets exist and which pieces
//! complete them. Static data, shared by every profile.

use serde::{Deserialize, Serialize};

use crate::inventory::Rarity;

/// One collectible piece of a [`FortuneSet`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FortunePiece {
  pub id:    String,
  pub label: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub icon:  Option<String>,
  /// Shown to players who have not found this piece yet.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub hint:  Option<String>,
}

/// A named group of pieces; collecting all of them earns `prize`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FortuneSet {
  pub id:           String,
  pub name:         String,
  pub rarity:       Rarity,
  pub prize:        String,
  pub theme:        String,
  pub accent_color: String,
  pub pieces:       Vec<FortunePiece>,
}

/// The ordered list of sets. Progress is always reported in this order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
  pub sets: Vec<FortuneSet>,
}

impl Catalog {
  pub fn new(sets: Vec<FortuneSet>) -> Self { Self { sets } }

  pub fn get(&self, set_id: &str) -> Option<&FortuneSet> {
    self.sets.iter().find(|s| s.id == set_id)
  }

  /// Parse a catalog from its JSON form (`{"sets": [...]}`).
  pub fn from_json(s: &str) -> crate::Result<Self> { Ok(serde_json::from_str(s)?) }

  /// The catalog shipped with the restaurant's launch campaign.
  pub fn builtin() -> Self {
    Self::new(vec![
      set(
        "dragon-dynasty",
        "Dragon Dynasty",
        "legendary",
        "Family feast for four",
        "dragon",
        "#d4af37",
        &[
          ("dragon-head", "Dragon Head", "🐲"),
          ("dragon-claw", "Dragon Claw", "🦶"),
          ("dragon-tail", "Dragon Tail", "🪭"),
          ("dragon-pearl", "Dragon Pearl", "🔮"),
        ],
      ),
      set(
        "golden-fortune",
        "Golden Fortune",
        "epic",
        "$50 gift card",
        "prosperity",
        "#c0392b",
        &[
          ("gold-coin", "Gold Coin", "🪙"),
          ("red-envelope", "Red Envelope", "🧧"),
          ("paper-lantern", "Paper Lantern", "🏮"),
          ("jade-charm", "Jade Charm", "🟢"),
          ("fortune-slip", "Fortune Slip", "📜"),
        ],
      ),
      set(
        "wok-star",
        "Wok Star",
        "rare",
        "Free entrée for a month",
        "kitchen",
        "#e67e22",
        &[
          ("wok", "Seasoned Wok", "🥘"),
          ("chopsticks", "Chopsticks", "🥢"),
          ("noodle-bowl", "Noodle Bowl", "🍜"),
          ("dumpling", "Dumpling", "🥟"),
        ],
      ),
      set(
        "zodiac-trio",
        "Zodiac Trio",
        "uncommon",
        "Free appetizer",
        "zodiac",
        "#2980b9",
        &[
          ("rat", "Rat", "🐀"),
          ("ox", "Ox", "🐂"),
          ("tiger", "Tiger", "🐅"),
        ],
      ),
    ])
  }
}

fn set(
  id: &str,
  name: &str,
  rarity: &str,
  prize: &str,
  theme: &str,
  accent_color: &str,
  pieces: &[(&str, &str, &str)],
) -> FortuneSet {
  FortuneSet {
    id:           id.to_owned(),
    name:         name.to_owned(),
    rarity:       rarity.into(),
    prize:        prize.to_owned(),
    theme:        theme.to_owned(),
    accent_color: accent_color.to_owned(),
    pieces:       pieces
      .iter()
      .map(|(id, label, icon)| FortunePiece {
        id:    (*id).to_owned(),
        label: (*label).to_owned(),
        icon:  Some((*icon).to_owned()),
        hint:  None,
      })
      .collect(),
  }
}

#[cfg(test)]
mod tests {
  use std::collections::HashSet;

  use super::*;

  #[test]
  fn builtin_ids_are_unique() {
    let catalog = Catalog::builtin();
    let set_ids: HashSet<_> = catalog.sets.iter().map(|s| &s.id).collect();
    assert_eq!(set_ids.len(), catalog.sets.len());

    for s in &catalog.sets {
      assert!(!s.pieces.is_empty(), "{} has no pieces", s.id);
      let piece_ids: HashSet<_> = s.pieces.iter().map(|p| &p.id).collect();
      assert_eq!(piece_ids.len(), s.pieces.len(), "duplicate piece in {}", s.id);
    }
  }

  #[test]
  fn from_json_parses_minimal_catalog() {
    let catalog = Catalog::from_json(
      r##"{"sets":[{"id":"s1","name":"One","rarity":"rare","prize":"tea",
          "theme":"t","accentColor":"#fff",
          "pieces":[{"id":"p1","label":"P1"},{"id":"p2","label":"P2"}]}]}"##,
    )
    .unwrap();
    let s1 = catalog.get("s1").unwrap();
    assert_eq!(s1.pieces.len(), 2);
    assert_eq!(s1.rarity.as_str(), "rare");
    assert!(catalog.get("s2").is_none());
  }
}
