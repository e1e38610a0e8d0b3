//! Items and inventories.
//!
//! An `Item` is either a plain, unique object (a knife, a letter) or a collectible stack
//! (coins, arrows) that carries an amount. Stacks with the same name merge whenever they
//! meet, both in an `Inventory` and on a map tile.

use log::info;
use serde::{Deserialize, Serialize};
use variantly::Variantly;

/// Whether an item is a single object or a stack.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Variantly)]
pub enum ItemKind {
    Plain,
    Collectible(u32),
}

/// Something that can lie on a tile or be carried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub sprite: String,
    pub kind: ItemKind,
}

impl Item {
    pub fn plain(name: impl Into<String>, sprite: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sprite: sprite.into(),
            kind: ItemKind::Plain,
        }
    }

    pub fn collectible(name: impl Into<String>, sprite: impl Into<String>, amount: u32) -> Self {
        Self {
            name: name.into(),
            sprite: sprite.into(),
            kind: ItemKind::Collectible(amount),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sprite(&self) -> &str {
        &self.sprite
    }

    /// Number of units this item represents (1 for plain items).
    pub fn amount(&self) -> u32 {
        match self.kind {
            ItemKind::Plain => 1,
            ItemKind::Collectible(amount) => amount,
        }
    }

    /// True if `other` can be merged into this item's stack.
    pub fn stacks_with(&self, other: &Item) -> bool {
        self.kind.is_collectible() && other.kind.is_collectible() && self.name == other.name
    }

    /// Merge another stack of the same collectible into this one.
    /// Returns the item back if it doesn't stack.
    pub fn merge(&mut self, other: Item) -> Option<Item> {
        if !self.stacks_with(&other) {
            return Some(other);
        }
        if let ItemKind::Collectible(amount) = &mut self.kind {
            *amount = amount.saturating_add(other.amount());
        }
        None
    }

    /// Split `amount` units off a collectible stack.
    ///
    /// Returns `None` (leaving the stack intact) if this isn't a collectible or the
    /// stack holds no more than `amount` units; callers take the whole item then.
    fn split(&mut self, amount: u32) -> Option<Item> {
        match &mut self.kind {
            ItemKind::Collectible(held) if *held > amount => {
                *held -= amount;
                Some(Item::collectible(self.name.clone(), self.sprite.clone(), amount))
            },
            _ => None,
        }
    }
}

/// Items carried by a player.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    items: Vec<Item>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item, merging collectibles into an existing stack of the same name.
    pub fn add(&mut self, item: Item) {
        info!("inventory +{} x{}", item.name, item.amount());
        let leftover = match self.items.iter_mut().find(|held| held.stacks_with(&item)) {
            Some(stack) => stack.merge(item),
            None => Some(item),
        };
        if let Some(item) = leftover {
            self.items.push(item);
        }
    }

    /// Take `amount` units of the named item out of the inventory.
    ///
    /// Plain items are removed whole regardless of `amount`. Collectible stacks are
    /// reduced, and dropped once they reach zero. Returns `None` if nothing by that
    /// name is held or `amount` is zero. With several items of one name, the one added
    /// last goes first.
    pub fn remove(&mut self, name: &str, amount: u32) -> Option<Item> {
        if amount == 0 {
            return None;
        }
        let idx = self.latest(name)?;
        let taken = match self.items[idx].split(amount) {
            Some(part) => part,
            None => self.items.remove(idx),
        };
        info!("inventory -{} x{}", taken.name, taken.amount());
        Some(taken)
    }

    /// The item `remove` would take for this name.
    pub fn get(&self, name: &str) -> Option<&Item> {
        self.latest(name).and_then(|idx| self.items.get(idx))
    }

    fn latest(&self, name: &str) -> Option<usize> {
        self.items.iter().rposition(|item| item.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Total units held under `name`.
    pub fn count(&self, name: &str) -> u32 {
        self.items.iter().filter(|item| item.name == name).map(Item::amount).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_item_has_amount_one() {
        let knife = Item::plain("knife", "knife_sprite");
        assert_eq!(knife.sprite(), "knife_sprite");
        assert_eq!(knife.amount(), 1);
        assert!(knife.kind.is_plain());
    }

    #[test]
    fn collectibles_merge_in_inventory() {
        let mut inv = Inventory::new();
        inv.add(Item::collectible("coin", "coin", 3));
        inv.add(Item::plain("knife", "knife"));
        inv.add(Item::collectible("coin", "coin", 4));
        assert_eq!(inv.len(), 2);
        assert_eq!(inv.count("coin"), 7);
    }

    #[test]
    fn plain_items_never_merge() {
        let mut inv = Inventory::new();
        inv.add(Item::plain("key", "key"));
        inv.add(Item::plain("key", "key"));
        assert_eq!(inv.len(), 2);
        assert_eq!(inv.count("key"), 2);
    }

    #[test]
    fn removing_part_of_a_stack_splits_it() {
        let mut inv = Inventory::new();
        inv.add(Item::collectible("coin", "coin", 5));
        let taken = inv.remove("coin", 2).unwrap();
        assert_eq!(taken.amount(), 2);
        assert_eq!(inv.count("coin"), 3);

        let rest = inv.remove("coin", 10).unwrap();
        assert_eq!(rest.amount(), 3);
        assert!(inv.is_empty());
    }

    #[test]
    fn removing_missing_or_zero_is_none() {
        let mut inv = Inventory::new();
        inv.add(Item::plain("knife", "knife"));
        assert!(inv.remove("spoon", 1).is_none());
        assert!(inv.remove("knife", 0).is_none());
        assert!(inv.remove("knife", 1).is_some());
        assert!(!inv.contains("knife"));
    }

    #[test]
    fn get_and_remove_agree_on_same_named_items() {
        let mut inv = Inventory::new();
        inv.add(Item::plain("key", "rusty_key"));
        inv.add(Item::plain("key", "gold_key"));

        assert_eq!(inv.get("key").map(Item::sprite), Some("gold_key"));
        let taken = inv.remove("key", 1).unwrap();
        assert_eq!(taken.sprite(), "gold_key");
        assert_eq!(inv.get("key").map(Item::sprite), Some("rusty_key"));
        assert_eq!(inv.count("key"), 1);
    }
}
