//! Score, currency, upgrades and the shop
//!
//! The profile is the only state that outlives a run. It is loaded and saved
//! through `persistence`; this module only holds the rules.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Highest purchasable upgrade level
pub const MAX_UPGRADE_LEVEL: u32 = 6;
/// Upgrade price per current level
pub const UPGRADE_COST_PER_LEVEL: u64 = 500;
pub const HEADSTART_COST: u64 = 2000;
/// Currency granted on first launch
pub const STARTING_COINS: u64 = 5000;

/// Ability upgrade levels (1..=6)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Upgrades {
    pub magnet: u32,
    pub jetpack: u32,
    pub sneakers: u32,
}

impl Default for Upgrades {
    fn default() -> Self {
        Self {
            magnet: 1,
            jetpack: 1,
            sneakers: 1,
        }
    }
}

/// Consumables owned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Inventory {
    pub headstart: u32,
}

/// Things the shop sells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShopItem {
    MagnetUpgrade,
    JetpackUpgrade,
    SneakersUpgrade,
    Headstart,
}

impl ShopItem {
    pub const ALL: [ShopItem; 4] = [
        ShopItem::MagnetUpgrade,
        ShopItem::JetpackUpgrade,
        ShopItem::SneakersUpgrade,
        ShopItem::Headstart,
    ];

    /// Shop identifiers used by the menu layer
    pub fn from_id(id: &str) -> Result<Self, PurchaseError> {
        match id {
            "magnet" => Ok(ShopItem::MagnetUpgrade),
            "jetpack" => Ok(ShopItem::JetpackUpgrade),
            "sneakers" => Ok(ShopItem::SneakersUpgrade),
            "headstart" => Ok(ShopItem::Headstart),
            other => Err(PurchaseError::UnknownItem(other.to_string())),
        }
    }

    pub fn id(self) -> &'static str {
        match self {
            ShopItem::MagnetUpgrade => "magnet",
            ShopItem::JetpackUpgrade => "jetpack",
            ShopItem::SneakersUpgrade => "sneakers",
            ShopItem::Headstart => "headstart",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PurchaseError {
    #[error("not enough credits: need {cost}, have {balance}")]
    InsufficientFunds { cost: u64, balance: u64 },
    #[error("{0} is already at max level")]
    MaxLevel(&'static str),
    #[error("unknown shop item: {0}")]
    UnknownItem(String),
}

/// What changed when a run was banked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub score: u64,
    pub coins: u32,
    pub new_high_score: bool,
}

/// Persistent player profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub high_score: u64,
    /// Banked currency
    pub total_coins: u64,
    pub upgrades: Upgrades,
    pub inventory: Inventory,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            high_score: 0,
            total_coins: STARTING_COINS,
            upgrades: Upgrades::default(),
            inventory: Inventory::default(),
        }
    }
}

impl Profile {
    fn upgrade_level_mut(&mut self, item: ShopItem) -> Option<&mut u32> {
        match item {
            ShopItem::MagnetUpgrade => Some(&mut self.upgrades.magnet),
            ShopItem::JetpackUpgrade => Some(&mut self.upgrades.jetpack),
            ShopItem::SneakersUpgrade => Some(&mut self.upgrades.sneakers),
            ShopItem::Headstart => None,
        }
    }

    /// Current level of an upgrade item (None for consumables)
    pub fn upgrade_level(&self, item: ShopItem) -> Option<u32> {
        match item {
            ShopItem::MagnetUpgrade => Some(self.upgrades.magnet),
            ShopItem::JetpackUpgrade => Some(self.upgrades.jetpack),
            ShopItem::SneakersUpgrade => Some(self.upgrades.sneakers),
            ShopItem::Headstart => None,
        }
    }

    /// Price of the next purchase, None once an upgrade is maxed
    pub fn price(&self, item: ShopItem) -> Option<u64> {
        match self.upgrade_level(item) {
            Some(level) if level >= MAX_UPGRADE_LEVEL => None,
            Some(level) => Some(level as u64 * UPGRADE_COST_PER_LEVEL),
            None => Some(HEADSTART_COST),
        }
    }

    /// Buy one item. On success the balance is already debited.
    pub fn buy(&mut self, item: ShopItem) -> Result<u64, PurchaseError> {
        let cost = self.price(item).ok_or(PurchaseError::MaxLevel(item.id()))?;
        if self.total_coins < cost {
            return Err(PurchaseError::InsufficientFunds {
                cost,
                balance: self.total_coins,
            });
        }

        self.total_coins -= cost;
        match self.upgrade_level_mut(item) {
            Some(level) => *level += 1,
            None => self.inventory.headstart += 1,
        }
        log::info!("Bought {} for {cost}, {} left", item.id(), self.total_coins);
        Ok(cost)
    }

    /// Spend one headstart if any are owned
    pub fn take_headstart(&mut self) -> bool {
        if self.inventory.headstart == 0 {
            return false;
        }
        self.inventory.headstart -= 1;
        true
    }

    pub fn grant_headstart(&mut self) {
        self.inventory.headstart += 1;
    }

    /// Fold a finished run into the profile
    pub fn record_run(&mut self, score: u64, coins: u32) -> RunSummary {
        let new_high_score = score > self.high_score;
        if new_high_score {
            self.high_score = score;
        }
        self.total_coins += coins as u64;
        RunSummary {
            score,
            coins,
            new_high_score,
        }
    }
}
