//! Equipment and bag contents carried by a character

use serde::{Deserialize, Serialize};

pub const BAG_SIZE: usize = 9;

/// Equipment slot an item occupies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EquipmentSlot {
    Weapon,
    Clothe,
    Shield,
    /// Used up instead of equipped
    Consumable,
}

impl EquipmentSlot {
    fn index(self) -> Option<usize> {
        match self {
            EquipmentSlot::Weapon => Some(0),
            EquipmentSlot::Clothe => Some(1),
            EquipmentSlot::Shield => Some(2),
            EquipmentSlot::Consumable => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub slot: EquipmentSlot,
    pub damage: i32,
    pub armor: i32,
    /// Health restored when consumed
    #[serde(default)]
    pub heal: i32,
    pub cost: u32,
    pub description: String,
}

impl Item {
    pub fn new(name: &str, slot: EquipmentSlot, damage: i32, armor: i32) -> Self {
        Self {
            name: name.to_string(),
            slot,
            damage,
            armor,
            heal: 0,
            cost: 0,
            description: String::new(),
        }
    }

    pub fn potion(heal: i32) -> Self {
        Self {
            heal,
            description: format!("Restore {heal} HP"),
            ..Self::new("Potion", EquipmentSlot::Consumable, 0, 0)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    pub equipment: [Option<Item>; 3],
    pub bag: [Option<Item>; BAG_SIZE],
    pub coin: u32,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_equipped_with(&self, slot: EquipmentSlot) -> bool {
        self.equipped(slot).is_some()
    }

    pub fn equipped(&self, slot: EquipmentSlot) -> Option<&Item> {
        slot.index().and_then(|i| self.equipment[i].as_ref())
    }

    /// Put an item in the first free bag slot; returns the slot or hands the item back
    pub fn append(&mut self, item: Item) -> Result<usize, Item> {
        match self.bag.iter().position(Option::is_none) {
            Some(slot) => {
                self.bag[slot] = Some(item);
                Ok(slot)
            }
            None => Err(item),
        }
    }

    pub fn drop(&mut self, slot: usize) -> Option<Item> {
        self.bag.get_mut(slot)?.take()
    }

    /// Move a bag item into its equipment slot, swapping out what was there
    pub fn equip(&mut self, slot: usize) -> Option<&Item> {
        let index = self.bag.get(slot)?.as_ref()?.slot.index()?;
        let item = self.bag[slot].take()?;
        self.bag[slot] = self.equipment[index].replace(item);
        self.equipment[index].as_ref()
    }

    /// Move equipment back into the bag (stays equipped if the bag is full)
    pub fn unequip(&mut self, slot: EquipmentSlot) -> Option<&Item> {
        let index = slot.index()?;
        let item = self.equipment[index].take()?;
        match self.append(item) {
            Ok(bag_slot) => self.bag[bag_slot].as_ref(),
            Err(item) => {
                self.equipment[index] = Some(item);
                None
            }
        }
    }

    /// Bag slot of the first consumable
    pub fn first_consumable(&self) -> Option<usize> {
        self.bag
            .iter()
            .position(|item| item.as_ref().is_some_and(|i| i.slot == EquipmentSlot::Consumable))
    }

    /// Remove a consumable from the bag
    pub fn consume(&mut self, slot: usize) -> Option<Item> {
        match self.bag.get(slot)? {
            Some(item) if item.slot == EquipmentSlot::Consumable => self.bag[slot].take(),
            _ => None,
        }
    }

    pub fn damage_bonus(&self) -> i32 {
        self.equipment.iter().flatten().map(|i| i.damage).sum()
    }

    pub fn armor_bonus(&self) -> i32 {
        self.equipment.iter().flatten().map(|i| i.armor).sum()
    }
}
