//! Bone list grouping for the 3D viewer.
//!
//! The catalog stores left and right parts as separate rows, often under
//! separate bone ids. For teaching they are one structure, so rows are
//! merged into one card per side-free `group_key` (ASCII case-insensitive),
//! with the sided rows exposed as `left` / `right` slots and unsided rows as
//! `center`.

use std::collections::HashMap;

use serde::Serialize;

use crate::models::{BoneCatalogEntry, Side};
use crate::resolve::{base_display_name, group_key, side_of};

/// One catalog row inside a [`BoneGroup`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoneItem {
    pub bone_id: i64,
    pub small_bone_id: Option<i64>,
    pub zh_name: String,
    pub en_name: String,
    pub mesh_name: Option<String>,
    pub place: Option<String>,
    pub side: Option<Side>,
}

/// A merged card for one anatomical structure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoneGroup {
    pub key: String,
    /// Bone id of the first row seen.
    pub bone_id: i64,
    /// Every distinct bone id merged into this card, in first-seen order.
    pub bone_ids: Vec<i64>,
    pub display_name: String,
    pub region: String,
    pub description: String,
    pub count: usize,
    pub left: Option<BoneItem>,
    pub right: Option<BoneItem>,
    pub center: Option<BoneItem>,
    pub items: Vec<BoneItem>,
}

/// Merge catalog rows into viewer cards, in first-seen order.
///
/// When several rows land in the same slot the last one wins the slot;
/// all of them remain in `items`.
pub fn group_bones(entries: &[BoneCatalogEntry]) -> Vec<BoneGroup> {
    let mut groups: Vec<BoneGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for entry in entries {
        let key = group_key(entry);
        let side = side_of(entry.place.as_deref(), entry.lookup_name());
        let item = BoneItem {
            bone_id: entry.bone_id,
            small_bone_id: entry.small_bone_id,
            zh_name: entry.zh_name.clone(),
            en_name: entry.en_name.clone(),
            mesh_name: entry.mesh_name.clone(),
            place: entry.place.clone(),
            side,
        };

        let slot = *index.entry(key.to_ascii_lowercase()).or_insert_with(|| {
            groups.push(BoneGroup {
                key,
                bone_id: entry.bone_id,
                bone_ids: Vec::new(),
                display_name: base_display_name(entry).unwrap_or_default(),
                region: entry.region.clone(),
                description: entry.description.clone(),
                count: 0,
                left: None,
                right: None,
                center: None,
                items: Vec::new(),
            });
            groups.len() - 1
        });

        let group = &mut groups[slot];
        if !group.bone_ids.contains(&entry.bone_id) {
            group.bone_ids.push(entry.bone_id);
        }
        match side {
            Some(Side::Left) => group.left = Some(item.clone()),
            Some(Side::Right) => group.right = Some(item.clone()),
            None => group.center = Some(item.clone()),
        }
        group.items.push(item);
        group.count += 1;
    }

    groups
}
