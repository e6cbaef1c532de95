// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Display;
use time::{Duration, OffsetDateTime};

use crate::{MenuId, Role, UserId};

/// Flat menu row as served by the backend. `parent_id` is a weak reference
/// and may point at a record that is not in the set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuRecord {
    #[serde(default)]
    pub id: Option<MenuId>,
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub parent_id: Option<MenuId>,
    #[serde(default)]
    pub order_index: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MenuKey {
    Id(MenuId),
    Name(String),
}

impl MenuRecord {
    pub fn key(&self) -> MenuKey {
        match self.id {
            Some(id) => MenuKey::Id(id),
            None => MenuKey::Name(self.name.clone()),
        }
    }

    pub fn title(&self) -> &str {
        if self.display_name.trim().is_empty() {
            &self.name
        } else {
            &self.display_name
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuNode {
    pub record: MenuRecord,
    pub children: Vec<MenuNode>,
}

impl MenuNode {
    pub fn is_group(&self) -> bool {
        !self.children.is_empty()
    }

    /// Depth-first, parent before children.
    pub fn preorder(&self) -> Vec<&MenuRecord> {
        let mut out = Vec::new();
        collect_preorder(self, &mut out);
        out
    }
}

fn collect_preorder<'a>(node: &'a MenuNode, out: &mut Vec<&'a MenuRecord>) {
    out.push(&node.record);
    for child in &node.children {
        collect_preorder(child, out);
    }
}

pub fn flatten_forest(forest: &[MenuNode]) -> Vec<&MenuRecord> {
    forest.iter().flat_map(MenuNode::preorder).collect()
}

/// Builds the sidebar forest from a flat record list.
///
/// Records whose parent is missing from the set become roots. Siblings are
/// ordered by `order_index` with a stable sort, so equal indexes keep their
/// input order. When two records share a key the first one receives the
/// children. Records caught in a parent cycle are unreachable from any root
/// and do not appear in the output.
pub fn build_hierarchy(flat: &[MenuRecord]) -> Vec<MenuNode> {
    let mut index: HashMap<MenuKey, usize> = HashMap::with_capacity(flat.len());
    for (position, record) in flat.iter().enumerate() {
        index.entry(record.key()).or_insert(position);
    }

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); flat.len()];
    let mut roots = Vec::new();
    for (position, record) in flat.iter().enumerate() {
        let parent = record
            .parent_id
            .and_then(|parent_id| index.get(&MenuKey::Id(parent_id)).copied());
        match parent {
            Some(parent) if parent != position => children[parent].push(position),
            _ => roots.push(position),
        }
    }

    roots.sort_by_key(|position| flat[*position].order_index);
    roots
        .into_iter()
        .map(|position| assemble(position, flat, &mut children))
        .collect()
}

fn assemble(position: usize, flat: &[MenuRecord], children: &mut [Vec<usize>]) -> MenuNode {
    let mut kids = std::mem::take(&mut children[position]);
    kids.sort_by_key(|child| flat[*child].order_index);
    MenuNode {
        record: flat[position].clone(),
        children: kids
            .into_iter()
            .map(|child| assemble(child, flat, children))
            .collect(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuSource {
    Server,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMenus {
    pub source: MenuSource,
    pub nodes: Vec<MenuNode>,
}

/// Picks the server menus when the fetch produced at least one record,
/// otherwise the static preset for the role.
pub fn resolve_menus<E: Display>(
    role: Role,
    fetched: std::result::Result<Vec<MenuRecord>, E>,
) -> ResolvedMenus {
    match fetched {
        Ok(records) if !records.is_empty() => ResolvedMenus {
            source: MenuSource::Server,
            nodes: build_hierarchy(&records),
        },
        Ok(_) => {
            tracing::info!(role = role.as_str(), "server returned no menus; using preset");
            fallback(role)
        }
        Err(error) => {
            tracing::warn!(role = role.as_str(), %error, "menu fetch failed; using preset");
            fallback(role)
        }
    }
}

fn fallback(role: Role) -> ResolvedMenus {
    ResolvedMenus {
        source: MenuSource::Fallback,
        nodes: build_hierarchy(&default_menus(role)),
    }
}

type PresetRow = (i64, &'static str, &'static str, &'static str, &'static str, Option<i64>, i64);

const VENDOR_PRESET: &[PresetRow] = &[
    (1, "dashboard", "Dashboard", "/dashboard", "home", None, 0),
    (2, "events", "Open Events", "/events", "calendar", None, 1),
    (3, "submissions", "My Pitches", "/submissions", "send", None, 2),
    (4, "payments", "Payments", "/payments", "wallet", None, 3),
];

const CLIENT_PRESET: &[PresetRow] = &[
    (1, "dashboard", "Dashboard", "/dashboard", "home", None, 0),
    (2, "events", "My Events", "/events", "calendar", None, 1),
    (3, "submissions", "Pitches", "/submissions", "inbox", None, 2),
    (4, "evaluations", "Evaluations", "/evaluations", "star", None, 3),
    (5, "vendors", "Vendors", "/vendors", "briefcase", None, 4),
];

const ADMIN_PRESET: &[PresetRow] = &[
    (1, "dashboard", "Dashboard", "/dashboard", "home", None, 0),
    (2, "management", "Management", "", "layers", None, 1),
    (3, "events", "Events", "/events", "calendar", Some(2), 0),
    (4, "vendors", "Vendors", "/vendors", "briefcase", Some(2), 1),
    (5, "submissions", "Pitches", "/submissions", "inbox", Some(2), 2),
    (6, "evaluations", "Evaluations", "/evaluations", "star", Some(2), 3),
    (7, "payments", "Payments", "/payments", "wallet", Some(2), 4),
    (8, "administration", "Administration", "", "shield", None, 2),
    (9, "users", "Users", "/admin/users", "users", Some(8), 0),
];

const SUPERADMIN_EXTRA: &[PresetRow] = &[
    (10, "roles", "Roles", "/admin/roles", "key", Some(8), 1),
    (11, "menus", "Menus", "/admin/menus", "list", Some(8), 2),
];

/// Static role-keyed menu presets used when the server has nothing to offer.
pub fn default_menus(role: Role) -> Vec<MenuRecord> {
    let rows: Vec<&PresetRow> = match role {
        Role::Vendor => VENDOR_PRESET.iter().collect(),
        Role::Client => CLIENT_PRESET.iter().collect(),
        Role::Admin => ADMIN_PRESET.iter().collect(),
        Role::SuperAdmin => ADMIN_PRESET.iter().chain(SUPERADMIN_EXTRA).collect(),
    };
    rows.into_iter()
        .map(
            |(id, name, display_name, path, icon, parent_id, order_index)| MenuRecord {
                id: Some(MenuId::new(*id)),
                name: (*name).to_owned(),
                display_name: (*display_name).to_owned(),
                path: (*path).to_owned(),
                icon: (*icon).to_owned(),
                parent_id: parent_id.map(MenuId::new),
                order_index: *order_index,
            },
        )
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CachedMenus {
    user_id: UserId,
    fetched_at: OffsetDateTime,
    menus: ResolvedMenus,
}

/// Session-scoped menu cache: one entry, keyed by user, dropped on logout or
/// once it is older than the TTL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuCache {
    ttl: Duration,
    entry: Option<CachedMenus>,
}

impl MenuCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entry: None }
    }

    pub fn get(&self, user_id: UserId, now: OffsetDateTime) -> Option<&ResolvedMenus> {
        let entry = self.entry.as_ref()?;
        if entry.user_id != user_id {
            tracing::debug!(%user_id, cached = %entry.user_id, "menu cache miss: other user");
            return None;
        }
        if now - entry.fetched_at > self.ttl {
            tracing::debug!(%user_id, "menu cache miss: expired");
            return None;
        }
        Some(&entry.menus)
    }

    pub fn store(&mut self, user_id: UserId, menus: ResolvedMenus, now: OffsetDateTime) {
        self.entry = Some(CachedMenus {
            user_id,
            fetched_at: now,
            menus,
        });
    }

    pub fn invalidate(&mut self) {
        if self.entry.take().is_some() {
            tracing::debug!("menu cache invalidated");
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entry.is_none()
    }
}
