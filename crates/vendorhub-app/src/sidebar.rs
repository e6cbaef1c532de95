// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeSet;

use crate::{MenuNode, ResourceKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidebarEntry {
    pub code: String,
    pub title: String,
    pub path: String,
    pub icon: String,
    pub depth: usize,
    pub is_group: bool,
    pub expanded: bool,
}

impl SidebarEntry {
    pub fn view(&self) -> Option<ResourceKind> {
        ResourceKind::from_route(&self.path)
    }
}

/// Sidebar state for one session: the resolved menu forest plus the local
/// collapsed/expanded UI bits. Groups start expanded.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Sidebar {
    menus: Vec<MenuNode>,
    collapsed: bool,
    folded_groups: BTreeSet<String>,
    cursor: usize,
}

impl Sidebar {
    pub fn new(menus: Vec<MenuNode>, collapsed: bool) -> Self {
        Self {
            menus,
            collapsed,
            folded_groups: BTreeSet::new(),
            cursor: 0,
        }
    }

    pub fn menus(&self) -> &[MenuNode] {
        &self.menus
    }

    pub fn replace_menus(&mut self, menus: Vec<MenuNode>) {
        self.menus = menus;
        self.folded_groups.clear();
        self.cursor = 0;
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    /// Flips the collapsed flag and returns the new value so the caller can
    /// persist it.
    pub fn toggle_collapsed(&mut self) -> bool {
        self.collapsed = !self.collapsed;
        self.collapsed
    }

    pub fn visible_entries(&self) -> Vec<SidebarEntry> {
        let mut out = Vec::new();
        for node in &self.menus {
            self.push_visible(node, 0, &mut out);
        }
        out
    }

    fn push_visible(&self, node: &MenuNode, depth: usize, out: &mut Vec<SidebarEntry>) {
        let expanded = !self.folded_groups.contains(&node.record.name);
        out.push(SidebarEntry {
            code: node.record.name.clone(),
            title: node.record.title().to_owned(),
            path: node.record.path.clone(),
            icon: node.record.icon.clone(),
            depth,
            is_group: node.is_group(),
            expanded,
        });
        if expanded {
            for child in &node.children {
                self.push_visible(child, depth + 1, out);
            }
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn selected(&self) -> Option<SidebarEntry> {
        self.visible_entries().into_iter().nth(self.cursor)
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let len = self.visible_entries().len();
        if len == 0 {
            self.cursor = 0;
            return;
        }
        let next = (self.cursor as isize + delta).clamp(0, len as isize - 1);
        self.cursor = next as usize;
    }

    /// Folds or unfolds the group under the cursor. Returns false when the
    /// cursor is on a leaf.
    pub fn toggle_expanded(&mut self) -> bool {
        let Some(entry) = self.selected() else {
            return false;
        };
        if !entry.is_group {
            return false;
        }
        if !self.folded_groups.remove(&entry.code) {
            self.folded_groups.insert(entry.code);
        }
        true
    }

    /// Moves the cursor onto the first entry routed to `view`.
    pub fn select_view(&mut self, view: ResourceKind) -> bool {
        match self
            .visible_entries()
            .iter()
            .position(|entry| entry.view() == Some(view))
        {
            Some(index) => {
                self.cursor = index;
                true
            }
            None => false,
        }
    }

    /// Views reachable from the menu, in sidebar order, folded groups included.
    pub fn routable_views(&self) -> Vec<ResourceKind> {
        let mut views = Vec::new();
        for record in crate::flatten_forest(&self.menus) {
            if let Some(view) = ResourceKind::from_route(&record.path)
                && !views.contains(&view)
            {
                views.push(view);
            }
        }
        views
    }
}

#[cfg(test)]
mod tests {
    use super::Sidebar;
    use crate::{ResourceKind, Role, build_hierarchy, default_menus};

    fn admin_sidebar() -> Sidebar {
        Sidebar::new(build_hierarchy(&default_menus(Role::Admin)), false)
    }

    #[test]
    fn visible_entries_are_preorder_with_depth() {
        let sidebar = admin_sidebar();
        let entries = sidebar.visible_entries();
        let layout: Vec<(&str, usize)> = entries
            .iter()
            .map(|entry| (entry.code.as_str(), entry.depth))
            .collect();
        assert_eq!(
            layout,
            vec![
                ("dashboard", 0),
                ("management", 0),
                ("events", 1),
                ("vendors", 1),
                ("submissions", 1),
                ("evaluations", 1),
                ("payments", 1),
                ("administration", 0),
                ("users", 1),
            ]
        );
    }

    #[test]
    fn folding_a_group_hides_its_children() {
        let mut sidebar = admin_sidebar();
        sidebar.move_cursor(1);
        assert!(sidebar.toggle_expanded());
        let codes: Vec<String> = sidebar
            .visible_entries()
            .into_iter()
            .map(|entry| entry.code)
            .collect();
        assert_eq!(codes, vec!["dashboard", "management", "administration", "users"]);

        assert!(sidebar.toggle_expanded());
        assert_eq!(sidebar.visible_entries().len(), 9);
    }

    #[test]
    fn leaf_entries_cannot_fold() {
        let mut sidebar = admin_sidebar();
        assert!(!sidebar.toggle_expanded());
    }

    #[test]
    fn cursor_is_clamped() {
        let mut sidebar = admin_sidebar();
        sidebar.move_cursor(-4);
        assert_eq!(sidebar.cursor(), 0);
        sidebar.move_cursor(100);
        assert_eq!(sidebar.cursor(), 8);
    }

    #[test]
    fn collapsed_toggle_reports_new_value() {
        let mut sidebar = admin_sidebar();
        assert!(!sidebar.is_collapsed());
        assert!(sidebar.toggle_collapsed());
        assert!(!sidebar.toggle_collapsed());
    }

    #[test]
    fn select_view_and_routable_views() {
        let mut sidebar = admin_sidebar();
        assert!(sidebar.select_view(ResourceKind::Users));
        assert_eq!(
            sidebar.selected().map(|entry| entry.code),
            Some("users".to_owned())
        );
        assert!(!sidebar.select_view(ResourceKind::Roles));
        assert_eq!(
            sidebar.routable_views(),
            vec![
                ResourceKind::Events,
                ResourceKind::Vendors,
                ResourceKind::Submissions,
                ResourceKind::Evaluations,
                ResourceKind::Payments,
                ResourceKind::Users,
            ]
        );
    }
}
