// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ItemVariant {
    #[default]
    Default,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionMenuItem<A> {
    pub label: String,
    pub icon: &'static str,
    pub action: A,
    pub variant: ItemVariant,
    pub hidden: bool,
}

impl<A> ActionMenuItem<A> {
    pub fn new(label: impl Into<String>, action: A) -> Self {
        Self {
            label: label.into(),
            icon: "",
            action,
            variant: ItemVariant::Default,
            hidden: false,
        }
    }

    pub fn icon(mut self, icon: &'static str) -> Self {
        self.icon = icon;
        self
    }

    pub fn danger(mut self) -> Self {
        self.variant = ItemVariant::Danger;
        self
    }

    pub fn hidden_unless(mut self, allowed: bool) -> Self {
        self.hidden = !allowed;
        self
    }
}

pub fn visible_items<A>(items: &[ActionMenuItem<A>]) -> Vec<&ActionMenuItem<A>> {
    items.iter().filter(|item| !item.hidden).collect()
}

/// Row actions after visibility filtering. An empty menu has no trigger and
/// renders nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionMenu<A> {
    items: Vec<ActionMenuItem<A>>,
}

impl<A> ActionMenu<A> {
    pub fn new(items: Vec<ActionMenuItem<A>>) -> Self {
        Self {
            items: items.into_iter().filter(|item| !item.hidden).collect(),
        }
    }

    pub fn items(&self) -> &[ActionMenuItem<A>] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn trigger(&self) -> Option<&'static str> {
        if self.items.is_empty() {
            None
        } else {
            Some("...")
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub top: i32,
    pub left: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(top: i32, left: i32, width: i32, height: i32) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }

    pub const fn bottom(&self) -> i32 {
        self.top + self.height
    }

    pub const fn right(&self) -> i32 {
        self.left + self.width
    }

    pub const fn contains(&self, row: i32, col: i32) -> bool {
        row >= self.top && row < self.bottom() && col >= self.left && col < self.right()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuMetrics {
    pub item_height: i32,
    pub padding: i32,
    pub width: i32,
    pub gap: i32,
    pub viewport_margin: i32,
}

impl MenuMetrics {
    pub const PIXELS: Self = Self {
        item_height: 40,
        padding: 8,
        width: 160,
        gap: 4,
        viewport_margin: 8,
    };

    /// Terminal cells: one row per item plus a border on each side.
    pub const CELLS: Self = Self {
        item_height: 1,
        padding: 2,
        width: 22,
        gap: 0,
        viewport_margin: 1,
    };

    pub const fn menu_height(&self, visible: usize) -> i32 {
        visible as i32 * self.item_height + self.padding
    }
}

impl Default for MenuMetrics {
    fn default() -> Self {
        Self::PIXELS
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuPosition {
    pub top: i32,
    pub left: i32,
    pub width: i32,
    pub height: i32,
    pub opens_upward: bool,
}

impl MenuPosition {
    pub const fn rect(&self) -> Rect {
        Rect::new(self.top, self.left, self.width, self.height)
    }
}

/// Places the menu next to its trigger. It flips above the button when the
/// space below is shorter than the menu and is right-aligned to the button
/// without crossing the viewport margin.
pub fn compute_position(
    button: Rect,
    viewport: Rect,
    visible: usize,
    metrics: MenuMetrics,
) -> MenuPosition {
    let height = metrics.menu_height(visible);
    let space_below = viewport.bottom() - button.bottom();
    let opens_upward = space_below < height;
    let top = if opens_upward {
        button.top - height
    } else {
        button.bottom() + metrics.gap
    };
    let left = (button.right() - metrics.width)
        .min(viewport.right() - metrics.viewport_margin - metrics.width);
    MenuPosition {
        top,
        left,
        width: metrics.width,
        height,
        opens_upward,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuInput {
    OutsidePress,
    Scroll,
    Escape,
}

/// Which row's menu is open, if any. At most one menu is open at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActionMenuState {
    open: Option<OpenMenu>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenMenu {
    row: usize,
    position: MenuPosition,
    highlighted: usize,
    items: usize,
}

impl ActionMenuState {
    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    pub fn open_row(&self) -> Option<usize> {
        self.open.map(|menu| menu.row)
    }

    pub fn position(&self) -> Option<MenuPosition> {
        self.open.map(|menu| menu.position)
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.open.map(|menu| menu.highlighted)
    }

    pub fn open<A>(
        &mut self,
        row: usize,
        menu: &ActionMenu<A>,
        button: Rect,
        viewport: Rect,
        metrics: MenuMetrics,
    ) -> bool {
        if menu.trigger().is_none() {
            self.open = None;
            return false;
        }
        self.open = Some(OpenMenu {
            row,
            position: compute_position(button, viewport, menu.len(), metrics),
            highlighted: 0,
            items: menu.len(),
        });
        true
    }

    /// Clicking the trigger of the open menu closes it; any other trigger
    /// moves the menu to that row.
    pub fn toggle<A>(
        &mut self,
        row: usize,
        menu: &ActionMenu<A>,
        button: Rect,
        viewport: Rect,
        metrics: MenuMetrics,
    ) -> bool {
        if self.open_row() == Some(row) {
            self.close();
            return false;
        }
        self.open(row, menu, button, viewport, metrics)
    }

    pub fn close(&mut self) {
        self.open = None;
    }

    pub fn handle(&mut self, input: MenuInput) {
        if self.open.take().is_some() {
            tracing::trace!(?input, "action menu dismissed");
        }
    }

    pub fn move_highlight<A>(&mut self, menu: &ActionMenu<A>, delta: isize) {
        let Some(open) = self.open.as_mut() else {
            return;
        };
        if menu.is_empty() {
            return;
        }
        let last = menu.len() as isize - 1;
        open.highlighted = (open.highlighted as isize + delta).clamp(0, last) as usize;
    }

    /// Picks an item, returning its action, and closes the menu.
    pub fn select<A: Clone>(&mut self, menu: &ActionMenu<A>, index: usize) -> Option<A> {
        self.open.take()?;
        menu.items().get(index).map(|item| item.action.clone())
    }

    pub fn select_highlighted<A: Clone>(&mut self, menu: &ActionMenu<A>) -> Option<A> {
        let index = self.highlighted()?;
        self.select(menu, index)
    }

    /// True for any point on the open menu, borders included.
    pub fn contains(&self, row: i32, col: i32) -> bool {
        self.position()
            .is_some_and(|position| position.rect().contains(row, col))
    }

    /// Maps a point inside the open menu to an item index. Padding rows map
    /// to `None`.
    pub fn item_at(&self, row: i32, col: i32, metrics: MenuMetrics) -> Option<usize> {
        let open = self.open?;
        if !open.position.rect().contains(row, col) {
            return None;
        }
        let offset = row - open.position.top - metrics.padding / 2;
        if offset < 0 || metrics.item_height <= 0 {
            return None;
        }
        let index = (offset / metrics.item_height) as usize;
        (index < open.items).then_some(index)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        ActionMenu, ActionMenuItem, ActionMenuState, MenuInput, MenuMetrics, Rect,
        compute_position, visible_items,
    };

    fn items(hidden: [bool; 4]) -> Vec<ActionMenuItem<&'static str>> {
        ["view", "edit", "export", "delete"]
            .into_iter()
            .zip(hidden)
            .map(|(action, hidden)| ActionMenuItem::new(action, action).hidden_unless(!hidden))
            .collect()
    }

    #[test]
    fn all_hidden_menu_has_no_trigger() {
        let menu = ActionMenu::new(items([true; 4]));
        assert!(menu.trigger().is_none());

        let mut state = ActionMenuState::default();
        let button = Rect::new(0, 0, 4, 1);
        let viewport = Rect::new(0, 0, 80, 24);
        assert!(!state.open(0, &menu, button, viewport, MenuMetrics::CELLS));
        assert!(!state.is_open());
    }

    #[test]
    fn visible_items_filter_hidden() {
        let all = items([false, true, false, true]);
        let labels: Vec<&str> = visible_items(&all)
            .into_iter()
            .map(|item| item.label.as_str())
            .collect();
        assert_eq!(labels, vec!["view", "export"]);
    }

    #[test]
    fn opens_upward_near_viewport_bottom() {
        let viewport = Rect::new(0, 0, 1280, 800);
        let button = Rect::new(718, 1100, 32, 32);
        assert_eq!(button.bottom(), 750);

        let position = compute_position(button, viewport, 4, MenuMetrics::PIXELS);
        assert_eq!(position.height, 168);
        assert!(position.opens_upward);
        assert_eq!(position.top, 718 - 168);
        assert_eq!(position.left, 1132 - 160);
    }

    #[test]
    fn opens_downward_with_gap_and_respects_margin() {
        let viewport = Rect::new(0, 0, 1000, 800);
        let button = Rect::new(100, 980, 32, 32);

        let position = compute_position(button, viewport, 2, MenuMetrics::PIXELS);
        assert!(!position.opens_upward);
        assert_eq!(position.top, 136);
        assert_eq!(position.left, 1000 - 8 - 160);
    }

    #[test]
    fn dismissal_inputs_close_menu() {
        let menu = ActionMenu::new(items([false; 4]));
        let button = Rect::new(2, 50, 3, 1);
        let viewport = Rect::new(0, 0, 80, 24);
        for input in [MenuInput::OutsidePress, MenuInput::Scroll, MenuInput::Escape] {
            let mut state = ActionMenuState::default();
            assert!(state.open(1, &menu, button, viewport, MenuMetrics::CELLS));
            state.handle(input);
            assert!(!state.is_open());
        }
    }

    #[test]
    fn select_returns_action_then_closes() {
        let menu = ActionMenu::new(items([false, true, false, false]));
        let button = Rect::new(2, 50, 3, 1);
        let viewport = Rect::new(0, 0, 80, 24);
        let mut state = ActionMenuState::default();
        state.open(0, &menu, button, viewport, MenuMetrics::CELLS);

        assert_eq!(state.select(&menu, 1), Some("export"));
        assert!(!state.is_open());
        assert_eq!(state.select(&menu, 0), None);
    }

    #[test]
    fn toggle_on_same_row_closes() {
        let menu = ActionMenu::new(items([false; 4]));
        let button = Rect::new(2, 50, 3, 1);
        let viewport = Rect::new(0, 0, 80, 24);
        let mut state = ActionMenuState::default();
        assert!(state.toggle(3, &menu, button, viewport, MenuMetrics::CELLS));
        assert!(state.toggle(4, &menu, button, viewport, MenuMetrics::CELLS));
        assert_eq!(state.open_row(), Some(4));
        assert!(!state.toggle(4, &menu, button, viewport, MenuMetrics::CELLS));
        assert!(!state.is_open());
    }

    #[test]
    fn highlight_and_hit_testing_in_cells() {
        let menu = ActionMenu::new(items([false; 4]));
        let button = Rect::new(2, 50, 3, 1);
        let viewport = Rect::new(0, 0, 80, 24);
        let mut state = ActionMenuState::default();
        state.open(0, &menu, button, viewport, MenuMetrics::CELLS);

        let position = state.position().expect("open");
        assert_eq!(position.top, 3);
        assert_eq!(position.height, 6);
        assert_eq!(state.item_at(4, position.left + 1, MenuMetrics::CELLS), Some(0));
        assert_eq!(state.item_at(6, position.left + 1, MenuMetrics::CELLS), Some(2));
        assert_eq!(state.item_at(0, 0, MenuMetrics::CELLS), None);

        let border_top = position.top;
        let border_bottom = position.top + position.height - 1;
        assert_eq!(state.item_at(border_top, position.left + 1, MenuMetrics::CELLS), None);
        assert_eq!(state.item_at(border_bottom, position.left + 1, MenuMetrics::CELLS), None);
        assert!(state.contains(border_top, position.left + 1));
        assert!(state.contains(border_bottom, position.left + 1));
        assert!(!state.contains(border_bottom + 1, position.left + 1));

        state.move_highlight(&menu, 10);
        assert_eq!(state.highlighted(), Some(3));
        assert_eq!(state.select_highlighted(&menu), Some("delete"));
    }
}
