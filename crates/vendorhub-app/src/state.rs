// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{ResourceKind, SessionUser};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Sidebar,
    Search,
    Table,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub active_view: Option<ResourceKind>,
    pub focus: Focus,
    pub sidebar_collapsed: bool,
    pub notice: Option<Notice>,
    pub user: Option<SessionUser>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            active_view: None,
            focus: Focus::Sidebar,
            sidebar_collapsed: false,
            notice: None,
            user: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    SignedIn(SessionUser),
    SelectView(ResourceKind),
    NextFocus,
    PrevFocus,
    FocusSearch,
    ToggleSidebar,
    ShowNotice(Notice),
    ClearNotice,
    Logout,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    SessionStarted(SessionUser),
    ViewChanged(ResourceKind),
    FocusChanged(Focus),
    SidebarToggled(bool),
    NoticeShown(Notice),
    NoticeCleared,
    LoggedOut,
}

impl AppState {
    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::SignedIn(user) => {
                self.user = Some(user.clone());
                let greeting = Notice::success(format!("signed in as {}", user.name));
                vec![AppEvent::SessionStarted(user), self.show(greeting)]
            }
            AppCommand::SelectView(view) => {
                if self.active_view == Some(view) {
                    return Vec::new();
                }
                self.active_view = Some(view);
                let mut events = vec![AppEvent::ViewChanged(view)];
                events.extend(self.set_focus(Focus::Table));
                events
            }
            AppCommand::NextFocus => self.rotate_focus(1),
            AppCommand::PrevFocus => self.rotate_focus(-1),
            AppCommand::FocusSearch => self.set_focus(Focus::Search).into_iter().collect(),
            AppCommand::ToggleSidebar => {
                self.sidebar_collapsed = !self.sidebar_collapsed;
                let mut events = vec![AppEvent::SidebarToggled(self.sidebar_collapsed)];
                if self.sidebar_collapsed && self.focus == Focus::Sidebar {
                    events.extend(self.set_focus(Focus::Table));
                }
                events
            }
            AppCommand::ShowNotice(notice) => vec![self.show(notice)],
            AppCommand::ClearNotice => {
                if self.notice.take().is_some() {
                    vec![AppEvent::NoticeCleared]
                } else {
                    Vec::new()
                }
            }
            AppCommand::Logout => {
                self.user = None;
                self.active_view = None;
                self.focus = Focus::Sidebar;
                vec![AppEvent::LoggedOut, self.show(Notice::info("signed out"))]
            }
        }
    }

    fn focus_order(&self) -> &'static [Focus] {
        if self.sidebar_collapsed {
            &[Focus::Search, Focus::Table]
        } else {
            &[Focus::Sidebar, Focus::Search, Focus::Table]
        }
    }

    fn rotate_focus(&mut self, delta: isize) -> Vec<AppEvent> {
        let order = self.focus_order();
        let current = order
            .iter()
            .position(|focus| *focus == self.focus)
            .unwrap_or(0) as isize;
        let next = (current + delta).rem_euclid(order.len() as isize) as usize;
        self.set_focus(order[next]).into_iter().collect()
    }

    fn set_focus(&mut self, focus: Focus) -> Option<AppEvent> {
        if self.focus == focus {
            return None;
        }
        self.focus = focus;
        Some(AppEvent::FocusChanged(focus))
    }

    fn show(&mut self, notice: Notice) -> AppEvent {
        self.notice = Some(notice.clone());
        AppEvent::NoticeShown(notice)
    }
}
