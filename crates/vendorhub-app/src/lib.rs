// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod action_menu;
pub mod forms;
pub mod ids;
pub mod listing;
pub mod menu;
pub mod model;
pub mod permissions;
pub mod sidebar;
pub mod state;
pub mod table;
pub mod views;

pub use action_menu::*;
pub use forms::*;
pub use ids::*;
pub use listing::*;
pub use menu::*;
pub use model::*;
pub use permissions::*;
pub use sidebar::*;
pub use state::*;
pub use table::*;
pub use views::*;
