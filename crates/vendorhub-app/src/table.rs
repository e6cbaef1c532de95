// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use time::Date;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Neutral,
    Positive,
    Warning,
    Negative,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Text(String),
    Integer(i64),
    Date(Option<Date>),
    Money(Option<i64>),
    Flag(bool),
    Badge { label: &'static str, tone: Tone },
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn display(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(value) => value.clone(),
            Self::Integer(value) => value.to_string(),
            Self::Date(Some(value)) => value.to_string(),
            Self::Date(None) | Self::Money(None) => String::new(),
            Self::Money(Some(cents)) => format_money(*cents),
            Self::Flag(true) => "yes".to_owned(),
            Self::Flag(false) => "no".to_owned(),
            Self::Badge { label, .. } => (*label).to_owned(),
        }
    }

    pub fn tone(&self) -> Tone {
        match self {
            Self::Badge { tone, .. } => *tone,
            _ => Tone::Neutral,
        }
    }
}

pub fn format_money(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    let dollars = (cents / 100).to_string();
    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (index, ch) in dollars.chars().enumerate() {
        if index > 0 && (dollars.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}${grouped}.{:02}", cents % 100)
}

/// Row types expose their named fields so columns can refer to them by key.
pub trait TableRow {
    fn field(&self, key: &str) -> Option<Cell>;

    fn row_key(&self, key_field: &str) -> String {
        self.field(key_field)
            .map(|cell| cell.display())
            .unwrap_or_default()
    }
}

/// How a column produces its cell: a plain field lookup or a derived value.
#[derive(Debug, Clone, Copy)]
pub enum Accessor<R> {
    Field(&'static str),
    Derived(fn(&R) -> Cell),
}

impl<R: TableRow> Accessor<R> {
    pub fn resolve(&self, row: &R) -> Cell {
        match self {
            Self::Field(key) => row.field(key).unwrap_or(Cell::Empty),
            Self::Derived(derive) => derive(row),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Column<R> {
    pub header: &'static str,
    pub accessor: Accessor<R>,
}

impl<R> Column<R> {
    pub const fn field(header: &'static str, key: &'static str) -> Self {
        Self {
            header,
            accessor: Accessor::Field(key),
        }
    }

    pub const fn derived(header: &'static str, derive: fn(&R) -> Cell) -> Self {
        Self {
            header,
            accessor: Accessor::Derived(derive),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedRow {
    pub key: String,
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableView {
    Loading,
    Empty(String),
    Rows {
        header: Vec<&'static str>,
        rows: Vec<RenderedRow>,
    },
}

/// Where a click landed inside a rendered table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    Header,
    RowBody { row: usize },
    ActionTrigger { row: usize },
    ActionItem { row: usize, item: usize },
    /// Menu chrome (border or padding) of the open menu on `row`.
    ActionMenu { row: usize },
    Outside,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableClick {
    RowClicked { index: usize, key: String },
    ToggleActions { row: usize },
    ActionChosen { row: usize, item: usize },
}

#[derive(Debug, Clone)]
pub struct TableSpec<R> {
    pub columns: Vec<Column<R>>,
    pub key_field: &'static str,
    pub empty_message: String,
    pub row_click: bool,
}

impl<R: TableRow> TableSpec<R> {
    pub fn new(columns: Vec<Column<R>>, key_field: &'static str) -> Self {
        Self {
            columns,
            key_field,
            empty_message: "no data".to_owned(),
            row_click: false,
        }
    }

    pub fn with_empty_message(mut self, message: impl Into<String>) -> Self {
        self.empty_message = message.into();
        self
    }

    pub fn with_row_click(mut self) -> Self {
        self.row_click = true;
        self
    }

    pub fn headers(&self) -> Vec<&'static str> {
        self.columns.iter().map(|column| column.header).collect()
    }

    pub fn render(&self, rows: &[R], loading: bool) -> TableView {
        if loading {
            return TableView::Loading;
        }
        if rows.is_empty() {
            return TableView::Empty(self.empty_message.clone());
        }
        TableView::Rows {
            header: self.headers(),
            rows: rows
                .iter()
                .map(|row| RenderedRow {
                    key: row.row_key(self.key_field),
                    cells: self
                        .columns
                        .iter()
                        .map(|column| column.accessor.resolve(row))
                        .collect(),
                })
                .collect(),
        }
    }

    /// Resolves a click. Anything inside a row's action menu stays with the
    /// menu and never reaches row navigation.
    pub fn click(&self, rows: &[R], target: ClickTarget) -> Option<TableClick> {
        match target {
            ClickTarget::RowBody { row } => {
                if !self.row_click {
                    return None;
                }
                rows.get(row).map(|data| TableClick::RowClicked {
                    index: row,
                    key: data.row_key(self.key_field),
                })
            }
            ClickTarget::ActionTrigger { row } if row < rows.len() => {
                Some(TableClick::ToggleActions { row })
            }
            ClickTarget::ActionItem { row, item } if row < rows.len() => {
                Some(TableClick::ActionChosen { row, item })
            }
            ClickTarget::ActionTrigger { .. }
            | ClickTarget::ActionItem { .. }
            | ClickTarget::ActionMenu { .. }
            | ClickTarget::Header
            | ClickTarget::Outside => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Cell, ClickTarget, Column, TableClick, TableRow, TableSpec, TableView, Tone};

    #[derive(Debug, Clone)]
    struct Row {
        id: i64,
        name: &'static str,
        score: u8,
    }

    impl TableRow for Row {
        fn field(&self, key: &str) -> Option<Cell> {
            match key {
                "id" => Some(Cell::Integer(self.id)),
                "name" => Some(Cell::text(self.name)),
                _ => None,
            }
        }
    }

    fn rating(row: &Row) -> Cell {
        if row.score >= 8 {
            Cell::Badge {
                label: "strong",
                tone: Tone::Positive,
            }
        } else {
            Cell::Badge {
                label: "weak",
                tone: Tone::Warning,
            }
        }
    }

    fn spec() -> TableSpec<Row> {
        TableSpec::new(
            vec![
                Column::field("Name", "name"),
                Column::derived("Rating", rating),
                Column::field("Missing", "nope"),
            ],
            "id",
        )
        .with_empty_message("nothing here")
    }

    fn rows() -> Vec<Row> {
        vec![
            Row {
                id: 1,
                name: "Acme",
                score: 9,
            },
            Row {
                id: 2,
                name: "Globex",
                score: 3,
            },
        ]
    }

    #[test]
    fn render_resolves_fields_and_derived_cells() {
        let view = spec().render(&rows(), false);
        let TableView::Rows { header, rows } = view else {
            panic!("expected rows");
        };
        assert_eq!(header, vec!["Name", "Rating", "Missing"]);
        assert_eq!(rows[0].key, "1");
        assert_eq!(rows[0].cells[0], Cell::text("Acme"));
        assert_eq!(rows[0].cells[1].display(), "strong");
        assert_eq!(rows[1].cells[1].tone(), Tone::Warning);
        assert_eq!(rows[1].cells[2], Cell::Empty);
    }

    #[test]
    fn loading_and_empty_states_replace_body() {
        assert_eq!(spec().render(&rows(), true), TableView::Loading);
        assert_eq!(
            spec().render(&[], false),
            TableView::Empty("nothing here".to_owned())
        );
    }

    #[test]
    fn row_click_requires_opt_in() {
        let data = rows();
        assert_eq!(spec().click(&data, ClickTarget::RowBody { row: 0 }), None);
        assert_eq!(
            spec()
                .with_row_click()
                .click(&data, ClickTarget::RowBody { row: 1 }),
            Some(TableClick::RowClicked {
                index: 1,
                key: "2".to_owned(),
            })
        );
    }

    #[test]
    fn action_menu_clicks_never_navigate() {
        let data = rows();
        let table = spec().with_row_click();
        assert_eq!(
            table.click(&data, ClickTarget::ActionTrigger { row: 0 }),
            Some(TableClick::ToggleActions { row: 0 })
        );
        assert_eq!(
            table.click(&data, ClickTarget::ActionItem { row: 0, item: 1 }),
            Some(TableClick::ActionChosen { row: 0, item: 1 })
        );
        assert_eq!(table.click(&data, ClickTarget::ActionTrigger { row: 5 }), None);
        assert_eq!(table.click(&data, ClickTarget::ActionMenu { row: 0 }), None);
    }

    #[test]
    fn money_cells_group_thousands() {
        assert_eq!(Cell::Money(Some(123_456_789)).display(), "$1,234,567.89");
        assert_eq!(Cell::Money(Some(-5)).display(), "-$0.05");
        assert_eq!(Cell::Money(Some(100_000)).display(), "$1,000.00");
    }
}
