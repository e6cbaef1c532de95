// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{
    Action, ActionMenu, ActionMenuItem, CapabilityRule, Cell, Column, Evaluation, Event,
    EventStatus, MenuRecord, Payment, PaymentStatus, ResourceKind, Role, RoleRecord, Submission,
    SubmissionStatus, TableRow, TableSpec, Tone, User, Vendor, ViewCapabilities,
    ViewDescriptor,
};

const STAFF: &[Role] = &[Role::Admin, Role::SuperAdmin];
const SUPERADMIN: &[Role] = &[Role::SuperAdmin];

/// One row of any list view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Event(Event),
    Vendor(Vendor),
    Submission(Submission),
    Evaluation(Evaluation),
    Payment(Payment),
    User(User),
    Role(RoleRecord),
    Menu(MenuRecord),
}

impl Record {
    pub const fn resource(&self) -> ResourceKind {
        match self {
            Self::Event(_) => ResourceKind::Events,
            Self::Vendor(_) => ResourceKind::Vendors,
            Self::Submission(_) => ResourceKind::Submissions,
            Self::Evaluation(_) => ResourceKind::Evaluations,
            Self::Payment(_) => ResourceKind::Payments,
            Self::User(_) => ResourceKind::Users,
            Self::Role(_) => ResourceKind::Roles,
            Self::Menu(_) => ResourceKind::Menus,
        }
    }

    /// Server-side identifier used in `/{resource}/{id}` routes.
    pub fn id(&self) -> Option<i64> {
        match self {
            Self::Event(row) => Some(row.id.get()),
            Self::Vendor(row) => Some(row.id.get()),
            Self::Submission(row) => Some(row.id.get()),
            Self::Evaluation(row) => Some(row.id.get()),
            Self::Payment(row) => Some(row.id.get()),
            Self::User(row) => Some(row.id.get()),
            Self::Role(row) => Some(row.id.get()),
            Self::Menu(row) => row.id.map(|id| id.get()),
        }
    }

    pub fn title(&self) -> String {
        match self {
            Self::Event(row) => row.title.clone(),
            Self::Vendor(row) => row.company_name.clone(),
            Self::Submission(row) => row.pitch_title.clone(),
            Self::Evaluation(row) => format!("evaluation of {}", row.pitch_title),
            Self::Payment(row) => format!("payment to {}", row.vendor_name),
            Self::User(row) => row.name.clone(),
            Self::Role(row) => row.name.clone(),
            Self::Menu(row) => row.title().to_owned(),
        }
    }
}

impl TableRow for Record {
    fn field(&self, key: &str) -> Option<Cell> {
        match self {
            Self::Event(row) => row.field(key),
            Self::Vendor(row) => row.field(key),
            Self::Submission(row) => row.field(key),
            Self::Evaluation(row) => row.field(key),
            Self::Payment(row) => row.field(key),
            Self::User(row) => row.field(key),
            Self::Role(row) => row.field(key),
            Self::Menu(row) => row.field(key),
        }
    }
}

impl TableRow for Event {
    fn field(&self, key: &str) -> Option<Cell> {
        Some(match key {
            "id" => Cell::Integer(self.id.get()),
            "title" => Cell::text(&self.title),
            "location" => Cell::text(&self.location),
            "starts_on" => Cell::Date(Some(self.starts_on)),
            "ends_on" => Cell::Date(self.ends_on),
            "status" => Cell::text(self.status.as_str()),
            "submission_count" => Cell::Integer(self.submission_count),
            _ => return None,
        })
    }
}

impl TableRow for Vendor {
    fn field(&self, key: &str) -> Option<Cell> {
        Some(match key {
            "id" => Cell::Integer(self.id.get()),
            "company_name" => Cell::text(&self.company_name),
            "contact_name" => Cell::text(&self.contact_name),
            "email" => Cell::text(&self.email),
            "phone" => Cell::text(&self.phone),
            "category" => Cell::text(&self.category),
            "verified" => Cell::Flag(self.verified),
            _ => return None,
        })
    }
}

impl TableRow for Submission {
    fn field(&self, key: &str) -> Option<Cell> {
        Some(match key {
            "id" => Cell::Integer(self.id.get()),
            "event_title" => Cell::text(&self.event_title),
            "vendor_name" => Cell::text(&self.vendor_name),
            "pitch_title" => Cell::text(&self.pitch_title),
            "status" => Cell::text(self.status.as_str()),
            "submitted_on" => Cell::Date(Some(self.submitted_on)),
            _ => return None,
        })
    }
}

impl TableRow for Evaluation {
    fn field(&self, key: &str) -> Option<Cell> {
        Some(match key {
            "id" => Cell::Integer(self.id.get()),
            "pitch_title" => Cell::text(&self.pitch_title),
            "evaluator_name" => Cell::text(&self.evaluator_name),
            "score" => Cell::Integer(i64::from(self.score)),
            "comment" => Cell::text(&self.comment),
            _ => return None,
        })
    }
}

impl TableRow for Payment {
    fn field(&self, key: &str) -> Option<Cell> {
        Some(match key {
            "id" => Cell::Integer(self.id.get()),
            "vendor_name" => Cell::text(&self.vendor_name),
            "event_title" => Cell::text(&self.event_title),
            "amount" => Cell::Money(Some(self.amount_cents)),
            "status" => Cell::text(self.status.as_str()),
            "paid_on" => Cell::Date(self.paid_on),
            _ => return None,
        })
    }
}

impl TableRow for User {
    fn field(&self, key: &str) -> Option<Cell> {
        Some(match key {
            "id" => Cell::Integer(self.id.get()),
            "name" => Cell::text(&self.name),
            "email" => Cell::text(&self.email),
            "role" => Cell::text(self.role.as_str()),
            "active" => Cell::Flag(self.active),
            _ => return None,
        })
    }
}

impl TableRow for RoleRecord {
    fn field(&self, key: &str) -> Option<Cell> {
        Some(match key {
            "id" => Cell::Integer(self.id.get()),
            "name" => Cell::text(&self.name),
            "description" => Cell::text(&self.description),
            "permission_count" => Cell::Integer(self.permission_count),
            _ => return None,
        })
    }
}

impl TableRow for MenuRecord {
    fn field(&self, key: &str) -> Option<Cell> {
        Some(match key {
            "id" => self
                .id
                .map_or(Cell::Empty, |id| Cell::Integer(id.get())),
            "name" => Cell::text(&self.name),
            "title" => Cell::text(self.title()),
            "path" => Cell::text(&self.path),
            "parent_id" => self
                .parent_id
                .map_or(Cell::Empty, |id| Cell::Integer(id.get())),
            "order_index" => Cell::Integer(self.order_index),
            _ => return None,
        })
    }

    fn row_key(&self, _key_field: &str) -> String {
        match self.id {
            Some(id) => id.to_string(),
            None => self.name.clone(),
        }
    }
}

/// Capability rules for each list view.
pub fn descriptor(resource: ResourceKind) -> ViewDescriptor {
    let mut descriptor = ViewDescriptor::standard(resource);
    match resource {
        ResourceKind::Submissions => {
            descriptor.shortlist = CapabilityRule::All(vec![
                CapabilityRule::require(ResourceKind::Submissions, Action::Review),
                CapabilityRule::Any(vec![
                    CapabilityRule::RoleIn(STAFF),
                    CapabilityRule::require(ResourceKind::Events, Action::Update),
                ]),
            ]);
        }
        ResourceKind::Evaluations => {
            descriptor.create = CapabilityRule::All(vec![
                CapabilityRule::require(ResourceKind::Evaluations, Action::Create),
                CapabilityRule::require(ResourceKind::Submissions, Action::Review),
            ]);
        }
        ResourceKind::Users => {
            descriptor.view = CapabilityRule::All(vec![
                CapabilityRule::require(resource, Action::Read),
                CapabilityRule::RoleIn(STAFF),
            ]);
        }
        ResourceKind::Roles | ResourceKind::Menus => {
            descriptor.view = CapabilityRule::All(vec![
                CapabilityRule::require(resource, Action::Read),
                CapabilityRule::RoleIn(SUPERADMIN),
            ]);
            descriptor.manage = Some(CapabilityRule::RoleIn(SUPERADMIN));
        }
        ResourceKind::Events | ResourceKind::Vendors | ResourceKind::Payments => {}
    }
    descriptor
}

fn badge(label: &'static str, tone: Tone) -> Cell {
    Cell::Badge { label, tone }
}

fn event_dates(row: &Record) -> Cell {
    let Record::Event(event) = row else {
        return Cell::Empty;
    };
    match event.ends_on {
        Some(ends) if ends != event.starts_on => Cell::text(format!("{} to {ends}", event.starts_on)),
        _ => Cell::Date(Some(event.starts_on)),
    }
}

fn event_status(row: &Record) -> Cell {
    let Record::Event(event) = row else {
        return Cell::Empty;
    };
    let tone = match event.status {
        EventStatus::Draft => Tone::Neutral,
        EventStatus::Open => Tone::Positive,
        EventStatus::Closed => Tone::Warning,
    };
    badge(event.status.as_str(), tone)
}

fn submission_status(row: &Record) -> Cell {
    let Record::Submission(submission) = row else {
        return Cell::Empty;
    };
    let tone = match submission.status {
        SubmissionStatus::Pending => Tone::Neutral,
        SubmissionStatus::Shortlisted => Tone::Warning,
        SubmissionStatus::Winner => Tone::Positive,
        SubmissionStatus::Rejected => Tone::Negative,
    };
    badge(submission.status.as_str(), tone)
}

fn evaluation_score(row: &Record) -> Cell {
    let Record::Evaluation(evaluation) = row else {
        return Cell::Empty;
    };
    Cell::text(format!("{}/10", evaluation.score.min(10)))
}

fn payment_status(row: &Record) -> Cell {
    let Record::Payment(payment) = row else {
        return Cell::Empty;
    };
    let tone = match payment.status {
        PaymentStatus::Pending => Tone::Warning,
        PaymentStatus::Paid => Tone::Positive,
        PaymentStatus::Failed => Tone::Negative,
    };
    badge(payment.status.as_str(), tone)
}

fn user_status(row: &Record) -> Cell {
    let Record::User(user) = row else {
        return Cell::Empty;
    };
    if user.active {
        badge("active", Tone::Positive)
    } else {
        badge("inactive", Tone::Negative)
    }
}

pub fn table_spec(resource: ResourceKind) -> TableSpec<Record> {
    let columns = match resource {
        ResourceKind::Events => vec![
            Column::field("Title", "title"),
            Column::field("Location", "location"),
            Column::derived("Dates", event_dates),
            Column::derived("Status", event_status),
            Column::field("Pitches", "submission_count"),
        ],
        ResourceKind::Vendors => vec![
            Column::field("Company", "company_name"),
            Column::field("Contact", "contact_name"),
            Column::field("Email", "email"),
            Column::field("Category", "category"),
            Column::field("Verified", "verified"),
        ],
        ResourceKind::Submissions => vec![
            Column::field("Pitch", "pitch_title"),
            Column::field("Event", "event_title"),
            Column::field("Vendor", "vendor_name"),
            Column::derived("Status", submission_status),
            Column::field("Submitted", "submitted_on"),
        ],
        ResourceKind::Evaluations => vec![
            Column::field("Pitch", "pitch_title"),
            Column::field("Evaluator", "evaluator_name"),
            Column::derived("Score", evaluation_score),
            Column::field("Comment", "comment"),
        ],
        ResourceKind::Payments => vec![
            Column::field("Vendor", "vendor_name"),
            Column::field("Event", "event_title"),
            Column::field("Amount", "amount"),
            Column::derived("Status", payment_status),
            Column::field("Paid", "paid_on"),
        ],
        ResourceKind::Users => vec![
            Column::field("Name", "name"),
            Column::field("Email", "email"),
            Column::field("Role", "role"),
            Column::derived("Status", user_status),
        ],
        ResourceKind::Roles => vec![
            Column::field("Name", "name"),
            Column::field("Description", "description"),
            Column::field("Permissions", "permission_count"),
        ],
        ResourceKind::Menus => vec![
            Column::field("Code", "name"),
            Column::field("Title", "title"),
            Column::field("Path", "path"),
            Column::field("Parent", "parent_id"),
            Column::field("Order", "order_index"),
        ],
    };
    let spec = TableSpec::new(columns, "id")
        .with_empty_message(format!("no {} found", resource.label()));
    match resource {
        ResourceKind::Events | ResourceKind::Submissions | ResourceKind::Vendors => {
            spec.with_row_click()
        }
        _ => spec,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    View,
    Edit,
    UploadDocument,
    Shortlist,
    MarkWinner,
    Export,
    Delete,
}

/// Builds the per-row action menu. Items the capabilities deny are hidden,
/// so a row the user cannot act on gets no trigger at all.
pub fn row_actions(caps: &ViewCapabilities, row: &Record) -> ActionMenu<RowAction> {
    let pending_pitch = matches!(
        row,
        Record::Submission(submission) if !submission.status.is_final()
    );
    let shortlisted = matches!(
        row,
        Record::Submission(submission) if submission.status == SubmissionStatus::Shortlisted
    );
    let is_submission = matches!(row, Record::Submission(_));

    ActionMenu::new(vec![
        ActionMenuItem::new("View", RowAction::View)
            .icon(">")
            .hidden_unless(caps.can_view),
        ActionMenuItem::new("Edit", RowAction::Edit)
            .icon("~")
            .hidden_unless(caps.can_update),
        ActionMenuItem::new("Upload document", RowAction::UploadDocument)
            .icon("^")
            .hidden_unless(is_submission && caps.can_update),
        ActionMenuItem::new("Shortlist", RowAction::Shortlist)
            .icon("*")
            .hidden_unless(pending_pitch && !shortlisted && caps.can_shortlist),
        ActionMenuItem::new("Mark winner", RowAction::MarkWinner)
            .icon("!")
            .hidden_unless(shortlisted && caps.can_shortlist),
        ActionMenuItem::new("Export", RowAction::Export)
            .icon("=")
            .hidden_unless(caps.can_export),
        ActionMenuItem::new("Delete", RowAction::Delete)
            .icon("x")
            .danger()
            .hidden_unless(caps.can_delete),
    ])
}

#[cfg(test)]
mod tests {
    use super::{Record, RowAction, descriptor, row_actions, table_spec};
    use crate::{
        EventId, ItemVariant, Permission, ResourceKind, Role, Session, SessionUser, Submission,
        SubmissionId, SubmissionStatus, TableView, UserId, VendorId, ViewCapabilities,
    };
    use time::macros::date;

    fn session(role: Role, grants: &[(&str, &str)]) -> Session {
        Session::new(
            "token",
            SessionUser {
                id: UserId::new(7),
                name: "Rae".to_owned(),
                email: "rae@example.com".to_owned(),
                role,
            },
            grants
                .iter()
                .map(|(resource, action)| Permission::new(*resource, *action)),
        )
    }

    fn pitch(status: SubmissionStatus) -> Record {
        Record::Submission(Submission {
            id: SubmissionId::new(11),
            event_id: EventId::new(2),
            event_title: "Harbor Expo".to_owned(),
            vendor_id: VendorId::new(5),
            vendor_name: "Acme Catering".to_owned(),
            pitch_title: "Seafood buffet".to_owned(),
            status,
            submitted_on: date!(2026 - 03 - 14),
        })
    }

    fn labels(caps: &ViewCapabilities, row: &Record) -> Vec<RowAction> {
        row_actions(caps, row)
            .items()
            .iter()
            .map(|item| item.action)
            .collect()
    }

    #[test]
    fn shortlist_needs_review_and_staff_or_event_owner() {
        let rule = descriptor(ResourceKind::Submissions);

        let owner = session(
            Role::Client,
            &[("submissions", "read"), ("submissions", "review"), ("events", "update")],
        );
        assert!(rule.evaluate(&owner).can_shortlist);

        let reviewer = session(Role::Client, &[("submissions", "review")]);
        assert!(!rule.evaluate(&reviewer).can_shortlist);

        let admin = session(Role::Admin, &[("*", "*")]);
        assert!(rule.evaluate(&admin).can_shortlist);
    }

    #[test]
    fn admin_views_require_role() {
        let admin = session(Role::Admin, &[("*", "*")]);
        assert!(descriptor(ResourceKind::Users).evaluate(&admin).can_view);
        assert!(!descriptor(ResourceKind::Roles).evaluate(&admin).can_view);

        let root = session(Role::SuperAdmin, &[("*", "*")]);
        let roles = descriptor(ResourceKind::Menus).evaluate(&root);
        assert!(roles.can_view);
        assert!(roles.can_manage);

        let client = session(Role::Client, &[("users", "read")]);
        assert!(!descriptor(ResourceKind::Users).evaluate(&client).can_view);
    }

    #[test]
    fn row_actions_follow_capabilities_and_status() {
        let admin = session(Role::Admin, &[("*", "*")]);
        let caps = descriptor(ResourceKind::Submissions).evaluate(&admin);

        assert_eq!(
            labels(&caps, &pitch(SubmissionStatus::Pending)),
            vec![
                RowAction::View,
                RowAction::Edit,
                RowAction::UploadDocument,
                RowAction::Shortlist,
                RowAction::Export,
                RowAction::Delete,
            ]
        );
        assert!(
            labels(&caps, &pitch(SubmissionStatus::Shortlisted)).contains(&RowAction::MarkWinner)
        );
        let winner = labels(&caps, &pitch(SubmissionStatus::Winner));
        assert!(!winner.contains(&RowAction::Shortlist));
        assert!(!winner.contains(&RowAction::MarkWinner));

        let menu = row_actions(&caps, &pitch(SubmissionStatus::Pending));
        let delete = menu.items().last().expect("delete item");
        assert_eq!(delete.variant, ItemVariant::Danger);
    }

    #[test]
    fn no_capabilities_means_no_trigger() {
        let caps = ViewCapabilities::none(ResourceKind::Submissions);
        assert!(row_actions(&caps, &pitch(SubmissionStatus::Pending))
            .trigger()
            .is_none());
    }

    #[test]
    fn submission_table_uses_derived_status_badge() {
        let spec = table_spec(ResourceKind::Submissions);
        assert!(spec.row_click);
        let TableView::Rows { header, rows } = spec.render(&[pitch(SubmissionStatus::Winner)], false)
        else {
            panic!("expected rows");
        };
        assert_eq!(header[0], "Pitch");
        assert_eq!(rows[0].key, "11");
        assert_eq!(rows[0].cells[3].display(), "winner");
        assert_eq!(rows[0].cells[4].display(), "2026-03-14");
    }

    #[test]
    fn empty_message_names_the_view() {
        assert_eq!(
            table_spec(ResourceKind::Submissions).render(&[], false),
            TableView::Empty("no pitches found".to_owned())
        );
    }
}
