// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use std::path::PathBuf;
use time::{Date, Duration, Month};
use vendorhub_app::{
    CapabilityOracle, Event, EventId, EventStatus, MenuId, MenuRecord, Payment, PaymentId,
    PaymentStatus, Permission, Record, Role, Session, SessionUser, Submission, SubmissionId,
    SubmissionStatus, UserId, Vendor, VendorId,
};

const REFERENCE_YEAR: i32 = 2026;

const EVENT_KINDS: [&str; 8] = [
    "Conference",
    "Expo",
    "Summit",
    "Gala",
    "Festival",
    "Trade Show",
    "Wedding Fair",
    "Retreat",
];
const CITIES: [&str; 10] = [
    "Austin",
    "Seattle",
    "Denver",
    "Madison",
    "Raleigh",
    "Portland",
    "Boise",
    "Nashville",
    "Columbus",
    "Omaha",
];
const CATEGORIES: [&str; 8] = [
    "Catering",
    "Audio/Visual",
    "Decor",
    "Photography",
    "Security",
    "Transport",
    "Venue",
    "Entertainment",
];
const COMPANY_WORDS: [&str; 10] = [
    "Harbor", "Summit", "Bright", "Cedar", "Apex", "Lakeside", "Heritage", "Northwind",
    "Silverline", "Bluebird",
];
const COMPANY_SUFFIXES: [&str; 5] = ["Co", "Group", "Works", "Collective", "Partners"];
const FIRST_NAMES: [&str; 12] = [
    "Avery", "Jordan", "Taylor", "Riley", "Morgan", "Casey", "Quinn", "Parker", "Kai", "Robin",
    "Hayden", "Rowan",
];
const LAST_NAMES: [&str; 12] = [
    "Walker", "Martin", "Hill", "Evans", "Lopez", "Gray", "Reed", "Turner", "Flores", "Price",
    "Morris", "Brooks",
];
const PITCH_TOPICS: [&str; 8] = [
    "Seasonal tasting menu",
    "Stage lighting package",
    "Floral centerpieces",
    "Drone photography",
    "Crowd management plan",
    "Shuttle loop service",
    "Rooftop venue hire",
    "Live jazz trio",
];

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

/// Deterministic record generator for list and table tests.
#[derive(Debug, Clone)]
pub struct VendorFaker {
    rng: DeterministicRng,
    next_id: i64,
}

impl VendorFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            next_id: 1,
        }
    }

    pub fn event(&mut self) -> Event {
        let id = self.id();
        let kind = self.pick(&EVENT_KINDS);
        let city = self.pick(&CITIES);
        let starts_on = self.date_in_year(REFERENCE_YEAR);
        let days = self.rng.int_n(4) as i64;
        let status = match self.rng.int_n(3) {
            0 => EventStatus::Draft,
            1 => EventStatus::Open,
            _ => EventStatus::Closed,
        };
        Event {
            id: EventId::new(id),
            title: format!("{city} {kind} {REFERENCE_YEAR}"),
            location: city.to_owned(),
            starts_on,
            ends_on: (days > 0).then(|| starts_on + Duration::days(days)),
            status,
            submission_count: self.rng.int_n(40) as i64,
        }
    }

    pub fn vendor(&mut self) -> Vendor {
        let id = self.id();
        let company = format!(
            "{} {}",
            self.pick(&COMPANY_WORDS),
            self.pick(&COMPANY_SUFFIXES)
        );
        let first = self.pick(&FIRST_NAMES);
        let last = self.pick(&LAST_NAMES);
        Vendor {
            id: VendorId::new(id),
            email: format!(
                "{}.{}@{}.example",
                first.to_ascii_lowercase(),
                last.to_ascii_lowercase(),
                company.split(' ').next().unwrap_or("vendor").to_ascii_lowercase()
            ),
            company_name: company,
            contact_name: format!("{first} {last}"),
            phone: format!(
                "({:03}) {:03}-{:04}",
                200 + self.rng.int_n(800),
                200 + self.rng.int_n(800),
                self.rng.int_n(10_000)
            ),
            category: self.pick(&CATEGORIES).to_owned(),
            verified: self.rng.bool(),
        }
    }

    pub fn submission(&mut self, event: &Event, vendor: &Vendor) -> Submission {
        let id = self.id();
        let status = match self.rng.int_n(4) {
            0 => SubmissionStatus::Pending,
            1 => SubmissionStatus::Shortlisted,
            2 => SubmissionStatus::Winner,
            _ => SubmissionStatus::Rejected,
        };
        Submission {
            id: SubmissionId::new(id),
            event_id: event.id,
            event_title: event.title.clone(),
            vendor_id: vendor.id,
            vendor_name: vendor.company_name.clone(),
            pitch_title: self.pick(&PITCH_TOPICS).to_owned(),
            status,
            submitted_on: event.starts_on - Duration::days(1 + self.rng.int_n(60) as i64),
        }
    }

    pub fn payment(&mut self, event: &Event, vendor: &Vendor) -> Payment {
        let id = self.id();
        let status = match self.rng.int_n(3) {
            0 => PaymentStatus::Pending,
            1 => PaymentStatus::Paid,
            _ => PaymentStatus::Failed,
        };
        Payment {
            id: PaymentId::new(id),
            vendor_name: vendor.company_name.clone(),
            event_title: event.title.clone(),
            amount_cents: 50_000 + self.rng.int_n(5_000_000) as i64,
            paid_on: (status == PaymentStatus::Paid).then_some(event.starts_on),
            status,
        }
    }

    /// `count` event rows wrapped for a list view.
    pub fn event_records(&mut self, count: usize) -> Vec<Record> {
        (0..count).map(|_| Record::Event(self.event())).collect()
    }

    pub fn submission_records(&mut self, count: usize) -> Vec<Record> {
        let event = self.event();
        (0..count)
            .map(|_| {
                let vendor = self.vendor();
                Record::Submission(self.submission(&event, &vendor))
            })
            .collect()
    }

    fn date_in_year(&mut self, year: i32) -> Date {
        let start = Date::from_calendar_date(year, Month::January, 1).unwrap_or(Date::MIN);
        start + Duration::days(self.rng.int_n(365) as i64)
    }

    fn id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }
}

pub fn user(role: Role) -> SessionUser {
    let (id, name) = match role {
        Role::Vendor => (10, "Vera Vendor"),
        Role::Client => (20, "Cory Client"),
        Role::Admin => (30, "Ada Admin"),
        Role::SuperAdmin => (40, "Sol Root"),
    };
    SessionUser {
        id: UserId::new(id),
        name: name.to_owned(),
        email: format!("{}@vendorhub.test", role.as_str()),
        role,
    }
}

/// Session with explicit `(resource, action)` grants.
pub fn session(role: Role, grants: &[(&str, &str)]) -> Session {
    Session::new(
        format!("token-{}", role.as_str()),
        user(role),
        grants
            .iter()
            .map(|(resource, action)| Permission::new(*resource, *action)),
    )
}

/// Session that may do anything.
pub fn root_session(role: Role) -> Session {
    session(role, &[("*", "*")])
}

/// Oracle answering from a fixed allow list, for tests that do not need a
/// full session.
#[derive(Debug, Clone, Default)]
pub struct FakeOracle {
    pub role: Option<Role>,
    pub allowed: Vec<(String, String)>,
}

impl FakeOracle {
    pub fn allow(mut self, resource: &str, action: &str) -> Self {
        self.allowed.push((resource.to_owned(), action.to_owned()));
        self
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }
}

impl CapabilityOracle for FakeOracle {
    fn has_permission(&self, resource: &str, action: &str) -> bool {
        self.allowed
            .iter()
            .any(|(allowed_resource, allowed_action)| {
                allowed_resource == resource && allowed_action == action
            })
    }

    fn role(&self) -> Option<Role> {
        self.role
    }
}

pub fn menu_record(
    id: i64,
    name: &str,
    path: &str,
    parent: Option<i64>,
    order_index: i64,
) -> MenuRecord {
    MenuRecord {
        id: Some(MenuId::new(id)),
        name: name.to_owned(),
        display_name: String::new(),
        path: path.to_owned(),
        icon: String::new(),
        parent_id: parent.map(MenuId::new),
        order_index,
    }
}

/// A server menu with a group, out-of-order children and one record whose
/// parent is missing from the set.
pub fn server_menus() -> Vec<MenuRecord> {
    vec![
        menu_record(5, "payments", "/payments", Some(2), 3),
        menu_record(1, "dashboard", "/dashboard", None, 1),
        menu_record(2, "operations", "", None, 2),
        menu_record(3, "events", "/events", Some(2), 1),
        menu_record(4, "submissions", "/submissions", Some(2), 2),
        menu_record(9, "vendors", "/vendors", Some(77), 4),
    ]
}

pub fn temp_db_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let db_path = dir.path().join("settings.db");
    Ok((dir, db_path))
}

#[cfg(test)]
mod tests {
    use super::{FakeOracle, VendorFaker, root_session, server_menus};
    use vendorhub_app::{CapabilityOracle, Record, Role, build_hierarchy};

    #[test]
    fn same_seed_same_records() {
        let mut left = VendorFaker::new(42);
        let mut right = VendorFaker::new(42);
        assert_eq!(left.vendor(), right.vendor());
        assert_eq!(left.event(), right.event());
    }

    #[test]
    fn ids_are_unique_and_increasing() {
        let mut faker = VendorFaker::new(7);
        let rows = faker.event_records(5);
        let ids: Vec<i64> = rows.iter().filter_map(Record::id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn submissions_precede_their_event() {
        let mut faker = VendorFaker::new(3);
        for _ in 0..20 {
            let event = faker.event();
            let vendor = faker.vendor();
            let submission = faker.submission(&event, &vendor);
            assert!(submission.submitted_on < event.starts_on);
            assert_eq!(submission.event_id, event.id);
        }
    }

    #[test]
    fn server_menus_promote_dangling_parent() {
        let roots = build_hierarchy(&server_menus());
        let names: Vec<&str> = roots
            .iter()
            .map(|node| node.record.name.as_str())
            .collect();
        assert_eq!(names, vec!["dashboard", "operations", "vendors"]);
    }

    #[test]
    fn oracles() {
        let oracle = FakeOracle::default().allow("events", "read");
        assert!(oracle.has_permission("events", "read"));
        assert!(!oracle.has_permission("events", "update"));
        assert!(root_session(Role::Admin).has_permission("roles", "delete"));
    }
}
