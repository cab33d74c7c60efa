use rand::Rng;
use serde::{Deserialize, Serialize};

/// Names of the services every fresh store starts with.
pub const SEED_SERVICES: [&str; 5] = [
    "Broadband Access",
    "Mobile Hotspots",
    "Online Content",
    "IT Support Hotline",
    "Tech Delivery",
];

/// Lowest value a rating slider can take.
pub const RATING_MIN: u8 = 1;
/// Highest value a rating slider can take.
pub const RATING_MAX: u8 = 10;
/// Value every slider starts at.
pub const RATING_DEFAULT: u8 = 5;

/// A named service rated along four dimensions
///
/// The name is the key that edit and remove operations match on. It is
/// serialized as `service` to keep the column name the stores and exports use.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRecord {
    #[serde(rename = "service")]
    pub name: String,
    pub urgency: u8,
    pub resources: u8,
    pub regulations: u8,
    pub uncertainty: u8,
}

impl ServiceRecord {
    pub fn new(
        name: impl Into<String>,
        urgency: u8,
        resources: u8,
        regulations: u8,
        uncertainty: u8,
    ) -> Self {
        ServiceRecord {
            name: name.into(),
            urgency,
            resources,
            regulations,
            uncertainty,
        }
    }

    /// The four ratings in column order.
    pub fn ratings(&self) -> [u8; 4] {
        [
            self.urgency,
            self.resources,
            self.regulations,
            self.uncertainty,
        ]
    }

    pub fn set_ratings(&mut self, [urgency, resources, regulations, uncertainty]: [u8; 4]) {
        self.urgency = urgency;
        self.resources = resources;
        self.regulations = regulations;
        self.uncertainty = uncertainty;
    }
}

/// The full collection of services at one point in time
///
/// Insertion order is kept (it drives the chart and selector order) but
/// carries no meaning beyond that. Names are expected to be unique, but
/// nothing enforces it: adding an existing name creates a second row.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dataset {
    records: Vec<ServiceRecord>,
}

impl Dataset {
    pub fn new(records: Vec<ServiceRecord>) -> Self {
        Dataset { records }
    }

    /// Builds the five seed services with ratings drawn from `1..=9`.
    pub fn seeded<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let records = SEED_SERVICES
            .iter()
            .map(|name| {
                ServiceRecord::new(
                    *name,
                    rng.gen_range(RATING_MIN..RATING_MAX),
                    rng.gen_range(RATING_MIN..RATING_MAX),
                    rng.gen_range(RATING_MIN..RATING_MAX),
                    rng.gen_range(RATING_MIN..RATING_MAX),
                )
            })
            .collect();
        Dataset { records }
    }

    pub fn records(&self) -> &[ServiceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.records.iter().any(|r| r.name == name)
    }

    /// Number of rows carrying `name`.
    pub fn count(&self, name: &str) -> usize {
        self.records.iter().filter(|r| r.name == name).count()
    }

    pub fn get(&self, name: &str) -> Option<&ServiceRecord> {
        self.records.iter().find(|r| r.name == name)
    }

    pub fn push(&mut self, record: ServiceRecord) {
        self.records.push(record);
    }

    /// Overwrites the ratings of every row named `name`; returns how many changed.
    pub fn update_ratings(&mut self, name: &str, ratings: [u8; 4]) -> usize {
        let mut touched = 0;
        for record in self.records.iter_mut().filter(|r| r.name == name) {
            record.set_ratings(ratings);
            touched += 1;
        }
        touched
    }

    /// Deletes every row named `name`; returns how many were removed.
    pub fn remove_all(&mut self, name: &str) -> usize {
        let before = self.records.len();
        self.records.retain(|r| r.name != name);
        before - self.records.len()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.name.as_str())
    }
}

impl From<Vec<ServiceRecord>> for Dataset {
    fn from(records: Vec<ServiceRecord>) -> Self {
        Dataset::new(records)
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a ServiceRecord;
    type IntoIter = std::slice::Iter<'a, ServiceRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Clamps a submitted rating into the slider range.
pub fn clamp_rating(value: i64) -> u8 {
    value.clamp(RATING_MIN as i64, RATING_MAX as i64) as u8
}
