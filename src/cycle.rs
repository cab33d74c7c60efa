use serde::{Deserialize, Deserializer, Serialize};

use crate::error::StoreError;
use crate::record::{Dataset, RATING_DEFAULT, ServiceRecord, clamp_rating};
use crate::store::DatasetStore;
use crate::view::{View, project};

/// The action that starts one update cycle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trigger {
    Add,
    Update,
    Remove,
    /// Nothing pressed, e.g. the first page load.
    #[default]
    None,
}

/// Maps the control that fired to a trigger
///
/// Accepts the short action names used by the API and the button ids of the
/// dashboard page. Anything unrecognised, including no control at all, is
/// `Trigger::None`.
pub fn dispatch(control: Option<&str>) -> Trigger {
    let Some(control) = control else {
        return Trigger::None;
    };
    let control = control.trim().to_ascii_lowercase();
    let action = control.strip_suffix("-button").unwrap_or(control.as_str());
    match action {
        "add" => Trigger::Add,
        "update" => Trigger::Update,
        "remove" => Trigger::Remove,
        _ => Trigger::None,
    }
}

fn default_rating() -> u8 {
    RATING_DEFAULT
}

fn rating<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<i64>::deserialize(deserializer)?;
    Ok(value.map_or(RATING_DEFAULT, clamp_rating))
}

/// Values of every form control at the moment a trigger fires
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSnapshot {
    #[serde(default)]
    pub selected_name: Option<String>,
    #[serde(default)]
    pub new_name: Option<String>,
    #[serde(default = "default_rating", deserialize_with = "rating")]
    pub urgency: u8,
    #[serde(default = "default_rating", deserialize_with = "rating")]
    pub resources: u8,
    #[serde(default = "default_rating", deserialize_with = "rating")]
    pub regulations: u8,
    #[serde(default = "default_rating", deserialize_with = "rating")]
    pub uncertainty: u8,
}

impl Default for FormSnapshot {
    fn default() -> Self {
        FormSnapshot {
            selected_name: None,
            new_name: None,
            urgency: RATING_DEFAULT,
            resources: RATING_DEFAULT,
            regulations: RATING_DEFAULT,
            uncertainty: RATING_DEFAULT,
        }
    }
}

impl FormSnapshot {
    pub fn ratings(&self) -> [u8; 4] {
        [
            self.urgency,
            self.resources,
            self.regulations,
            self.uncertainty,
        ]
    }

    pub fn with_ratings(mut self, [urgency, resources, regulations, uncertainty]: [u8; 4]) -> Self {
        self.urgency = urgency;
        self.resources = resources;
        self.regulations = regulations;
        self.uncertainty = uncertainty;
        self
    }

    pub fn selecting(mut self, name: impl Into<String>) -> Self {
        self.selected_name = Some(name.into());
        self
    }

    pub fn naming(mut self, name: impl Into<String>) -> Self {
        self.new_name = Some(name.into());
        self
    }

    fn selection(&self) -> Option<&str> {
        self.selected_name.as_deref().filter(|s| !s.is_empty())
    }

    fn addition(&self) -> Option<&str> {
        self.new_name.as_deref().filter(|s| !s.is_empty())
    }
}

/// Computes the dataset that follows `trigger`
///
/// Missing or unmatched names leave the dataset as it was. Adding an existing
/// name appends a duplicate row; update and remove act on every row with the
/// selected name.
pub fn apply(trigger: Trigger, mut dataset: Dataset, form: &FormSnapshot) -> Dataset {
    match trigger {
        Trigger::Add => {
            if let Some(name) = form.addition() {
                let [u, r, g, c] = form.ratings();
                dataset.push(ServiceRecord::new(name, u, r, g, c));
            }
        }
        Trigger::Update => {
            if let Some(name) = form.selection() {
                dataset.update_ratings(name, form.ratings());
            }
        }
        Trigger::Remove => {
            if let Some(name) = form.selection() {
                dataset.remove_all(name);
            }
        }
        Trigger::None => {}
    }
    dataset
}

/// Result of one cycle: the new dataset and what to redraw from it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CycleOutcome {
    pub records: Dataset,
    #[serde(flatten)]
    pub view: View,
}

/// Runs load, apply, save and project against `store`
///
/// The whole dataset is written back every time, including for
/// `Trigger::None`, which is also how a fresh store gets its seed persisted.
pub fn run_cycle<S>(
    store: &mut S,
    trigger: Trigger,
    form: &FormSnapshot,
) -> Result<CycleOutcome, StoreError>
where
    S: DatasetStore + ?Sized,
{
    let current = store.load()?;
    log::debug!("cycle {:?} with form {:?}", trigger, form);

    let next = apply(trigger, current, form);
    store.save(&next)?;
    log::info!("cycle {:?} done, {} records", trigger, next.len());
    log::debug!("dataset after cycle: {:?}", next);

    let view = project(&next);
    Ok(CycleOutcome {
        records: next,
        view,
    })
}

/// Loads the current dataset and projects it without writing anything back
///
/// A fresh store still seeds itself on this first load. Read-only views
/// (chart, exports) use this instead of a full cycle.
pub fn observe<S>(store: &mut S) -> Result<CycleOutcome, StoreError>
where
    S: DatasetStore + ?Sized,
{
    let records = store.load()?;
    let view = project(&records);
    Ok(CycleOutcome { records, view })
}
