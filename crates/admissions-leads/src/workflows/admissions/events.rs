use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::classification::QualificationView;
use super::domain::{AttributeRecord, FormFillerType, LeadCategory};

/// Points in the form lifecycle at which tracking events fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleStage {
    Page1Complete,
    Page2View,
    Page2Submit,
    FormComplete,
}

impl LifecycleStage {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::Page1Complete,
            Self::Page2View,
            Self::Page2Submit,
            Self::FormComplete,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Page1Complete => "page_1_complete",
            Self::Page2View => "page_2_view",
            Self::Page2Submit => "page_2_submit",
            Self::FormComplete => "form_complete",
        }
    }
}

/// How the primary classification event buckets a lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Disposition {
    Spam,
    Qualified,
    Disqualified,
}

impl Disposition {
    const fn label(self) -> &'static str {
        match self {
            Self::Spam => "spam",
            Self::Qualified => "qualified",
            Self::Disqualified => "disqualified",
        }
    }

    // Spam outranks qualification; students count as qualified when a parent would.
    fn of(role: FormFillerType, view: &QualificationView) -> Self {
        if view.is_spam {
            return Self::Spam;
        }
        let qualified = match role {
            FormFillerType::Parent => view.is_qualified,
            FormFillerType::Student => view.would_qualify_as_parent,
        };
        if qualified {
            Self::Qualified
        } else {
            Self::Disqualified
        }
    }
}

fn stage_event(stage: LifecycleStage) -> String {
    format!("lead_{}", stage.label())
}

fn primary_event(role: FormFillerType, disposition: Disposition) -> String {
    format!("lead_{}_{}", role.label(), disposition.label())
}

fn category_event(stage: LifecycleStage, category: LeadCategory) -> String {
    format!("{}_{}", stage.label(), category.label())
}

fn qualified_role_event(stage: LifecycleStage, role: FormFillerType) -> String {
    format!("{}_qualified_{}", stage.label(), role.label())
}

/// Event names to fire at `stage` for a classified lead.
///
/// The set is unordered by contract; downstream transports may dispatch in any order.
pub fn select_events(
    stage: LifecycleStage,
    record: &AttributeRecord,
    category: LeadCategory,
    view: &QualificationView,
) -> BTreeSet<String> {
    let role = record.form_filler_type;
    let mut events = BTreeSet::new();

    events.insert(stage_event(stage));

    if stage == LifecycleStage::Page1Complete {
        events.insert(primary_event(role, Disposition::of(role, view)));
    }

    if view.is_qualified {
        events.insert(category_event(stage, category));
    }

    let qualified_role = match role {
        FormFillerType::Parent => view.is_qualified,
        FormFillerType::Student => view.would_qualify_as_parent,
    };
    if qualified_role {
        events.insert(qualified_role_event(stage, role));
    }

    events
}

/// Every event name the selector can emit, for pixel/CAPI configuration.
pub fn catalog() -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    for role in FormFillerType::ordered() {
        for disposition in [
            Disposition::Spam,
            Disposition::Qualified,
            Disposition::Disqualified,
        ] {
            names.insert(primary_event(role, disposition));
        }
    }

    for stage in LifecycleStage::ordered() {
        names.insert(stage_event(stage));
        for category in LeadCategory::ordered()
            .into_iter()
            .filter(|category| category.is_qualified())
        {
            names.insert(category_event(stage, category));
        }
        for role in FormFillerType::ordered() {
            names.insert(qualified_role_event(stage, role));
        }
    }

    names
}

/// One event fired at a given stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiredEvent {
    pub stage: LifecycleStage,
    pub name: String,
}

/// Append-only history of fired events for a lead.
///
/// Each stage produces a new log rather than mutating the previous one, so a snapshot
/// handed to persistence never changes underneath it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLog {
    entries: Vec<FiredEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stage(&self, stage: LifecycleStage, events: &BTreeSet<String>) -> Self {
        let entries = self
            .entries
            .iter()
            .cloned()
            .chain(events.iter().map(|name| FiredEvent {
                stage,
                name: name.clone(),
            }))
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[FiredEvent] {
        &self.entries
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|event| event.name == name)
    }

    pub fn has_stage(&self, stage: LifecycleStage) -> bool {
        self.entries.iter().any(|event| event.stage == stage)
    }

    pub fn names_for(&self, stage: LifecycleStage) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|event| event.stage == stage)
            .map(|event| event.name.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
