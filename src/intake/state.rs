//! Intake state — which slot the conversation is waiting for.

use serde::{Deserialize, Serialize};

/// Sex of the child, canonicalized from free-text synonyms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    /// Key used for this sex in the percentile table.
    pub fn table_key(&self) -> &'static str {
        match self {
            Self::Male => "niño",
            Self::Female => "niña",
        }
    }
}

impl std::fmt::Display for Sex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.table_key())
    }
}

/// The stages of the intake conversation.
///
/// Progresses linearly: Name → Age → Sex → Weight → Height → Complete.
/// Restart returns to Name from any stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntakeStage {
    Name,
    Age,
    Sex,
    Weight,
    Height,
    Complete,
}

impl IntakeStage {
    /// Whether this stage is terminal (all slots filled).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete)
    }

    /// Get the next stage in the linear progression, if any.
    pub fn next(&self) -> Option<IntakeStage> {
        use IntakeStage::*;
        match self {
            Name => Some(Age),
            Age => Some(Sex),
            Sex => Some(Weight),
            Weight => Some(Height),
            Height => Some(Complete),
            Complete => None,
        }
    }
}

impl Default for IntakeStage {
    fn default() -> Self {
        Self::Name
    }
}

impl std::fmt::Display for IntakeStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Name => "name",
            Self::Age => "age",
            Self::Sex => "sex",
            Self::Weight => "weight",
            Self::Height => "height",
            Self::Complete => "complete",
        };
        write!(f, "{s}")
    }
}

/// A validated value for one slot.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotValue {
    Name(String),
    Age(u8),
    Sex(Sex),
    Weight(f64),
    /// Height closes the intake and carries the chart produced for it.
    Height {
        height_m: f64,
        graph_reference: Option<String>,
    },
}

impl SlotValue {
    /// The stage this value fills.
    pub fn stage(&self) -> IntakeStage {
        match self {
            Self::Name(_) => IntakeStage::Name,
            Self::Age(_) => IntakeStage::Age,
            Self::Sex(_) => IntakeStage::Sex,
            Self::Weight(_) => IntakeStage::Weight,
            Self::Height { .. } => IntakeStage::Height,
        }
    }
}

/// Per-conversation slot state.
///
/// Slots only get filled through [`ConversationState::fill`], which enforces
/// the stage order and never overwrites a filled slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    name: Option<String>,
    age: Option<u8>,
    sex: Option<Sex>,
    weight_kg: Option<f64>,
    height_m: Option<f64>,
    /// Rejected inputs for the slot currently being asked.
    failed_attempts: u32,
    graph_reference: Option<String>,
}

impl ConversationState {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn age(&self) -> Option<u8> {
        self.age
    }

    pub fn sex(&self) -> Option<Sex> {
        self.sex
    }

    pub fn weight_kg(&self) -> Option<f64> {
        self.weight_kg
    }

    pub fn height_m(&self) -> Option<f64> {
        self.height_m
    }

    pub fn failed_attempts(&self) -> u32 {
        self.failed_attempts
    }

    pub fn graph_reference(&self) -> Option<&str> {
        self.graph_reference.as_deref()
    }

    /// The stage the conversation is waiting on, derived from the filled slots.
    pub fn stage(&self) -> IntakeStage {
        if self.name.is_none() {
            IntakeStage::Name
        } else if self.age.is_none() {
            IntakeStage::Age
        } else if self.sex.is_none() {
            IntakeStage::Sex
        } else if self.weight_kg.is_none() {
            IntakeStage::Weight
        } else if self.height_m.is_none() {
            IntakeStage::Height
        } else {
            IntakeStage::Complete
        }
    }

    /// Fill the slot for the current stage and advance.
    ///
    /// Returns an error if `value` belongs to a different stage. On success the
    /// attempt counter is reset and the new stage is returned.
    pub fn fill(&mut self, value: SlotValue) -> Result<IntakeStage, String> {
        let current = self.stage();
        let target = value.stage();
        if target != current {
            return Err(format!("Cannot fill {target} while waiting for {current}"));
        }
        let next = current
            .next()
            .ok_or_else(|| "Already at terminal stage".to_string())?;

        match value {
            SlotValue::Name(name) => self.name = Some(name),
            SlotValue::Age(age) => self.age = Some(age),
            SlotValue::Sex(sex) => self.sex = Some(sex),
            SlotValue::Weight(weight) => self.weight_kg = Some(weight),
            SlotValue::Height {
                height_m,
                graph_reference,
            } => {
                self.height_m = Some(height_m);
                self.graph_reference = graph_reference;
            }
        }
        self.failed_attempts = 0;
        Ok(next)
    }

    /// Count a rejected input for the current slot. Returns the new count.
    pub fn record_failure(&mut self) -> u32 {
        self.failed_attempts += 1;
        self.failed_attempts
    }

    /// Return to the all-empty initial state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
