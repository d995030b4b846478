//! IntakeMachine — validates each answer, fills slots and produces the report.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::chart::{ChartRenderer, ChartRequest};
use crate::config::IntakeLimits;
use crate::percentile::{self, TableProvider};
use crate::report::{self, ReportInput};

use super::extract::extract_number;
use super::normalize::is_restart_command;
use super::prompts::{self, PromptChooser, RandomChooser};
use super::state::{ConversationState, IntakeStage, Sex, SlotValue};

/// What the machine hands back for every input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reply {
    /// Text to show the user.
    #[serde(rename = "response")]
    pub text: String,
    /// Whether a chart was produced for this reply.
    pub show_chart: bool,
    /// Opaque chart reference, present when `show_chart` is true.
    pub chart_id: Option<String>,
}

impl Reply {
    fn text(text: String) -> Self {
        Self {
            text,
            show_chart: false,
            chart_id: None,
        }
    }
}

/// Drives the intake conversation.
///
/// Holds only read-only collaborators; the conversation itself lives in the
/// [`ConversationState`] passed to each call, so one machine serves any number
/// of sessions.
pub struct IntakeMachine {
    tables: Arc<dyn TableProvider>,
    charts: Arc<dyn ChartRenderer>,
    chooser: Arc<dyn PromptChooser>,
    limits: IntakeLimits,
}

impl IntakeMachine {
    pub fn new(tables: Arc<dyn TableProvider>, charts: Arc<dyn ChartRenderer>) -> Self {
        Self {
            tables,
            charts,
            chooser: Arc::new(RandomChooser),
            limits: IntakeLimits::default(),
        }
    }

    /// Replace the phrasing chooser (e.g. `FixedChooser` for reproducible output).
    pub fn with_chooser(mut self, chooser: Arc<dyn PromptChooser>) -> Self {
        self.chooser = chooser;
        self
    }

    pub fn with_limits(mut self, limits: IntakeLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Greeting for a fresh conversation.
    pub fn welcome(&self) -> Reply {
        Reply::text(prompts::welcome())
    }

    /// Handle one user input against `state`.
    ///
    /// Never fails: every rejection is a reply asking for the same slot again.
    pub async fn process(&self, state: &mut ConversationState, raw: &str) -> Reply {
        let text = raw.trim();

        if is_restart_command(text) {
            info!(from_stage = %state.stage(), "Conversation restarted");
            state.reset();
            return Reply::text(prompts::restarted());
        }

        let stage = state.stage();
        if stage.is_terminal() {
            return Reply::text(prompts::still_waiting());
        }
        if text.is_empty() {
            return self.reject(state, prompts::nothing_received());
        }

        debug!(stage = %stage, "Processing intake input");
        match stage {
            IntakeStage::Name => self.take_name(state, text),
            IntakeStage::Age => self.take_age(state, text),
            IntakeStage::Sex => self.take_sex(state, text),
            IntakeStage::Weight => self.take_weight(state, text),
            IntakeStage::Height => self.take_height(state, text).await,
            IntakeStage::Complete => Reply::text(prompts::still_waiting()),
        }
    }

    fn take_name(&self, state: &mut ConversationState, text: &str) -> Reply {
        // Over-long names are re-asked without counting as a failed attempt
        if text.chars().count() > self.limits.max_name_chars {
            return Reply::text(prompts::name_too_long(self.limits.max_name_chars));
        }
        let reply = prompts::ask_age(text);
        self.advance(state, SlotValue::Name(text.to_string()), reply)
    }

    fn take_age(&self, state: &mut ConversationState, text: &str) -> Reply {
        let Some(value) = extract_number(text) else {
            return self.reject(state, prompts::age_not_a_number());
        };
        let age = value.trunc();
        if age < f64::from(self.limits.min_age) || age > f64::from(self.limits.max_age) {
            return self.reject(
                state,
                prompts::age_out_of_range(self.limits.min_age, self.limits.max_age),
            );
        }
        let reply = prompts::ask_sex(display_name(state), self.chooser.as_ref());
        self.advance(state, SlotValue::Age(age as u8), reply)
    }

    fn take_sex(&self, state: &mut ConversationState, text: &str) -> Reply {
        let Some(sex) = Sex::from_answer(text) else {
            return self.reject(state, prompts::sex_not_recognized());
        };
        let reply = prompts::ask_weight(display_name(state));
        self.advance(state, SlotValue::Sex(sex), reply)
    }

    fn take_weight(&self, state: &mut ConversationState, text: &str) -> Reply {
        let Some(weight) = extract_number(text) else {
            return self.reject(state, prompts::weight_not_a_number());
        };
        if weight <= 0.0 || weight > self.limits.max_weight_kg {
            return self.reject(state, prompts::weight_out_of_range(self.limits.max_weight_kg));
        }

        // Soft warning: nothing stored, nothing counted. Resending the same
        // value lands here again.
        if let Some(age) = state.age() {
            if age <= self.limits.young_age && weight > self.limits.young_weight_warning_kg {
                debug!(age, weight, "Young-child weight warning");
                return Reply::text(prompts::confirm_young_weight(weight, age));
            }
        }

        let reply = prompts::ask_height(display_name(state));
        self.advance(state, SlotValue::Weight(weight), reply)
    }

    async fn take_height(&self, state: &mut ConversationState, text: &str) -> Reply {
        let Some(raw) = extract_number(text) else {
            return self.reject(state, prompts::height_not_a_number());
        };

        let converted = raw > self.limits.max_height_m && raw <= self.limits.max_height_cm;
        let height_m = if converted { raw / 100.0 } else { raw };
        if height_m <= 0.0 || height_m > self.limits.max_height_m {
            return self.reject(state, prompts::height_out_of_range());
        }

        let notice = if converted {
            prompts::centimeters_converted(raw, height_m)
        } else {
            String::new()
        };
        self.complete(state, height_m, notice).await
    }

    /// Terminal step: classify, chart and report. Only stores the height once
    /// everything it depends on succeeded.
    async fn complete(
        &self,
        state: &mut ConversationState,
        height_m: f64,
        notice: String,
    ) -> Reply {
        let (Some(age), Some(sex), Some(weight_kg)) = (state.age(), state.sex(), state.weight_kg())
        else {
            warn!(stage = %state.stage(), "Height reached with unfilled earlier slots");
            return Reply::text(prompts::still_waiting());
        };

        let bmi = percentile::bmi(weight_kg, height_m);
        if !bmi.is_finite() {
            return self.reject(state, prompts::height_not_a_number());
        }

        let table = match self.tables.load().await {
            Ok(table) => table,
            Err(e) => {
                warn!(error = %e, "Percentile table unavailable");
                return Reply::text(prompts::table_error(&e));
            }
        };

        let Some(thresholds) = table.lookup(sex, age) else {
            warn!(age, sex = %sex, "No percentile data for age/sex");
            return Reply::text(prompts::no_percentile_data(sex, age));
        };
        let category = percentile::classify(bmi, thresholds);

        let chart_id = match self
            .charts
            .render(ChartRequest {
                bmi,
                age,
                sex,
                table: &table,
            })
            .await
        {
            Ok(id) => Some(id),
            Err(e) => {
                warn!(error = %e, "Chart generation failed; sending report without chart");
                None
            }
        };

        let mut text = notice;
        text.push_str(&prompts::result_headline(bmi, category));
        text.push_str(&report::render(&ReportInput {
            bmi,
            age,
            weight_kg,
            height_m,
            category,
            name: state.name(),
        }));
        text.push_str(&prompts::offer_another());

        let reply = Reply {
            text,
            show_chart: chart_id.is_some(),
            chart_id: chart_id.clone(),
        };
        let completed = self.advance_with(
            state,
            SlotValue::Height {
                height_m,
                graph_reference: chart_id,
            },
            reply,
        );
        info!(
            age,
            sex = %sex,
            bmi = %format!("{bmi:.2}"),
            category = ?category,
            chart_id = ?completed.chart_id,
            "Intake completed"
        );
        completed
    }

    fn advance(&self, state: &mut ConversationState, value: SlotValue, reply: String) -> Reply {
        self.advance_with(state, value, Reply::text(reply))
    }

    fn advance_with(&self, state: &mut ConversationState, value: SlotValue, reply: Reply) -> Reply {
        match state.fill(value) {
            Ok(next) => {
                debug!(stage = %next, "Slot filled");
                reply
            }
            Err(e) => {
                warn!(error = %e, "Refused to fill slot");
                Reply::text(prompts::still_waiting())
            }
        }
    }

    /// Count a failed attempt and escalate with the restart hint when needed.
    fn reject(&self, state: &mut ConversationState, message: String) -> Reply {
        let attempts = state.record_failure();
        debug!(stage = %state.stage(), failed_attempts = attempts, "Input rejected");
        if attempts >= self.limits.escalate_after {
            Reply::text(message + &prompts::restart_hint())
        } else {
            Reply::text(message)
        }
    }
}

fn display_name(state: &ConversationState) -> &str {
    state.name().unwrap_or_default()
}
