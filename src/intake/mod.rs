//! Intake conversation — collects name, age, sex, weight and height one turn
//! at a time, then classifies the child's BMI.
//!
//! The state machine is pure with respect to conversation state: callers own
//! a [`ConversationState`] per session and pass it into every
//! [`IntakeMachine::process`] call.

pub mod extract;
pub mod machine;
pub mod normalize;
pub mod prompts;
pub mod state;

pub use extract::extract_number;
pub use machine::{IntakeMachine, Reply};
pub use normalize::{is_restart_command, normalize};
pub use prompts::{FixedChooser, PromptChooser, RandomChooser};
pub use state::{ConversationState, IntakeStage, Sex, SlotValue};
