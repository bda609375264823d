use gpui::SharedString;

use super::controller::{FieldKey, FormController, FormResult, SubmitState, read_lock};
use super::rules::FieldIssue;
use super::validation::{FormModel, ValidationError};

/// What a field's inline error slot shows.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FieldDisplay {
    pub error: Option<SharedString>,
    pub highlighted: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SubmitContent {
    Label,
    Loading,
    Retry,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SubmitControl {
    pub disabled: bool,
    pub content: SubmitContent,
}

impl SubmitControl {
    pub fn for_state(state: SubmitState) -> Self {
        match state {
            SubmitState::Submitting => Self {
                disabled: true,
                content: SubmitContent::Loading,
            },
            SubmitState::Failed => Self {
                disabled: false,
                content: SubmitContent::Retry,
            },
            SubmitState::Idle | SubmitState::Validating | SubmitState::Succeeded => Self {
                disabled: false,
                content: SubmitContent::Label,
            },
        }
    }
}

impl<T, E> FormController<T, E>
where
    T: FormModel,
    E: ValidationError + From<FieldIssue>,
{
    pub fn field_display(&self, key: FieldKey) -> FormResult<FieldDisplay> {
        let error = self.display_error_message(key)?;
        Ok(FieldDisplay {
            highlighted: error.is_some(),
            error,
        })
    }

    pub fn submit_control(&self) -> FormResult<SubmitControl> {
        Ok(SubmitControl::for_state(self.submit_state()?))
    }

    /// Errors stay hidden until the field was blurred or a submit was tried.
    fn display_error_message(&self, key: FieldKey) -> FormResult<Option<SharedString>> {
        let state = read_lock(&self.state, "reading display error message")?;
        let Some(meta) = state.field_meta.get(&key) else {
            return Ok(None);
        };
        if !meta.touched && state.submit_count == 0 {
            return Ok(None);
        }
        Ok(meta.errors.first().map(ValidationError::message))
    }
}
