use std::collections::BTreeMap;
use std::sync::Arc;

use gpui::SharedString;

use super::controller::{FieldKey, FormController, FormError, FormResult, SubmitOutcome};
use super::rules::FieldIssue;
use super::validation::{FieldLens, FormModel, ValidationError};
use crate::feedback::{ClickTarget, ModalCloseReason, SuccessModal};

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FormEvent {
    Submit,
    Input { field: FieldKey, value: SharedString },
    Blur { field: FieldKey },
    CloseFeedback(ModalCloseReason),
    Click(ClickTarget),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Dispatched {
    Handled,
    Submitted(SubmitOutcome),
    /// The event had no effect, e.g. closing an already closed modal.
    Ignored,
}

type InputHandler<T, E> =
    Arc<dyn Fn(&FormController<T, E>, SharedString) -> FormResult<()> + Send + Sync>;

/// Event-to-handler table for one form, built once when the page is wired.
#[derive(Clone)]
pub struct EventTable<T, E>
where
    T: FormModel,
    E: ValidationError + From<FieldIssue>,
{
    controller: FormController<T, E>,
    inputs: BTreeMap<FieldKey, InputHandler<T, E>>,
    modal: Option<SuccessModal>,
}

impl<T, E> EventTable<T, E>
where
    T: FormModel,
    E: ValidationError + From<FieldIssue>,
{
    pub fn new(controller: FormController<T, E>) -> Self {
        Self {
            controller,
            inputs: BTreeMap::new(),
            modal: None,
        }
    }

    pub fn text_input<L>(mut self, lens: L) -> Self
    where
        L: FieldLens<T, Value = SharedString>,
    {
        let handler: InputHandler<T, E> =
            Arc::new(move |controller: &FormController<T, E>, value: SharedString| {
                controller.input(lens, value)
            });
        self.inputs.insert(lens.key(), handler);
        self
    }

    pub fn modal(mut self, modal: SuccessModal) -> Self {
        self.modal = Some(modal);
        self
    }

    pub fn controller(&self) -> &FormController<T, E> {
        &self.controller
    }

    pub fn handles(&self, field: FieldKey) -> bool {
        self.inputs.contains_key(&field)
    }

    /// Synchronous half of [`FormEvent::Input`], for key handlers.
    pub fn input(&self, field: FieldKey, value: SharedString) -> FormResult<()> {
        let handler = self
            .inputs
            .get(&field)
            .ok_or(FormError::UnknownField(field))?;
        handler(&self.controller, value)
    }

    pub fn blur(&self, field: FieldKey) -> FormResult<()> {
        if !self.handles(field) {
            return Err(FormError::UnknownField(field));
        }
        self.controller.blur(field)
    }

    pub async fn dispatch(&self, event: FormEvent) -> FormResult<Dispatched> {
        match event {
            FormEvent::Submit => Ok(Dispatched::Submitted(self.controller.submit().await?)),
            FormEvent::Input { field, value } => {
                self.input(field, value)?;
                Ok(Dispatched::Handled)
            }
            FormEvent::Blur { field } => {
                self.blur(field)?;
                Ok(Dispatched::Handled)
            }
            FormEvent::CloseFeedback(reason) => Ok(self.with_modal(|modal| modal.close(reason))),
            FormEvent::Click(target) => Ok(self.with_modal(|modal| modal.click(target))),
        }
    }

    fn with_modal(&self, f: impl FnOnce(&SuccessModal) -> bool) -> Dispatched {
        match self.modal.as_ref() {
            Some(modal) if f(modal) => Dispatched::Handled,
            _ => Dispatched::Ignored,
        }
    }
}
