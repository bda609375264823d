//! The marketing site's contact form: four declared fields, a simulated
//! backend and a success modal.

use std::sync::Arc;
use std::time::Duration;

use gpui::SharedString;

use crate::feedback::{ModalContent, SuccessModal};
use crate::form::{
    EventTable, FieldIssue, FormController, FormModel, FormOptions, SimulatedSubmission,
    SubmissionPort,
};

#[cfg(test)]
mod tests;

pub const SERVICE_OPTIONS: [&str; 5] = ["Design", "Development", "Branding", "Marketing", "Other"];

#[derive(Clone, Debug, Default, Eq, PartialEq, FormModel)]
pub struct ContactForm {
    #[field(required)]
    pub name: SharedString,
    #[field(email, required)]
    pub email: SharedString,
    #[field(select, required)]
    pub service: SharedString,
    #[field(multiline, required, min_len = 10)]
    pub message: SharedString,
}

pub type ContactController = FormController<ContactForm, FieldIssue>;
pub type ContactEvents = EventTable<ContactForm, FieldIssue>;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContactFormConfig {
    pub submit_delay: Duration,
    pub options: FormOptions,
    pub success: ModalContent,
    pub failure_title: SharedString,
    pub close_on_click_outside: bool,
}

impl Default for ContactFormConfig {
    fn default() -> Self {
        Self {
            submit_delay: SimulatedSubmission::DEFAULT_DELAY,
            options: FormOptions::default(),
            success: ModalContent::new(
                "Message sent!",
                "Thank you for reaching out. We'll get back to you within 24 hours.",
            ),
            failure_title: "Message not sent".into(),
            close_on_click_outside: true,
        }
    }
}

impl ContactFormConfig {
    pub fn submit_delay(mut self, value: Duration) -> Self {
        self.submit_delay = value;
        self
    }

    pub fn options(mut self, value: FormOptions) -> Self {
        self.options = value;
        self
    }

    pub fn success(mut self, value: ModalContent) -> Self {
        self.success = value;
        self
    }

    pub fn failure_title(mut self, value: impl Into<SharedString>) -> Self {
        self.failure_title = value.into();
        self
    }

    pub fn close_on_click_outside(mut self, value: bool) -> Self {
        self.close_on_click_outside = value;
        self
    }
}

/// Everything a page needs to drive one contact form: the controller, its
/// feedback modal and the event table wired between them.
#[derive(Clone)]
pub struct ContactFormHandle {
    controller: ContactController,
    modal: SuccessModal,
    events: ContactEvents,
}

impl ContactFormHandle {
    pub fn new(config: &ContactFormConfig) -> Self {
        Self::with_port(config, SimulatedSubmission::new(config.submit_delay))
    }

    pub fn with_port(
        config: &ContactFormConfig,
        port: impl SubmissionPort<ContactForm> + 'static,
    ) -> Self {
        let modal = SuccessModal::new(config.success.clone())
            .failure_title(config.failure_title.clone())
            .close_on_click_outside(config.close_on_click_outside);
        let controller = ContactController::new(ContactForm::default(), config.options, port)
            .with_feedback(Arc::new(modal.clone()));

        let fields = ContactForm::fields();
        let events = EventTable::new(controller.clone())
            .text_input(fields.name())
            .text_input(fields.email())
            .text_input(fields.service())
            .text_input(fields.message())
            .modal(modal.clone());

        Self {
            controller,
            modal,
            events,
        }
    }

    pub fn controller(&self) -> &ContactController {
        &self.controller
    }

    pub fn modal(&self) -> &SuccessModal {
        &self.modal
    }

    pub fn events(&self) -> &ContactEvents {
        &self.events
    }
}
