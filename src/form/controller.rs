use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use gpui::SharedString;
use log::{debug, info, warn};

use super::rules::FieldIssue;
use super::submission::{SubmissionError, SubmissionPort, SubmissionResponse};
use super::validation::{FormModel, ValidationError};
use crate::feedback::FeedbackChannel;

static FORM_ID_ALLOCATOR: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FormId(pub u64);

impl FormId {
    pub fn next() -> Self {
        Self(FORM_ID_ALLOCATOR.fetch_add(1, Ordering::SeqCst))
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FieldKey(&'static str);

impl FieldKey {
    pub const fn new(value: &'static str) -> Self {
        Self(value)
    }

    pub const fn as_str(self) -> &'static str {
        self.0
    }
}

impl Display for FieldKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct SubmissionTicket(pub u64);

impl SubmissionTicket {
    fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SubmitState {
    Idle,
    Validating,
    Submitting,
    Succeeded,
    Failed,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SubmitOutcome {
    /// Validation failed; errors are visible and nothing was sent.
    Invalid,
    Succeeded,
    Failed(SharedString),
    /// The submission was cancelled while in flight and its completion dropped.
    Cancelled,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValidationMode {
    OnChange,
    OnBlur,
    OnSubmit,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FormOptions {
    pub validate_mode: ValidationMode,
    pub clear_error_on_input: bool,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            validate_mode: ValidationMode::OnBlur,
            clear_error_on_input: true,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldMeta<E> {
    pub dirty: bool,
    pub touched: bool,
    pub errors: Vec<E>,
}

impl<E> Default for FieldMeta<E> {
    fn default() -> Self {
        Self {
            dirty: false,
            touched: false,
            errors: Vec::new(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct FormSnapshot<T, E> {
    pub id: FormId,
    pub model: T,
    pub submit_state: SubmitState,
    pub submit_count: u32,
    pub is_dirty: bool,
    pub is_valid: bool,
    pub failure: Option<SharedString>,
    pub field_meta: BTreeMap<FieldKey, FieldMeta<E>>,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum FormError {
    StatePoisoned(&'static str),
    InvalidStateTransition { from: SubmitState, to: SubmitState },
    AlreadySubmitting,
    UnknownField(FieldKey),
}

impl Display for FormError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FormError::StatePoisoned(context) => {
                write!(f, "form state lock poisoned while {context}")
            }
            FormError::InvalidStateTransition { from, to } => {
                write!(f, "invalid submit state transition: {from:?} -> {to:?}")
            }
            FormError::AlreadySubmitting => f.write_str("form submit is already in progress"),
            FormError::UnknownField(key) => write!(f, "form has no field named `{key}`"),
        }
    }
}

impl std::error::Error for FormError {}

pub type FormResult<T> = Result<T, FormError>;

pub(super) type SyncFieldValidatorFn<T, E> = Arc<dyn Fn(&T) -> Result<(), E> + Send + Sync>;

pub(super) struct FormState<T, E> {
    pub(super) id: FormId,
    pub(super) initial_model: T,
    pub(super) model: T,
    pub(super) submit_state: SubmitState,
    pub(super) submit_count: u32,
    pub(super) ticket: SubmissionTicket,
    pub(super) failure: Option<SharedString>,
    pub(super) dirty_fields: BTreeSet<FieldKey>,
    pub(super) field_meta: BTreeMap<FieldKey, FieldMeta<E>>,
    pub(super) first_error: Option<FieldKey>,
}

impl<T, E> FormState<T, E> {
    pub(super) fn ensure_meta(&mut self, key: FieldKey) -> &mut FieldMeta<E> {
        self.field_meta.entry(key).or_default()
    }

    fn clear_field_state(&mut self) {
        self.dirty_fields.clear();
        self.first_error = None;
        for meta in self.field_meta.values_mut() {
            meta.dirty = false;
            meta.touched = false;
            meta.errors.clear();
        }
    }
}

/// Owns one form instance: its model, per-field error slots and the submit
/// lifecycle. Cloning yields another handle to the same form.
#[derive(Clone)]
pub struct FormController<T, E>
where
    T: FormModel,
    E: ValidationError + From<FieldIssue>,
{
    pub(super) options: FormOptions,
    pub(super) state: Arc<RwLock<FormState<T, E>>>,
    pub(super) field_validators: Arc<RwLock<BTreeMap<FieldKey, Vec<SyncFieldValidatorFn<T, E>>>>>,
    port: Arc<dyn SubmissionPort<T>>,
    feedback: Option<Arc<dyn FeedbackChannel>>,
}

impl<T, E> FormController<T, E>
where
    T: FormModel,
    E: ValidationError + From<FieldIssue>,
{
    pub fn new(initial: T, options: FormOptions, port: impl SubmissionPort<T> + 'static) -> Self {
        Self {
            options,
            state: Arc::new(RwLock::new(FormState {
                id: FormId::next(),
                initial_model: initial.clone(),
                model: initial,
                submit_state: SubmitState::Idle,
                submit_count: 0,
                ticket: SubmissionTicket::default(),
                failure: None,
                dirty_fields: BTreeSet::new(),
                field_meta: BTreeMap::new(),
                first_error: None,
            })),
            field_validators: Arc::new(RwLock::new(BTreeMap::new())),
            port: Arc::new(port),
            feedback: None,
        }
    }

    /// Routes terminal outcomes to `channel`. The channel stays owned by the
    /// caller; the controller only keeps a shared handle.
    pub fn with_feedback(mut self, channel: Arc<dyn FeedbackChannel>) -> Self {
        self.feedback = Some(channel);
        self
    }

    pub fn options(&self) -> FormOptions {
        self.options
    }

    pub fn submit_state(&self) -> FormResult<SubmitState> {
        Ok(read_lock(&self.state, "reading submit state")?.submit_state)
    }

    pub fn is_required(&self, key: FieldKey) -> bool {
        T::field_specs()
            .iter()
            .any(|spec| spec.key == key && spec.required)
    }

    pub async fn submit(&self) -> FormResult<SubmitOutcome> {
        {
            let mut state = write_lock(&self.state, "preparing submit")?;
            if state.submit_state == SubmitState::Submitting {
                return Err(FormError::AlreadySubmitting);
            }
            transition_submit_state(&mut state, SubmitState::Validating)?;
            state.submit_count = state.submit_count.saturating_add(1);
            state.failure = None;
        }

        if !self.validate_form()? {
            let mut state = write_lock(&self.state, "handling submit validation failure")?;
            transition_submit_state(&mut state, SubmitState::Idle)?;
            debug!(
                "form {:?} rejected submit: first invalid field {:?}",
                state.id, state.first_error
            );
            return Ok(SubmitOutcome::Invalid);
        }

        let (ticket, model) = {
            let mut state = write_lock(&self.state, "moving submit state to submitting")?;
            transition_submit_state(&mut state, SubmitState::Submitting)?;
            state.ticket = state.ticket.next();
            (state.ticket, state.model.clone())
        };

        let _in_flight = InFlightSubmission {
            state: &self.state,
            ticket,
        };
        let result = self.port.submit(model).await;
        self.finish_submission(ticket, result)
    }

    /// Abandons the in-flight submission, if any. Its completion is ignored
    /// when it eventually resolves.
    pub fn cancel_submission(&self) -> FormResult<bool> {
        let mut state = write_lock(&self.state, "cancelling submit")?;
        if state.submit_state != SubmitState::Submitting {
            return Ok(false);
        }
        state.ticket = state.ticket.next();
        transition_submit_state(&mut state, SubmitState::Idle)?;
        info!("form {:?} cancelled its in-flight submission", state.id);
        Ok(true)
    }

    fn finish_submission(
        &self,
        ticket: SubmissionTicket,
        result: Result<SubmissionResponse, SubmissionError>,
    ) -> FormResult<SubmitOutcome> {
        let outcome = {
            let mut state = write_lock(&self.state, "completing submit")?;
            if state.ticket != ticket || state.submit_state != SubmitState::Submitting {
                warn!(
                    "form {:?} dropped completion of stale submission {ticket:?}",
                    state.id
                );
                return Ok(SubmitOutcome::Cancelled);
            }

            match result.and_then(SubmissionResponse::into_result) {
                Ok(()) => {
                    transition_submit_state(&mut state, SubmitState::Succeeded)?;
                    state.model = state.initial_model.clone();
                    state.clear_field_state();
                    info!("form {:?} submitted successfully", state.id);
                    SubmitOutcome::Succeeded
                }
                Err(error) => {
                    transition_submit_state(&mut state, SubmitState::Failed)?;
                    let message = SharedString::from(error.to_string());
                    state.failure = Some(message.clone());
                    warn!("form {:?} submission failed: {error}", state.id);
                    SubmitOutcome::Failed(message)
                }
            }
        };

        if let Some(feedback) = self.feedback.as_ref() {
            match &outcome {
                SubmitOutcome::Succeeded => feedback.show_success(),
                SubmitOutcome::Failed(message) => feedback.show_failure(message.clone()),
                SubmitOutcome::Invalid | SubmitOutcome::Cancelled => {}
            }
        }
        Ok(outcome)
    }

    pub fn reset_to_initial(&self) -> FormResult<()> {
        let mut state = write_lock(&self.state, "resetting form")?;
        if state.submit_state == SubmitState::Submitting {
            state.ticket = state.ticket.next();
        }
        state.model = state.initial_model.clone();
        state.submit_state = SubmitState::Idle;
        state.failure = None;
        state.clear_field_state();
        Ok(())
    }

    pub fn clear_errors(&self) -> FormResult<()> {
        let mut state = write_lock(&self.state, "clearing all field errors")?;
        for meta in state.field_meta.values_mut() {
            meta.errors.clear();
        }
        state.first_error = None;
        Ok(())
    }

    pub fn clear_field_errors(&self, key: FieldKey) -> FormResult<()> {
        let mut state = write_lock(&self.state, "clearing field errors")?;
        if let Some(meta) = state.field_meta.get_mut(&key) {
            meta.errors.clear();
        }
        state.first_error = first_declared_error(&state);
        Ok(())
    }

    pub fn snapshot(&self) -> FormResult<FormSnapshot<T, E>> {
        let state = read_lock(&self.state, "creating form snapshot")?;
        let is_valid = state.field_meta.values().all(|meta| meta.errors.is_empty());
        Ok(FormSnapshot {
            id: state.id,
            model: state.model.clone(),
            submit_state: state.submit_state,
            submit_count: state.submit_count,
            is_dirty: !state.dirty_fields.is_empty(),
            is_valid,
            failure: state.failure.clone(),
            field_meta: state.field_meta.clone(),
        })
    }

    pub fn field_meta(&self, key: FieldKey) -> FormResult<Option<FieldMeta<E>>> {
        Ok(read_lock(&self.state, "reading field meta")?
            .field_meta
            .get(&key)
            .cloned())
    }

    pub fn first_error(&self) -> FormResult<Option<FieldKey>> {
        Ok(read_lock(&self.state, "reading first error key")?.first_error)
    }

    pub fn failure_message(&self) -> FormResult<Option<SharedString>> {
        Ok(read_lock(&self.state, "reading failure message")?
            .failure
            .clone())
    }
}

/// Returns the form to `Idle` when a submit future is dropped while its
/// submission is still the current one.
struct InFlightSubmission<'a, T, E> {
    state: &'a RwLock<FormState<T, E>>,
    ticket: SubmissionTicket,
}

impl<T, E> Drop for InFlightSubmission<'_, T, E> {
    fn drop(&mut self) {
        let mut state = match self.state.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if state.ticket != self.ticket || state.submit_state != SubmitState::Submitting {
            return;
        }
        state.ticket = state.ticket.next();
        state.submit_state = SubmitState::Idle;
        warn!(
            "form {:?} abandoned submission {:?} before it completed",
            state.id, self.ticket
        );
    }
}

pub(super) fn transition_submit_state<T, E>(
    state: &mut FormState<T, E>,
    next: SubmitState,
) -> FormResult<()> {
    let current = state.submit_state;
    if current == next {
        return Ok(());
    }

    let allowed = matches!(
        (current, next),
        (SubmitState::Idle, SubmitState::Validating)
            | (SubmitState::Validating, SubmitState::Submitting)
            | (SubmitState::Submitting, SubmitState::Succeeded)
            | (SubmitState::Submitting, SubmitState::Failed)
            | (SubmitState::Succeeded, SubmitState::Validating)
            | (SubmitState::Failed, SubmitState::Validating)
            | (_, SubmitState::Idle)
    );
    if !allowed {
        return Err(FormError::InvalidStateTransition {
            from: current,
            to: next,
        });
    }
    debug!("form {:?} submit state {current:?} -> {next:?}", state.id);
    state.submit_state = next;
    Ok(())
}

/// First field holding an error, in declaration order. Fields outside the
/// declared set follow in key order.
pub(super) fn first_declared_error<T, E>(state: &FormState<T, E>) -> Option<FieldKey>
where
    T: FormModel,
{
    let has_error = |key: &FieldKey| {
        state
            .field_meta
            .get(key)
            .is_some_and(|meta| !meta.errors.is_empty())
    };
    T::field_specs()
        .iter()
        .map(|spec| spec.key)
        .find(|key| has_error(key))
        .or_else(|| state.field_meta.keys().copied().find(|key| has_error(key)))
}

pub(super) fn read_lock<'a, T>(
    lock: &'a RwLock<T>,
    context: &'static str,
) -> FormResult<RwLockReadGuard<'a, T>> {
    lock.read().map_err(|_| FormError::StatePoisoned(context))
}

pub(super) fn write_lock<'a, T>(
    lock: &'a RwLock<T>,
    context: &'static str,
) -> FormResult<RwLockWriteGuard<'a, T>> {
    lock.write().map_err(|_| FormError::StatePoisoned(context))
}
