mod controller;
mod display;
mod events;
mod rules;
mod submission;
mod validation;


pub use contactform_derive::FormModel;
pub use controller::{
    FieldKey, FieldMeta, FormController, FormError, FormId, FormOptions, FormResult, FormSnapshot,
    SubmissionTicket, SubmitOutcome, SubmitState, ValidationMode,
};
pub use display::{FieldDisplay, SubmitContent, SubmitControl};
pub use events::{Dispatched, EventTable, FormEvent};
pub use rules::{FieldIssue, FieldKind, FieldSpec, ValidationResult, evaluate, is_valid_email};
pub use submission::{
    SimulatedSubmission, SubmissionError, SubmissionFuture, SubmissionPort, SubmissionResponse,
};
pub use validation::{FieldLens, FieldValidator, FormModel, ValidationError};
