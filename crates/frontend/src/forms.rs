//! Form state shared by the login, register and profile views
//!
//! Every form moves `Idle -> Submitting -> (Success | Failed)` and drops
//! back to `Idle` as soon as the user edits a field.

use portal_http::{ClientError, FieldErrors};
use std::collections::BTreeMap;
use std::rc::Rc;
use yew::Reducible;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FormStatus {
    #[default]
    Idle,
    Submitting,
    Success,
    Failed,
}

/// What a failed submission shows: messages per field plus a banner
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormFailure {
    pub fields: FieldErrors,
    pub general: Option<String>,
}

impl From<&ClientError> for FormFailure {
    fn from(error: &ClientError) -> Self {
        let ClientError::Validation(errors) = error else {
            return Self {
                fields: FieldErrors::new(),
                general: Some(error.user_message()),
            };
        };

        let general = errors.general();
        let general = if general.is_empty() {
            None
        } else {
            Some(general.join(" "))
        };

        let mut fields = errors.clone();
        for key in ["non_field_errors", "detail", "error"] {
            fields.remove(key);
        }

        Self { fields, general }
    }
}

/// Form field values, their errors and the submission status
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormState {
    values: BTreeMap<String, String>,
    errors: FieldErrors,
    general_error: Option<String>,
    status: FormStatus,
    /// Bumped each time a submission is accepted
    submission: u32,
}

pub enum FormAction {
    Edit { field: String, value: String },
    Submit,
    Succeeded,
    Failed(FormFailure),
    /// Replace all values, e.g. when entering edit mode
    Reset(Vec<(String, String)>),
}

impl FormState {
    /// Form with the given fields, all empty
    pub fn new(fields: &[&str]) -> Self {
        Self {
            values: fields
                .iter()
                .map(|field| ((*field).to_string(), String::new()))
                .collect(),
            ..Self::default()
        }
    }

    pub fn value(&self, field: &str) -> &str {
        self.values.get(field).map_or("", String::as_str)
    }

    pub fn errors_for(&self, field: &str) -> Vec<String> {
        self.errors.get(field).to_vec()
    }

    pub fn general_error(&self) -> Option<&str> {
        self.general_error.as_deref()
    }

    pub fn status(&self) -> FormStatus {
        self.status
    }

    pub fn is_submitting(&self) -> bool {
        self.status == FormStatus::Submitting
    }

    /// Number of accepted submissions; views send a request when it changes
    pub fn submission(&self) -> u32 {
        self.submission
    }

    /// Apply `action`; `false` when it was rejected
    pub fn apply(&mut self, action: FormAction) -> bool {
        match action {
            FormAction::Edit { field, value } => self.edit(field, value),
            FormAction::Submit => self.begin_submit(),
            FormAction::Succeeded => {
                let accepted = self.is_submitting();
                if accepted {
                    self.status = FormStatus::Success;
                }
                accepted
            }
            FormAction::Failed(failure) => self.fail(failure),
            FormAction::Reset(values) => {
                self.values = values.into_iter().collect();
                self.errors = FieldErrors::new();
                self.general_error = None;
                self.status = FormStatus::Idle;
                true
            }
        }
    }

    fn edit(&mut self, field: String, value: String) -> bool {
        // Inputs are disabled while a request is in flight
        if self.is_submitting() {
            return false;
        }
        self.errors.remove(&field);
        self.general_error = None;
        self.status = FormStatus::Idle;
        self.values.insert(field, value);
        true
    }

    /// Start a submission; `false` if one is already running
    fn begin_submit(&mut self) -> bool {
        if self.is_submitting() {
            return false;
        }
        self.errors = FieldErrors::new();
        self.general_error = None;
        self.status = FormStatus::Submitting;
        self.submission = self.submission.wrapping_add(1);
        true
    }

    fn fail(&mut self, failure: FormFailure) -> bool {
        let mut fields = FieldErrors::new();
        let mut unplaced = Vec::new();

        // Errors for fields this form does not render go to the banner
        for (field, messages) in failure.fields.iter() {
            for message in messages {
                if self.values.contains_key(field) {
                    fields.add(field, message.clone());
                } else {
                    unplaced.push(message.clone());
                }
            }
        }

        let general = failure.general.into_iter().chain(unplaced).collect::<Vec<_>>();

        self.errors = fields;
        self.general_error = if general.is_empty() {
            None
        } else {
            Some(general.join(" "))
        };
        self.status = FormStatus::Failed;
        true
    }
}

impl Reducible for FormState {
    type Action = FormAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut next = (*self).clone();
        if next.apply(action) {
            Rc::new(next)
        } else {
            self
        }
    }
}
