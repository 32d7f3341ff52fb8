use crate::{
    data::student::{Gender, Student, StudentFields, StudentUpdate},
    page::{ERROR_TITLE, FormKey, Roster, SessionToken},
};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(Student),
}

/// Raw field values as typed into the drawer. The id of an edited student comes from the session.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftFields {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub gender: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

impl DraftFields {
    pub fn from_student(student: &Student) -> Self {
        Self {
            name: student.name.clone(),
            email: student.email.clone(),
            gender: student.gender.as_str().to_string(),
        }
    }

    pub fn validate(&self) -> Result<StudentFields, Vec<FieldError>> {
        let mut errors = vec![];

        let name = self.name.trim();
        if name.is_empty() {
            errors.push(FieldError {
                field: "name",
                message: "Please enter student name",
            });
        }

        let email = self.email.trim();
        if email.is_empty() {
            errors.push(FieldError {
                field: "email",
                message: "Please enter student email",
            });
        }

        let gender = self.gender.parse::<Gender>().ok();
        if gender.is_none() {
            errors.push(FieldError {
                field: "gender",
                message: "Please select a gender",
            });
        }

        match gender {
            Some(gender) if errors.is_empty() => Ok(StudentFields {
                name: name.to_string(),
                email: email.to_string(),
                gender,
            }),
            _ => Err(errors),
        }
    }
}

/// One open drawer: either a blank draft or an existing student being edited.
#[derive(Debug, Clone)]
pub struct FormSession {
    pub token: SessionToken,
    pub mode: FormMode,
    pub fields: DraftFields,
    pub field_errors: Vec<FieldError>,
    pub submitting: bool,
}

impl FormSession {
    pub(crate) fn create(token: SessionToken) -> Self {
        Self {
            token,
            mode: FormMode::Create,
            fields: DraftFields::default(),
            field_errors: vec![],
            submitting: false,
        }
    }

    pub(crate) fn edit(token: SessionToken, student: Student) -> Self {
        Self {
            token,
            fields: DraftFields::from_student(&student),
            mode: FormMode::Edit(student),
            field_errors: vec![],
            submitting: false,
        }
    }

    pub fn key(&self) -> FormKey {
        match &self.mode {
            FormMode::Create => FormKey::Create,
            FormMode::Edit(student) => FormKey::Edit(student.id),
        }
    }

    pub fn title(&self) -> &'static str {
        match self.mode {
            FormMode::Create => "Create new student",
            FormMode::Edit(_) => "Edit student",
        }
    }

    pub fn error_for(&self, field: &str) -> Option<&'static str> {
        self.field_errors
            .iter()
            .find(|error| error.field == field)
            .map(|error| error.message)
    }
}

pub const STALE_FORM_MESSAGE: &str = "This form was closed before it could be saved";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The session this submission was for has been closed or replaced.
    Stale,
    Invalid,
    Saved,
    Failed,
}

impl Roster {
    /// Success runs notify, reset fields, refresh, close in that order. Failure keeps the
    /// session open with everything the user typed.
    pub async fn submit(&self, token: SessionToken, draft: DraftFields) -> SubmitOutcome {
        let (mode, fields) = {
            let mut state = self.state.lock().await;
            let Some(session) = state.form_for(token) else {
                warn!(?token, "Submission for a closed form");
                self.sink.error(ERROR_TITLE, STALE_FORM_MESSAGE);
                return SubmitOutcome::Stale;
            };

            session.fields = draft;
            match session.fields.validate() {
                Ok(fields) => {
                    session.field_errors.clear();
                    session.submitting = true;
                    (session.mode.clone(), fields)
                }
                Err(errors) => {
                    debug!(?errors, "Form failed validation");
                    session.field_errors = errors;
                    return SubmitOutcome::Invalid;
                }
            }
        };

        let name = fields.name.clone();
        let (result, title, body) = match mode {
            FormMode::Create => (
                self.store.create(fields).await,
                "Student successfully added",
                format!("{name} was added to the system"),
            ),
            FormMode::Edit(student) => (
                self.store
                    .update(StudentUpdate {
                        id: student.id,
                        fields,
                    })
                    .await,
                "Student successfully updated",
                format!("{name} was updated in the system"),
            ),
        };

        match result {
            Ok(()) => {
                self.sink.success(title, &body);
                {
                    let mut state = self.state.lock().await;
                    if let Some(session) = state.form_for(token) {
                        session.fields = DraftFields::default();
                        session.submitting = false;
                    }
                }
                self.refresh().await;
                self.close_session(token).await;
                SubmitOutcome::Saved
            }
            Err(e) => {
                error!(?e, "Error saving student");
                {
                    let mut state = self.state.lock().await;
                    if let Some(session) = state.form_for(token) {
                        session.submitting = false;
                    }
                }
                self.sink.error(ERROR_TITLE, &e.notification_detail());
                SubmitOutcome::Failed
            }
        }
    }

    /// Hides the drawer and forgets any staged record, so the next create starts blank.
    pub async fn close(&self) {
        self.state.lock().await.form = None;
    }

    async fn close_session(&self, token: SessionToken) {
        let mut state = self.state.lock().await;
        if state.form_for(token).is_some() {
            state.form = None;
        }
    }
}
