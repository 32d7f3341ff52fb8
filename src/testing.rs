//! In-memory doubles for the record store and the notification sink.

use crate::{
    data::student::{
        ApiErrorBody, FieldViolation, Gender, Student, StudentFields, StudentId, StudentUpdate,
    },
    error::{MalformedRejectionSnafu, RejectedSnafu, RosterResult},
    notify::{Notification, NotificationSink},
    store::RecordStore,
};
use async_trait::async_trait;
use axum::http::StatusCode;
use std::sync::Mutex;
use tokio::sync::oneshot;

pub fn student(id: i64, name: &str, gender: Gender) -> Student {
    Student {
        id: StudentId(id),
        name: name.to_string(),
        email: format!("{}@x.com", name.to_lowercase().replace(' ', ".")),
        gender,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List,
    Create(StudentFields),
    Update(StudentUpdate),
    Delete(StudentId),
}

pub enum Failure {
    Rejected(ApiErrorBody),
    Unreadable,
}

impl Failure {
    pub fn rejected(message: &str, errors: &[&str]) -> Self {
        Self::Rejected(ApiErrorBody {
            message: message.to_string(),
            errors: (!errors.is_empty()).then(|| {
                errors
                    .iter()
                    .map(|m| FieldViolation {
                        default_message: (*m).to_string(),
                    })
                    .collect()
            }),
        })
    }
}

#[derive(Default)]
pub struct MemoryStore {
    students: Mutex<Vec<Student>>,
    calls: Mutex<Vec<Call>>,
    failure: Mutex<Option<Failure>>,
    held_list: Mutex<Option<oneshot::Receiver<Vec<Student>>>>,
    held_mutation: Mutex<Option<oneshot::Receiver<()>>>,
}

impl MemoryStore {
    pub fn with(students: Vec<Student>) -> Self {
        Self {
            students: Mutex::new(students),
            ..Self::default()
        }
    }

    pub fn snapshot(&self) -> Vec<Student> {
        self.students.lock().unwrap().clone()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// The next call of any kind fails with `failure`.
    pub fn fail_next(&self, failure: Failure) {
        *self.failure.lock().unwrap() = Some(failure);
    }

    /// The next `list` waits for, and then returns, whatever is sent on the returned channel.
    pub fn hold_next_list(&self) -> oneshot::Sender<Vec<Student>> {
        let (tx, rx) = oneshot::channel();
        *self.held_list.lock().unwrap() = Some(rx);
        tx
    }

    /// The next create or update waits until the returned channel fires.
    pub fn hold_next_mutation(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.held_mutation.lock().unwrap() = Some(rx);
        tx
    }

    pub async fn wait_for_calls(&self, count: usize) {
        while self.calls.lock().unwrap().len() < count {
            tokio::task::yield_now().await;
        }
    }

    fn record(&self, call: Call) -> RosterResult<()> {
        self.calls.lock().unwrap().push(call);

        match self.failure.lock().unwrap().take() {
            Some(Failure::Rejected(body)) => RejectedSnafu {
                status: StatusCode::BAD_REQUEST,
                body,
            }
            .fail(),
            Some(Failure::Unreadable) => MalformedRejectionSnafu {
                status: StatusCode::INTERNAL_SERVER_ERROR,
            }
            .fail(),
            None => Ok(()),
        }
    }

    async fn wait_if_mutation_held(&self) {
        let held = self.held_mutation.lock().unwrap().take();
        if let Some(rx) = held {
            let _ = rx.await;
        }
    }

    fn missing(id: StudentId) -> RosterResult<()> {
        RejectedSnafu {
            status: StatusCode::NOT_FOUND,
            body: ApiErrorBody {
                message: format!("Student with id {id} does not exist"),
                errors: None,
            },
        }
        .fail()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn list(&self) -> RosterResult<Vec<Student>> {
        self.record(Call::List)?;

        let held = self.held_list.lock().unwrap().take();
        if let Some(rx) = held {
            return Ok(rx.await.unwrap_or_default());
        }
        Ok(self.snapshot())
    }

    async fn create(&self, fields: StudentFields) -> RosterResult<()> {
        self.record(Call::Create(fields.clone()))?;
        self.wait_if_mutation_held().await;

        let mut students = self.students.lock().unwrap();
        let id = students.iter().map(|s| s.id.0).max().unwrap_or(0) + 1;
        students.push(Student {
            id: StudentId(id),
            name: fields.name,
            email: fields.email,
            gender: fields.gender,
        });
        Ok(())
    }

    async fn update(&self, update: StudentUpdate) -> RosterResult<()> {
        self.record(Call::Update(update.clone()))?;
        self.wait_if_mutation_held().await;

        let mut students = self.students.lock().unwrap();
        let Some(existing) = students.iter_mut().find(|s| s.id == update.id) else {
            return Self::missing(update.id);
        };
        existing.name = update.fields.name;
        existing.email = update.fields.email;
        existing.gender = update.fields.gender;
        Ok(())
    }

    async fn delete(&self, id: StudentId) -> RosterResult<()> {
        self.record(Call::Delete(id))?;

        let mut students = self.students.lock().unwrap();
        let before = students.len();
        students.retain(|s| s.id != id);
        if students.len() == before {
            return Self::missing(id);
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingSink {
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingSink {
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().unwrap().clone()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, notification: Notification) {
        self.notifications.lock().unwrap().push(notification);
    }
}
