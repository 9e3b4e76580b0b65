use std::fmt;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ServiceError;

/// Record category; each kind has its own keyspace.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Student,
    Teacher,
}

impl Kind {
    /// Lowercase singular, used in routes, metrics and log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Student => "student",
            Kind::Teacher => "teacher",
        }
    }

    /// Capitalized label used in user-facing messages.
    pub fn label(&self) -> &'static str {
        match self {
            Kind::Student => "Student",
            Kind::Teacher => "Teacher",
        }
    }

    /// Collection segment of the HTTP path and the table name.
    pub fn plural(&self) -> &'static str {
        match self {
            Kind::Student => "students",
            Kind::Teacher => "teachers",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.label()) }
}

/// Mutable fields of one record kind. Everything except `id`.
pub trait RecordFields:
    Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    const KIND: Kind;

    fn email(&self) -> &str;

    /// Shape rules beyond what deserialization already guarantees.
    fn validate(&self) -> Result<(), ServiceError>;
}

/// A stored record: server-assigned id plus the kind's fields.
///
/// Serializes flat, e.g. `{"id": "...", "name": "Ana", "age": 20, ...}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Record<F> {
    pub id: String,
    #[serde(flatten)]
    pub fields: F,
}

impl<F: RecordFields> Record<F> {
    /// Wrap fields under a fresh random (UUID v4) id.
    pub fn new(fields: F) -> Self {
        Self { id: Uuid::new_v4().to_string(), fields }
    }

    /// Same id, every mutable field taken from `fields`.
    pub fn with_fields_replaced(&self, fields: F) -> Self {
        Self { id: self.id.clone(), fields }
    }

    pub fn email(&self) -> &str { self.fields.email() }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub name: String,
    pub age: u32,
    pub email: String,
    pub gpa: f64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    pub name: String,
    pub age: u32,
    pub email: String,
    pub subject: String,
}

pub type StudentRecord = Record<Student>;
pub type TeacherRecord = Record<Teacher>;

fn validate_person(name: &str, email: &str) -> Result<(), ServiceError> {
    if name.trim().is_empty() {
        return Err(ServiceError::validation("name must not be empty"));
    }
    // stored verbatim; uniqueness compares exact strings
    if email.trim() != email {
        return Err(ServiceError::validation("email must not have surrounding whitespace"));
    }
    if email.is_empty() || !email.contains('@') {
        return Err(ServiceError::validation("email must be a valid address"));
    }
    Ok(())
}

impl RecordFields for Student {
    const KIND: Kind = Kind::Student;

    fn email(&self) -> &str { &self.email }

    fn validate(&self) -> Result<(), ServiceError> {
        validate_person(&self.name, &self.email)?;
        if !self.gpa.is_finite() || self.gpa < 0.0 {
            return Err(ServiceError::validation("gpa must be a non-negative number"));
        }
        Ok(())
    }
}

impl RecordFields for Teacher {
    const KIND: Kind = Kind::Teacher;

    fn email(&self) -> &str { &self.email }

    fn validate(&self) -> Result<(), ServiceError> {
        validate_person(&self.name, &self.email)?;
        if self.subject.trim().is_empty() {
            return Err(ServiceError::validation("subject must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ana() -> Student {
        Student { name: "Ana".into(), age: 20, email: "a@x.com".into(), gpa: 3.9 }
    }

    #[test]
    fn record_serializes_flat() {
        let rec = Record { id: "abc".to_string(), fields: ana() };
        let v = serde_json::to_value(&rec).unwrap();
        assert_eq!(v, json!({"id": "abc", "name": "Ana", "age": 20, "email": "a@x.com", "gpa": 3.9}));
    }

    #[test]
    fn caller_supplied_id_is_ignored_by_fields() {
        let body = json!({"id": "mine", "name": "Ana", "age": 20, "email": "a@x.com", "gpa": 3.9});
        let fields: Student = serde_json::from_value(body).unwrap();
        let rec = Record::new(fields);
        assert_ne!(rec.id, "mine");
        assert!(Uuid::parse_str(&rec.id).is_ok());
    }

    #[test]
    fn negative_age_does_not_deserialize() {
        let body = json!({"name": "Ana", "age": -1, "email": "a@x.com", "gpa": 3.9});
        assert!(serde_json::from_value::<Student>(body).is_err());
    }

    #[test]
    fn with_fields_replaced_keeps_id() {
        let rec = Record::new(ana());
        let next = rec.with_fields_replaced(Student { age: 21, gpa: 3.95, ..ana() });
        assert_eq!(next.id, rec.id);
        assert_eq!(next.fields.age, 21);
        // original untouched
        assert_eq!(rec.fields.age, 20);
    }

    #[test]
    fn validation_rules() {
        assert!(ana().validate().is_ok());
        assert!(Student { name: "  ".into(), ..ana() }.validate().is_err());
        assert!(Student { email: "nope".into(), ..ana() }.validate().is_err());
        assert!(Student { email: "a@x.com ".into(), ..ana() }.validate().is_err());
        assert!(Student { email: " a@x.com".into(), ..ana() }.validate().is_err());
        assert!(Student { gpa: f64::NAN, ..ana() }.validate().is_err());
        assert!(Student { gpa: -0.5, ..ana() }.validate().is_err());

        let t = Teacher { name: "Marta".into(), age: 45, email: "m@x.com".into(), subject: "Physics".into() };
        assert!(t.validate().is_ok());
        assert!(matches!(
            Teacher { subject: "".into(), ..t }.validate(),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn kind_names() {
        assert_eq!(Kind::Teacher.plural(), "teachers");
        assert_eq!(Kind::Student.as_str(), "student");
        assert_eq!(Kind::Student.to_string(), "Student");
    }
}
