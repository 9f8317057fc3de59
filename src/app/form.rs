//! Auth form state: fields, validation, and submission status.

use crate::app::state::InputState;
use crate::auth::submit::{ErrorTarget, Failure, FormKind, Outcome};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Validator {
    Required,
    /// Must equal the named field.
    Matches(&'static str),
}

impl Validator {
    fn code(self) -> &'static str {
        match self {
            Validator::Required => "required",
            Validator::Matches(_) => "check",
        }
    }
}

#[derive(Debug)]
pub struct Field {
    pub name: &'static str,
    pub label: &'static str,
    pub secret: bool,
    pub input: InputState,
    validators: Vec<Validator>,
    /// Error code from validation.
    pub error: Option<&'static str>,
    /// Error code reported by the last submit; cleared on edit.
    pub submit_error: Option<&'static str>,
    pub touched: bool,
}

impl Field {
    fn new(name: &'static str, label: &'static str, validators: Vec<Validator>) -> Self {
        Self {
            name,
            label,
            secret: false,
            input: InputState::new(),
            validators,
            error: None,
            submit_error: None,
            touched: false,
        }
    }

    fn secret(mut self) -> Self {
        self.secret = true;
        self
    }

    pub fn value(&self) -> &str {
        &self.input.text
    }
}

#[derive(Debug)]
pub struct Form {
    pub kind: FormKind,
    pub fields: Vec<Field>,
    pub focus: usize,
    pub submitting: bool,
    pub submit_failed: bool,
    /// Form-wide error code from the last submit.
    pub error: Option<&'static str>,
    /// Set once a submit succeeded; the screen switches to its done message.
    pub done: bool,
}

impl Form {
    fn new(kind: FormKind, fields: Vec<Field>) -> Self {
        Self {
            kind,
            fields,
            focus: 0,
            submitting: false,
            submit_failed: false,
            error: None,
            done: false,
        }
    }

    pub fn sign_in() -> Self {
        Self::new(
            FormKind::SignIn,
            vec![
                Field::new("username", "Username", vec![Validator::Required]),
                Field::new("password", "Password", vec![Validator::Required]).secret(),
            ],
        )
    }

    pub fn pass_reset() -> Self {
        Self::new(
            FormKind::PassReset,
            vec![Field::new("email", "Email", vec![Validator::Required])],
        )
    }

    pub fn pass_change() -> Self {
        Self::new(
            FormKind::PassChange,
            vec![
                Field::new("password", "New password", vec![Validator::Required]).secret(),
                Field::new(
                    "passwordCheck",
                    "Confirm new password",
                    vec![Validator::Required, Validator::Matches("password")],
                )
                .secret(),
            ],
        )
    }

    pub fn value(&self, name: &str) -> &str {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(Field::value)
            .unwrap_or("")
    }

    fn check(&self, field: &Field) -> Option<&'static str> {
        field.validators.iter().find_map(|v| {
            let ok = match v {
                Validator::Required => !field.value().trim().is_empty(),
                Validator::Matches(other) => field.value() == self.value(other),
            };
            (!ok).then(|| v.code())
        })
    }

    /// Re-run validators for every field. Returns true when all pass.
    pub fn validate(&mut self) -> bool {
        let errors: Vec<_> = self.fields.iter().map(|f| self.check(f)).collect();
        for (field, error) in self.fields.iter_mut().zip(errors) {
            field.error = error;
        }
        self.fields.iter().all(|f| f.error.is_none())
    }

    pub fn invalid(&self) -> bool {
        self.fields
            .iter()
            .any(|f| self.check(f).is_some() || f.submit_error.is_some())
    }

    pub fn can_submit(&self) -> bool {
        !(self.submitting || (self.submit_failed && self.invalid()))
    }

    /// Start a submission. Fails validation, or while another submission
    /// is in flight, without side effects beyond marking errors.
    pub fn begin_submit(&mut self) -> bool {
        if self.submitting {
            return false;
        }
        if !self.validate() {
            self.submit_failed = true;
            return false;
        }
        self.submitting = true;
        self.error = None;
        for field in &mut self.fields {
            field.submit_error = None;
        }
        true
    }

    pub fn finish_submit(&mut self, outcome: &Outcome) {
        self.submitting = false;
        match outcome {
            Outcome::Success => {
                self.submit_failed = false;
                self.done = true;
            }
            Outcome::Failure(failure) => {
                self.submit_failed = true;
                self.apply_failure(failure);
            }
        }
    }

    fn apply_failure(&mut self, failure: &Failure) {
        for (target, code) in &failure.errors {
            match target {
                ErrorTarget::Form => self.error = Some(*code),
                ErrorTarget::Field(name) => {
                    if let Some(field) = self.fields.iter_mut().find(|f| f.name == *name) {
                        field.submit_error = Some(*code);
                    }
                }
            }
        }
    }

    /// Error code to display for `field`, if any.
    pub fn visible_error(&self, field: &Field) -> Option<&'static str> {
        if field.submit_error.is_some() {
            return field.submit_error;
        }
        if self.submit_failed || field.touched {
            return self.check(field);
        }
        None
    }

    pub fn focused_mut(&mut self) -> Option<&mut Field> {
        self.fields.get_mut(self.focus)
    }

    pub fn focus_next(&mut self) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            field.touched = true;
        }
        self.focus = (self.focus + 1) % self.fields.len().max(1);
    }

    pub fn focus_prev(&mut self) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            field.touched = true;
        }
        let len = self.fields.len().max(1);
        self.focus = (self.focus + len - 1) % len;
    }

    /// Apply an edit to the focused field. Ignored while submitting.
    pub fn edit(&mut self, f: impl FnOnce(&mut InputState)) {
        if self.submitting {
            return;
        }
        if let Some(field) = self.focused_mut() {
            f(&mut field.input);
            field.submit_error = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::submit::{FailureKind, FieldErrors};

    fn type_into(form: &mut Form, text: &str) {
        for c in text.chars() {
            form.edit(|input| input.insert_char(c));
        }
    }

    #[test]
    fn test_required_fields_block_submit() {
        let mut form = Form::sign_in();
        assert!(!form.begin_submit());
        assert!(form.submit_failed);
        assert_eq!(form.fields[0].error, Some("required"));
        assert!(!form.can_submit());

        type_into(&mut form, "ada");
        form.focus_next();
        type_into(&mut form, "pw");
        assert!(form.can_submit());
        assert!(form.begin_submit());
        assert!(form.submitting);
        assert!(!form.can_submit());
        assert!(!form.begin_submit());
    }

    #[test]
    fn test_password_check_must_match() {
        let mut form = Form::pass_change();
        type_into(&mut form, "secret1");
        form.focus_next();
        type_into(&mut form, "secret2");
        assert!(!form.begin_submit());
        assert_eq!(form.fields[1].error, Some("check"));
        form.edit(|input| input.delete_back());
        form.edit(|input| input.insert_char('1'));
        assert!(form.begin_submit());
    }

    #[test]
    fn test_failure_maps_onto_fields() {
        let mut form = Form::pass_change();
        type_into(&mut form, "pw");
        form.focus_next();
        type_into(&mut form, "pw");
        assert!(form.begin_submit());
        form.finish_submit(&Outcome::Failure(Failure {
            kind: FailureKind::InvalidPassword,
            errors: FieldErrors::from([(ErrorTarget::Field("password"), "invalid")]),
        }));
        assert!(!form.submitting);
        assert!(!form.done);
        assert_eq!(form.visible_error(&form.fields[0]), Some("invalid"));
        assert!(!form.can_submit());

        form.focus = 0;
        form.edit(|input| input.insert_char('!'));
        assert_eq!(form.fields[0].submit_error, None);
    }

    #[test]
    fn test_success_marks_done() {
        let mut form = Form::pass_reset();
        type_into(&mut form, "ada@example.com");
        assert!(form.begin_submit());
        form.edit(|input| input.insert_char('x'));
        assert_eq!(form.value("email"), "ada@example.com");
        form.finish_submit(&Outcome::Success);
        assert!(form.done);
        assert_eq!(form.error, None);
    }

    #[test]
    fn test_focus_wraps() {
        let mut form = Form::sign_in();
        form.focus_prev();
        assert_eq!(form.focus, 1);
        form.focus_next();
        assert_eq!(form.focus, 0);
        assert!(form.fields.iter().all(|f| f.touched));
    }
}
