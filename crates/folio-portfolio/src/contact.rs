#![forbid(unsafe_code)]

//! Contact form: three required fields, local validation, no network.

use std::fmt;

/// Confirmation shown after a successful submit.
pub const SENT_MESSAGE: &str = "Message sent successfully!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Email,
    Message,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Name, Field::Email, Field::Message];

    pub const fn placeholder(self) -> &'static str {
        match self {
            Field::Name => "Your Name",
            Field::Email => "Your Email",
            Field::Message => "Your Message",
        }
    }

    /// Rows the input occupies, borders excluded.
    pub const fn rows(self) -> u16 {
        match self {
            Field::Name | Field::Email => 1,
            Field::Message => 4,
        }
    }

    const fn index(self) -> usize {
        match self {
            Field::Name => 0,
            Field::Email => 1,
            Field::Message => 2,
        }
    }
}

/// Keyboard focus inside the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormFocus {
    #[default]
    Name,
    Email,
    Message,
    Send,
}

impl FormFocus {
    pub const fn field(self) -> Option<Field> {
        match self {
            FormFocus::Name => Some(Field::Name),
            FormFocus::Email => Some(Field::Email),
            FormFocus::Message => Some(Field::Message),
            FormFocus::Send => None,
        }
    }

    const fn next(self) -> Self {
        match self {
            FormFocus::Name => FormFocus::Email,
            FormFocus::Email => FormFocus::Message,
            FormFocus::Message => FormFocus::Send,
            FormFocus::Send => FormFocus::Name,
        }
    }

    const fn prev(self) -> Self {
        match self {
            FormFocus::Name => FormFocus::Send,
            FormFocus::Email => FormFocus::Name,
            FormFocus::Message => FormFocus::Email,
            FormFocus::Send => FormFocus::Message,
        }
    }
}

impl From<Field> for FormFocus {
    fn from(field: Field) -> Self {
        match field {
            Field::Name => FormFocus::Name,
            Field::Email => FormFocus::Email,
            Field::Message => FormFocus::Message,
        }
    }
}

/// Edits routed to the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormInput {
    Insert(char),
    Backspace,
    NextField,
    PrevField,
    Focus(FormFocus),
    /// Enter: next field, newline in the message, submit on the button.
    Confirm,
    Submit,
}

/// Why a field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    Required(Field),
    InvalidEmail,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldError::Required(Field::Name) => f.write_str("Name is required"),
            FieldError::Required(Field::Email) => f.write_str("Email is required"),
            FieldError::Required(Field::Message) => f.write_str("Message is required"),
            FieldError::InvalidEmail => f.write_str("Email is invalid"),
        }
    }
}

/// A validated message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub name: String,
    pub email: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Sent(Submission),
    Rejected(usize),
}

/// `\S+@\S+\.\S+` over the whole value.
pub fn is_email_shaped(value: &str) -> bool {
    if value.is_empty() || value.chars().any(char::is_whitespace) {
        return false;
    }
    value.char_indices().any(|(at, c)| {
        if c != '@' || at == 0 {
            return false;
        }
        let domain = &value[at + 1..];
        domain
            .char_indices()
            .any(|(dot, c)| c == '.' && dot > 0 && dot + 1 < domain.len())
    })
}

#[derive(Debug, Clone, Default)]
pub struct ContactForm {
    values: [String; 3],
    errors: [Option<FieldError>; 3],
    focus: FormFocus,
}

impl ContactForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self, field: Field) -> &str {
        &self.values[field.index()]
    }

    pub fn error(&self, field: Field) -> Option<FieldError> {
        self.errors[field.index()]
    }

    pub fn has_errors(&self) -> bool {
        self.errors.iter().any(Option::is_some)
    }

    pub fn focus(&self) -> FormFocus {
        self.focus
    }

    pub fn set_focus(&mut self, focus: FormFocus) {
        self.focus = focus;
    }

    /// Set a field's value as if typed, clearing its error.
    pub fn set_value(&mut self, field: Field, value: &str) {
        self.values[field.index()] = value.to_owned();
        self.errors[field.index()] = None;
    }

    /// Type into the focused field. Ignored while the send button has focus.
    pub fn insert(&mut self, c: char) {
        let Some(field) = self.focus.field() else {
            return;
        };
        if c.is_control() && !(c == '\n' && field == Field::Message) {
            return;
        }
        self.values[field.index()].push(c);
        self.errors[field.index()] = None;
    }

    pub fn backspace(&mut self) {
        let Some(field) = self.focus.field() else {
            return;
        };
        if self.values[field.index()].pop().is_some() {
            self.errors[field.index()] = None;
        }
    }

    /// Errors for the current values, without recording them.
    pub fn validate(&self) -> [Option<FieldError>; 3] {
        let name = self.value(Field::Name);
        let email = self.value(Field::Email);
        let message = self.value(Field::Message);
        [
            name.is_empty().then_some(FieldError::Required(Field::Name)),
            if email.is_empty() {
                Some(FieldError::Required(Field::Email))
            } else if !is_email_shaped(email) {
                Some(FieldError::InvalidEmail)
            } else {
                None
            },
            message.is_empty().then_some(FieldError::Required(Field::Message)),
        ]
    }

    /// Validate and, when clean, hand out the submission and clear the fields.
    ///
    /// On rejection the per-field errors are kept and the values untouched.
    pub fn submit(&mut self) -> SubmitOutcome {
        self.errors = self.validate();
        let rejected = self.errors.iter().filter(|e| e.is_some()).count();
        if rejected > 0 {
            tracing::debug!(target: "folio.contact", rejected, "form rejected");
            return SubmitOutcome::Rejected(rejected);
        }
        let [name, email, message] = std::mem::take(&mut self.values);
        self.focus = FormFocus::Name;
        SubmitOutcome::Sent(Submission { name, email, message })
    }

    /// Apply one routed edit. Returns the outcome when it triggered a submit.
    pub fn apply(&mut self, input: FormInput) -> Option<SubmitOutcome> {
        match input {
            FormInput::Insert(c) => self.insert(c),
            FormInput::Backspace => self.backspace(),
            FormInput::NextField => self.focus = self.focus.next(),
            FormInput::PrevField => self.focus = self.focus.prev(),
            FormInput::Focus(focus) => self.focus = focus,
            FormInput::Confirm => match self.focus {
                FormFocus::Send => return Some(self.submit()),
                FormFocus::Message => self.insert('\n'),
                FormFocus::Name | FormFocus::Email => self.focus = self.focus.next(),
            },
            FormInput::Submit => return Some(self.submit()),
        }
        None
    }
}
