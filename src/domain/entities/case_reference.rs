//! Case identifiers carried through a single resolution attempt.

use std::fmt;

/// Vendor identifier of a citizen service request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CaseId(String);

impl CaseId {
    /// Creates a case id, rejecting blank values.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into().trim().to_string();
        if value.is_empty() {
            return None;
        }
        Some(Self(value))
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Machine identifier of the form backing a case, discovered mid-handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormRef(String);

impl FormRef {
    /// Creates a form reference, rejecting blank values.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into().trim().to_string();
        if value.is_empty() {
            return None;
        }
        Some(Self(value))
    }

    /// Returns the reference as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FormRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Case being resolved, plus the wrapper URL it was parsed from.
///
/// `form_ref` stays empty until the handshake has read it out of the
/// bootstrap page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseReference {
    /// Case identifier from the wrapper URL query.
    pub case_id: CaseId,
    /// Form reference discovered during the handshake.
    pub form_ref: Option<FormRef>,
    /// Wrapper URL the case id was extracted from.
    pub wrapper_url: String,
}

impl CaseReference {
    /// Creates a reference with no form reference yet.
    #[must_use]
    pub fn new(case_id: CaseId, wrapper_url: impl Into<String>) -> Self {
        Self {
            case_id,
            form_ref: None,
            wrapper_url: wrapper_url.into(),
        }
    }

    /// Returns a copy carrying the discovered form reference.
    #[must_use]
    pub fn with_form_ref(mut self, form_ref: FormRef) -> Self {
        self.form_ref = Some(form_ref);
        self
    }
}
