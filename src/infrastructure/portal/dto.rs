use serde::Serialize;

/// Body of a custom-action POST.
///
/// Only `data` and `name` carry meaning; the other fields are required by
/// the portal's API shape and are sent empty.
#[derive(Debug, Clone, Serialize)]
pub struct CustomActionBody<'a> {
    /// Case payload.
    pub data: CustomActionData<'a>,
    /// Request name.
    pub name: &'a str,
    /// Always empty.
    pub email: &'a str,
    /// Always empty.
    pub caseid: &'a str,
    /// Always empty.
    pub xref: &'a str,
    /// Always empty.
    pub xref1: &'a str,
    /// Always empty.
    pub xref2: &'a str,
}

/// Case identifiers sent with a custom action.
#[derive(Debug, Clone, Serialize)]
pub struct CustomActionData<'a> {
    /// Case id.
    pub caseid: &'a str,
    /// Form reference.
    pub formref: &'a str,
    /// Attachment filename, for downloads only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<&'a str>,
}

impl<'a> CustomActionBody<'a> {
    /// Creates a body with the constant fields left empty.
    #[must_use]
    pub const fn new(name: &'a str, data: CustomActionData<'a>) -> Self {
        Self {
            data,
            name,
            email: "",
            caseid: "",
            xref: "",
            xref1: "",
            xref2: "",
        }
    }
}
