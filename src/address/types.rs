#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub original: String,
    pub local_part: String,
    /// Lowercased domain as typed (may contain Unicode).
    pub domain: String,
    /// IDNA form of `domain`, used for DNS and SMTP. Empty when conversion failed.
    pub ascii_domain: String,
    pub valid: bool,
    pub reasons: Vec<String>,
}

impl Address {
    pub(crate) fn invalid(original: &str, reasons: Vec<String>) -> Self {
        Self {
            original: original.to_string(),
            local_part: String::new(),
            domain: String::new(),
            ascii_domain: String::new(),
            valid: false,
            reasons,
        }
    }

    /// First diagnostic, if the address was rejected.
    pub fn reason(&self) -> Option<&str> {
        self.reasons.first().map(String::as_str)
    }

    /// `local@ascii_domain`, the form used in `RCPT TO`.
    pub fn ascii_address(&self) -> String {
        format!("{}@{}", self.local_part, self.ascii_domain)
    }

    pub fn is_domain_literal(&self) -> bool {
        self.domain.starts_with('[')
    }
}
