use lazy_static::lazy_static;
use regex::Regex;
use sha2::{Digest, Sha256};
use base64::{engine::general_purpose, Engine as _};

lazy_static! {
    static ref EMAIL_REGEX: Regex =
        Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Z|a-z]{2,}\b").unwrap();
    static ref PHONE_REGEX: Regex =
        Regex::new(r"\+?[0-9][0-9\-.\s()]{7,}[0-9]").unwrap();
    static ref SSN_REGEX: Regex = Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").unwrap();
    static ref CREDIT_CARD_REGEX: Regex =
        Regex::new(r"\b\d{4}[-\s]?\d{4}[-\s]?\d{4}[-\s]?\d{4}\b").unwrap();
    static ref IP_REGEX: Regex = Regex::new(r"\b(?:[0-9]{1,3}\.){3}[0-9]{1,3}\b").unwrap();
    static ref MRN_REGEX: Regex = Regex::new(r"\bMRN[0-9]{4,}\b").unwrap();
}

/// Which categories of PII/PHI [`PiiRedactor::redact`] scrubs, and whether a
/// match is replaced with a fixed mask or a correlation hash.
#[derive(Debug, Clone)]
pub struct RedactionConfig {
    pub redact_emails: bool,
    pub redact_phones: bool,
    pub redact_ssn: bool,
    pub redact_credit_cards: bool,
    pub redact_ip_addresses: bool,
    pub redact_patient_identifiers: bool,
    pub hash_for_correlation: bool,
    pub custom_patterns: Vec<(Regex, String)>,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            redact_emails: true,
            redact_phones: true,
            redact_ssn: true,
            redact_credit_cards: true,
            redact_ip_addresses: true,
            redact_patient_identifiers: true,
            hash_for_correlation: false,
            custom_patterns: Vec::new(),
        }
    }
}

/// Scrubs PII/PHI out of a log line before it reaches any sink. Every engine
/// crate logs through [`crate::redacted_info`]/[`crate::redacted_error`]
/// rather than calling `tracing` macros directly on strings that may carry
/// patient or contact data.
pub struct PiiRedactor {
    config: RedactionConfig,
}

impl PiiRedactor {
    pub fn new(config: RedactionConfig) -> Self {
        Self { config }
    }

    pub fn redact(&self, text: &str) -> String {
        let mut result = text.to_string();

        if self.config.redact_emails {
            result = self.redact_emails(&result);
        }
        if self.config.redact_phones {
            result = self.redact_phones(&result);
        }
        if self.config.redact_ssn {
            result = self.redact_ssn(&result);
        }
        if self.config.redact_credit_cards {
            result = self.redact_credit_cards(&result);
        }
        if self.config.redact_ip_addresses {
            result = self.redact_ip_addresses(&result);
        }
        if self.config.redact_patient_identifiers {
            result = MRN_REGEX.replace_all(&result, "MRN[REDACTED]").to_string();
        }
        for (pattern, replacement) in &self.config.custom_patterns {
            result = pattern.replace_all(&result, replacement).to_string();
        }

        result
    }

    fn redact_emails(&self, text: &str) -> String {
        EMAIL_REGEX
            .replace_all(text, |caps: &regex::Captures| {
                let email = &caps[0];
                if self.config.hash_for_correlation {
                    format!("EMAIL[{}]", self.hash_value(email))
                } else {
                    let parts: Vec<&str> = email.split('@').collect();
                    if parts.len() == 2 {
                        format!(
                            "{}***@{}***",
                            &parts[0][..1.min(parts[0].len())],
                            &parts[1][..1.min(parts[1].len())]
                        )
                    } else {
                        "***@***".to_string()
                    }
                }
            })
            .to_string()
    }

    fn redact_phones(&self, text: &str) -> String {
        PHONE_REGEX
            .replace_all(text, |caps: &regex::Captures| {
                if self.config.hash_for_correlation {
                    format!("PHONE[{}]", self.hash_value(&caps[0]))
                } else {
                    mask_phone(&caps[0])
                }
            })
            .to_string()
    }

    fn redact_ssn(&self, text: &str) -> String {
        SSN_REGEX
            .replace_all(text, |caps: &regex::Captures| {
                if self.config.hash_for_correlation {
                    format!("SSN[{}]", self.hash_value(&caps[0]))
                } else {
                    "***-**-****".to_string()
                }
            })
            .to_string()
    }

    fn redact_credit_cards(&self, text: &str) -> String {
        CREDIT_CARD_REGEX
            .replace_all(text, |caps: &regex::Captures| {
                if self.config.hash_for_correlation {
                    format!("CC[{}]", self.hash_value(&caps[0]))
                } else {
                    "****-****-****-****".to_string()
                }
            })
            .to_string()
    }

    fn redact_ip_addresses(&self, text: &str) -> String {
        IP_REGEX
            .replace_all(text, |caps: &regex::Captures| {
                if self.config.hash_for_correlation {
                    format!("IP[{}]", self.hash_value(&caps[0]))
                } else {
                    let ip = &caps[0];
                    let parts: Vec<&str> = ip.split('.').collect();
                    if parts.len() == 4 {
                        format!("{}.***.***.{}", parts[0], parts[3])
                    } else {
                        "***.***.***.***".to_string()
                    }
                }
            })
            .to_string()
    }

    fn hash_value(&self, value: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(value.as_bytes());
        let result = hasher.finalize();
        general_purpose::STANDARD.encode(&result[..8])
    }
}

impl Default for PiiRedactor {
    fn default() -> Self {
        Self::new(RedactionConfig::default())
    }
}

/// Masks an E.164 phone number for logging: country code, first two
/// subscriber digits, and last four digits survive, everything between is
/// replaced with `*`. Shared by the SMS channel so delivery logs never carry
/// a full number.
///
/// `+14155550123` -> `+1415***0123`
pub fn mask_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit() || *c == '+').collect();
    let had_plus = digits.starts_with('+');
    let digits_only: String = digits.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits_only.len() < 7 {
        return "***".to_string();
    }

    let country_and_prefix_len = if digits_only.len() > 10 {
        digits_only.len() - 10 + 2
    } else {
        2
    };
    let country_and_prefix_len = country_and_prefix_len.min(digits_only.len() - 4);
    let last_four_start = digits_only.len() - 4;

    let visible_head = &digits_only[..country_and_prefix_len];
    let visible_tail = &digits_only[last_four_start..];
    let masked_len = digits_only.len() - country_and_prefix_len - 4;

    format!(
        "{}{}{}{}",
        if had_plus { "+" } else { "" },
        visible_head,
        "*".repeat(masked_len),
        visible_tail
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_email_without_hashing() {
        let redactor = PiiRedactor::new(RedactionConfig {
            hash_for_correlation: false,
            ..Default::default()
        });
        let redacted = redactor.redact("User john.doe@example.com logged in");
        assert!(redacted.contains("j***@e***"));
        assert!(!redacted.contains("john.doe"));
    }

    #[test]
    fn redacts_phone_without_hashing() {
        let redactor = PiiRedactor::new(RedactionConfig {
            hash_for_correlation: false,
            ..Default::default()
        });
        let redacted = redactor.redact("Call the on-call nurse at +14155550123");
        assert!(!redacted.contains("4155550123"));
    }

    #[test]
    fn redacts_patient_identifier_lookalikes() {
        let redactor = PiiRedactor::default();
        let redacted = redactor.redact("Linked occurrence to MRN123456");
        assert_eq!(redacted, "Linked occurrence to MRN[REDACTED]");
    }

    #[test]
    fn mask_phone_keeps_country_code_and_last_four() {
        let masked = mask_phone("+14155550123");
        assert!(masked.starts_with("+141"));
        assert!(masked.ends_with("0123"));
        assert!(masked.contains('*'));
    }

    #[test]
    fn mask_phone_too_short_is_fully_masked() {
        assert_eq!(mask_phone("123"), "***");
    }
}
