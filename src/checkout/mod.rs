//! Checkout form and its step-by-step validation.
//!
//! The storefront walks the customer through [`CheckoutStep`]s in order. The
//! same rules run again server-side over the whole form before an order is
//! created.

pub mod card;

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{entity::enums::PaymentMethod, shipping::normalize_postal_code};

use card::{card_digits, expiry_valid, last4};

pub use card::{CardBrand, detect_brand, luhn_valid};

static EMAIL_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").ok());

const BRAZILIAN_STATES: [&str; 27] = [
    "AC", "AL", "AP", "AM", "BA", "CE", "DF", "ES", "GO", "MA", "MT", "MS", "MG", "PA", "PB",
    "PR", "PE", "PI", "RJ", "RN", "RS", "RO", "RR", "SC", "SP", "SE", "TO",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep {
    Contact,
    Address,
    Shipping,
    Payment,
    Review,
}

impl CheckoutStep {
    pub const ALL: [CheckoutStep; 5] = [
        CheckoutStep::Contact,
        CheckoutStep::Address,
        CheckoutStep::Shipping,
        CheckoutStep::Payment,
        CheckoutStep::Review,
    ];

    pub fn next(self) -> Option<CheckoutStep> {
        match self {
            CheckoutStep::Contact => Some(CheckoutStep::Address),
            CheckoutStep::Address => Some(CheckoutStep::Shipping),
            CheckoutStep::Shipping => Some(CheckoutStep::Payment),
            CheckoutStep::Payment => Some(CheckoutStep::Review),
            CheckoutStep::Review => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ContactInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct AddressInfo {
    pub street: String,
    pub number: String,
    pub complement: Option<String>,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CardInput {
    pub number: String,
    pub holder_name: String,
    pub expiry_month: u32,
    pub expiry_year: i32,
    pub cvv: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PaymentInfo {
    pub method: PaymentMethod,
    pub card: Option<CardInput>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CheckoutForm {
    #[serde(default)]
    pub contact: ContactInfo,
    #[serde(default)]
    pub address: AddressInfo,
    pub shipping_option_id: Option<String>,
    pub payment: Option<PaymentInfo>,
    pub notes: Option<String>,
}

fn digits(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

fn require(errors: &mut Vec<FieldError>, field: &'static str, value: &str, label: &str) -> bool {
    if value.trim().is_empty() {
        errors.push(FieldError::new(field, format!("{label} is required")));
        false
    } else {
        true
    }
}

impl CheckoutForm {
    /// Field errors for a single step. An empty list means the step is complete.
    pub fn validate_step(&self, step: CheckoutStep, today: NaiveDate) -> Vec<FieldError> {
        let mut errors = Vec::new();
        match step {
            CheckoutStep::Contact => self.validate_contact(&mut errors),
            CheckoutStep::Address => self.validate_address(&mut errors),
            CheckoutStep::Shipping => {
                let chosen = self
                    .shipping_option_id
                    .as_deref()
                    .is_some_and(|id| !id.trim().is_empty());
                if !chosen {
                    errors.push(FieldError::new(
                        "shipping_option_id",
                        "Choose a shipping option",
                    ));
                }
            }
            CheckoutStep::Payment => self.validate_payment(&mut errors, today),
            CheckoutStep::Review => {
                for step in &CheckoutStep::ALL[..4] {
                    errors.extend(self.validate_step(*step, today));
                }
            }
        }
        errors
    }

    /// The first step that still has errors, or `Review` when everything is filled in.
    pub fn first_incomplete(&self, today: NaiveDate) -> CheckoutStep {
        CheckoutStep::ALL
            .into_iter()
            .find(|step| {
                *step != CheckoutStep::Review && !self.validate_step(*step, today).is_empty()
            })
            .unwrap_or(CheckoutStep::Review)
    }

    pub fn validate(&self, today: NaiveDate) -> Result<(), Vec<FieldError>> {
        let errors = self.validate_step(CheckoutStep::Review, today);
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    fn validate_contact(&self, errors: &mut Vec<FieldError>) {
        let contact = &self.contact;
        require(errors, "contact.name", &contact.name, "Name");
        if require(errors, "contact.email", &contact.email, "Email") {
            let valid = EMAIL_RE
                .as_ref()
                .is_some_and(|re| re.is_match(contact.email.trim()));
            if !valid {
                errors.push(FieldError::new("contact.email", "Invalid email"));
            }
        }
        if require(errors, "contact.phone", &contact.phone, "Phone") {
            let len = digits(&contact.phone).len();
            if !(10..=11).contains(&len) {
                errors.push(FieldError::new("contact.phone", "Invalid phone number"));
            }
        }
    }

    fn validate_address(&self, errors: &mut Vec<FieldError>) {
        let address = &self.address;
        require(errors, "address.street", &address.street, "Street");
        require(errors, "address.number", &address.number, "Number");
        require(errors, "address.neighborhood", &address.neighborhood, "Neighborhood");
        require(errors, "address.city", &address.city, "City");
        if require(errors, "address.state", &address.state, "State") {
            let state = address.state.trim().to_ascii_uppercase();
            if !BRAZILIAN_STATES.contains(&state.as_str()) {
                errors.push(FieldError::new("address.state", "Invalid state"));
            }
        }
        if require(errors, "address.postal_code", &address.postal_code, "Postal code")
            && normalize_postal_code(&address.postal_code).is_err()
        {
            errors.push(FieldError::new("address.postal_code", "Invalid postal code"));
        }
    }

    fn validate_payment(&self, errors: &mut Vec<FieldError>, today: NaiveDate) {
        let Some(payment) = &self.payment else {
            errors.push(FieldError::new("payment.method", "Choose a payment method"));
            return;
        };
        if payment.method != PaymentMethod::CreditCard {
            return;
        }
        let Some(card) = &payment.card else {
            errors.push(FieldError::new("payment.card", "Card details are required"));
            return;
        };

        let number = card_digits(&card.number);
        let brand = detect_brand(&number);
        if !(13..=19).contains(&number.len()) || !luhn_valid(&number) {
            errors.push(FieldError::new("payment.card.number", "Invalid card number"));
        } else if brand.is_none() {
            errors.push(FieldError::new("payment.card.number", "Card brand not accepted"));
        }
        require(errors, "payment.card.holder_name", &card.holder_name, "Cardholder name");
        if !expiry_valid(card.expiry_month, card.expiry_year, today) {
            errors.push(FieldError::new("payment.card.expiry", "Card is expired or invalid"));
        }
        let cvv_len = brand.map_or(3, CardBrand::cvv_len);
        let cvv = card.cvv.trim();
        if cvv.len() != cvv_len || !cvv.chars().all(|c| c.is_ascii_digit()) {
            errors.push(FieldError::new("payment.card.cvv", "Invalid security code"));
        }
    }
}

/// Brand and last four digits of a validated card, the only card data kept.
pub fn card_summary(payment: &PaymentInfo) -> Option<(CardBrand, String)> {
    let card = payment.card.as_ref()?;
    if payment.method != PaymentMethod::CreditCard {
        return None;
    }
    let number = card_digits(&card.number);
    let brand = detect_brand(&number)?;
    Some((brand, last4(&number)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
    }

    fn complete_form() -> CheckoutForm {
        CheckoutForm {
            contact: ContactInfo {
                name: "Ana Souza".into(),
                email: "ana@example.com".into(),
                phone: "(22) 99999-0000".into(),
            },
            address: AddressInfo {
                street: "Rua das Flores".into(),
                number: "10".into(),
                complement: None,
                neighborhood: "Centro".into(),
                city: "Cabo Frio".into(),
                state: "rj".into(),
                postal_code: "28905-000".into(),
            },
            shipping_option_id: Some("local".into()),
            payment: Some(PaymentInfo {
                method: PaymentMethod::CreditCard,
                card: Some(CardInput {
                    number: "4111 1111 1111 1111".into(),
                    holder_name: "ANA SOUZA".into(),
                    expiry_month: 12,
                    expiry_year: 2028,
                    cvv: "123".into(),
                }),
            }),
            notes: None,
        }
    }

    #[test]
    fn complete_form_is_valid() {
        let form = complete_form();
        assert_eq!(form.validate(today()), Ok(()));
        assert_eq!(form.first_incomplete(today()), CheckoutStep::Review);
    }

    #[test]
    fn empty_form_starts_at_contact() {
        let form = CheckoutForm::default();
        assert_eq!(form.first_incomplete(today()), CheckoutStep::Contact);
        let errors = form.validate_step(CheckoutStep::Contact, today());
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, ["contact.name", "contact.email", "contact.phone"]);
    }

    #[test]
    fn resumes_at_first_broken_step() {
        let mut form = complete_form();
        form.shipping_option_id = None;
        form.address.postal_code = "123".into();
        assert_eq!(form.first_incomplete(today()), CheckoutStep::Address);

        form.address.postal_code = "28905000".into();
        assert_eq!(form.first_incomplete(today()), CheckoutStep::Shipping);
    }

    #[test]
    fn pix_needs_no_card() {
        let mut form = complete_form();
        form.payment = Some(PaymentInfo {
            method: PaymentMethod::Pix,
            card: None,
        });
        assert!(form.validate_step(CheckoutStep::Payment, today()).is_empty());
        assert!(card_summary(form.payment.as_ref().unwrap()).is_none());
    }

    #[test]
    fn rejects_bad_card_details() {
        let mut form = complete_form();
        if let Some(card) = form.payment.as_mut().and_then(|p| p.card.as_mut()) {
            card.number = "4111 1111 1111 1112".into();
            card.expiry_year = 2025;
            card.cvv = "12".into();
        }
        let fields: Vec<_> = form
            .validate_step(CheckoutStep::Payment, today())
            .into_iter()
            .map(|e| e.field)
            .collect();
        assert_eq!(
            fields,
            ["payment.card.number", "payment.card.expiry", "payment.card.cvv"]
        );
    }

    #[test]
    fn amex_requires_four_digit_cvv() {
        let mut form = complete_form();
        if let Some(card) = form.payment.as_mut().and_then(|p| p.card.as_mut()) {
            card.number = "378282246310005".into();
            card.cvv = "1234".into();
        }
        assert!(form.validate_step(CheckoutStep::Payment, today()).is_empty());
        let (brand, last4) = card_summary(form.payment.as_ref().unwrap()).unwrap();
        assert_eq!(brand, CardBrand::Amex);
        assert_eq!(last4, "0005");
    }

    #[test]
    fn rejects_unknown_state_and_bad_email() {
        let mut form = complete_form();
        form.address.state = "XX".into();
        form.contact.email = "ana@example".into();
        assert_eq!(form.first_incomplete(today()), CheckoutStep::Contact);
        let errors = form.validate_step(CheckoutStep::Address, today());
        assert_eq!(errors[0].field, "address.state");
    }
}
