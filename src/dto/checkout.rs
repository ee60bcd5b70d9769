use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    cart::CartItemInput,
    checkout::{CheckoutForm, CheckoutStep, FieldError},
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    #[serde(flatten)]
    pub form: CheckoutForm,
    pub items: Vec<CartItemInput>,
    pub coupon_code: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ValidateStepRequest {
    pub step: CheckoutStep,
    #[serde(flatten)]
    pub form: CheckoutForm,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StepValidation {
    pub step: CheckoutStep,
    pub valid: bool,
    pub errors: Vec<FieldError>,
    /// First step the customer still has to complete.
    pub resume_at: CheckoutStep,
    pub next_step: Option<CheckoutStep>,
}
