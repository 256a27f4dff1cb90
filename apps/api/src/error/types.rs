use serde::Serialize;
use ts_rs::TS;

/// API error payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/error-response.ts"
)]
pub struct ErrorResponse {
    message: String,
    validations: Vec<FieldValidationResponse>,
}

impl ErrorResponse {
    pub(super) fn new(message: String, validations: Vec<FieldValidationResponse>) -> Self {
        Self {
            message,
            validations,
        }
    }
}

/// One rejected request field.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/field-validation-response.ts"
)]
pub struct FieldValidationResponse {
    pub field: String,
    pub detail: String,
}
