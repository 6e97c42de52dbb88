//! WebAssembly module for the GACP Certification Platform
//!
//! Exposes the workflow rules to the frontend so the UI can show payment
//! prompts, revision allowances and status labels without a round trip:
//! - Payment gate evaluation
//! - Revision allowance
//! - Status labels (Thai / English)
//! - Application number validation

use rust_decimal::Decimal;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use shared::{
    evaluate_payment_gate, passes_score, Language, PaymentGate, RevisionPolicy, WorkflowError,
    WorkflowStatus,
};

/// Unknown status strings are reported, never defaulted
fn to_js_error(err: WorkflowError) -> JsValue {
    let message = err.to_string();
    web_sys::console::error_1(&JsValue::from_str(&message));
    JsValue::from_str(&message)
}

fn parse_status(status: &str) -> Result<WorkflowStatus, WorkflowError> {
    status.parse()
}

// ============================================================================
// Payment gate
// ============================================================================

/// Gate as handed to the frontend
#[derive(Debug, Serialize)]
struct PaymentGateView {
    payment_required: bool,
    gate: Option<PaymentGate>,
}

fn payment_gate_json(status: &str, revision_count: u32) -> Result<String, WorkflowError> {
    let gate = evaluate_payment_gate(parse_status(status)?, revision_count);
    let view = PaymentGateView {
        payment_required: gate.is_some(),
        gate,
    };
    serde_json::to_string(&view).map_err(|e| WorkflowError::CorruptState(e.to_string()))
}

/// Evaluate the payment gate. Returns `{"payment_required": bool, "gate": {...} | null}`.
#[wasm_bindgen]
pub fn evaluate_payment_gate_json(status: &str, revision_count: u32) -> Result<String, JsValue> {
    payment_gate_json(status, revision_count).map_err(to_js_error)
}

/// Milestone number (1-3) the status is waiting on, or `undefined`
#[wasm_bindgen]
pub fn payment_milestone_for(status: &str) -> Result<Option<u8>, JsValue> {
    parse_status(status)
        .map(|s| s.payment_milestone().map(|m| m.number()))
        .map_err(to_js_error)
}

// ============================================================================
// Status
// ============================================================================

#[wasm_bindgen]
pub fn is_terminal_status(status: &str) -> Result<bool, JsValue> {
    parse_status(status)
        .map(|s| s.is_terminal())
        .map_err(to_js_error)
}

/// Display label for a status; `lang` is "th" or "en"
#[wasm_bindgen]
pub fn workflow_status_label(status: &str, lang: &str) -> Result<String, JsValue> {
    parse_status(status)
        .map(|s| s.label(Language::from_code(lang)).to_string())
        .map_err(to_js_error)
}

// ============================================================================
// Revisions
// ============================================================================

#[wasm_bindgen]
pub fn free_revisions_remaining(revision_count: u32, max_free_revisions: u32) -> u32 {
    RevisionPolicy::new(max_free_revisions).free_revisions_remaining(revision_count)
}

/// True when one more rejection would put the application behind a fee
#[wasm_bindgen]
pub fn next_rejection_requires_payment(revision_count: u32, max_free_revisions: u32) -> bool {
    RevisionPolicy::new(max_free_revisions).next_rejection_requires_payment(revision_count)
}

// ============================================================================
// Validation
// ============================================================================

/// Check a `GACP-YYYY-NNNN` application number
#[wasm_bindgen]
pub fn validate_application_number_format(number: &str) -> bool {
    shared::validate_application_number(number).is_ok()
}

/// Whether an assessment score meets the pass mark. Out-of-range scores fail.
#[wasm_bindgen]
pub fn assessment_score_passes(score: f64, pass_mark: f64) -> bool {
    match (Decimal::try_from(score), Decimal::try_from(pass_mark)) {
        (Ok(score), Ok(pass_mark)) => {
            shared::validate_assessment_score(score).is_ok() && passes_score(score, pass_mark)
        }
        _ => false,
    }
}
