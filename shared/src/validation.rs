//! Validation utilities for the GACP Certification Platform

use rust_decimal::Decimal;

use crate::workflow::WorkflowError;

// ============================================================================
// Application Validations
// ============================================================================

/// Validate application number format
/// Format: GACP-NNNN-NNNN (e.g., GACP-2024-0123)
pub fn validate_application_number(number: &str) -> Result<(), &'static str> {
    let parts: Vec<&str> = number.split('-').collect();

    if parts.len() != 3 {
        return Err("Application number must be in format GACP-NNNN-NNNN");
    }

    if parts[0] != "GACP" {
        return Err("Application number must start with 'GACP'");
    }

    for part in &parts[1..] {
        if part.len() != 4 || !part.chars().all(|c| c.is_ascii_digit()) {
            return Err("Application number blocks must be four digits");
        }
    }

    Ok(())
}

/// Convert a stored revision counter. Negative values mean the row was
/// corrupted outside the workflow.
pub fn validate_revision_count(value: i32) -> Result<u32, WorkflowError> {
    u32::try_from(value)
        .map_err(|_| WorkflowError::CorruptState(format!("negative revision_count {}", value)))
}

/// Validate assessment score (0-100)
pub fn validate_assessment_score(score: Decimal) -> Result<(), &'static str> {
    if score < Decimal::ZERO || score > Decimal::from(100) {
        return Err("Assessment score must be between 0 and 100");
    }
    Ok(())
}

/// Validate farm area in rai
pub fn validate_farm_area(area_rai: Decimal) -> Result<(), &'static str> {
    if area_rai <= Decimal::ZERO {
        return Err("Farm area must be greater than zero");
    }
    if area_rai > Decimal::from(10_000) {
        return Err("Farm area exceeds the maximum for a single application");
    }
    Ok(())
}

// ============================================================================
// Thailand-Specific Validations
// ============================================================================

/// Thai provinces with licensed GACP cultivation
pub const GACP_PROVINCES: &[(&str, &str)] = &[
    ("เชียงใหม่", "Chiang Mai"),
    ("เชียงราย", "Chiang Rai"),
    ("แม่ฮ่องสอน", "Mae Hong Son"),
    ("น่าน", "Nan"),
    ("เลย", "Loei"),
    ("สกลนคร", "Sakon Nakhon"),
    ("นครราชสีมา", "Nakhon Ratchasima"),
    ("บุรีรัมย์", "Buriram"),
    ("ปทุมธานี", "Pathum Thani"),
    ("กรุงเทพมหานคร", "Bangkok"),
    ("ชลบุรี", "Chon Buri"),
    ("ประจวบคีรีขันธ์", "Prachuap Khiri Khan"),
    ("สุราษฎร์ธานี", "Surat Thani"),
    ("ภูเก็ต", "Phuket"),
    ("สงขลา", "Songkhla"),
];

/// Validate province against the GACP province list (Thai or English name)
pub fn validate_thai_province(province: &str) -> Result<(), &'static str> {
    let wanted = province.trim().to_lowercase();
    let known = GACP_PROVINCES
        .iter()
        .any(|(th, en)| *th == province.trim() || en.to_lowercase() == wanted);

    if known {
        Ok(())
    } else {
        Err("Province is not a recognized GACP province")
    }
}
