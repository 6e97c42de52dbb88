//! Payment models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Numbered payment checkpoint gating workflow progress
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "u8", into = "u8")]
pub enum Milestone {
    /// Milestone 1: document review fee
    DocumentReview = 1,
    /// Milestone 2: assessment fee
    Assessment = 2,
    /// Milestone 3: certificate issuance fee (listed in the fee table, never gated)
    CertificateIssuance = 3,
}

/// Document review fee in THB
pub const DOCUMENT_REVIEW_FEE: Decimal = Decimal::from_parts(5_000, 0, 0, false, 0);

/// Assessment fee in THB
pub const ASSESSMENT_FEE: Decimal = Decimal::from_parts(25_000, 0, 0, false, 0);

impl Milestone {
    pub fn number(&self) -> u8 {
        *self as u8
    }

    /// Fixed fee for the milestone. Certificate issuance has no price in the
    /// current fee schedule.
    pub fn standard_fee(&self) -> Option<Decimal> {
        match self {
            Milestone::DocumentReview => Some(DOCUMENT_REVIEW_FEE),
            Milestone::Assessment => Some(ASSESSMENT_FEE),
            Milestone::CertificateIssuance => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Milestone::DocumentReview => "Document review fee",
            Milestone::Assessment => "Assessment fee",
            Milestone::CertificateIssuance => "Certificate issuance fee",
        }
    }

    pub fn display_name_th(&self) -> &'static str {
        match self {
            Milestone::DocumentReview => "ค่าตรวจสอบเอกสาร",
            Milestone::Assessment => "ค่าตรวจประเมิน",
            Milestone::CertificateIssuance => "ค่าออกใบรับรอง",
        }
    }
}

impl TryFrom<u8> for Milestone {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Milestone::DocumentReview),
            2 => Ok(Milestone::Assessment),
            3 => Ok(Milestone::CertificateIssuance),
            other => Err(format!("unknown payment milestone: {}", other)),
        }
    }
}

impl From<Milestone> for u8 {
    fn from(milestone: Milestone) -> Self {
        milestone.number()
    }
}

impl std::fmt::Display for Milestone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "milestone {}", self.number())
    }
}

/// Status of a payment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Cancelled,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Completed => "COMPLETED",
            PaymentStatus::Failed => "FAILED",
            PaymentStatus::Cancelled => "CANCELLED",
        }
    }

    /// A settled payment no longer accepts results from the payment service
    pub fn is_settled(&self) -> bool {
        !matches!(self, PaymentStatus::Pending)
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(PaymentStatus::Pending),
            "COMPLETED" => Ok(PaymentStatus::Completed),
            "FAILED" => Ok(PaymentStatus::Failed),
            "CANCELLED" => Ok(PaymentStatus::Cancelled),
            other => Err(format!("unknown payment status: {}", other)),
        }
    }
}

/// A payment tied to one application and one milestone
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub application_id: Uuid,
    pub milestone: Milestone,
    pub amount: Decimal,
    pub status: PaymentStatus,
    pub due_date: NaiveDate,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    pub fn receipt(&self) -> PaymentReceipt {
        PaymentReceipt {
            milestone: self.milestone,
            status: self.status,
            amount: self.amount,
        }
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status == PaymentStatus::Pending && today > self.due_date
    }
}

/// What the payment collaborator reports about a milestone payment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaymentReceipt {
    pub milestone: Milestone,
    pub status: PaymentStatus,
    pub amount: Decimal,
}

impl PaymentReceipt {
    /// True when the payment settled in full for its milestone
    pub fn is_settled_in_full(&self) -> bool {
        self.status == PaymentStatus::Completed
            && self
                .milestone
                .standard_fee()
                .map_or(false, |fee| self.amount >= fee)
    }
}
