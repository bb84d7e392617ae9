//! Health metrics calculations module
//!
//! Provides BMI calculation and classification, healthy weight ranges, and
//! plan progress arithmetic.
//!
//! # Design Principles
//!
//! 1. **Pure Functions**: All calculations are pure, no side effects
//! 2. **Fixed Units**: Height in meters, weight in kilograms
//! 3. **Explicit Failure**: Undefined results are errors, never NaN

use crate::errors::CalculationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// BMI Calculations
// ============================================================================

/// BMI category classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BmiCategory {
    SeverelyUnderweight,
    Underweight,
    Normal,
    Overweight,
    ObeseClass1,
    ObeseClass2,
    ObeseClass3,
}

impl BmiCategory {
    /// Get a human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            BmiCategory::SeverelyUnderweight => "Severely Underweight",
            BmiCategory::Underweight => "Underweight",
            BmiCategory::Normal => "Normal/Healthy",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::ObeseClass1 => "Obese (Class I)",
            BmiCategory::ObeseClass2 => "Obese (Class II)",
            BmiCategory::ObeseClass3 => "Obese (Class III)",
        }
    }

    /// True for every category below the normal range
    pub fn is_under(&self) -> bool {
        matches!(
            self,
            BmiCategory::SeverelyUnderweight | BmiCategory::Underweight
        )
    }

    /// True for every category above the normal range
    pub fn is_over(&self) -> bool {
        matches!(
            self,
            BmiCategory::Overweight
                | BmiCategory::ObeseClass1
                | BmiCategory::ObeseClass2
                | BmiCategory::ObeseClass3
        )
    }
}

/// Calculate BMI from weight and height
///
/// Formula: BMI = weight(kg) / height(m)²
///
/// No plausibility range is applied; only inputs for which the formula is
/// undefined are rejected.
pub fn calculate_bmi(weight_kg: f64, height_m: f64) -> Result<f64, CalculationError> {
    if !height_m.is_finite() || height_m <= 0.0 {
        return Err(CalculationError::InvalidHeight);
    }
    if !weight_kg.is_finite() {
        return Err(CalculationError::InvalidWeight);
    }
    Ok(weight_kg / (height_m * height_m))
}

/// Classify BMI into category
pub fn classify_bmi(bmi: f64) -> BmiCategory {
    if bmi < 16.0 {
        BmiCategory::SeverelyUnderweight
    } else if bmi < 18.5 {
        BmiCategory::Underweight
    } else if bmi < 25.0 {
        BmiCategory::Normal
    } else if bmi < 30.0 {
        BmiCategory::Overweight
    } else if bmi < 35.0 {
        BmiCategory::ObeseClass1
    } else if bmi < 40.0 {
        BmiCategory::ObeseClass2
    } else {
        BmiCategory::ObeseClass3
    }
}

/// Calculate healthy weight range for a given height
///
/// Based on BMI 18.5-25 (normal range)
pub fn healthy_weight_range_kg(height_m: f64) -> (f64, f64) {
    let height_m_sq = height_m * height_m;
    let min_weight = 18.5 * height_m_sq;
    let max_weight = 25.0 * height_m_sq;
    (min_weight, max_weight)
}

// ============================================================================
// Plan Progress
// ============================================================================

/// Completion progress of a plan
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanProgress {
    pub total_days: i64,
    pub completed_days: i64,
    /// completed_days / total_days as a percentage, not clamped
    pub progress: f64,
}

/// Whole days between two instants, truncated toward zero
pub fn whole_days_between(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    (end - start).num_days()
}

/// Calculate plan progress from its window and the number of check-ins
///
/// A window shorter than one day has no denominator and fails with
/// `DivisionByZero`.
pub fn calculate_plan_progress(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    completed_days: i64,
) -> Result<PlanProgress, CalculationError> {
    let total_days = whole_days_between(start, end);
    if total_days == 0 {
        return Err(CalculationError::DivisionByZero("plan spans zero days"));
    }

    Ok(PlanProgress {
        total_days,
        completed_days,
        progress: (completed_days as f64 * 100.0) / total_days as f64,
    })
}
