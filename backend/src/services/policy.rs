//! Plan generation policies
//!
//! A policy turns a user's latest health record into the parameters of a new
//! plan. `HealthSystem` holds one as a trait object so other policies can be
//! plugged in.

use chrono::{DateTime, Duration, Utc};
use wellness_tracker_shared::health_metrics::{classify_bmi, healthy_weight_range_kg, BmiCategory};
use wellness_tracker_shared::models::{HealthRecord, PlanType};
use wellness_tracker_shared::types::CreatePlanRequest;

/// Decides what plan to generate for a health record
pub trait PlanPolicy: Send + Sync {
    fn plan_for(&self, record: &HealthRecord, now: DateTime<Utc>) -> CreatePlanRequest;
}

/// Picks the plan type from the BMI category
///
/// Underweight leads to a diet plan, overweight and obese to an exercise
/// plan, and a normal BMI to a sleep plan.
#[derive(Debug, Clone)]
pub struct BmiPlanPolicy {
    duration_days: i64,
}

impl BmiPlanPolicy {
    pub fn new(duration_days: i64) -> Self {
        Self { duration_days }
    }

    pub fn plan_type_for(category: BmiCategory) -> PlanType {
        if category.is_under() {
            PlanType::Diet
        } else if category.is_over() {
            PlanType::Exercise
        } else {
            PlanType::Sleep
        }
    }
}

impl Default for BmiPlanPolicy {
    fn default() -> Self {
        Self::new(30)
    }
}

impl PlanPolicy for BmiPlanPolicy {
    fn plan_for(&self, record: &HealthRecord, now: DateTime<Utc>) -> CreatePlanRequest {
        let category = classify_bmi(record.bmi);
        let plan_type = Self::plan_type_for(category);
        let (low, high) = healthy_weight_range_kg(record.height);

        let (title, description) = match plan_type {
            PlanType::Diet => (
                "Balanced weight gain",
                format!(
                    "BMI {:.1} ({}). Add nutrient-dense meals to move towards {:.1}-{:.1} kg.",
                    record.bmi,
                    category.description(),
                    low,
                    high
                ),
            ),
            PlanType::Exercise => (
                "Daily activity",
                format!(
                    "BMI {:.1} ({}). Build a daily exercise habit to move towards {:.1}-{:.1} kg.",
                    record.bmi,
                    category.description(),
                    low,
                    high
                ),
            ),
            PlanType::Sleep => (
                "Healthy sleep routine",
                format!(
                    "BMI {:.1} ({}). Keep a regular sleep schedule to maintain your weight.",
                    record.bmi,
                    category.description()
                ),
            ),
        };

        CreatePlanRequest {
            plan_type,
            title: title.to_string(),
            description,
            day_of_week: None,
            start_time: now,
            end_time: now + Duration::days(self.duration_days),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;
    use uuid::Uuid;

    fn record(height: f64, weight: f64) -> HealthRecord {
        HealthRecord {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            height,
            weight,
            bmi: weight / (height * height),
            blood_pressure: None,
            heart_rate: None,
            recorded_at: Utc::now(),
        }
    }

    #[rstest]
    #[case(1.80, 50.0, PlanType::Diet)]
    #[case(1.75, 70.0, PlanType::Sleep)]
    #[case(1.70, 85.0, PlanType::Exercise)]
    #[case(1.60, 110.0, PlanType::Exercise)]
    fn test_plan_type_follows_bmi(
        #[case] height: f64,
        #[case] weight: f64,
        #[case] expected: PlanType,
    ) {
        let request = BmiPlanPolicy::default().plan_for(&record(height, weight), Utc::now());
        assert_eq!(request.plan_type, expected);
    }

    #[test]
    fn test_plan_window_uses_duration() {
        let now = Utc::now();
        let request = BmiPlanPolicy::new(14).plan_for(&record(1.75, 70.0), now);
        assert_eq!(request.start_time, now);
        assert_eq!((request.end_time - request.start_time).num_days(), 14);
        assert!(!request.title.is_empty());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Property: the plan type matches the BMI category and the window
        /// spans the configured number of days
        #[test]
        fn prop_plan_follows_category(
            height in 0.5f64..2.5,
            weight in 20.0f64..300.0,
            days in 0i64..400,
        ) {
            let now = Utc::now();
            let health = record(height, weight);
            let request = BmiPlanPolicy::new(days).plan_for(&health, now);

            prop_assert_eq!(
                request.plan_type,
                BmiPlanPolicy::plan_type_for(classify_bmi(health.bmi))
            );
            prop_assert_eq!(request.start_time, now);
            prop_assert_eq!((request.end_time - request.start_time).num_days(), days);
            prop_assert!(request.day_of_week.is_none());
            prop_assert!(!request.description.is_empty());
        }
    }
}
