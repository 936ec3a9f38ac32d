//! Grade ledger record and its derived percentages.
//!
//! Raw scores are the only stored state. Percentages are computed on every
//! read so they can never go stale.

use crate::domain::error::ValidationError;

const QUIZ_MAX: f64 = 10.0;
const CAT_MAX: f64 = 50.0;
const FAT_MAX: f64 = 100.0;

const INTERNAL_WEIGHT: f64 = 30.0;
const CAT_WEIGHT: f64 = 30.0;
const FAT_WEIGHT: f64 = 40.0;

/// Raw scores of one student in one course. `None` means "not yet entered",
/// which is not the same as zero.
#[derive(Debug, Clone, PartialEq)]
pub struct GradeRecord {
    pub student_id: String,
    pub course_id: String,
    pub quiz1: Option<f64>,
    pub quiz2: Option<f64>,
    pub quiz3: Option<f64>,
    pub cat1: Option<f64>,
    pub cat2: Option<f64>,
    pub fat: Option<f64>,
    pub created_at: String,
    pub updated_at: String,
}

/// Percentages derived from a [`GradeRecord`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradeBreakdown {
    pub internal_percentage: f64,
    pub cat_percentage: f64,
    pub fat_percentage: f64,
    pub total_percentage: f64,
}

impl GradeRecord {
    /// Quiz average scaled to 30; missing quizzes are left out of the average
    pub fn internal_percentage(&self) -> f64 {
        weighted_average(&[self.quiz1, self.quiz2, self.quiz3], QUIZ_MAX, INTERNAL_WEIGHT)
    }

    /// CAT average scaled to 30
    pub fn cat_percentage(&self) -> f64 {
        weighted_average(&[self.cat1, self.cat2], CAT_MAX, CAT_WEIGHT)
    }

    /// Final exam scaled to 40
    pub fn fat_percentage(&self) -> f64 {
        weighted_average(&[self.fat], FAT_MAX, FAT_WEIGHT)
    }

    /// Sum of the three components, rounded to two decimals
    pub fn total_percentage(&self) -> f64 {
        round2(self.internal_percentage() + self.cat_percentage() + self.fat_percentage())
    }

    pub fn breakdown(&self) -> GradeBreakdown {
        GradeBreakdown {
            internal_percentage: self.internal_percentage(),
            cat_percentage: self.cat_percentage(),
            fat_percentage: self.fat_percentage(),
            total_percentage: self.total_percentage(),
        }
    }
}

fn weighted_average(scores: &[Option<f64>], max: f64, weight: f64) -> f64 {
    let present: Vec<f64> = scores.iter().flatten().copied().collect();
    if present.is_empty() {
        return 0.0;
    }
    let average = present.iter().sum::<f64>() / present.len() as f64;
    (average / max) * weight
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// One score column of the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreField {
    Quiz1,
    Quiz2,
    Quiz3,
    Cat1,
    Cat2,
    Fat,
}

impl ScoreField {
    pub const ALL: [ScoreField; 6] = [
        ScoreField::Quiz1,
        ScoreField::Quiz2,
        ScoreField::Quiz3,
        ScoreField::Cat1,
        ScoreField::Cat2,
        ScoreField::Fat,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ScoreField::Quiz1 => "quiz1",
            ScoreField::Quiz2 => "quiz2",
            ScoreField::Quiz3 => "quiz3",
            ScoreField::Cat1 => "cat1",
            ScoreField::Cat2 => "cat2",
            ScoreField::Fat => "fat",
        }
    }

    /// Inclusive upper bound; the lower bound is always 0
    pub fn max(&self) -> f64 {
        match self {
            ScoreField::Quiz1 | ScoreField::Quiz2 | ScoreField::Quiz3 => QUIZ_MAX,
            ScoreField::Cat1 | ScoreField::Cat2 => CAT_MAX,
            ScoreField::Fat => FAT_MAX,
        }
    }

    pub fn validate(&self, value: f64) -> Result<(), ValidationError> {
        if value.is_finite() && (0.0..=self.max()).contains(&value) {
            Ok(())
        } else {
            Err(ValidationError::ScoreOutOfRange {
                field: self.name(),
                value,
                max: self.max(),
            })
        }
    }
}

/// Partial update of a grade record.
///
/// Outer `None`: leave the field alone. `Some(None)`: clear it.
/// `Some(Some(v))`: set it to `v`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScorePatch {
    pub quiz1: Option<Option<f64>>,
    pub quiz2: Option<Option<f64>>,
    pub quiz3: Option<Option<f64>>,
    pub cat1: Option<Option<f64>>,
    pub cat2: Option<Option<f64>>,
    pub fat: Option<Option<f64>>,
}

impl ScorePatch {
    pub fn get(&self, field: ScoreField) -> Option<Option<f64>> {
        match field {
            ScoreField::Quiz1 => self.quiz1,
            ScoreField::Quiz2 => self.quiz2,
            ScoreField::Quiz3 => self.quiz3,
            ScoreField::Cat1 => self.cat1,
            ScoreField::Cat2 => self.cat2,
            ScoreField::Fat => self.fat,
        }
    }

    /// Check every provided value against its bound
    pub fn validate(&self) -> Result<(), ValidationError> {
        for field in ScoreField::ALL {
            if let Some(Some(value)) = self.get(field) {
                field.validate(value)?;
            }
        }
        Ok(())
    }

    /// Merge into an existing record; fields not in the patch are kept
    pub fn apply(&self, record: &mut GradeRecord) {
        let merge = |slot: &mut Option<f64>, update: Option<Option<f64>>| {
            if let Some(value) = update {
                *slot = value;
            }
        };
        merge(&mut record.quiz1, self.quiz1);
        merge(&mut record.quiz2, self.quiz2);
        merge(&mut record.quiz3, self.quiz3);
        merge(&mut record.cat1, self.cat1);
        merge(&mut record.cat2, self.cat2);
        merge(&mut record.fat, self.fat);
    }
}
