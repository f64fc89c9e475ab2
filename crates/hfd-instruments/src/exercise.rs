//! Option exercise styles in year-fraction time.

use hfd_core::Time;

/// Type of exercise right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExerciseType {
    /// Can only be exercised at expiry.
    European,
    /// Can be exercised at any time up to expiry.
    American,
}

/// Exercise specification for an option.
#[derive(Debug, Clone, Copy)]
pub struct Exercise {
    exercise_type: ExerciseType,
    maturity: Time,
}

impl Exercise {
    /// European exercise at `maturity` (in years from valuation).
    pub fn european(maturity: Time) -> Self {
        Self {
            exercise_type: ExerciseType::European,
            maturity,
        }
    }

    /// American exercise at any time up to `maturity`.
    pub fn american(maturity: Time) -> Self {
        Self {
            exercise_type: ExerciseType::American,
            maturity,
        }
    }

    /// The type of exercise.
    pub fn exercise_type(&self) -> ExerciseType {
        self.exercise_type
    }

    /// The last possible exercise time.
    pub fn maturity(&self) -> Time {
        self.maturity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_type_and_maturity() {
        let eu = Exercise::european(1.0);
        assert_eq!(eu.exercise_type(), ExerciseType::European);
        assert_eq!(eu.maturity(), 1.0);

        let am = Exercise::american(0.25);
        assert_eq!(am.exercise_type(), ExerciseType::American);
        assert_eq!(am.maturity(), 0.25);
    }
}
