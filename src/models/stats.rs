use serde::{Deserialize, Serialize};

use crate::models::{TestStatus, Validate};

/// Estadísticas agregadas que calcula el servicio (`GET /api/getstat`)
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub struct Statistics {
    pub total: i64,
    pub passed: i64,
    pub failed: i64,
    pub norun: i64,
}

impl Statistics {
    pub fn sum_of_statuses(&self) -> i64 {
        self.passed + self.failed + self.norun
    }

    pub fn count_for(&self, status: &TestStatus) -> Option<i64> {
        match status {
            TestStatus::Pass => Some(self.passed),
            TestStatus::Fail => Some(self.failed),
            TestStatus::Norun => Some(self.norun),
            TestStatus::Other(_) => None,
        }
    }

    /// Diferencia campo a campo entre dos lecturas
    pub fn delta(&self, before: &Statistics) -> Statistics {
        Statistics {
            total: self.total - before.total,
            passed: self.passed - before.passed,
            failed: self.failed - before.failed,
            norun: self.norun - before.norun,
        }
    }
}

impl Validate for Statistics {
    fn validate(&self) -> Result<(), String> {
        if [self.total, self.passed, self.failed, self.norun].iter().any(|v| *v < 0) {
            return Err(format!("contadores negativos: {:?}", self));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_between_snapshots() {
        let before = Statistics { total: 10, passed: 4, failed: 3, norun: 3 };
        let after = Statistics { total: 12, passed: 3, failed: 5, norun: 4 };
        let delta = after.delta(&before);
        assert_eq!(delta, Statistics { total: 2, passed: -1, failed: 2, norun: 1 });
        assert_eq!(after.sum_of_statuses(), after.total);
    }

    #[test]
    fn rejects_negative_counters() {
        let stats = Statistics { total: -1, ..Default::default() };
        assert!(stats.validate().is_err());
    }
}
