use serde::Serialize;
use utoipa::ToSchema;

/// Aggregated vote counts for one idea.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct VoteTally {
    pub yes: u64,
    pub maybe: u64,
    pub no: u64,
}

impl VoteTally {
    pub fn total(&self) -> u64 {
        self.yes + self.maybe + self.no
    }

    pub fn score(&self) -> i32 {
        validation_score(self.yes, self.no)
    }
}

/// Net-sentiment validation score in [-100, 100].
///
/// score = round(sign(yes - no) * min(100, sqrt(|yes - no|) * 10))
///
/// Maybe votes count toward participation but not the score. The square
/// root damps large majorities so early ideas can't swing the scale, and
/// the cap is reached at a net margin of 100.
pub fn validation_score(yes: u64, no: u64) -> i32 {
    let net = yes as i64 - no as i64;
    if net == 0 {
        return 0;
    }
    let magnitude = ((net.unsigned_abs() as f64).sqrt() * 10.0).min(100.0);
    (net.signum() as f64 * magnitude).round() as i32
}
