//! Commission allocation for a single visit item.
//!
//! The split follows the clinic's payout policy: combined co-doctor ratios
//! are clamped to 1.0 before computing the main doctor's residual, but each
//! co-doctor share is computed from its own unclamped ratio, and nurse
//! bonuses are layered on top of the doctor shares rather than carved out
//! of them. The recorded shares of one item can therefore legitimately sum
//! to more than its amount. Written callers validate ratio ranges and
//! participant presence; this function accepts its inputs as-is.

use serde::{Deserialize, Serialize};

use super::domain::StaffAssignment;

/// Fixed bonus ratio credited to each assigned nurse.
pub const NURSE_BONUS_RATE: f64 = 0.05;

/// The five stored performance figures of one visit item.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CommissionSplit {
    pub main_doctor: f64,
    pub co_doctor1: f64,
    pub co_doctor2: f64,
    pub nurse1: f64,
    pub nurse2: f64,
}

/// Compute the commission split for a billed amount and staff assignment.
///
/// Pure computation; persisting the result is the caller's concern. A ratio
/// supplied without the matching co-doctor id still reduces the main share
/// while crediting nobody.
pub fn allocate(amount: f64, staff: &StaffAssignment) -> CommissionSplit {
    let combined = (staff.co_ratio1 + staff.co_ratio2).min(1.0);

    CommissionSplit {
        main_doctor: amount * (1.0 - combined),
        co_doctor1: if staff.co_doctor1.is_some() {
            amount * staff.co_ratio1
        } else {
            0.0
        },
        co_doctor2: if staff.co_doctor2.is_some() {
            amount * staff.co_ratio2
        } else {
            0.0
        },
        nurse1: if staff.nurse1.is_some() {
            amount * NURSE_BONUS_RATE
        } else {
            0.0
        },
        nurse2: if staff.nurse2.is_some() {
            amount * NURSE_BONUS_RATE
        } else {
            0.0
        },
    }
}
