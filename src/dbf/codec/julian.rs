//! Julian day ↔ proleptic Gregorian calendar conversion.
//!
//! Julian days are counted from noon, so a civil date starts at a `.5` day
//! value. Timestamp fields store the integer day number of the noon that
//! falls within the date; [`julian_day_to_gregorian`] accepts either form.

/// Julian day of 0001-01-01 00:00 in the proleptic Gregorian calendar.
pub const GREGORIAN_EPOCH: f64 = 1721425.5;

const DAYS_PER_400_YEARS: i64 = 146_097;
const DAYS_PER_100_YEARS: i64 = 36_524;
const DAYS_PER_4_YEARS: i64 = 1_461;

pub fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Returns the Julian day at which the given Gregorian date begins.
pub fn gregorian_to_julian_day(year: i32, month: u32, day: u32) -> f64 {
    (GREGORIAN_EPOCH - 1.0) + day_ordinal(year, month, day) as f64
}

/// Converts a Julian day to a Gregorian `(year, month, day)`.
///
/// Inverse of [`gregorian_to_julian_day`] for every date from year 1 onward.
pub fn julian_day_to_gregorian(jd: f64) -> (i32, u32, u32) {
    // Whole days since the day before the epoch, so that 0001-01-01 is 1.
    let ordinal = (jd - 0.5).floor() as i64 - (GREGORIAN_EPOCH - 1.5) as i64;
    let depoch = ordinal - 1;

    let quadricent = depoch.div_euclid(DAYS_PER_400_YEARS);
    let dqc = depoch.rem_euclid(DAYS_PER_400_YEARS);
    let cent = dqc / DAYS_PER_100_YEARS;
    let dcent = dqc % DAYS_PER_100_YEARS;
    let quad = dcent / DAYS_PER_4_YEARS;
    let dquad = dcent % DAYS_PER_4_YEARS;
    let yindex = dquad / 365;

    let mut year = quadricent * 400 + cent * 100 + quad * 4 + yindex;
    // The last day of a leap cycle belongs to the year already counted.
    if cent != 4 && yindex != 4 {
        year += 1;
    }
    let year = year as i32;

    let yearday = ordinal - day_ordinal(year, 1, 1);
    let leap_adjust = if ordinal < day_ordinal(year, 3, 1) {
        0
    } else if is_leap_year(year) {
        1
    } else {
        2
    };
    let month = (((yearday + leap_adjust) * 12 + 373) / 367) as u32;
    let day = (ordinal - day_ordinal(year, month, 1) + 1) as u32;

    (year, month, day)
}

/// Days from the day before 0001-01-01 to the given date, counting that date.
fn day_ordinal(year: i32, month: u32, day: u32) -> i64 {
    let y = i64::from(year) - 1;
    let m = i64::from(month);
    let month_adjust = if month <= 2 {
        0
    } else if is_leap_year(year) {
        -1
    } else {
        -2
    };

    365 * y + y.div_euclid(4) - y.div_euclid(100)
        + y.div_euclid(400)
        + (367 * m - 362).div_euclid(12)
        + month_adjust
        + i64::from(day)
}
