use std::ops::RangeInclusive;

use time::{Date, Duration, Month};

/// Balance granted to an account on registration.
pub const STARTING_BALANCE: i64 = 100;
/// Ledger entries kept per account; older entries are dropped first.
pub const HISTORY_CAP: usize = 50;
/// Entries shown by default when history is listed.
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Check codes: fixed length, unambiguous symbols only (no I, O, 0, 1).
pub const CHECK_CODE_LEN: usize = 8;
pub const CHECK_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
/// Draws attempted before code issuance gives up.
pub const MAX_CODE_ATTEMPTS: usize = 100;

pub const CHESS_VICTORY_REWARD: RangeInclusive<i64> = 20..=50;
pub const CHECKERS_VICTORY_REWARD: RangeInclusive<i64> = 15..=40;
pub const VICTORY_REASON: &str = "game victory";

pub const DAILY_BASE_REWARD: RangeInclusive<i64> = 10..=30;
pub const DAILY_HOLIDAY_BONUS: RangeInclusive<i64> = 20..=50;
pub const DAILY_COOLDOWN: Duration = Duration::hours(24);

pub const QUIZ_REWARD: RangeInclusive<i64> = 5..=15;
pub const QUIZ_REASON: &str = "quiz answer";

pub const WARNINGS_BEFORE_BAN: usize = 3;
pub const BAN_DURATION: Duration = Duration::hours(24);

const HOLIDAYS: [(Month, u8, &str); 9] = [
    (Month::January, 1, "New Year"),
    (Month::January, 7, "Christmas"),
    (Month::February, 23, "Defender of the Fatherland Day"),
    (Month::March, 8, "International Women's Day"),
    (Month::May, 1, "Spring and Labour Day"),
    (Month::May, 9, "Victory Day"),
    (Month::June, 12, "Russia Day"),
    (Month::November, 4, "Unity Day"),
    (Month::December, 31, "New Year's Eve"),
];

/// Holiday falling on `date`, if any. Holidays earn a daily-claim bonus.
pub fn holiday_on(date: Date) -> Option<&'static str> {
    HOLIDAYS
        .iter()
        .find(|(month, day, _)| date.month() == *month && date.day() == *day)
        .map(|(_, _, name)| *name)
}
