//! Session-quality classification: liquidity windows by instrument class.
//!
//! Commodities (COMEX/NYMEX): kill zones at London open 02:00-04:59 UTC and
//! New York open 07:00-09:59 UTC; the Asian dead zone 20:00-01:59 UTC is thin.
//! NSE stocks: opening 75 minutes are the kill zone, the last half hour is
//! thin and choppy. Indices always classify as Normal.

use chrono::{DateTime, Timelike, Utc};

use crate::models::{InstrumentClass, SessionQuality};

pub fn session_quality(now: DateTime<Utc>, class: InstrumentClass) -> SessionQuality {
    match class {
        InstrumentClass::Commodity => commodity_session(now),
        InstrumentClass::Stock => stock_session(now),
        InstrumentClass::Index | InstrumentClass::Unknown => SessionQuality::Normal,
    }
}

fn commodity_session(now: DateTime<Utc>) -> SessionQuality {
    let hour = now.hour();
    if (2..=4).contains(&hour) || (7..=9).contains(&hour) {
        return SessionQuality::KillZone;
    }
    if hour >= 20 || hour <= 1 {
        return SessionQuality::Thin;
    }
    SessionQuality::Normal
}

fn stock_session(now: DateTime<Utc>) -> SessionQuality {
    // Minutes since midnight UTC; NSE trades 03:45-10:00 UTC
    let minutes = now.hour() * 60 + now.minute();
    if (3 * 60 + 45..=5 * 60).contains(&minutes) {
        return SessionQuality::KillZone;
    }
    if (9 * 60 + 30..=10 * 60).contains(&minutes) {
        return SessionQuality::Thin;
    }
    SessionQuality::Normal
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, hour, minute, 0).unwrap()
    }

    #[test]
    fn test_commodity_kill_zones() {
        assert_eq!(
            session_quality(at(3, 0), InstrumentClass::Commodity),
            SessionQuality::KillZone
        );
        assert_eq!(
            session_quality(at(8, 30), InstrumentClass::Commodity),
            SessionQuality::KillZone
        );
    }

    #[test]
    fn test_commodity_thin_zone_wraps_midnight() {
        assert_eq!(
            session_quality(at(21, 0), InstrumentClass::Commodity),
            SessionQuality::Thin
        );
        assert_eq!(
            session_quality(at(0, 30), InstrumentClass::Commodity),
            SessionQuality::Thin
        );
        assert_eq!(
            session_quality(at(14, 0), InstrumentClass::Commodity),
            SessionQuality::Normal
        );
    }

    #[test]
    fn test_stock_sessions() {
        // NSE opening window
        assert_eq!(
            session_quality(at(4, 0), InstrumentClass::Stock),
            SessionQuality::KillZone
        );
        // Last half hour before close
        assert_eq!(
            session_quality(at(9, 45), InstrumentClass::Stock),
            SessionQuality::Thin
        );
        assert_eq!(
            session_quality(at(7, 0), InstrumentClass::Stock),
            SessionQuality::Normal
        );
    }

    #[test]
    fn test_indices_always_normal() {
        assert_eq!(
            session_quality(at(3, 0), InstrumentClass::Index),
            SessionQuality::Normal
        );
        assert_eq!(
            session_quality(at(21, 0), InstrumentClass::Unknown),
            SessionQuality::Normal
        );
    }
}
