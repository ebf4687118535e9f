//! The private cookie pair that represents a logged-in session.
//!
//! Two cookies are set: one carrying the username and one carrying the
//! expiry timestamp. Both are signed and encrypted by the cookie jar, so
//! the client can hold but not forge or read them.

use std::cmp::max;

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::{
    Duration, OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description,
};

use crate::Error;

pub(crate) const COOKIE_USERNAME: &str = "username";
pub(crate) const COOKIE_EXPIRY: &str = "expiry";
/// The default duration for which auth cookies are valid.
pub const DEFAULT_COOKIE_DURATION: Duration = Duration::minutes(30);

/// Date time format for the expiry cookie value, e.g.
/// "2021-01-01 00:00:00.000000 +00:00:00". Explicit two-digit fields avoid
/// parse failures around midnight that Display formatting would cause.
const DATE_TIME_FORMAT: &[BorrowedFormatItem] = format_description!(
    "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond] [offset_hour \
         sign:mandatory]:[offset_minute]:[offset_second]"
);

fn session_cookie(name: &'static str, value: String, expiry: OffsetDateTime) -> Cookie<'static> {
    Cookie::build((name, value))
        .expires(expiry)
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(true)
        .build()
}

/// Add the auth cookie pair to the jar, marking `username` as logged in
/// until `duration` from now.
///
/// # Errors
///
/// Returns a [time::error::Format] if the expiry time cannot be formatted.
pub fn set_auth_cookie(
    jar: PrivateCookieJar,
    username: &str,
    duration: Duration,
) -> Result<PrivateCookieJar, time::error::Format> {
    let expiry = OffsetDateTime::now_utc() + duration;
    let expiry_string = expiry.format(DATE_TIME_FORMAT)?;

    Ok(jar
        .add(session_cookie(COOKIE_USERNAME, username.to_owned(), expiry))
        .add(session_cookie(COOKIE_EXPIRY, expiry_string, expiry)))
}

/// Overwrite both auth cookies with an expired value so the client drops them.
pub fn invalidate_auth_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    let expire = |name| {
        let mut cookie = session_cookie(name, "deleted".to_owned(), OffsetDateTime::UNIX_EPOCH);
        cookie.set_max_age(Duration::ZERO);
        cookie
    };

    jar.add(expire(COOKIE_USERNAME)).add(expire(COOKIE_EXPIRY))
}

/// Push the expiry of the auth cookie pair out to now plus `duration`, unless
/// the cookies already expire later than that.
///
/// # Errors
///
/// The cookie jar is not modified if an error is returned.
///
/// Returns:
/// - [Error::CookieMissing] if either auth cookie is not in the jar.
/// - [Error::InvalidDateFormat] if the stored expiry cannot be parsed or the
///   new expiry cannot be represented.
pub(crate) fn extend_auth_cookie_duration_if_needed(
    jar: PrivateCookieJar,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    let expiry_cookie = jar.get(COOKIE_EXPIRY).ok_or(Error::CookieMissing)?;
    let current_expiry = extract_date_time(&expiry_cookie).map_err(|error| {
        Error::InvalidDateFormat(error.to_string(), expiry_cookie.value_trimmed().to_owned())
    })?;

    let new_expiry = OffsetDateTime::now_utc()
        .checked_add(duration)
        .ok_or_else(|| {
            Error::InvalidDateFormat("date time overflow".to_owned(), duration.to_string())
        })?;

    set_auth_cookie_expiry(jar, max(current_expiry, new_expiry))
}

/// Set the expires field of both auth cookies, and the value of the expiry
/// cookie, to `expiry`.
///
/// # Errors
///
/// If an error is returned, the cookie jar is not modified.
///
/// Returns a:
/// - [Error::CookieMissing] if either auth cookie is not in the jar.
/// - [Error::InvalidDateFormat] if the new expiry cannot be formatted.
pub(crate) fn set_auth_cookie_expiry(
    jar: PrivateCookieJar,
    expiry: OffsetDateTime,
) -> Result<PrivateCookieJar, Error> {
    let expiry_string = expiry
        .format(DATE_TIME_FORMAT)
        .map_err(|error| Error::InvalidDateFormat(error.to_string(), expiry.to_string()))?;

    let mut username_cookie = jar.get(COOKIE_USERNAME).ok_or(Error::CookieMissing)?;
    let mut expiry_cookie = jar.get(COOKIE_EXPIRY).ok_or(Error::CookieMissing)?;

    username_cookie.set_expires(expiry);
    expiry_cookie.set_expires(expiry);
    expiry_cookie.set_value(expiry_string);

    Ok(jar.add(username_cookie).add(expiry_cookie))
}

/// Get the logged-in username from the auth cookies.
///
/// # Errors
///
/// Returns [Error::InvalidCredentials] if either cookie is missing, the
/// expiry cannot be parsed, or the expiry is in the past.
pub(crate) fn get_username_from_cookies(jar: &PrivateCookieJar) -> Result<String, Error> {
    let username_cookie = jar.get(COOKIE_USERNAME).ok_or(Error::InvalidCredentials)?;
    let expiry_cookie = jar.get(COOKIE_EXPIRY).ok_or(Error::InvalidCredentials)?;

    let expiry = extract_date_time(&expiry_cookie).map_err(|_| Error::InvalidCredentials)?;
    if expiry < OffsetDateTime::now_utc() {
        return Err(Error::InvalidCredentials);
    }

    let username = username_cookie.value_trimmed();
    if username.is_empty() {
        return Err(Error::InvalidCredentials);
    }

    Ok(username.to_owned())
}

pub(crate) fn extract_date_time(cookie: &Cookie) -> Result<OffsetDateTime, time::error::Parse> {
    OffsetDateTime::parse(cookie.value_trimmed(), DATE_TIME_FORMAT)
}

#[cfg(test)]
mod cookie_tests {
    use axum_extra::extract::{PrivateCookieJar, cookie::Key};
    use sha2::{Digest, Sha512};
    use time::{Duration, OffsetDateTime};

    use crate::Error;

    use super::{
        COOKIE_EXPIRY, COOKIE_USERNAME, DEFAULT_COOKIE_DURATION,
        extend_auth_cookie_duration_if_needed, extract_date_time, get_username_from_cookies,
        invalidate_auth_cookie, set_auth_cookie,
    };

    fn get_jar() -> PrivateCookieJar {
        let hash = Sha512::digest(b"foobar");

        PrivateCookieJar::new(Key::from(&hash))
    }

    /// Test helper macro to assert that two date times are within one second
    /// of each other. Used instead of a function so that the file and line
    /// number of the caller is included in the error message instead of the
    /// helper.
    macro_rules! assert_date_time_close {
        ($left:expr, $right:expr) => {
            assert!(
                ($left - $right).abs() < Duration::seconds(1),
                "got date time {:?}, want {:?}",
                $left,
                $right
            );
        };
    }

    #[test]
    fn can_set_cookie() {
        let jar = set_auth_cookie(get_jar(), "sam", DEFAULT_COOKIE_DURATION).unwrap();

        let username_cookie = jar.get(COOKIE_USERNAME).unwrap();
        let expiry_cookie = jar.get(COOKIE_EXPIRY).unwrap();

        assert_eq!(username_cookie.value_trimmed(), "sam");
        assert_date_time_close!(
            extract_date_time(&expiry_cookie).unwrap(),
            OffsetDateTime::now_utc() + DEFAULT_COOKIE_DURATION
        );
    }

    #[test]
    fn get_username_from_cookies_succeeds() {
        let jar = set_auth_cookie(get_jar(), "sam", DEFAULT_COOKIE_DURATION).unwrap();

        assert_eq!(get_username_from_cookies(&jar).unwrap(), "sam");
    }

    #[test]
    fn get_username_fails_with_no_cookies() {
        assert_eq!(
            get_username_from_cookies(&get_jar()),
            Err(Error::InvalidCredentials)
        );
    }

    #[test]
    fn get_username_fails_with_expired_cookie() {
        let jar = set_auth_cookie(get_jar(), "sam", Duration::seconds(-10)).unwrap();

        assert_eq!(
            get_username_from_cookies(&jar),
            Err(Error::InvalidCredentials)
        );
    }

    #[test]
    fn can_extend_cookie_duration() {
        let jar = set_auth_cookie(get_jar(), "sam", DEFAULT_COOKIE_DURATION).unwrap();
        let want = OffsetDateTime::now_utc() + Duration::hours(1);

        let jar = extend_auth_cookie_duration_if_needed(jar, Duration::hours(1)).unwrap();

        let expiry_cookie = jar.get(COOKIE_EXPIRY).unwrap();
        assert_date_time_close!(extract_date_time(&expiry_cookie).unwrap(), want);
    }

    #[test]
    fn cookie_duration_does_not_shrink() {
        let jar = set_auth_cookie(get_jar(), "sam", DEFAULT_COOKIE_DURATION).unwrap();
        let want = jar.get(COOKIE_USERNAME).unwrap().expires_datetime();

        // The pair already expires later than now + 5 seconds, so extending
        // by 5 seconds must leave the expiry alone.
        let jar = extend_auth_cookie_duration_if_needed(jar, Duration::seconds(5)).unwrap();

        assert_eq!(jar.get(COOKIE_USERNAME).unwrap().expires_datetime(), want);
    }

    #[test]
    fn invalidate_auth_cookie_succeeds() {
        let jar = set_auth_cookie(get_jar(), "sam", DEFAULT_COOKIE_DURATION).unwrap();

        let jar = invalidate_auth_cookie(jar);

        let cookie = jar.get(COOKIE_USERNAME).unwrap();
        assert_eq!(cookie.value(), "deleted");
        assert_eq!(cookie.expires_datetime(), Some(OffsetDateTime::UNIX_EPOCH));
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));

        assert_eq!(
            get_username_from_cookies(&jar),
            Err(Error::InvalidCredentials),
        );
    }
}
