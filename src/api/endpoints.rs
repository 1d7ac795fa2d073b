//! Backend endpoint paths

pub const TOKEN: &str = "/api/token/";
pub const TOKEN_REFRESH: &str = "/api/token/refresh/";
pub const USER: &str = "/account/user/";
pub const REGISTER: &str = "/account/register/";
pub const DAILY_WORKS: &str = "/api/work-time/daily-works/";
pub const WEEKLY_WORKS: &str = "/api/work-time/weekly-works/";

/// Path of a single day's record, keyed by `yyyy-MM-dd`
pub fn daily_work(date_key: &str) -> String {
    format!("{}{}/", DAILY_WORKS, date_key)
}
