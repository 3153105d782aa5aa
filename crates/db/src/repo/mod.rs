pub mod episodes;
pub mod exceptions;
pub mod poll_history;
pub mod quality_groups;
pub mod shows;

pub(crate) fn now_ts() -> i64 {
    chrono::Utc::now().timestamp()
}
