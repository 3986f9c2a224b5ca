//! Records the tracker works with. Everything here is plain data, validation of user input
//! happens through [activity::NewActivity::validate] and in [crate::tracker].

pub mod activity;
pub mod history;
pub mod rhythm;
