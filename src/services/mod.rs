pub mod backend;
pub mod poller;
pub mod ranking;
pub mod selection;
pub mod tracker;
