pub mod calculator;
pub mod dashboard;
pub mod login;
pub mod resource_page;
