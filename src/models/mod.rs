pub mod admin;
pub mod category;
pub mod course;
pub mod dashboard;
pub mod instructor;
pub mod lesson;
pub mod module;
pub mod payment;
pub mod resource;
pub mod student;
