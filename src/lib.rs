pub mod contact;
pub mod feedback;
pub mod form;
pub mod page;
pub mod view;
