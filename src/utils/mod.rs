pub mod datetime;
pub mod html;
pub mod logging;
pub mod validation;
