pub mod requests;
pub mod responses;

pub use requests::{PostValidation, SigninValidation, SignupValidation, field_errors};
pub use responses::{FieldErrors, Screen, SubmitOutcome, Toast};
