pub mod assessment;
pub mod contact;
pub mod question;

pub use assessment::{AssessmentSpec, Presentation, QuestionBank, SpecError};
pub use contact::{ContactField, ContactInfo, Gender};
pub use question::QuestionDefinition;
