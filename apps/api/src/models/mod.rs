pub mod resume_version;
pub mod stage;

pub use resume_version::ResumeVersion;
pub use stage::Stage;
