pub mod analysis;
pub mod feedback;
pub mod report;
pub mod user;

pub use analysis::{NewPlantAnalysis, PlantAnalysis, Severity};
pub use feedback::{NewUserFeedback, UserFeedback};
pub use report::{DiseaseReport, NewDiseaseReport};
pub use user::{NewUser, PublicUser, User};
