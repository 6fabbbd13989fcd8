pub mod generator;
pub mod model;
pub mod scorer;
pub mod source;

pub use generator::{OpportunityGenerator, StatTable};
pub use model::{ModelOutput, PredictionModel, SeededModel};
pub use scorer::{composite_risk, playable, score, score_and_filter, value_score};
pub use source::{DataSource, StaticSource, SubjectFeed};
