pub mod analytics;
pub mod errors;
pub mod models;
pub mod notes;
pub mod prompt_template;
pub mod providers;
pub mod relay;
