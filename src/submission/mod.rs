pub mod escape;
pub mod intake;
pub mod metadata;
pub mod parser;
pub mod pipeline;
