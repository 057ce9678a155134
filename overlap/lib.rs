#![deny(unused_variables)]
#![deny(dead_code)]
#![deny(unused_imports)]
#![deny(clippy::no_effect_underscore_binding)]
pub mod accumulate;
pub mod files;
pub mod normalize;
pub mod pipeline;
pub mod report;
pub mod scan;
pub mod types;
pub mod weights;
