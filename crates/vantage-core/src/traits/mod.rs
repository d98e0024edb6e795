pub mod storage;

pub use storage::{ConversionWrite, IExperimentStorage};
