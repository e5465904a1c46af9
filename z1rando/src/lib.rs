pub mod patch;
pub mod pool;
pub mod randomize;
pub mod settings;
pub mod spoiler_log;
pub mod traverse;
