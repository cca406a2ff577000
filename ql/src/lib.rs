pub mod prelude;
pub mod discretizer;
pub mod policy;
pub mod q_table;
pub mod learn;
pub mod play;
pub mod util;
