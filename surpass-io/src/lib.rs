mod utils;
mod tokenize;

pub use utils::*;
pub use tokenize::*;
