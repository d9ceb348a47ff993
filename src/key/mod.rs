pub mod amplify;
pub mod prompt;
pub mod resolve;
pub mod stream;

pub use amplify::*;
pub use prompt::*;
pub use resolve::*;
pub use stream::*;
