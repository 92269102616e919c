//! Agent loop implementations

mod react;

pub use react::ReActAgent;
