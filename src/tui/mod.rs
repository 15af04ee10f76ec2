pub mod grid;
pub mod input;
pub mod mode;
pub mod scene;
pub mod view;
