mod exam;
mod exam_list;
mod login;
mod render;
mod results;

pub use render::render;
