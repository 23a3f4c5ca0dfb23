pub mod input;
pub mod line_editor;
pub mod surface;
