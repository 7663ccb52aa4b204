pub mod column_menu;
pub mod controls;
pub mod datatable;
pub mod debug;
pub mod filter_editor;
pub mod text_input;
