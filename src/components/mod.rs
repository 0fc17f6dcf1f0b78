pub mod dialog;
pub mod editor;
pub mod file_list;
pub mod help;
pub mod page_bar;
pub mod preview;
pub mod status_bar;
