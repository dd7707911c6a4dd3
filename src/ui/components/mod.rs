pub mod dashboard;
pub mod grammar_panel;
pub mod history_sidebar;
pub mod items_panel;
pub mod menu;
pub mod word_strip;
